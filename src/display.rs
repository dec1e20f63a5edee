use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::squad::{Candidate, Squad, VocationCounts};

/// Formats a player line: `Name (Vocation) [Role, Role]`
pub fn format_player_line(candidate: &Candidate) -> String {
    if candidate.roles.is_empty() {
        format!("{} ({})", candidate.name, candidate.vocation)
    } else {
        let roles: Vec<&str> = candidate.roles.iter().map(|r| r.name()).collect();
        format!("{} ({}) [{}]", candidate.name, candidate.vocation, roles.join(", "))
    }
}

/// Composition summary such as `Elder Druid: 2, Elite Knight: 1`, alphabetical
pub fn format_composition(counts: &VocationCounts) -> String {
    let mut entries: Vec<String> = counts
        .iter()
        .map(|(vocation, n)| format!("{}: {}", vocation, n))
        .collect();
    entries.sort();
    entries.join(", ")
}

fn sorted_for_display(members: &[Candidate]) -> Vec<&Candidate> {
    let mut sorted: Vec<&Candidate> = members.iter().collect();
    sorted.sort_by(|a, b| {
        a.vocation
            .name()
            .cmp(b.vocation.name())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    sorted
}

fn write_squad(lines: &mut Vec<String>, squad: &Squad) {
    let mut header = format!(
        "**{} — Team {} ({}/{})**",
        squad.encounter.boss_name(),
        squad.number,
        squad.members.len(),
        squad.capacity
    );
    if !squad.meets_requirements {
        header.push_str(" (requirements not met)");
    }

    match &squad.sub_parties {
        Some(parties) if !parties.is_empty() => {
            lines.push(header);
            lines.push(String::new());
            for party in parties {
                let composition = format_composition(&VocationCounts::tally(&party.members));
                lines.push(format!(
                    "**{}** ({} players) — {}",
                    party.label,
                    party.members.len(),
                    composition
                ));
                for candidate in sorted_for_display(&party.members) {
                    lines.push(format!("  {}", format_player_line(candidate)));
                }
                lines.push(String::new());
            }
        }
        _ => {
            let composition = format_composition(&squad.vocation_counts());
            lines.push(format!("{} — {}", header, composition));
            lines.push(String::new());
            for candidate in sorted_for_display(&squad.members) {
                lines.push(format_player_line(candidate));
            }
            lines.push(String::new());
        }
    }
}

fn write_backups(lines: &mut Vec<String>, backups: &[Candidate]) {
    let mut sorted: Vec<&Candidate> = backups.iter().collect();
    sorted.sort_by_key(|c| c.name.to_lowercase());
    lines.push("**Back-up / Reserves:**".to_string());
    lines.push(String::new());
    for candidate in sorted {
        lines.push(format_player_line(candidate));
    }
    lines.push(String::new());
}

/// Renders the squad set as chat-ready text
///
/// Empty squads are skipped; a placeholder only contributes its backups.
pub fn format_squads(squads: &[Squad]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for squad in squads {
        if !squad.is_empty() {
            write_squad(&mut lines, squad);
        }
        if !squad.backups.is_empty() {
            write_backups(&mut lines, &squad.backups);
        }
    }
    lines.join("\n")
}

/// Writes the text export to a file
pub fn write_squads_to_file<P: AsRef<Path>>(squads: &[Squad], path: P) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(path)?;
    write!(file, "{}", format_squads(squads))?;
    Ok(())
}

/// Prints a readable summary of one generation run
pub fn print_squads(squads: &[Squad]) {
    for squad in squads.iter().filter(|s| !s.is_placeholder()) {
        let counts = squad.vocation_counts();
        let flag = if squad.meets_requirements { "ok" } else { "NOT MET" };
        println!(
            "\n=== {} ({}) Team {}: {}/{} [{}] ===",
            squad.encounter.boss_name(),
            squad.encounter,
            squad.number,
            squad.members.len(),
            squad.capacity,
            flag
        );
        println!("Composition: {}", format_composition(&counts));
        for candidate in &squad.members {
            println!(
                "  {} (ID: {}, Priority: {})",
                format_player_line(candidate),
                candidate.user_id,
                candidate.priority
            );
        }
    }
    for squad in squads.iter().filter(|s| !s.backups.is_empty()) {
        println!("\n{} backups ({}):", squad.encounter.boss_name(), squad.backups.len());
        for candidate in &squad.backups {
            println!("  - {}", format_player_line(candidate));
        }
    }
}
