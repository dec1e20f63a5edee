use super::types::{sort_candidates, Candidate, Encounter, SubParty, Vocation};

pub const THREE_WAY_LABELS: [&str; 3] = ["Left", "Mid", "Right"];
pub const FOUR_WAY_LABELS: [&str; 4] = ["Top Left", "Top Right", "Bottom Left", "Bottom Right"];
pub const THREE_WAY_SIZE: usize = 5;
pub const FOUR_WAY_SIZES: [usize; 4] = [4, 4, 4, 3];

/// Splits a squad into its physical sub-parties, or None for encounters fought as one group
pub fn split_sub_parties(members: &[Candidate], encounter: Encounter) -> Option<Vec<SubParty>> {
    match encounter {
        Encounter::H => Some(label(split_three_way(members), &THREE_WAY_LABELS)),
        Encounter::L => Some(label(split_four_way(members), &FOUR_WAY_LABELS)),
        _ => None,
    }
}

fn label(groups: Vec<Vec<Candidate>>, labels: &[&str]) -> Vec<SubParty> {
    groups
        .into_iter()
        .zip(labels.iter())
        .map(|(members, label)| SubParty { label: label.to_string(), members })
        .collect()
}

/// 15 into 3x5, keeping a knight and a druid together in each group where possible
fn split_three_way(members: &[Candidate]) -> Vec<Vec<Candidate>> {
    let mut sorted = members.to_vec();
    sort_candidates(&mut sorted);

    let tanks: Vec<&Candidate> = sorted.iter().filter(|c| c.vocation == Vocation::EliteKnight).collect();
    let healers: Vec<&Candidate> = sorted.iter().filter(|c| c.vocation == Vocation::ElderDruid).collect();
    let others: Vec<&Candidate> = sorted
        .iter()
        .filter(|c| c.vocation != Vocation::EliteKnight && c.vocation != Vocation::ElderDruid)
        .collect();

    let mut groups: Vec<Vec<Candidate>> = vec![Vec::new(); THREE_WAY_LABELS.len()];
    let mut overflowed = false;

    // Pairs rotate through the groups so each gets a knight and a druid before any gets two
    let mut cursor = 0;
    let mut paired = 0;
    while paired < tanks.len() && paired < healers.len() {
        let target = (0..groups.len())
            .map(|offset| (cursor + offset) % groups.len())
            .find(|&g| groups[g].len() + 2 <= THREE_WAY_SIZE);
        match target {
            Some(g) => {
                groups[g].push(tanks[paired].clone());
                groups[g].push(healers[paired].clone());
                cursor = (g + 1) % groups.len();
                paired += 1;
            }
            None => break,
        }
    }

    let unpaired = tanks[paired..].iter().chain(healers[paired..].iter());
    for candidate in unpaired {
        match groups.iter().position(|g| g.len() < THREE_WAY_SIZE) {
            Some(g) => groups[g].push((*candidate).clone()),
            None => overflowed = true,
        }
    }

    for candidate in others {
        let smallest = groups
            .iter()
            .enumerate()
            .min_by_key(|(_, g)| g.len())
            .map(|(i, _)| i)
            .unwrap_or(0);
        if groups[smallest].len() >= THREE_WAY_SIZE {
            overflowed = true;
            break;
        }
        groups[smallest].push(candidate.clone());
    }

    if overflowed {
        return round_robin(&sorted, THREE_WAY_LABELS.len());
    }
    groups
}

/// Plain sorted fill, one candidate per group in turn
fn round_robin(sorted: &[Candidate], group_count: usize) -> Vec<Vec<Candidate>> {
    let mut groups: Vec<Vec<Candidate>> = vec![Vec::new(); group_count];
    for (i, candidate) in sorted.iter().enumerate() {
        groups[i % group_count].push(candidate.clone());
    }
    groups
}

/// 15 into 4/4/4/3 by sorted order, no pairing
fn split_four_way(members: &[Candidate]) -> Vec<Vec<Candidate>> {
    let mut sorted = members.to_vec();
    sort_candidates(&mut sorted);

    let mut groups: Vec<Vec<Candidate>> = vec![Vec::new(); FOUR_WAY_SIZES.len()];
    let mut rest = sorted.into_iter();
    for (group, &size) in groups.iter_mut().zip(FOUR_WAY_SIZES.iter()) {
        group.extend(rest.by_ref().take(size));
    }
    // Only hand-edited squads can exceed 15; the surplus sits in the last group
    if let Some(last) = groups.last_mut() {
        last.extend(rest);
    }
    groups
}
