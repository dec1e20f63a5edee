use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::error::ExportError;
use crate::squad::{Candidate, Squad};

/// One CSV line: a placed candidate or a backup
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    encounter: char,
    team: u32,
    group: &'a str,
    name: &'a str,
    vocation: &'static str,
    roles: String,
    priority: u32,
    backup: bool,
    meets_requirements: bool,
}

impl<'a> ExportRow<'a> {
    fn new(squad: &Squad, group: &'a str, candidate: &'a Candidate, backup: bool) -> ExportRow<'a> {
        let roles: Vec<&str> = candidate.roles.iter().map(|r| r.name()).collect();
        ExportRow {
            encounter: squad.encounter.code(),
            team: squad.number,
            group,
            name: &candidate.name,
            vocation: candidate.vocation.short(),
            roles: roles.join("; "),
            priority: candidate.priority,
            backup,
            meets_requirements: squad.meets_requirements,
        }
    }
}

/// Writes every squad member and backup as CSV rows
pub fn write_squads_csv<W: Write>(squads: &[Squad], writer: W) -> Result<(), ExportError> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);

    for squad in squads {
        match &squad.sub_parties {
            Some(parties) => {
                for party in parties {
                    for candidate in &party.members {
                        wtr.serialize(ExportRow::new(squad, &party.label, candidate, false))?;
                    }
                }
            }
            None => {
                for candidate in &squad.members {
                    wtr.serialize(ExportRow::new(squad, "", candidate, false))?;
                }
            }
        }
        for candidate in &squad.backups {
            wtr.serialize(ExportRow::new(squad, "", candidate, true))?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Renders the CSV export into a string
pub fn squads_to_csv(squads: &[Squad]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_squads_csv(squads, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Exports the squads to a CSV file, replacing any previous export
pub fn export_squads_to_csv(squads: &[Squad], csv_path: &Path) -> Result<(), ExportError> {
    let file = File::create(csv_path)?;
    write_squads_csv(squads, file)
}
