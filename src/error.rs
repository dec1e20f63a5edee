use thiserror::Error;

use crate::squad::Encounter;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImportError {
    #[error("no valid sign-ups found, check the format")]
    NoMembers,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpecError {
    #[error("no encounter codes in {0:?}, enter codes like P2 Z1 F1")]
    Empty(String),

    #[error("import sign-ups before generating squads")]
    NoRoster,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MoveError {
    #[error("squad {0} does not exist")]
    NoSuchSquad(usize),

    #[error("squad {squad} has no slot at {position}")]
    NoSuchSlot { squad: usize, position: String },

    #[error("cannot move a {from} candidate into a {to} squad")]
    CrossEncounter { from: Encounter, to: Encounter },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    #[error("no member with id {0}")]
    NoSuchMember(i64),

    #[error("member position {0} is out of range")]
    NoSuchPosition(usize),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("export write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("export produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
