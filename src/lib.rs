pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod parser;
pub mod session;
pub mod squad;
pub mod web;

pub use parser::{parse_encounter_spec, parse_roster, EncounterRequest, Member};
pub use session::{Position, Session, SlotRef};
pub use squad::{generate, Squad};
