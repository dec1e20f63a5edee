pub mod types;
pub mod requirements;
pub mod candidates;
pub mod allocator;
pub mod split;
pub mod merge;
pub mod validate;
pub mod generate;

pub use types::{Candidate, Encounter, Role, Squad, SubParty, Vocation, VocationCounts};
pub use requirements::Requirement;
pub use candidates::build_candidates;
pub use allocator::{allocate, Allocation};
pub use split::split_sub_parties;
pub use merge::merge_underfilled;
pub use validate::{refresh, revalidate};
pub use generate::generate;
