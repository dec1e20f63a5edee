use std::collections::HashSet;

use log::debug;

use crate::parser::{EncounterRequest, Member};

use super::allocator::allocate;
use super::candidates::build_candidates;
use super::merge::merge_underfilled;
use super::requirements::Requirement;
use super::split::split_sub_parties;
use super::types::{sort_candidates, Encounter, Squad};

/// Builds up to `count` squads for one encounter, then its backup placeholder
fn generate_encounter(members: &[Member], encounter: Encounter, count: u32) -> Vec<Squad> {
    let requirement = Requirement::for_encounter(encounter);
    let mut remaining = build_candidates(members, encounter);
    let mut squads = Vec::new();

    for number in 1..=count {
        if remaining.is_empty() {
            debug!("{}: pool exhausted before squad {}", encounter, number);
            break;
        }
        let allocation = allocate(&remaining, &requirement, requirement.capacity);
        debug!(
            "{}: squad {} has {}/{} members, meets requirements: {}",
            encounter,
            number,
            allocation.members.len(),
            requirement.capacity,
            allocation.meets_requirements
        );

        let used: HashSet<i64> = allocation.members.iter().map(|c| c.user_id).collect();
        remaining.retain(|c| !used.contains(&c.user_id));

        squads.push(Squad {
            encounter,
            number,
            capacity: requirement.capacity,
            members: allocation.members,
            backups: Vec::new(),
            meets_requirements: allocation.meets_requirements,
            sub_parties: None,
        });
    }

    if squads.is_empty() {
        return squads;
    }

    sort_candidates(&mut remaining);
    let next = squads.len() as u32 + 1;
    squads.push(Squad::placeholder(encounter, next, remaining));

    let mut squads = merge_underfilled(squads, &requirement);
    for squad in squads.iter_mut().filter(|s| !s.is_placeholder()) {
        squad.sub_parties = split_sub_parties(&squad.members, encounter);
    }
    squads
}

/// Generates squads for every requested encounter, in request order
///
/// Pure and deterministic: identical members and requests always give
/// identical squads in identical order.
pub fn generate(members: &[Member], requests: &[EncounterRequest]) -> Vec<Squad> {
    requests
        .iter()
        .flat_map(|request| generate_encounter(members, request.encounter, request.count))
        .collect()
}
