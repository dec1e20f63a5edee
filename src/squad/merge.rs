use std::collections::HashSet;

use super::requirements::Requirement;
use super::types::{sort_candidates, Candidate, Squad};
use super::validate::revalidate;

/// True when the smallest of at least two non-empty squads is below half its capacity
fn needs_merge(squads: &[Squad]) -> bool {
    let filled: Vec<&Squad> = squads
        .iter()
        .filter(|s| !s.is_placeholder() && !s.is_empty())
        .collect();
    if filled.len() < 2 {
        return false;
    }
    filled
        .iter()
        .min_by_key(|s| s.members.len())
        .map_or(false, |s| s.members.len() < s.capacity.div_ceil(2))
}

/// Consolidates one encounter's squads when the leftovers are too small to run
///
/// Every member and backup is pooled, re-sorted and re-sliced into a single
/// squad; whatever does not fit becomes the backups of a trailing placeholder.
/// Squads that do not trigger the merge are returned unchanged.
pub fn merge_underfilled(squads: Vec<Squad>, requirement: &Requirement) -> Vec<Squad> {
    if !needs_merge(&squads) {
        return squads;
    }
    let encounter = squads[0].encounter;
    let capacity = squads
        .iter()
        .map(|s| s.capacity)
        .max()
        .unwrap_or(requirement.capacity);

    let mut pool: Vec<Candidate> = squads
        .into_iter()
        .flat_map(|s| s.members.into_iter().chain(s.backups))
        .collect();
    sort_candidates(&mut pool);

    let mut members = Vec::new();
    let mut backups = Vec::new();
    let mut placed: HashSet<i64> = HashSet::new();
    for candidate in pool {
        if members.len() < capacity && !placed.contains(&candidate.user_id) {
            placed.insert(candidate.user_id);
            members.push(candidate);
        } else {
            backups.push(candidate);
        }
    }

    let mut merged = Squad {
        encounter,
        number: 1,
        capacity,
        members,
        backups: Vec::new(),
        meets_requirements: false,
        sub_parties: None,
    };
    merged.meets_requirements = revalidate(&merged, requirement);

    vec![merged, Squad::placeholder(encounter, 2, backups)]
}
