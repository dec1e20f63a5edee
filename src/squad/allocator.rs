use std::collections::{BTreeMap, HashSet};

use super::requirements::Requirement;
use super::types::{sort_candidates, Candidate, Vocation, VocationCounts};

/// Members chosen for one squad plus whether the strict pass produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub members: Vec<Candidate>,
    pub meets_requirements: bool,
}

/// Selection state shared by both passes; keyed by user id so a member
/// signed under several vocations is placed at most once
struct Selection {
    members: Vec<Candidate>,
    claimed: HashSet<i64>,
    counts: VocationCounts,
}

impl Selection {
    fn new() -> Selection {
        Selection {
            members: Vec::new(),
            claimed: HashSet::new(),
            counts: VocationCounts::default(),
        }
    }

    fn take(&mut self, candidate: &Candidate) {
        self.claimed.insert(candidate.user_id);
        self.counts.add(candidate.vocation);
        self.members.push(candidate.clone());
    }

    fn is_claimed(&self, candidate: &Candidate) -> bool {
        self.claimed.contains(&candidate.user_id)
    }

    /// Best unclaimed candidate of one vocation (partitions are pre-sorted)
    fn first_open<'a>(&self, partition: &'a [Candidate]) -> Option<&'a Candidate> {
        partition.iter().find(|c| !self.is_claimed(c))
    }
}

fn partition_by_vocation(sorted: &[Candidate]) -> BTreeMap<Vocation, Vec<Candidate>> {
    let mut by_vocation: BTreeMap<Vocation, Vec<Candidate>> = BTreeMap::new();
    for candidate in sorted {
        by_vocation
            .entry(candidate.vocation)
            .or_default()
            .push(candidate.clone());
    }
    by_vocation
}

/// Strict pass: reserve every minimum, fill greedily by priority, then verify.
/// Returns None when any minimum, bound or structural rule cannot be met.
fn strict_pass(
    by_vocation: &BTreeMap<Vocation, Vec<Candidate>>,
    requirement: &Requirement,
    capacity: usize,
) -> Option<Vec<Candidate>> {
    let mut selection = Selection::new();
    let empty = Vec::new();

    for vocation in Vocation::ALL {
        let min = requirement.bounds(vocation).min;
        let partition = by_vocation.get(&vocation).unwrap_or(&empty);
        let chosen: Vec<&Candidate> = partition
            .iter()
            .filter(|c| !selection.is_claimed(c))
            .take(min)
            .collect();
        if chosen.len() < min {
            return None;
        }
        for candidate in chosen {
            selection.take(candidate);
        }
    }

    if selection.members.len() > capacity {
        return None;
    }

    while selection.members.len() < capacity {
        let mut best: Option<&Candidate> = None;
        for vocation in Vocation::ALL {
            if selection.counts.get(vocation) >= requirement.bounds(vocation).max {
                continue;
            }
            let partition = by_vocation.get(&vocation).unwrap_or(&empty);
            if let Some(candidate) = selection.first_open(partition) {
                // Strictly lower priority wins; ties stay with the earlier vocation
                if best.map_or(true, |b| candidate.priority < b.priority) {
                    best = Some(candidate);
                }
            }
        }
        match best {
            Some(candidate) => selection.take(candidate),
            None => break,
        }
    }

    if requirement.is_met_by(&selection.counts) {
        Some(selection.members)
    } else {
        None
    }
}

/// Best-effort pass: minimums where possible, then global order within maximums.
/// Structural rules are not attempted.
fn best_effort_pass(
    sorted: &[Candidate],
    by_vocation: &BTreeMap<Vocation, Vec<Candidate>>,
    requirement: &Requirement,
    capacity: usize,
) -> Vec<Candidate> {
    let mut selection = Selection::new();

    for vocation in Vocation::ALL {
        let min = requirement.bounds(vocation).min;
        let partition = match by_vocation.get(&vocation) {
            Some(partition) => partition,
            None => continue,
        };
        let mut reserved = 0;
        for candidate in partition {
            if reserved >= min || selection.members.len() >= capacity {
                break;
            }
            if selection.is_claimed(candidate) {
                continue;
            }
            selection.take(candidate);
            reserved += 1;
        }
    }

    for candidate in sorted {
        if selection.members.len() >= capacity {
            break;
        }
        if selection.is_claimed(candidate) {
            continue;
        }
        if selection.counts.get(candidate.vocation) >= requirement.bounds(candidate.vocation).max {
            continue;
        }
        selection.take(candidate);
    }

    selection.members
}

/// Allocates one squad from a candidate pool
///
/// Never fails: when the strict pass cannot satisfy the requirement the
/// best-effort squad is returned flagged as not meeting requirements. An
/// empty pool yields an empty best-effort allocation.
pub fn allocate(pool: &[Candidate], requirement: &Requirement, capacity: usize) -> Allocation {
    let mut sorted = pool.to_vec();
    sort_candidates(&mut sorted);
    let by_vocation = partition_by_vocation(&sorted);

    match strict_pass(&by_vocation, requirement, capacity) {
        Some(members) => Allocation { members, meets_requirements: true },
        None => Allocation {
            members: best_effort_pass(&sorted, &by_vocation, requirement, capacity),
            meets_requirements: false,
        },
    }
}
