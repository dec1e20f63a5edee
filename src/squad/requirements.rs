use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{Encounter, Vocation, VocationCounts};

/// Inclusive headcount bounds for one vocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub min: usize,
    pub max: usize,
}

impl Bounds {
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && count <= self.max
    }
}

/// Structural composition rules layered on top of the per-vocation bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Rule {
    /// Sorcerers plus paladins must reach `ranged`
    MinRanged(usize),
    /// At least `min` of `vocation` and at least `ranged` ranged in total
    VocationAndRanged { vocation: Vocation, min: usize, ranged: usize },
    /// Only when `vocation` is at exactly `count`, every listed minimum must hold
    WhenExactly { vocation: Vocation, count: usize, then: Vec<(Vocation, usize)> },
}

impl Rule {
    pub fn holds(&self, counts: &VocationCounts) -> bool {
        match self {
            Rule::MinRanged(ranged) => counts.ranged() >= *ranged,
            Rule::VocationAndRanged { vocation, min, ranged } => {
                counts.get(*vocation) >= *min && counts.ranged() >= *ranged
            }
            Rule::WhenExactly { vocation, count, then } => {
                counts.get(*vocation) != *count
                    || then.iter().all(|&(v, min)| counts.get(v) >= min)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub bounds: BTreeMap<Vocation, Bounds>,
    pub capacity: usize,
    pub rules: Vec<Rule>,
}

impl Requirement {
    fn new(limits: [(usize, usize); 5], capacity: usize, rules: Vec<Rule>) -> Requirement {
        let bounds = Vocation::ALL
            .iter()
            .zip(limits.iter())
            .map(|(&v, &(min, max))| (v, Bounds { min, max }))
            .collect();
        Requirement { bounds, capacity, rules }
    }

    /// Requirement for a single encounter
    pub fn for_encounter(encounter: Encounter) -> Requirement {
        use Vocation::*;
        match encounter {
            Encounter::P => Requirement::new(
                [(1, 10), (1, 10), (0, 10), (0, 10), (0, 10)],
                10,
                vec![Rule::MinRanged(2)],
            ),
            Encounter::Z => Requirement::new(
                [(2, 3), (2, 10), (2, 10), (2, 10), (0, 10)],
                10,
                vec![Rule::WhenExactly {
                    vocation: EliteKnight,
                    count: 3,
                    then: vec![(ElderDruid, 3), (RoyalPaladin, 1)],
                }],
            ),
            Encounter::F => Requirement::new(
                [(2, 15), (2, 15), (0, 15), (0, 15), (0, 15)],
                15,
                vec![Rule::VocationAndRanged { vocation: MasterSorcerer, min: 1, ranged: 3 }],
            ),
            Encounter::H => Requirement::new(
                [(3, 6), (3, 15), (0, 15), (0, 15), (0, 15)],
                15,
                vec![Rule::VocationAndRanged { vocation: MasterSorcerer, min: 1, ranged: 5 }],
            ),
            Encounter::L => Requirement::new(
                [(4, 15), (4, 15), (0, 15), (0, 15), (0, 15)],
                15,
                vec![Rule::VocationAndRanged { vocation: MasterSorcerer, min: 1, ranged: 5 }],
            ),
            Encounter::C => Requirement::new(
                [(1, 10), (1, 10), (0, 10), (1, 10), (0, 10)],
                10,
                vec![Rule::MinRanged(2)],
            ),
            Encounter::D => Requirement::new(
                [(2, 15), (2, 15), (0, 15), (0, 15), (0, 15)],
                15,
                Vec::new(),
            ),
        }
    }

    /// Requirement for a raw code letter; letters outside the alphabet get the fallback
    pub fn for_code(code: char) -> Requirement {
        match Encounter::from_code(code) {
            Some(encounter) => Requirement::for_encounter(encounter),
            None => Requirement::fallback(),
        }
    }

    pub fn fallback() -> Requirement {
        Requirement::new([(1, 10), (1, 10), (1, 10), (1, 10), (0, 10)], 10, Vec::new())
    }

    pub fn bounds(&self, vocation: Vocation) -> Bounds {
        self.bounds
            .get(&vocation)
            .copied()
            .unwrap_or(Bounds { min: 0, max: self.capacity })
    }

    /// True when every bound and every structural rule holds for these counts
    pub fn is_met_by(&self, counts: &VocationCounts) -> bool {
        Vocation::ALL
            .iter()
            .all(|&v| self.bounds(v).contains(counts.get(v)))
            && self.rules.iter().all(|rule| rule.holds(counts))
    }
}
