use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The five canonical vocations, in requirement-table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Vocation {
    #[serde(rename = "EK")]
    EliteKnight,
    #[serde(rename = "ED")]
    ElderDruid,
    #[serde(rename = "MS")]
    MasterSorcerer,
    #[serde(rename = "RP")]
    RoyalPaladin,
    #[serde(rename = "EM")]
    ExaltedMonk,
}

impl Vocation {
    pub const ALL: [Vocation; 5] = [
        Vocation::EliteKnight,
        Vocation::ElderDruid,
        Vocation::MasterSorcerer,
        Vocation::RoyalPaladin,
        Vocation::ExaltedMonk,
    ];

    /// Normalizes free sign-up text ("Elite Knight", "ek", "MONK") to a vocation
    pub fn from_alias(text: &str) -> Option<Vocation> {
        let key: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "ek" | "eliteknight" => Some(Vocation::EliteKnight),
            "ed" | "elderdruid" => Some(Vocation::ElderDruid),
            "ms" | "mastersorcerer" => Some(Vocation::MasterSorcerer),
            "rp" | "royalpaladin" => Some(Vocation::RoyalPaladin),
            "em" | "exaltedmonk" | "monk" => Some(Vocation::ExaltedMonk),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Vocation::EliteKnight => "Elite Knight",
            Vocation::ElderDruid => "Elder Druid",
            Vocation::MasterSorcerer => "Master Sorcerer",
            Vocation::RoyalPaladin => "Royal Paladin",
            Vocation::ExaltedMonk => "Exalted Monk",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Vocation::EliteKnight => "EK",
            Vocation::ElderDruid => "ED",
            Vocation::MasterSorcerer => "MS",
            Vocation::RoyalPaladin => "RP",
            Vocation::ExaltedMonk => "EM",
        }
    }

    /// Sorcerers and paladins count towards the ranged totals
    pub fn is_ranged(self) -> bool {
        matches!(self, Vocation::MasterSorcerer | Vocation::RoyalPaladin)
    }
}

impl fmt::Display for Vocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Boss encounters, one per letter of the code alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Encounter {
    P,
    Z,
    F,
    H,
    L,
    C,
    D,
}

impl Encounter {
    pub const ALPHABET: &'static str = "PZFHLCD";

    pub const ALL: [Encounter; 7] = [
        Encounter::P,
        Encounter::Z,
        Encounter::F,
        Encounter::H,
        Encounter::L,
        Encounter::C,
        Encounter::D,
    ];

    pub fn from_code(code: char) -> Option<Encounter> {
        match code.to_ascii_uppercase() {
            'P' => Some(Encounter::P),
            'Z' => Some(Encounter::Z),
            'F' => Some(Encounter::F),
            'H' => Some(Encounter::H),
            'L' => Some(Encounter::L),
            'C' => Some(Encounter::C),
            'D' => Some(Encounter::D),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Encounter::P => 'P',
            Encounter::Z => 'Z',
            Encounter::F => 'F',
            Encounter::H => 'H',
            Encounter::L => 'L',
            Encounter::C => 'C',
            Encounter::D => 'D',
        }
    }

    pub fn boss_name(self) -> &'static str {
        match self {
            Encounter::P => "Pale",
            Encounter::Z => "Zelos",
            Encounter::F => "Ferumbras",
            Encounter::H => "Heart of Destruction",
            Encounter::L => "Last Lore Keeper",
            Encounter::C => "Cults",
            Encounter::D => "The First Dragon",
        }
    }
}

impl fmt::Display for Encounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Auxiliary tags a coordinator can hang on a member for one encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Red Knight")]
    RedKnight,
    Mentor,
    Virgin,
    Tank,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::RedKnight => "Red Knight",
            Role::Mentor => "Mentor",
            Role::Virgin => "Virgin",
            Role::Tank => "Tank",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rank given to a candidate whose vocation is not in the member's preference list
pub const UNRANKED: u32 = 999;

/// One (member, vocation) admission unit for a single encounter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub user_id: i64,
    pub name: String,
    pub vocation: Vocation,
    pub priority: u32,
    pub roles: Vec<Role>,
    pub vocation_priority_rank: u32,
}

impl Candidate {
    /// The single ordering used everywhere: priority, vocation preference, then name
    pub fn standard_cmp(&self, other: &Candidate) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.vocation_priority_rank.cmp(&other.vocation_priority_rank))
            .then_with(|| self.name.to_lowercase().cmp(&other.name.to_lowercase()))
    }
}

/// Stable sort by the standard candidate ordering
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| a.standard_cmp(b));
}

/// A labelled physical subdivision of a squad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubParty {
    pub label: String,
    pub members: Vec<Candidate>,
}

/// One assembled roster for one encounter attempt
///
/// A placeholder squad (capacity 0, no members) trails each encounter and
/// carries that encounter's backups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    pub encounter: Encounter,
    pub number: u32,
    pub capacity: usize,
    pub members: Vec<Candidate>,
    pub backups: Vec<Candidate>,
    pub meets_requirements: bool,
    pub sub_parties: Option<Vec<SubParty>>,
}

impl Squad {
    pub fn placeholder(encounter: Encounter, number: u32, backups: Vec<Candidate>) -> Squad {
        Squad {
            encounter,
            number,
            capacity: 0,
            members: Vec::new(),
            backups,
            meets_requirements: false,
            sub_parties: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.capacity == 0
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn vocation_counts(&self) -> VocationCounts {
        VocationCounts::tally(&self.members)
    }
}

/// Per-vocation headcount of a group of candidates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocationCounts(BTreeMap<Vocation, usize>);

impl VocationCounts {
    pub fn tally<'a, I>(candidates: I) -> VocationCounts
    where
        I: IntoIterator<Item = &'a Candidate>,
    {
        let mut counts = VocationCounts::default();
        for candidate in candidates {
            counts.add(candidate.vocation);
        }
        counts
    }

    pub fn add(&mut self, vocation: Vocation) {
        *self.0.entry(vocation).or_insert(0) += 1;
    }

    pub fn get(&self, vocation: Vocation) -> usize {
        self.0.get(&vocation).copied().unwrap_or(0)
    }

    pub fn ranged(&self) -> usize {
        Vocation::ALL
            .iter()
            .filter(|v| v.is_ranged())
            .map(|&v| self.get(v))
            .sum()
    }

    /// Non-zero entries in vocation order
    pub fn iter(&self) -> impl Iterator<Item = (Vocation, usize)> + '_ {
        self.0.iter().filter(|(_, &n)| n > 0).map(|(&v, &n)| (v, n))
    }
}
