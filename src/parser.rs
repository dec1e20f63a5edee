use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, SpecError};
use crate::squad::{Encounter, Role, Vocation};

/// A person who signed up, possibly under several vocations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub priority: u32,
    pub vocation_to_teams: BTreeMap<Vocation, BTreeSet<Encounter>>,
    pub boss_roles: BTreeMap<Encounter, Vec<Role>>,
    pub vocation_priority: BTreeMap<Encounter, Vec<Vocation>>,
}

impl Member {
    fn new(id: i64, name: String, priority: u32) -> Member {
        Member {
            id,
            name,
            priority,
            vocation_to_teams: BTreeMap::new(),
            boss_roles: BTreeMap::new(),
            vocation_priority: BTreeMap::new(),
        }
    }

    /// Vocations this member signed for the given encounter
    pub fn vocations_for(&self, encounter: Encounter) -> impl Iterator<Item = Vocation> + '_ {
        self.vocation_to_teams
            .iter()
            .filter(move |(_, teams)| teams.contains(&encounter))
            .map(|(&vocation, _)| vocation)
    }

    /// Encounters this member signed for under any vocation, in alphabet order
    pub fn encounters(&self) -> Vec<Encounter> {
        Encounter::ALL
            .iter()
            .copied()
            .filter(|e| self.vocations_for(*e).next().is_some())
            .collect()
    }
}

/// One requested encounter with how many squads to build for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterRequest {
    pub encounter: Encounter,
    pub count: u32,
}

fn signup_regex() -> &'static Regex {
    static SIGNUP: OnceLock<Regex> = OnceLock::new();
    SIGNUP.get_or_init(|| Regex::new(r"(?i)\(([^)]+)\)\s*([PZFHLCD]+)").expect("valid sign-up pattern"))
}

fn spec_token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"^([PZFHLCD])(\d*)$").expect("valid encounter code pattern"))
}

/// Rolling 32-bit string hash over UTF-16 code units
fn hash_name(name: &str) -> i32 {
    name.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32))
}

/// Stable member id derived from the display name
pub fn member_id(name: &str) -> i64 {
    let h = hash_name(name).unsigned_abs() as i64;
    -(h % 1_000_000 + 1000)
}

/// Extracts the character name: everything before the first '(' minus up to two leading '@'
fn parse_name(line: &str) -> Option<String> {
    let head = line.split('(').next().unwrap_or("").trim();
    let head = head.strip_prefix('@').unwrap_or(head);
    let name = head.strip_prefix('@').unwrap_or(head).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Parses every `(vocation) CODES` group of a line; unknown vocations are dropped
fn parse_signups(line: &str) -> Vec<(Vocation, Vec<Encounter>)> {
    signup_regex()
        .captures_iter(line)
        .filter_map(|caps| {
            let vocation = Vocation::from_alias(caps.get(1)?.as_str().trim())?;
            let codes = caps
                .get(2)
                .map(|m| m.as_str().chars().filter_map(Encounter::from_code).collect())
                .unwrap_or_default();
            Some((vocation, codes))
        })
        .collect()
}

/// Parses a sign-up roster into members, in first-appearance order
///
/// Lines look like `[@]Name (Vocation) CODES[ (Vocation) CODES ...]`. Blank
/// lines and lines starting with `#` are ignored, as is any line without a
/// name or without at least one `(vocation) CODES` group. Lines resolving to
/// the same member id are merged and the last-seen spelling of the name wins.
pub fn parse_roster(text: &str) -> Vec<Member> {
    let mut members: Vec<Member> = Vec::new();
    // Track position by id so repeated lines merge in place
    let mut index_by_id: HashMap<i64, usize> = HashMap::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let name = match parse_name(trimmed) {
            Some(name) => name,
            None => continue,
        };

        let signups = parse_signups(trimmed);
        if signups.is_empty() {
            continue;
        }

        let id = member_id(&name);
        let idx = *index_by_id.entry(id).or_insert_with(|| {
            members.push(Member::new(id, name.clone(), members.len() as u32));
            members.len() - 1
        });

        let member = &mut members[idx];
        member.name = name;
        for (vocation, codes) in signups {
            member
                .vocation_to_teams
                .entry(vocation)
                .or_default()
                .extend(codes);
        }
    }

    members
}

/// Parses a roster and reports an import failure when nothing was recognised
pub fn import_roster(text: &str) -> Result<Vec<Member>, ImportError> {
    let members = parse_roster(text);
    if members.is_empty() {
        return Err(ImportError::NoMembers);
    }
    Ok(members)
}

/// Parses an encounter spec such as `P2 Z1 F`
///
/// Unrecognised tokens are dropped and a missing or zero count means 1.
/// Repeated codes fold into their first occurrence.
pub fn parse_encounter_spec(input: &str) -> Vec<EncounterRequest> {
    let mut requests: Vec<EncounterRequest> = Vec::new();

    for token in input.to_uppercase().split_whitespace() {
        let caps = match spec_token_regex().captures(token) {
            Some(caps) => caps,
            None => continue,
        };
        let encounter = match caps[1].chars().next().and_then(Encounter::from_code) {
            Some(encounter) => encounter,
            None => continue,
        };
        let digits = &caps[2];
        let count = if digits.is_empty() {
            1
        } else {
            // digit runs too long for u32 saturate
            digits.parse::<u32>().unwrap_or(u32::MAX).max(1)
        };

        match requests.iter_mut().find(|r| r.encounter == encounter) {
            Some(existing) => existing.count = existing.count.saturating_add(count),
            None => requests.push(EncounterRequest { encounter, count }),
        }
    }

    requests
}

/// Like [`parse_encounter_spec`] but an empty result is an error
pub fn require_encounter_spec(input: &str) -> Result<Vec<EncounterRequest>, SpecError> {
    let requests = parse_encounter_spec(input);
    if requests.is_empty() {
        return Err(SpecError::Empty(input.trim().to_string()));
    }
    Ok(requests)
}
