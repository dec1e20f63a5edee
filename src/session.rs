use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{EditError, ImportError, MoveError, SpecError};
use crate::parser::{import_roster, require_encounter_spec, EncounterRequest, Member};
use crate::squad::{generate, refresh, Candidate, Encounter, Role, Squad, Vocation};

/// Where a candidate sits inside one squad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Position {
    Member { index: usize },
    Backup { index: usize },
    SubParty { group: usize, index: usize },
}

/// A position within the session's squad list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRef {
    pub squad: usize,
    pub position: Position,
}

impl SlotRef {
    pub fn member(squad: usize, index: usize) -> SlotRef {
        SlotRef { squad, position: Position::Member { index } }
    }

    pub fn backup(squad: usize, index: usize) -> SlotRef {
        SlotRef { squad, position: Position::Backup { index } }
    }

    pub fn sub_party(squad: usize, group: usize, index: usize) -> SlotRef {
        SlotRef { squad, position: Position::SubParty { group, index } }
    }
}

fn no_slot(slot: SlotRef) -> MoveError {
    MoveError::NoSuchSlot { squad: slot.squad, position: format!("{:?}", slot.position) }
}

fn same_entry(a: &Candidate, b: &Candidate) -> bool {
    a.user_id == b.user_id && a.vocation == b.vocation
}

/// The roster and current squad set owned by one coordinator
///
/// Allocation only runs on `generate`/`regenerate`; member edits and moves
/// never re-run it. Every move revalidates the squads it touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    members: Vec<Member>,
    squads: Vec<Squad>,
    last_spec: Vec<EncounterRequest>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn squads(&self) -> &[Squad] {
        &self.squads
    }

    /// Replaces the roster; a roster with no recognisable sign-ups leaves the session untouched
    pub fn import(&mut self, text: &str) -> Result<usize, ImportError> {
        let members = import_roster(text)?;
        info!("imported {} member(s)", members.len());
        self.members = members;
        self.squads.clear();
        Ok(self.members.len())
    }

    pub fn generate(&mut self, spec: &str) -> Result<&[Squad], SpecError> {
        let requests = require_encounter_spec(spec)?;
        self.run(requests)
    }

    /// Re-runs the last encounter spec against the current roster
    pub fn regenerate(&mut self) -> Result<&[Squad], SpecError> {
        if self.last_spec.is_empty() {
            return Err(SpecError::Empty(String::new()));
        }
        self.run(self.last_spec.clone())
    }

    fn run(&mut self, requests: Vec<EncounterRequest>) -> Result<&[Squad], SpecError> {
        if self.members.is_empty() {
            return Err(SpecError::NoRoster);
        }
        self.squads = generate(&self.members, &requests);
        self.last_spec = requests;
        info!(
            "generated {} squad(s), {} non-conformant",
            self.squads.iter().filter(|s| !s.is_placeholder()).count(),
            self.squads
                .iter()
                .filter(|s| !s.is_placeholder() && !s.meets_requirements)
                .count()
        );
        Ok(self.squads.as_slice())
    }

    fn member_mut(&mut self, id: i64) -> Result<&mut Member, EditError> {
        self.members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(EditError::NoSuchMember(id))
    }

    pub fn set_priority(&mut self, id: i64, priority: u32) -> Result<(), EditError> {
        self.member_mut(id)?.priority = priority;
        Ok(())
    }

    /// Moves a member within the roster list and renumbers every priority by position
    pub fn reorder_member(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        if from >= self.members.len() {
            return Err(EditError::NoSuchPosition(from));
        }
        if to >= self.members.len() {
            return Err(EditError::NoSuchPosition(to));
        }
        let member = self.members.remove(from);
        self.members.insert(to, member);
        for (idx, member) in self.members.iter_mut().enumerate() {
            member.priority = idx as u32;
        }
        Ok(())
    }

    pub fn add_role(&mut self, id: i64, encounter: Encounter, role: Role) -> Result<(), EditError> {
        let roles = self.member_mut(id)?.boss_roles.entry(encounter).or_default();
        if !roles.contains(&role) {
            roles.push(role);
        }
        Ok(())
    }

    pub fn remove_role(&mut self, id: i64, encounter: Encounter, role: Role) -> Result<(), EditError> {
        if let Some(roles) = self.member_mut(id)?.boss_roles.get_mut(&encounter) {
            roles.retain(|r| *r != role);
        }
        Ok(())
    }

    /// Sets the preferred vocation order for one encounter; vocations the member
    /// did not sign for that encounter are ignored
    pub fn set_vocation_priority(
        &mut self,
        id: i64,
        encounter: Encounter,
        order: &[Vocation],
    ) -> Result<(), EditError> {
        let member = self.member_mut(id)?;
        let signed: Vec<Vocation> = member.vocations_for(encounter).collect();
        let mut ranked: Vec<Vocation> = Vec::new();
        for vocation in order {
            if signed.contains(vocation) && !ranked.contains(vocation) {
                ranked.push(*vocation);
            }
        }
        if ranked.is_empty() {
            member.vocation_priority.remove(&encounter);
        } else {
            member.vocation_priority.insert(encounter, ranked);
        }
        Ok(())
    }

    fn squad(&self, idx: usize) -> Result<&Squad, MoveError> {
        self.squads.get(idx).ok_or(MoveError::NoSuchSquad(idx))
    }

    /// Checks a slot exists; insert targets may point one past the end
    fn check_slot(&self, slot: SlotRef, inserting: bool) -> Result<(), MoveError> {
        let squad = self.squad(slot.squad)?;
        let slack = usize::from(inserting);
        let ok = match slot.position {
            Position::Member { index } => {
                !(inserting && squad.is_placeholder()) && index < squad.members.len() + slack
            }
            Position::Backup { index } => index < squad.backups.len() + slack,
            Position::SubParty { group, index } => squad
                .sub_parties
                .as_ref()
                .and_then(|parties| parties.get(group))
                .map_or(false, |party| index < party.members.len() + slack),
        };
        if ok {
            Ok(())
        } else {
            Err(no_slot(slot))
        }
    }

    fn take(&mut self, slot: SlotRef) -> Option<Candidate> {
        let squad = self.squads.get_mut(slot.squad)?;
        match slot.position {
            Position::Member { index } => {
                let candidate = squad.members.remove(index);
                if let Some(parties) = squad.sub_parties.as_mut() {
                    for party in parties.iter_mut() {
                        if let Some(pos) = party.members.iter().position(|c| same_entry(c, &candidate)) {
                            party.members.remove(pos);
                            break;
                        }
                    }
                }
                Some(candidate)
            }
            Position::Backup { index } => Some(squad.backups.remove(index)),
            Position::SubParty { group, index } => {
                let party = squad.sub_parties.as_mut()?.get_mut(group)?;
                let candidate = party.members.remove(index);
                if let Some(pos) = squad.members.iter().position(|c| same_entry(c, &candidate)) {
                    squad.members.remove(pos);
                }
                Some(candidate)
            }
        }
    }

    fn put(&mut self, slot: SlotRef, candidate: Candidate) {
        let squad = &mut self.squads[slot.squad];
        match slot.position {
            Position::Member { index } => {
                if let Some(parties) = squad.sub_parties.as_mut() {
                    if let Some(smallest) = parties.iter_mut().min_by_key(|p| p.members.len()) {
                        smallest.members.push(candidate.clone());
                    }
                }
                let at = index.min(squad.members.len());
                squad.members.insert(at, candidate);
            }
            Position::Backup { index } => {
                let at = index.min(squad.backups.len());
                squad.backups.insert(at, candidate);
            }
            Position::SubParty { group, index } => {
                if let Some(party) = squad.sub_parties.as_mut().and_then(|p| p.get_mut(group)) {
                    let at = index.min(party.members.len());
                    party.members.insert(at, candidate.clone());
                }
                squad.members.push(candidate);
            }
        }
    }

    /// Moves one candidate between slots of the same encounter and revalidates
    ///
    /// Moves that break the requirements are allowed; only the conformance
    /// flags change. Cross-encounter moves are rejected without side effects.
    pub fn move_candidate(&mut self, from: SlotRef, to: SlotRef) -> Result<(), MoveError> {
        let source = self.squad(from.squad)?.encounter;
        let target = self.squad(to.squad)?.encounter;
        if source != target {
            warn!("rejected move from {} squad {} to {} squad {}", source, from.squad, target, to.squad);
            return Err(MoveError::CrossEncounter { from: source, to: target });
        }
        self.check_slot(from, false)?;
        self.check_slot(to, true)?;

        let candidate = self.take(from).ok_or_else(|| no_slot(from))?;
        self.put(to, candidate);

        refresh(&mut self.squads[from.squad]);
        refresh(&mut self.squads[to.squad]);
        Ok(())
    }

    /// Recomputes every conformance flag without touching membership
    pub fn revalidate_all(&mut self) {
        for squad in &mut self.squads {
            refresh(squad);
        }
    }
}
