use crate::parser::Member;

use super::types::{Candidate, Encounter, UNRANKED};

/// Builds the admission pool for one encounter: one candidate per signed vocation
pub fn build_candidates(members: &[Member], encounter: Encounter) -> Vec<Candidate> {
    let mut pool = Vec::new();

    for member in members {
        let roles = member.boss_roles.get(&encounter).cloned().unwrap_or_default();
        let preference = member.vocation_priority.get(&encounter);

        for vocation in member.vocations_for(encounter) {
            let vocation_priority_rank = preference
                .and_then(|list| list.iter().position(|&v| v == vocation))
                .map(|idx| idx as u32)
                .unwrap_or(UNRANKED);

            pool.push(Candidate {
                user_id: member.id,
                name: member.name.clone(),
                vocation,
                priority: member.priority,
                roles: roles.clone(),
                vocation_priority_rank,
            });
        }
    }

    pool
}
