use super::requirements::Requirement;
use super::types::Squad;

/// Recomputes whether a squad, possibly hand-edited, meets its requirement
pub fn revalidate(squad: &Squad, requirement: &Requirement) -> bool {
    requirement.is_met_by(&squad.vocation_counts())
}

/// Refreshes the conformance flag in place; safe to call repeatedly
pub fn refresh(squad: &mut Squad) -> bool {
    squad.meets_requirements = if squad.is_placeholder() {
        false
    } else {
        revalidate(squad, &Requirement::for_encounter(squad.encounter))
    };
    squad.meets_requirements
}
