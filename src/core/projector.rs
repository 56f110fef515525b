use crate::core::slots::{SlotGraph, SlotPair};
use crate::models::{Assignments, Cohorts};

/// Map matched slot pairs back to participant ids, keyed by mentor
///
/// Pairs are visited in mentor-slot order so the mentee lists are stable for
/// a given matching. Lists accumulate: when two slots of the same people are
/// matched to each other the mentee appears twice, unless `deduplicate` is
/// set. Mentors without any pair are left out.
pub fn project(
    graph: &SlotGraph,
    pairs: &[SlotPair],
    cohorts: &Cohorts,
    deduplicate: bool,
) -> Assignments {
    let mut ordered: Vec<SlotPair> = pairs.to_vec();
    ordered.sort_by_key(|p| (p.mentor_slot, p.mentee_slot));

    let mut assignments = Assignments::new();
    for pair in ordered {
        let mentor = &cohorts.mentors[graph.mentor_slots()[pair.mentor_slot].participant];
        let mentee = &cohorts.mentees[graph.mentee_slots()[pair.mentee_slot].participant];

        let mentees = assignments.entry(mentor.id.clone()).or_default();
        if deduplicate && mentees.contains(&mentee.id) {
            continue;
        }
        mentees.push(mentee.id.clone());
    }
    assignments
}
