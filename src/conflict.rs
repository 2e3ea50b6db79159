//! Instructor double-booking detection and resolution.
//!
//! A conflict is one instructor sitting on two panels in the same time
//! slot. Resolution moves one of the two clashing assignments to its next
//! earliest free cell and repeats until the timetable is conflict-free or
//! no legal destination remains.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constraints::BoolMatrix;
use crate::models::{DefenseProblem, Solution};

/// One instructor booked twice in the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// The double-booked instructor.
    pub instructor_id: String,
    /// The contested slot.
    pub timeslot_id: String,
    /// The two clashing projects.
    pub project_ids: (String, String),
}

/// Detects every instructor double-booking, pairwise and deduplicated.
pub fn detect_conflicts(solution: &Solution) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    let n = solution.assignments.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let a = &solution.assignments[i];
            let b = &solution.assignments[j];
            if a.timeslot_id != b.timeslot_id {
                continue;
            }
            for id in &a.instructor_ids {
                if b.has_instructor(id) {
                    conflicts.push(Conflict {
                        instructor_id: id.clone(),
                        timeslot_id: a.timeslot_id.clone(),
                        project_ids: (a.project_id.clone(), b.project_id.clone()),
                    });
                }
            }
        }
    }
    conflicts
}

/// Resolves double-bookings by moving the second assignment of each
/// clashing pair to its next earliest free cell. Returns the number of
/// assignments moved.
pub fn resolve_conflicts(solution: &mut Solution, problem: &DefenseProblem) -> usize {
    let mut moved = 0;
    // Each pass either moves an assignment or stops; the bound caps the
    // worst case when nothing is placeable.
    for _ in 0..solution.assignments.len().max(1) {
        let conflicts = detect_conflicts(solution);
        let Some(conflict) = conflicts.first() else {
            break;
        };

        let victim = solution
            .assignments
            .iter()
            .position(|a| a.project_id == conflict.project_ids.1)
            .expect("conflicting assignment present");

        match next_free_cell(solution, problem, victim) {
            Some((room, slot)) => {
                let a = &mut solution.assignments[victim];
                debug!(
                    project = %a.project_id,
                    instructor = %conflict.instructor_id,
                    from = %a.timeslot_id,
                    to = %problem.timeslot_at(slot).id,
                    "moving assignment to resolve double-booking"
                );
                a.classroom_id = problem.classrooms()[room].id.clone();
                a.timeslot_id = problem.timeslot_at(slot).id.clone();
                moved += 1;
            }
            None => break,
        }
    }
    moved
}

/// Earliest `(classroom, slot)` cell that is free and clear for the whole
/// panel of `solution.assignments[index]`, excluding its current slot.
fn next_free_cell(
    solution: &Solution,
    problem: &DefenseProblem,
    index: usize,
) -> Option<(usize, usize)> {
    let slots = problem.timeslot_count();
    let mut cell_used = BoolMatrix::new(problem.classroom_count(), slots);
    let mut instructor_busy = BoolMatrix::new(problem.instructor_count(), slots);

    for (i, a) in solution.assignments.iter().enumerate() {
        if i == index {
            continue;
        }
        let (Some(room), Some(slot)) = (
            problem.classroom_index(&a.classroom_id),
            problem.timeslot_order(&a.timeslot_id),
        ) else {
            continue;
        };
        cell_used.set(room, slot);
        for id in &a.instructor_ids {
            if let Some(instructor) = problem.instructor_index(id) {
                instructor_busy.set(instructor, slot);
            }
        }
    }

    let moving = &solution.assignments[index];
    let current_slot = problem.timeslot_order(&moving.timeslot_id);
    let panel: Vec<usize> = moving
        .instructor_ids
        .iter()
        .filter_map(|id| problem.instructor_index(id))
        .collect();

    (0..slots)
        .filter(|&slot| Some(slot) != current_slot)
        .find_map(|slot| {
            if panel.iter().any(|&p| instructor_busy.get(p, slot)) {
                return None;
            }
            (0..problem.classroom_count())
                .find(|&room| !cell_used.get(room, slot))
                .map(|room| (room, slot))
        })
}
