//! Shared neighbor-move operators.
//!
//! Every strategy perturbs candidate timetables through the same three
//! structural moves: swap two assignments' classrooms, swap two
//! assignments' time slots, or reseat a final defense's jury. Moves can
//! produce infeasible placements; the runner rejects those before scoring.

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::models::{DefenseProblem, ProjectKind, Solution};

/// Swaps the classrooms of two random assignments. Returns `false` when
/// the solution is too small to move.
pub fn swap_classrooms<R: Rng>(solution: &mut Solution, rng: &mut R) -> bool {
    let Some((i, j)) = pick_pair(solution.assignments.len(), rng) else {
        return false;
    };
    let room_i = solution.assignments[i].classroom_id.clone();
    let room_j = solution.assignments[j].classroom_id.clone();
    solution.assignments[i].classroom_id = room_j;
    solution.assignments[j].classroom_id = room_i;
    true
}

/// Swaps the time slots of two random assignments. Returns `false` when
/// the solution is too small to move.
pub fn swap_timeslots<R: Rng>(solution: &mut Solution, rng: &mut R) -> bool {
    let Some((i, j)) = pick_pair(solution.assignments.len(), rng) else {
        return false;
    };
    let slot_i = solution.assignments[i].timeslot_id.clone();
    let slot_j = solution.assignments[j].timeslot_id.clone();
    solution.assignments[i].timeslot_id = slot_j;
    solution.assignments[j].timeslot_id = slot_i;
    true
}

/// Reseats the jury of a random final defense with a random other
/// instructor. The responsible instructor always keeps the panel head.
pub fn resample_jury<R: Rng>(
    solution: &mut Solution,
    problem: &DefenseProblem,
    rng: &mut R,
) -> bool {
    let finals: Vec<usize> = solution
        .assignments
        .iter()
        .enumerate()
        .filter(|(_, a)| {
            problem
                .project_by_id(&a.project_id)
                .is_some_and(|p| p.kind == ProjectKind::Final)
        })
        .map(|(i, _)| i)
        .collect();
    let Some(&index) = finals.choose(rng) else {
        return false;
    };

    let responsible = solution.assignments[index].responsible_instructor().to_string();
    let candidates: Vec<&str> = problem
        .instructors()
        .iter()
        .map(|i| i.id.as_str())
        .filter(|id| *id != responsible)
        .collect();
    let Some(&juror) = candidates.choose(rng) else {
        return false;
    };

    let panel = &mut solution.assignments[index].instructor_ids;
    panel.truncate(1);
    panel.push(juror.to_string());
    true
}

/// Applies one randomly chosen move. Returns `false` if the chosen move
/// had nothing to act on.
pub fn random_move<R: Rng>(
    solution: &mut Solution,
    problem: &DefenseProblem,
    rng: &mut R,
) -> bool {
    match rng.random_range(0..3) {
        0 => swap_classrooms(solution, rng),
        1 => swap_timeslots(solution, rng),
        _ => resample_jury(solution, problem, rng),
    }
}

/// Clones the current solution and applies one random move to the copy.
pub fn neighbor_of<R: Rng>(
    current: &Solution,
    problem: &DefenseProblem,
    rng: &mut R,
) -> Solution {
    let mut next = current.clone();
    random_move(&mut next, problem, rng);
    next
}

/// Two distinct indices below `len`, or `None` when fewer than two exist.
fn pick_pair<R: Rng>(len: usize, rng: &mut R) -> Option<(usize, usize)> {
    if len < 2 {
        return None;
    }
    let i = rng.random_range(0..len);
    let mut j = rng.random_range(0..len - 1);
    if j >= i {
        j += 1;
    }
    Some((i, j))
}
