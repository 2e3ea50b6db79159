//! Gap-free constructive builder.
//!
//! Produces the initial timetable every search strategy starts from.
//! Instructors are processed in a seeded random order; each instructor's
//! projects are packed into contiguous slots of one anchor classroom so
//! that rooms fill front-to-back without holes, then adjacent instructors
//! in each room's arrival order are paired as mutual jury members.
//!
//! # Algorithm
//!
//! 1. **Seek**: scan `(timeslot, classroom)` cells in slot order for the
//!    first one that is free and does not clash with the instructor's
//!    existing slots; that classroom becomes the instructor's anchor.
//! 2. **Pack**: place the instructor's remaining projects in the anchor
//!    room at the next free, non-clashing slots, strictly forward; when
//!    the anchor runs out, fall back to the globally earliest free cell.
//! 3. **Pair**: walk each room's instructor-arrival order and add each
//!    adjacent pair as jury on the other's final defenses; finals still
//!    lacking a jury get any free instructor, and finals with no possible
//!    jury are dropped and surface in coverage reports.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::conflict::resolve_conflicts;
use crate::constraints::BoolMatrix;
use crate::models::{Assignment, DefenseProblem, ProjectKind, Solution};

/// Constructive builder producing gap-free initial timetables.
///
/// # Example
/// ```
/// use defense_scheduler::builder::GapFreeBuilder;
/// use defense_scheduler::models::{Classroom, DefenseProblem, Instructor, Project, TimeSlot};
///
/// let problem = DefenseProblem::new(
///     vec![Instructor::faculty("I1")],
///     vec![Project::interim("P1", "I1")],
///     vec![Classroom::new("C1", 30)],
///     vec![TimeSlot::at("T1", 9, 0, 30)],
/// )
/// .unwrap();
/// let solution = GapFreeBuilder::new().build(&problem);
/// assert_eq!(solution.assignment_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GapFreeBuilder {
    seed: u64,
}

impl GapFreeBuilder {
    /// Creates a builder with seed 0.
    pub fn new() -> Self {
        Self { seed: 0 }
    }

    /// Sets the seed driving the instructor processing order.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds an initial solution and resolves any residual
    /// double-bookings before returning it.
    pub fn build(&self, problem: &DefenseProblem) -> Solution {
        let slots = problem.timeslot_count();
        let rooms = problem.classroom_count();

        let mut cell_used = BoolMatrix::new(rooms, slots);
        let mut instructor_busy = BoolMatrix::new(problem.instructor_count(), slots);
        // Instructor dense indices in first-assignment order, per room.
        let mut arrivals: Vec<Vec<usize>> = vec![Vec::new(); rooms];
        let mut solution = Solution::new();

        // Group projects by responsible instructor, ladder-ordered within
        // each group.
        let mut by_instructor: Vec<Vec<usize>> = vec![Vec::new(); problem.instructor_count()];
        for (p_idx, project) in problem.projects().iter().enumerate() {
            let owner = problem
                .instructor_index(&project.responsible_instructor_id)
                .expect("responsible resolved at load time");
            by_instructor[owner].push(p_idx);
        }
        for group in &mut by_instructor {
            group.sort_by(|&a, &b| {
                let pa = &problem.projects()[a];
                let pb = &problem.projects()[b];
                pa.priority_rank()
                    .cmp(&pb.priority_rank())
                    .then_with(|| pa.id.cmp(&pb.id))
            });
        }

        let mut order: Vec<usize> = (0..problem.instructor_count())
            .filter(|&i| !by_instructor[i].is_empty())
            .collect();
        let mut rng = SmallRng::seed_from_u64(self.seed);
        order.shuffle(&mut rng);

        for &instructor in &order {
            let mut anchor: Option<usize> = None;
            let mut cursor = 0usize;

            for &p_idx in &by_instructor[instructor] {
                let placed = match anchor {
                    // Seek: globally earliest free, non-clashing cell.
                    None => first_free_cell(&cell_used, &instructor_busy, instructor, 0, None),
                    // Pack: anchor room, strictly forward; global fallback.
                    Some(room) => first_free_cell(
                        &cell_used,
                        &instructor_busy,
                        instructor,
                        cursor,
                        Some(room),
                    )
                    .or_else(|| {
                        first_free_cell(&cell_used, &instructor_busy, instructor, 0, None)
                    }),
                };

                let Some((room, slot)) = placed else {
                    warn!(
                        project = %problem.projects()[p_idx].id,
                        "no free cell left; project unassigned"
                    );
                    continue;
                };

                cell_used.set(room, slot);
                instructor_busy.set(instructor, slot);
                if anchor.is_none() {
                    anchor = Some(room);
                }
                cursor = slot + 1;
                if !arrivals[room].contains(&instructor) {
                    arrivals[room].push(instructor);
                }

                let project = &problem.projects()[p_idx];
                solution.add_assignment(Assignment::new(
                    &project.id,
                    &problem.classrooms()[room].id,
                    &problem.timeslot_at(slot).id,
                    &project.responsible_instructor_id,
                ));
            }
        }

        self.pair_juries(problem, &mut solution, &arrivals, &mut instructor_busy);
        self.fill_missing_juries(problem, &mut solution, &mut instructor_busy);

        let moved = resolve_conflicts(&mut solution, problem);
        if moved > 0 {
            debug!(moved, "post-construction conflict resolution");
        }
        solution.canonicalize();
        solution
    }

    /// Pairs adjacent instructors in each room's arrival order as mutual
    /// jury members on each other's final defenses.
    fn pair_juries(
        &self,
        problem: &DefenseProblem,
        solution: &mut Solution,
        arrivals: &[Vec<usize>],
        instructor_busy: &mut BoolMatrix,
    ) {
        for (room, order) in arrivals.iter().enumerate() {
            let room_id = &problem.classrooms()[room].id;
            for pair in order.windows(2) {
                self.add_jury_for(problem, solution, room_id, pair[0], pair[1], instructor_busy);
                self.add_jury_for(problem, solution, room_id, pair[1], pair[0], instructor_busy);
            }
        }
    }

    /// Adds `juror` to every final defense `owner` holds in `room_id`,
    /// where the juror is free, distinct, and not already seated.
    fn add_jury_for(
        &self,
        problem: &DefenseProblem,
        solution: &mut Solution,
        room_id: &str,
        owner: usize,
        juror: usize,
        instructor_busy: &mut BoolMatrix,
    ) {
        let owner_id = problem.instructors()[owner].id.as_str();
        let juror_id = problem.instructors()[juror].id.as_str();
        for a in &mut solution.assignments {
            if a.classroom_id != *room_id || a.responsible_instructor() != owner_id {
                continue;
            }
            let Some(project) = problem.project_by_id(&a.project_id) else {
                continue;
            };
            if project.kind != ProjectKind::Final
                || a.has_instructor(juror_id)
                || juror_id == owner_id
            {
                continue;
            }
            let Some(slot) = problem.timeslot_order(&a.timeslot_id) else {
                continue;
            };
            if instructor_busy.get(juror, slot) {
                continue;
            }
            instructor_busy.set(juror, slot);
            a.instructor_ids.push(juror_id.to_string());
        }
    }

    /// Last pass for finals the pairing walk could not serve: seat any
    /// free instructor, or drop the assignment when none exists.
    fn fill_missing_juries(
        &self,
        problem: &DefenseProblem,
        solution: &mut Solution,
        instructor_busy: &mut BoolMatrix,
    ) {
        let mut dropped: Vec<usize> = Vec::new();
        for (i, a) in solution.assignments.iter_mut().enumerate() {
            let Some(project) = problem.project_by_id(&a.project_id) else {
                continue;
            };
            if project.kind != ProjectKind::Final || !a.jury().is_empty() {
                continue;
            }
            let Some(slot) = problem.timeslot_order(&a.timeslot_id) else {
                continue;
            };
            let responsible = a.responsible_instructor().to_string();
            let candidate = problem
                .instructors()
                .iter()
                .enumerate()
                .find(|(idx, instructor)| {
                    instructor.id != responsible && !instructor_busy.get(*idx, slot)
                });
            match candidate {
                Some((idx, instructor)) => {
                    instructor_busy.set(idx, slot);
                    a.instructor_ids.push(instructor.id.clone());
                }
                None => {
                    warn!(
                        project = %a.project_id,
                        "no eligible jury candidate; dropping assignment"
                    );
                    dropped.push(i);
                }
            }
        }
        for &i in dropped.iter().rev() {
            solution.assignments.remove(i);
        }
    }
}

impl Default for GapFreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Earliest free cell at or after `from_slot` where the instructor is
/// free. Slot-major scan; `room_filter` restricts the search to one room.
fn first_free_cell(
    cell_used: &BoolMatrix,
    instructor_busy: &BoolMatrix,
    instructor: usize,
    from_slot: usize,
    room_filter: Option<usize>,
) -> Option<(usize, usize)> {
    let rooms = cell_used.rows();
    let slots = cell_used.cols();
    for slot in from_slot..slots {
        if instructor_busy.get(instructor, slot) {
            continue;
        }
        match room_filter {
            Some(room) => {
                if !cell_used.get(room, slot) {
                    return Some((room, slot));
                }
            }
            None => {
                for room in 0..rooms {
                    if !cell_used.get(room, slot) {
                        return Some((room, slot));
                    }
                }
            }
        }
    }
    None
}
