//! Hard-constraint predicates over solutions.
//!
//! All functions here are pure and cheap; [`is_valid`] runs on every
//! candidate before it is scored. Double-booking checks go through a dense
//! boolean occupancy matrix rather than hash-set lookups.

use crate::models::{Assignment, DefenseProblem, Project, ProjectKind, Solution};

/// Dense row-major boolean matrix used for occupancy tracking.
#[derive(Debug, Clone)]
pub struct BoolMatrix {
    cols: usize,
    data: Vec<bool>,
}

impl BoolMatrix {
    /// Creates an all-false matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            data: vec![false; rows * cols],
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        if self.cols == 0 {
            0
        } else {
            self.data.len() / self.cols
        }
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data[row * self.cols + col]
    }

    /// Sets `(row, col)` and returns the previous value.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize) -> bool {
        let cell = &mut self.data[row * self.cols + col];
        std::mem::replace(cell, true)
    }

    /// Clears `(row, col)`.
    #[inline]
    pub fn clear(&mut self, row: usize, col: usize) {
        self.data[row * self.cols + col] = false;
    }
}

/// Minimum panel size for a project, and whether the panel head must be
/// the responsible instructor (always true for both kinds).
pub fn required_instructor_count(project: &Project) -> (usize, bool) {
    match project.kind {
        ProjectKind::Interim => (1, true),
        ProjectKind::Final => (2, true),
    }
}

/// Whether an assignment's panel satisfies the role rule for its project:
/// the responsible instructor leads, and final defenses carry at least one
/// jury member who is a different person.
pub fn role_rule_satisfied(assignment: &Assignment, project: &Project) -> bool {
    let Some(first) = assignment.instructor_ids.first() else {
        return false;
    };
    if first != &project.responsible_instructor_id {
        return false;
    }
    let (min_panel, _) = required_instructor_count(project);
    if assignment.instructor_ids.len() < min_panel {
        return false;
    }
    if project.kind == ProjectKind::Final {
        return assignment.jury().iter().any(|j| j != first);
    }
    true
}

/// Checks structural validity: each project placed at most once, each
/// `(classroom, timeslot)` cell used at most once, no instructor in two
/// places at one time, and every panel satisfying the role rule.
///
/// Gap-freeness is deliberately not checked here; it is enforced through
/// the fitness score so strategies can traverse gapped states.
pub fn is_valid(solution: &Solution, problem: &DefenseProblem) -> bool {
    placement_feasible(solution, problem) && roles_satisfied(solution, problem)
}

/// Checks the placement invariants only (unique project, free cell, free
/// instructors). Used for cheap pre-scoring rejection of neighbor moves.
pub fn placement_feasible(solution: &Solution, problem: &DefenseProblem) -> bool {
    let slots = problem.timeslot_count();
    let mut project_seen = vec![false; problem.project_count()];
    let mut cell_used = BoolMatrix::new(problem.classroom_count(), slots);
    let mut instructor_busy = BoolMatrix::new(problem.instructor_count(), slots);

    for a in &solution.assignments {
        let Some(project) = problem.project_index(&a.project_id) else {
            return false;
        };
        let Some(classroom) = problem.classroom_index(&a.classroom_id) else {
            return false;
        };
        let Some(slot) = problem.timeslot_order(&a.timeslot_id) else {
            return false;
        };

        if std::mem::replace(&mut project_seen[project], true) {
            return false;
        }
        if cell_used.set(classroom, slot) {
            return false;
        }
        for id in &a.instructor_ids {
            let Some(instructor) = problem.instructor_index(id) else {
                return false;
            };
            if instructor_busy.set(instructor, slot) {
                return false;
            }
        }
    }
    true
}

fn roles_satisfied(solution: &Solution, problem: &DefenseProblem) -> bool {
    solution.assignments.iter().all(|a| {
        problem
            .project_by_id(&a.project_id)
            .is_some_and(|p| role_rule_satisfied(a, p))
    })
}

/// Total number of unoccupied slot indices lying strictly inside some
/// classroom's occupied span.
pub fn classroom_gap_count(solution: &Solution, problem: &DefenseProblem) -> usize {
    let mut per_room: Vec<Vec<usize>> = vec![Vec::new(); problem.classroom_count()];
    for a in &solution.assignments {
        if let (Some(room), Some(slot)) = (
            problem.classroom_index(&a.classroom_id),
            problem.timeslot_order(&a.timeslot_id),
        ) {
            per_room[room].push(slot);
        }
    }
    per_room.iter().map(|orders| span_gaps(orders)).sum()
}

/// Total number of unoccupied slot indices lying strictly inside some
/// instructor's occupied span.
pub fn instructor_gap_count(solution: &Solution, problem: &DefenseProblem) -> usize {
    let mut per_instructor: Vec<Vec<usize>> = vec![Vec::new(); problem.instructor_count()];
    for a in &solution.assignments {
        let Some(slot) = problem.timeslot_order(&a.timeslot_id) else {
            continue;
        };
        for id in &a.instructor_ids {
            if let Some(instructor) = problem.instructor_index(id) {
                per_instructor[instructor].push(slot);
            }
        }
    }
    per_instructor.iter().map(|orders| span_gaps(orders)).sum()
}

/// Missing indices between the minimum and maximum of an occupied set.
fn span_gaps(orders: &[usize]) -> usize {
    if orders.len() < 2 {
        return 0;
    }
    let mut sorted = orders.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let span = sorted[sorted.len() - 1] - sorted[0] + 1;
    span - sorted.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, Instructor, Project, TimeSlot};

    fn sample_problem() -> DefenseProblem {
        DefenseProblem::new(
            vec![
                Instructor::faculty("I1"),
                Instructor::faculty("I2"),
                Instructor::assistant("I3"),
            ],
            vec![
                Project::interim("P1", "I1"),
                Project::final_defense("P2", "I2"),
                Project::interim("P3", "I3"),
            ],
            vec![Classroom::new("C1", 30), Classroom::new("C2", 30)],
            vec![
                TimeSlot::at("T1", 9, 0, 30),
                TimeSlot::at("T2", 9, 30, 30),
                TimeSlot::at("T3", 10, 0, 30),
                TimeSlot::at("T4", 10, 30, 30),
            ],
        )
        .unwrap()
    }

    fn valid_solution() -> Solution {
        let mut s = Solution::new();
        s.add_assignment(Assignment::new("P1", "C1", "T1", "I1"));
        s.add_assignment(Assignment::new("P2", "C1", "T2", "I2").with_jury("I1"));
        s.add_assignment(Assignment::new("P3", "C2", "T1", "I3"));
        s
    }

    #[test]
    fn test_valid_solution_passes() {
        let problem = sample_problem();
        assert!(is_valid(&valid_solution(), &problem));
    }

    #[test]
    fn test_duplicate_project_rejected() {
        let problem = sample_problem();
        let mut s = valid_solution();
        s.add_assignment(Assignment::new("P1", "C2", "T3", "I1"));
        assert!(!is_valid(&s, &problem));
    }

    #[test]
    fn test_cell_double_booking_rejected() {
        let problem = sample_problem();
        let mut s = Solution::new();
        s.add_assignment(Assignment::new("P1", "C1", "T1", "I1"));
        s.add_assignment(Assignment::new("P3", "C1", "T1", "I3"));
        assert!(!is_valid(&s, &problem));
        assert!(!placement_feasible(&s, &problem));
    }

    #[test]
    fn test_instructor_double_booking_rejected() {
        let problem = sample_problem();
        let mut s = Solution::new();
        s.add_assignment(Assignment::new("P1", "C1", "T1", "I1"));
        // I1 sits as jury elsewhere in the same slot.
        s.add_assignment(Assignment::new("P2", "C2", "T1", "I2").with_jury("I1"));
        assert!(!is_valid(&s, &problem));
    }

    #[test]
    fn test_role_rule() {
        let p_interim = Project::interim("P1", "I1");
        let p_final = Project::final_defense("P2", "I2");

        assert!(role_rule_satisfied(
            &Assignment::new("P1", "C1", "T1", "I1"),
            &p_interim
        ));
        // Wrong responsible at the head of the panel.
        assert!(!role_rule_satisfied(
            &Assignment::new("P1", "C1", "T1", "I2"),
            &p_interim
        ));
        // Final without a jury.
        assert!(!role_rule_satisfied(
            &Assignment::new("P2", "C1", "T1", "I2"),
            &p_final
        ));
        // Final with the responsible doubling as its own jury.
        assert!(!role_rule_satisfied(
            &Assignment::new("P2", "C1", "T1", "I2").with_jury("I2"),
            &p_final
        ));
        assert!(role_rule_satisfied(
            &Assignment::new("P2", "C1", "T1", "I2").with_jury("I1"),
            &p_final
        ));
    }

    #[test]
    fn test_final_without_jury_invalid() {
        let problem = sample_problem();
        let mut s = Solution::new();
        s.add_assignment(Assignment::new("P2", "C1", "T1", "I2"));
        assert!(placement_feasible(&s, &problem));
        assert!(!is_valid(&s, &problem));
    }

    #[test]
    fn test_required_instructor_count() {
        assert_eq!(
            required_instructor_count(&Project::interim("a", "I1")),
            (1, true)
        );
        assert_eq!(
            required_instructor_count(&Project::final_defense("b", "I1")),
            (2, true)
        );
    }

    #[test]
    fn test_classroom_gap_count() {
        let problem = sample_problem();
        let mut s = Solution::new();
        // C1 occupied at order 0 and 2: one gap at order 1.
        s.add_assignment(Assignment::new("P1", "C1", "T1", "I1"));
        s.add_assignment(Assignment::new("P3", "C1", "T3", "I3"));
        assert_eq!(classroom_gap_count(&s, &problem), 1);

        // Filling the hole removes the gap.
        s.add_assignment(Assignment::new("P2", "C1", "T2", "I2").with_jury("I1"));
        assert_eq!(classroom_gap_count(&s, &problem), 0);
    }

    #[test]
    fn test_instructor_gap_count() {
        let problem = sample_problem();
        let mut s = Solution::new();
        // I1 busy at orders 0 and 3 (responsible, then jury): two gaps.
        s.add_assignment(Assignment::new("P1", "C1", "T1", "I1"));
        s.add_assignment(Assignment::new("P2", "C1", "T4", "I2").with_jury("I1"));
        assert_eq!(instructor_gap_count(&s, &problem), 2);
    }

    #[test]
    fn test_gap_count_ignores_singletons() {
        let problem = sample_problem();
        let mut s = Solution::new();
        s.add_assignment(Assignment::new("P1", "C1", "T4", "I1"));
        assert_eq!(classroom_gap_count(&s, &problem), 0);
        assert_eq!(instructor_gap_count(&s, &problem), 0);
    }

    #[test]
    fn test_bool_matrix() {
        let mut m = BoolMatrix::new(2, 3);
        assert!(!m.get(1, 2));
        assert!(!m.set(1, 2));
        assert!(m.set(1, 2));
        m.clear(1, 2);
        assert!(!m.get(1, 2));
    }
}
