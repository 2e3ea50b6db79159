//! Solution (timetable) model.
//!
//! A solution is a set of assignments, each placing one project into a
//! `(classroom, timeslot)` cell with an ordered instructor panel. The
//! first panel member is always the project's responsible instructor.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::DefenseProblem;

/// A single placed defense: project, room, slot, and instructor panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned project ID.
    pub project_id: String,
    /// Classroom the defense takes place in.
    pub classroom_id: String,
    /// Time slot of the defense.
    pub timeslot_id: String,
    /// Panel in order; index 0 is the responsible instructor.
    pub instructor_ids: Vec<String>,
}

impl Assignment {
    /// Creates an assignment with the responsible instructor as the sole
    /// panel member.
    pub fn new(
        project_id: impl Into<String>,
        classroom_id: impl Into<String>,
        timeslot_id: impl Into<String>,
        responsible_instructor_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            classroom_id: classroom_id.into(),
            timeslot_id: timeslot_id.into(),
            instructor_ids: vec![responsible_instructor_id.into()],
        }
    }

    /// Appends a jury member to the panel.
    pub fn with_jury(mut self, instructor_id: impl Into<String>) -> Self {
        self.instructor_ids.push(instructor_id.into());
        self
    }

    /// The responsible instructor (first panel member).
    pub fn responsible_instructor(&self) -> &str {
        &self.instructor_ids[0]
    }

    /// The jury members (everyone after the responsible instructor).
    pub fn jury(&self) -> &[String] {
        &self.instructor_ids[1..]
    }

    /// Whether the given instructor sits on this panel in any role.
    pub fn has_instructor(&self, instructor_id: &str) -> bool {
        self.instructor_ids.iter().any(|i| i == instructor_id)
    }
}

/// A complete timetable: one assignment per scheduled project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Solution {
    /// Placed defenses.
    pub assignments: Vec<Assignment>,
}

impl Solution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Finds the assignment for a given project.
    pub fn assignment_for_project(&self, project_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.project_id == project_id)
    }

    /// Returns all assignments held in a classroom.
    pub fn assignments_in_classroom(&self, classroom_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.classroom_id == classroom_id)
            .collect()
    }

    /// Returns all assignments an instructor sits on, in any role.
    pub fn assignments_for_instructor(&self, instructor_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.has_instructor(instructor_id))
            .collect()
    }

    /// Sorts assignments by project ID. Canonical order for hashing,
    /// crossover, and stable output.
    pub fn canonicalize(&mut self) {
        self.assignments.sort_by(|a, b| a.project_id.cmp(&b.project_id));
    }

    /// Per-instructor assignment counts as a dense vector indexed by the
    /// problem's instructor indices. Jury seats count toward load.
    pub fn instructor_loads(&self, problem: &DefenseProblem) -> Vec<usize> {
        let mut loads = vec![0usize; problem.instructor_count()];
        for a in &self.assignments {
            for id in &a.instructor_ids {
                if let Some(idx) = problem.instructor_index(id) {
                    loads[idx] += 1;
                }
            }
        }
        loads
    }

    /// Structural hash over the canonically ordered assignment set.
    ///
    /// Entity IDs are hashed through the problem's dense indices, so two
    /// solutions hash equal iff they place the same projects in the same
    /// cells with the same panels.
    pub fn canonical_hash(&self, problem: &DefenseProblem) -> u64 {
        let mut ordered: Vec<&Assignment> = self.assignments.iter().collect();
        ordered.sort_by(|a, b| a.project_id.cmp(&b.project_id));

        let mut hasher = DefaultHasher::new();
        for a in ordered {
            hash_index(&mut hasher, problem.project_index(&a.project_id));
            hash_index(&mut hasher, problem.classroom_index(&a.classroom_id));
            hash_index(&mut hasher, problem.timeslot_order(&a.timeslot_id));
            a.instructor_ids.len().hash(&mut hasher);
            for id in &a.instructor_ids {
                hash_index(&mut hasher, problem.instructor_index(id));
            }
        }
        hasher.finish()
    }
}

fn hash_index(hasher: &mut DefaultHasher, index: Option<usize>) {
    match index {
        Some(i) => (i as u64 + 1).hash(hasher),
        None => 0u64.hash(hasher),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, Instructor, Project, TimeSlot};

    fn sample_problem() -> DefenseProblem {
        DefenseProblem::new(
            vec![Instructor::faculty("I1"), Instructor::faculty("I2")],
            vec![
                Project::interim("P1", "I1"),
                Project::final_defense("P2", "I2"),
            ],
            vec![Classroom::new("C1", 30), Classroom::new("C2", 30)],
            vec![
                TimeSlot::at("T1", 9, 0, 30),
                TimeSlot::at("T2", 9, 30, 30),
            ],
        )
        .unwrap()
    }

    fn sample_solution() -> Solution {
        let mut s = Solution::new();
        s.add_assignment(Assignment::new("P2", "C1", "T1", "I2").with_jury("I1"));
        s.add_assignment(Assignment::new("P1", "C1", "T2", "I1"));
        s
    }

    #[test]
    fn test_assignment_panel() {
        let a = Assignment::new("P1", "C1", "T1", "I1").with_jury("I2");
        assert_eq!(a.responsible_instructor(), "I1");
        assert_eq!(a.jury(), ["I2".to_string()]);
        assert!(a.has_instructor("I1"));
        assert!(a.has_instructor("I2"));
        assert!(!a.has_instructor("I3"));
    }

    #[test]
    fn test_solution_queries() {
        let s = sample_solution();
        assert_eq!(s.assignment_count(), 2);
        assert!(s.assignment_for_project("P1").is_some());
        assert!(s.assignment_for_project("P9").is_none());
        assert_eq!(s.assignments_in_classroom("C1").len(), 2);
        assert_eq!(s.assignments_in_classroom("C2").len(), 0);
        // I1 is responsible on P1 and jury on P2
        assert_eq!(s.assignments_for_instructor("I1").len(), 2);
        assert_eq!(s.assignments_for_instructor("I2").len(), 1);
    }

    #[test]
    fn test_instructor_loads() {
        let problem = sample_problem();
        let s = sample_solution();
        let loads = s.instructor_loads(&problem);
        assert_eq!(loads.len(), 2);
        assert_eq!(loads.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_canonicalize_orders_by_project() {
        let mut s = sample_solution();
        s.canonicalize();
        assert_eq!(s.assignments[0].project_id, "P1");
        assert_eq!(s.assignments[1].project_id, "P2");
    }

    #[test]
    fn test_canonical_hash_ignores_assignment_order() {
        let problem = sample_problem();
        let s1 = sample_solution();
        let mut s2 = sample_solution();
        s2.assignments.reverse();
        assert_eq!(s1.canonical_hash(&problem), s2.canonical_hash(&problem));
    }

    #[test]
    fn test_canonical_hash_detects_moves() {
        let problem = sample_problem();
        let s1 = sample_solution();
        let mut s2 = sample_solution();
        s2.assignments[1].classroom_id = "C2".into();
        assert_ne!(s1.canonical_hash(&problem), s2.canonical_hash(&problem));
    }
}
