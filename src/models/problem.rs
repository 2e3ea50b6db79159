//! Compiled problem instance.
//!
//! [`DefenseProblem`] takes the four raw input collections and compiles
//! them into the read-only form the engine works against: time slots
//! sorted by start time with dense order indices, `id -> index` maps for
//! every entity kind, and per-slot reward derivation. Projects whose
//! responsible instructor cannot be resolved are excluded up front and
//! kept on the side so the validator can report them as uncovered.

use std::collections::HashMap;

use tracing::warn;

use super::{Classroom, Instructor, Project, TimeSlot};
use crate::error::ConfigurationError;

/// Base reward of the earliest slot.
pub const SLOT_REWARD_BASE: f64 = 10.0;

/// Reward decrease per slot order index.
pub const SLOT_REWARD_STEP: f64 = 1.0;

/// A compiled, read-only scheduling problem instance.
///
/// # Example
/// ```
/// use defense_scheduler::models::{Classroom, DefenseProblem, Instructor, Project, TimeSlot};
///
/// let problem = DefenseProblem::new(
///     vec![Instructor::faculty("I1")],
///     vec![Project::interim("P1", "I1")],
///     vec![Classroom::new("C1", 30)],
///     vec![TimeSlot::at("T1", 9, 0, 30)],
/// )
/// .unwrap();
/// assert_eq!(problem.timeslot_order("T1"), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct DefenseProblem {
    instructors: Vec<Instructor>,
    projects: Vec<Project>,
    classrooms: Vec<Classroom>,
    timeslots: Vec<TimeSlot>,
    excluded_project_ids: Vec<String>,
    instructor_ids: HashMap<String, usize>,
    project_ids: HashMap<String, usize>,
    classroom_ids: HashMap<String, usize>,
    timeslot_ids: HashMap<String, usize>,
}

impl DefenseProblem {
    /// Compiles a problem instance from the raw input collections.
    ///
    /// Time slots are sorted by start time; their position after sorting is
    /// the order index used for all gap and adjacency reasoning. Projects
    /// referencing an unknown responsible instructor are excluded (logged,
    /// not fatal) and later surface in coverage reports.
    ///
    /// # Errors
    /// Returns a [`ConfigurationError`] if any entity pool is empty or two
    /// entities of one kind share an ID.
    pub fn new(
        instructors: Vec<Instructor>,
        projects: Vec<Project>,
        classrooms: Vec<Classroom>,
        mut timeslots: Vec<TimeSlot>,
    ) -> Result<Self, ConfigurationError> {
        if instructors.is_empty() {
            return Err(ConfigurationError::EmptyInstructorPool);
        }
        if classrooms.is_empty() {
            return Err(ConfigurationError::EmptyClassroomPool);
        }
        if timeslots.is_empty() {
            return Err(ConfigurationError::EmptyTimeSlotPool);
        }

        timeslots.sort_by_key(|t| t.start_min);

        let instructor_ids = index_ids(instructors.iter().map(|i| i.id.clone()), "instructor")?;
        let classroom_ids = index_ids(classrooms.iter().map(|c| c.id.clone()), "classroom")?;
        let timeslot_ids = index_ids(timeslots.iter().map(|t| t.id.clone()), "timeslot")?;

        // Split off projects whose responsible instructor is unknown.
        let mut kept = Vec::with_capacity(projects.len());
        let mut excluded_project_ids = Vec::new();
        for project in projects {
            if instructor_ids.contains_key(&project.responsible_instructor_id) {
                kept.push(project);
            } else {
                warn!(
                    project = %project.id,
                    responsible = %project.responsible_instructor_id,
                    "excluding project with unknown responsible instructor"
                );
                excluded_project_ids.push(project.id);
            }
        }
        let project_ids = index_ids(kept.iter().map(|p| p.id.clone()), "project")?;

        Ok(Self {
            instructors,
            projects: kept,
            classrooms,
            timeslots,
            excluded_project_ids,
            instructor_ids,
            project_ids,
            classroom_ids,
            timeslot_ids,
        })
    }

    /// Instructors, in input order.
    pub fn instructors(&self) -> &[Instructor] {
        &self.instructors
    }

    /// Schedulable projects (exclusions removed), in input order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Classrooms, in input order.
    pub fn classrooms(&self) -> &[Classroom] {
        &self.classrooms
    }

    /// Time slots, sorted by start time.
    pub fn timeslots(&self) -> &[TimeSlot] {
        &self.timeslots
    }

    /// IDs of projects excluded for lacking a resolvable responsible
    /// instructor.
    pub fn excluded_project_ids(&self) -> &[String] {
        &self.excluded_project_ids
    }

    /// Number of instructors.
    pub fn instructor_count(&self) -> usize {
        self.instructors.len()
    }

    /// Number of schedulable projects.
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Number of classrooms.
    pub fn classroom_count(&self) -> usize {
        self.classrooms.len()
    }

    /// Number of time slots.
    pub fn timeslot_count(&self) -> usize {
        self.timeslots.len()
    }

    /// Dense index of an instructor ID.
    pub fn instructor_index(&self, id: &str) -> Option<usize> {
        self.instructor_ids.get(id).copied()
    }

    /// Dense index of a project ID.
    pub fn project_index(&self, id: &str) -> Option<usize> {
        self.project_ids.get(id).copied()
    }

    /// Dense index of a classroom ID.
    pub fn classroom_index(&self, id: &str) -> Option<usize> {
        self.classroom_ids.get(id).copied()
    }

    /// Total-order index of a time slot ID (position by start time).
    pub fn timeslot_order(&self, id: &str) -> Option<usize> {
        self.timeslot_ids.get(id).copied()
    }

    /// Project by ID.
    pub fn project_by_id(&self, id: &str) -> Option<&Project> {
        self.project_index(id).map(|i| &self.projects[i])
    }

    /// Time slot at a given order index.
    pub fn timeslot_at(&self, order: usize) -> &TimeSlot {
        &self.timeslots[order]
    }

    /// Reward for occupying the slot at the given order index. Earlier
    /// slots reward more; the reward bottoms out at zero.
    pub fn slot_reward(&self, order: usize) -> f64 {
        (SLOT_REWARD_BASE - SLOT_REWARD_STEP * order as f64).max(0.0)
    }
}

fn index_ids(
    ids: impl Iterator<Item = String>,
    kind: &'static str,
) -> Result<HashMap<String, usize>, ConfigurationError> {
    let mut map = HashMap::new();
    for (index, id) in ids.enumerate() {
        if map.insert(id.clone(), index).is_some() {
            return Err(ConfigurationError::DuplicateId { kind, id });
        }
    }
    Ok(map)
}
