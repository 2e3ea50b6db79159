//! Defense scheduling domain models.
//!
//! Immutable input entities (instructors, projects, classrooms, time
//! slots), the compiled [`DefenseProblem`] arena, and the mutable
//! [`Solution`] aggregate the search strategies operate on.

mod classroom;
mod instructor;
mod problem;
mod project;
mod solution;
mod timeslot;

pub use classroom::Classroom;
pub use instructor::{Instructor, InstructorCategory};
pub use problem::{DefenseProblem, SLOT_REWARD_BASE, SLOT_REWARD_STEP};
pub use project::{Project, ProjectKind};
pub use solution::{Assignment, Solution};
pub use timeslot::{TimeSlot, BOUNDARY_START_MIN, LATE_CUTOFF_MIN};
