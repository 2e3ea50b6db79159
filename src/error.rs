//! Engine error taxonomy.
//!
//! Only configuration problems propagate to the caller; everything else
//! degrades into the run's validation report.

use thiserror::Error;

/// Fatal input problems detected before any scheduling is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No instructors were provided.
    #[error("instructor pool is empty")]
    EmptyInstructorPool,

    /// No classrooms were provided.
    #[error("classroom pool is empty")]
    EmptyClassroomPool,

    /// No time slots were provided.
    #[error("timeslot pool is empty")]
    EmptyTimeSlotPool,

    /// Two input entities of the same kind share an ID.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId {
        /// Entity kind ("instructor", "project", "classroom", "timeslot").
        kind: &'static str,
        /// The offending identifier.
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ConfigurationError::EmptyInstructorPool.to_string(),
            "instructor pool is empty"
        );
        let e = ConfigurationError::DuplicateId {
            kind: "classroom",
            id: "C1".into(),
        };
        assert_eq!(e.to_string(), "duplicate classroom id: C1");
    }
}
