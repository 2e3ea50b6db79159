//! Instructor model.
//!
//! Instructors own projects as responsible supervisors and sit on defense
//! panels as jury members. Their workload is always derived from a
//! [`Solution`](crate::models::Solution), never stored here.

use serde::{Deserialize, Serialize};

/// An instructor available for supervision and jury duty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    /// Unique instructor identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Seniority classification.
    pub category: InstructorCategory,
}

/// Instructor seniority classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructorCategory {
    /// Senior faculty member.
    Faculty,
    /// Junior teaching/research assistant.
    Assistant,
}

impl Instructor {
    /// Creates a new instructor.
    pub fn new(id: impl Into<String>, category: InstructorCategory) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            category,
        }
    }

    /// Creates a senior faculty instructor.
    pub fn faculty(id: impl Into<String>) -> Self {
        Self::new(id, InstructorCategory::Faculty)
    }

    /// Creates a junior assistant instructor.
    pub fn assistant(id: impl Into<String>) -> Self {
        Self::new(id, InstructorCategory::Assistant)
    }

    /// Sets the instructor name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructor_builder() {
        let i = Instructor::faculty("I1").with_name("Dr. Kaya");
        assert_eq!(i.id, "I1");
        assert_eq!(i.name, "Dr. Kaya");
        assert_eq!(i.category, InstructorCategory::Faculty);
    }

    #[test]
    fn test_instructor_categories() {
        assert_eq!(
            Instructor::assistant("A1").category,
            InstructorCategory::Assistant
        );
        assert_eq!(
            Instructor::faculty("F1").category,
            InstructorCategory::Faculty
        );
    }
}
