//! Project model.
//!
//! A project is a single defense event to be placed in the timetable.
//! Interim reviews need only the responsible instructor; final defenses
//! additionally require at least one distinct jury member.

use serde::{Deserialize, Serialize};

/// A student project awaiting a scheduled defense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier.
    pub id: String,
    /// Defense kind (interim review or final defense).
    pub kind: ProjectKind,
    /// Instructor who owns the project. Always first on the panel.
    pub responsible_instructor_id: String,
    /// Whether this is a makeup (retake) defense.
    pub is_makeup: bool,
}

/// The two defense kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectKind {
    /// Mid-term progress review; responsible instructor only.
    Interim,
    /// Full defense; requires at least one jury member besides the
    /// responsible instructor.
    Final,
}

impl Project {
    /// Creates a new project.
    pub fn new(
        id: impl Into<String>,
        kind: ProjectKind,
        responsible_instructor_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            responsible_instructor_id: responsible_instructor_id.into(),
            is_makeup: false,
        }
    }

    /// Creates an interim review project.
    pub fn interim(id: impl Into<String>, responsible: impl Into<String>) -> Self {
        Self::new(id, ProjectKind::Interim, responsible)
    }

    /// Creates a final defense project.
    pub fn final_defense(id: impl Into<String>, responsible: impl Into<String>) -> Self {
        Self::new(id, ProjectKind::Final, responsible)
    }

    /// Marks this project as a makeup defense.
    pub fn with_makeup(mut self) -> Self {
        self.is_makeup = true;
        self
    }

    /// Construction priority ladder: regular finals first, makeup interims
    /// last. Lower rank = scheduled earlier.
    pub fn priority_rank(&self) -> u8 {
        match (self.kind, self.is_makeup) {
            (ProjectKind::Final, false) => 0,
            (ProjectKind::Interim, false) => 1,
            (ProjectKind::Final, true) => 2,
            (ProjectKind::Interim, true) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_builder() {
        let p = Project::final_defense("P1", "I1").with_makeup();
        assert_eq!(p.id, "P1");
        assert_eq!(p.kind, ProjectKind::Final);
        assert_eq!(p.responsible_instructor_id, "I1");
        assert!(p.is_makeup);
    }

    #[test]
    fn test_priority_ladder() {
        let final_regular = Project::final_defense("a", "I1");
        let interim_regular = Project::interim("b", "I1");
        let final_makeup = Project::final_defense("c", "I1").with_makeup();
        let interim_makeup = Project::interim("d", "I1").with_makeup();

        assert!(final_regular.priority_rank() < interim_regular.priority_rank());
        assert!(interim_regular.priority_rank() < final_makeup.priority_rank());
        assert!(final_makeup.priority_rank() < interim_makeup.priority_rank());
    }
}
