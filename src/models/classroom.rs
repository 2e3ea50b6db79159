//! Classroom model.

use serde::{Deserialize, Serialize};

/// A classroom in which defenses take place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classroom {
    /// Unique classroom identifier.
    pub id: String,
    /// Seating capacity.
    pub capacity: i32,
}

impl Classroom {
    /// Creates a new classroom.
    pub fn new(id: impl Into<String>, capacity: i32) -> Self {
        Self {
            id: id.into(),
            capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classroom() {
        let c = Classroom::new("D-101", 40);
        assert_eq!(c.id, "D-101");
        assert_eq!(c.capacity, 40);
    }
}
