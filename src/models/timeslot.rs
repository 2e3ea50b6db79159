//! Time slot model.
//!
//! Slots are totally ordered by start time; the order index a slot receives
//! at load time (see [`DefenseProblem`](crate::models::DefenseProblem)) is
//! what gap and adjacency reasoning operates on. Slots starting at or after
//! the daily cutoff are forbidden outright; the half hour before the cutoff
//! carries a moderate penalty instead.

use serde::{Deserialize, Serialize};

/// Daily cutoff: slots starting at or after 16:30 must not be used.
pub const LATE_CUTOFF_MIN: i32 = 16 * 60 + 30;

/// Start of the penalized boundary band (16:00 to the cutoff).
pub const BOUNDARY_START_MIN: i32 = 16 * 60;

/// A defense time slot. Times are minutes since midnight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: String,
    /// Start time (minutes since midnight).
    pub start_min: i32,
    /// End time (minutes since midnight).
    pub end_min: i32,
}

impl TimeSlot {
    /// Creates a new time slot.
    pub fn new(id: impl Into<String>, start_min: i32, end_min: i32) -> Self {
        Self {
            id: id.into(),
            start_min,
            end_min,
        }
    }

    /// Creates a slot from hour/minute start and a duration.
    pub fn at(id: impl Into<String>, hour: i32, minute: i32, duration_min: i32) -> Self {
        let start = hour * 60 + minute;
        Self::new(id, start, start + duration_min)
    }

    /// Slot length in minutes.
    pub fn duration_min(&self) -> i32 {
        self.end_min - self.start_min
    }

    /// Whether the slot starts at or after the daily cutoff.
    pub fn is_forbidden(&self) -> bool {
        self.start_min >= LATE_CUTOFF_MIN
    }

    /// Whether the slot falls in the penalized band right before the cutoff.
    pub fn is_boundary(&self) -> bool {
        self.start_min >= BOUNDARY_START_MIN && self.start_min < LATE_CUTOFF_MIN
    }
}
