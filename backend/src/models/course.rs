//! Course model
//!
//! Immutable parameters come from the roster. The only mutable field is
//! `available`, which flips true → false exactly once when the course actor
//! runs out of eligible TAs.

use crate::models::ids::{CourseId, LabId};
use parking_lot::{Mutex, MutexGuard};

/// A course offering and its lock
#[derive(Debug)]
pub struct Course {
    id: CourseId,
    name: String,
    interest: f64,
    lab_ids: Vec<LabId>,
    max_slot_ceiling: u32,
    available: Mutex<bool>,
}

impl Course {
    /// Create an available course
    ///
    /// # Example
    /// ```
    /// use course_allocation_core::models::{Course, CourseId, LabId};
    ///
    /// let course = Course::new(CourseId(0), "SMAI".to_string(), 0.8, vec![LabId(1)], 3);
    /// assert!(course.is_available());
    /// ```
    pub fn new(
        id: CourseId,
        name: String,
        interest: f64,
        lab_ids: Vec<LabId>,
        max_slot_ceiling: u32,
    ) -> Self {
        Self {
            id,
            name,
            interest,
            lab_ids,
            max_slot_ceiling,
            available: Mutex::new(true),
        }
    }

    pub fn id(&self) -> CourseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interest(&self) -> f64 {
        self.interest
    }

    /// Labs this course draws TAs from, in scan order
    pub fn lab_ids(&self) -> &[LabId] {
        &self.lab_ids
    }

    /// Upper bound for the per-round section capacity
    pub fn max_slot_ceiling(&self) -> u32 {
        self.max_slot_ceiling
    }

    /// Acquire the course lock
    pub fn lock(&self) -> MutexGuard<'_, bool> {
        self.available.lock()
    }

    /// Snapshot of the availability flag
    pub fn is_available(&self) -> bool {
        *self.lock()
    }

    /// Withdraw the course from offerings
    ///
    /// Returns true the first time only.
    pub fn close(&self) -> bool {
        let mut available = self.lock();
        let was_open = *available;
        *available = false;
        was_open
    }
}
