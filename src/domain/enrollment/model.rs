//! Enrollment and class tuition entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A student's membership in a class.
///
/// Created on join and removed on withdrawal, so every stored enrollment
/// is an active one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: i32,
    pub class_id: i32,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(student_id: i32, class_id: i32, enrolled_at: DateTime<Utc>) -> Self {
        Self {
            student_id,
            class_id,
            enrolled_at,
        }
    }

    /// Whether the student had joined by the end of `last_day`.
    pub fn is_enrolled_by(&self, last_day: NaiveDate) -> bool {
        self.enrolled_at.date_naive() <= last_day
    }

    /// Stable identifier used in batch failure reports.
    pub fn key(&self) -> String {
        format!("student:{}/class:{}", self.student_id, self.class_id)
    }
}

/// Monthly tuition attached to a class, in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTuitionRate {
    pub class_id: i32,
    pub amount: i64,
}
