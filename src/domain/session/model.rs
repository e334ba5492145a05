use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A taught session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i32,
    pub teacher_id: i32,
    pub class_id: i32,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Only valid sessions count towards pay
    pub is_valid: bool,
    /// Enrolled students when the session was recorded
    pub student_count: u32,
}

impl SessionRecord {
    /// Session length in whole minutes; 0 when the end precedes the start.
    pub fn minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn record(start: NaiveTime, end: NaiveTime) -> SessionRecord {
        SessionRecord {
            id: 1,
            teacher_id: 1,
            class_id: 1,
            session_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            start_time: start,
            end_time: end,
            is_valid: true,
            student_count: 3,
        }
    }

    #[test]
    fn minutes_between_start_and_end() {
        assert_eq!(record(at(14, 0), at(15, 30)).minutes(), 90);
    }

    #[test]
    fn reversed_times_count_as_zero() {
        assert_eq!(record(at(15, 0), at(14, 0)).minutes(), 0);
    }
}
