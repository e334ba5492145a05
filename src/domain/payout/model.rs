//! Tutor payment domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::period::Period;
use crate::domain::rate::{Rate, RateType};
use crate::domain::session::SessionRecord;
use crate::domain::status::SettlementStatus;
use crate::domain::DomainResult;

const ENTITY: &str = "TutorPayment";

/// Session totals a payout is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayoutBasis {
    pub sessions_count: u32,
    /// Sum of per-session enrolled-student snapshots
    pub students_count: u32,
    pub minutes_taught: i64,
}

impl PayoutBasis {
    pub fn from_sessions(sessions: &[SessionRecord]) -> Self {
        sessions
            .iter()
            .filter(|s| s.is_valid)
            .fold(Self::default(), |acc, s| Self {
                sessions_count: acc.sessions_count + 1,
                students_count: acc.students_count + s.student_count,
                minutes_taught: acc.minutes_taught + s.minutes(),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.sessions_count == 0
    }

    /// Payout amount in minor units.
    ///
    /// Hourly pay is rounded half-up once, on the monthly total.
    pub fn amount_for(&self, rate: Rate) -> i64 {
        match rate {
            Rate::Hourly(per_hour) => {
                let scaled = self.minutes_taught * per_hour;
                (scaled + 30).div_euclid(60)
            }
            Rate::PerStudent(per_student) => i64::from(self.students_count) * per_student,
            Rate::MonthlyFixed(flat) => flat,
        }
    }
}

/// One monthly payout for a teacher. `amount` is frozen at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TutorPayment {
    pub id: i32,
    pub teacher_id: i32,
    #[schema(value_type = String, example = "2024-06")]
    pub payment_month: Period,
    pub amount: i64,
    pub sessions_count: u32,
    pub students_count: u32,
    pub minutes_taught: i64,
    /// Rate row this payout was computed with
    pub rate_id: i32,
    pub rate_type: RateType,
    pub status: SettlementStatus,
    pub payment_method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TutorPayment {
    pub fn new_pending(
        teacher_id: i32,
        payment_month: Period,
        rate_id: i32,
        rate: Rate,
        basis: PayoutBasis,
    ) -> Self {
        Self {
            id: 0,
            teacher_id,
            payment_month,
            amount: basis.amount_for(rate),
            sessions_count: basis.sessions_count,
            students_count: basis.students_count,
            minutes_taught: basis.minutes_taught,
            rate_id,
            rate_type: rate.rate_type(),
            status: SettlementStatus::Pending,
            payment_method: None,
            paid_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn mark_paid(
        &mut self,
        payment_method: impl Into<String>,
        paid_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.status = self.status.transition(ENTITY, SettlementStatus::Paid)?;
        self.payment_method = Some(payment_method.into());
        self.paid_at = Some(paid_at);
        Ok(())
    }

    pub fn mark_overdue(&mut self) -> DomainResult<()> {
        self.status = self.status.transition(ENTITY, SettlementStatus::Overdue)?;
        Ok(())
    }

    pub fn cancel(&mut self) -> DomainResult<()> {
        self.status = self.status.transition(ENTITY, SettlementStatus::Cancelled)?;
        Ok(())
    }

    pub fn is_billable(&self) -> bool {
        self.status != SettlementStatus::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn session(minutes: u32, students: u32, valid: bool) -> SessionRecord {
        let start = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        SessionRecord {
            id: 0,
            teacher_id: 1,
            class_id: 1,
            session_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            start_time: start,
            end_time: start + chrono::Duration::minutes(i64::from(minutes)),
            is_valid: valid,
            student_count: students,
        }
    }

    #[test]
    fn hourly_two_ninety_minute_sessions() {
        let basis = PayoutBasis::from_sessions(&[session(90, 4, true), session(90, 5, true)]);
        assert_eq!(basis.sessions_count, 2);
        assert_eq!(basis.minutes_taught, 180);
        assert_eq!(basis.amount_for(Rate::Hourly(100_000)), 300_000);
    }

    #[test]
    fn hourly_rounds_half_up_on_total() {
        // 1 minute at 90/hour = 1.5
        let basis = PayoutBasis::from_sessions(&[session(1, 1, true)]);
        assert_eq!(basis.amount_for(Rate::Hourly(90)), 2);
        // 1 minute at 89/hour = 1.48..
        assert_eq!(basis.amount_for(Rate::Hourly(89)), 1);
    }

    #[test]
    fn per_student_uses_each_session_snapshot() {
        let basis = PayoutBasis::from_sessions(&[session(60, 3, true), session(60, 5, true)]);
        assert_eq!(basis.students_count, 8);
        assert_eq!(basis.amount_for(Rate::PerStudent(20_000)), 160_000);
    }

    #[test]
    fn invalid_sessions_are_not_counted() {
        let basis = PayoutBasis::from_sessions(&[session(60, 3, false)]);
        assert!(basis.is_empty());
    }

    #[test]
    fn monthly_fixed_ignores_volume() {
        let basis = PayoutBasis::from_sessions(&[session(45, 2, true)]);
        assert_eq!(basis.amount_for(Rate::MonthlyFixed(2_500_000)), 2_500_000);
    }

    #[test]
    fn new_payout_snapshots_basis() {
        let basis = PayoutBasis::from_sessions(&[session(60, 3, true)]);
        let p = TutorPayment::new_pending(
            4,
            Period::parse("2024-06").unwrap(),
            11,
            Rate::Hourly(60_000),
            basis,
        );
        assert_eq!(p.amount, 60_000);
        assert_eq!(p.rate_id, 11);
        assert_eq!(p.rate_type, RateType::Hourly);
        assert_eq!(p.status, SettlementStatus::Pending);
    }
}
