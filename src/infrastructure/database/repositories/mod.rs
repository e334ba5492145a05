//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod billing_repository;
pub mod enrollment_repository;
pub mod expense_repository;
pub mod payout_repository;
pub mod rate_repository;
pub mod repository_provider;
pub mod session_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use chrono::{DateTime, Days, NaiveDate, Utc};
use sea_orm::{DbErr, SqlErr};

use crate::domain::{DomainError, Period, SettlementStatus};

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn db_err(e: DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

/// Whether an insert was rejected by a unique index.
pub(crate) fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub(crate) fn corrupt(entity: &str, detail: impl std::fmt::Display) -> DomainError {
    DomainError::Database(format!("invalid {} row: {}", entity, detail))
}

pub(crate) fn parse_status(entity: &str, s: &str) -> Result<SettlementStatus, DomainError> {
    SettlementStatus::from_str(s).ok_or_else(|| corrupt(entity, format!("status '{}'", s)))
}

pub(crate) fn parse_period(entity: &str, s: &str) -> Result<Period, DomainError> {
    Period::parse(s).map_err(|_| corrupt(entity, format!("period '{}'", s)))
}

/// Half-open UTC bounds `[start 00:00, end+1 00:00)` for filtering timestamps by date.
pub(crate) fn day_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let lower = start.and_time(chrono::NaiveTime::MIN).and_utc();
    let upper = (end + Days::new(1)).and_time(chrono::NaiveTime::MIN).and_utc();
    (lower, upper)
}
