//! Teacher rate domain entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Payout formula a rate applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateType {
    /// Amount per hour taught
    Hourly,
    /// Amount per enrolled student per session
    PerStudent,
    /// Flat monthly amount
    MonthlyFixed,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "HOURLY",
            Self::PerStudent => "PER_STUDENT",
            Self::MonthlyFixed => "MONTHLY_FIXED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "HOURLY" => Some(Self::Hourly),
            "PER_STUDENT" => Some(Self::PerStudent),
            "MONTHLY_FIXED" => Some(Self::MonthlyFixed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rate with its amount, as used by the payout formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rate {
    Hourly(i64),
    PerStudent(i64),
    MonthlyFixed(i64),
}

impl Rate {
    pub fn rate_type(&self) -> RateType {
        match self {
            Rate::Hourly(_) => RateType::Hourly,
            Rate::PerStudent(_) => RateType::PerStudent,
            Rate::MonthlyFixed(_) => RateType::MonthlyFixed,
        }
    }

    pub fn amount(&self) -> i64 {
        match *self {
            Rate::Hourly(a) | Rate::PerStudent(a) | Rate::MonthlyFixed(a) => a,
        }
    }
}

/// One row of a teacher's rate history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeacherRate {
    pub id: i32,
    pub teacher_id: i32,
    pub rate_type: RateType,
    /// Amount in minor currency units
    pub amount: i64,
    /// First day the rate applies (inclusive)
    pub effective_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TeacherRate {
    pub fn new(
        teacher_id: i32,
        rate_type: RateType,
        amount: i64,
        effective_date: NaiveDate,
    ) -> DomainResult<Self> {
        validate_amount(amount)?;
        Ok(Self {
            id: 0,
            teacher_id,
            rate_type,
            amount,
            effective_date,
            is_active: true,
            created_at: Utc::now(),
        })
    }

    pub fn rate(&self) -> Rate {
        match self.rate_type {
            RateType::Hourly => Rate::Hourly(self.amount),
            RateType::PerStudent => Rate::PerStudent(self.amount),
            RateType::MonthlyFixed => Rate::MonthlyFixed(self.amount),
        }
    }

    /// Whether this row is a candidate on `on_date`.
    pub fn applies_on(&self, on_date: NaiveDate, rate_type: Option<RateType>) -> bool {
        self.is_active
            && self.effective_date <= on_date
            && rate_type.map_or(true, |t| t == self.rate_type)
    }

    pub fn apply(&mut self, change: &RateChange) -> DomainResult<()> {
        if let Some(amount) = change.amount {
            validate_amount(amount)?;
            self.amount = amount;
        }
        if let Some(rate_type) = change.rate_type {
            self.rate_type = rate_type;
        }
        if let Some(effective_date) = change.effective_date {
            self.effective_date = effective_date;
        }
        Ok(())
    }
}

/// In-place edit of an unused rate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RateChange {
    pub amount: Option<i64>,
    pub rate_type: Option<RateType>,
    pub effective_date: Option<NaiveDate>,
}

impl RateChange {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.rate_type.is_none() && self.effective_date.is_none()
    }
}

fn validate_amount(amount: i64) -> DomainResult<()> {
    if amount <= 0 {
        return Err(DomainError::validation(format!(
            "rate amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

/// Pick the rate in force on `on_date` from a teacher's history.
///
/// Latest `effective_date` wins; on equal dates the higher id (later insert) wins.
pub fn resolve(
    history: &[TeacherRate],
    on_date: NaiveDate,
    rate_type: Option<RateType>,
) -> Option<&TeacherRate> {
    history
        .iter()
        .filter(|r| r.applies_on(on_date, rate_type))
        .max_by_key(|r| (r.effective_date, r.id))
}

// ── Tests ──────────────────────────────────────────────────────
