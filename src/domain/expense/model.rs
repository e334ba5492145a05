//! Expense and expense category entities

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::period::{Period, PeriodRange};
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecurringInterval {
    Monthly,
    Quarterly,
    Yearly,
}

impl RecurringInterval {
    pub fn months(&self) -> i64 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Yearly => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Facility,
    Marketing,
    Operational,
}

impl CategoryType {
    pub const ALL: [CategoryType; 3] = [Self::Facility, Self::Marketing, Self::Operational];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facility => "facility",
            Self::Marketing => "marketing",
            Self::Operational => "operational",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "facility" => Some(Self::Facility),
            "marketing" => Some(Self::Marketing),
            "operational" => Some(Self::Operational),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExpenseCategory {
    pub id: i32,
    pub name: String,
    pub category_type: CategoryType,
}

/// An expense. When `recurring_interval` is set, `expense_date` is the anchor
/// of the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Expense {
    pub id: i32,
    pub category_id: i32,
    /// Amount per occurrence in minor currency units
    pub amount: i64,
    pub expense_date: NaiveDate,
    pub description: Option<String>,
    pub recurring_interval: Option<RecurringInterval>,
}

impl Expense {
    pub fn new(
        category_id: i32,
        amount: i64,
        expense_date: NaiveDate,
        description: Option<String>,
        recurring_interval: Option<RecurringInterval>,
    ) -> DomainResult<Self> {
        if amount <= 0 {
            return Err(DomainError::validation(format!(
                "expense amount must be positive, got {}",
                amount
            )));
        }
        Ok(Self {
            id: 0,
            category_id,
            amount,
            expense_date,
            description,
            recurring_interval,
        })
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring_interval.is_some()
    }

    /// Dates this expense lands on within `start..=end`.
    pub fn occurrences_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let Some(interval) = self.recurring_interval else {
            return if self.expense_date >= start && self.expense_date <= end {
                vec![self.expense_date]
            } else {
                Vec::new()
            };
        };

        if end < start || end < self.expense_date {
            return Vec::new();
        }

        let anchor = Period::of(self.expense_date);
        let first = Period::of(start.max(self.expense_date));
        let Ok(range) = PeriodRange::new(first, Period::of(end)) else {
            return Vec::new();
        };

        range
            .periods()
            .filter(|p| p.months_since(&anchor).rem_euclid(interval.months()) == 0)
            .map(|p| p.clamped_day(self.expense_date.day()))
            .filter(|d| *d >= start && *d <= end && *d >= self.expense_date)
            .collect()
    }

    /// Total charged by this expense within a window.
    pub fn amount_in(&self, range: &PeriodRange) -> i64 {
        self.occurrences_between(range.start_date(), range.end_date())
            .len() as i64
            * self.amount
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn recurring(anchor: NaiveDate, interval: RecurringInterval) -> Expense {
        Expense::new(1, 1_000, anchor, None, Some(interval)).unwrap()
    }

    fn month(key: &str) -> PeriodRange {
        PeriodRange::single(Period::parse(key).unwrap())
    }

    #[test]
    fn monthly_occurs_once_per_month_from_anchor() {
        let rent = recurring(date(2024, 1, 10), RecurringInterval::Monthly);
        assert_eq!(rent.amount_in(&month("2023-12")), 0);
        for key in ["2024-01", "2024-02", "2024-07", "2025-03"] {
            assert_eq!(rent.amount_in(&month(key)), 1_000, "{key}");
        }
    }

    #[test]
    fn anchor_on_31st_clamps_to_month_end() {
        let e = recurring(date(2024, 1, 31), RecurringInterval::Monthly);
        let feb = Period::parse("2024-02").unwrap();
        assert_eq!(
            e.occurrences_between(feb.first_day(), feb.last_day()),
            vec![date(2024, 2, 29)]
        );
    }

    #[test]
    fn quarterly_aligned_to_anchor_month() {
        let e = recurring(date(2024, 2, 15), RecurringInterval::Quarterly);
        let range = PeriodRange::parse("2024-01", "2024-12").unwrap();
        assert_eq!(
            e.occurrences_between(range.start_date(), range.end_date()),
            vec![date(2024, 2, 15), date(2024, 5, 15), date(2024, 8, 15), date(2024, 11, 15)]
        );
    }

    #[test]
    fn yearly_repeats_on_anchor_day() {
        let e = recurring(date(2023, 2, 28), RecurringInterval::Yearly);
        let range = PeriodRange::parse("2023-01", "2025-12").unwrap();
        assert_eq!(e.amount_in(&range), 3_000);
        assert_eq!(e.amount_in(&month("2024-03")), 0);
    }

    #[test]
    fn mid_month_window_excludes_earlier_occurrence() {
        let e = recurring(date(2024, 1, 10), RecurringInterval::Monthly);
        assert!(e
            .occurrences_between(date(2024, 3, 11), date(2024, 3, 31))
            .is_empty());
    }

    #[test]
    fn one_off_expense_counts_only_in_its_month() {
        let e = Expense::new(2, 5_000, date(2024, 4, 2), Some("flyers".into()), None).unwrap();
        assert_eq!(e.amount_in(&month("2024-04")), 5_000);
        assert_eq!(e.amount_in(&month("2024-05")), 0);
        assert!(!e.is_recurring());
    }

    #[test]
    fn non_positive_amount_rejected() {
        assert!(Expense::new(1, 0, date(2024, 1, 1), None, None).is_err());
    }
}
