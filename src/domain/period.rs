//! Monthly period keys (`YYYY-MM`) and inclusive period ranges.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// One monthly billing / payment cycle.
///
/// Internally anchored on the first day of the month; years are restricted
/// to `1..=9999` so that month arithmetic can never overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    first: NaiveDate,
}

impl Period {
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=9999).contains(&year) {
            return Err(DomainError::validation(format!(
                "period year {} is out of range",
                year
            )));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or_else(|| DomainError::validation(format!("invalid period month {}", month)))
    }

    /// Parse a strict `YYYY-MM` key.
    pub fn parse(key: &str) -> DomainResult<Self> {
        let malformed = || {
            DomainError::validation(format!(
                "malformed period key '{}', expected YYYY-MM",
                key
            ))
        };

        let bytes = key.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(malformed());
        }
        let (year, month) = (&key[0..4], &key[5..7]);
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Self::new(year, month).map_err(|_| malformed())
    }

    /// The period a date falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first + Months::new(1) - Days::new(1)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn next(&self) -> Self {
        Self {
            first: self.first + Months::new(1),
        }
    }

    /// Absolute month index, used for month distance arithmetic.
    pub fn index(&self) -> i64 {
        i64::from(self.year()) * 12 + i64::from(self.month0())
    }

    /// Signed number of months from `earlier` to `self`.
    pub fn months_since(&self, earlier: &Period) -> i64 {
        self.index() - earlier.index()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Period::of(date) == *self
    }

    /// `YYYYMM`, used inside invoice numbers.
    pub fn compact(&self) -> String {
        format!("{:04}{:02}", self.year(), self.month())
    }

    /// A date inside this period with the given day of month, clamped to the
    /// month length (day 31 in February becomes the 28th or 29th).
    pub fn clamped_day(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        self.first + Days::new(u64::from(day - 1))
    }

    fn month0(&self) -> u32 {
        self.first.month0()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::parse(s)
    }
}

impl TryFrom<String> for Period {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Period::parse(&value)
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.to_string()
    }
}

/// Inclusive range of periods, e.g. `2024-01..=2024-06`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub from: Period,
    pub to: Period,
}

impl PeriodRange {
    pub fn new(from: Period, to: Period) -> DomainResult<Self> {
        if from > to {
            return Err(DomainError::validation(format!(
                "window start {} is after window end {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    pub fn single(period: Period) -> Self {
        Self {
            from: period,
            to: period,
        }
    }

    pub fn parse(from: &str, to: &str) -> DomainResult<Self> {
        Self::new(Period::parse(from)?, Period::parse(to)?)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.from.first_day()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.to.last_day()
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }

    pub fn contains(&self, period: &Period) -> bool {
        *period >= self.from && *period <= self.to
    }

    pub fn len(&self) -> usize {
        (self.to.months_since(&self.from) + 1) as usize
    }

    pub fn periods(&self) -> impl Iterator<Item = Period> {
        let to = self.to;
        std::iter::successors(Some(self.from), move |p| {
            let next = p.next();
            (next <= to).then_some(next)
        })
    }
}

impl fmt::Display for PeriodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}
