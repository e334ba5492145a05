//! Overdue aging classification

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DomainResult, RepositoryProvider, TuitionBilling};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum AgingBucket {
    #[serde(rename = "1-30")]
    Days1To30,
    #[serde(rename = "31-60")]
    Days31To60,
    #[serde(rename = "61-90")]
    Days61To90,
    #[serde(rename = "90+")]
    Over90,
}

impl AgingBucket {
    pub const ALL: [AgingBucket; 4] = [
        Self::Days1To30,
        Self::Days31To60,
        Self::Days61To90,
        Self::Over90,
    ];

    /// Bucket for a positive number of days overdue.
    pub fn for_days(days_overdue: i64) -> Self {
        match days_overdue {
            ..=30 => Self::Days1To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AgedBilling {
    pub billing: TuitionBilling,
    pub days_overdue: i64,
    pub bucket: AgingBucket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BucketSummary {
    pub bucket: AgingBucket,
    pub count: u32,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AgingSummary {
    pub as_of: NaiveDate,
    /// Every bucket, in order, zero-filled
    pub buckets: Vec<BucketSummary>,
    pub total_overdue_count: u32,
    pub total_overdue_amount: i64,
}

pub struct AgingClassifier {
    repos: Arc<dyn RepositoryProvider>,
}

impl AgingClassifier {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Unpaid invoices with `due_date < as_of`, most overdue first.
    pub async fn classify_overdue(&self, as_of: NaiveDate) -> DomainResult<Vec<AgedBilling>> {
        let mut aged: Vec<AgedBilling> = self
            .repos
            .billings()
            .find_unpaid_due_before(as_of)
            .await?
            .into_iter()
            .filter(|b| b.is_overdue_on(as_of))
            .map(|billing| {
                let days_overdue = billing.days_overdue(as_of);
                AgedBilling {
                    bucket: AgingBucket::for_days(days_overdue),
                    days_overdue,
                    billing,
                }
            })
            .collect();
        aged.sort_by(|a, b| {
            b.days_overdue
                .cmp(&a.days_overdue)
                .then(a.billing.id.cmp(&b.billing.id))
        });
        Ok(aged)
    }

    pub async fn report(&self, as_of: NaiveDate) -> DomainResult<AgingSummary> {
        let aged = self.classify_overdue(as_of).await?;
        Ok(summarize(as_of, &aged))
    }
}

/// Roll classified invoices up per bucket. Bucket totals always add up to
/// the overall totals.
pub fn summarize(as_of: NaiveDate, aged: &[AgedBilling]) -> AgingSummary {
    let buckets: Vec<BucketSummary> = AgingBucket::ALL
        .iter()
        .map(|&bucket| {
            let (count, total) = aged
                .iter()
                .filter(|a| a.bucket == bucket)
                .fold((0u32, 0i64), |(c, t), a| (c + 1, t + a.billing.amount));
            BucketSummary {
                bucket,
                count,
                total,
            }
        })
        .collect();

    AgingSummary {
        as_of,
        total_overdue_count: buckets.iter().map(|b| b.count).sum(),
        total_overdue_amount: buckets.iter().map(|b| b.total).sum(),
        buckets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Period, SettlementStatus};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use chrono::{Days, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn invoice(repos: &InMemoryRepositoryProvider, student_id: i32, due: NaiveDate, amount: i64) -> i32 {
        let billing = TuitionBilling::new_pending(
            student_id,
            1,
            Period::of(due),
            amount,
            due,
            format!("INV-{}", student_id),
        );
        repos
            .billings()
            .insert(billing)
            .await
            .unwrap()
            .inserted()
            .unwrap()
            .id
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(AgingBucket::for_days(1), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::for_days(30), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::for_days(31), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::for_days(60), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::for_days(61), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::for_days(90), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::for_days(91), AgingBucket::Over90);
        assert_eq!(
            serde_json::to_string(&AgingBucket::Over90).unwrap(),
            "\"90+\""
        );
    }

    #[tokio::test]
    async fn classifies_and_summarizes_consistently() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let as_of = date(2024, 6, 30);
        for (student, days, amount) in [(1, 5, 100), (2, 45, 200), (3, 75, 300), (4, 120, 400), (5, 10, 50)] {
            invoice(&repos, student, as_of - Days::new(days), amount).await;
        }
        // not yet due, and paid
        invoice(&repos, 6, as_of, 999).await;
        let paid_id = invoice(&repos, 7, as_of - Days::new(40), 999).await;
        let mut paid = repos.billings().find_by_id(paid_id).await.unwrap().unwrap();
        paid.mark_paid("cash", Utc::now()).unwrap();
        repos.billings().update_status(&paid, SettlementStatus::Pending).await.unwrap();

        let classifier = AgingClassifier::new(repos.clone());
        let aged = classifier.classify_overdue(as_of).await.unwrap();
        assert_eq!(aged.len(), 5);
        assert_eq!(aged[0].days_overdue, 120);
        assert_eq!(aged[0].bucket, AgingBucket::Over90);

        let summary = summarize(as_of, &aged);
        assert_eq!(summary.buckets.len(), 4);
        assert_eq!(summary.buckets[0].count, 2);
        assert_eq!(summary.buckets[0].total, 150);
        assert_eq!(summary.total_overdue_count, 5);
        assert_eq!(summary.total_overdue_amount, 1_050);
        assert_eq!(
            summary.buckets.iter().map(|b| b.total).sum::<i64>(),
            summary.total_overdue_amount
        );
    }

    #[tokio::test]
    async fn overdue_status_invoices_are_included() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let id = invoice(&repos, 1, date(2024, 5, 1), 100).await;
        let mut b = repos.billings().find_by_id(id).await.unwrap().unwrap();
        b.mark_overdue().unwrap();
        repos.billings().update_status(&b, SettlementStatus::Pending).await.unwrap();

        let summary = AgingClassifier::new(repos)
            .report(date(2024, 6, 1))
            .await
            .unwrap();
        assert_eq!(summary.buckets[1].count, 1);
        assert_eq!(b.status, SettlementStatus::Overdue);
    }

    #[tokio::test]
    async fn empty_report_is_zero_filled() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let summary = AgingClassifier::new(repos)
            .report(date(2024, 6, 1))
            .await
            .unwrap();
        assert_eq!(summary.buckets.len(), 4);
        assert!(summary.buckets.iter().all(|b| b.count == 0 && b.total == 0));
        assert_eq!(summary.total_overdue_amount, 0);
    }
}
