//! Monthly tutor payout calculation

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::rate::resolve;
use crate::domain::{
    BatchResult, DomainResult, InsertOutcome, ItemOutcome, PayoutBasis, Period,
    RepositoryProvider, TutorPayment,
};
use crate::shared::errors::DomainError;
use crate::shared::retry::{retry_with_backoff, RetryConfig};

pub struct CompensationCalculator {
    repos: Arc<dyn RepositoryProvider>,
    retry: RetryConfig,
}

impl CompensationCalculator {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            repos,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Compute one payout per teacher for `payment_month` (`YYYY-MM`).
    ///
    /// The rate in force on the last day of the month applies. Teachers with
    /// no valid sessions get no payout and are counted as skipped.
    pub async fn calculate_monthly_tutor_pay(
        &self,
        payment_month: &str,
    ) -> DomainResult<BatchResult> {
        let month = Period::parse(payment_month)?;

        let run_id = Uuid::new_v4();
        let span = info_span!("payout_run", %run_id, payment_month = %month);

        async move {
            let last_day = month.last_day();
            let teachers: BTreeSet<i32> = self
                .repos
                .rates()
                .find_active()
                .await?
                .into_iter()
                .filter(|r| r.effective_date <= last_day)
                .map(|r| r.teacher_id)
                .collect();

            info!(candidates = teachers.len(), "Starting tutor payout run");

            let mut result = BatchResult::default();
            for teacher_id in teachers {
                let outcome = match self.pay_teacher(teacher_id, month).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(teacher_id, error = %e, "Payout item failed");
                        ItemOutcome::failed(teacher_key(teacher_id), e.to_string())
                    }
                };
                result = result.record(outcome);
            }

            metrics::counter!("tutor_payouts_created_total").increment(u64::from(result.created));
            metrics::counter!("tutor_payouts_skipped_total").increment(u64::from(result.skipped));
            metrics::counter!("tutor_payouts_failed_total").increment(result.failed.len() as u64);

            info!(
                created = result.created,
                skipped = result.skipped,
                failed = result.failed.len(),
                "Tutor payout run finished"
            );

            Ok::<_, DomainError>(result)
        }
        .instrument(span)
        .await
    }

    async fn pay_teacher(&self, teacher_id: i32, month: Period) -> DomainResult<ItemOutcome> {
        let payouts = self.repos.payouts();

        if payouts.exists(teacher_id, month).await? {
            return Ok(ItemOutcome::Skipped);
        }

        let history = self.repos.rates().find_by_teacher(teacher_id).await?;
        let Some(rate) = resolve(&history, month.last_day(), None) else {
            return Ok(ItemOutcome::failed(
                teacher_key(teacher_id),
                format!("no active rate for teacher {} on {}", teacher_id, month.last_day()),
            ));
        };

        let sessions = self
            .repos
            .sessions()
            .find_valid_for_teacher(teacher_id, month)
            .await?;
        let basis = PayoutBasis::from_sessions(&sessions);
        if basis.is_empty() {
            debug!(teacher_id, "No valid sessions, no payout");
            return Ok(ItemOutcome::Skipped);
        }

        let payment = TutorPayment::new_pending(teacher_id, month, rate.id, rate.rate(), basis);

        let outcome = retry_with_backoff(
            self.retry.clone(),
            || payouts.insert(payment.clone()),
            DomainError::is_transient,
            "insert_tutor_payment",
        )
        .await?;

        Ok(match outcome {
            InsertOutcome::Inserted(created) => {
                debug!(
                    payment_id = created.id,
                    teacher_id,
                    rate_type = %created.rate_type,
                    amount = created.amount,
                    sessions = created.sessions_count,
                    "Payout created"
                );
                ItemOutcome::Created
            }
            InsertOutcome::Duplicate => ItemOutcome::Skipped,
        })
    }

    // ── Status transitions ─────────────────────────────────────

    pub async fn list_by_month(&self, payment_month: &str) -> DomainResult<Vec<TutorPayment>> {
        let month = Period::parse(payment_month)?;
        self.repos.payouts().find_by_month(month).await
    }

    pub async fn get(&self, id: i32) -> DomainResult<TutorPayment> {
        self.repos
            .payouts()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "TutorPayment",
                field: "id",
                value: id.to_string(),
            })
    }

    pub async fn mark_paid(
        &self,
        id: i32,
        payment_method: &str,
        paid_at: DateTime<Utc>,
    ) -> DomainResult<TutorPayment> {
        if payment_method.trim().is_empty() {
            return Err(DomainError::validation("payment_method is required"));
        }
        let mut payment = self.get(id).await?;
        let from = payment.status;
        payment.mark_paid(payment_method, paid_at)?;
        self.repos.payouts().update_status(&payment, from).await?;
        info!(payment_id = id, payment_method, "Payout marked paid");
        Ok(payment)
    }

    pub async fn mark_overdue(&self, id: i32) -> DomainResult<TutorPayment> {
        let mut payment = self.get(id).await?;
        let from = payment.status;
        payment.mark_overdue()?;
        self.repos.payouts().update_status(&payment, from).await?;
        info!(payment_id = id, "Payout marked overdue");
        Ok(payment)
    }

    pub async fn cancel(&self, id: i32) -> DomainResult<TutorPayment> {
        let mut payment = self.get(id).await?;
        let from = payment.status;
        payment.cancel()?;
        self.repos.payouts().update_status(&payment, from).await?;
        info!(payment_id = id, "Payout cancelled");
        Ok(payment)
    }
}

fn teacher_key(teacher_id: i32) -> String {
    format!("teacher:{}", teacher_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::rates::RateService;
    use crate::domain::{RateChange, RateType, SessionRecord, SettlementStatus};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use chrono::{NaiveDate, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn add_session(
        repos: &InMemoryRepositoryProvider,
        teacher_id: i32,
        on: NaiveDate,
        minutes: i64,
        students: u32,
        valid: bool,
    ) {
        let start = NaiveTime::from_hms_opt(15, 0, 0).unwrap();
        repos
            .sessions()
            .record(SessionRecord {
                id: 0,
                teacher_id,
                class_id: 1,
                session_date: on,
                start_time: start,
                end_time: start + chrono::Duration::minutes(minutes),
                is_valid: valid,
                student_count: students,
            })
            .await
            .unwrap();
    }

    fn setup() -> (Arc<InMemoryRepositoryProvider>, RateService, CompensationCalculator) {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        (
            repos.clone(),
            RateService::new(repos.clone()),
            CompensationCalculator::new(repos),
        )
    }

    #[tokio::test]
    async fn hourly_pay_for_two_ninety_minute_sessions() {
        let (repos, rates, calc) = setup();
        rates
            .create_rate(1, RateType::Hourly, 100_000, date(2024, 1, 1))
            .await
            .unwrap();
        add_session(&repos, 1, date(2024, 6, 3), 90, 4, true).await;
        add_session(&repos, 1, date(2024, 6, 10), 90, 4, true).await;
        add_session(&repos, 1, date(2024, 6, 17), 90, 4, false).await;

        let result = calc.calculate_monthly_tutor_pay("2024-06").await.unwrap();
        assert_eq!(result.created, 1);

        let payouts = calc.list_by_month("2024-06").await.unwrap();
        assert_eq!(payouts[0].amount, 300_000);
        assert_eq!(payouts[0].sessions_count, 2);
        assert_eq!(payouts[0].minutes_taught, 180);
    }

    #[tokio::test]
    async fn no_valid_sessions_no_payout() {
        let (repos, rates, calc) = setup();
        rates
            .create_rate(1, RateType::Hourly, 100_000, date(2024, 1, 1))
            .await
            .unwrap();
        rates
            .create_rate(2, RateType::MonthlyFixed, 2_000_000, date(2024, 1, 1))
            .await
            .unwrap();
        add_session(&repos, 1, date(2024, 6, 3), 60, 3, false).await;

        let result = calc.calculate_monthly_tutor_pay("2024-06").await.unwrap();
        assert_eq!((result.created, result.skipped), (0, 2));
        assert!(calc.list_by_month("2024-06").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn monthly_fixed_with_one_session_pays_flat_rate() {
        let (repos, rates, calc) = setup();
        rates
            .create_rate(2, RateType::MonthlyFixed, 2_000_000, date(2024, 1, 1))
            .await
            .unwrap();
        add_session(&repos, 2, date(2024, 6, 3), 45, 1, true).await;

        calc.calculate_monthly_tutor_pay("2024-06").await.unwrap();
        let payouts = calc.list_by_month("2024-06").await.unwrap();
        assert_eq!(payouts[0].amount, 2_000_000);
        assert_eq!(payouts[0].rate_type, RateType::MonthlyFixed);
    }

    #[tokio::test]
    async fn per_student_sums_session_snapshots() {
        let (repos, rates, calc) = setup();
        rates
            .create_rate(3, RateType::PerStudent, 20_000, date(2024, 1, 1))
            .await
            .unwrap();
        add_session(&repos, 3, date(2024, 6, 3), 60, 3, true).await;
        add_session(&repos, 3, date(2024, 6, 10), 60, 5, true).await;

        calc.calculate_monthly_tutor_pay("2024-06").await.unwrap();
        let p = &calc.list_by_month("2024-06").await.unwrap()[0];
        assert_eq!(p.students_count, 8);
        assert_eq!(p.amount, 160_000);
    }

    #[tokio::test]
    async fn rerun_skips_existing_payouts() {
        let (repos, rates, calc) = setup();
        rates
            .create_rate(1, RateType::Hourly, 60_000, date(2024, 1, 1))
            .await
            .unwrap();
        add_session(&repos, 1, date(2024, 6, 3), 60, 2, true).await;

        assert_eq!(calc.calculate_monthly_tutor_pay("2024-06").await.unwrap().created, 1);
        let again = calc.calculate_monthly_tutor_pay("2024-06").await.unwrap();
        assert_eq!((again.created, again.skipped), (0, 1));
    }

    #[tokio::test]
    async fn rate_history_keeps_earlier_payouts_frozen() {
        let (repos, rates, calc) = setup();
        let old = rates
            .create_rate(1, RateType::Hourly, 60_000, date(2024, 1, 1))
            .await
            .unwrap();
        add_session(&repos, 1, date(2024, 5, 6), 60, 2, true).await;
        add_session(&repos, 1, date(2024, 6, 3), 60, 2, true).await;

        calc.calculate_monthly_tutor_pay("2024-05").await.unwrap();

        let err = rates
            .update_rate(
                old.id,
                RateChange {
                    amount: Some(90_000),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RateInUse { .. }));

        rates
            .create_rate(1, RateType::Hourly, 90_000, date(2024, 6, 1))
            .await
            .unwrap();
        calc.calculate_monthly_tutor_pay("2024-06").await.unwrap();

        assert_eq!(calc.list_by_month("2024-05").await.unwrap()[0].amount, 60_000);
        assert_eq!(calc.list_by_month("2024-06").await.unwrap()[0].amount, 90_000);
    }

    #[tokio::test]
    async fn rate_effective_after_month_end_is_ignored() {
        let (repos, rates, calc) = setup();
        rates
            .create_rate(1, RateType::Hourly, 60_000, date(2024, 7, 1))
            .await
            .unwrap();
        add_session(&repos, 1, date(2024, 6, 3), 60, 2, true).await;

        let result = calc.calculate_monthly_tutor_pay("2024-06").await.unwrap();
        assert_eq!(result.total(), 0);
    }

    #[tokio::test]
    async fn payout_transitions() {
        let (repos, rates, calc) = setup();
        rates
            .create_rate(1, RateType::Hourly, 60_000, date(2024, 1, 1))
            .await
            .unwrap();
        add_session(&repos, 1, date(2024, 6, 3), 60, 2, true).await;
        calc.calculate_monthly_tutor_pay("2024-06").await.unwrap();

        let paid = calc.mark_paid(1, "bank_transfer", Utc::now()).await.unwrap();
        assert_eq!(paid.status, SettlementStatus::Paid);
        assert!(matches!(
            calc.cancel(1).await.unwrap_err(),
            DomainError::InvalidTransition { .. }
        ));
        assert!(calc.mark_paid(1, " ", Utc::now()).await.is_err());
    }
}
