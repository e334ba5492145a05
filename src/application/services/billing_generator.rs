//! Monthly tuition invoice generation and invoice status transitions

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::billing::format_invoice_number;
use crate::domain::{
    BatchResult, DomainResult, Enrollment, InsertOutcome, ItemOutcome, Period, RepositoryProvider,
    SettlementStatus, TuitionBilling,
};
use crate::shared::errors::DomainError;
use crate::shared::retry::{retry_with_backoff, RetryConfig};

pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

/// Creates one tuition invoice per active enrollment per month.
pub struct BillingGenerator {
    repos: Arc<dyn RepositoryProvider>,
    invoice_prefix: String,
    retry: RetryConfig,
}

impl BillingGenerator {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            repos,
            invoice_prefix: DEFAULT_INVOICE_PREFIX.to_string(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_invoice_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.invoice_prefix = prefix.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Generate invoices for `billing_month` (`YYYY-MM`).
    ///
    /// Re-running for the same month is safe: existing invoices are skipped,
    /// including ones inserted concurrently by another run.
    pub async fn generate_monthly_billing(
        &self,
        billing_month: &str,
        due_date: Option<NaiveDate>,
        class_ids: Option<&[i32]>,
    ) -> DomainResult<BatchResult> {
        let month = Period::parse(billing_month)?;
        let due_date =
            due_date.ok_or_else(|| DomainError::validation("due_date is required"))?;

        let run_id = Uuid::new_v4();
        let span = info_span!("billing_run", %run_id, billing_month = %month);

        async move {
            let last_day = month.last_day();
            let enrollments: Vec<Enrollment> = self
                .repos
                .enrollments()
                .find_active(class_ids)
                .await?
                .into_iter()
                .filter(|e| e.is_enrolled_by(last_day))
                .collect();

            info!(candidates = enrollments.len(), %due_date, "Starting tuition billing run");

            let mut result = BatchResult::default();
            for enrollment in &enrollments {
                let outcome = match self.bill_enrollment(enrollment, month, due_date).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(item = %enrollment.key(), error = %e, "Billing item failed");
                        ItemOutcome::failed(enrollment.key(), e.to_string())
                    }
                };
                result = result.record(outcome);
            }

            metrics::counter!("billing_invoices_created_total").increment(u64::from(result.created));
            metrics::counter!("billing_invoices_skipped_total").increment(u64::from(result.skipped));
            metrics::counter!("billing_invoices_failed_total").increment(result.failed.len() as u64);

            info!(
                created = result.created,
                skipped = result.skipped,
                failed = result.failed.len(),
                "Tuition billing run finished"
            );

            Ok::<_, DomainError>(result)
        }
        .instrument(span)
        .await
    }

    async fn bill_enrollment(
        &self,
        enrollment: &Enrollment,
        month: Period,
        due_date: NaiveDate,
    ) -> DomainResult<ItemOutcome> {
        let billings = self.repos.billings();

        if billings
            .exists(enrollment.student_id, enrollment.class_id, month)
            .await?
        {
            return Ok(ItemOutcome::Skipped);
        }

        let Some(tuition) = self
            .repos
            .enrollments()
            .find_tuition(enrollment.class_id)
            .await?
        else {
            warn!(class_id = enrollment.class_id, "Class has no tuition configured");
            return Ok(ItemOutcome::failed(
                enrollment.key(),
                format!("class {} has no tuition configured", enrollment.class_id),
            ));
        };

        let sequence = billings.next_invoice_sequence(month).await?;
        let billing = TuitionBilling::new_pending(
            enrollment.student_id,
            enrollment.class_id,
            month,
            tuition.amount,
            due_date,
            format_invoice_number(&self.invoice_prefix, month, sequence),
        );

        let outcome = retry_with_backoff(
            self.retry.clone(),
            || billings.insert(billing.clone()),
            DomainError::is_transient,
            "insert_tuition_billing",
        )
        .await?;

        Ok(match outcome {
            InsertOutcome::Inserted(created) => {
                debug!(
                    billing_id = created.id,
                    invoice_number = %created.invoice_number,
                    amount = created.amount,
                    "Invoice created"
                );
                ItemOutcome::Created
            }
            InsertOutcome::Duplicate => {
                debug!(item = %enrollment.key(), "Invoice inserted concurrently, skipping");
                ItemOutcome::Skipped
            }
        })
    }

    // ── Status transitions ─────────────────────────────────────

    pub async fn list_by_month(&self, billing_month: &str) -> DomainResult<Vec<TuitionBilling>> {
        let month = Period::parse(billing_month)?;
        self.repos.billings().find_by_month(month).await
    }

    pub async fn get(&self, id: i32) -> DomainResult<TuitionBilling> {
        self.repos
            .billings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "TuitionBilling",
                field: "id",
                value: id.to_string(),
            })
    }

    pub async fn mark_paid(
        &self,
        id: i32,
        payment_method: &str,
        paid_at: DateTime<Utc>,
    ) -> DomainResult<TuitionBilling> {
        if payment_method.trim().is_empty() {
            return Err(DomainError::validation("payment_method is required"));
        }
        let mut billing = self.get(id).await?;
        let from = billing.status;
        billing.mark_paid(payment_method, paid_at)?;
        self.repos.billings().update_status(&billing, from).await?;
        info!(billing_id = id, payment_method, "Invoice marked paid");
        Ok(billing)
    }

    pub async fn mark_overdue(&self, id: i32) -> DomainResult<TuitionBilling> {
        let mut billing = self.get(id).await?;
        let from = billing.status;
        billing.mark_overdue()?;
        self.repos.billings().update_status(&billing, from).await?;
        info!(billing_id = id, "Invoice marked overdue");
        Ok(billing)
    }

    pub async fn cancel(&self, id: i32) -> DomainResult<TuitionBilling> {
        let mut billing = self.get(id).await?;
        let from = billing.status;
        billing.cancel()?;
        self.repos.billings().update_status(&billing, from).await?;
        info!(billing_id = id, "Invoice cancelled");
        Ok(billing)
    }

    /// Flip every pending invoice due before `as_of` to overdue.
    pub async fn sweep_overdue(&self, as_of: NaiveDate) -> DomainResult<u32> {
        let due = self.repos.billings().find_unpaid_due_before(as_of).await?;

        let mut flipped = 0;
        for mut billing in due
            .into_iter()
            .filter(|b| b.status == SettlementStatus::Pending)
        {
            billing.mark_overdue()?;
            // settled since the scan: the row is left as it is
            if let Err(e) = self
                .repos
                .billings()
                .update_status(&billing, SettlementStatus::Pending)
                .await
            {
                warn!(billing_id = billing.id, error = %e, "Failed to mark invoice overdue");
                continue;
            }
            flipped += 1;
        }

        if flipped > 0 {
            info!(count = flipped, %as_of, "Overdue invoices swept");
        }
        Ok(flipped)
    }
}
