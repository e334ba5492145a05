//! Rate resolution and rate history management

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::rate::resolve;
use crate::domain::{
    DomainResult, RateChange, RateType, RepositoryProvider, TeacherRate,
};
use crate::shared::errors::DomainError;

/// Resolves teacher rates from their effective-dated history.
pub struct RateService {
    repos: Arc<dyn RepositoryProvider>,
}

impl RateService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// The rate in force for `teacher_id` on `on_date`.
    pub async fn resolve(
        &self,
        teacher_id: i32,
        on_date: NaiveDate,
        rate_type: Option<RateType>,
    ) -> DomainResult<TeacherRate> {
        let history = self.repos.rates().find_by_teacher(teacher_id).await?;
        resolve(&history, on_date, rate_type)
            .cloned()
            .ok_or_else(|| DomainError::NotFound {
                entity: "TeacherRate",
                field: "teacher_id",
                value: format!("{} on {}", teacher_id, on_date),
            })
    }

    pub async fn history(&self, teacher_id: i32) -> DomainResult<Vec<TeacherRate>> {
        self.repos.rates().find_by_teacher(teacher_id).await
    }

    pub async fn list_active(&self) -> DomainResult<Vec<TeacherRate>> {
        self.repos.rates().find_active().await
    }

    pub async fn create_rate(
        &self,
        teacher_id: i32,
        rate_type: RateType,
        amount: i64,
        effective_date: NaiveDate,
    ) -> DomainResult<TeacherRate> {
        let rate = TeacherRate::new(teacher_id, rate_type, amount, effective_date)?;
        let rate = self.repos.rates().insert(rate).await?;

        info!(
            rate_id = rate.id,
            teacher_id,
            rate_type = %rate.rate_type,
            amount,
            %effective_date,
            "Teacher rate created"
        );

        Ok(rate)
    }

    /// Number of payouts computed with this rate.
    pub async fn usage_count(&self, rate_id: i32) -> DomainResult<u64> {
        self.repos.payouts().count_by_rate(rate_id).await
    }

    /// Edit a rate in place. Only allowed while no payout references it.
    pub async fn update_rate(&self, rate_id: i32, change: RateChange) -> DomainResult<TeacherRate> {
        if change.is_empty() {
            return Err(DomainError::validation(
                "rate update must change amount, rate_type or effective_date",
            ));
        }
        let mut rate = self.find(rate_id).await?;

        let usage_count = self.usage_count(rate_id).await?;
        if usage_count > 0 {
            return Err(DomainError::RateInUse {
                rate_id,
                usage_count,
            });
        }

        rate.apply(&change)?;
        if !self.repos.rates().update_unused(&rate).await? {
            // a payout picked the rate up after the count above
            return Err(DomainError::RateInUse {
                rate_id,
                usage_count: self.usage_count(rate_id).await?.max(1),
            });
        }

        info!(rate_id, amount = rate.amount, rate_type = %rate.rate_type, "Teacher rate updated");
        Ok(rate)
    }

    /// Stop a rate from being resolved. Allowed even when payouts reference it.
    pub async fn deactivate_rate(&self, rate_id: i32) -> DomainResult<TeacherRate> {
        let mut rate = self.find(rate_id).await?;
        if rate.is_active {
            self.repos.rates().deactivate(rate_id).await?;
            rate.is_active = false;
            info!(rate_id, teacher_id = rate.teacher_id, "Teacher rate deactivated");
        }
        Ok(rate)
    }

    async fn find(&self, rate_id: i32) -> DomainResult<TeacherRate> {
        self.repos
            .rates()
            .find_by_id(rate_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "TeacherRate",
                field: "id",
                value: rate_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Period, PayoutBasis, Rate, TutorPayment};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> (Arc<InMemoryRepositoryProvider>, RateService) {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        (repos.clone(), RateService::new(repos))
    }

    #[tokio::test]
    async fn resolve_without_history_is_not_found() {
        let (_, svc) = service();
        let err = svc.resolve(1, date(2024, 1, 1), None).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn rate_in_use_cannot_be_edited() {
        let (repos, svc) = service();
        let rate = svc
            .create_rate(1, RateType::Hourly, 80_000, date(2024, 1, 1))
            .await
            .unwrap();
        let payment = TutorPayment::new_pending(
            1,
            Period::parse("2024-01").unwrap(),
            rate.id,
            Rate::Hourly(80_000),
            PayoutBasis::default(),
        );
        repos.payouts().insert(payment).await.unwrap();

        let err = svc
            .update_rate(
                rate.id,
                RateChange {
                    amount: Some(90_000),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::RateInUse {
                usage_count: 1,
                ..
            }
        ));

        // unchanged
        let stored = svc.resolve(1, date(2024, 1, 15), None).await.unwrap();
        assert_eq!(stored.amount, 80_000);
    }

    #[tokio::test]
    async fn empty_rate_change_is_rejected() {
        let (_, svc) = service();
        let rate = svc
            .create_rate(1, RateType::Hourly, 80_000, date(2024, 1, 1))
            .await
            .unwrap();
        let err = svc
            .update_rate(rate.id, RateChange::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn unused_rate_can_be_edited() {
        let (_, svc) = service();
        let rate = svc
            .create_rate(1, RateType::Hourly, 80_000, date(2024, 1, 1))
            .await
            .unwrap();
        let updated = svc
            .update_rate(
                rate.id,
                RateChange {
                    rate_type: Some(RateType::MonthlyFixed),
                    amount: Some(2_000_000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.rate(), Rate::MonthlyFixed(2_000_000));
    }

    #[tokio::test]
    async fn later_rate_applies_from_its_effective_date() {
        let (_, svc) = service();
        svc.create_rate(1, RateType::Hourly, 80_000, date(2024, 1, 1))
            .await
            .unwrap();
        svc.create_rate(1, RateType::Hourly, 100_000, date(2024, 6, 1))
            .await
            .unwrap();

        assert_eq!(svc.resolve(1, date(2024, 5, 31), None).await.unwrap().amount, 80_000);
        assert_eq!(svc.resolve(1, date(2024, 6, 1), None).await.unwrap().amount, 100_000);
    }

    #[tokio::test]
    async fn deactivate_is_idempotent() {
        let (_, svc) = service();
        let rate = svc
            .create_rate(3, RateType::PerStudent, 20_000, date(2024, 1, 1))
            .await
            .unwrap();
        assert!(!svc.deactivate_rate(rate.id).await.unwrap().is_active);
        assert!(!svc.deactivate_rate(rate.id).await.unwrap().is_active);
        assert!(svc.resolve(3, date(2024, 2, 1), None).await.is_err());
    }

    #[tokio::test]
    async fn update_unknown_rate_is_not_found() {
        let (_, svc) = service();
        let err = svc.update_rate(99, RateChange::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
