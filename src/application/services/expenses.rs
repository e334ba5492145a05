//! Expense and expense category management

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{
    CategoryType, DomainResult, Expense, ExpenseCategory, RecurringInterval, RepositoryProvider,
};
use crate::shared::errors::DomainError;

pub struct ExpenseService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ExpenseService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn record_expense(
        &self,
        category_id: i32,
        amount: i64,
        expense_date: NaiveDate,
        description: Option<String>,
        recurring_interval: Option<RecurringInterval>,
    ) -> DomainResult<Expense> {
        self.find_category(category_id).await?;
        let expense = Expense::new(category_id, amount, expense_date, description, recurring_interval)?;
        let expense = self.repos.expenses().insert(expense).await?;

        info!(
            expense_id = expense.id,
            category_id,
            amount,
            recurring = ?recurring_interval.map(|i| i.as_str()),
            "Expense recorded"
        );
        Ok(expense)
    }

    pub async fn list_expenses(&self) -> DomainResult<Vec<Expense>> {
        self.repos.expenses().find_all().await
    }

    pub async fn create_category(
        &self,
        name: &str,
        category_type: CategoryType,
    ) -> DomainResult<ExpenseCategory> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("category name is required"));
        }
        let category = self
            .repos
            .expenses()
            .insert_category(ExpenseCategory {
                id: 0,
                name: name.to_string(),
                category_type,
            })
            .await?;
        info!(category_id = category.id, name, "Expense category created");
        Ok(category)
    }

    pub async fn list_categories(&self) -> DomainResult<Vec<ExpenseCategory>> {
        self.repos.expenses().find_categories().await
    }

    /// Delete a category that no expense references.
    pub async fn delete_category(&self, id: i32) -> DomainResult<()> {
        self.find_category(id).await?;

        let expense_count = self.repos.expenses().count_by_category(id).await?;
        if expense_count > 0 {
            return Err(DomainError::CategoryInUse {
                category_id: id,
                expense_count,
            });
        }

        self.repos.expenses().delete_category(id).await?;
        info!(category_id = id, "Expense category deleted");
        Ok(())
    }

    async fn find_category(&self, id: i32) -> DomainResult<ExpenseCategory> {
        self.repos
            .expenses()
            .find_category(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "ExpenseCategory",
                field: "id",
                value: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn service() -> ExpenseService {
        ExpenseService::new(Arc::new(InMemoryRepositoryProvider::new()))
    }

    #[tokio::test]
    async fn category_in_use_cannot_be_deleted() {
        let svc = service();
        let cat = svc.create_category("Rent", CategoryType::Facility).await.unwrap();
        svc.record_expense(
            cat.id,
            1_000,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            None,
            Some(RecurringInterval::Monthly),
        )
        .await
        .unwrap();

        let err = svc.delete_category(cat.id).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::CategoryInUse {
                expense_count: 1,
                ..
            }
        ));
        assert_eq!(svc.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unused_category_is_deleted() {
        let svc = service();
        let cat = svc.create_category("Flyers", CategoryType::Marketing).await.unwrap();
        svc.delete_category(cat.id).await.unwrap();
        assert!(matches!(
            svc.delete_category(cat.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn expense_requires_known_category() {
        let svc = service();
        let err = svc
            .record_expense(7, 100, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn duplicate_category_name_conflicts() {
        let svc = service();
        svc.create_category("Rent", CategoryType::Facility).await.unwrap();
        assert!(matches!(
            svc.create_category("Rent", CategoryType::Facility).await.unwrap_err(),
            DomainError::Conflict(_)
        ));
        assert!(svc.create_category("  ", CategoryType::Facility).await.is_err());
    }
}
