//! SeaORM implementation of ExpenseRepository

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use super::{corrupt, db_err, is_unique_violation};
use crate::domain::{
    CategoryType, DomainError, DomainResult, Expense, ExpenseCategory, ExpenseRepository,
    RecurringInterval,
};
use crate::infrastructure::database::entities::{expense, expense_category};

fn to_domain(m: expense::Model) -> DomainResult<Expense> {
    let recurring_interval = match (m.is_recurring, m.recurring_interval.as_deref()) {
        (false, _) => None,
        (true, Some(s)) => Some(
            RecurringInterval::from_str(s)
                .ok_or_else(|| corrupt("expense", format!("recurring_interval '{}'", s)))?,
        ),
        (true, None) => return Err(corrupt("expense", "recurring without interval")),
    };
    Ok(Expense {
        id: m.id,
        category_id: m.category_id,
        amount: m.amount,
        expense_date: m.expense_date,
        description: m.description,
        recurring_interval,
    })
}

fn category_to_domain(m: expense_category::Model) -> DomainResult<ExpenseCategory> {
    let category_type = CategoryType::from_str(&m.category_type)
        .ok_or_else(|| corrupt("expense_category", format!("category_type '{}'", m.category_type)))?;
    Ok(ExpenseCategory {
        id: m.id,
        name: m.name,
        category_type,
    })
}

pub struct SeaOrmExpenseRepository {
    db: DatabaseConnection,
}

impl SeaOrmExpenseRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExpenseRepository for SeaOrmExpenseRepository {
    async fn insert(&self, e: Expense) -> DomainResult<Expense> {
        let model = expense::ActiveModel {
            category_id: Set(e.category_id),
            amount: Set(e.amount),
            expense_date: Set(e.expense_date),
            description: Set(e.description),
            is_recurring: Set(e.recurring_interval.is_some()),
            recurring_interval: Set(e.recurring_interval.map(|i| i.as_str().to_string())),
            ..Default::default()
        };
        let created = model.insert(&self.db).await.map_err(db_err)?;
        to_domain(created)
    }

    async fn find_relevant(&self, start: NaiveDate, end: NaiveDate) -> DomainResult<Vec<Expense>> {
        let one_off = Condition::all()
            .add(expense::Column::IsRecurring.eq(false))
            .add(expense::Column::ExpenseDate.between(start, end));
        let recurring = Condition::all()
            .add(expense::Column::IsRecurring.eq(true))
            .add(expense::Column::ExpenseDate.lte(end));

        expense::Entity::find()
            .filter(Condition::any().add(one_off).add(recurring))
            .order_by_asc(expense::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn find_all(&self) -> DomainResult<Vec<Expense>> {
        expense::Entity::find()
            .order_by_asc(expense::Column::ExpenseDate)
            .order_by_asc(expense::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn count_by_category(&self, category_id: i32) -> DomainResult<u64> {
        expense::Entity::find()
            .filter(expense::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    // ── Categories ─────────────────────────────────────────────

    async fn insert_category(&self, c: ExpenseCategory) -> DomainResult<ExpenseCategory> {
        let model = expense_category::ActiveModel {
            name: Set(c.name.clone()),
            category_type: Set(c.category_type.as_str().to_string()),
            ..Default::default()
        };
        match model.insert(&self.db).await {
            Ok(created) => category_to_domain(created),
            Err(e) if is_unique_violation(&e) => Err(DomainError::Conflict(format!(
                "expense category '{}' already exists",
                c.name
            ))),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn find_category(&self, id: i32) -> DomainResult<Option<ExpenseCategory>> {
        expense_category::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(category_to_domain)
            .transpose()
    }

    async fn find_categories(&self) -> DomainResult<Vec<ExpenseCategory>> {
        expense_category::Entity::find()
            .order_by_asc(expense_category::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(category_to_domain)
            .collect()
    }

    async fn delete_category(&self, id: i32) -> DomainResult<()> {
        let result = expense_category::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "ExpenseCategory",
                field: "id",
                value: id.to_string(),
            });
        }
        Ok(())
    }
}
