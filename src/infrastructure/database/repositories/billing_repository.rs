//! SeaORM implementation of BillingRepository

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, Statement, UpdateResult,
};

use super::{corrupt, db_err, day_bounds, is_unique_violation, parse_period, parse_status};
use crate::domain::{
    BillingRepository, DomainError, DomainResult, InsertOutcome, Period, PeriodRange,
    SettlementStatus, TuitionBilling,
};
use crate::infrastructure::database::entities::tuition_billing;

const ENTITY: &str = "tuition_billing";

fn to_domain(m: tuition_billing::Model) -> DomainResult<TuitionBilling> {
    Ok(TuitionBilling {
        id: m.id,
        student_id: m.student_id,
        class_id: m.class_id,
        billing_month: parse_period(ENTITY, &m.billing_month)?,
        amount: m.amount,
        status: parse_status(ENTITY, &m.status)?,
        due_date: m.due_date,
        paid_at: m.paid_at,
        payment_method: m.payment_method,
        invoice_number: m.invoice_number,
        created_at: m.created_at,
    })
}

fn all_to_domain(models: Vec<tuition_billing::Model>) -> DomainResult<Vec<TuitionBilling>> {
    models.into_iter().map(to_domain).collect()
}

pub struct SeaOrmBillingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBillingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BillingRepository for SeaOrmBillingRepository {
    async fn exists(&self, student_id: i32, class_id: i32, month: Period) -> DomainResult<bool> {
        let count = tuition_billing::Entity::find()
            .filter(tuition_billing::Column::StudentId.eq(student_id))
            .filter(tuition_billing::Column::ClassId.eq(class_id))
            .filter(tuition_billing::Column::BillingMonth.eq(month.to_string()))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn insert(&self, b: TuitionBilling) -> DomainResult<InsertOutcome<TuitionBilling>> {
        let model = tuition_billing::ActiveModel {
            student_id: Set(b.student_id),
            class_id: Set(b.class_id),
            billing_month: Set(b.billing_month.to_string()),
            amount: Set(b.amount),
            status: Set(b.status.as_str().to_string()),
            due_date: Set(b.due_date),
            paid_at: Set(b.paid_at),
            payment_method: Set(b.payment_method),
            invoice_number: Set(b.invoice_number),
            created_at: Set(b.created_at),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(created) => Ok(InsertOutcome::Inserted(to_domain(created)?)),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn next_invoice_sequence(&self, month: Period) -> DomainResult<u32> {
        let backend = self.db.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "INSERT INTO invoice_sequences (period, last_value) VALUES (?, 1) \
             ON CONFLICT (period) DO UPDATE SET last_value = invoice_sequences.last_value + 1 \
             RETURNING last_value",
            [month.to_string().into()],
        );
        let row = self
            .db
            .query_one(stmt)
            .await
            .map_err(db_err)?
            .ok_or_else(|| corrupt("invoice_sequence", "no value returned"))?;
        let value: i32 = row.try_get("", "last_value").map_err(db_err)?;
        u32::try_from(value).map_err(|_| corrupt("invoice_sequence", value))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<TuitionBilling>> {
        tuition_billing::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(to_domain)
            .transpose()
    }

    async fn update_status(&self, b: &TuitionBilling, from: SettlementStatus) -> DomainResult<()> {
        let result: UpdateResult = tuition_billing::Entity::update_many()
            .col_expr(tuition_billing::Column::Status, Expr::value(b.status.as_str()))
            .col_expr(tuition_billing::Column::PaidAt, Expr::value(b.paid_at))
            .col_expr(
                tuition_billing::Column::PaymentMethod,
                Expr::value(b.payment_method.clone()),
            )
            .filter(tuition_billing::Column::Id.eq(b.id))
            .filter(tuition_billing::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected > 0 {
            return Ok(());
        }

        let current = tuition_billing::Entity::find_by_id(b.id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::NotFound {
                entity: "TuitionBilling",
                field: "id",
                value: b.id.to_string(),
            })?;
        Err(parse_status(ENTITY, &current.status)?.rejected("TuitionBilling", b.status))
    }

    async fn find_by_month(&self, month: Period) -> DomainResult<Vec<TuitionBilling>> {
        let models = tuition_billing::Entity::find()
            .filter(tuition_billing::Column::BillingMonth.eq(month.to_string()))
            .order_by_asc(tuition_billing::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        all_to_domain(models)
    }

    async fn find_in_range(&self, range: PeriodRange) -> DomainResult<Vec<TuitionBilling>> {
        // zero-padded keys sort lexically
        let models = tuition_billing::Entity::find()
            .filter(
                tuition_billing::Column::BillingMonth
                    .between(range.from.to_string(), range.to.to_string()),
            )
            .order_by_asc(tuition_billing::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        all_to_domain(models)
    }

    async fn find_paid_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<TuitionBilling>> {
        let (lower, upper) = day_bounds(start, end);
        let models = tuition_billing::Entity::find()
            .filter(tuition_billing::Column::Status.eq(SettlementStatus::Paid.as_str()))
            .filter(tuition_billing::Column::PaidAt.gte(lower))
            .filter(tuition_billing::Column::PaidAt.lt(upper))
            .order_by_asc(tuition_billing::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        all_to_domain(models)
    }

    async fn find_unpaid_due_before(&self, as_of: NaiveDate) -> DomainResult<Vec<TuitionBilling>> {
        let models = tuition_billing::Entity::find()
            .filter(tuition_billing::Column::Status.is_in([
                SettlementStatus::Pending.as_str(),
                SettlementStatus::Overdue.as_str(),
            ]))
            .filter(tuition_billing::Column::DueDate.lt(as_of))
            .order_by_asc(tuition_billing::Column::DueDate)
            .order_by_asc(tuition_billing::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        all_to_domain(models)
    }
}
