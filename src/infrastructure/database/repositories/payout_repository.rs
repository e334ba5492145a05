//! SeaORM implementation of PayoutRepository

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, UpdateResult,
};

use super::{corrupt, db_err, day_bounds, is_unique_violation, parse_period, parse_status};
use crate::domain::{
    DomainError, DomainResult, InsertOutcome, PayoutRepository, Period, PeriodRange, RateType,
    SettlementStatus, TutorPayment,
};
use crate::infrastructure::database::entities::tutor_payment;

const ENTITY: &str = "tutor_payment";

fn count_from_db(value: i32) -> DomainResult<u32> {
    u32::try_from(value).map_err(|_| corrupt(ENTITY, format!("negative count {}", value)))
}

fn count_to_db(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn to_domain(m: tutor_payment::Model) -> DomainResult<TutorPayment> {
    let rate_type = RateType::from_str(&m.rate_type)
        .ok_or_else(|| corrupt(ENTITY, format!("rate_type '{}'", m.rate_type)))?;
    Ok(TutorPayment {
        id: m.id,
        teacher_id: m.teacher_id,
        payment_month: parse_period(ENTITY, &m.payment_month)?,
        amount: m.amount,
        sessions_count: count_from_db(m.sessions_count)?,
        students_count: count_from_db(m.students_count)?,
        minutes_taught: m.minutes_taught,
        rate_id: m.rate_id,
        rate_type,
        status: parse_status(ENTITY, &m.status)?,
        payment_method: m.payment_method,
        paid_at: m.paid_at,
        created_at: m.created_at,
    })
}

fn all_to_domain(models: Vec<tutor_payment::Model>) -> DomainResult<Vec<TutorPayment>> {
    models.into_iter().map(to_domain).collect()
}

pub struct SeaOrmPayoutRepository {
    db: DatabaseConnection,
}

impl SeaOrmPayoutRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PayoutRepository for SeaOrmPayoutRepository {
    async fn exists(&self, teacher_id: i32, month: Period) -> DomainResult<bool> {
        let count = tutor_payment::Entity::find()
            .filter(tutor_payment::Column::TeacherId.eq(teacher_id))
            .filter(tutor_payment::Column::PaymentMonth.eq(month.to_string()))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn insert(&self, p: TutorPayment) -> DomainResult<InsertOutcome<TutorPayment>> {
        let model = tutor_payment::ActiveModel {
            teacher_id: Set(p.teacher_id),
            payment_month: Set(p.payment_month.to_string()),
            amount: Set(p.amount),
            sessions_count: Set(count_to_db(p.sessions_count)),
            students_count: Set(count_to_db(p.students_count)),
            minutes_taught: Set(p.minutes_taught),
            rate_id: Set(p.rate_id),
            rate_type: Set(p.rate_type.as_str().to_string()),
            status: Set(p.status.as_str().to_string()),
            payment_method: Set(p.payment_method),
            paid_at: Set(p.paid_at),
            created_at: Set(p.created_at),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(created) => Ok(InsertOutcome::Inserted(to_domain(created)?)),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<TutorPayment>> {
        tutor_payment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(to_domain)
            .transpose()
    }

    async fn update_status(&self, p: &TutorPayment, from: SettlementStatus) -> DomainResult<()> {
        let result: UpdateResult = tutor_payment::Entity::update_many()
            .col_expr(tutor_payment::Column::Status, Expr::value(p.status.as_str()))
            .col_expr(tutor_payment::Column::PaidAt, Expr::value(p.paid_at))
            .col_expr(
                tutor_payment::Column::PaymentMethod,
                Expr::value(p.payment_method.clone()),
            )
            .filter(tutor_payment::Column::Id.eq(p.id))
            .filter(tutor_payment::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected > 0 {
            return Ok(());
        }

        let current = tutor_payment::Entity::find_by_id(p.id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::NotFound {
                entity: "TutorPayment",
                field: "id",
                value: p.id.to_string(),
            })?;
        Err(parse_status(ENTITY, &current.status)?.rejected("TutorPayment", p.status))
    }

    async fn find_by_month(&self, month: Period) -> DomainResult<Vec<TutorPayment>> {
        let models = tutor_payment::Entity::find()
            .filter(tutor_payment::Column::PaymentMonth.eq(month.to_string()))
            .order_by_asc(tutor_payment::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        all_to_domain(models)
    }

    async fn find_in_range(&self, range: PeriodRange) -> DomainResult<Vec<TutorPayment>> {
        let models = tutor_payment::Entity::find()
            .filter(
                tutor_payment::Column::PaymentMonth
                    .between(range.from.to_string(), range.to.to_string()),
            )
            .order_by_asc(tutor_payment::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        all_to_domain(models)
    }

    async fn find_paid_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<TutorPayment>> {
        let (lower, upper) = day_bounds(start, end);
        let models = tutor_payment::Entity::find()
            .filter(tutor_payment::Column::Status.eq(SettlementStatus::Paid.as_str()))
            .filter(tutor_payment::Column::PaidAt.gte(lower))
            .filter(tutor_payment::Column::PaidAt.lt(upper))
            .order_by_asc(tutor_payment::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        all_to_domain(models)
    }

    async fn count_by_rate(&self, rate_id: i32) -> DomainResult<u64> {
        tutor_payment::Entity::find()
            .filter(tutor_payment::Column::RateId.eq(rate_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}
