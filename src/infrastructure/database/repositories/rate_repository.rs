//! SeaORM implementation of RateRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, UpdateResult,
};
use tracing::info;

use super::{corrupt, db_err};
use crate::domain::{DomainError, DomainResult, RateRepository, RateType, TeacherRate};
use crate::infrastructure::database::entities::{teacher_rate, tutor_payment};

fn to_domain(m: teacher_rate::Model) -> DomainResult<TeacherRate> {
    let rate_type = RateType::from_str(&m.rate_type)
        .ok_or_else(|| corrupt("teacher_rate", format!("rate_type '{}'", m.rate_type)))?;
    Ok(TeacherRate {
        id: m.id,
        teacher_id: m.teacher_id,
        rate_type,
        amount: m.amount,
        effective_date: m.effective_date,
        is_active: m.is_active,
        created_at: m.created_at,
    })
}

fn not_found(id: i32) -> DomainError {
    DomainError::NotFound {
        entity: "TeacherRate",
        field: "id",
        value: id.to_string(),
    }
}

pub struct SeaOrmRateRepository {
    db: DatabaseConnection,
}

impl SeaOrmRateRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: i32) -> DomainResult<teacher_rate::Model> {
        teacher_rate::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| not_found(id))
    }
}

#[async_trait]
impl RateRepository for SeaOrmRateRepository {
    async fn find_by_teacher(&self, teacher_id: i32) -> DomainResult<Vec<TeacherRate>> {
        teacher_rate::Entity::find()
            .filter(teacher_rate::Column::TeacherId.eq(teacher_id))
            .order_by_asc(teacher_rate::Column::EffectiveDate)
            .order_by_asc(teacher_rate::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn find_active(&self) -> DomainResult<Vec<TeacherRate>> {
        teacher_rate::Entity::find()
            .filter(teacher_rate::Column::IsActive.eq(true))
            .order_by_asc(teacher_rate::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<TeacherRate>> {
        teacher_rate::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(to_domain)
            .transpose()
    }

    async fn insert(&self, r: TeacherRate) -> DomainResult<TeacherRate> {
        let model = teacher_rate::ActiveModel {
            teacher_id: Set(r.teacher_id),
            rate_type: Set(r.rate_type.as_str().to_string()),
            amount: Set(r.amount),
            effective_date: Set(r.effective_date),
            is_active: Set(r.is_active),
            created_at: Set(r.created_at),
            ..Default::default()
        };
        let created = model.insert(&self.db).await.map_err(db_err)?;
        info!(rate_id = created.id, teacher_id = created.teacher_id, "Teacher rate saved");
        to_domain(created)
    }

    async fn update_unused(&self, r: &TeacherRate) -> DomainResult<bool> {
        let referencing = tutor_payment::Entity::find()
            .select_only()
            .column(tutor_payment::Column::RateId)
            .filter(tutor_payment::Column::RateId.eq(r.id))
            .into_query();

        let result: UpdateResult = teacher_rate::Entity::update_many()
            .col_expr(teacher_rate::Column::RateType, Expr::value(r.rate_type.as_str()))
            .col_expr(teacher_rate::Column::Amount, Expr::value(r.amount))
            .col_expr(teacher_rate::Column::EffectiveDate, Expr::value(r.effective_date))
            .col_expr(teacher_rate::Column::IsActive, Expr::value(r.is_active))
            .filter(teacher_rate::Column::Id.eq(r.id))
            .filter(teacher_rate::Column::Id.not_in_subquery(referencing))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected > 0 {
            return Ok(true);
        }

        // missing row or referenced by a payout
        self.find_model(r.id).await?;
        Ok(false)
    }

    async fn deactivate(&self, id: i32) -> DomainResult<()> {
        let mut model = self.find_model(id).await?.into_active_model();
        model.is_active = Set(false);
        model.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}
