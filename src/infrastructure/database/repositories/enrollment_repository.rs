//! SeaORM implementation of EnrollmentRepository

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::db_err;
use crate::domain::{ClassTuitionRate, DomainResult, Enrollment, EnrollmentRepository};
use crate::infrastructure::database::entities::{class_tuition, enrollment};

fn to_domain(m: enrollment::Model) -> Enrollment {
    Enrollment::new(m.student_id, m.class_id, m.enrolled_at)
}

fn tuition_to_domain(m: class_tuition::Model) -> ClassTuitionRate {
    ClassTuitionRate {
        class_id: m.class_id,
        amount: m.amount,
    }
}

pub struct SeaOrmEnrollmentRepository {
    db: DatabaseConnection,
}

impl SeaOrmEnrollmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EnrollmentRepository for SeaOrmEnrollmentRepository {
    async fn find_active(&self, class_ids: Option<&[i32]>) -> DomainResult<Vec<Enrollment>> {
        let mut query = enrollment::Entity::find();
        if let Some(ids) = class_ids {
            query = query.filter(enrollment::Column::ClassId.is_in(ids.iter().copied()));
        }
        let models = query
            .order_by_asc(enrollment::Column::ClassId)
            .order_by_asc(enrollment::Column::StudentId)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn find_tuition(&self, class_id: i32) -> DomainResult<Option<ClassTuitionRate>> {
        let model = class_tuition::Entity::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(tuition_to_domain))
    }

    async fn find_all_tuition(&self) -> DomainResult<Vec<ClassTuitionRate>> {
        let models = class_tuition::Entity::find()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(tuition_to_domain).collect())
    }

    async fn enroll(&self, e: Enrollment) -> DomainResult<()> {
        let model = enrollment::ActiveModel {
            student_id: Set(e.student_id),
            class_id: Set(e.class_id),
            enrolled_at: Set(e.enrolled_at),
        };
        enrollment::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([enrollment::Column::StudentId, enrollment::Column::ClassId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn withdraw(&self, student_id: i32, class_id: i32) -> DomainResult<()> {
        enrollment::Entity::delete_many()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::ClassId.eq(class_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_tuition(&self, tuition: ClassTuitionRate) -> DomainResult<()> {
        let model = class_tuition::ActiveModel {
            class_id: Set(tuition.class_id),
            amount: Set(tuition.amount),
        };
        class_tuition::Entity::insert(model)
            .on_conflict(
                OnConflict::column(class_tuition::Column::ClassId)
                    .update_column(class_tuition::Column::Amount)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
