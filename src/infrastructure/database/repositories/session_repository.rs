//! SeaORM implementation of SessionRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{corrupt, db_err};
use crate::domain::{DomainResult, Period, SessionRecord, SessionRepository};
use crate::infrastructure::database::entities::session_record;

fn to_domain(m: session_record::Model) -> DomainResult<SessionRecord> {
    let student_count = u32::try_from(m.student_count)
        .map_err(|_| corrupt("session_record", format!("student_count {}", m.student_count)))?;
    Ok(SessionRecord {
        id: m.id,
        teacher_id: m.teacher_id,
        class_id: m.class_id,
        session_date: m.session_date,
        start_time: m.start_time,
        end_time: m.end_time,
        is_valid: m.is_valid,
        student_count,
    })
}

pub struct SeaOrmSessionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepository for SeaOrmSessionRepository {
    async fn find_valid_for_teacher(
        &self,
        teacher_id: i32,
        month: Period,
    ) -> DomainResult<Vec<SessionRecord>> {
        session_record::Entity::find()
            .filter(session_record::Column::TeacherId.eq(teacher_id))
            .filter(session_record::Column::IsValid.eq(true))
            .filter(session_record::Column::SessionDate.between(month.first_day(), month.last_day()))
            .order_by_asc(session_record::Column::SessionDate)
            .order_by_asc(session_record::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn record(&self, s: SessionRecord) -> DomainResult<SessionRecord> {
        let model = session_record::ActiveModel {
            teacher_id: Set(s.teacher_id),
            class_id: Set(s.class_id),
            session_date: Set(s.session_date),
            start_time: Set(s.start_time),
            end_time: Set(s.end_time),
            is_valid: Set(s.is_valid),
            student_count: Set(i32::try_from(s.student_count).unwrap_or(i32::MAX)),
            ..Default::default()
        };
        let created = model.insert(&self.db).await.map_err(db_err)?;
        to_domain(created)
    }
}
