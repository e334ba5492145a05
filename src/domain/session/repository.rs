use async_trait::async_trait;

use super::model::SessionRecord;
use crate::domain::period::Period;
use crate::domain::DomainResult;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Valid sessions taught by `teacher_id` with a session date inside `month`.
    async fn find_valid_for_teacher(
        &self,
        teacher_id: i32,
        month: Period,
    ) -> DomainResult<Vec<SessionRecord>>;

    async fn record(&self, session: SessionRecord) -> DomainResult<SessionRecord>;
}
