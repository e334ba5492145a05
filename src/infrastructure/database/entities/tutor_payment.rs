//! Tutor payment entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tutor_payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub teacher_id: i32,
    /// `YYYY-MM`
    pub payment_month: String,
    pub amount: i64,
    pub sessions_count: i32,
    pub students_count: i32,
    pub minutes_taught: i64,

    pub rate_id: i32,
    pub rate_type: String,

    /// pending, paid, overdue, cancelled
    pub status: String,

    #[sea_orm(nullable)]
    pub payment_method: Option<String>,

    #[sea_orm(nullable)]
    pub paid_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teacher_rate::Entity",
        from = "Column::RateId",
        to = "super::teacher_rate::Column::Id"
    )]
    TeacherRate,
}

impl Related<super::teacher_rate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeacherRate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
