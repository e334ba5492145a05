//! Teacher rate entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teacher_rates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub teacher_id: i32,

    /// HOURLY, PER_STUDENT, MONTHLY_FIXED
    pub rate_type: String,

    pub amount: i64,
    pub effective_date: Date,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tutor_payment::Entity")]
    TutorPayment,
}

impl Related<super::tutor_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TutorPayment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
