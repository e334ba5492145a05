//! Tuition billing entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tuition_billings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub student_id: i32,
    pub class_id: i32,
    /// `YYYY-MM`
    pub billing_month: String,
    pub amount: i64,

    /// pending, paid, overdue, cancelled
    pub status: String,

    pub due_date: Date,

    #[sea_orm(nullable)]
    pub paid_at: Option<DateTimeUtc>,

    #[sea_orm(nullable)]
    pub payment_method: Option<String>,

    #[sea_orm(unique)]
    pub invoice_number: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
