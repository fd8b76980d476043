use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Registered participant.
/// - `student_id` is the full numeric id string assigned by the university.
/// - `draw_number` is the short raffle number (1-4 digits), unique among
///   assigned values; NULL means the student has no number and is excluded
///   from every draw.
/// - Suspended students keep their number but leave the active pool.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: String,
    pub draw_number: Option<String>,
    pub is_suspended: bool,
    pub gender: String,
    pub department: String,
    pub role: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
