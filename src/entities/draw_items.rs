use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Prize item.
/// `winner_count` is a denormalized counter maintained by the pick procedure
/// under a row lock; it is the authoritative quota guard, while the read side
/// recomputes counts from the winner rows it loads.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "draw_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub winner_quota: i32,
    pub winner_count: i32,
    /// Governs duplicates across different items only; within one item a
    /// student can never win twice regardless of this flag.
    pub allow_duplicate_winners: bool,
    pub is_public: bool,
    /// NULL on legacy rows, treated as true by the read side.
    pub show_recent_winners: Option<bool>,
    pub sort_order: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::draw_winners::Entity")]
    Winners,
}

impl Related<super::draw_winners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Winners.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
