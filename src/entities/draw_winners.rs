use crate::models::DrawMode;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Winner record, exclusively owned by its draw item.
/// Created by the pick procedure; mutated only via the update procedure
/// (student reassignment, `draw_item_id` never changes) or the public toggle;
/// deletion frees one unit of the item's quota.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "draw_winners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub draw_item_id: i64,
    pub student_id: String,
    pub selected_mode: DrawMode,
    pub is_forced: bool,
    /// NULL on legacy rows, treated as true by the read side.
    pub is_public: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::draw_items::Entity",
        from = "Column::DrawItemId",
        to = "super::draw_items::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Item,
}

impl Related<super::draw_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
