use crate::models::DrawMode;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only broadcast log. `seq` is assigned by the database and strictly
/// increases; the spectator feed replays rows in ascending `seq` order and the
/// uuid `id` keys reveal cues so a redelivered event never fires twice.
/// `draw_item_name` is a snapshot, kept even if the item is later renamed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "draw_live_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub seq: i64,
    pub draw_item_id: i64,
    pub draw_item_name: String,
    pub winner_student_id: String,
    pub draw_mode: DrawMode,
    pub is_forced: bool,
    pub is_public: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
