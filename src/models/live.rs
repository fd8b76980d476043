use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::draw::FeedPhase;
use crate::entities::draw_live_event_entity as live_events;
use crate::models::DrawMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LivePhase {
    Disabled,
    Idle,
    PreStart,
    Revealing,
}

impl From<FeedPhase> for LivePhase {
    fn from(phase: FeedPhase) -> Self {
        match phase {
            FeedPhase::Disabled => LivePhase::Disabled,
            FeedPhase::Idle => LivePhase::Idle,
            FeedPhase::PreStart => LivePhase::PreStart,
            FeedPhase::Revealing => LivePhase::Revealing,
        }
    }
}

/// What the spectator screen renders for the in-flight event. During the
/// lead-in the winner identity is withheld: `draw_number` stays None until the
/// reveal phase.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentReveal {
    /// Keys the client-side sound/visual cue; stable across redeliveries.
    pub event_id: Uuid,
    pub seq: i64,
    pub item_name: String,
    pub draw_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LiveStateResponse {
    pub enabled: bool,
    pub phase: LivePhase,
    pub current: Option<CurrentReveal>,
    /// Events waiting behind the one being animated.
    pub queue_length: usize,
    pub last_seq: i64,
    pub show_recent_winners: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LiveEventQuery {
    /// Return only events with `seq` strictly greater than this.
    pub after_seq: Option<i64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LiveEventResponse {
    pub id: Uuid,
    pub seq: i64,
    pub draw_item_id: i64,
    pub draw_item_name: String,
    /// Winner shown as a draw number on the spectator side; resolved by the
    /// caller, absent when the student no longer holds one.
    pub winner_draw_number: Option<String>,
    pub draw_mode: DrawMode,
    pub is_forced: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl LiveEventResponse {
    pub fn from_model(m: &live_events::Model, winner_draw_number: Option<String>) -> Self {
        Self {
            id: m.id,
            seq: m.seq,
            draw_item_id: m.draw_item_id,
            draw_item_name: m.draw_item_name.clone(),
            winner_draw_number,
            draw_mode: m.draw_mode,
            is_forced: m.is_forced,
            created_at: m.created_at,
        }
    }
}

/// Entry of the recent-winners panel shown while the feed is idle.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentWinnerResponse {
    pub item_name: String,
    pub draw_number: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
