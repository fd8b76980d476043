use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::draw::{ItemWithComputed, MultiDrawOutcome, NormalizedPool};
use crate::entities::{draw_setting_entity as settings, draw_winner_entity as winners};

/// How a winner was selected. Stored as lowercase strings, which is also the
/// wire form the draw procedures take.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    #[sea_orm(string_value = "random")]
    Random,
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "forced")]
    Forced,
}

impl DrawMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawMode::Random => "random",
            DrawMode::Manual => "manual",
            DrawMode::Forced => "forced",
        }
    }
}

impl std::fmt::Display for DrawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of the atomic pick/update procedures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PickResult {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub winner_student_id: Option<String>,
    #[serde(default)]
    pub remaining_after: Option<i32>,
    #[serde(default)]
    pub forced: bool,
}

impl PickResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            winner_student_id: None,
            remaining_after: None,
            forced: false,
        }
    }

    /// Normalize the transport shape of an RPC result. The procedure returns a
    /// bare object, but some transports wrap single rows in a one-element
    /// array; both are accepted. Anything else (empty array, non-object,
    /// unparsable fields) normalizes to a generic failure rather than leaking
    /// a malformed payload into business logic.
    pub fn from_value(value: serde_json::Value) -> Self {
        let object = match value {
            serde_json::Value::Array(mut rows) => {
                if rows.is_empty() {
                    return Self::failure("empty response from draw procedure");
                }
                rows.remove(0)
            }
            other => other,
        };

        if !object.is_object() {
            return Self::failure("malformed response from draw procedure");
        }

        serde_json::from_value(object)
            .unwrap_or_else(|_| Self::failure("malformed response from draw procedure"))
    }
}

/// Gender / department / role restriction for a random pick. An empty list
/// applies no restriction on that dimension.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RandomFilters {
    #[serde(default)]
    pub genders: Vec<String>,
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PickRequest {
    pub mode: DrawMode,
    /// Required for manual and forced modes.
    pub target_draw_number: Option<String>,
    #[serde(default)]
    pub force_override: bool,
    /// Only consulted for random mode.
    pub filters: Option<RandomFilters>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDrawItemRequest {
    pub name: String,
    pub winner_quota: i32,
    #[serde(default)]
    pub allow_duplicate_winners: bool,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default = "default_true")]
    pub show_recent_winners: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateDrawItemRequest {
    pub name: Option<String>,
    pub winner_quota: Option<i32>,
    pub allow_duplicate_winners: Option<bool>,
    pub is_public: Option<bool>,
    pub show_recent_winners: Option<bool>,
    pub sort_order: Option<i32>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WinnerResponse {
    pub id: i64,
    pub draw_item_id: i64,
    pub student_id: String,
    /// Display draw number resolved via the pool; None when the student no
    /// longer holds a number.
    pub draw_number: Option<String>,
    pub selected_mode: DrawMode,
    pub is_forced: bool,
    pub is_public: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl WinnerResponse {
    pub fn from_model(winner: &winners::Model, pool: &NormalizedPool) -> Self {
        Self {
            id: winner.id,
            draw_item_id: winner.draw_item_id,
            student_id: winner.student_id.clone(),
            draw_number: pool.display_number(&winner.student_id).map(str::to_string),
            selected_mode: winner.selected_mode,
            is_forced: winner.is_forced,
            is_public: winner.is_public.unwrap_or(true),
            created_at: winner.created_at,
            updated_at: winner.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawItemResponse {
    pub id: i64,
    pub name: String,
    pub winner_quota: i32,
    pub winner_count: i32,
    pub remaining_count: i32,
    pub allow_duplicate_winners: bool,
    pub is_public: bool,
    pub show_recent_winners: bool,
    pub sort_order: i32,
    pub winners: Vec<WinnerResponse>,
    pub created_at: Option<DateTime<Utc>>,
}

impl DrawItemResponse {
    pub fn from_computed(entry: &ItemWithComputed, pool: &NormalizedPool) -> Self {
        Self {
            id: entry.item.id,
            name: entry.item.name.clone(),
            winner_quota: entry.item.winner_quota,
            winner_count: entry.winner_count,
            remaining_count: entry.remaining_count,
            allow_duplicate_winners: entry.item.allow_duplicate_winners,
            is_public: entry.item.is_public,
            show_recent_winners: entry.show_recent_winners,
            sort_order: entry.item.sort_order,
            winners: entry
                .winners
                .iter()
                .map(|w| WinnerResponse::from_model(w, pool))
                .collect(),
            created_at: entry.item.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateWinnerRequest {
    pub target_draw_number: String,
    #[serde(default)]
    pub force_override: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WinnerVisibilityRequest {
    pub is_public: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MultiDrawStepRequest {
    pub item_id: i64,
    pub mode: DrawMode,
    pub target_draw_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MultiDrawRequest {
    pub steps: Vec<MultiDrawStepRequest>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MultiDrawStepResult {
    pub step_index: usize,
    pub result: PickResult,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MultiDrawResponse {
    pub steps: Vec<MultiDrawStepResult>,
    pub failed_index: Option<usize>,
}

impl From<MultiDrawOutcome> for MultiDrawResponse {
    fn from(outcome: MultiDrawOutcome) -> Self {
        Self {
            steps: outcome
                .steps
                .into_iter()
                .map(|s| MultiDrawStepResult {
                    step_index: s.step_index,
                    result: s.result,
                })
                .collect(),
            failed_index: outcome.failed_index,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawSettingsResponse {
    pub live_page_enabled: bool,
    pub show_recent_winners: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<settings::Model> for DrawSettingsResponse {
    fn from(m: settings::Model) -> Self {
        Self {
            live_page_enabled: m.live_page_enabled,
            show_recent_winners: m.show_recent_winners,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateDrawSettingsRequest {
    pub live_page_enabled: Option<bool>,
    pub show_recent_winners: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_accepts_bare_object() {
        let result = PickResult::from_value(json!({
            "ok": true,
            "message": "winner recorded",
            "winner_student_id": "20260001",
            "remaining_after": 2,
            "forced": false
        }));
        assert!(result.ok);
        assert_eq!(result.winner_student_id.as_deref(), Some("20260001"));
        assert_eq!(result.remaining_after, Some(2));
    }

    #[test]
    fn from_value_accepts_singleton_array() {
        let result = PickResult::from_value(json!([{
            "ok": false,
            "message": "winner quota exhausted",
            "winner_student_id": null,
            "remaining_after": 0,
            "forced": false
        }]));
        assert!(!result.ok);
        assert_eq!(result.message, "winner quota exhausted");
        assert_eq!(result.remaining_after, Some(0));
    }

    #[test]
    fn from_value_normalizes_malformed_payloads() {
        for value in [json!([]), json!("oops"), json!(42), json!(null)] {
            let result = PickResult::from_value(value);
            assert!(!result.ok);
            assert!(!result.message.is_empty());
            assert!(result.winner_student_id.is_none());
        }
    }

    #[test]
    fn from_value_defaults_missing_fields() {
        let result = PickResult::from_value(json!({ "message": "partial" }));
        assert!(!result.ok);
        assert_eq!(result.message, "partial");
        assert!(result.remaining_after.is_none());
        assert!(!result.forced);
    }

    #[test]
    fn draw_mode_round_trips_as_lowercase() {
        assert_eq!(DrawMode::Random.as_str(), "random");
        let mode: DrawMode = serde_json::from_value(json!("manual")).unwrap();
        assert_eq!(mode, DrawMode::Manual);
        assert_eq!(serde_json::to_value(DrawMode::Forced).unwrap(), json!("forced"));
    }
}
