use crate::draw::{ItemWithComputed, normalize_items};
use crate::entities::{
    SETTINGS_ROW_ID, draw_item_entity as items, draw_setting_entity as settings,
    draw_winner_entity as winners,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateDrawItemRequest, DrawSettingsResponse, UpdateDrawItemRequest, UpdateDrawSettingsRequest,
};
use crate::services::{ChangeNotifier, ChangedTable};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait, QueryOrder,
    Set,
};

/// Prize registry administration plus the computed read-side view the engine
/// and the dashboard both consume.
#[derive(Clone)]
pub struct DrawItemService {
    pool: DatabaseConnection,
    notifier: ChangeNotifier,
}

impl DrawItemService {
    pub fn new(pool: DatabaseConnection, notifier: ChangeNotifier) -> Self {
        Self { pool, notifier }
    }

    /// Load every item with its winners, normalized and computed. Rebuilt
    /// wholesale on each call; quota-sensitive fields are never patched
    /// client-side.
    pub async fn list_computed(&self) -> AppResult<Vec<ItemWithComputed>> {
        let item_models = items::Entity::find()
            .order_by_asc(items::Column::SortOrder)
            .all(&self.pool)
            .await?;
        let winner_models = winners::Entity::find()
            .order_by_asc(winners::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(normalize_items(item_models, winner_models))
    }

    pub async fn get_item(&self, item_id: i64) -> AppResult<items::Model> {
        items::Entity::find_by_id(item_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("draw item {item_id} not found")))
    }

    pub async fn create_item(&self, req: CreateDrawItemRequest) -> AppResult<items::Model> {
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "item name must not be empty".to_string(),
            ));
        }
        if req.winner_quota < 1 {
            return Err(AppError::ValidationError(
                "winner quota must be at least 1".to_string(),
            ));
        }

        let model = items::ActiveModel {
            name: Set(req.name.trim().to_string()),
            winner_quota: Set(req.winner_quota),
            winner_count: Set(0),
            allow_duplicate_winners: Set(req.allow_duplicate_winners),
            is_public: Set(req.is_public),
            show_recent_winners: Set(Some(req.show_recent_winners)),
            sort_order: Set(req.sort_order),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        self.notifier.publish(ChangedTable::DrawItems);
        Ok(model)
    }

    pub async fn update_item(
        &self,
        item_id: i64,
        req: UpdateDrawItemRequest,
    ) -> AppResult<items::Model> {
        let existing = self.get_item(item_id).await?;

        if let Some(quota) = req.winner_quota {
            if quota < 1 {
                return Err(AppError::ValidationError(
                    "winner quota must be at least 1".to_string(),
                ));
            }
            // Quota can never drop below the winners already recorded.
            if quota < existing.winner_count {
                return Err(AppError::ValidationError(format!(
                    "winner quota {quota} is below the {} winners already recorded",
                    existing.winner_count
                )));
            }
        }

        let mut am = existing.into_active_model();
        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(AppError::ValidationError(
                    "item name must not be empty".to_string(),
                ));
            }
            am.name = Set(name.trim().to_string());
        }
        if let Some(quota) = req.winner_quota {
            am.winner_quota = Set(quota);
        }
        if let Some(allow) = req.allow_duplicate_winners {
            am.allow_duplicate_winners = Set(allow);
        }
        if let Some(is_public) = req.is_public {
            am.is_public = Set(is_public);
        }
        if let Some(show) = req.show_recent_winners {
            am.show_recent_winners = Set(Some(show));
        }
        if let Some(sort_order) = req.sort_order {
            am.sort_order = Set(sort_order);
        }
        am.updated_at = Set(Some(Utc::now()));

        let updated = am.update(&self.pool).await?;
        self.notifier.publish(ChangedTable::DrawItems);
        Ok(updated)
    }

    /// Deleting an item cascades to its winners. Live events are kept; the
    /// log is append-only and the denormalized name snapshot still renders.
    pub async fn delete_item(&self, item_id: i64) -> AppResult<()> {
        let existing = self.get_item(item_id).await?;
        existing.delete(&self.pool).await?;
        self.notifier.publish(ChangedTable::DrawItems);
        self.notifier.publish(ChangedTable::DrawWinners);
        Ok(())
    }

    pub async fn get_settings(&self) -> AppResult<settings::Model> {
        settings::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::InternalError("draw settings row missing".to_string()))
    }

    pub async fn update_settings(
        &self,
        req: UpdateDrawSettingsRequest,
    ) -> AppResult<DrawSettingsResponse> {
        let existing = self.get_settings().await?;
        let mut am = existing.into_active_model();
        if let Some(enabled) = req.live_page_enabled {
            am.live_page_enabled = Set(enabled);
        }
        if let Some(show) = req.show_recent_winners {
            am.show_recent_winners = Set(show);
        }
        am.updated_at = Set(Some(Utc::now()));

        let updated = am.update(&self.pool).await?;
        self.notifier.publish(ChangedTable::DrawSettings);
        Ok(updated.into())
    }
}
