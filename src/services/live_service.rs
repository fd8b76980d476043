use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tokio::sync::{Mutex, RwLock};

use crate::config::LiveConfig;
use crate::draw::{FeedEvent, FeedPhase, FeedTiming, LiveFeed, NormalizedPool};
use crate::entities::{
    SETTINGS_ROW_ID, draw_item_entity as items, draw_live_event_entity as live_events,
    draw_setting_entity as settings, draw_winner_entity as winners, student_entity as students,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CurrentReveal, LiveEventQuery, LiveEventResponse, LiveStateResponse, RecentWinnerResponse,
};

/// Server-side spectator feed. One shared instance drives the phase machine;
/// `refresh` re-reads everything the feed depends on (the change stream is an
/// invalidation signal only, payloads are never trusted) and `state` is what
/// the spectator page polls.
#[derive(Clone)]
pub struct LiveService {
    pool: DatabaseConnection,
    feed: Arc<Mutex<LiveFeed>>,
    roster: Arc<RwLock<NormalizedPool>>,
    settings: Arc<RwLock<settings::Model>>,
}

impl LiveService {
    pub fn new(pool: DatabaseConnection, live: &LiveConfig) -> Self {
        let timing = FeedTiming {
            pre_start: Duration::from_millis(live.pre_start_ms),
            reveal: Duration::from_millis(live.reveal_ms),
        };
        Self {
            pool,
            feed: Arc::new(Mutex::new(LiveFeed::new(timing))),
            roster: Arc::new(RwLock::new(NormalizedPool::default())),
            settings: Arc::new(RwLock::new(settings::Model {
                id: SETTINGS_ROW_ID,
                live_page_enabled: false,
                show_recent_winners: true,
                updated_at: None,
            })),
        }
    }

    /// Full re-sync: reload the settings row, the roster and any live events
    /// past the feed's high-water mark, then advance the phase machine. Called
    /// from the debounced change listener and the periodic fallback alike.
    pub async fn refresh(&self) -> AppResult<()> {
        let current_settings = settings::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::InternalError("draw settings row missing".to_string()))?;

        let roster = NormalizedPool::from_records(
            &students::Entity::find()
                .order_by_asc(students::Column::StudentId)
                .all(&self.pool)
                .await?,
        );

        let last_seq = self.feed.lock().await.last_seq();
        let rows = live_events::Entity::find()
            .filter(live_events::Column::Seq.gt(last_seq))
            .order_by_asc(live_events::Column::Seq)
            .all(&self.pool)
            .await?;

        let hidden = self.hidden_winners().await?;

        let events: Vec<FeedEvent> = rows
            .into_iter()
            .map(|row| {
                let winner_is_public = !hidden
                    .iter()
                    .any(|(item, sid)| *item == row.draw_item_id && *sid == row.winner_student_id);
                FeedEvent {
                    id: row.id,
                    seq: row.seq,
                    item_name: row.draw_item_name,
                    winner_student_id: row.winner_student_id,
                    is_public: row.is_public,
                    winner_is_public,
                }
            })
            .collect();

        *self.roster.write().await = roster;

        let mut feed = self.feed.lock().await;
        feed.set_enabled(current_settings.live_page_enabled);
        feed.observe(&events);
        feed.tick(Instant::now());
        if !events.is_empty() {
            debug!(
                "live refresh: {} new events, queue={}, seq={}",
                events.len(),
                feed.queue_len(),
                feed.last_seq()
            );
        }
        drop(feed);

        *self.settings.write().await = current_settings;
        Ok(())
    }

    /// Poll endpoint payload. Ticking here keeps phase transitions timely even
    /// between refreshes; the winner's draw number is withheld until the
    /// reveal phase.
    pub async fn state(&self) -> LiveStateResponse {
        let current_settings = self.settings.read().await.clone();
        let roster = self.roster.read().await;

        let mut feed = self.feed.lock().await;
        feed.tick(Instant::now());

        let phase = feed.phase();
        let current = feed.current().map(|event| CurrentReveal {
            event_id: event.id,
            seq: event.seq,
            item_name: event.item_name.clone(),
            draw_number: if phase == FeedPhase::Revealing {
                roster
                    .display_number(&event.winner_student_id)
                    .map(str::to_string)
            } else {
                None
            },
        });

        LiveStateResponse {
            enabled: current_settings.live_page_enabled,
            phase: phase.into(),
            current,
            queue_length: feed.queue_len(),
            last_seq: feed.last_seq(),
            show_recent_winners: current_settings.show_recent_winners,
        }
    }

    /// Public events past a cursor, oldest first. Subject to the same
    /// suppression rules as the phase machine: nothing while the page is
    /// disabled, and a winner toggled private drops out of the replay
    /// entirely, whatever the event row's snapshot says.
    pub async fn events_after(&self, query: &LiveEventQuery) -> AppResult<Vec<LiveEventResponse>> {
        if !self.settings.read().await.live_page_enabled {
            return Ok(Vec::new());
        }

        let after_seq = query.after_seq.unwrap_or(0);
        let limit = query.limit.unwrap_or(50).clamp(1, 200);

        let rows = live_events::Entity::find()
            .filter(live_events::Column::Seq.gt(after_seq))
            .filter(live_events::Column::IsPublic.eq(true))
            .order_by_asc(live_events::Column::Seq)
            .limit(limit)
            .all(&self.pool)
            .await?;

        let hidden = self.hidden_winners().await?;
        let rows = spectator_visible(rows, &hidden);

        let roster = self.roster.read().await;
        Ok(rows
            .iter()
            .map(|row| {
                let number = roster
                    .display_number(&row.winner_student_id)
                    .map(str::to_string);
                LiveEventResponse::from_model(row, number)
            })
            .collect())
    }

    /// (item id, student id) pairs whose winner row is currently private.
    /// Winner visibility is re-checked against the current rows, not the
    /// snapshot on the event.
    async fn hidden_winners(&self) -> AppResult<Vec<(i64, String)>> {
        Ok(winners::Entity::find()
            .filter(winners::Column::IsPublic.eq(false))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|w| (w.draw_item_id, w.student_id))
            .collect())
    }

    /// The idle-screen panel: latest public winners of items that opted in.
    /// Empty when the global switch is off.
    pub async fn recent_winners(&self, limit: u64) -> AppResult<Vec<RecentWinnerResponse>> {
        if !self.settings.read().await.show_recent_winners {
            return Ok(Vec::new());
        }

        let eligible_items: Vec<items::Model> = items::Entity::find()
            .filter(items::Column::IsPublic.eq(true))
            .all(&self.pool)
            .await?
            .into_iter()
            .filter(|i| i.show_recent_winners.unwrap_or(true))
            .collect();
        let item_ids: Vec<i64> = eligible_items.iter().map(|i| i.id).collect();
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = winners::Entity::find()
            .filter(winners::Column::DrawItemId.is_in(item_ids))
            .order_by_desc(winners::Column::CreatedAt)
            .limit(limit.clamp(1, 100))
            .all(&self.pool)
            .await?;

        let roster = self.roster.read().await;
        Ok(rows
            .into_iter()
            .filter(|w| w.is_public.unwrap_or(true))
            .map(|w| RecentWinnerResponse {
                item_name: eligible_items
                    .iter()
                    .find(|i| i.id == w.draw_item_id)
                    .map(|i| i.name.clone())
                    .unwrap_or_default(),
                draw_number: roster.display_number(&w.student_id).map(str::to_string),
                created_at: w.created_at,
            })
            .collect())
    }
}

/// Drop events a spectator must not see: private event snapshots and events
/// whose winner row has since been toggled private.
fn spectator_visible(
    rows: Vec<live_events::Model>,
    hidden: &[(i64, String)],
) -> Vec<live_events::Model> {
    rows.into_iter()
        .filter(|row| row.is_public)
        .filter(|row| {
            !hidden
                .iter()
                .any(|(item, sid)| *item == row.draw_item_id && *sid == row.winner_student_id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrawMode;
    use uuid::Uuid;

    fn event(seq: i64, item_id: i64, student_id: &str, is_public: bool) -> live_events::Model {
        live_events::Model {
            id: Uuid::new_v4(),
            seq,
            draw_item_id: item_id,
            draw_item_name: format!("prize-{item_id}"),
            winner_student_id: student_id.to_string(),
            draw_mode: DrawMode::Random,
            is_forced: false,
            is_public,
            created_at: None,
        }
    }

    #[test]
    fn winner_toggled_private_drops_out_of_the_replay() {
        let rows = vec![
            event(1, 1, "s1", true),
            // snapshot says public, but the winner row was made private since
            event(2, 2, "s2", true),
            event(3, 1, "s3", true),
        ];
        let hidden = vec![(2, "s2".to_string())];

        let visible = spectator_visible(rows, &hidden);
        let seqs: Vec<i64> = visible.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![1, 3]);
    }

    #[test]
    fn hidden_pair_must_match_both_item_and_student() {
        let rows = vec![event(1, 1, "s1", true), event(2, 2, "s1", true)];
        // s1's win on item 2 is private; the item-1 win stays visible
        let hidden = vec![(2, "s1".to_string())];

        let visible = spectator_visible(rows, &hidden);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].seq, 1);
    }

    #[test]
    fn private_event_snapshots_never_pass() {
        let rows = vec![event(1, 1, "s1", false), event(2, 1, "s2", true)];
        let visible = spectator_visible(rows, &[]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].seq, 2);
    }
}
