use crate::draw::{
    DrawAction, DrawStep, MultiDrawOutcome, NormalizedPool, classify, enforce_warnings,
    ensure_quota_available, resolve_target, run_steps, winners_of_other_items,
};
use crate::entities::draw_winner_entity as winners;
use crate::error::{AppError, AppResult};
use crate::models::{
    DrawMode, MultiDrawRequest, PickRequest, PickResult, RandomFilters, UpdateWinnerRequest,
    WinnerResponse,
};
use crate::services::{
    ChangeNotifier, ChangedTable, DrawItemService, StudentService,
};
use chrono::Utc;
use log::info;
use rand::seq::SliceRandom;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    IntoActiveModel, QuerySelect, Set, Statement, TransactionTrait,
};
use std::collections::HashSet;

/// The draw engine. Candidate selection and warning classification happen here
/// against a freshly loaded snapshot; the actual mutation is a single atomic
/// database procedure that re-validates everything under a row lock, so two
/// concurrent picks can never oversell a quota or double-record a student.
#[derive(Clone)]
pub struct DrawEngine {
    pool: DatabaseConnection,
    students: StudentService,
    items: DrawItemService,
    notifier: ChangeNotifier,
}

impl DrawEngine {
    pub fn new(
        pool: DatabaseConnection,
        students: StudentService,
        items: DrawItemService,
        notifier: ChangeNotifier,
    ) -> Self {
        Self {
            pool,
            students,
            items,
            notifier,
        }
    }

    /// Pick one winner for the item. Random mode draws from the eligible
    /// candidates; manual and forced modes target a draw number. Overridable
    /// warnings surface as `ConfirmationRequired` until the caller repeats the
    /// request with `force_override`.
    pub async fn pick_winner(&self, item_id: i64, req: PickRequest) -> AppResult<PickResult> {
        let roster = self.students.load_pool().await?;
        let items = self.items.list_computed().await?;
        let entry = items
            .iter()
            .find(|e| e.item.id == item_id)
            .ok_or_else(|| AppError::NotFound(format!("draw item {item_id} not found")))?;

        ensure_quota_available(entry)?;

        let (student_id, action) = match req.mode {
            DrawMode::Random => {
                let candidates = eligible_candidates(
                    &roster,
                    &items,
                    item_id,
                    entry.item.allow_duplicate_winners,
                    req.filters.as_ref(),
                );
                if candidates.is_empty() {
                    return Err(AppError::ValidationError(
                        "no eligible candidates for a random draw".to_string(),
                    ));
                }
                let picked = candidates
                    .choose(&mut rand::thread_rng())
                    .cloned()
                    .ok_or_else(|| {
                        AppError::InternalError("random selection failed".to_string())
                    })?;
                (picked, DrawAction::ManualPick)
            }
            DrawMode::Manual => (
                resolve_target(&roster, req.target_draw_number.as_deref())?,
                DrawAction::ManualPick,
            ),
            DrawMode::Forced => (
                resolve_target(&roster, req.target_draw_number.as_deref())?,
                DrawAction::ForcedAdd,
            ),
        };

        let warnings = classify(&student_id, item_id, None, &roster, &items);
        enforce_warnings(action, warnings, req.force_override)?;

        let result = self
            .call_pick_procedure(item_id, req.mode, &student_id, req.force_override)
            .await?;

        if result.ok {
            info!(
                "draw pick: item={item_id} mode={} student={student_id} forced={}",
                req.mode, result.forced
            );
            self.notifier.publish(ChangedTable::DrawWinners);
            self.notifier.publish(ChangedTable::DrawItems);
            self.notifier.publish(ChangedTable::DrawLiveEvents);
        }
        Ok(result)
    }

    /// Reassign a winner record to another student. The record keeps its item;
    /// only the student changes, and `is_forced` is sticky once set.
    pub async fn update_winner(
        &self,
        winner_id: i64,
        req: UpdateWinnerRequest,
    ) -> AppResult<PickResult> {
        let roster = self.students.load_pool().await?;
        let items = self.items.list_computed().await?;

        let winner = winners::Entity::find_by_id(winner_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("winner record {winner_id} not found")))?;

        let student_id = resolve_target(&roster, Some(&req.target_draw_number))?;

        let warnings = classify(
            &student_id,
            winner.draw_item_id,
            Some(winner_id),
            &roster,
            &items,
        );
        enforce_warnings(DrawAction::UpdateWinner, warnings, req.force_override)?;

        let result = self
            .call_update_procedure(winner_id, &student_id, req.force_override)
            .await?;

        if result.ok {
            info!("winner update: record={winner_id} student={student_id}");
            self.notifier.publish(ChangedTable::DrawWinners);
        }
        Ok(result)
    }

    pub async fn set_winner_visibility(
        &self,
        winner_id: i64,
        is_public: bool,
    ) -> AppResult<WinnerResponse> {
        let winner = winners::Entity::find_by_id(winner_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("winner record {winner_id} not found")))?;

        let mut am = winner.into_active_model();
        am.is_public = Set(Some(is_public));
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(&self.pool).await?;

        self.notifier.publish(ChangedTable::DrawWinners);
        let roster = self.students.load_pool().await?;
        Ok(WinnerResponse::from_model(&updated, &roster))
    }

    /// Remove a winner record, freeing one unit of the item's quota. The
    /// counter decrement and the delete commit together.
    pub async fn delete_winner(&self, winner_id: i64) -> AppResult<()> {
        let txn = self.pool.begin().await?;

        // Lock the winner row first, then the item row. `draw_update_winner`
        // takes its locks in the same order.
        let winner = winners::Entity::find_by_id(winner_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("winner record {winner_id} not found")))?;

        txn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE draw_items SET winner_count = winner_count - 1, updated_at = now() \
             WHERE id = $1 AND winner_count > 0",
            [winner.draw_item_id.into()],
        ))
        .await?;
        winners::Entity::delete_by_id(winner_id).exec(&txn).await?;

        txn.commit().await?;

        self.notifier.publish(ChangedTable::DrawWinners);
        self.notifier.publish(ChangedTable::DrawItems);
        Ok(())
    }

    /// Execute a batch of picks strictly in order, halting at the first
    /// failure. Every step is validated independently against the current
    /// snapshot before anything runs; once execution starts, completed steps
    /// stay applied (each pick was atomic on its own, nothing to roll back).
    pub async fn run_multi_draw(&self, req: MultiDrawRequest) -> AppResult<MultiDrawOutcome> {
        if req.steps.is_empty() {
            return Err(AppError::ValidationError(
                "multi-draw requires at least one step".to_string(),
            ));
        }

        let roster = self.students.load_pool().await?;
        let items = self.items.list_computed().await?;
        for (index, step) in req.steps.iter().enumerate() {
            self.precheck_step(step, &roster, &items)
                .map_err(|e| AppError::ValidationError(format!("step {index}: {e}")))?;
        }

        let steps: Vec<DrawStep> = req
            .steps
            .into_iter()
            .map(|s| DrawStep {
                item_id: s.item_id,
                mode: s.mode,
                target_draw_number: s.target_draw_number,
            })
            .collect();

        let engine = self.clone();
        let outcome = run_steps(&steps, move |_, step| {
            let engine = engine.clone();
            async move {
                engine
                    .pick_winner(
                        step.item_id,
                        PickRequest {
                            mode: step.mode,
                            target_draw_number: step.target_draw_number,
                            force_override: false,
                            filters: None,
                        },
                    )
                    .await
            }
        })
        .await;

        if let Some(index) = outcome.failed_index {
            info!("multi-draw halted at step {index}");
        }
        Ok(outcome)
    }

    /// One step's preconditions against the snapshot taken before the batch
    /// started. Each step is judged independently; eligibility shifts caused
    /// by earlier steps surface at execution time instead.
    fn precheck_step(
        &self,
        step: &crate::models::MultiDrawStepRequest,
        roster: &NormalizedPool,
        items: &[crate::draw::ItemWithComputed],
    ) -> AppResult<()> {
        let entry = items
            .iter()
            .find(|e| e.item.id == step.item_id)
            .ok_or_else(|| AppError::NotFound(format!("draw item {} not found", step.item_id)))?;
        ensure_quota_available(entry)?;

        match step.mode {
            DrawMode::Random => Ok(()),
            DrawMode::Manual | DrawMode::Forced => {
                let student_id = resolve_target(roster, step.target_draw_number.as_deref())?;
                let action = if step.mode == DrawMode::Forced {
                    DrawAction::ForcedAdd
                } else {
                    DrawAction::ManualPick
                };
                let warnings = classify(&student_id, step.item_id, None, roster, items);
                enforce_warnings(action, warnings, false)
            }
        }
    }

    async fn call_pick_procedure(
        &self,
        item_id: i64,
        mode: DrawMode,
        student_id: &str,
        force: bool,
    ) -> AppResult<PickResult> {
        self.call_procedure(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT draw_pick_winner($1, $2, $3, $4)::text AS result",
            [
                item_id.into(),
                mode.as_str().into(),
                student_id.into(),
                force.into(),
            ],
        ))
        .await
    }

    async fn call_update_procedure(
        &self,
        winner_id: i64,
        student_id: &str,
        force: bool,
    ) -> AppResult<PickResult> {
        self.call_procedure(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT draw_update_winner($1, $2, $3)::text AS result",
            [winner_id.into(), student_id.into(), force.into()],
        ))
        .await
    }

    async fn call_procedure(&self, stmt: Statement) -> AppResult<PickResult> {
        let row = self
            .pool
            .query_one(stmt)
            .await?
            .ok_or_else(|| AppError::InternalError("draw procedure returned no row".to_string()))?;
        let payload: String = row.try_get("", "result")?;
        let value: serde_json::Value = serde_json::from_str(&payload)?;
        Ok(PickResult::from_value(value))
    }
}

/// Active-pool students eligible for a random draw on `item_id`: same-item
/// winners are always excluded, cross-item winners only when the item forbids
/// duplicates, and the optional filters restrict by roster attributes.
fn eligible_candidates(
    roster: &NormalizedPool,
    items: &[crate::draw::ItemWithComputed],
    item_id: i64,
    allow_duplicates: bool,
    filters: Option<&RandomFilters>,
) -> Vec<String> {
    let same_item: HashSet<&str> = items
        .iter()
        .find(|e| e.item.id == item_id)
        .map(|e| e.winners.iter().map(|w| w.student_id.as_str()).collect())
        .unwrap_or_default();
    let cross_item: HashSet<&str> = if allow_duplicates {
        HashSet::new()
    } else {
        winners_of_other_items(items, item_id).into_iter().collect()
    };

    roster
        .active_ids
        .iter()
        .filter(|id| !same_item.contains(id.as_str()) && !cross_item.contains(id.as_str()))
        .filter(|id| {
            let Some(record) = roster.by_id.get(id.as_str()) else {
                return false;
            };
            let Some(filters) = filters else { return true };
            let matches = |values: &[String], field: &str| {
                values.is_empty() || values.iter().any(|v| v == field)
            };
            matches(&filters.genders, &record.gender)
                && matches(&filters.departments, &record.department)
                && matches(&filters.roles, &record.role)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::normalize_items;
    use crate::entities::{draw_items, students};

    fn student(id: &str, number: &str, dept: &str, role: &str) -> students::Model {
        students::Model {
            student_id: id.to_string(),
            draw_number: Some(number.to_string()),
            is_suspended: false,
            gender: "f".to_string(),
            department: dept.to_string(),
            role: role.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn item(id: i64, allow_duplicates: bool) -> draw_items::Model {
        draw_items::Model {
            id,
            name: format!("prize-{id}"),
            winner_quota: 3,
            winner_count: 0,
            allow_duplicate_winners: allow_duplicates,
            is_public: true,
            show_recent_winners: None,
            sort_order: id as i32,
            created_at: None,
            updated_at: None,
        }
    }

    fn winner(id: i64, item_id: i64, student_id: &str) -> winners::Model {
        winners::Model {
            id,
            draw_item_id: item_id,
            student_id: student_id.to_string(),
            selected_mode: DrawMode::Random,
            is_forced: false,
            is_public: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn candidates_exclude_same_item_winners() {
        let roster = NormalizedPool::from_records(&[
            student("s1", "1", "cs", "student"),
            student("s2", "2", "cs", "student"),
        ]);
        let items = normalize_items(vec![item(1, true)], vec![winner(10, 1, "s1")]);

        let candidates = eligible_candidates(&roster, &items, 1, true, None);
        assert_eq!(candidates, vec!["s2"]);
    }

    #[test]
    fn candidates_exclude_cross_item_winners_unless_allowed() {
        let roster = NormalizedPool::from_records(&[
            student("s1", "1", "cs", "student"),
            student("s2", "2", "cs", "student"),
        ]);
        let items = normalize_items(
            vec![item(1, false), item(2, false)],
            vec![winner(10, 2, "s1")],
        );

        let strict = eligible_candidates(&roster, &items, 1, false, None);
        assert_eq!(strict, vec!["s2"]);

        let lenient = eligible_candidates(&roster, &items, 1, true, None);
        assert_eq!(lenient, vec!["s1", "s2"]);
    }

    #[test]
    fn filters_restrict_by_roster_attributes() {
        let roster = NormalizedPool::from_records(&[
            student("s1", "1", "cs", "student"),
            student("s2", "2", "ee", "student"),
            student("s3", "3", "cs", "staff"),
        ]);
        let items = normalize_items(vec![item(1, true)], vec![]);

        let filters = RandomFilters {
            genders: vec![],
            departments: vec!["cs".to_string()],
            roles: vec!["student".to_string()],
        };
        let candidates = eligible_candidates(&roster, &items, 1, true, Some(&filters));
        assert_eq!(candidates, vec!["s1"]);

        // empty lists leave the dimension unrestricted
        let candidates = eligible_candidates(&roster, &items, 1, true, Some(&RandomFilters::default()));
        assert_eq!(candidates.len(), 3);
    }
}
