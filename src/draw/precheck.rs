use crate::draw::number::normalize_draw_number;
use crate::draw::pool::NormalizedPool;
use crate::draw::registry::ItemWithComputed;
use crate::draw::warning::{DrawAction, Warning, WarningClass, partition_blocking};
use crate::error::{AppError, AppResult};

/// Client-side preconditions for a pick, shared by single picks and the
/// multi-draw validator. The database procedure re-validates all of this under
/// a row lock; these exist to fail fast and to drive the confirmation flow.

/// Reject a pick on an item whose quota is already filled.
pub fn ensure_quota_available(entry: &ItemWithComputed) -> AppResult<()> {
    if entry.remaining_count <= 0 {
        return Err(AppError::QuotaExhausted(format!(
            "item '{}' already has {} of {} winners",
            entry.item.name, entry.winner_count, entry.item.winner_quota
        )));
    }
    Ok(())
}

/// Resolve a manual/forced target draw number against the full roster index.
/// Eligibility (suspension, missing number) is reported through the warning
/// pipeline, not here.
pub fn resolve_target(roster: &NormalizedPool, raw: Option<&str>) -> AppResult<String> {
    let raw = raw
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError("target draw number is required".to_string()))?;

    let number = normalize_draw_number(raw);
    if number.is_empty() {
        return Err(AppError::ValidationError(format!(
            "draw number '{raw}' contains no digits"
        )));
    }
    roster
        .student_id_by_draw_number
        .get(&number)
        .cloned()
        .ok_or(AppError::UnknownDrawNumber(number))
}

/// Turn blocking warnings into errors and unconfirmed overridable ones into
/// `ConfirmationRequired`.
pub fn enforce_warnings(
    action: DrawAction,
    warnings: Vec<Warning>,
    force_override: bool,
) -> AppResult<()> {
    let (blocking, overridable) = partition_blocking(action, warnings);
    if let Some(w) = blocking.first() {
        return Err(match w.class {
            WarningClass::SameItemDuplicate => AppError::DuplicateWinner(w.message.clone()),
            _ => AppError::ValidationError(w.message.clone()),
        });
    }
    if !overridable.is_empty() && !force_override {
        let messages: Vec<&str> = overridable.iter().map(|w| w.message.as_str()).collect();
        return Err(AppError::ConfirmationRequired(messages.join("; ")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::registry::normalize_items;
    use crate::draw::warning::classify;
    use crate::entities::{draw_items, draw_winners, students};
    use crate::models::DrawMode;

    fn student(id: &str, number: Option<&str>, suspended: bool) -> students::Model {
        students::Model {
            student_id: id.to_string(),
            draw_number: number.map(str::to_string),
            is_suspended: suspended,
            gender: "".to_string(),
            department: "".to_string(),
            role: "".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn item(id: i64, quota: i32) -> draw_items::Model {
        draw_items::Model {
            id,
            name: format!("prize-{id}"),
            winner_quota: quota,
            winner_count: 0,
            allow_duplicate_winners: false,
            is_public: true,
            show_recent_winners: None,
            sort_order: id as i32,
            created_at: None,
            updated_at: None,
        }
    }

    fn winner(id: i64, item_id: i64, student_id: &str) -> draw_winners::Model {
        draw_winners::Model {
            id,
            draw_item_id: item_id,
            student_id: student_id.to_string(),
            selected_mode: DrawMode::Manual,
            is_forced: false,
            is_public: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn exhausted_item_rejects_further_picks() {
        let fresh = normalize_items(vec![item(1, 1)], vec![]);
        assert!(ensure_quota_available(&fresh[0]).is_ok());

        let full = normalize_items(vec![item(1, 1)], vec![winner(10, 1, "s1")]);
        assert!(matches!(
            ensure_quota_available(&full[0]),
            Err(AppError::QuotaExhausted(_))
        ));
    }

    #[test]
    fn manual_pick_fills_the_last_slot_then_quota_blocks() {
        let roster = NormalizedPool::from_records(&[
            student("1001", Some("007"), false),
            student("1002", Some("8"), false),
        ]);
        let items = normalize_items(vec![item(1, 1)], vec![]);

        // Manual pick of "007" passes every precheck on the empty item.
        assert!(ensure_quota_available(&items[0]).is_ok());
        let picked = resolve_target(&roster, Some("007")).unwrap();
        assert_eq!(picked, "1001");
        let warnings = classify(&picked, 1, None, &roster, &items);
        assert!(enforce_warnings(DrawAction::ManualPick, warnings, false).is_ok());

        // With that winner recorded, the single-slot quota is gone and the
        // next pick is rejected before any target is even considered.
        let items = normalize_items(vec![item(1, 1)], vec![winner(10, 1, &picked)]);
        assert!(matches!(
            ensure_quota_available(&items[0]),
            Err(AppError::QuotaExhausted(_))
        ));
    }

    #[test]
    fn resolve_target_requires_a_usable_number() {
        let roster = NormalizedPool::from_records(&[student("1001", Some("007"), false)]);

        assert!(matches!(
            resolve_target(&roster, None),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            resolve_target(&roster, Some("   ")),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            resolve_target(&roster, Some("abc")),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            resolve_target(&roster, Some("999")),
            Err(AppError::UnknownDrawNumber(n)) if n == "999"
        ));
        // separators are stripped before the index lookup
        assert_eq!(resolve_target(&roster, Some("0-0-7")).unwrap(), "1001");
    }

    #[test]
    fn overridable_warnings_need_confirmation_once() {
        let overridable = vec![Warning {
            class: WarningClass::CrossItemDuplicate,
            message: "student already won a different item".to_string(),
        }];

        assert!(matches!(
            enforce_warnings(DrawAction::ManualPick, overridable.clone(), false),
            Err(AppError::ConfirmationRequired(_))
        ));
        assert!(enforce_warnings(DrawAction::ManualPick, overridable, true).is_ok());
    }

    #[test]
    fn same_item_duplicate_blocks_despite_override() {
        let warnings = vec![Warning {
            class: WarningClass::SameItemDuplicate,
            message: "student already won this item".to_string(),
        }];
        assert!(matches!(
            enforce_warnings(DrawAction::ManualPick, warnings, true),
            Err(AppError::DuplicateWinner(_))
        ));
    }
}
