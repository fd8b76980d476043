use crate::draw::pool::NormalizedPool;
use crate::draw::registry::ItemWithComputed;

/// Admin action going through the confirmation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawAction {
    ManualPick,
    ForcedAdd,
    UpdateWinner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningClass {
    /// Same-item duplicate. A hard invariant, never overridable.
    SameItemDuplicate,
    /// Already won a different item while duplicates are disallowed.
    CrossItemDuplicate,
    /// Target is suspended, unknown, or has no usable draw number.
    NotInActivePool,
}

impl WarningClass {
    /// Whether the warning blocks the action even with an explicit override.
    pub fn is_blocking(&self, action: DrawAction) -> bool {
        match self {
            WarningClass::SameItemDuplicate => true,
            WarningClass::CrossItemDuplicate => false,
            // Only a forced add may bring in someone outside the active pool.
            WarningClass::NotInActivePool => action != DrawAction::ForcedAdd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub class: WarningClass,
    pub message: String,
}

/// Classify an admin action targeting `student_id` on the item `item_id`.
/// Whether a warning blocks or merely requires confirmation depends on the
/// action, see `partition_blocking`.
///
/// `exclude_winner_id` carries the row being edited for UPDATE_WINNER so the
/// record does not collide with itself. The returned warnings mirror what the
/// backend procedure re-validates authoritatively; they exist so the admin can
/// be asked to confirm *before* the mutating call, not instead of it.
pub fn classify(
    student_id: &str,
    item_id: i64,
    exclude_winner_id: Option<i64>,
    pool: &NormalizedPool,
    items: &[ItemWithComputed],
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    let target_item = items.iter().find(|entry| entry.item.id == item_id);

    if let Some(entry) = target_item {
        let already_in_item = entry.winners.iter().any(|w| {
            w.student_id == student_id && Some(w.id) != exclude_winner_id
        });
        if already_in_item {
            warnings.push(Warning {
                class: WarningClass::SameItemDuplicate,
                message: "student already won this item".to_string(),
            });
        }

        if !entry.item.allow_duplicate_winners {
            let won_elsewhere = items.iter().any(|other| {
                other.item.id != item_id
                    && other.winners.iter().any(|w| {
                        w.student_id == student_id && Some(w.id) != exclude_winner_id
                    })
            });
            if won_elsewhere {
                warnings.push(Warning {
                    class: WarningClass::CrossItemDuplicate,
                    message: "student already won a different item".to_string(),
                });
            }
        }
    }

    if !pool.is_active(student_id) {
        warnings.push(Warning {
            class: WarningClass::NotInActivePool,
            message: "student is not in the active pool (suspended or unknown)".to_string(),
        });
    }

    warnings
}

/// Split warnings for an action into (blocking, overridable) sets.
pub fn partition_blocking(
    action: DrawAction,
    warnings: Vec<Warning>,
) -> (Vec<Warning>, Vec<Warning>) {
    warnings
        .into_iter()
        .partition(|w| w.class.is_blocking(action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::registry::normalize_items;
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

    fn item(id: i64, allow_duplicates: bool) -> draw_items::Model {
        draw_items::Model {
            id,
            name: format!("prize-{id}"),
            winner_quota: 5,
            winner_count: 0,
            allow_duplicate_winners: allow_duplicates,
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

    fn fixture() -> (NormalizedPool, Vec<ItemWithComputed>) {
        let pool = NormalizedPool::from_records(&[
            student("s1", Some("1"), false),
            student("s2", Some("2"), false),
            student("s3", Some("3"), true),
        ]);
        let items = normalize_items(
            vec![item(1, false), item(2, false), item(3, true)],
            vec![winner(10, 1, "s1")],
        );
        (pool, items)
    }

    #[test]
    fn same_item_duplicate_always_blocks() {
        let (pool, items) = fixture();
        for action in [DrawAction::ManualPick, DrawAction::ForcedAdd, DrawAction::UpdateWinner] {
            let warnings = classify("s1", 1, None, &pool, &items);
            let (blocking, _) = partition_blocking(action, warnings);
            assert!(
                blocking.iter().any(|w| w.class == WarningClass::SameItemDuplicate),
                "{action:?} must block a same-item duplicate"
            );
        }
    }

    #[test]
    fn cross_item_duplicate_is_overridable() {
        let (pool, items) = fixture();
        let warnings = classify("s1", 2, None, &pool, &items);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].class, WarningClass::CrossItemDuplicate);
        let (blocking, overridable) = partition_blocking(DrawAction::ManualPick, warnings);
        assert!(blocking.is_empty());
        assert_eq!(overridable.len(), 1);
    }

    #[test]
    fn cross_item_duplicate_ignored_when_item_allows_duplicates() {
        let (pool, items) = fixture();
        let warnings = classify("s1", 3, None, &pool, &items);
        assert!(warnings.is_empty());
    }

    #[test]
    fn suspended_target_blocks_unless_forced_add() {
        let (pool, items) = fixture();

        let warnings = classify("s3", 2, None, &pool, &items);
        let (blocking, _) = partition_blocking(DrawAction::ManualPick, warnings);
        assert_eq!(blocking.len(), 1);
        assert_eq!(blocking[0].class, WarningClass::NotInActivePool);

        let warnings = classify("s3", 2, None, &pool, &items);
        let (blocking, overridable) = partition_blocking(DrawAction::ForcedAdd, warnings);
        assert!(blocking.is_empty());
        assert_eq!(overridable.len(), 1);
    }

    #[test]
    fn edited_row_does_not_collide_with_itself() {
        let (pool, items) = fixture();
        // Reassigning winner row 10 (item 1, s1) back to s1 raises nothing.
        let warnings = classify("s1", 1, Some(10), &pool, &items);
        assert!(warnings.is_empty());
        // But reassigning some other row in item 1 to s1 is a duplicate.
        let warnings = classify("s1", 1, Some(99), &pool, &items);
        assert_eq!(warnings[0].class, WarningClass::SameItemDuplicate);
    }

    #[test]
    fn clean_target_produces_no_warnings() {
        let (pool, items) = fixture();
        let warnings = classify("s2", 2, None, &pool, &items);
        assert!(warnings.is_empty());
    }
}
