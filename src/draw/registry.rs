use std::collections::HashMap;

use crate::entities::{draw_items, draw_winners};

/// A draw item joined with its (ordered) winners and the computed quota view.
#[derive(Debug, Clone)]
pub struct ItemWithComputed {
    pub item: draw_items::Model,
    /// Winners sorted ascending by `created_at`, stable for equal timestamps.
    pub winners: Vec<draw_winners::Model>,
    pub winner_count: i32,
    pub remaining_count: i32,
    /// Defaulted to true when the legacy column is NULL.
    pub show_recent_winners: bool,
}

impl ItemWithComputed {
    /// Winner `is_public` defaulted to true on legacy rows.
    pub fn winner_is_public(winner: &draw_winners::Model) -> bool {
        winner.is_public.unwrap_or(true)
    }
}

/// Build the computed registry view: attach each item's winners (sorted,
/// stable), default the legacy flags, and derive counts. Items come out
/// ordered by `sort_order`, then id. Re-normalizing an already-normalized
/// list yields identical computed fields.
pub fn normalize_items(
    mut items: Vec<draw_items::Model>,
    winners: Vec<draw_winners::Model>,
) -> Vec<ItemWithComputed> {
    items.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));

    let mut winners_by_item: HashMap<i64, Vec<draw_winners::Model>> = HashMap::new();
    for winner in winners {
        winners_by_item
            .entry(winner.draw_item_id)
            .or_default()
            .push(winner);
    }

    items
        .into_iter()
        .map(|item| {
            let mut item_winners = winners_by_item.remove(&item.id).unwrap_or_default();
            item_winners.sort_by_key(|w| w.created_at);

            let winner_count = item_winners.len() as i32;
            let remaining_count = (item.winner_quota - winner_count).max(0);
            let show_recent_winners = item.show_recent_winners.unwrap_or(true);

            ItemWithComputed {
                item,
                winners: item_winners,
                winner_count,
                remaining_count,
                show_recent_winners,
            }
        })
        .collect()
}

/// All student ids holding a winner record in any item other than `item_id`.
pub fn winners_of_other_items(items: &[ItemWithComputed], item_id: i64) -> Vec<&str> {
    items
        .iter()
        .filter(|entry| entry.item.id != item_id)
        .flat_map(|entry| entry.winners.iter().map(|w| w.student_id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrawMode;
    use chrono::{TimeZone, Utc};

    fn item(id: i64, quota: i32, sort_order: i32, show_recent: Option<bool>) -> draw_items::Model {
        draw_items::Model {
            id,
            name: format!("prize-{id}"),
            winner_quota: quota,
            winner_count: 0,
            allow_duplicate_winners: false,
            is_public: true,
            show_recent_winners: show_recent,
            sort_order,
            created_at: None,
            updated_at: None,
        }
    }

    fn winner(id: i64, item_id: i64, student_id: &str, at_secs: i64) -> draw_winners::Model {
        draw_winners::Model {
            id,
            draw_item_id: item_id,
            student_id: student_id.to_string(),
            selected_mode: DrawMode::Random,
            is_forced: false,
            is_public: None,
            created_at: Some(Utc.timestamp_opt(at_secs, 0).unwrap()),
            updated_at: None,
        }
    }

    #[test]
    fn computes_counts_and_orders_winners() {
        let items = vec![item(2, 3, 1, None), item(1, 1, 0, Some(false))];
        let winners = vec![
            winner(10, 2, "1002", 200),
            winner(11, 2, "1001", 100),
            winner(12, 1, "1003", 50),
        ];

        let view = normalize_items(items, winners);

        assert_eq!(view[0].item.id, 1);
        assert_eq!(view[0].winner_count, 1);
        assert_eq!(view[0].remaining_count, 0);
        assert!(!view[0].show_recent_winners);

        assert_eq!(view[1].item.id, 2);
        assert_eq!(view[1].winner_count, 2);
        assert_eq!(view[1].remaining_count, 1);
        assert!(view[1].show_recent_winners);
        let order: Vec<&str> = view[1].winners.iter().map(|w| w.student_id.as_str()).collect();
        assert_eq!(order, vec!["1001", "1002"]);
    }

    #[test]
    fn stable_for_equal_timestamps() {
        let winners = vec![
            winner(10, 1, "a", 100),
            winner(11, 1, "b", 100),
            winner(12, 1, "c", 100),
        ];
        let view = normalize_items(vec![item(1, 5, 0, None)], winners);
        let order: Vec<&str> = view[0].winners.iter().map(|w| w.student_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn remaining_never_negative() {
        let winners = vec![winner(10, 1, "a", 1), winner(11, 1, "b", 2)];
        let view = normalize_items(vec![item(1, 1, 0, None)], winners);
        assert_eq!(view[0].winner_count, 2);
        assert_eq!(view[0].remaining_count, 0);
    }

    #[test]
    fn normalization_is_idempotent() {
        let items = vec![item(1, 2, 0, None), item(2, 1, 1, Some(true))];
        let winners = vec![winner(10, 1, "a", 5), winner(11, 2, "b", 3)];

        let first = normalize_items(items.clone(), winners.clone());
        let again = normalize_items(
            first.iter().map(|e| e.item.clone()).collect(),
            first.iter().flat_map(|e| e.winners.clone()).collect(),
        );

        for (a, b) in first.iter().zip(again.iter()) {
            assert_eq!(a.item.id, b.item.id);
            assert_eq!(a.winner_count, b.winner_count);
            assert_eq!(a.remaining_count, b.remaining_count);
            assert_eq!(a.show_recent_winners, b.show_recent_winners);
        }
    }

    #[test]
    fn collects_winners_of_other_items() {
        let items = vec![item(1, 2, 0, None), item(2, 2, 1, None)];
        let winners = vec![winner(10, 1, "s1", 1), winner(11, 2, "s2", 2)];
        let view = normalize_items(items, winners);

        let others = winners_of_other_items(&view, 2);
        assert_eq!(others, vec!["s1"]);
    }
}
