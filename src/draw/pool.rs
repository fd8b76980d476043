use std::collections::HashMap;

use crate::draw::number::normalize_draw_number;
use crate::entities::students;

/// Read-side view of the registered participants, rebuilt wholesale from the
/// `students` table on every refresh. Nothing in the draw path mutates it.
///
/// A student contributes to the `active_*` sets only when not suspended AND
/// holding a non-empty normalized draw number. Draw-number uniqueness is
/// enforced at write time (see `StudentService`); this indexer assumes the
/// invariant holds and keeps the first-seen value on a conflict.
#[derive(Debug, Default, Clone)]
pub struct NormalizedPool {
    pub by_id: HashMap<String, students::Model>,
    /// All student ids in input order, suspended or not.
    pub all_ids: Vec<String>,
    /// Ids of students eligible for draws.
    pub active_ids: Vec<String>,
    pub all_draw_numbers: Vec<String>,
    pub active_draw_numbers: Vec<String>,
    pub student_id_by_draw_number: HashMap<String, String>,
    pub draw_number_by_student_id: HashMap<String, String>,
}

impl NormalizedPool {
    pub fn from_records(records: &[students::Model]) -> Self {
        let mut pool = NormalizedPool::default();

        for record in records {
            let id = record.student_id.clone();
            pool.all_ids.push(id.clone());

            let number = record
                .draw_number
                .as_deref()
                .map(normalize_draw_number)
                .unwrap_or_default();

            if !number.is_empty() && !pool.student_id_by_draw_number.contains_key(&number) {
                pool.all_draw_numbers.push(number.clone());
                pool.student_id_by_draw_number
                    .insert(number.clone(), id.clone());
                pool.draw_number_by_student_id
                    .insert(id.clone(), number.clone());

                if !record.is_suspended {
                    pool.active_ids.push(id.clone());
                    pool.active_draw_numbers.push(number);
                }
            }

            pool.by_id.insert(id, record.clone());
        }

        pool
    }

    /// Resolve a raw draw-number input to an *active* student id.
    pub fn resolve_active(&self, raw_number: &str) -> Option<&str> {
        let number = normalize_draw_number(raw_number);
        if number.is_empty() {
            return None;
        }
        let id = self.student_id_by_draw_number.get(&number)?;
        let record = self.by_id.get(id)?;
        if record.is_suspended {
            return None;
        }
        Some(id)
    }

    /// Whether the student is currently eligible for selection.
    pub fn is_active(&self, student_id: &str) -> bool {
        self.by_id
            .get(student_id)
            .map(|r| !r.is_suspended && self.draw_number_by_student_id.contains_key(student_id))
            .unwrap_or(false)
    }

    pub fn display_number(&self, student_id: &str) -> Option<&str> {
        self.draw_number_by_student_id
            .get(student_id)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn partitions_active_and_suspended() {
        let records = vec![
            student("1001", Some("007"), false),
            student("1002", Some("12-34"), true),
            student("1003", None, false),
            student("1004", Some("ab"), false),
        ];
        let pool = NormalizedPool::from_records(&records);

        assert_eq!(pool.all_ids.len(), 4);
        assert_eq!(pool.active_ids, vec!["1001"]);
        // suspended students keep their number in the full index
        assert_eq!(pool.all_draw_numbers, vec!["007", "1234"]);
        assert_eq!(pool.active_draw_numbers, vec!["007"]);
        // students without a usable number are absent from every number index
        assert!(!pool.draw_number_by_student_id.contains_key("1003"));
        assert!(!pool.draw_number_by_student_id.contains_key("1004"));
        // but still visible in the roster view
        assert!(pool.by_id.contains_key("1003"));
        assert!(pool.by_id.contains_key("1004"));
    }

    #[test]
    fn resolve_active_rejects_suspended_and_unknown() {
        let records = vec![
            student("1001", Some("007"), false),
            student("1002", Some("42"), true),
        ];
        let pool = NormalizedPool::from_records(&records);

        assert_eq!(pool.resolve_active("007"), Some("1001"));
        assert_eq!(pool.resolve_active("0-0-7"), Some("1001"));
        assert_eq!(pool.resolve_active("42"), None);
        assert_eq!(pool.resolve_active("999"), None);
        assert_eq!(pool.resolve_active("xyz"), None);
    }

    #[test]
    fn first_seen_wins_on_externally_broken_uniqueness() {
        let records = vec![
            student("1001", Some("11"), false),
            student("1002", Some("11"), false),
        ];
        let pool = NormalizedPool::from_records(&records);

        assert_eq!(pool.student_id_by_draw_number["11"], "1001");
        assert_eq!(pool.active_ids, vec!["1001"]);
        assert!(!pool.draw_number_by_student_id.contains_key("1002"));
    }

    #[test]
    fn is_active_requires_number_and_not_suspended() {
        let records = vec![
            student("1001", Some("1"), false),
            student("1002", None, false),
            student("1003", Some("2"), true),
        ];
        let pool = NormalizedPool::from_records(&records);

        assert!(pool.is_active("1001"));
        assert!(!pool.is_active("1002"));
        assert!(!pool.is_active("1003"));
        assert!(!pool.is_active("9999"));
    }
}
