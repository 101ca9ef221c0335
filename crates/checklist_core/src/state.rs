use crate::model::{HistoryEntry, Task};
use serde::Serialize;
use time::OffsetDateTime;

/// In-memory task list, completion log and id counter.
///
/// Every mutation here is pure; persistence is layered on by
/// [`crate::store::Store`]. Methods report whether anything changed so the
/// caller can skip writing on no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskState {
    pub tasks: Vec<Task>,
    /// Newest first.
    pub history: Vec<HistoryEntry>,
    pub next_id: u64,
}

impl Default for TaskState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            history: Vec::new(),
            next_id: 1,
        }
    }
}

impl TaskState {
    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn remaining_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.done).count()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.done).count()
    }

    /// Appends a task and returns its id, or `None` when `text` is blank or
    /// the id counter is exhausted.
    pub fn add_task(&mut self, text: &str) -> Option<u64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let id = self.next_id;
        self.next_id = id.checked_add(1)?;
        self.tasks.push(Task::new(id, trimmed));
        Some(id)
    }

    /// Flips `done`. Completing a task prepends a history snapshot taken at
    /// `now`; reopening it leaves history alone.
    pub fn toggle_task(&mut self, id: u64, now: OffsetDateTime) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };

        if !task.done {
            let entry = HistoryEntry::record(&task.text, now, &self.history);
            self.history.insert(0, entry);
        }
        task.done = !task.done;
        true
    }

    pub fn edit_task(&mut self, id: u64, new_text: &str) -> bool {
        let trimmed = new_text.trim();
        if trimmed.is_empty() {
            return false;
        }

        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.text = trimmed.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_task(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    /// Drops every completed task and returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.done);
        before - self.tasks.len()
    }

    pub fn remove_history_entry(&mut self, id: u64) -> bool {
        let before = self.history.len();
        self.history.retain(|entry| entry.id != id);
        self.history.len() != before
    }

    pub fn clear_history(&mut self) -> usize {
        let removed = self.history.len();
        self.history.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::TaskState;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use time::Duration;
    use time::macros::datetime;

    fn state_with(texts: &[&str]) -> TaskState {
        let mut state = TaskState::default();
        for text in texts {
            state.add_task(text);
        }
        state
    }

    #[test]
    fn add_task_assigns_sequential_ids_and_trims() {
        let mut state = TaskState::default();
        let first = state.add_task("  buy milk ").unwrap();
        let second = state.add_task("walk dog").unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(state.tasks[0].text, "buy milk");
        assert!(!state.tasks[0].done);
        assert_eq!(state.next_id, 3);
    }

    #[test]
    fn add_task_stops_at_exhausted_counter() {
        let mut state = TaskState {
            next_id: u64::MAX - 1,
            ..TaskState::default()
        };

        assert_eq!(state.add_task("last"), Some(u64::MAX - 1));
        assert_eq!(state.add_task("overflow"), None);
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.next_id, u64::MAX);
    }

    #[test]
    fn add_task_ignores_whitespace() {
        let mut state = state_with(&["a"]);
        let before = state.clone();

        assert_eq!(state.add_task(" \t\n "), None);
        assert_eq!(state, before);
    }

    #[test]
    fn toggle_to_done_records_one_history_entry() {
        let mut state = state_with(&["write report"]);
        let now = datetime!(2025-12-20 09:00:00 UTC);

        assert!(state.toggle_task(1, now));

        assert!(state.tasks[0].done);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].text, "write report");
        assert_eq!(state.history[0].completed_at, now);
    }

    #[test]
    fn toggle_back_keeps_history() {
        let mut state = state_with(&["write report"]);
        let now = datetime!(2025-12-20 09:00:00 UTC);
        state.toggle_task(1, now);

        assert!(state.toggle_task(1, now + Duration::minutes(1)));

        assert!(!state.tasks[0].done);
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn history_is_newest_first_and_snapshots_text() {
        let mut state = state_with(&["a", "b"]);
        let now = datetime!(2025-12-20 09:00:00 UTC);
        state.toggle_task(1, now);
        state.toggle_task(2, now + Duration::seconds(5));
        state.edit_task(1, "renamed");

        let texts: Vec<_> = state.history.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["b", "a"]);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut state = state_with(&["a"]);
        let before = state.clone();

        assert!(!state.toggle_task(42, datetime!(2025-12-20 09:00:00 UTC)));
        assert_eq!(state, before);
    }

    #[test]
    fn edit_task_replaces_text_in_place() {
        let mut state = state_with(&["a", "b"]);
        state.toggle_task(2, datetime!(2025-12-20 09:00:00 UTC));

        assert!(state.edit_task(2, "  bee "));

        assert_eq!(state.tasks[1].id, 2);
        assert_eq!(state.tasks[1].text, "bee");
        assert!(state.tasks[1].done);
    }

    #[test]
    fn edit_task_rejects_blank_text() {
        let mut state = state_with(&["a"]);

        assert!(!state.edit_task(1, "   "));
        assert_eq!(state.tasks[0].text, "a");
    }

    #[test]
    fn remove_task_tolerates_unknown_id() {
        let mut state = state_with(&["a", "b"]);

        assert!(state.remove_task(1));
        assert!(!state.remove_task(1));
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].id, 2);
    }

    #[test]
    fn clear_completed_keeps_order_of_open_tasks() {
        let mut state = state_with(&["a", "b", "c", "d"]);
        let now = datetime!(2025-12-20 09:00:00 UTC);
        state.toggle_task(2, now);
        state.toggle_task(4, now);

        assert_eq!(state.clear_completed(), 2);

        let ids: Vec<_> = state.tasks.iter().map(|task| task.id).collect();
        assert_eq!(ids, [1, 3]);
        assert_eq!(state.history.len(), 2);
    }

    #[test]
    fn removing_history_leaves_tasks() {
        let mut state = state_with(&["a", "b"]);
        let now = datetime!(2025-12-20 09:00:00 UTC);
        state.toggle_task(1, now);
        state.toggle_task(2, now);
        let newest = state.history[0].id;

        assert!(state.remove_history_entry(newest));
        assert!(!state.remove_history_entry(newest));
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].text, "a");

        assert_eq!(state.clear_history(), 1);
        assert!(state.history.is_empty());
        assert_eq!(state.tasks.len(), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(String),
        Toggle(u64),
        Edit(u64, String),
        Remove(u64),
        ClearCompleted,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            "[ a-z]{0,6}".prop_map(Op::Add),
            (1u64..12).prop_map(Op::Toggle),
            ((1u64..12), "[ a-z]{0,6}").prop_map(|(id, text)| Op::Edit(id, text)),
            (1u64..12).prop_map(Op::Remove),
            Just(Op::ClearCompleted),
        ]
    }

    proptest! {
        #[test]
        fn task_ids_stay_unique(ops in prop::collection::vec(op_strategy(), 0..40)) {
            let mut state = TaskState::default();
            let now = datetime!(2025-12-20 09:00:00 UTC);

            for op in ops {
                match op {
                    Op::Add(text) => { state.add_task(&text); }
                    Op::Toggle(id) => { state.toggle_task(id, now); }
                    Op::Edit(id, text) => { state.edit_task(id, &text); }
                    Op::Remove(id) => { state.remove_task(id); }
                    Op::ClearCompleted => { state.clear_completed(); }
                }
            }

            let ids: HashSet<_> = state.tasks.iter().map(|task| task.id).collect();
            prop_assert_eq!(ids.len(), state.tasks.len());
            prop_assert!(state.tasks.iter().all(|task| task.id < state.next_id));

            let history_ids: HashSet<_> = state.history.iter().map(|entry| entry.id).collect();
            prop_assert_eq!(history_ids.len(), state.history.len());
        }
    }
}
