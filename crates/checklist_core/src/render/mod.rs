//! Pure projection of [`TaskState`] into view models.
//!
//! Nothing here mutates state; every call recomputes the whole list. The
//! [`html`] painter turns the view models into markup.

pub mod html;

use crate::model::HistoryEntry;
use crate::state::TaskState;
use crate::view::{Filter, ViewState};
use serde::Serialize;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const EMPTY_ALL: &str = "Add your first task above.";
const EMPTY_ACTIVE: &str = "All caught up!";
const EMPTY_DONE: &str = "No completed tasks yet.";
const EMPTY_HISTORY: &str = "No completed tasks yet.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RowMode {
    Normal,
    Editing { draft: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub id: u64,
    pub text: String,
    pub done: bool,
    #[serde(flatten)]
    pub mode: RowMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListView {
    pub filter: Filter,
    pub rows: Vec<TaskRow>,
    pub empty: Option<&'static str>,
    /// Counted over the whole list, not the filtered rows.
    pub remaining: usize,
    pub completed: usize,
    pub remaining_label: String,
    pub completed_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub id: u64,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
    pub when: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryView {
    pub rows: Vec<HistoryRow>,
    pub empty: Option<&'static str>,
    pub count: usize,
    pub open: bool,
}

pub fn render_tasks(state: &TaskState, view: &ViewState) -> TaskListView {
    let filter = view.filter;
    let rows: Vec<TaskRow> = state
        .tasks
        .iter()
        .filter(|task| filter.matches(task))
        .map(|task| TaskRow {
            id: task.id,
            text: task.text.clone(),
            done: task.done,
            mode: if view.editing() == Some(task.id) {
                RowMode::Editing {
                    draft: task.text.clone(),
                }
            } else {
                RowMode::Normal
            },
        })
        .collect();

    let empty = rows.is_empty().then_some(match filter {
        Filter::All => EMPTY_ALL,
        Filter::Active => EMPTY_ACTIVE,
        Filter::Done => EMPTY_DONE,
    });

    let remaining = state.remaining_count();
    let completed = state.completed_count();

    TaskListView {
        filter,
        rows,
        empty,
        remaining,
        completed,
        remaining_label: remaining_label(remaining),
        completed_label: format!("{completed} completed"),
    }
}

pub fn render_history(state: &TaskState, view: &ViewState) -> HistoryView {
    render_history_in(state, view, local_offset())
}

/// Like [`render_history`] with the display offset pinned.
pub fn render_history_in(state: &TaskState, view: &ViewState, offset: UtcOffset) -> HistoryView {
    let rows: Vec<HistoryRow> = state
        .history
        .iter()
        .map(|entry| history_row(entry, offset))
        .collect();

    HistoryView {
        empty: rows.is_empty().then_some(EMPTY_HISTORY),
        count: rows.len(),
        rows,
        open: view.history_open,
    }
}

/// Formats a completion time as `18 Oct 2026 • 14:05` in `offset`.
pub fn format_completed_at(at: OffsetDateTime, offset: UtcOffset) -> String {
    let local = at.to_offset(offset);
    let date = local
        .format(format_description!(
            "[day padding:none] [month repr:short] [year]"
        ))
        .unwrap_or_default();
    let time = local
        .format(format_description!("[hour]:[minute]"))
        .unwrap_or_default();
    format!("{date} • {time}")
}

fn history_row(entry: &HistoryEntry, offset: UtcOffset) -> HistoryRow {
    HistoryRow {
        id: entry.id,
        text: entry.text.clone(),
        completed_at: entry.completed_at,
        when: format_completed_at(entry.completed_at, offset),
    }
}

fn remaining_label(remaining: usize) -> String {
    let noun = if remaining == 1 { "task" } else { "tasks" };
    format!("{remaining} {noun} remaining")
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

#[cfg(test)]
mod tests {
    use super::{RowMode, format_completed_at, render_history_in, render_tasks};
    use crate::state::TaskState;
    use crate::view::{Filter, ViewState};
    use time::macros::{datetime, offset};
    use time::{Duration, UtcOffset};

    fn a_open_b_done() -> TaskState {
        let mut state = TaskState::default();
        state.add_task("A");
        state.add_task("B");
        state.toggle_task(2, datetime!(2025-12-20 09:00:00 UTC));
        state
    }

    fn texts(state: &TaskState, filter: Filter) -> Vec<String> {
        let view = ViewState::new(filter, true);
        render_tasks(state, &view)
            .rows
            .into_iter()
            .map(|row| row.text)
            .collect()
    }

    #[test]
    fn filters_select_rows_in_stored_order() {
        let state = a_open_b_done();

        assert_eq!(texts(&state, Filter::Active), ["A"]);
        assert_eq!(texts(&state, Filter::Done), ["B"]);
        assert_eq!(texts(&state, Filter::All), ["A", "B"]);
    }

    #[test]
    fn counters_ignore_filter() {
        let state = a_open_b_done();
        let list = render_tasks(&state, &ViewState::new(Filter::Done, true));

        assert_eq!(list.remaining, 1);
        assert_eq!(list.completed, 1);
        assert_eq!(list.remaining_label, "1 task remaining");
        assert_eq!(list.completed_label, "1 completed");
    }

    #[test]
    fn remaining_label_pluralizes() {
        let mut state = TaskState::default();
        let view = ViewState::default();
        assert_eq!(render_tasks(&state, &view).remaining_label, "0 tasks remaining");

        state.add_task("a");
        state.add_task("b");
        assert_eq!(render_tasks(&state, &view).remaining_label, "2 tasks remaining");
    }

    #[test]
    fn empty_copy_depends_on_filter() {
        let state = TaskState::default();
        let copy = |filter| render_tasks(&state, &ViewState::new(filter, true)).empty;

        assert_eq!(copy(Filter::All), Some("Add your first task above."));
        assert_eq!(copy(Filter::Active), Some("All caught up!"));
        assert_eq!(copy(Filter::Done), Some("No completed tasks yet."));
    }

    #[test]
    fn non_empty_list_has_no_empty_marker() {
        let state = a_open_b_done();
        let list = render_tasks(&state, &ViewState::default());

        assert_eq!(list.empty, None);
        assert_eq!(list.rows.len(), 2);
    }

    #[test]
    fn editing_row_carries_draft() {
        let state = a_open_b_done();
        let mut view = ViewState::default();
        view.begin_edit(&state, 2);

        let list = render_tasks(&state, &view);

        assert_eq!(list.rows[0].mode, RowMode::Normal);
        assert_eq!(
            list.rows[1].mode,
            RowMode::Editing {
                draft: "B".to_string()
            }
        );
    }

    #[test]
    fn history_keeps_stored_order() {
        let mut state = TaskState::default();
        state.add_task("first");
        state.add_task("second");
        let at = datetime!(2025-12-20 09:00:00 UTC);
        state.toggle_task(1, at);
        state.toggle_task(2, at + Duration::hours(1));

        let history = render_history_in(&state, &ViewState::default(), UtcOffset::UTC);

        assert_eq!(history.count, 2);
        assert_eq!(history.empty, None);
        assert_eq!(history.rows[0].text, "second");
        assert_eq!(history.rows[0].when, "20 Dec 2025 • 10:00");
        assert_eq!(history.rows[1].text, "first");
    }

    #[test]
    fn empty_history_reports_marker_and_panel_state() {
        let mut view = ViewState::default();
        view.toggle_history_panel();

        let history = render_history_in(&TaskState::default(), &view, UtcOffset::UTC);

        assert_eq!(history.empty, Some("No completed tasks yet."));
        assert_eq!(history.count, 0);
        assert!(!history.open);
    }

    #[test]
    fn completion_time_uses_display_offset() {
        let at = datetime!(2025-12-31 23:30:00 UTC);

        assert_eq!(format_completed_at(at, UtcOffset::UTC), "31 Dec 2025 • 23:30");
        assert_eq!(format_completed_at(at, offset!(+2)), "1 Jan 2026 • 01:30");
    }

    #[test]
    fn task_view_serializes_row_mode() {
        let state = a_open_b_done();
        let mut view = ViewState::default();
        view.begin_edit(&state, 1);

        let value = serde_json::to_value(render_tasks(&state, &view)).unwrap();

        assert_eq!(value["filter"], "all");
        assert_eq!(value["rows"][0]["mode"], "editing");
        assert_eq!(value["rows"][0]["draft"], "A");
        assert_eq!(value["rows"][1]["mode"], "normal");
    }
}
