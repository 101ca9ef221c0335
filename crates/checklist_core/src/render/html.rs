use crate::render::{HistoryView, RowMode, TaskListView, TaskRow};
use std::fmt::Write;

/// Escapes `&`, `<` and `>` so user text cannot inject markup.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn paint_tasks(view: &TaskListView) -> String {
    if let Some(copy) = view.empty {
        return format!(r#"<div class="empty"><span class="icon">✦</span>{copy}</div>"#);
    }

    let mut out = String::new();
    for row in &view.rows {
        paint_task_row(&mut out, row);
    }
    out
}

pub fn paint_history(view: &HistoryView) -> String {
    if let Some(copy) = view.empty {
        return format!(r#"<div class="history-empty">{copy}</div>"#);
    }

    let mut out = String::new();
    for row in &view.rows {
        let _ = write!(
            out,
            concat!(
                r#"<li class="history-item" data-id="{id}">"#,
                r#"<div class="history-check">✓</div>"#,
                r#"<div class="history-info">"#,
                r#"<div class="history-text">{text}</div>"#,
                r#"<div class="history-time">{when}</div>"#,
                "</div>",
                r#"<button class="history-remove" data-action="remove-history" data-id="{id}" title="Remove">✕</button>"#,
                "</li>"
            ),
            id = row.id,
            text = escape_html(&row.text),
            when = escape_html(&row.when),
        );
    }
    out
}

fn paint_task_row(out: &mut String, row: &TaskRow) {
    let done_class = if row.done { " done" } else { "" };
    let check = if row.done { "✓" } else { "" };

    let _ = write!(
        out,
        r#"<li class="todo-item{done_class}" id="item-{id}"><button class="check-btn" data-action="toggle" data-id="{id}">{check}</button>"#,
        id = row.id,
    );

    match &row.mode {
        RowMode::Normal => {
            let _ = write!(
                out,
                concat!(
                    r#"<span class="todo-text">{text}</span>"#,
                    r#"<button class="edit-btn" data-action="edit" data-id="{id}" title="Edit">✎</button>"#,
                    r#"<button class="delete-btn" data-action="delete" data-id="{id}" title="Delete">✕</button>"#
                ),
                id = row.id,
                text = escape_html(&row.text),
            );
        }
        RowMode::Editing { draft } => {
            let _ = write!(
                out,
                concat!(
                    r#"<input class="edit-input" id="edit-{id}" value="{draft}" />"#,
                    r#"<button class="edit-btn" data-action="save-edit" data-id="{id}" title="Save">✔</button>"#,
                    r#"<button class="delete-btn" data-action="cancel-edit" title="Cancel">✕</button>"#
                ),
                id = row.id,
                // The draft sits inside an attribute, so quotes need escaping too.
                draft = escape_html(draft).replace('"', "&quot;"),
            );
        }
    }

    out.push_str("</li>");
}

#[cfg(test)]
mod tests {
    use super::{escape_html, paint_history, paint_tasks};
    use crate::render::{render_history_in, render_tasks};
    use crate::state::TaskState;
    use crate::view::{Filter, ViewState};
    use time::UtcOffset;
    use time::macros::datetime;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html("<b>salt & pepper</b>"),
            "&lt;b&gt;salt &amp; pepper&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain 'text'"), "plain 'text'");
    }

    #[test]
    fn history_text_is_never_raw_markup() {
        let mut state = TaskState::default();
        state.add_task("<script>alert(1)</script>");
        state.toggle_task(1, datetime!(2025-12-20 09:00:00 UTC));

        let view = render_history_in(&state, &ViewState::default(), UtcOffset::UTC);
        let markup = paint_history(&view);

        assert!(markup.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!markup.contains("<script>"));
        assert!(markup.contains("20 Dec 2025 • 09:00"));
    }

    #[test]
    fn task_text_is_escaped() {
        let mut state = TaskState::default();
        state.add_task("<img src=x>");

        let markup = paint_tasks(&render_tasks(&state, &ViewState::default()));

        assert!(markup.contains(r#"<span class="todo-text">&lt;img src=x&gt;</span>"#));
        assert!(!markup.contains("<img"));
    }

    #[test]
    fn done_rows_get_done_class_and_check() {
        let mut state = TaskState::default();
        state.add_task("A");
        state.add_task("B");
        state.toggle_task(2, datetime!(2025-12-20 09:00:00 UTC));

        let markup = paint_tasks(&render_tasks(&state, &ViewState::default()));

        assert!(markup.contains(r#"<li class="todo-item" id="item-1">"#));
        assert!(markup.contains(r#"<li class="todo-item done" id="item-2">"#));
        assert_eq!(markup.matches("<li").count(), 2);
    }

    #[test]
    fn editing_row_renders_prefilled_input() {
        let mut state = TaskState::default();
        state.add_task(r#"say "hi" <now>"#);
        let mut view = ViewState::default();
        view.begin_edit(&state, 1);

        let markup = paint_tasks(&render_tasks(&state, &view));

        assert!(markup.contains(
            r#"<input class="edit-input" id="edit-1" value="say &quot;hi&quot; &lt;now&gt;" />"#
        ));
        assert!(!markup.contains("todo-text"));
    }

    #[test]
    fn empty_states_render_filter_copy() {
        let state = TaskState::default();

        let tasks = paint_tasks(&render_tasks(&state, &ViewState::new(Filter::Active, true)));
        let history = paint_history(&render_history_in(
            &state,
            &ViewState::default(),
            UtcOffset::UTC,
        ));

        assert!(tasks.contains("All caught up!"));
        assert_eq!(
            history,
            r#"<div class="history-empty">No completed tasks yet.</div>"#
        );
    }
}
