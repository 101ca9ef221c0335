use checklist_core::config::Palette;
use checklist_core::render::html::{paint_history, paint_tasks};
use checklist_core::render::{HistoryView, RowMode, TaskListView};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct TaskLine {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Done")]
    check: String,
    #[tabled(rename = "Task")]
    text: String,
}

#[derive(Tabled)]
struct HistoryLine {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Completed")]
    when: String,
}

pub fn tasks_text(view: &TaskListView, palette: &Palette) -> String {
    let body = match view.empty {
        Some(copy) => palette.mutedize(&format!("✦ {copy}")),
        None => {
            let lines = view.rows.iter().map(|row| TaskLine {
                id: row.id,
                check: if row.done { "✓" } else { "" }.to_string(),
                text: match &row.mode {
                    RowMode::Normal => row.text.clone(),
                    RowMode::Editing { draft } => format!("✎ {draft}"),
                },
            });
            Table::new(lines).with(Style::rounded()).to_string()
        }
    };

    format!(
        "{body}\n{} · {}",
        palette.accentize(&view.remaining_label),
        palette.mutedize(&view.completed_label)
    )
}

pub fn history_text(view: &HistoryView, palette: &Palette) -> String {
    let header = palette.accentize(&format!("History ({})", view.count));
    if !view.open {
        return format!("{header} {}", palette.mutedize("[collapsed]"));
    }

    let body = match view.empty {
        Some(copy) => palette.mutedize(copy),
        None => {
            let lines = view.rows.iter().map(|row| HistoryLine {
                id: row.id,
                text: row.text.clone(),
                when: row.when.clone(),
            });
            Table::new(lines).with(Style::rounded()).to_string()
        }
    };

    format!("{header}\n{body}")
}

/// Both widget regions as one HTML fragment.
pub fn markup(tasks: &TaskListView, history: &HistoryView) -> String {
    let collapsed = if history.open { "" } else { " collapsed" };
    format!(
        concat!(
            "<div class=\"stats\">{remaining}</div>\n",
            "<div class=\"done-count\">{completed}</div>\n",
            "<ul class=\"todo-list\">{tasks}</ul>\n",
            "<span class=\"history-count\">{count}</span>\n",
            "<ul class=\"history-list{collapsed}\">{history}</ul>\n"
        ),
        remaining = tasks.remaining_label,
        completed = tasks.completed_label,
        tasks = paint_tasks(tasks),
        count = history.count,
        collapsed = collapsed,
        history = paint_history(history),
    )
}
