use crate::error::AppError;
use crate::model::Task;
use crate::state::TaskState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which tasks the list shows. Never affects stored data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Active,
    Done,
}

impl Filter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.done,
            Self::Done => task.done,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "done" | "completed" => Ok(Self::Done),
            other => Err(AppError::invalid_input(format!(
                "unknown filter '{other}' (expected all, active or done)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditIntent {
    Save,
    Cancel,
}

impl From<EditKey> for EditIntent {
    fn from(key: EditKey) -> Self {
        match key {
            EditKey::Enter => Self::Save,
            EditKey::Escape => Self::Cancel,
        }
    }
}

/// Ephemeral presentation state: active filter, the row being edited and
/// whether the history panel is expanded. None of it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub filter: Filter,
    editing: Option<u64>,
    pub history_open: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filter: Filter::All,
            editing: None,
            history_open: true,
        }
    }
}

impl ViewState {
    pub fn new(filter: Filter, history_open: bool) -> Self {
        Self {
            filter,
            editing: None,
            history_open,
        }
    }

    pub fn editing(&self) -> Option<u64> {
        self.editing
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Puts `id` into edit mode, closing any other open edit. Unknown ids
    /// and tasks hidden by the active filter are ignored.
    pub fn begin_edit(&mut self, state: &TaskState, id: u64) -> bool {
        match state.task(id) {
            Some(task) if self.filter.matches(task) => {
                self.editing = Some(id);
                true
            }
            _ => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Leaves edit mode and returns the id that was being edited.
    pub fn finish_edit(&mut self) -> Option<u64> {
        self.editing.take()
    }

    /// Drops the edit if its task no longer exists or is filtered out.
    pub fn reconcile(&mut self, state: &TaskState) {
        if let Some(id) = self.editing
            && !state.task(id).is_some_and(|task| self.filter.matches(task))
        {
            self.editing = None;
        }
    }

    pub fn toggle_history_panel(&mut self) -> bool {
        self.history_open = !self.history_open;
        self.history_open
    }
}
