use crate::error::AppError;
use crate::render::{HistoryView, TaskListView, render_history, render_tasks};
use crate::storage::Backend;
use crate::store::Store;
use crate::view::{EditIntent, EditKey, Filter, ViewState};
use serde::Serialize;

/// Everything a presentation layer needs to paint after one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Whether the action altered persisted state.
    pub changed: bool,
    pub tasks: TaskListView,
    pub history: HistoryView,
}

/// Drives the widget: each action mutates the store, which persists, and
/// then the whole view is re-rendered.
///
/// Task-list actions close any open edit, the same way repainting the list
/// discards an in-progress inline edit. History actions leave it open.
#[derive(Debug)]
pub struct Session<B: Backend> {
    store: Store<B>,
    view: ViewState,
}

impl<B: Backend> Session<B> {
    pub fn new(store: Store<B>, view: ViewState) -> Self {
        Self { store, view }
    }

    pub fn open(backend: B, view: ViewState) -> Result<Self, AppError> {
        Ok(Self::new(Store::open(backend)?, view))
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<B> {
        &mut self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn frame(&self) -> Frame {
        self.frame_with(false)
    }

    /// Re-reads persisted state, keeping the open edit only if its task
    /// survived.
    pub fn reload(&mut self) -> Result<Frame, AppError> {
        self.store.load()?;
        self.view.reconcile(self.store.state());
        Ok(self.frame())
    }

    pub fn add(&mut self, text: &str) -> Result<Frame, AppError> {
        let added = self.store.add_task(text)?;
        if added.is_some() {
            self.view.cancel_edit();
        }
        Ok(self.frame_with(added.is_some()))
    }

    pub fn toggle(&mut self, id: u64) -> Result<Frame, AppError> {
        let changed = self.store.toggle_task(id)?;
        if changed {
            self.view.cancel_edit();
        }
        Ok(self.frame_with(changed))
    }

    pub fn delete(&mut self, id: u64) -> Result<Frame, AppError> {
        let changed = self.store.remove_task(id)?;
        self.view.cancel_edit();
        Ok(self.frame_with(changed))
    }

    pub fn clear_completed(&mut self) -> Result<Frame, AppError> {
        let removed = self.store.clear_completed()?;
        self.view.cancel_edit();
        Ok(self.frame_with(removed > 0))
    }

    pub fn set_filter(&mut self, filter: Filter) -> Frame {
        self.view.set_filter(filter);
        self.view.cancel_edit();
        self.frame()
    }

    pub fn begin_edit(&mut self, id: u64) -> Frame {
        self.view.begin_edit(self.store.state(), id);
        self.frame()
    }

    /// Commits `text` to the row being edited and leaves edit mode. Blank
    /// text keeps the old value.
    pub fn save_edit(&mut self, text: &str) -> Result<Frame, AppError> {
        let changed = match self.view.finish_edit() {
            Some(id) => self.store.edit_task(id, text)?,
            None => false,
        };
        Ok(self.frame_with(changed))
    }

    pub fn cancel_edit(&mut self) -> Frame {
        self.view.cancel_edit();
        self.frame()
    }

    /// Routes a key pressed inside the edit field; `draft` is the field's
    /// current content.
    pub fn edit_key(&mut self, key: EditKey, draft: &str) -> Result<Frame, AppError> {
        match EditIntent::from(key) {
            EditIntent::Save => self.save_edit(draft),
            EditIntent::Cancel => Ok(self.cancel_edit()),
        }
    }

    pub fn remove_history(&mut self, id: u64) -> Result<Frame, AppError> {
        let changed = self.store.remove_history_entry(id)?;
        Ok(self.frame_with(changed))
    }

    pub fn clear_history(&mut self) -> Result<Frame, AppError> {
        let removed = self.store.clear_history()?;
        Ok(self.frame_with(removed > 0))
    }

    pub fn toggle_history_panel(&mut self) -> Frame {
        self.view.toggle_history_panel();
        self.frame()
    }

    fn frame_with(&self, changed: bool) -> Frame {
        Frame {
            changed,
            tasks: render_tasks(self.store.state(), &self.view),
            history: render_history(self.store.state(), &self.view),
        }
    }
}
