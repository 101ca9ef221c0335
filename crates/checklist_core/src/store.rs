use crate::error::AppError;
use crate::model::{HistoryEntry, Task};
use crate::state::TaskState;
use crate::storage::{Backend, codec};
use time::OffsetDateTime;
use tracing::{debug, info};

/// Owns the task state and writes it back to its backend after every change.
///
/// Operations return `Ok(true)` when state changed and was saved and
/// `Ok(false)` when the call was a no-op (blank text, unknown id).
#[derive(Debug)]
pub struct Store<B: Backend> {
    backend: B,
    state: TaskState,
    load_error: Option<AppError>,
}

impl<B: Backend> Store<B> {
    /// Loads state from `backend`, falling back to empty state when the
    /// persisted records are unreadable.
    pub fn open(backend: B) -> Result<Self, AppError> {
        let loaded = codec::load_state(&backend)?;
        Ok(Self {
            backend,
            state: loaded.state,
            load_error: loaded.error,
        })
    }

    /// Re-reads state from the backend, discarding in-memory state.
    pub fn load(&mut self) -> Result<(), AppError> {
        let loaded = codec::load_state(&self.backend)?;
        self.state = loaded.state;
        self.load_error = loaded.error;
        Ok(())
    }

    pub fn save(&mut self) -> Result<(), AppError> {
        codec::save_state(&mut self.backend, &self.state)
    }

    /// Error that forced the last load back to defaults, if any.
    pub fn load_error(&self) -> Option<&AppError> {
        self.load_error.as_ref()
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.state.task(id)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Returns the id of the new task, or `None` when `text` is blank.
    pub fn add_task(&mut self, text: &str) -> Result<Option<u64>, AppError> {
        let Some(id) = self.state.add_task(text) else {
            debug!("ignored blank task text");
            return Ok(None);
        };
        self.save()?;
        info!(id, "task added");
        Ok(Some(id))
    }

    pub fn toggle_task(&mut self, id: u64) -> Result<bool, AppError> {
        self.toggle_task_at(id, OffsetDateTime::now_utc())
    }

    pub fn toggle_task_at(&mut self, id: u64, now: OffsetDateTime) -> Result<bool, AppError> {
        if !self.state.toggle_task(id, now) {
            debug!(id, "toggle ignored, task not found");
            return Ok(false);
        }
        self.save()?;
        let done = self.state.task(id).is_some_and(|task| task.done);
        info!(id, done, "task toggled");
        Ok(true)
    }

    pub fn edit_task(&mut self, id: u64, new_text: &str) -> Result<bool, AppError> {
        if !self.state.edit_task(id, new_text) {
            debug!(id, "edit ignored");
            return Ok(false);
        }
        self.save()?;
        info!(id, "task edited");
        Ok(true)
    }

    pub fn remove_task(&mut self, id: u64) -> Result<bool, AppError> {
        if !self.state.remove_task(id) {
            debug!(id, "remove ignored, task not found");
            return Ok(false);
        }
        self.save()?;
        info!(id, "task removed");
        Ok(true)
    }

    /// Returns the number of completed tasks removed.
    pub fn clear_completed(&mut self) -> Result<usize, AppError> {
        let removed = self.state.clear_completed();
        if removed == 0 {
            debug!("clear completed ignored, nothing done");
            return Ok(0);
        }
        self.save()?;
        info!(removed, "cleared completed tasks");
        Ok(removed)
    }

    pub fn remove_history_entry(&mut self, id: u64) -> Result<bool, AppError> {
        if !self.state.remove_history_entry(id) {
            debug!(id, "history removal ignored, entry not found");
            return Ok(false);
        }
        self.save()?;
        info!(id, "history entry removed");
        Ok(true)
    }

    pub fn clear_history(&mut self) -> Result<usize, AppError> {
        let removed = self.state.clear_history();
        if removed == 0 {
            debug!("clear history ignored, history empty");
            return Ok(0);
        }
        self.save()?;
        info!(removed, "cleared history");
        Ok(removed)
    }
}
