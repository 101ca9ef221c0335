use crate::error::AppError;
use crate::model::{HistoryEntry, Task};
use crate::state::TaskState;
use crate::storage::backend::Backend;
use std::collections::HashSet;
use tracing::{debug, warn};

pub const TASKS_KEY: &str = "tasks";
pub const HISTORY_KEY: &str = "history";
pub const NEXT_ID_KEY: &str = "nextId";

#[derive(Debug, Clone)]
pub struct StateLoad {
    pub state: TaskState,
    /// Set when persisted data was unreadable and `state` fell back to
    /// defaults.
    pub error: Option<AppError>,
}

/// Reads tasks, history and the id counter from `backend`.
///
/// Missing keys read as their defaults. A task list or history that fails to
/// decode resets all three records, not just the broken one. A malformed
/// counter only falls back to 1 and is then raised past the stored ids. A
/// document the backend itself had to discard on open is reported through
/// `error` as well. Backend failures are returned as errors.
pub fn load_state<B: Backend + ?Sized>(backend: &B) -> Result<StateLoad, AppError> {
    let tasks = backend.get(TASKS_KEY)?;
    let history = backend.get(HISTORY_KEY)?;
    let next_id = backend.get(NEXT_ID_KEY)?;

    match decode_state(tasks.as_deref(), history.as_deref(), next_id.as_deref()) {
        Ok(state) => {
            debug!(
                tasks = state.tasks.len(),
                history = state.history.len(),
                next_id = state.next_id,
                "loaded state"
            );
            Ok(StateLoad {
                state,
                error: backend.open_error().cloned(),
            })
        }
        Err(err) => {
            warn!(error = %err, "persisted state unreadable, starting empty");
            Ok(StateLoad {
                state: TaskState::default(),
                error: Some(err),
            })
        }
    }
}

pub fn save_state<B: Backend + ?Sized>(backend: &mut B, state: &TaskState) -> Result<(), AppError> {
    let entries = [
        (TASKS_KEY, serde_json::to_string(&state.tasks)?),
        (HISTORY_KEY, serde_json::to_string(&state.history)?),
        (NEXT_ID_KEY, state.next_id.to_string()),
    ];
    backend.set_many(&entries)?;
    debug!(
        tasks = state.tasks.len(),
        history = state.history.len(),
        next_id = state.next_id,
        "saved state"
    );
    Ok(())
}

fn decode_state(
    tasks: Option<&str>,
    history: Option<&str>,
    next_id: Option<&str>,
) -> Result<TaskState, AppError> {
    let mut tasks: Vec<Task> = decode_list(TASKS_KEY, tasks)?;
    let history: Vec<HistoryEntry> = decode_list(HISTORY_KEY, history)?;

    // A counter that lags behind the stored ids would hand out an id twice.
    let floor = tasks
        .iter()
        .map(|task| task.id.saturating_add(1))
        .max()
        .unwrap_or(1);
    let mut next_id = decode_next_id(next_id).max(floor);

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &mut tasks {
        if seen.insert(task.id) {
            continue;
        }
        let Some(after) = next_id.checked_add(1) else {
            break;
        };
        warn!(from = task.id, to = next_id, "reassigned duplicate task id");
        task.id = next_id;
        seen.insert(next_id);
        next_id = after;
    }

    Ok(TaskState {
        tasks,
        history,
        next_id,
    })
}

fn decode_list<T: serde::de::DeserializeOwned>(
    key: &str,
    raw: Option<&str>,
) -> Result<Vec<T>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let parsed: Option<Vec<T>> = serde_json::from_str(raw)
        .map_err(|err| AppError::invalid_data(format!("{key}: {err}")))?;
    Ok(parsed.unwrap_or_default())
}

/// Parses the stored counter. Anything that is not an integer in
/// `1..u64::MAX` reads as 1.
fn decode_next_id(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 1;
    };

    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 && value < u64::MAX => value,
        _ => {
            warn!(value = raw, "id counter malformed, restarting at 1");
            1
        }
    }
}
