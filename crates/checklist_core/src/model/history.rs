use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Snapshot of a task's text taken when it was marked complete.
///
/// Entries are independent of the task they came from: editing, reopening
/// or deleting the task leaves the entry untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

impl HistoryEntry {
    /// Builds an entry whose id is derived from `completed_at` and kept
    /// above every id in `existing`.
    pub fn record(text: &str, completed_at: OffsetDateTime, existing: &[HistoryEntry]) -> Self {
        let stamp = u64::try_from(completed_at.unix_timestamp_nanos() / 1_000).unwrap_or(0);
        let floor = existing
            .iter()
            .map(|entry| entry.id)
            .max()
            .map_or(0, |max| max.saturating_add(1));

        Self {
            id: stamp.max(floor),
            text: text.to_string(),
            completed_at,
        }
    }
}
