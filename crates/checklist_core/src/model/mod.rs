mod history;
mod task;

pub use history::HistoryEntry;
pub use task::Task;
