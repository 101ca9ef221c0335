pub mod backend;
pub mod codec;
pub mod json_store;

pub use backend::{Backend, MemoryBackend};
pub use codec::{StateLoad, load_state, save_state};
pub use json_store::JsonFileBackend;
