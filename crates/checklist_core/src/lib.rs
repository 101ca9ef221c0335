pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod theme;
pub mod view;
