pub mod api;
pub mod config;
pub mod error;
pub mod estimation;
pub mod lifecycle;
pub mod queue;
pub mod state;
pub mod stats;
pub mod store;
