// Public API for integration tests and potential library usage

pub mod api;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod protocol;
pub mod state;
pub mod ticker;
pub mod types;
