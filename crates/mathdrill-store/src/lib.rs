//! mathdrill-store — File-backed persistence for mathdrill.
//!
//! Provides a JSON [`HistoryStore`](mathdrill_core::history::HistoryStore)
//! implementation, TOML settings for the last-used quiz configuration, and
//! resolution of the data directory both live in.

pub mod json;
pub mod paths;
pub mod settings;

pub use json::JsonHistoryStore;
pub use paths::{resolve_data_dir, DataDir};
pub use settings::{load_settings, save_settings};
