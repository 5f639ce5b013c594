//! State management module
//!
//! Tracks the per-shop watermark between runs so each sync only extracts
//! rows newer than the last checkpoint.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - Singer-compatible state document with a `bookmarks` map
//! - `StateManager` - Shared handle with optional file persistence

mod manager;
mod types;

pub use manager::StateManager;
pub use types::State;
