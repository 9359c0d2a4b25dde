//! Shared core types for veyra.
//!
//! Provides strongly typed identifiers used across the workspace.

mod ids;

pub use ids::{AccountId, ParseIdError};
