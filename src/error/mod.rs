//! Error module orchestrator.

mod types;

pub use types::{DragError, Result};
