use thiserror::Error;

use crate::logging::LoggingError;

/// Unified result type for the drag engine.
pub type Result<T> = std::result::Result<T, DragError>;

/// Errors surfaced by the drag engine.
///
/// Unmeasured zones, hit-test misses and stale registry entries are not
/// represented here: they degrade to no-ops.
#[derive(Debug, Error)]
pub enum DragError {
    #[error("zone `{0}` is not registered; items must be mounted inside a drop zone")]
    MissingZone(String),
    #[error("item {index} is outside zone `{zone}` ({count} items)")]
    ItemOutOfRange {
        zone: String,
        index: usize,
        count: usize,
    },
    #[error("zone `{0}` is already owned by this runtime")]
    DuplicateZone(String),
    #[error("zone `{0}` has an invalid grid: boxes_per_row must be >= 1 and row_height >= 0")]
    InvalidGrid(String),
    #[error("invalid zone configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("logging failure: {0}")]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
