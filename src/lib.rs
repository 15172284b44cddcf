//! Drag coordination for grid drop zones.
//!
//! Items laid out in fixed-column grids can be dragged to reorder within a
//! zone or moved between zones. While an item is held the engine computes
//! a live preview order, hands the item across zone boundaries through a
//! single shared traversal record, and scrolls the nearest scroll surface
//! when the item touches its edges. Each drag reports exactly one
//! [`ZoneChange`] when it ends.
//!
//! Zones share an [`Arc<GridContext>`](GridContext); [`DropZone`] is the
//! per-zone controller and [`ItemDragAdapter`] turns pointer deltas into
//! zone-local coordinates. [`DragRuntime`] wires all of it to an ordered
//! event stream or a crossterm terminal.

pub mod autoscroll;
pub mod config;
pub mod context;
pub mod error;
pub mod geometry;
pub mod item;
pub mod logging;
pub mod metrics;
pub mod order;
pub mod registry;
pub mod runtime;
pub mod traversal;
pub mod zone;

pub use autoscroll::{
    Autoscroll, FrameScheduler, FrameToken, ScrollDirection, ScrollSurface, ScrollTarget,
    ScrollViewport,
};
pub use config::{EngineConfig, ScrollOffsets, ScrollSteps, ZoneConfig};
pub use context::{CommitSink, GridContext, ZoneChange};
pub use error::{DragError, Result};
pub use geometry::{
    GridSettings, Point, Rect, index_for_point, position_for_index, target_index_for_delta,
};
pub use item::{GestureState, ItemDragAdapter, ItemStyle};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{DragMetrics, MetricSnapshot};
pub use order::{identity_order, preview_order};
pub use registry::{DropZoneRegistry, Registration, Remeasure, ZoneId, ZoneRecord};
pub use runtime::{DragRuntime, FrameClock, PointerEvent, PointerTracker, RuntimeEvent};
pub use traversal::{Traversal, TraversalCoordinator, TraversalState};
pub use zone::{DragUpdate, DropZone, ItemPlacement, MoveOutcome, Placeholder};
