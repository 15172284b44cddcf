//! Drop-zone controller orchestrator.
//!
//! One [`DropZone`] exists per mounted grid. It owns the in-zone preview
//! state and autoscroll loop, and reaches every other zone only through the
//! shared [`GridContext`](crate::context::GridContext).

mod core;

pub use self::core::{DragUpdate, DropZone, ItemPlacement, MoveOutcome, Placeholder};
