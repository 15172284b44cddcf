use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use serde::Serialize;

use crate::geometry::Point;
use crate::registry::ZoneId;

/// An item picked up in `source_id` that currently hovers `target_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Traversal {
    pub source_id: ZoneId,
    pub target_id: ZoneId,
    pub source_index: usize,
    pub target_index: usize,
    /// Pointer position translated into the target zone's space.
    pub tx: f64,
    pub ty: f64,
    pub execute: bool,
}

impl Traversal {
    pub fn mount_point(&self) -> Point {
        Point::new(self.tx, self.ty)
    }
}

/// Cross-zone drag state. At most one traversal exists per coordination tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TraversalState {
    #[default]
    Idle,
    /// Hovering a foreign zone; nothing committed.
    Previewing(Traversal),
    /// The drag ended over the target. The destination reads the mount
    /// coordinates once, then the machine returns to `Idle`.
    Committing(Traversal),
}

impl TraversalState {
    pub fn traversal(&self) -> Option<&Traversal> {
        match self {
            Self::Idle => None,
            Self::Previewing(t) | Self::Committing(t) => Some(t),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_previewing(&self) -> bool {
        matches!(self, Self::Previewing(_))
    }
}

/// Owner of the single [`TraversalState`]. Writes are last-writer-wins.
#[derive(Default)]
pub struct TraversalCoordinator {
    inner: RwLock<TraversalState>,
}

impl TraversalCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> RwLockWriteGuard<'_, TraversalState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> TraversalState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Enter or refresh `Previewing`, discarding whatever was there before.
    /// Returns `true` when the stored traversal changed.
    pub fn start(&self, mut traversal: Traversal) -> bool {
        traversal.execute = false;
        let mut guard = self.write();
        let next = TraversalState::Previewing(traversal);
        if *guard == next {
            return false;
        }
        *guard = next;
        true
    }

    /// Return to `Idle` from any state, handing back what was discarded.
    pub fn end(&self) -> Option<Traversal> {
        match std::mem::take(&mut *self.write()) {
            TraversalState::Idle => None,
            TraversalState::Previewing(t) | TraversalState::Committing(t) => Some(t),
        }
    }

    /// Promote a preview to `Committing` and return it.
    pub fn commit(&self) -> Option<Traversal> {
        let mut guard = self.write();
        match std::mem::take(&mut *guard) {
            TraversalState::Previewing(mut t) => {
                t.execute = true;
                *guard = TraversalState::Committing(t.clone());
                Some(t)
            }
            other => {
                *guard = other;
                None
            }
        }
    }

    /// Hand the committed mount position to the item now rendered at
    /// `index` of `zone_id`, exactly once.
    pub fn consume_mount(&self, zone_id: &str, index: usize) -> Option<Point> {
        let mut guard = self.write();
        let point = match &*guard {
            TraversalState::Committing(t) if t.target_id == zone_id && t.target_index == index => {
                Some(t.mount_point())
            }
            _ => None,
        };
        if point.is_some() {
            *guard = TraversalState::Idle;
        }
        point
    }

    /// Target index of a preview aimed at `zone_id`.
    pub fn preview_index_for(&self, zone_id: &str) -> Option<usize> {
        match &*self.inner.read().unwrap_or_else(PoisonError::into_inner) {
            TraversalState::Previewing(t) if t.target_id == zone_id => Some(t.target_index),
            _ => None,
        }
    }

    /// Mount coordinates waiting for `zone_id` at `index`, without consuming.
    pub fn pending_mount(&self, zone_id: &str, index: usize) -> Option<Point> {
        match &*self.inner.read().unwrap_or_else(PoisonError::into_inner) {
            TraversalState::Committing(t) if t.target_id == zone_id && t.target_index == index => {
                Some(t.mount_point())
            }
            _ => None,
        }
    }
}
