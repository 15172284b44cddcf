//! Coordination object shared by every zone of one grid tree.
//!
//! Owns the drop-zone registry, the traversal state machine, the commit sink
//! and the host's frame scheduler. Zones hold it behind an `Arc` and may
//! read everything, but write only their own registry entry and, while they
//! own the active drag, the traversal.

use std::sync::{Arc, PoisonError};

use serde::Serialize;
use serde_json::json;

use crate::autoscroll::{FrameScheduler, ScrollSurface};
use crate::config::EngineConfig;
use crate::geometry::Point;
use crate::logging::{LogLevel, Logger, emit, json_kv};
use crate::metrics::MetricSnapshot;
use crate::registry::{DropZoneRegistry, ZoneId};
use crate::traversal::{Traversal, TraversalCoordinator, TraversalState};

/// Authoritative reorder instruction emitted once per completed drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneChange {
    pub source_id: ZoneId,
    pub from_index: usize,
    pub to_index: usize,
    /// Set when the item moves into another zone.
    pub target_id: Option<ZoneId>,
}

impl ZoneChange {
    pub fn within(zone_id: impl Into<ZoneId>, from_index: usize, to_index: usize) -> Self {
        Self {
            source_id: zone_id.into(),
            from_index,
            to_index,
            target_id: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.target_id.is_none() && self.from_index == self.to_index
    }
}

impl From<&Traversal> for ZoneChange {
    fn from(t: &Traversal) -> Self {
        Self {
            source_id: t.source_id.clone(),
            from_index: t.source_index,
            to_index: t.target_index,
            target_id: Some(t.target_id.clone()),
        }
    }
}

/// Receives committed moves. The engine never reorders anything itself.
pub trait CommitSink: Send + Sync {
    fn on_change(&self, change: &ZoneChange);
}

impl<F> CommitSink for F
where
    F: Fn(&ZoneChange) + Send + Sync,
{
    fn on_change(&self, change: &ZoneChange) {
        self(change)
    }
}

pub struct GridContext {
    registry: DropZoneRegistry,
    traversal: TraversalCoordinator,
    sink: Arc<dyn CommitSink>,
    frames: Arc<dyn FrameScheduler>,
    document: Arc<dyn ScrollSurface>,
    config: EngineConfig,
}

impl GridContext {
    pub fn new(
        config: EngineConfig,
        sink: Arc<dyn CommitSink>,
        frames: Arc<dyn FrameScheduler>,
        document: Arc<dyn ScrollSurface>,
    ) -> Self {
        Self {
            registry: DropZoneRegistry::new(),
            traversal: TraversalCoordinator::new(),
            sink,
            frames,
            document,
            config,
        }
    }

    pub fn registry(&self) -> &DropZoneRegistry {
        &self.registry
    }

    pub fn traversal(&self) -> TraversalState {
        self.traversal.state()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn logger(&self) -> Option<&Logger> {
        self.config.logger.as_ref()
    }

    pub fn frames(&self) -> Arc<dyn FrameScheduler> {
        Arc::clone(&self.frames)
    }

    pub fn document(&self) -> Arc<dyn ScrollSurface> {
        Arc::clone(&self.document)
    }

    /// Remeasure every zone before a drag so scrolling or resizing since the
    /// last layout cannot skew target computation.
    pub fn measure_all(&self) -> usize {
        let count = self.registry.measure_all();
        self.log(
            LogLevel::Trace,
            "measure_all",
            [json_kv("zones", json!(count))],
        );
        count
    }

    /// Record that the item at `source_index` of `source_id` hovers
    /// `target_id` with its top-left at zone-local `(x, y)` of the source.
    ///
    /// The target index is the target's item count (append). Returns `false`
    /// and clears any preview when either zone is unregistered.
    pub fn start_traverse(
        &self,
        source_id: &str,
        target_id: &str,
        x: f64,
        y: f64,
        source_index: usize,
    ) -> bool {
        let (Some(source), Some(target)) = (self.registry.get(source_id), self.registry.get(target_id))
        else {
            self.log(
                LogLevel::Debug,
                "traverse_unresolved",
                [
                    json_kv("source", json!(source_id)),
                    json_kv("target", json!(target_id)),
                ],
            );
            self.end_traverse();
            return false;
        };

        let traversal = Traversal {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            source_index,
            target_index: target.item_count,
            tx: x + source.rect.left - target.rect.left,
            ty: y + source.rect.top - target.rect.top,
            execute: false,
        };

        let previous_target = self
            .traversal
            .state()
            .traversal()
            .map(|t| t.target_id.clone());
        let changed = self.traversal.start(traversal);
        if previous_target.as_deref() != Some(target_id) {
            self.config.record(|m| m.record_traversal_start());
            self.log(
                LogLevel::Debug,
                "traverse_started",
                [
                    json_kv("source", json!(source_id)),
                    json_kv("target", json!(target_id)),
                    json_kv("source_index", json!(source_index)),
                    json_kv("target_index", json!(target.item_count)),
                ],
            );
        }
        changed
    }

    /// Drop any traversal, preview or pending mount alike.
    pub fn end_traverse(&self) -> Option<Traversal> {
        let ended = self.traversal.end();
        if let Some(t) = ended.as_ref() {
            self.log(
                LogLevel::Debug,
                "traverse_ended",
                [
                    json_kv("source", json!(t.source_id)),
                    json_kv("target", json!(t.target_id)),
                    json_kv("execute", json!(t.execute)),
                ],
            );
        }
        ended
    }

    /// Live preview target index for `zone_id`, used to open a gap.
    pub fn preview_index_for(&self, zone_id: &str) -> Option<usize> {
        self.traversal.preview_index_for(zone_id)
    }

    /// Mount coordinates for a freshly rendered item, consumed exactly once.
    pub fn consume_mount(&self, zone_id: &str, index: usize) -> Option<Point> {
        let point = self.traversal.consume_mount(zone_id, index);
        if point.is_some() {
            self.log(
                LogLevel::Debug,
                "traverse_consumed",
                [
                    json_kv("zone", json!(zone_id)),
                    json_kv("index", json!(index)),
                ],
            );
        }
        point
    }

    pub fn pending_mount(&self, zone_id: &str, index: usize) -> Option<Point> {
        self.traversal.pending_mount(zone_id, index)
    }

    /// Report a finished drag. A previewing traversal is promoted to
    /// `Committing` first so the destination can pick up its mount point
    /// while the caller applies the change.
    pub fn commit(&self, change: ZoneChange) -> ZoneChange {
        if change.target_id.is_some() {
            self.traversal.commit();
        }
        self.config.record(|m| m.record_commit());
        self.log(
            LogLevel::Info,
            "drag_committed",
            [json_kv("change", json!(change))],
        );
        self.sink.on_change(&change);
        change
    }

    pub fn metrics_snapshot(&self, uptime: std::time::Duration) -> Option<MetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let guard = metrics.lock().unwrap_or_else(PoisonError::into_inner);
        Some(guard.snapshot(uptime))
    }

    pub(crate) fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        emit(self.logger(), level, "dropgrid::context", message, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autoscroll::ScrollViewport;
    use crate::geometry::{GridSettings, Rect};
    use crate::registry::ZoneRecord;
    use crate::runtime::FrameClock;
    use std::sync::Mutex;

    fn context() -> (GridContext, Arc<Mutex<Vec<ZoneChange>>>) {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let changes = Arc::clone(&changes);
            move |change: &ZoneChange| changes.lock().unwrap().push(change.clone())
        };
        let ctx = GridContext::new(
            EngineConfig::default(),
            Arc::new(sink),
            Arc::new(FrameClock::new()),
            Arc::new(ScrollViewport::new(800.0, 800.0)),
        );
        let grid = GridSettings::measured(400.0, 4, 100.0);
        ctx.registry()
            .register("a", ZoneRecord::new(Rect::new(0.0, 0.0, 400.0, 100.0), grid, 4));
        ctx.registry()
            .register("b", ZoneRecord::new(Rect::new(500.0, 20.0, 400.0, 100.0), grid, 2));
        (ctx, changes)
    }

    #[test]
    fn traverse_translates_into_target_space() {
        let (ctx, _) = context();
        assert!(ctx.start_traverse("a", "b", 520.0, 10.0, 3));
        let state = ctx.traversal();
        let t = state.traversal().unwrap();
        assert_eq!(t.target_index, 2);
        assert_eq!((t.tx, t.ty), (20.0, -10.0));
    }

    #[test]
    fn traverse_to_unknown_zone_clears_preview() {
        let (ctx, _) = context();
        ctx.start_traverse("a", "b", 520.0, 10.0, 3);
        assert!(!ctx.start_traverse("a", "gone", 0.0, 0.0, 3));
        assert!(ctx.traversal().is_idle());
    }

    #[test]
    fn cross_zone_commit_hands_off_mount_point() {
        let (ctx, changes) = context();
        ctx.start_traverse("a", "b", 520.0, 10.0, 3);
        let change = ZoneChange::from(ctx.traversal().traversal().unwrap());
        ctx.commit(change);

        assert_eq!(
            changes.lock().unwrap().as_slice(),
            &[ZoneChange {
                source_id: "a".to_string(),
                from_index: 3,
                to_index: 2,
                target_id: Some("b".to_string()),
            }]
        );
        assert!(matches!(ctx.traversal(), TraversalState::Committing(_)));
        assert_eq!(ctx.consume_mount("b", 2), Some(Point::new(20.0, -10.0)));
        assert!(ctx.traversal().is_idle());
    }

    #[test]
    fn closure_sinks_receive_noop_commits() {
        let (ctx, changes) = context();
        let change = ctx.commit(ZoneChange::within("a", 1, 1));
        assert!(change.is_noop());
        assert_eq!(changes.lock().unwrap().len(), 1);
    }
}
