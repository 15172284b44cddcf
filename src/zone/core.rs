use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::autoscroll::{Autoscroll, FrameToken, ScrollDirection, ScrollSurface, ScrollTarget};
use crate::config::{ScrollOffsets, ZoneConfig};
use crate::context::{GridContext, ZoneChange};
use crate::error::{DragError, Result};
use crate::geometry::{GridSettings, Point, Rect, position_for_index, target_index_for_delta};
use crate::logging::{LogLevel, emit, json_kv};
use crate::order::{identity_order, preview_order};
use crate::registry::{Registration, Remeasure, ZoneId, ZoneRecord};
use crate::traversal::TraversalState;

/// In-zone preview swap while an item is held over another slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    pub start_index: usize,
    pub target_index: usize,
}

/// Where the host should draw item `index` on this render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPlacement {
    pub index: usize,
    pub position: Point,
    pub dragging: bool,
    /// Pointer position a traversed item should mount at instead of its slot.
    pub mount_from: Option<Point>,
}

/// Result of one pointer move inside a measured zone.
#[derive(Debug, Clone, PartialEq)]
pub struct DragUpdate {
    pub target_zone: ZoneId,
    pub target_index: usize,
    pub placeholder: Option<Placeholder>,
    pub scroll: ScrollDirection,
}

impl DragUpdate {
    pub fn is_traversing(&self, zone_id: &str) -> bool {
        self.target_zone != zone_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The zone has no column width yet; nothing was computed.
    Suppressed,
    Updated(DragUpdate),
}

/// Controller for one drop zone: publishes its geometry, computes live
/// preview order and traversal for the item being dragged, and drives the
/// zone's autoscroll loop.
pub struct DropZone {
    config: ZoneConfig,
    context: Arc<GridContext>,
    bounds: Rect,
    item_count: usize,
    remeasure: Option<Remeasure>,
    placeholder: Option<Placeholder>,
    dragging_index: Option<usize>,
    scroll_container: Option<Arc<dyn ScrollSurface>>,
    autoscroll: Autoscroll,
}

impl DropZone {
    /// Validate `config` and register the (still unmeasured) zone.
    pub fn new(config: ZoneConfig, context: Arc<GridContext>) -> Result<Self> {
        config.validate()?;
        let autoscroll = Autoscroll::new(context.frames(), context.config().scroll_steps)
            .with_logger(context.logger().cloned());
        let zone = Self {
            config,
            context,
            bounds: Rect::default(),
            item_count: 0,
            remeasure: None,
            placeholder: None,
            dragging_index: None,
            scroll_container: None,
            autoscroll,
        };
        zone.publish();
        Ok(zone)
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<GridContext> {
        &self.context
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn grid(&self) -> GridSettings {
        GridSettings::measured(
            self.bounds.width,
            self.config.boxes_per_row,
            self.config.row_height,
        )
    }

    pub fn placeholder(&self) -> Option<Placeholder> {
        self.placeholder
    }

    pub fn dragging_index(&self) -> Option<usize> {
        self.dragging_index
    }

    pub fn scroll_direction(&self) -> ScrollDirection {
        self.autoscroll.direction()
    }

    pub fn is_autoscrolling(&self) -> bool {
        self.autoscroll.is_running()
    }

    pub fn measure(&mut self, rect: Rect) -> Registration {
        self.bounds = rect;
        self.publish()
    }

    pub fn set_item_count(&mut self, count: usize) -> Registration {
        self.item_count = count;
        self.publish()
    }

    pub fn set_disable_drop(&mut self, disabled: bool) -> Registration {
        self.config.disable_drop = disabled;
        self.publish()
    }

    pub fn set_disable_drag(&mut self, disabled: bool) {
        self.config.disable_drag = disabled;
    }

    pub fn set_scroll_offsets(&mut self, offsets: ScrollOffsets) {
        self.config.scroll_offsets = offsets;
    }

    pub fn set_remeasure(&mut self, remeasure: Option<Remeasure>) -> Registration {
        self.remeasure = remeasure;
        self.publish()
    }

    /// Scroll ancestor discovered by the host, if any. Without one the
    /// document is scrolled.
    pub fn set_scroll_container(&mut self, container: Option<Arc<dyn ScrollSurface>>) {
        self.scroll_container = container;
    }

    pub fn scroll_target(&self) -> ScrollTarget {
        match self.scroll_container.as_ref() {
            Some(container) => ScrollTarget::Container(Arc::clone(container)),
            None => ScrollTarget::Document(self.context.document()),
        }
    }

    fn publish(&self) -> Registration {
        let record = ZoneRecord::new(self.bounds, self.grid(), self.item_count)
            .with_disable_drop(self.config.disable_drop)
            .with_remeasure(self.remeasure.clone());
        self.context.registry().register(self.config.id.clone(), record)
    }

    /// Current visual order, including the placeholder preview.
    pub fn current_order(&self) -> Vec<usize> {
        let order = identity_order(self.item_count);
        match self.placeholder {
            Some(p) => preview_order(&order, p.start_index, p.target_index),
            None => order,
        }
    }

    /// Placement of every item, or nothing while the zone is unmeasured.
    pub fn layout(&self) -> Vec<ItemPlacement> {
        let grid = self.grid();
        if !grid.is_measured() {
            return Vec::new();
        }
        let order = self.current_order();
        let gap = self.context.preview_index_for(self.id());
        (0..self.item_count)
            .map(|index| {
                let slot = order.iter().position(|&o| o == index).unwrap_or(index);
                ItemPlacement {
                    index,
                    position: position_for_index(slot, &grid, gap),
                    dragging: self.dragging_index == Some(index),
                    mount_from: self.context.pending_mount(self.id(), index),
                }
            })
            .collect()
    }

    /// Slot position of a single item, `None` while unmeasured.
    pub fn slot_position(&self, index: usize) -> Option<Point> {
        let grid = self.grid();
        if !grid.is_measured() {
            return None;
        }
        let slot = self
            .current_order()
            .iter()
            .position(|&o| o == index)
            .unwrap_or(index);
        Some(position_for_index(
            slot,
            &grid,
            self.context.preview_index_for(self.id()),
        ))
    }

    /// Item drawn under zone-local `(x, y)`, if any.
    pub fn item_at(&self, x: f64, y: f64) -> Option<usize> {
        let grid = self.grid();
        if !grid.is_measured() || x < 0.0 || y < 0.0 || !(grid.row_height > 0.0) {
            return None;
        }
        let col = (x / grid.column_width).floor() as usize;
        let row = (y / grid.row_height).floor() as usize;
        if col >= grid.boxes_per_row {
            return None;
        }
        let slot = row.checked_mul(grid.boxes_per_row)?.checked_add(col)?;
        self.current_order().get(slot).copied()
    }

    pub(crate) fn ensure_item(&self, index: usize) -> Result<()> {
        if !self.context.registry().contains(self.id()) {
            return Err(DragError::MissingZone(self.config.id.clone()));
        }
        if index >= self.item_count {
            return Err(DragError::ItemOutOfRange {
                zone: self.config.id.clone(),
                index,
                count: self.item_count,
            });
        }
        Ok(())
    }

    /// A drag of item `index` is about to start: refresh every zone's layout.
    pub fn begin_drag(&mut self, index: usize) -> Result<()> {
        self.ensure_item(index)?;
        self.context.measure_all();
        self.context.config().record(|m| m.record_drag_start());
        self.log(
            LogLevel::Debug,
            "drag_started",
            [json_kv("index", json!(index))],
        );
        Ok(())
    }

    /// Item `index` has its top-left at zone-local `(x, y)`, `(dx, dy)` from
    /// where the drag started.
    pub fn drag_move(&mut self, index: usize, x: f64, y: f64, dx: f64, dy: f64) -> Result<MoveOutcome> {
        self.ensure_item(index)?;
        let grid = self.grid();
        if !grid.is_measured() {
            self.context.config().record(|m| m.record_suppressed_move());
            self.log(LogLevel::Trace, "move_suppressed", std::iter::empty());
            return Ok(MoveOutcome::Suppressed);
        }
        self.context.config().record(|m| m.record_move());

        if self.dragging_index != Some(index) {
            self.dragging_index = Some(index);
        }

        let (target_zone, target_index) = self.resolve_target(&grid, index, x, y, dx, dy);
        self.update_placeholder(index, target_index);

        let scroll = self.resolve_scroll_direction(y);
        self.autoscroll.set_direction(scroll, self.scroll_target());

        Ok(MoveOutcome::Updated(DragUpdate {
            target_zone,
            target_index,
            placeholder: self.placeholder,
            scroll,
        }))
    }

    /// Finish the drag of item `index` at `(x, y)` and report the move.
    ///
    /// The change is committed exactly once, even when nothing moved, and
    /// the placeholder and dragging index are always cleared.
    pub fn drag_end(&mut self, index: usize, x: f64, y: f64, dx: f64, dy: f64) -> Result<ZoneChange> {
        if let Err(err) = self.ensure_item(index) {
            self.abort_drag();
            return Err(err);
        }
        self.autoscroll.stop();
        let grid = self.grid();

        let change = if !grid.is_measured() {
            self.release_own_traversal();
            ZoneChange::within(self.id(), index, index)
        } else {
            let (_, target_index) = self.resolve_target(&grid, index, x, y, dx, dy);
            match self.context.traversal() {
                TraversalState::Previewing(t) if t.source_id == self.config.id => {
                    ZoneChange::from(&t)
                }
                _ => ZoneChange::within(
                    self.id(),
                    index,
                    target_index.min(self.item_count.saturating_sub(1)),
                ),
            }
        };

        let change = self.context.commit(change);
        self.placeholder = None;
        self.dragging_index = None;
        Ok(change)
    }

    /// Drop all drag state without committing anything.
    pub fn abort_drag(&mut self) {
        self.autoscroll.stop();
        self.release_own_traversal();
        if self.placeholder.take().is_some() || self.dragging_index.take().is_some() {
            self.log(LogLevel::Debug, "drag_aborted", std::iter::empty());
        }
    }

    /// Advance this zone's autoscroll loop if `token` is its frame.
    pub fn on_frame(&mut self, token: FrameToken) -> bool {
        let ticked = self.autoscroll.on_frame(token);
        if ticked {
            self.context.config().record(|m| m.record_autoscroll_tick());
        }
        ticked
    }

    // Steps 1-2 of a move: hit-test the item's centre, then either start a
    // traversal (append in the foreign zone) or end one and compute the
    // in-zone target.
    fn resolve_target(
        &self,
        grid: &GridSettings,
        index: usize,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
    ) -> (ZoneId, usize) {
        let origin = self
            .context
            .registry()
            .get(self.id())
            .map_or(self.bounds, |record| record.rect);
        let target_zone = self.context.registry().active_drop_id(
            self.id(),
            origin.left + x + grid.column_width / 2.0,
            origin.top + y + grid.row_height / 2.0,
        );

        if target_zone != self.config.id {
            self.context
                .start_traverse(self.id(), &target_zone, x, y, index);
            (target_zone, self.item_count)
        } else {
            self.context.end_traverse();
            let target_index = target_index_for_delta(index, grid, self.item_count, dx, dy);
            (target_zone, target_index)
        }
    }

    fn update_placeholder(&mut self, index: usize, target_index: usize) {
        if target_index != index {
            let next = Placeholder {
                start_index: index,
                target_index,
            };
            if self.placeholder != Some(next) {
                self.placeholder = Some(next);
                self.context.config().record(|m| m.record_placeholder_update());
                self.log(
                    LogLevel::Trace,
                    "placeholder_set",
                    [json_kv("placeholder", json!(next))],
                );
            }
        } else if self.placeholder.take().is_some() {
            self.log(LogLevel::Trace, "placeholder_cleared", std::iter::empty());
        }
    }

    /// Autoscroll direction for an item whose top is at zone-local `y`.
    /// Leaving the zone vertically always disables autoscroll.
    pub fn resolve_scroll_direction(&self, y: f64) -> ScrollDirection {
        if y < 0.0 || y > self.bounds.height {
            return ScrollDirection::Idle;
        }
        let offsets = self.config.scroll_offsets;
        let top_edge = y + offsets.top;
        let bottom_edge = top_edge + self.config.row_height;

        let target = self.scroll_target();
        let surface = target.surface();
        let scroll_top = surface.scroll_top();
        if top_edge <= scroll_top {
            ScrollDirection::Up
        } else if bottom_edge >= scroll_top + surface.client_height() {
            ScrollDirection::Down
        } else {
            ScrollDirection::Idle
        }
    }

    fn release_own_traversal(&self) {
        if let TraversalState::Previewing(t) = self.context.traversal() {
            if t.source_id == self.config.id {
                self.context.end_traverse();
            }
        }
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        let zone = json_kv("zone", json!(self.config.id));
        emit(
            self.context.logger(),
            level,
            "dropgrid::zone",
            message,
            std::iter::once(zone).chain(fields),
        );
    }
}

impl fmt::Debug for DropZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropZone")
            .field("id", &self.config.id)
            .field("bounds", &self.bounds)
            .field("item_count", &self.item_count)
            .field("placeholder", &self.placeholder)
            .field("dragging_index", &self.dragging_index)
            .field("scroll", &self.autoscroll.direction())
            .finish()
    }
}

impl Drop for DropZone {
    fn drop(&mut self) {
        self.abort_drag();
        self.context.registry().remove(&self.config.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autoscroll::ScrollViewport;
    use crate::config::EngineConfig;
    use crate::runtime::FrameClock;
    use std::sync::Mutex;

    struct Harness {
        context: Arc<GridContext>,
        clock: Arc<FrameClock>,
        document: Arc<ScrollViewport>,
        changes: Arc<Mutex<Vec<ZoneChange>>>,
    }

    fn harness() -> Harness {
        let clock = Arc::new(FrameClock::new());
        let document = Arc::new(ScrollViewport::new(1000.0, 3000.0));
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let changes = Arc::clone(&changes);
            move |change: &ZoneChange| changes.lock().unwrap().push(change.clone())
        };
        let context = Arc::new(GridContext::new(
            EngineConfig::default(),
            Arc::new(sink),
            clock.clone(),
            document.clone(),
        ));
        Harness {
            context,
            clock,
            document,
            changes,
        }
    }

    fn zone(h: &Harness, id: &str, left: f64, count: usize) -> DropZone {
        let mut zone = DropZone::new(ZoneConfig::new(id, 3, 100.0), Arc::clone(&h.context)).unwrap();
        zone.measure(Rect::new(left, 0.0, 300.0, 200.0));
        zone.set_item_count(count);
        zone
    }

    fn updated(outcome: MoveOutcome) -> DragUpdate {
        match outcome {
            MoveOutcome::Updated(update) => update,
            MoveOutcome::Suppressed => panic!("move was suppressed"),
        }
    }

    #[test]
    fn in_zone_move_sets_placeholder_and_preview() {
        let h = harness();
        let mut grid = zone(&h, "a", 0.0, 6);
        grid.begin_drag(0).unwrap();

        let update = updated(grid.drag_move(0, 250.0, 0.0, 250.0, 0.0).unwrap());
        assert_eq!(update.target_zone, "a");
        assert_eq!(update.target_index, 2);
        assert_eq!(
            grid.placeholder(),
            Some(Placeholder {
                start_index: 0,
                target_index: 2
            })
        );
        assert_eq!(grid.current_order(), vec![2, 1, 0, 3, 4, 5]);
        assert_eq!(grid.dragging_index(), Some(0));

        let placements = grid.layout();
        assert_eq!(placements[0].position, Point::new(200.0, 0.0));
        assert_eq!(placements[2].position, Point::new(0.0, 0.0));
        assert!(placements[0].dragging);
    }

    #[test]
    fn returning_to_origin_clears_placeholder() {
        let h = harness();
        let mut grid = zone(&h, "a", 0.0, 6);
        grid.drag_move(1, 200.0, 0.0, 100.0, 0.0).unwrap();
        assert!(grid.placeholder().is_some());
        grid.drag_move(1, 100.0, 0.0, 0.0, 0.0).unwrap();
        assert!(grid.placeholder().is_none());
    }

    #[test]
    fn unmeasured_zone_suppresses_everything() {
        let h = harness();
        let mut grid = DropZone::new(ZoneConfig::new("a", 3, 100.0), Arc::clone(&h.context)).unwrap();
        grid.set_item_count(3);

        assert_eq!(grid.drag_move(0, 900.0, 5.0, 900.0, 5.0).unwrap(), MoveOutcome::Suppressed);
        assert!(grid.placeholder().is_none());
        assert!(grid.layout().is_empty());
        assert!(h.context.traversal().is_idle());
        assert!(!grid.is_autoscrolling());

        let change = grid.drag_end(0, 900.0, 5.0, 900.0, 5.0).unwrap();
        assert!(change.is_noop());
        assert_eq!(h.changes.lock().unwrap().len(), 1);
    }

    #[test]
    fn noop_drag_still_commits_once() {
        let h = harness();
        let mut grid = zone(&h, "a", 0.0, 6);
        grid.begin_drag(4).unwrap();
        grid.drag_move(4, 110.0, 100.0, 10.0, 0.0).unwrap();
        let change = grid.drag_end(4, 110.0, 100.0, 10.0, 0.0).unwrap();

        assert_eq!(change, ZoneChange::within("a", 4, 4));
        assert_eq!(h.changes.lock().unwrap().as_slice(), &[change]);
        assert!(grid.placeholder().is_none());
        assert!(grid.dragging_index().is_none());
    }

    #[test]
    fn crossing_into_foreign_zone_previews_append() {
        let h = harness();
        let mut a = zone(&h, "a", 0.0, 4);
        let b = zone(&h, "b", 400.0, 2);

        let update = updated(a.drag_move(3, 420.0, 10.0, 420.0, -90.0).unwrap());
        assert!(update.is_traversing("a"));
        assert_eq!(update.target_index, 4);

        let state = h.context.traversal();
        let traversal = state.traversal().unwrap();
        assert_eq!(traversal.target_id, "b");
        assert_eq!(traversal.target_index, 2);
        assert_eq!(b.context().preview_index_for("b"), Some(2));

        let change = a.drag_end(3, 420.0, 10.0, 420.0, -90.0).unwrap();
        assert_eq!(change.target_id.as_deref(), Some("b"));
        assert_eq!((change.from_index, change.to_index), (3, 2));
        assert_eq!(b.context().consume_mount("b", 2), Some(Point::new(20.0, 10.0)));
        assert!(h.context.traversal().is_idle());
    }

    #[test]
    fn releasing_back_home_ends_traversal() {
        let h = harness();
        let mut a = zone(&h, "a", 0.0, 4);
        let _b = zone(&h, "b", 400.0, 2);

        a.drag_move(0, 420.0, 10.0, 420.0, 10.0).unwrap();
        assert!(h.context.traversal().is_previewing());
        let change = a.drag_end(0, 10.0, 0.0, 10.0, 0.0).unwrap();
        assert_eq!(change, ZoneChange::within("a", 0, 0));
        assert!(h.context.traversal().is_idle());
    }

    #[test]
    fn removed_target_falls_back_to_origin() {
        let h = harness();
        let mut a = zone(&h, "a", 0.0, 4);
        let b = zone(&h, "b", 400.0, 2);
        a.drag_move(1, 420.0, 10.0, 320.0, 10.0).unwrap();
        drop(b);

        let change = a.drag_end(1, 420.0, 10.0, 320.0, 10.0).unwrap();
        assert!(change.target_id.is_none());
        assert_eq!(change.source_id, "a");
        assert!(h.context.traversal().is_idle());
    }

    #[test]
    fn disabled_drop_zone_is_ignored() {
        let h = harness();
        let mut a = zone(&h, "a", 0.0, 4);
        let mut b = zone(&h, "b", 400.0, 2);
        b.set_disable_drop(true);

        let update = updated(a.drag_move(0, 420.0, 10.0, 420.0, 10.0).unwrap());
        assert_eq!(update.target_zone, "a");
        assert!(h.context.traversal().is_idle());
    }

    #[test]
    fn scroll_direction_follows_viewport_edges() {
        let h = harness();
        let mut grid = zone(&h, "a", 0.0, 6);
        grid.measure(Rect::new(0.0, 0.0, 300.0, 2000.0));
        let container = Arc::new(ScrollViewport::new(400.0, 2000.0));
        container.set_scroll_top(200.0);
        grid.set_scroll_container(Some(container.clone()));

        assert_eq!(grid.resolve_scroll_direction(200.0), ScrollDirection::Up);
        assert_eq!(grid.resolve_scroll_direction(150.0), ScrollDirection::Up);
        assert_eq!(grid.resolve_scroll_direction(350.0), ScrollDirection::Idle);
        assert_eq!(grid.resolve_scroll_direction(500.0), ScrollDirection::Down);
        assert_eq!(grid.resolve_scroll_direction(-1.0), ScrollDirection::Idle);
        assert_eq!(grid.resolve_scroll_direction(2001.0), ScrollDirection::Idle);

        grid.set_scroll_offsets(ScrollOffsets {
            top: 0.0,
            bottom: 60.0,
        });
        assert_eq!(grid.resolve_scroll_direction(450.0), ScrollDirection::Idle);
        assert_eq!(grid.resolve_scroll_direction(500.0), ScrollDirection::Down);

        grid.set_scroll_offsets(ScrollOffsets {
            top: 60.0,
            bottom: 0.0,
        });
        assert_eq!(grid.resolve_scroll_direction(450.0), ScrollDirection::Down);
        assert_eq!(grid.resolve_scroll_direction(140.0), ScrollDirection::Up);
    }

    #[test]
    fn autoscroll_runs_until_drag_ends() {
        let h = harness();
        let mut grid = zone(&h, "a", 0.0, 6);
        grid.measure(Rect::new(0.0, 0.0, 300.0, 2000.0));

        grid.drag_move(3, 0.0, 950.0, 0.0, 850.0).unwrap();
        assert_eq!(grid.scroll_direction(), ScrollDirection::Down);
        for _ in 0..2 {
            for token in h.clock.advance() {
                assert!(grid.on_frame(token));
            }
        }
        assert_eq!(h.document.scroll_top(), 12.0);

        grid.drag_end(3, 0.0, 950.0, 0.0, 850.0).unwrap();
        assert!(!grid.is_autoscrolling());
        assert_eq!(h.clock.pending(), 0);
    }

    #[test]
    fn item_outside_zone_is_an_error() {
        let h = harness();
        let mut grid = zone(&h, "a", 0.0, 2);
        let err = grid.begin_drag(5).unwrap_err();
        assert!(matches!(err, DragError::ItemOutOfRange { index: 5, count: 2, .. }));
    }

    #[test]
    fn item_at_follows_preview_order() {
        let h = harness();
        let mut grid = zone(&h, "a", 0.0, 5);
        assert_eq!(grid.item_at(150.0, 150.0), Some(4));
        assert_eq!(grid.item_at(250.0, 150.0), None);
        grid.drag_move(0, 200.0, 0.0, 200.0, 0.0).unwrap();
        assert_eq!(grid.item_at(10.0, 10.0), Some(2));
        grid.abort_drag();
        assert_eq!(grid.item_at(10.0, 10.0), Some(0));
    }

    #[test]
    fn placeholder_only_rewritten_on_change() {
        let mut h = harness();
        let mut config = EngineConfig::default();
        config.enable_metrics();
        h.context = Arc::new(GridContext::new(
            config,
            Arc::new(|_: &ZoneChange| {}),
            h.clock.clone(),
            h.document.clone(),
        ));
        let mut grid = zone(&h, "a", 0.0, 6);
        let updates = |h: &Harness| {
            h.context
                .metrics_snapshot(std::time::Duration::ZERO)
                .unwrap()
                .placeholder_updates
        };

        grid.drag_move(0, 200.0, 0.0, 200.0, 0.0).unwrap();
        grid.drag_move(0, 210.0, 0.0, 210.0, 0.0).unwrap();
        assert_eq!(updates(&h), 1);

        grid.drag_move(0, 100.0, 100.0, 100.0, 100.0).unwrap();
        assert_eq!(
            grid.placeholder(),
            Some(Placeholder {
                start_index: 0,
                target_index: 4
            })
        );
        assert_eq!(updates(&h), 2);

        grid.drag_move(0, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert!(grid.placeholder().is_none());
        assert_eq!(updates(&h), 2);
        grid.abort_drag();
    }

    #[test]
    fn item_at_far_outside_grid_is_none() {
        let h = harness();
        let grid = zone(&h, "a", 0.0, 6);
        assert_eq!(grid.item_at(10.0, 1e30), None);
        assert_eq!(grid.item_at(10.0, f64::MAX), None);
    }

    #[test]
    fn debug_names_zone() {
        let h = harness();
        let grid = zone(&h, "a", 0.0, 2);
        let rendered = format!("{grid:?}");
        assert!(rendered.contains("\"a\""));
        assert!(rendered.contains("item_count: 2"));
    }

    #[test]
    fn drop_unregisters_zone() {
        let h = harness();
        let grid = zone(&h, "a", 0.0, 2);
        assert!(h.context.registry().contains("a"));
        drop(grid);
        assert!(!h.context.registry().contains("a"));
    }
}
