//! Per-item pointer adapter.
//!
//! Turns the `{delta}` stream of a pointer-gesture source into absolute
//! zone-local coordinates for one item and forwards them to its
//! [`DropZone`]. Each adapter holds its own immutable index; hosts build one
//! per rendered item and discard it on unmount.

use crate::context::ZoneChange;
use crate::error::Result;
use crate::geometry::Point;
use crate::registry::ZoneId;
use crate::zone::{DropZone, MoveOutcome};

/// Paint instructions for the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemStyle {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub opacity: f64,
    pub z_index: i32,
}

impl ItemStyle {
    pub fn resting(at: Point) -> Self {
        Self {
            x: at.x,
            y: at.y,
            scale: 1.0,
            opacity: 1.0,
            z_index: 0,
        }
    }

    pub fn lifted(at: Point) -> Self {
        Self {
            x: at.x,
            y: at.y,
            scale: 1.1,
            opacity: 0.8,
            z_index: 1,
        }
    }
}

/// Gesture state as reported by the pointer source: accumulated movement
/// since the gesture started.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureState {
    pub delta: [f64; 2],
}

impl GestureState {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { delta: [dx, dy] }
    }
}

#[derive(Debug)]
pub struct ItemDragAdapter {
    zone_id: ZoneId,
    index: usize,
    start: Point,
    dragging: bool,
    style: ItemStyle,
}

impl ItemDragAdapter {
    /// Mount item `index` inside `zone`.
    ///
    /// Fails if the zone is not registered or does not hold the item. An
    /// item that arrives through a committed traversal starts at the
    /// pointer position it was dropped at, consuming that hand-off.
    pub fn mount(zone: &DropZone, index: usize) -> Result<Self> {
        zone.ensure_item(index)?;
        let slot = zone.slot_position(index).unwrap_or_default();
        let style = match zone.context().consume_mount(zone.id(), index) {
            Some(point) => ItemStyle::lifted(point),
            None => ItemStyle::resting(slot),
        };
        Ok(Self {
            zone_id: zone.id().to_string(),
            index,
            start: slot,
            dragging: false,
            style,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn style(&self) -> ItemStyle {
        self.style
    }

    /// Settle onto the current slot unless a drag is in progress.
    pub fn sync(&mut self, zone: &DropZone) {
        if self.dragging {
            return;
        }
        if let Some(slot) = zone.slot_position(self.index) {
            self.style = ItemStyle::resting(slot);
        }
    }

    /// Whether this item claims the gesture. Claiming remeasures all zones
    /// and snapshots the slot the drag starts from.
    pub fn on_move_should_set(&mut self, zone: &mut DropZone) -> Result<bool> {
        if zone.config().disable_drag {
            return Ok(false);
        }
        zone.begin_drag(self.index)?;
        self.start = zone.slot_position(self.index).unwrap_or(self.start);
        self.dragging = true;
        Ok(true)
    }

    pub fn on_move(&mut self, zone: &mut DropZone, state: GestureState) -> Result<MoveOutcome> {
        let [dx, dy] = state.delta;
        let x = self.start.x + dx;
        let y = self.clamp_to_viewport(zone, self.start.y + dy);
        self.style = ItemStyle::lifted(Point::new(x, y));
        zone.drag_move(self.index, x, y, dx, dy)
    }

    /// Another responder wants the pointer; refuse while dragging.
    pub fn on_termination_request(&self) -> bool {
        !self.dragging
    }

    /// The gesture was taken away. Runs the same end path as a release.
    pub fn on_terminate(&mut self, zone: &mut DropZone, state: GestureState) -> Result<ZoneChange> {
        self.finish(zone, state)
    }

    pub fn on_release(&mut self, zone: &mut DropZone, state: GestureState) -> Result<ZoneChange> {
        self.finish(zone, state)
    }

    fn finish(&mut self, zone: &mut DropZone, state: GestureState) -> Result<ZoneChange> {
        let [dx, dy] = state.delta;
        let x = self.start.x + dx;
        let y = self.start.y + dy;
        self.dragging = false;
        let change = zone.drag_end(self.index, x, y, dx, dy);
        self.sync(zone);
        change
    }

    // Keep the item inside the visible band of its scroll surface.
    fn clamp_to_viewport(&self, zone: &DropZone, y: f64) -> f64 {
        let target = zone.scroll_target();
        let surface = target.surface();
        let top = surface.scroll_top();
        let bottom = top + surface.client_height() - zone.config().row_height;
        if y <= top {
            top
        } else if y >= bottom {
            bottom
        } else {
            y
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autoscroll::{ScrollSurface, ScrollViewport};
    use crate::config::{EngineConfig, ZoneConfig};
    use crate::context::GridContext;
    use crate::error::DragError;
    use crate::geometry::Rect;
    use crate::runtime::FrameClock;
    use std::sync::{Arc, Mutex};

    fn setup(changes: Arc<Mutex<Vec<ZoneChange>>>) -> Arc<GridContext> {
        let sink = move |change: &ZoneChange| changes.lock().unwrap().push(change.clone());
        Arc::new(GridContext::new(
            EngineConfig::default(),
            Arc::new(sink),
            Arc::new(FrameClock::new()),
            Arc::new(ScrollViewport::new(1000.0, 1000.0)),
        ))
    }

    fn zone(ctx: &Arc<GridContext>, id: &str, left: f64, count: usize) -> DropZone {
        let mut zone = DropZone::new(ZoneConfig::new(id, 3, 100.0), Arc::clone(ctx)).unwrap();
        zone.measure(Rect::new(left, 0.0, 300.0, 300.0));
        zone.set_item_count(count);
        zone
    }

    #[test]
    fn drag_reports_absolute_position() {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let ctx = setup(changes.clone());
        let mut grid = zone(&ctx, "a", 0.0, 6);
        let mut item = ItemDragAdapter::mount(&grid, 4).unwrap();
        assert_eq!(item.style(), ItemStyle::resting(Point::new(100.0, 100.0)));

        assert!(item.on_move_should_set(&mut grid).unwrap());
        assert!(!item.on_termination_request());
        item.on_move(&mut grid, GestureState::new(100.0, 0.0)).unwrap();
        assert_eq!(item.style(), ItemStyle::lifted(Point::new(200.0, 100.0)));

        let change = item.on_release(&mut grid, GestureState::new(100.0, 0.0)).unwrap();
        assert_eq!(change, ZoneChange::within("a", 4, 5));
        assert!(item.on_termination_request());
        assert_eq!(changes.lock().unwrap().len(), 1);
    }

    #[test]
    fn disabled_drag_refuses_gesture() {
        let ctx = setup(Arc::new(Mutex::new(Vec::new())));
        let mut grid = zone(&ctx, "a", 0.0, 3);
        grid.set_disable_drag(true);
        let mut item = ItemDragAdapter::mount(&grid, 0).unwrap();
        assert!(!item.on_move_should_set(&mut grid).unwrap());
        assert!(!item.is_dragging());
    }

    #[test]
    fn move_clamps_to_scroll_container() {
        let ctx = setup(Arc::new(Mutex::new(Vec::new())));
        let mut grid = zone(&ctx, "a", 0.0, 6);
        let container = Arc::new(ScrollViewport::new(250.0, 1000.0));
        container.set_scroll_top(50.0);
        grid.set_scroll_container(Some(container));

        let mut item = ItemDragAdapter::mount(&grid, 0).unwrap();
        item.on_move_should_set(&mut grid).unwrap();
        item.on_move(&mut grid, GestureState::new(0.0, -80.0)).unwrap();
        assert_eq!(item.style().y, 50.0);
        item.on_move(&mut grid, GestureState::new(0.0, 400.0)).unwrap();
        assert_eq!(item.style().y, 200.0);
        grid.abort_drag();
    }

    #[test]
    fn terminate_commits_like_release() {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let ctx = setup(changes.clone());
        let mut grid = zone(&ctx, "a", 0.0, 3);
        let mut item = ItemDragAdapter::mount(&grid, 1).unwrap();
        item.on_move_should_set(&mut grid).unwrap();
        item.on_move(&mut grid, GestureState::new(100.0, 0.0)).unwrap();
        assert!(grid.placeholder().is_some());

        item.on_terminate(&mut grid, GestureState::new(100.0, 0.0)).unwrap();
        assert!(grid.placeholder().is_none());
        assert!(grid.dragging_index().is_none());
        assert_eq!(changes.lock().unwrap().len(), 1);
    }

    #[test]
    fn traversed_item_mounts_at_drop_point_once() {
        let ctx = setup(Arc::new(Mutex::new(Vec::new())));
        let mut a = zone(&ctx, "a", 0.0, 4);
        let mut b = zone(&ctx, "b", 400.0, 2);

        let mut item = ItemDragAdapter::mount(&a, 0).unwrap();
        item.on_move_should_set(&mut a).unwrap();
        item.on_move(&mut a, GestureState::new(420.0, 20.0)).unwrap();
        let change = item.on_release(&mut a, GestureState::new(420.0, 20.0)).unwrap();
        assert_eq!(change.target_id.as_deref(), Some("b"));

        a.set_item_count(3);
        b.set_item_count(3);
        let arrived = ItemDragAdapter::mount(&b, 2).unwrap();
        assert_eq!(arrived.style(), ItemStyle::lifted(Point::new(20.0, 20.0)));
        let again = ItemDragAdapter::mount(&b, 2).unwrap();
        assert_eq!(again.style(), ItemStyle::resting(Point::new(200.0, 0.0)));
    }

    #[test]
    fn mounting_outside_registered_zone_fails() {
        let ctx = setup(Arc::new(Mutex::new(Vec::new())));
        let grid = zone(&ctx, "a", 0.0, 3);
        ctx.registry().remove("a");
        let err = ItemDragAdapter::mount(&grid, 0).unwrap_err();
        assert!(matches!(err, DragError::MissingZone(id) if id == "a"));
    }
}
