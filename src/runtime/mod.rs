//! Event-driven host for a set of drop zones.
//!
//! [`DragRuntime`] owns the shared [`GridContext`], every [`DropZone`] of one
//! coordination tree and the frame clock driving autoscroll. Hosts feed it a
//! single ordered stream of [`RuntimeEvent`]s (or raw crossterm mouse events)
//! and receive the committed [`ZoneChange`]s back.

pub mod frame;
pub mod pointer;

pub use frame::FrameClock;
pub use pointer::{PointerEvent, PointerTracker};

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, MouseEvent};
use serde_json::json;

use crate::autoscroll::ScrollSurface;
use crate::config::{EngineConfig, ZoneConfig};
use crate::context::{CommitSink, GridContext, ZoneChange};
use crate::error::{DragError, Result};
use crate::geometry::Rect;
use crate::item::{GestureState, ItemDragAdapter};
use crate::logging::{LogLevel, emit, json_kv};
use crate::registry::ZoneId;
use crate::zone::{DropZone, MoveOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    /// The host laid out zone `zone` at `rect` (page coordinates).
    Measure { zone: ZoneId, rect: Rect },
    SetItemCount { zone: ZoneId, count: usize },
    RemoveZone(ZoneId),
    /// Press on item `index` of `zone`.
    PointerDown { zone: ZoneId, index: usize },
    /// Pointer moved `(dx, dy)` since the press.
    PointerMove { dx: f64, dy: f64 },
    PointerUp { dx: f64, dy: f64 },
    /// Another responder took the gesture.
    PointerCancel { dx: f64, dy: f64 },
    /// One animation frame elapsed.
    Frame,
}

struct ActiveDrag {
    zone_id: ZoneId,
    adapter: ItemDragAdapter,
}

pub struct DragRuntime {
    context: Arc<GridContext>,
    clock: Arc<FrameClock>,
    zones: Vec<DropZone>,
    active: Option<ActiveDrag>,
    pointer: PointerTracker,
    start_instant: Option<Instant>,
    last_metrics_emit: Option<Instant>,
}

impl DragRuntime {
    pub fn new(
        mut config: EngineConfig,
        sink: Arc<dyn CommitSink>,
        document: Arc<dyn ScrollSurface>,
    ) -> Self {
        if config.metrics_interval > Duration::from_millis(0) {
            config.enable_metrics();
        }
        let clock = Arc::new(FrameClock::new());
        let context = Arc::new(GridContext::new(config, sink, clock.clone(), document));
        Self {
            context,
            clock,
            zones: Vec::new(),
            active: None,
            pointer: PointerTracker::default(),
            start_instant: None,
            last_metrics_emit: None,
        }
    }

    /// Cell size used to scale terminal mouse coordinates.
    pub fn with_pointer(mut self, pointer: PointerTracker) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn context(&self) -> &Arc<GridContext> {
        &self.context
    }

    pub fn clock(&self) -> &Arc<FrameClock> {
        &self.clock
    }

    pub fn add_zone(&mut self, config: ZoneConfig) -> Result<&mut DropZone> {
        if self.position(&config.id).is_some() {
            return Err(DragError::DuplicateZone(config.id));
        }
        let zone = DropZone::new(config, Arc::clone(&self.context))?;
        self.log_runtime_event(
            LogLevel::Debug,
            "zone_added",
            [json_kv("zone", json!(zone.id()))],
        );
        self.zones.push(zone);
        let last = self.zones.len() - 1;
        Ok(&mut self.zones[last])
    }

    pub fn zone(&self, id: &str) -> Option<&DropZone> {
        self.zones.iter().find(|zone| zone.id() == id)
    }

    pub fn zone_mut(&mut self, id: &str) -> Option<&mut DropZone> {
        self.zones.iter_mut().find(|zone| zone.id() == id)
    }

    /// Zone and item currently being dragged.
    pub fn active_drag(&self) -> Option<(&str, usize)> {
        self.active
            .as_ref()
            .map(|drag| (drag.zone_id.as_str(), drag.adapter.index()))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.zones.iter().position(|zone| zone.id() == id)
    }

    fn zone_index(&self, id: &str) -> Result<usize> {
        self.position(id)
            .ok_or_else(|| DragError::MissingZone(id.to_string()))
    }

    /// Poll the terminal until Esc or `q`, emitting a frame every `tick`.
    /// The host is responsible for enabling mouse capture.
    pub fn run(&mut self, tick: Duration) -> Result<Vec<ZoneChange>> {
        self.bootstrap();
        let mut changes = Vec::new();
        let mut last_tick = Instant::now();

        loop {
            let timeout = tick.checked_sub(last_tick.elapsed()).unwrap_or_default();
            if event::poll(timeout)? {
                match event::read()? {
                    CrosstermEvent::Mouse(mouse) => {
                        changes.extend(self.handle_mouse(&mouse)?);
                    }
                    CrosstermEvent::Key(key)
                        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) =>
                    {
                        break;
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= tick {
                last_tick = Instant::now();
                self.dispatch(RuntimeEvent::Frame)?;
            }
            self.maybe_emit_metrics();
        }

        self.finalize();
        Ok(changes)
    }

    /// Replay `events` in order and return every committed change.
    pub fn run_scripted<I>(&mut self, events: I) -> Result<Vec<ZoneChange>>
    where
        I: IntoIterator<Item = RuntimeEvent>,
    {
        self.bootstrap();
        let mut changes = Vec::new();
        for event in events {
            changes.extend(self.dispatch(event)?);
        }
        self.finalize();
        Ok(changes)
    }

    /// Translate a terminal mouse event. A press that lands on no item of
    /// any zone is ignored, and so is the rest of that gesture.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent) -> Result<Option<ZoneChange>> {
        let Some(pointer) = self.pointer.translate(mouse) else {
            return Ok(None);
        };
        match pointer {
            PointerEvent::Down { x, y } => {
                let hit = self.zones.iter().find_map(|zone| {
                    let bounds = zone.bounds();
                    if !bounds.contains(x, y) {
                        return None;
                    }
                    zone.item_at(x - bounds.left, y - bounds.top)
                        .map(|index| (zone.id().to_string(), index))
                });
                match hit {
                    Some((zone, index)) => self.dispatch(RuntimeEvent::PointerDown { zone, index }),
                    None => Ok(None),
                }
            }
            PointerEvent::Move { dx, dy } => self.dispatch(RuntimeEvent::PointerMove { dx, dy }),
            PointerEvent::Up { dx, dy } => self.dispatch(RuntimeEvent::PointerUp { dx, dy }),
        }
    }

    pub fn dispatch(&mut self, event: RuntimeEvent) -> Result<Option<ZoneChange>> {
        let name = Self::describe_event(&event);
        let change = match event {
            RuntimeEvent::Measure { zone, rect } => {
                let idx = self.zone_index(&zone)?;
                self.zones[idx].measure(rect);
                None
            }
            RuntimeEvent::SetItemCount { zone, count } => {
                let idx = self.zone_index(&zone)?;
                self.zones[idx].set_item_count(count);
                None
            }
            RuntimeEvent::RemoveZone(zone) => {
                self.remove_zone(&zone);
                None
            }
            RuntimeEvent::PointerDown { zone, index } => {
                self.begin(&zone, index)?;
                None
            }
            RuntimeEvent::PointerMove { dx, dy } => {
                self.drag_to(dx, dy)?;
                None
            }
            RuntimeEvent::PointerUp { dx, dy } => self.finish(dx, dy, false)?,
            RuntimeEvent::PointerCancel { dx, dy } => self.finish(dx, dy, true)?,
            RuntimeEvent::Frame => {
                for token in self.clock.advance() {
                    for zone in self.zones.iter_mut() {
                        if zone.on_frame(token) {
                            break;
                        }
                    }
                }
                None
            }
        };

        self.log_runtime_event(
            LogLevel::Trace,
            "event_dispatched",
            [
                json_kv("event", json!(name)),
                json_kv("committed", json!(change.is_some())),
            ],
        );
        self.maybe_emit_metrics();
        Ok(change)
    }

    fn remove_zone(&mut self, id: &str) {
        if self.active.as_ref().is_some_and(|drag| drag.zone_id == id) {
            self.active = None;
        }
        if let Some(idx) = self.position(id) {
            // Dropping the zone aborts its drag and unregisters it.
            self.zones.remove(idx);
            self.log_runtime_event(
                LogLevel::Debug,
                "zone_removed",
                [json_kv("zone", json!(id))],
            );
        }
    }

    fn begin(&mut self, zone_id: &str, index: usize) -> Result<()> {
        if let Some(previous) = self.active.take() {
            if let Some(idx) = self.position(&previous.zone_id) {
                self.zones[idx].abort_drag();
            }
        }
        let idx = self.zone_index(zone_id)?;
        let zone = &mut self.zones[idx];
        let mut adapter = ItemDragAdapter::mount(zone, index)?;
        if adapter.on_move_should_set(zone)? {
            self.active = Some(ActiveDrag {
                zone_id: zone_id.to_string(),
                adapter,
            });
        } else {
            self.log_runtime_event(
                LogLevel::Debug,
                "drag_refused",
                [json_kv("zone", json!(zone_id))],
            );
        }
        Ok(())
    }

    fn drag_to(&mut self, dx: f64, dy: f64) -> Result<()> {
        let Some(drag) = self.active.as_mut() else {
            return Ok(());
        };
        let Some(zone) = self.zones.iter_mut().find(|zone| zone.id() == drag.zone_id) else {
            return Ok(());
        };
        if let MoveOutcome::Updated(update) = drag.adapter.on_move(zone, GestureState::new(dx, dy))? {
            if update.is_traversing(&drag.zone_id) {
                self.log_runtime_event(
                    LogLevel::Trace,
                    "traversing",
                    [json_kv("target", json!(update.target_zone))],
                );
            }
        }
        Ok(())
    }

    fn finish(&mut self, dx: f64, dy: f64, cancelled: bool) -> Result<Option<ZoneChange>> {
        let Some(mut drag) = self.active.take() else {
            return Ok(None);
        };
        let Some(idx) = self.position(&drag.zone_id) else {
            return Ok(None);
        };
        let zone = &mut self.zones[idx];
        let state = GestureState::new(dx, dy);
        let change = if cancelled {
            drag.adapter.on_terminate(zone, state)?
        } else {
            drag.adapter.on_release(zone, state)?
        };
        self.apply_change(&change)?;
        Ok(Some(change))
    }

    // A traversal moves one item between zones: adjust both counts, then
    // mount the arrival so it picks up the pointer position it was dropped at.
    fn apply_change(&mut self, change: &ZoneChange) -> Result<()> {
        let Some(target_id) = change.target_id.as_deref() else {
            return Ok(());
        };
        let idx = self.zone_index(target_id)?;
        if let Some(source) = self.position(&change.source_id) {
            let count = self.zones[source].item_count();
            self.zones[source].set_item_count(count.saturating_sub(1));
        }
        let target = &mut self.zones[idx];
        let count = target.item_count();
        target.set_item_count(count + 1);
        let arrived = ItemDragAdapter::mount(target, change.to_index)?;
        let style = arrived.style();
        self.log_runtime_event(
            LogLevel::Debug,
            "item_landed",
            [
                json_kv("zone", json!(target_id)),
                json_kv("index", json!(change.to_index)),
                json_kv("x", json!(style.x)),
                json_kv("y", json!(style.y)),
            ],
        );
        Ok(())
    }

    fn bootstrap(&mut self) {
        let now = Instant::now();
        self.start_instant = Some(now);
        self.last_metrics_emit = Some(now);
        self.log_runtime_event(
            LogLevel::Info,
            "runtime_started",
            [json_kv("zones", json!(self.zones.len()))],
        );
    }

    fn finalize(&mut self) {
        let uptime = self
            .start_instant
            .map(|start| start.elapsed())
            .unwrap_or_default();
        self.emit_metrics(uptime);
        self.log_runtime_event(
            LogLevel::Info,
            "runtime_stopped",
            [json_kv("uptime_ms", json!(uptime.as_millis() as u64))],
        );
    }

    fn log_runtime_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        emit(self.context.logger(), level, "dropgrid::runtime", message, fields);
    }

    fn maybe_emit_metrics(&mut self) {
        let interval = self.context.config().metrics_interval;
        if interval == Duration::from_millis(0) {
            return;
        }

        let now = Instant::now();
        match self.last_metrics_emit {
            Some(last) if now.duration_since(last) < interval => return,
            _ => self.last_metrics_emit = Some(now),
        }

        let uptime = self
            .start_instant
            .map(|start| now.duration_since(start))
            .unwrap_or_default();
        self.emit_metrics(uptime);
    }

    fn emit_metrics(&self, uptime: Duration) {
        let (Some(logger), Some(snapshot)) =
            (self.context.logger(), self.context.metrics_snapshot(uptime))
        else {
            return;
        };
        let target = self.context.config().metrics_target.as_str();
        let _ = logger.log_event(snapshot.to_log_event(target));
    }

    fn describe_event(event: &RuntimeEvent) -> &'static str {
        match event {
            RuntimeEvent::Measure { .. } => "measure",
            RuntimeEvent::SetItemCount { .. } => "set_item_count",
            RuntimeEvent::RemoveZone(_) => "remove_zone",
            RuntimeEvent::PointerDown { .. } => "pointer_down",
            RuntimeEvent::PointerMove { .. } => "pointer_move",
            RuntimeEvent::PointerUp { .. } => "pointer_up",
            RuntimeEvent::PointerCancel { .. } => "pointer_cancel",
            RuntimeEvent::Frame => "frame",
        }
    }
}
