use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct DragMetrics {
    drags_started: u64,
    moves: u64,
    suppressed_moves: u64,
    placeholder_updates: u64,
    traversals_started: u64,
    commits: u64,
    autoscroll_ticks: u64,
}

impl DragMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_drag_start(&mut self) {
        self.drags_started = self.drags_started.saturating_add(1);
    }

    pub fn record_move(&mut self) {
        self.moves = self.moves.saturating_add(1);
    }

    pub fn record_suppressed_move(&mut self) {
        self.suppressed_moves = self.suppressed_moves.saturating_add(1);
    }

    pub fn record_placeholder_update(&mut self) {
        self.placeholder_updates = self.placeholder_updates.saturating_add(1);
    }

    pub fn record_traversal_start(&mut self) {
        self.traversals_started = self.traversals_started.saturating_add(1);
    }

    pub fn record_commit(&mut self) {
        self.commits = self.commits.saturating_add(1);
    }

    pub fn record_autoscroll_tick(&mut self) {
        self.autoscroll_ticks = self.autoscroll_ticks.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            drags_started: self.drags_started,
            moves: self.moves,
            suppressed_moves: self.suppressed_moves,
            placeholder_updates: self.placeholder_updates,
            traversals_started: self.traversals_started,
            commits: self.commits,
            autoscroll_ticks: self.autoscroll_ticks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub drags_started: u64,
    pub moves: u64,
    pub suppressed_moves: u64,
    pub placeholder_updates: u64,
    pub traversals_started: u64,
    pub commits: u64,
    pub autoscroll_ticks: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "drag_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("drags_started".to_string(), json!(self.drags_started));
        map.insert("moves".to_string(), json!(self.moves));
        map.insert("suppressed_moves".to_string(), json!(self.suppressed_moves));
        map.insert(
            "placeholder_updates".to_string(),
            json!(self.placeholder_updates),
        );
        map.insert(
            "traversals_started".to_string(),
            json!(self.traversals_started),
        );
        map.insert("commits".to_string(), json!(self.commits));
        map.insert("autoscroll_ticks".to_string(), json!(self.autoscroll_ticks));
        map
    }
}
