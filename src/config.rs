//! Per-zone and engine-wide configuration.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DragError, Result};
use crate::logging::{FileSink, Logger};
use crate::metrics::DragMetrics;

/// Offsets of a zone inside its scroll container, used when deciding
/// whether a dragged item touches the container's visible edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollOffsets {
    #[serde(default)]
    pub top: f64,
    /// Kept for hosts that mirror their layout here; the edge test reads
    /// only `top`.
    #[serde(default)]
    pub bottom: f64,
}

/// Configuration surface of a single drop zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub id: String,
    pub boxes_per_row: usize,
    pub row_height: f64,
    #[serde(default)]
    pub disable_drag: bool,
    #[serde(default)]
    pub disable_drop: bool,
    #[serde(default)]
    pub scroll_offsets: ScrollOffsets,
}

impl ZoneConfig {
    pub fn new(id: impl Into<String>, boxes_per_row: usize, row_height: f64) -> Self {
        Self {
            id: id.into(),
            boxes_per_row,
            row_height,
            disable_drag: false,
            disable_drop: false,
            scroll_offsets: ScrollOffsets::default(),
        }
    }

    pub fn with_disable_drag(mut self, disabled: bool) -> Self {
        self.disable_drag = disabled;
        self
    }

    pub fn with_disable_drop(mut self, disabled: bool) -> Self {
        self.disable_drop = disabled;
        self
    }

    pub fn with_scroll_offsets(mut self, top: f64, bottom: f64) -> Self {
        self.scroll_offsets = ScrollOffsets { top, bottom };
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.boxes_per_row == 0 || !(self.row_height >= 0.0) {
            return Err(DragError::InvalidGrid(self.id.clone()));
        }
        Ok(())
    }

    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON array of zone configs.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let raw = std::fs::read_to_string(path)?;
        let configs: Vec<Self> = serde_json::from_str(&raw)?;
        for config in &configs {
            config.validate()?;
        }
        Ok(configs)
    }
}

/// Autoscroll step per animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollSteps {
    /// Step applied to a discovered scroll container.
    pub container: f64,
    /// Step applied to the document when no container is set.
    pub document: f64,
}

impl Default for ScrollSteps {
    fn default() -> Self {
        Self {
            container: 10.0,
            document: 6.0,
        }
    }
}

/// Engine-wide knobs shared by every zone of one coordination tree.
#[derive(Clone)]
pub struct EngineConfig {
    /// Optional structured logger.
    pub logger: Option<Logger>,
    /// Drag counters; disabled unless set.
    pub metrics: Option<Arc<Mutex<DragMetrics>>>,
    pub scroll_steps: ScrollSteps,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            scroll_steps: ScrollSteps::default(),
            metrics_interval: Duration::from_secs(5),
            metrics_target: "dropgrid::metrics".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Log JSON lines to `path`, truncating once the file would exceed
    /// `max_bytes` (0 disables truncation).
    pub fn with_log_file(self, path: impl AsRef<Path>, max_bytes: u64) -> Result<Self> {
        let sink = FileSink::new(path, max_bytes)?;
        Ok(self.with_logger(Logger::new(sink)))
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(DragMetrics::new())));
        }
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<DragMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    pub(crate) fn record(&self, f: impl FnOnce(&mut DragMetrics)) {
        if let Some(metrics) = self.metrics.as_ref() {
            let mut guard = metrics.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut *guard);
        }
    }
}
