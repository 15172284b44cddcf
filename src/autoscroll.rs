//! Edge autoscroll while a dragged item touches a scroll boundary.
//!
//! The loop is a repeating frame task: starting it requests one frame from
//! the host's [`FrameScheduler`]; every frame it owns scrolls one step and
//! requests the next. Stopping cancels the outstanding request, so no tick
//! is left dangling.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::json;

use crate::config::ScrollSteps;
use crate::logging::{LogLevel, Logger, emit, json_kv};

/// Vertical autoscroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    Up,
    #[default]
    Idle,
    Down,
}

impl ScrollDirection {
    pub fn signum(self) -> f64 {
        match self {
            Self::Up => -1.0,
            Self::Idle => 0.0,
            Self::Down => 1.0,
        }
    }

    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }
}

/// A scrollable host surface: a scroll container or the document itself.
pub trait ScrollSurface: Send + Sync {
    fn scroll_top(&self) -> f64;
    fn client_height(&self) -> f64;
    fn set_scroll_top(&self, value: f64);

    fn scroll_by(&self, delta: f64) {
        self.set_scroll_top(self.scroll_top() + delta);
    }
}

#[derive(Debug, Clone, Copy)]
struct ViewportState {
    scroll_top: f64,
    client_height: f64,
    scroll_height: f64,
}

/// In-memory [`ScrollSurface`] that clamps its offset to the scrollable
/// range. Hosts mirror their real viewport into it; tests drive it directly.
pub struct ScrollViewport {
    state: RwLock<ViewportState>,
}

impl ScrollViewport {
    pub fn new(client_height: f64, scroll_height: f64) -> Self {
        Self {
            state: RwLock::new(ViewportState {
                scroll_top: 0.0,
                client_height,
                scroll_height: scroll_height.max(client_height),
            }),
        }
    }

    pub fn max_scroll_top(&self) -> f64 {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        (state.scroll_height - state.client_height).max(0.0)
    }

    pub fn set_scroll_height(&self, scroll_height: f64) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.scroll_height = scroll_height.max(state.client_height);
    }
}

impl ScrollSurface for ScrollViewport {
    fn scroll_top(&self) -> f64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .scroll_top
    }

    fn client_height(&self) -> f64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .client_height
    }

    fn set_scroll_top(&self, value: f64) {
        let max = self.max_scroll_top();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.scroll_top = value.clamp(0.0, max);
    }
}

/// Which surface a zone scrolls, and therefore at what step.
#[derive(Clone)]
pub enum ScrollTarget {
    Container(Arc<dyn ScrollSurface>),
    Document(Arc<dyn ScrollSurface>),
}

impl ScrollTarget {
    pub fn surface(&self) -> &dyn ScrollSurface {
        match self {
            Self::Container(surface) | Self::Document(surface) => surface.as_ref(),
        }
    }

    pub fn step(&self, steps: &ScrollSteps) -> f64 {
        match self {
            Self::Container(_) => steps.container,
            Self::Document(_) => steps.document,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::Document(_) => "document",
        }
    }
}

impl fmt::Debug for ScrollTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(self.kind())
            .field(&self.surface().scroll_top())
            .finish()
    }
}

/// Handle to one requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(pub u64);

/// The host's animation-frame primitive.
pub trait FrameScheduler: Send + Sync {
    fn request_frame(&self) -> FrameToken;
    fn cancel_frame(&self, token: FrameToken);
}

/// Per-zone autoscroll loop.
pub struct Autoscroll {
    scheduler: Arc<dyn FrameScheduler>,
    steps: ScrollSteps,
    logger: Option<Logger>,
    direction: ScrollDirection,
    target: Option<ScrollTarget>,
    pending: Option<FrameToken>,
}

impl Autoscroll {
    pub fn new(scheduler: Arc<dyn FrameScheduler>, steps: ScrollSteps) -> Self {
        Self {
            scheduler,
            steps,
            logger: None,
            direction: ScrollDirection::Idle,
            target: None,
            pending: None,
        }
    }

    pub fn with_logger(mut self, logger: Option<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Change direction. Keeping the current direction is a no-op; any other
    /// change restarts the loop, and `Idle` stops it.
    pub fn set_direction(&mut self, direction: ScrollDirection, target: ScrollTarget) {
        if direction == self.direction && (direction.is_idle() || self.pending.is_some()) {
            return;
        }
        self.stop();
        if direction.is_idle() {
            return;
        }
        emit(
            self.logger.as_ref(),
            LogLevel::Debug,
            "dropgrid::autoscroll",
            "autoscroll_started",
            [
                json_kv("direction", json!(direction.signum())),
                json_kv("surface", json!(target.kind())),
            ],
        );
        self.direction = direction;
        self.target = Some(target);
        self.pending = Some(self.scheduler.request_frame());
    }

    /// Cancel the outstanding frame, if any. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel_frame(token);
            emit(
                self.logger.as_ref(),
                LogLevel::Debug,
                "dropgrid::autoscroll",
                "autoscroll_stopped",
                std::iter::empty(),
            );
        }
        self.direction = ScrollDirection::Idle;
        self.target = None;
    }

    /// Run one tick if `token` is the frame this loop is waiting for.
    /// Returns whether a scroll step was applied.
    pub fn on_frame(&mut self, token: FrameToken) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        let Some(target) = self.target.as_ref() else {
            self.pending = None;
            return false;
        };
        let delta = target.step(&self.steps) * self.direction.signum();
        target.surface().scroll_by(delta);
        self.pending = Some(self.scheduler.request_frame());
        true
    }
}

impl Drop for Autoscroll {
    fn drop(&mut self) {
        self.stop();
    }
}
