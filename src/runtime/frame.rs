use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use crate::autoscroll::{FrameScheduler, FrameToken};

#[derive(Default)]
struct FrameQueue {
    next: u64,
    requested: BTreeSet<FrameToken>,
}

/// Manually advanced animation-frame clock.
///
/// Requests made while a frame is being processed land in the next frame,
/// never the current one.
#[derive(Default)]
pub struct FrameClock {
    inner: Mutex<FrameQueue>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every token due this frame, in request order.
    pub fn advance(&self) -> Vec<FrameToken> {
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut queue.requested).into_iter().collect()
    }

    pub fn pending(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .requested
            .len()
    }
}

impl FrameScheduler for FrameClock {
    fn request_frame(&self) -> FrameToken {
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        queue.next = queue.next.wrapping_add(1);
        let token = FrameToken(queue.next);
        queue.requested.insert(token);
        token
    }

    fn cancel_frame(&self, token: FrameToken) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .requested
            .remove(&token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_drains_requested_frames() {
        let clock = FrameClock::new();
        let a = clock.request_frame();
        let b = clock.request_frame();
        assert_eq!(clock.advance(), vec![a, b]);
        assert!(clock.advance().is_empty());
    }

    #[test]
    fn cancelled_frames_never_fire() {
        let clock = FrameClock::new();
        let a = clock.request_frame();
        clock.cancel_frame(a);
        clock.cancel_frame(a);
        assert_eq!(clock.pending(), 0);
        assert!(clock.advance().is_empty());
    }
}
