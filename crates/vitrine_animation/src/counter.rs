//! Counter animator
//!
//! Counts a number up (or down) over a fixed duration with quartic ease-out,
//! rendering `"<value>+"` into a text node every frame.

use crate::easing::{lerp, Easing};
use crate::error::{AnimationError, Result};
use crate::scheduler::{Frame, FrameCallback, FrameLoopHandle, FrameScheduler, FrameStatus};
use rustc_hash::FxHashMap;
use vitrine_core::{NodeId, Page};

/// Default count-up duration
pub const DEFAULT_DURATION_MS: f64 = 2000.0;

/// Text shown for a counter value
pub fn counter_text(value: i64) -> String {
    format!("{}+", value)
}

/// One in-flight count
#[derive(Clone, Debug)]
pub struct CounterTask {
    pub node: NodeId,
    pub start: i64,
    pub end: i64,
    pub duration_ms: f64,
    pub start_time_ms: f64,
    easing: Easing,
}

impl CounterTask {
    pub fn new(node: NodeId, start: i64, end: i64, duration_ms: f64, start_time_ms: f64) -> Self {
        Self {
            node,
            start,
            end,
            duration_ms,
            start_time_ms,
            easing: Easing::EaseOutQuart,
        }
    }

    /// Linear progress at `now_ms`, in `[0, 1]`
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_time_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Displayed value for a linear progress
    pub fn value_at(&self, progress: f64) -> i64 {
        if progress >= 1.0 {
            return self.end;
        }
        let eased = self.easing.apply(progress as f32) as f64;
        lerp(self.start as f64, self.end as f64, eased).floor() as i64
    }
}

impl FrameCallback for CounterTask {
    fn on_frame(&mut self, frame: &mut Frame<'_>) -> Result<FrameStatus> {
        if !frame.page.contains(self.node) {
            return Err(AnimationError::NodeRemoved(self.node));
        }
        let progress = self.progress(frame.now_ms);
        frame
            .page
            .set_text(self.node, counter_text(self.value_at(progress)));

        Ok(if progress >= 1.0 {
            FrameStatus::Done
        } else {
            FrameStatus::Continue
        })
    }
}

/// Starts counters and tracks which nodes are counting
#[derive(Default)]
pub struct CounterAnimator {
    runs: FxHashMap<NodeId, FrameLoopHandle>,
}

impl CounterAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `node` from `start` to `end`. A run already in flight on the
    /// same node is cancelled first.
    pub fn animate(
        &mut self,
        scheduler: &mut FrameScheduler,
        node: NodeId,
        start: i64,
        end: i64,
        duration_ms: f64,
        now_ms: f64,
    ) -> FrameLoopHandle {
        self.runs.retain(|_, handle| handle.is_running());
        if let Some(previous) = self.runs.remove(&node) {
            tracing::debug!("restarting counter on {:?}", node);
            previous.cancel();
        }

        let task = CounterTask::new(node, start, end, duration_ms, now_ms);
        let handle = scheduler.request("counter", task);
        self.runs.insert(node, handle.clone());
        handle
    }

    /// Render the final value without animating
    pub fn jump_to(&mut self, page: &mut Page, node: NodeId, end: i64) {
        if let Some(previous) = self.runs.remove(&node) {
            previous.cancel();
        }
        page.set_text(node, counter_text(end));
    }

    pub fn is_running(&self, node: NodeId) -> bool {
        self.runs.get(&node).is_some_and(FrameLoopHandle::is_running)
    }

    /// Number of counters still counting
    pub fn active(&self) -> usize {
        self.runs.values().filter(|h| h.is_running()).count()
    }
}
