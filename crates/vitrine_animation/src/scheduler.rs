//! Frame scheduler
//!
//! The `requestAnimationFrame` analogue. The host calls [`FrameScheduler::tick`]
//! once per display frame with a timestamp; every registered loop runs once
//! and reports whether it wants another frame.
//!
//! Loops are isolated from each other: a loop that returns an error or panics
//! is logged, marked [`LoopState::Faulted`] and removed, and the rest of the
//! frame still runs.

use crate::error::{AnimationError, Result};
use slotmap::{new_key_type, SlotMap};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use vitrine_core::Page;

new_key_type! {
    pub struct FrameLoopId;
}

/// Whether a loop wants to be called again
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Done,
}

/// Lifecycle of a frame loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Returned [`FrameStatus::Done`]
    Finished,
    /// Cancelled through its handle
    Cancelled,
    /// Returned an error or panicked
    Faulted,
}

/// What a loop sees on each frame
pub struct Frame<'a> {
    pub page: &'a mut Page,
    /// Host timestamp in milliseconds
    pub now_ms: f64,
    /// Number of frames this loop has already run
    pub count: u64,
}

/// A per-frame callback
pub trait FrameCallback {
    fn on_frame(&mut self, frame: &mut Frame<'_>) -> Result<FrameStatus>;
}

/// Adapter so plain closures can be scheduled
struct FnLoop<F>(F);

impl<F> FrameCallback for FnLoop<F>
where
    F: FnMut(&mut Frame<'_>) -> Result<FrameStatus>,
{
    fn on_frame(&mut self, frame: &mut Frame<'_>) -> Result<FrameStatus> {
        (self.0)(frame)
    }
}

/// Cancellation handle for a scheduled loop
///
/// Handles are cheap to clone; every clone observes the same state.
#[derive(Clone, Debug)]
pub struct FrameLoopHandle {
    id: FrameLoopId,
    state: Rc<Cell<LoopState>>,
}

impl FrameLoopHandle {
    pub fn id(&self) -> FrameLoopId {
        self.id
    }

    pub fn state(&self) -> LoopState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state.get() == LoopState::Running
    }

    /// Stop the loop before its next frame. No effect once it has ended.
    pub fn cancel(&self) {
        if self.state.get() == LoopState::Running {
            self.state.set(LoopState::Cancelled);
        }
    }
}

struct LoopEntry {
    name: &'static str,
    callback: Box<dyn FrameCallback>,
    state: Rc<Cell<LoopState>>,
    frames: u64,
}

/// Runs registered frame loops
pub struct FrameScheduler {
    loops: SlotMap<FrameLoopId, LoopEntry>,
    frame_count: u64,
    last_frame_ms: Option<f64>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            loops: SlotMap::with_key(),
            frame_count: 0,
            last_frame_ms: None,
        }
    }

    /// Register a loop; it first runs on the next [`FrameScheduler::tick`]
    pub fn request<C>(&mut self, name: &'static str, callback: C) -> FrameLoopHandle
    where
        C: FrameCallback + 'static,
    {
        let state = Rc::new(Cell::new(LoopState::Running));
        let id = self.loops.insert(LoopEntry {
            name,
            callback: Box::new(callback),
            state: state.clone(),
            frames: 0,
        });
        tracing::trace!("frame loop `{}` scheduled", name);
        FrameLoopHandle { id, state }
    }

    /// Register a closure as a loop
    pub fn request_fn<F>(&mut self, name: &'static str, f: F) -> FrameLoopHandle
    where
        F: FnMut(&mut Frame<'_>) -> Result<FrameStatus> + 'static,
    {
        self.request(name, FnLoop(f))
    }

    /// Cancel by id. Returns false if the loop already ended.
    pub fn cancel(&mut self, id: FrameLoopId) -> bool {
        match self.loops.remove(id) {
            Some(entry) => {
                entry.state.set(LoopState::Cancelled);
                true
            }
            None => false,
        }
    }

    /// Cancel every loop
    pub fn cancel_all(&mut self) {
        for (_, entry) in self.loops.drain() {
            entry.state.set(LoopState::Cancelled);
        }
    }

    pub fn is_active(&self, id: FrameLoopId) -> bool {
        self.loops
            .get(id)
            .is_some_and(|entry| entry.state.get() == LoopState::Running)
    }

    /// Number of registered loops
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Milliseconds since the previous tick, if any
    pub fn delta_ms(&self, now_ms: f64) -> Option<f64> {
        self.last_frame_ms.map(|last| now_ms - last)
    }

    /// Run every registered loop once. Returns how many loops are still
    /// registered afterwards.
    pub fn tick(&mut self, page: &mut Page, now_ms: f64) -> usize {
        let ids: Vec<FrameLoopId> = self.loops.keys().collect();

        for id in ids {
            let Some(entry) = self.loops.get_mut(id) else {
                continue;
            };
            if entry.state.get() != LoopState::Running {
                self.loops.remove(id);
                continue;
            }

            let mut frame = Frame {
                page: &mut *page,
                now_ms,
                count: entry.frames,
            };
            let callback = &mut entry.callback;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback.on_frame(&mut frame)));
            entry.frames += 1;

            let result = outcome.unwrap_or_else(|payload| {
                Err(AnimationError::Panicked {
                    name: entry.name.to_string(),
                    message: panic_message(payload.as_ref()),
                })
            });

            match result {
                Ok(FrameStatus::Continue) => {}
                Ok(FrameStatus::Done) => {
                    tracing::trace!("frame loop `{}` finished after {} frames", entry.name, entry.frames);
                    entry.state.set(LoopState::Finished);
                    self.loops.remove(id);
                }
                Err(err) => {
                    tracing::error!("frame loop `{}` failed and was removed: {}", entry.name, err);
                    entry.state.set(LoopState::Faulted);
                    self.loops.remove(id);
                }
            }
        }

        self.frame_count += 1;
        self.last_frame_ms = Some(now_ms);
        self.loops.len()
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
