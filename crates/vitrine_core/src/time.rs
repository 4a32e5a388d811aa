//! Time primitives
//!
//! Timestamps are milliseconds as `f64`, matching `performance.now()`.
//! Nothing here reads a wall clock; the host passes the current time in, so
//! tests can step through time exactly.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a pending timer
    pub struct TimerId;
}

struct Timer<E> {
    due_ms: f64,
    /// Insertion order, breaks ties between timers due at the same time
    seq: u64,
    payload: E,
}

/// A cancellable, re-armable one-shot timer set (the `setTimeout` analogue)
pub struct TimerQueue<E> {
    timers: SlotMap<TimerId, Timer<E>>,
    next_seq: u64,
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            next_seq: 0,
        }
    }

    /// Schedule `payload` to become due at `due_ms`
    pub fn schedule(&mut self, due_ms: f64, payload: E) -> TimerId {
        let seq = self.bump_seq();
        self.timers.insert(Timer {
            due_ms,
            seq,
            payload,
        })
    }

    /// Cancel a pending timer, returning its payload
    pub fn cancel(&mut self, id: TimerId) -> Option<E> {
        self.timers.remove(id).map(|t| t.payload)
    }

    /// Move a pending timer to a new due time. Returns false if it already
    /// fired or was cancelled.
    pub fn reschedule(&mut self, id: TimerId, due_ms: f64) -> bool {
        let seq = self.bump_seq();
        match self.timers.get_mut(id) {
            Some(timer) => {
                timer.due_ms = due_ms;
                timer.seq = seq;
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest due time of any pending timer
    pub fn next_due(&self) -> Option<f64> {
        self.timers.values().map(|t| t.due_ms).reduce(f64::min)
    }

    /// Remove and return every timer due at or before `now_ms`, ordered by
    /// due time then scheduling order
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<E> {
        let mut due: Vec<(f64, u64, TimerId)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .map(|(id, t)| (t.due_ms, t.seq, id))
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter()
            .filter_map(|(_, _, id)| self.timers.remove(id))
            .map(|t| t.payload)
            .collect()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Trailing-edge debounce: the latest call wins and runs once `wait_ms` has
/// passed without another call
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    wait_ms: f64,
    pending: Option<(f64, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(wait_ms: f64) -> Self {
        Self {
            wait_ms,
            pending: None,
        }
    }

    pub fn wait_ms(&self) -> f64 {
        self.wait_ms
    }

    /// Record a call; re-arms the quiet period
    pub fn call(&mut self, now_ms: f64, args: T) {
        self.pending = Some((now_ms + self.wait_ms, args));
    }

    /// Take the pending call if its quiet period has elapsed
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now_ms => self.pending.take().map(|(_, args)| args),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }
}

/// Leading-edge throttle: lets one call through, then blocks for `limit_ms`
#[derive(Clone, Debug)]
pub struct Throttle {
    limit_ms: f64,
    blocked_until: Option<f64>,
}

impl Throttle {
    pub fn new(limit_ms: f64) -> Self {
        Self {
            limit_ms,
            blocked_until: None,
        }
    }

    /// Returns true if the call may run now
    pub fn try_acquire(&mut self, now_ms: f64) -> bool {
        match self.blocked_until {
            Some(until) if now_ms < until => false,
            _ => {
                self.blocked_until = Some(now_ms + self.limit_ms);
                true
            }
        }
    }
}
