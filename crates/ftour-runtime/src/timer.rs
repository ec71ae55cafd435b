#![forbid(unsafe_code)]

//! Virtual-time timer queue with bulk cancellation.
//!
//! A [`TimerQueue`] replaces hand-tracked `setTimeout` handles: every delayed
//! task of a tour session goes into one queue, and a single
//! [`cancel_all`](TimerQueue::cancel_all) drains it at each transition
//! boundary.
//!
//! Time only moves when the owner says so. The owner pulls due tasks with
//! [`pop_due`](TimerQueue::pop_due) up to a horizon, handling each before
//! pulling the next, so a handler may schedule follow-up tasks that still
//! fire inside the same horizon (a 100 ms progress tick advanced by 1 s
//! fires ten times).
//!
//! # Invariants
//!
//! 1. Tasks fire in `(due, insertion)` order: ties keep scheduling order.
//! 2. `now()` never decreases.
//! 3. After `cancel_all()` nothing scheduled before the call can fire.

use std::collections::VecDeque;
use std::time::Duration;

/// Handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    due: Duration,
    task: T,
}

/// Ordered queue of delayed tasks on a virtual clock.
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    entries: VecDeque<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: VecDeque::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedule `task` to fire `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now.saturating_add(delay);
        // Ids grow monotonically, so inserting after every entry due at or
        // before `due` keeps insertion order among ties.
        let at = self.entries.partition_point(|entry| entry.due <= due);
        self.entries.insert(at, Entry { id, due, task });
        tracing::trace!(timer = id.0, due_ms = due.as_millis() as u64, "timer scheduled");
        id
    }

    /// Cancel one task. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Cancel every pending task, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.front().map(|entry| entry.due)
    }

    /// Pending tasks in firing order.
    pub fn pending(&self) -> impl Iterator<Item = (TimerId, Duration, &T)> {
        self.entries.iter().map(|entry| (entry.id, entry.due, &entry.task))
    }

    /// Remove the earliest task if it is due at or before `horizon`, moving
    /// the clock to its due time.
    pub fn pop_due(&mut self, horizon: Duration) -> Option<(TimerId, T)> {
        if self.entries.front()?.due > horizon {
            return None;
        }
        let entry = self.entries.pop_front()?;
        self.now = self.now.max(entry.due);
        tracing::trace!(timer = entry.id.0, now_ms = self.now.as_millis() as u64, "timer fired");
        Some((entry.id, entry.task))
    }

    /// Move the clock to `horizon` once every due task has been handled.
    pub fn advance_to(&mut self, horizon: Duration) {
        self.now = self.now.max(horizon);
    }

    /// Pop and collect every task due within `dt`. Handlers that need to
    /// schedule follow-ups inside the window should loop on
    /// [`pop_due`](Self::pop_due) instead.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        let horizon = self.now.saturating_add(dt);
        let mut fired = Vec::new();
        while let Some((_, task)) = self.pop_due(horizon) {
            fired.push(task);
        }
        self.advance_to(horizon);
        fired
    }
}

/// Scale `delta` by a playback speed factor, rounding to microseconds.
pub fn scale_duration(delta: Duration, speed: f64) -> Duration {
    let micros = delta.as_micros() as f64 * speed;
    let micros = micros.round().clamp(0.0, u64::MAX as f64) as u64;
    Duration::from_micros(micros)
}
