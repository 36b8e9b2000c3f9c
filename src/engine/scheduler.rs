//! Virtual-clock timer queue
//!
//! Single-threaded: nothing fires on its own. The host calls [`Scheduler::pop_due`]
//! while advancing the clock, so every callback runs synchronously in the caller.

use std::collections::BTreeMap;

/// Handle to a scheduled task, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle {
    due_ms: u64,
    seq: u64,
}

impl TimerHandle {
    pub fn due_ms(&self) -> u64 {
        self.due_ms
    }
}

/// Pending tasks ordered by due time, then by scheduling order
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_seq: u64,
    pending: BTreeMap<TimerHandle, T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Current virtual time (ms)
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `task` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TimerHandle {
        let handle = TimerHandle {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.insert(handle, task);
        handle
    }

    /// Cancel one task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    /// Cancel everything outstanding, returning how many tasks were dropped
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Due time of the earliest pending task
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.keys().next().map(|h| h.due_ms)
    }

    /// Remove and return the earliest task due at or before `until_ms`
    ///
    /// The clock moves to the task's due time, so tasks it schedules are timed
    /// from the moment it fired.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<T> {
        let handle = *self.pending.keys().next()?;
        if handle.due_ms > until_ms {
            return None;
        }
        self.now_ms = self.now_ms.max(handle.due_ms);
        self.pending.remove(&handle)
    }

    /// Move the clock forward (never backwards)
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule(300, "c");
        s.schedule(100, "a");
        s.schedule(200, "b");

        let mut fired = Vec::new();
        while let Some(t) = s.pop_due(1000) {
            fired.push((t, s.now_ms()));
        }
        assert_eq!(fired, vec![("a", 100), ("b", 200), ("c", 300)]);
    }

    #[test]
    fn test_same_due_time_keeps_schedule_order() {
        let mut s = Scheduler::new();
        s.schedule(50, 1);
        s.schedule(50, 2);
        assert_eq!(s.pop_due(50), Some(1));
        assert_eq!(s.pop_due(50), Some(2));
    }

    #[test]
    fn test_not_due_yet() {
        let mut s = Scheduler::new();
        s.schedule(100, ());
        assert_eq!(s.pop_due(99), None);
        assert_eq!(s.pending_count(), 1);
        assert_eq!(s.next_due_ms(), Some(100));
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new();
        let a = s.schedule(10, 'a');
        let b = s.schedule(20, 'b');
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert!(!s.is_pending(a));
        assert!(s.is_pending(b));
        assert_eq!(s.pop_due(100), Some('b'));
        assert!(!s.cancel(b));
    }

    #[test]
    fn test_cancel_all() {
        let mut s = Scheduler::new();
        s.schedule(10, 1);
        s.schedule(20, 2);
        assert_eq!(s.cancel_all(), 2);
        assert_eq!(s.pop_due(u64::MAX), None);
    }

    #[test]
    fn test_chained_task_timed_from_fire_time() {
        let mut s = Scheduler::new();
        s.schedule(100, 1);
        assert_eq!(s.pop_due(1000), Some(1));
        let h = s.schedule(50, 2);
        assert_eq!(h.due_ms(), 150);
    }

    #[test]
    fn test_clock_never_goes_back() {
        let mut s: Scheduler<()> = Scheduler::new();
        s.set_now(500);
        s.set_now(100);
        assert_eq!(s.now_ms(), 500);
    }
}
