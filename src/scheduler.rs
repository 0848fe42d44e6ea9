//! Fixed-rate timers for the driver loop.
//!
//! The loop asks [`Scheduler::next_timeout`] how long it may block on input,
//! then drains [`Scheduler::pop_due`]. A task that falls more than one period
//! behind is re-armed from `now` instead of firing a burst to catch up.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Task {
    /// Reconcile the position with the engine and check the crossfade window.
    Poll,
    /// Let the engine report end-of-stream.
    EndCheck,
    /// Redraw.
    Frame,
}

#[derive(Debug)]
struct Entry {
    due: Instant,
    seq: u64,
    task: Task,
    period: Duration,
}

/// Earliest due first; ties go to whichever was scheduled first.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<Entry>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` every `period`, first at `now + period`.
    pub fn every(&mut self, task: Task, period: Duration, now: Instant) {
        let period = period.max(Duration::from_millis(1));
        self.push(task, period, now + period);
    }

    fn push(&mut self, task: Task, period: Duration, due: Instant) {
        self.seq += 1;
        self.heap.push(Entry {
            due,
            seq: self.seq,
            task,
            period,
        });
    }

    /// How long the loop may wait before the next task is due.
    pub fn next_timeout(&self, now: Instant) -> Duration {
        self.heap
            .peek()
            .map_or(Duration::from_millis(100), |e| e.due.saturating_duration_since(now))
    }

    /// Take the next task due at or before `now` and re-arm it.
    pub fn pop_due(&mut self, now: Instant) -> Option<Task> {
        if self.heap.peek().is_none_or(|e| e.due > now) {
            return None;
        }
        let entry = self.heap.pop()?;
        let mut next = entry.due + entry.period;
        if next <= now {
            next = now + entry.period;
        }
        self.push(entry.task, entry.period, next);
        Some(entry.task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(s: &mut Scheduler, now: Instant) -> Vec<Task> {
        std::iter::from_fn(|| s.pop_due(now)).collect()
    }

    #[test]
    fn tasks_fire_at_their_own_rates() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.every(Task::Poll, ms(500), t0);
        s.every(Task::EndCheck, ms(200), t0);
        s.every(Task::Frame, ms(50), t0);

        assert!(drain(&mut s, t0).is_empty());
        assert_eq!(s.next_timeout(t0), ms(50));

        let mut counts = [0usize; 3];
        let mut now = t0;
        for _ in 0..20 {
            now += ms(50);
            for task in drain(&mut s, now) {
                counts[task as usize] += 1;
            }
        }
        // one second of simulated time
        assert_eq!(counts, [2, 5, 20]);
    }

    #[test]
    fn earliest_due_is_served_first() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.every(Task::Poll, ms(500), t0);
        s.every(Task::Frame, ms(50), t0);
        assert_eq!(s.pop_due(t0 + ms(600)), Some(Task::Frame));
        assert_eq!(s.pop_due(t0 + ms(600)), Some(Task::Poll));
    }

    #[test]
    fn a_late_loop_does_not_burst() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.every(Task::Frame, ms(50), t0);
        // the loop stalled for a whole second
        let late = t0 + ms(1000);
        assert_eq!(drain(&mut s, late), vec![Task::Frame]);
        assert_eq!(s.next_timeout(late), ms(50));
    }

    #[test]
    fn empty_scheduler_waits_a_default_interval() {
        let s = Scheduler::new();
        assert_eq!(s.next_timeout(Instant::now()), ms(100));
    }
}
