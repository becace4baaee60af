//! Cooperative scheduler on a virtual clock
//!
//! Deferred round-pacing work is queued as `(deadline, task)` pairs and
//! released by the same tick that drives reel physics. Tasks are one-shot:
//! each fires exactly once, in deadline order (insertion order on ties), and
//! cannot be cancelled short of dropping the scheduler.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Scheduled<T> {
    deadline_ms: f64,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    // Reversed: BinaryHeap is a max-heap, earliest deadline must pop first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline_ms
            .total_cmp(&self.deadline_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Deadline-ordered queue of one-shot tasks
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Scheduled<T>>,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Queue `task` to fire once the clock reaches `deadline_ms`
    pub fn schedule(&mut self, deadline_ms: f64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled {
            deadline_ms,
            seq,
            task,
        });
    }

    /// Remove and return the earliest task due at `now_ms`
    pub fn pop_due(&mut self, now_ms: f64) -> Option<T> {
        if self.queue.peek()?.deadline_ms <= now_ms {
            self.queue.pop().map(|s| s.task)
        } else {
            None
        }
    }

    /// Deadline of the next pending task
    pub fn next_deadline(&self) -> Option<f64> {
        self.queue.peek().map(|s| s.deadline_ms)
    }

    /// Number of pending tasks
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
