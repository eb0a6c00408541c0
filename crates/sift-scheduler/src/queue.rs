//! FIFO stage queue preserving resolution order.

use sift_core::target::TestTarget;
use std::collections::VecDeque;

/// Targets awaiting dispatch within one stage. Dispatch order follows
/// resolution order: when several environments are free, the earliest
/// queued target places first.
#[derive(Debug)]
pub struct StageQueue {
    pending: VecDeque<TestTarget>,
}

impl StageQueue {
    pub fn new(targets: Vec<TestTarget>) -> Self {
        Self {
            pending: targets.into(),
        }
    }

    /// Remove and return the first queued target the placement function
    /// accepts, along with its placement. Targets the function declines stay
    /// queued in their original order. The placement function runs at most
    /// once per target per call: its side effects (resource acquisition)
    /// commit the dispatch.
    pub fn take_first<P, F>(&mut self, mut place: F) -> Option<(TestTarget, P)>
    where
        F: FnMut(&TestTarget) -> Option<P>,
    {
        for idx in 0..self.pending.len() {
            if let Some(placement) = place(&self.pending[idx]) {
                let target = self.pending.remove(idx).expect("index in range");
                return Some((target, placement));
            }
        }
        None
    }

    /// Drain every remaining target, preserving order.
    pub fn drain(&mut self) -> Vec<TestTarget> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
