//! Wake-up registries.
//!
//! Blocked operations park on a `oneshot::Receiver<()>`; the matching sender
//! sits in one of two registries until the board fires it:
//!
//! - `CellWaiters`: per-position FIFO queues, for flips waiting on a busy card
//! - `ChangeWaiters`: a flat list, for watchers waiting on any visible change
//!
//! A wake-up is a hint. The woken task always re-reads the board before
//! acting on it.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tokio::sync::oneshot;

use crate::core::Position;

/// Receiving half handed to a parked task.
pub type Wake = oneshot::Receiver<()>;

/// Per-cell FIFO queues of pending wake-ups.
#[derive(Debug, Default)]
pub struct CellWaiters {
    queues: FxHashMap<Position, VecDeque<oneshot::Sender<()>>>,
}

impl CellWaiters {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a new waiter for `pos`.
    pub fn register(&mut self, pos: Position) -> Wake {
        let (tx, rx) = oneshot::channel();
        self.queues.entry(pos).or_default().push_back(tx);
        rx
    }

    /// Wake the oldest waiter on `pos` that is still listening.
    ///
    /// Waiters whose receivers were dropped are discarded on the way.
    /// Returns `true` if a waiter was woken.
    pub fn wake_one(&mut self, pos: Position) -> bool {
        let Some(queue) = self.queues.get_mut(&pos) else {
            return false;
        };

        let mut woke = false;
        while let Some(tx) = queue.pop_front() {
            if tx.send(()).is_ok() {
                woke = true;
                break;
            }
        }

        if queue.is_empty() {
            self.queues.remove(&pos);
        }
        woke
    }

    /// Wake every waiter on `pos`. Returns how many were listening.
    pub fn wake_all(&mut self, pos: Position) -> usize {
        self.queues
            .remove(&pos)
            .map(|queue| {
                queue
                    .into_iter()
                    .map(|tx| tx.send(()))
                    .filter(Result::is_ok)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Number of live waiters on `pos`.
    #[must_use]
    pub fn waiting(&self, pos: Position) -> usize {
        self.queues
            .get(&pos)
            .map_or(0, |queue| queue.iter().filter(|tx| !tx.is_closed()).count())
    }
}

/// Pending wake-ups for "something visible changed".
#[derive(Debug, Default)]
pub struct ChangeWaiters {
    pending: Vec<oneshot::Sender<()>>,
}

impl ChangeWaiters {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register for the next broadcast.
    pub fn register(&mut self) -> Wake {
        let (tx, rx) = oneshot::channel();
        self.pending.push(tx);
        rx
    }

    /// Fire and clear every pending wake-up. Returns how many were listening.
    pub fn broadcast(&mut self) -> usize {
        self.pending
            .drain(..)
            .map(|tx| tx.send(()))
            .filter(Result::is_ok)
            .count()
    }

    /// Number of live watchers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.iter().filter(|tx| !tx.is_closed()).count()
    }

    /// True when nobody is watching.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wake_one_is_fifo() {
        let mut waiters = CellWaiters::new();
        let pos = Position::new(0, 0);

        let mut first = waiters.register(pos);
        let mut second = waiters.register(pos);
        assert_eq!(waiters.waiting(pos), 2);

        assert!(waiters.wake_one(pos));
        assert!(first.try_recv().is_ok());
        assert!(second.try_recv().is_err());
        assert_eq!(waiters.waiting(pos), 1);

        assert!(waiters.wake_one(pos));
        assert!(second.try_recv().is_ok());
        assert_eq!(waiters.waiting(pos), 0);

        assert!(!waiters.wake_one(pos));
    }

    #[test]
    fn test_wake_one_skips_dropped_receivers() {
        let mut waiters = CellWaiters::new();
        let pos = Position::new(1, 2);

        let abandoned = waiters.register(pos);
        let mut live = waiters.register(pos);
        drop(abandoned);
        assert_eq!(waiters.waiting(pos), 1);

        assert!(waiters.wake_one(pos));
        assert!(live.try_recv().is_ok());
    }

    #[test]
    fn test_wake_all() {
        let mut waiters = CellWaiters::new();
        let pos = Position::new(0, 1);
        let other = Position::new(1, 1);

        let mut a = waiters.register(pos);
        let mut b = waiters.register(pos);
        let mut c = waiters.register(other);

        assert_eq!(waiters.wake_all(pos), 2);
        assert!(a.try_recv().is_ok());
        assert!(b.try_recv().is_ok());
        assert!(c.try_recv().is_err());
        assert_eq!(waiters.waiting(pos), 0);
        assert_eq!(waiters.waiting(other), 1);
    }

    #[test]
    fn test_broadcast_clears_registry() {
        let mut changes = ChangeWaiters::new();
        let mut a = changes.register();
        let mut b = changes.register();
        assert_eq!(changes.len(), 2);

        assert_eq!(changes.broadcast(), 2);
        assert!(a.try_recv().is_ok());
        assert!(b.try_recv().is_ok());
        assert!(changes.is_empty());

        // Late registration waits for the next broadcast
        let mut late = changes.register();
        assert!(late.try_recv().is_err());
        assert_eq!(changes.broadcast(), 1);
        assert!(late.try_recv().is_ok());
    }
}
