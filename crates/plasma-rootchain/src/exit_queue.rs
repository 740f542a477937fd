//! Exit registry paired with its priority queue.
//!
//! Every exit ever started stays in the registry, so its key can never be
//! reused. The queue holds the keys still waiting for the finalizer; it
//! may contain keys whose exit was challenged in the meantime, which the
//! finalizer drops when they surface.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use plasma_types::{Exit, ExitState, PlasmaError, Result};
use rust_decimal::Decimal;

use crate::priority_queue::PriorityQueue;

/// Exits keyed by `K`, served in ascending key order.
#[derive(Debug, Clone)]
pub struct ExitQueue<K> {
    exits: HashMap<K, Exit>,
    queue: PriorityQueue<K>,
}

impl<K> ExitQueue<K>
where
    K: Ord + Hash + Copy + Display,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            exits: HashMap::new(),
            queue: PriorityQueue::new(),
        }
    }

    /// State of the exit under `key`; [`ExitState::None`] if never started.
    #[must_use]
    pub fn state(&self, key: &K) -> ExitState {
        self.exits.get(key).map_or(ExitState::None, |e| e.state)
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&Exit> {
        self.exits.get(key)
    }

    /// Fail unless no exit was ever started under `key`.
    ///
    /// # Errors
    /// Returns [`PlasmaError::DuplicateExit`] if the key is taken.
    pub fn ensure_vacant(&self, key: &K) -> Result<()> {
        if self.exits.contains_key(key) {
            return Err(PlasmaError::DuplicateExit {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    /// The PENDING exit under `key`.
    ///
    /// # Errors
    /// Returns [`PlasmaError::NoPendingExit`] if there is none.
    pub fn pending(&self, key: &K) -> Result<&Exit> {
        self.exits
            .get(key)
            .filter(|e| e.is_pending())
            .ok_or_else(|| PlasmaError::NoPendingExit {
                key: key.to_string(),
            })
    }

    /// Register a new PENDING exit and enqueue its key.
    ///
    /// # Errors
    /// Returns [`PlasmaError::DuplicateExit`] if the key is taken, or
    /// [`PlasmaError::InvalidStateTransition`] if `exit` is not PENDING.
    pub fn insert(&mut self, key: K, exit: Exit) -> Result<()> {
        self.ensure_vacant(&key)?;
        if !exit.is_pending() {
            return Err(PlasmaError::InvalidStateTransition {
                from: ExitState::None,
                to: exit.state,
            });
        }
        self.exits.insert(key, exit);
        self.queue.insert(key);
        Ok(())
    }

    /// Move the exit under `key` from PENDING to CHALLENGED.
    ///
    /// The key stays queued; the finalizer discards it later.
    pub fn challenge(&mut self, key: &K) -> Result<&Exit> {
        let exit = self
            .exits
            .get_mut(key)
            .ok_or_else(|| PlasmaError::NoPendingExit {
                key: key.to_string(),
            })?;
        if !exit.is_pending() {
            return Err(PlasmaError::NoPendingExit {
                key: key.to_string(),
            });
        }
        exit.mark_challenged()?;
        Ok(&*exit)
    }

    /// The smallest queued key and its exit.
    #[must_use]
    pub fn peek(&self) -> Option<(K, &Exit)> {
        let key = *self.queue.get_min()?;
        self.exits.get(&key).map(|exit| (key, exit))
    }

    /// Dequeue the smallest key without touching its exit.
    pub fn pop(&mut self) -> Option<K> {
        self.queue.del_min()
    }

    /// Dequeue the smallest key and mark its exit FINALIZED.
    ///
    /// # Errors
    /// Returns [`PlasmaError::NoPendingExit`] if the queue is empty or the
    /// head exit is not PENDING. Nothing is dequeued on error.
    pub fn finalize_head(&mut self) -> Result<(K, Exit)> {
        let key = *self
            .queue
            .get_min()
            .ok_or_else(|| PlasmaError::NoPendingExit {
                key: "<empty queue>".to_string(),
            })?;
        let exit = self
            .exits
            .get_mut(&key)
            .filter(|e| e.is_pending())
            .ok_or_else(|| PlasmaError::NoPendingExit {
                key: key.to_string(),
            })?;
        exit.mark_finalized()?;
        let finalized = exit.clone();
        self.queue.del_min();
        Ok((key, finalized))
    }

    /// Number of keys still queued.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.size()
    }

    /// Sum of bonds held by PENDING exits.
    #[must_use]
    pub fn pending_bonds(&self) -> Decimal {
        self.exits
            .values()
            .filter(|e| e.is_pending())
            .map(|e| e.bond)
            .sum()
    }
}

impl<K> Default for ExitQueue<K>
where
    K: Ord + Hash + Copy + Display,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use plasma_types::{Address, Priority, UtxoPosition};

    use super::*;

    fn exit(amount: i64) -> Exit {
        Exit::pending(
            Address::from_seed(1),
            Decimal::new(amount, 0),
            Decimal::new(5, 0),
            UtxoPosition::new(1, 0, 0),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn unknown_key_is_none() {
        let q: ExitQueue<Priority> = ExitQueue::new();
        assert_eq!(q.state(&Priority(1)), ExitState::None);
        assert!(q.peek().is_none());
        assert!(q.ensure_vacant(&Priority(1)).is_ok());
    }

    #[test]
    fn insert_registers_and_enqueues() {
        let mut q = ExitQueue::new();
        q.insert(Priority(9), exit(10)).unwrap();
        assert_eq!(q.state(&Priority(9)), ExitState::Pending);
        assert_eq!(q.queued(), 1);
        assert!(q.get(&Priority(9)).is_some());
        assert_eq!(q.peek().unwrap().0, Priority(9));
    }

    #[test]
    fn duplicate_insert_rejected() {
        let mut q = ExitQueue::new();
        q.insert(Priority(9), exit(10)).unwrap();
        let err = q.insert(Priority(9), exit(20)).unwrap_err();
        assert!(matches!(err, PlasmaError::DuplicateExit { .. }));
        assert_eq!(q.get(&Priority(9)).unwrap().amount, Decimal::new(10, 0));
        assert_eq!(q.queued(), 1);
    }

    #[test]
    fn non_pending_insert_rejected() {
        let mut q = ExitQueue::new();
        let mut done = exit(10);
        done.mark_finalized().unwrap();
        assert!(q.insert(Priority(1), done).is_err());
        assert!(q.get(&Priority(1)).is_none());
        assert_eq!(q.queued(), 0);
    }

    #[test]
    fn challenge_keeps_key_queued() {
        let mut q = ExitQueue::new();
        q.insert(Priority(3), exit(10)).unwrap();
        q.challenge(&Priority(3)).unwrap();
        assert_eq!(q.state(&Priority(3)), ExitState::Challenged);
        assert_eq!(q.queued(), 1);

        let err = q.challenge(&Priority(3)).unwrap_err();
        assert!(matches!(err, PlasmaError::NoPendingExit { .. }));
        let err = q.challenge(&Priority(4)).unwrap_err();
        assert!(matches!(err, PlasmaError::NoPendingExit { .. }));
    }

    #[test]
    fn challenged_key_never_reusable() {
        let mut q = ExitQueue::new();
        q.insert(Priority(3), exit(10)).unwrap();
        q.challenge(&Priority(3)).unwrap();
        q.pop();
        assert!(q.insert(Priority(3), exit(10)).is_err());
    }

    #[test]
    fn finalize_head_serves_smallest_first() {
        let mut q = ExitQueue::new();
        q.insert(Priority(7), exit(70)).unwrap();
        q.insert(Priority(3), exit(30)).unwrap();

        let (key, e) = q.finalize_head().unwrap();
        assert_eq!(key, Priority(3));
        assert_eq!(e.state, ExitState::Finalized);
        assert_eq!(q.state(&Priority(3)), ExitState::Finalized);
        assert_eq!(q.peek().unwrap().0, Priority(7));
    }

    #[test]
    fn finalize_head_refuses_challenged_head() {
        let mut q = ExitQueue::new();
        q.insert(Priority(3), exit(30)).unwrap();
        q.challenge(&Priority(3)).unwrap();
        assert!(q.finalize_head().is_err());
        assert_eq!(q.queued(), 1);
    }

    #[test]
    fn pending_bonds_ignore_terminal_exits() {
        let mut q = ExitQueue::new();
        q.insert(Priority(1), exit(10)).unwrap();
        q.insert(Priority(2), exit(10)).unwrap();
        q.insert(Priority(3), exit(10)).unwrap();
        q.challenge(&Priority(2)).unwrap();
        q.finalize_head().unwrap();
        assert_eq!(q.pending_bonds(), Decimal::new(5, 0));
    }
}
