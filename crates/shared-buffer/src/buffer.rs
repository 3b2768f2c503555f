//! Monitor coordinating the producer, read role, and remove role.
//!
//! One mutex guards the node chain and the termination flag. Two
//! condition variables carry the protocol signals: `data_available`
//! (new node appended, the read role may proceed) and `safe_to_remove`
//! (the read cursor passed a node, the remove role may reclaim it).
//! A startup barrier lets all collaborators rendezvous once before
//! steady-state operation, and a termination flag set by `shutdown`
//! is the only mechanism that cancels a blocked wait.

use std::sync::{Barrier, Condvar, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::chain::NodeChain;
use crate::error::BufferError;

/// Shared buffer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Number of collaborator threads meeting at the startup barrier
    /// (producer plus consumer roles).
    pub barrier_parties: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { barrier_parties: 3 }
    }
}

/// Which cursor a blocking wait watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Wait until the read cursor has a node to deliver.
    NextRead,
    /// Wait until the oldest node is read-complete and removable.
    Oldest,
}

/// Outcome of a blocking wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The watched cursor is ready; data can be taken without blocking.
    DataAvailable,
    /// The buffer was shut down while waiting (or before the wait began).
    Terminated,
}

struct Shared<T> {
    chain: NodeChain<T>,
    terminated: bool,
}

/// Unbounded FIFO buffer shared between one producer and two consumer
/// roles. Every element is observed by the read role, in insertion
/// order, before the remove role may reclaim it.
///
/// All operations lock for the duration of their chain mutation and
/// never block, except [`wait_for_data`](Self::wait_for_data) and the
/// startup rendezvous in [`wait_ready`](Self::wait_ready).
pub struct SharedBuffer<T> {
    shared: Mutex<Shared<T>>,
    data_available: Condvar,
    safe_to_remove: Condvar,
    ready: Barrier,
}

impl<T> SharedBuffer<T> {
    /// Creates an empty buffer. Initialization is all-or-nothing: the
    /// chain starts with no nodes and all cursors unset.
    pub fn new(config: BufferConfig) -> Self {
        Self {
            shared: Mutex::new(Shared {
                chain: NodeChain::new(),
                terminated: false,
            }),
            data_available: Condvar::new(),
            safe_to_remove: Condvar::new(),
            ready: Barrier::new(config.barrier_parties),
        }
    }

    /// Blocks until every collaborator has called this once. Run it at
    /// the top of each collaborator thread so nobody starts steady-state
    /// work before the others exist.
    pub fn wait_ready(&self) {
        self.ready.wait();
    }

    /// Appends one reading at the newest cursor and wakes waiters
    /// blocked on data availability. Never blocks; the buffer is
    /// unbounded and applies no backpressure.
    pub fn insert(&self, element: T) -> Result<(), BufferError> {
        let mut shared = self.lock()?;
        shared.chain.append(element);
        trace!(len = shared.chain.len(), "reading inserted");
        drop(shared);
        self.data_available.notify_all();
        Ok(())
    }

    /// Blocks until the watched cursor is ready or the buffer is shut
    /// down. The lock is released while parked and reacquired before
    /// returning. Termination wins when both hold on wakeup, so a wait
    /// issued after shutdown is cancelled immediately.
    pub fn wait_for_data(&self, cursor: Cursor) -> Result<WaitOutcome, BufferError> {
        let mut shared = self.lock()?;
        loop {
            if shared.terminated {
                return Ok(WaitOutcome::Terminated);
            }
            let ready = match cursor {
                Cursor::NextRead => shared.chain.has_unread(),
                Cursor::Oldest => shared.chain.front_removable(),
            };
            if ready {
                return Ok(WaitOutcome::DataAvailable);
            }
            let condvar = match cursor {
                Cursor::NextRead => &self.data_available,
                Cursor::Oldest => &self.safe_to_remove,
            };
            shared = condvar.wait(shared).map_err(|_| BufferError::Poisoned)?;
        }
    }

    /// Delivers the reading at the read cursor, marks it safe to
    /// remove, and wakes waiters blocked on removability. Returns
    /// `Ok(None)` when nothing unread is present; callers that prefer
    /// to block should gate on [`wait_for_data`](Self::wait_for_data)
    /// with [`Cursor::NextRead`] first.
    pub fn try_read(&self) -> Result<Option<T>, BufferError>
    where
        T: Clone,
    {
        let mut shared = self.lock()?;
        match shared.chain.read_advance() {
            Some(element) => {
                trace!(len = shared.chain.len(), "reading delivered to read role");
                drop(shared);
                self.safe_to_remove.notify_all();
                Ok(Some(element))
            }
            None => Ok(None),
        }
    }

    /// Reclaims the oldest reading, provided the read role has already
    /// observed it. Returns `Ok(None)` when the chain is empty or its
    /// oldest node is still unread; callers retry later rather than
    /// block, which keeps the remove role from deadlocking behind a
    /// stalled read role.
    pub fn try_remove(&self) -> Result<Option<T>, BufferError> {
        let mut shared = self.lock()?;
        match shared.chain.pop_front() {
            Some(element) => {
                trace!(len = shared.chain.len(), "reading removed");
                Ok(Some(element))
            }
            None => Ok(None),
        }
    }

    /// Sets the termination flag and wakes every blocked waiter on both
    /// conditions. Non-blocking operations may still drain existing
    /// data afterwards; new blocking waits return
    /// [`WaitOutcome::Terminated`] immediately.
    pub fn shutdown(&self) -> Result<(), BufferError> {
        let mut shared = self.lock()?;
        shared.terminated = true;
        debug!(len = shared.chain.len(), "shutdown signalled, waking all waiters");
        drop(shared);
        self.data_available.notify_all();
        self.safe_to_remove.notify_all();
        Ok(())
    }

    pub fn is_terminated(&self) -> Result<bool, BufferError> {
        Ok(self.lock()?.terminated)
    }

    /// Number of readings inserted but not yet removed.
    pub fn len(&self) -> Result<usize, BufferError> {
        Ok(self.lock()?.chain.len())
    }

    pub fn is_empty(&self) -> Result<bool, BufferError> {
        Ok(self.lock()?.chain.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Shared<T>>, BufferError> {
        self.shared.lock().map_err(|_| BufferError::Poisoned)
    }
}
