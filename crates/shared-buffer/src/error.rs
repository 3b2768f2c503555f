//! Buffer Error Types

use thiserror::Error;

/// Errors surfaced by shared buffer operations.
///
/// Transient "no data yet" outcomes are not errors; they are reported
/// as `Ok(None)` by [`SharedBuffer::try_read`](crate::SharedBuffer::try_read)
/// and [`SharedBuffer::try_remove`](crate::SharedBuffer::try_remove).
#[derive(Debug, Clone, Error)]
pub enum BufferError {
    /// A collaborator thread panicked while holding the buffer lock,
    /// so the chain state can no longer be trusted.
    #[error("shared buffer lock poisoned by a panicked collaborator thread")]
    Poisoned,
}
