//! Placeholder identities for files that have not been uploaded yet.
//!
//! The generator is injected so tests can predict identities. The
//! [`SelectionStore`](crate::SelectionStore) skips any value that is
//! already in use or was retired, so a generator only has to avoid
//! repeating itself.

use crate::types::EntryId;

/// Source of placeholder identities.
pub trait IdGenerator {
    /// Produce the next candidate identity.
    fn next_id(&mut self) -> EntryId;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> EntryId,
{
    fn next_id(&mut self) -> EntryId {
        self()
    }
}

/// Monotonic numeric identities.
///
/// Starts in a high range by default so that placeholders are easy to
/// tell apart from typical auto-increment database keys.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    /// First identity handed out by [`SequentialIds::default`].
    pub const DEFAULT_START: u64 = 1_000_000;

    /// Start counting at `first`.
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self { next: first }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(Self::DEFAULT_START)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> EntryId {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        EntryId::Number(id)
    }
}
