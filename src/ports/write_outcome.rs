//! Result of a conditional (compare-and-set) write.

/// Outcome of a write guarded by an expected current value.
///
/// Implementations must make the check and the write a single atomic step
/// (a `WHERE ... AND column = $expected` update, or a held lock).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The stored value matched and the write was applied.
    Applied,
    /// The stored value had changed; nothing was written.
    Conflict,
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }
}
