//! Replacement policy error definitions.
//!
//! Every failure surfaced by the policy is a contract violation on the caller's
//! side: operating on an entry that holds no rank, selecting a victim from an
//! empty or under-populated ranking, or handing the policy a token it never
//! issued. None of these are recoverable runtime conditions; the host must
//! stop rather than continue with a ranking it can no longer trust.

use thiserror::Error;

use crate::policy::EntryToken;

/// Contract violations raised by replacement policy operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Victim selection was requested with no candidates.
    #[error("no replacement candidates supplied")]
    EmptyCandidates,

    /// Victim selection was requested before the ranking reached the
    /// policy's minimum population.
    #[error("ranking holds {have} entries but victim selection requires {need}")]
    Underpopulated {
        /// Entries currently ranked.
        have: usize,
        /// The policy's minimum population.
        need: usize,
    },

    /// The operation requires the entry to hold a rank, but it was never
    /// inserted (or was removed by victim selection and not yet refilled).
    #[error("entry {0} holds no rank")]
    NotRanked(EntryToken),

    /// The token was not issued by this policy instance.
    #[error("entry {0} is not managed by this policy instance")]
    UnknownEntry(EntryToken),
}
