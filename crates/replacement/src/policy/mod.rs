//! Cache Replacement Policies.
//!
//! Defines the host-facing policy interface and its LRU-IPV implementation.
//!
//! The host model owns cache sets and lines; the policy owns a single ranking
//! of per-line metadata records. The two sides communicate through opaque
//! [`EntryToken`]s: the host obtains one token per line from
//! [`ReplacementPolicy::instantiate_entry`] and hands it back on every hit,
//! invalidation, fill, and eviction decision. Tokens carry no behavior of
//! their own: the policy resolves them against its own metadata store, so a
//! stale or foreign token surfaces as an error instead of corrupting state.

use std::fmt;

/// Insertion/Promotion-Vector LRU replacement policy.
pub mod lru_ipv;

pub use lru_ipv::LruIpv;

use crate::error::PolicyError;

/// Opaque handle to one cache line's replacement metadata.
///
/// Issued by [`ReplacementPolicy::instantiate_entry`]; valid only for the
/// policy instance that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryToken(pub(crate) usize);

impl fmt::Display for EntryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Trait for cache replacement policies.
///
/// Defines the interface for maintaining per-line recency state and selecting
/// victim lines. All operations are synchronous and must be serialized by the
/// host; a returned error means the call violated a precondition and the
/// ranking was left untouched.
pub trait ReplacementPolicy: fmt::Debug + Send + Sync {
    /// Allocates replacement metadata for a new cache line.
    ///
    /// The returned token holds no rank until the host calls
    /// [`reset`](Self::reset) for it.
    fn instantiate_entry(&mut self) -> EntryToken;

    /// Updates the ranking when a line is accessed (cache hit).
    ///
    /// # Errors
    ///
    /// Fails if the entry holds no rank or was issued by another instance.
    fn touch(&mut self, entry: EntryToken) -> Result<(), PolicyError>;

    /// Demotes a line to least-favored status on explicit invalidation.
    ///
    /// # Errors
    ///
    /// Fails if the entry holds no rank or was issued by another instance.
    fn invalidate(&mut self, entry: EntryToken) -> Result<(), PolicyError>;

    /// Assigns a line its default rank when it is filled or reset.
    ///
    /// # Errors
    ///
    /// Fails if the entry was issued by another instance.
    fn reset(&mut self, entry: EntryToken) -> Result<(), PolicyError>;

    /// Selects a victim line to evict from the given candidates.
    ///
    /// The victim leaves the ranking; the host is expected to call
    /// [`reset`](Self::reset) (or [`touch`](Self::touch)) once the line is
    /// refilled.
    ///
    /// # Errors
    ///
    /// Fails if `candidates` is empty, the ranking population is below the
    /// configured minimum, or any candidate holds no rank.
    fn select_victim(&mut self, candidates: &[EntryToken]) -> Result<EntryToken, PolicyError>;
}
