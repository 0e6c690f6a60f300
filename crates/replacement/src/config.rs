//! Configuration system for the replacement simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! simulator. It provides:
//! 1. **Defaults:** Baseline constants (promotion vector, insertion rank, cache geometry).
//! 2. **Structures:** Config for the replacement policy and the cache model.
//! 3. **Loading:** JSON deserialization via serde, with per-field fallbacks.

use serde::Deserialize;

/// Number of entries in the promotion vector.
///
/// The vector is consulted only for source ranks below this arity; a touch on
/// any higher rank leaves the rank unchanged. The policy is sized for 16-way
/// sets and the arity is deliberately not configurable.
pub const IPV_ARITY: usize = 16;

/// A fixed current-rank → target-rank mapping.
///
/// `vector[r]` is the rank an entry at rank `r` moves to when touched, for
/// `r` in `0..IPV_ARITY`. Out-of-domain ranks map to themselves.
pub type PromotionVector = [usize; IPV_ARITY];

/// Smallest ranking population for which victim selection is allowed.
///
/// A policy constant, not a configuration knob: selecting a victim before
/// the ranking is warm enough to be meaningful is a usage error.
pub const MIN_POPULATION: usize = IPV_ARITY;

/// Default configuration constants for the simulator.
mod defaults {
    use super::{IPV_ARITY, PromotionVector};

    /// Default promotion vector.
    ///
    /// Promotes aggressively near the head of the ranking and conservatively
    /// toward the tail; rank 15 is promoted only to the insertion point.
    pub const PROMOTION_VECTOR: PromotionVector =
        [0, 0, 1, 0, 3, 0, 1, 2, 1, 0, 5, 1, 0, 0, 1, 11];

    /// Rank assigned to a line when it is filled or reset.
    ///
    /// Freshly filled lines start at a mid-list probationary position rather
    /// than at the most-favored rank.
    pub const INSERTION_RANK: usize = 11;

    /// Default cache size in bytes (16 KiB).
    pub const CACHE_SIZE: usize = 16 * 1024;

    /// Default cache line size in bytes (64 bytes).
    pub const CACHE_LINE: usize = 64;

    /// Default cache associativity.
    ///
    /// Matches the promotion vector arity: a set can only overflow once at
    /// least [`IPV_ARITY`] lines have been filled, which keeps the victim
    /// selection population precondition satisfied by construction.
    pub const CACHE_WAYS: usize = IPV_ARITY;

    /// Default cache access latency in cycles.
    pub const CACHE_LATENCY: u64 = 1;
}

/// Replacement policy configuration.
///
/// The promotion vector and insertion rank are fixed for the lifetime of a
/// policy instance; they are read once at construction.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Current-rank → target-rank mapping consulted on every touch.
    #[serde(default = "PolicyConfig::default_promotions")]
    pub promotions: PromotionVector,

    /// Rank assigned by `reset`; clamped to the tail while the ranking is
    /// still shorter than this.
    #[serde(default = "PolicyConfig::default_insertion_rank")]
    pub insertion_rank: usize,
}

impl PolicyConfig {
    /// Returns the default promotion vector.
    fn default_promotions() -> PromotionVector {
        defaults::PROMOTION_VECTOR
    }

    /// Returns the default insertion rank.
    fn default_insertion_rank() -> usize {
        defaults::INSERTION_RANK
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            promotions: defaults::PROMOTION_VECTOR,
            insertion_rank: defaults::INSERTION_RANK,
        }
    }
}

/// Cache model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Enable the cache; when false, accesses bypass it entirely.
    #[serde(default = "CacheConfig::default_enabled")]
    pub enabled: bool,

    /// Total cache size in bytes.
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes.
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways).
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Access latency in cycles.
    #[serde(default = "CacheConfig::default_latency")]
    pub latency: u64,
}

impl CacheConfig {
    /// Returns the default enabled state.
    fn default_enabled() -> bool {
        true
    }

    /// Returns the default cache size in bytes.
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default cache line size in bytes.
    fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Returns the default cache associativity (number of ways).
    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Returns the default cache access latency in cycles.
    fn default_latency() -> u64 {
        defaults::CACHE_LATENCY
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
            latency: defaults::CACHE_LATENCY,
        }
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use ipvsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.policy.insertion_rank, 11);
/// assert_eq!(config.cache.ways, 16);
/// ```
///
/// Deserializing from JSON; omitted fields fall back to their defaults:
///
/// ```
/// use ipvsim_core::config::Config;
///
/// let json = r#"{
///     "cache": {
///         "size_bytes": 32768,
///         "line_bytes": 64,
///         "ways": 16,
///         "latency": 2
///     },
///     "policy": {
///         "insertion_rank": 13
///     }
/// }"#;
///
/// let config = Config::from_json(json)?;
/// assert_eq!(config.cache.size_bytes, 32768);
/// assert_eq!(config.policy.insertion_rank, 13);
/// assert_eq!(config.cache.latency, 2);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cache model configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Replacement policy configuration.
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl Config {
    /// Parses a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error when the document is malformed or a
    /// field has the wrong shape (e.g. a promotion vector that is not exactly
    /// [`IPV_ARITY`] entries long).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
