//! Insertion/promotion-vector cache replacement simulator library.
//!
//! This crate implements the LRU-IPV replacement policy and a small
//! set-associative cache model around it:
//! 1. **Policy:** A shared ranking of per-line metadata with promotion on
//!    touch, demotion on invalidate, probationary insertion on reset, and
//!    rank-maximal victim selection.
//! 2. **Cache:** A set-associative host that drives the policy through
//!    opaque per-line tokens and models hit/miss/write-back behavior.
//! 3. **Configuration:** JSON-loadable settings for the promotion vector,
//!    insertion rank, and cache geometry.
//! 4. **Statistics:** Access and eviction counters with a report printer.
//!
//! # Example
//!
//! ```
//! use ipvsim_core::config::PolicyConfig;
//! use ipvsim_core::policy::{LruIpv, ReplacementPolicy};
//!
//! let mut policy = LruIpv::new(&PolicyConfig::default());
//! let lines: Vec<_> = (0..16).map(|_| policy.instantiate_entry()).collect();
//! for &line in &lines {
//!     policy.reset(line)?;
//! }
//! policy.touch(lines[3])?;
//! let victim = policy.select_victim(&lines)?;
//! assert!(policy.rank_of(victim).is_none());
//! # Ok::<(), ipvsim_core::error::PolicyError>(())
//! ```

/// Set-associative cache model driving the replacement policy.
pub mod cache;
/// Simulator configuration (defaults, promotion vector, cache geometry).
pub mod config;
/// Replacement policy error definitions.
pub mod error;
/// Replacement policies and the host-facing policy interface.
pub mod policy;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Cache model; construct with [`Cache::new`] or inject a policy with
/// [`Cache::with_policy`].
pub use crate::cache::Cache;
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Contract-violation errors raised by policy operations.
pub use crate::error::PolicyError;
/// The policy interface and its LRU-IPV implementation.
pub use crate::policy::{EntryToken, LruIpv, ReplacementPolicy};
