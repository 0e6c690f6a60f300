//! Cache Model Unit Tests.
//!
//! Verifies the set-associative cache around the LRU-IPV policy: hit/miss
//! logic, fills, policy-driven eviction, write-back penalties, explicit
//! invalidation, flushing, and statistics.
//!
//! The cache is constructed directly from `Config`; no trace runner needed.

use pretty_assertions::assert_eq;

use ipvsim_core::cache::Cache;
use ipvsim_core::config::{CacheConfig, Config, PolicyConfig};
use ipvsim_core::error::PolicyError;
use ipvsim_core::policy::LruIpv;

// ──────────────────────────────────────────────────────────
// Helper: build a simple test cache
// ──────────────────────────────────────────────────────────

/// Creates a small, deterministic test cache.
///
/// 2 KiB, 64-byte lines, 16-way set-associative, default LRU-IPV policy.
///
/// With these parameters:
///   - num_lines = 2048 / 64 = 32
///   - num_sets  = 32 / 16 = 2
///
/// Set index = (addr / 64) % 2
/// Tag       = addr / 128
fn test_config() -> Config {
    Config {
        cache: CacheConfig {
            enabled: true,
            size_bytes: 2048,
            line_bytes: 64,
            ways: 16,
            latency: 1,
        },
        policy: PolicyConfig::default(),
    }
}

/// Next-level (e.g., L2/DRAM) latency for write-back penalty calculations.
const NEXT_LEVEL_LATENCY: u64 = 10;

/// Address of the `k`-th distinct line mapping to set 0.
fn set0_addr(k: u64) -> u64 {
    k * 128
}

// ══════════════════════════════════════════════════════════
// 1. Hits and misses
// ══════════════════════════════════════════════════════════

/// First access to any address is a compulsory (cold) miss with no
/// write-back penalty.
#[test]
fn cold_miss_returns_miss_no_penalty() -> Result<(), PolicyError> {
    let mut cache = Cache::new(&test_config());

    let (hit, penalty) = cache.access(0x1000, false, NEXT_LEVEL_LATENCY)?;

    assert!(!hit, "first access should be a miss");
    assert_eq!(penalty, 0, "no dirty victim to write back on a cold miss");
    Ok(())
}

/// Second access to the same address hits with zero penalty.
#[test]
fn warm_hit_returns_hit_zero_penalty() -> Result<(), PolicyError> {
    let mut cache = Cache::new(&test_config());

    let _ = cache.access(0x1000, false, NEXT_LEVEL_LATENCY)?;
    let (hit, penalty) = cache.access(0x1000, false, NEXT_LEVEL_LATENCY)?;

    assert!(hit, "second access should hit");
    assert_eq!(penalty, 0, "hits incur no penalty cycles");
    Ok(())
}

/// Access to a different offset within the same cache line hits.
#[test]
fn same_line_different_offset_hits() -> Result<(), PolicyError> {
    let mut cache = Cache::new(&test_config());

    let _ = cache.access(0x1000, false, NEXT_LEVEL_LATENCY)?;
    let (hit, _) = cache.access(0x1000 + 32, false, NEXT_LEVEL_LATENCY)?;

    assert!(hit, "different offset in the same 64-byte line should hit");
    Ok(())
}

// ══════════════════════════════════════════════════════════
// 2. Fills and eviction
// ══════════════════════════════════════════════════════════

/// Filling every way of a set only consumes invalid ways; no eviction
/// happens until the set overflows.
#[test]
fn filling_a_set_never_evicts() -> Result<(), PolicyError> {
    let mut cache = Cache::new(&test_config());

    for k in 0..16 {
        let (hit, _) = cache.access(set0_addr(k), false, NEXT_LEVEL_LATENCY)?;
        assert!(!hit, "distinct lines must all cold-miss");
    }
    assert_eq!(cache.stats.evictions, 0);
    Ok(())
}

/// The 17th distinct line in a 16-way set evicts exactly one line, and the
/// evicted line is the one the policy ranked least favored. With the default
/// insertion rank of 11, the 12th line filled sits at the tail of the
/// ranking once the set is full, so it is the victim.
#[test]
fn conflict_access_evicts_the_least_favored_line() -> Result<(), PolicyError> {
    let mut cache = Cache::new(&test_config());

    for k in 0..16 {
        let _ = cache.access(set0_addr(k), false, NEXT_LEVEL_LATENCY)?;
    }
    let (hit, _) = cache.access(set0_addr(16), false, NEXT_LEVEL_LATENCY)?;

    assert!(!hit);
    assert_eq!(cache.stats.evictions, 1);
    assert!(cache.contains(set0_addr(0)), "head of the ranking survives");
    assert!(
        !cache.contains(set0_addr(11)),
        "the probationary line at the ranking tail is evicted"
    );
    Ok(())
}

/// Evicting a dirty line charges the next-level latency as a write-back
/// penalty.
#[test]
fn dirty_victim_charges_a_writeback_penalty() -> Result<(), PolicyError> {
    let mut cache = Cache::new(&test_config());

    for k in 0..16 {
        let _ = cache.access(set0_addr(k), true, NEXT_LEVEL_LATENCY)?;
    }
    let (hit, penalty) = cache.access(set0_addr(16), false, NEXT_LEVEL_LATENCY)?;

    assert!(!hit);
    assert_eq!(penalty, NEXT_LEVEL_LATENCY);
    assert_eq!(cache.stats.writebacks, 1);
    Ok(())
}

/// Evicting a clean line costs nothing beyond the miss itself.
#[test]
fn clean_victim_has_no_penalty() -> Result<(), PolicyError> {
    let mut cache = Cache::new(&test_config());

    for k in 0..16 {
        let _ = cache.access(set0_addr(k), false, NEXT_LEVEL_LATENCY)?;
    }
    let (_, penalty) = cache.access(set0_addr(16), false, NEXT_LEVEL_LATENCY)?;

    assert_eq!(penalty, 0);
    assert_eq!(cache.stats.evictions, 1);
    assert_eq!(cache.stats.writebacks, 0);
    Ok(())
}

// ══════════════════════════════════════════════════════════
// 3. Invalidation and flushing
// ══════════════════════════════════════════════════════════

/// Explicit invalidation removes the line and frees its way: the next fill
/// in that set reuses it instead of evicting.
#[test]
fn invalidate_frees_the_way_for_the_next_fill() -> Result<(), PolicyError> {
    let mut cache = Cache::new(&test_config());

    for k in 0..16 {
        let _ = cache.access(set0_addr(k), false, NEXT_LEVEL_LATENCY)?;
    }

    assert!(cache.invalidate(set0_addr(3))?);
    assert!(!cache.contains(set0_addr(3)));

    let (hit, _) = cache.access(set0_addr(16), false, NEXT_LEVEL_LATENCY)?;
    assert!(!hit);
    assert_eq!(cache.stats.evictions, 0, "the invalid way absorbs the fill");

    let (hit, _) = cache.access(set0_addr(3), false, NEXT_LEVEL_LATENCY)?;
    assert!(!hit, "the invalidated line is gone");
    Ok(())
}

/// Invalidating an address that is not resident reports false.
#[test]
fn invalidate_of_absent_address_returns_false() -> Result<(), PolicyError> {
    let mut cache = Cache::new(&test_config());
    assert!(!cache.invalidate(0x1000)?);
    assert_eq!(cache.stats.invalidations, 0);
    Ok(())
}

/// Flush writes back and invalidates dirty lines; clean lines stay
/// resident.
#[test]
fn flush_writes_back_only_dirty_lines() -> Result<(), PolicyError> {
    let mut cache = Cache::new(&test_config());

    let _ = cache.access(0, true, NEXT_LEVEL_LATENCY)?; // set 0, dirty
    let _ = cache.access(64, true, NEXT_LEVEL_LATENCY)?; // set 1, dirty
    let _ = cache.access(128, false, NEXT_LEVEL_LATENCY)?; // set 0, clean

    cache.flush()?;

    assert_eq!(cache.stats.writebacks, 2);
    assert!(!cache.contains(0));
    assert!(!cache.contains(64));
    assert!(cache.contains(128), "clean lines survive a flush");
    Ok(())
}

// ══════════════════════════════════════════════════════════
// 4. Disabled cache and statistics
// ══════════════════════════════════════════════════════════

/// A disabled cache bypasses every access without recording statistics.
#[test]
fn disabled_cache_bypasses_all_accesses() -> Result<(), PolicyError> {
    let mut config = test_config();
    config.cache.enabled = false;
    let mut cache = Cache::new(&config);

    let (hit, penalty) = cache.access(0x1000, false, NEXT_LEVEL_LATENCY)?;

    assert!(!hit);
    assert_eq!(penalty, 0);
    assert!(!cache.contains(0x1000));
    assert_eq!(cache.stats.accesses, 0);
    Ok(())
}

/// Hit/miss counters and the derived hit rate track the access stream.
#[test]
fn stats_track_hits_misses_and_hit_rate() -> Result<(), PolicyError> {
    let mut cache = Cache::new(&test_config());

    let _ = cache.access(0x1000, false, NEXT_LEVEL_LATENCY)?;
    for _ in 0..3 {
        let _ = cache.access(0x1000, false, NEXT_LEVEL_LATENCY)?;
    }

    assert_eq!(cache.stats.accesses, 4);
    assert_eq!(cache.stats.misses, 1);
    assert_eq!(cache.stats.hits, 3);
    assert!((cache.stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    Ok(())
}

// ══════════════════════════════════════════════════════════
// 5. Policy error propagation
// ══════════════════════════════════════════════════════════

/// A policy precondition violation aborts the access instead of silently
/// proceeding: a 4-way set overflows long before the policy's minimum
/// victim-selection population can be reached, so the eviction attempt must
/// fail loudly rather than guess.
#[test]
fn policy_preconditions_surface_as_errors() -> Result<(), PolicyError> {
    let cache_config = CacheConfig {
        enabled: true,
        size_bytes: 512,
        line_bytes: 64,
        ways: 4,
        latency: 1,
    };
    let mut cache = Cache::with_policy(
        &cache_config,
        Box::new(LruIpv::new(&PolicyConfig::default())),
    );

    for k in 0..4 {
        let _ = cache.access(set0_addr(k), false, NEXT_LEVEL_LATENCY)?;
    }
    let result = cache.access(set0_addr(4), false, NEXT_LEVEL_LATENCY);

    assert_eq!(
        result,
        Err(PolicyError::Underpopulated { have: 4, need: 16 })
    );
    Ok(())
}
