//! Set-Associative Cache Model.
//!
//! This module implements a configurable set-associative cache that drives a
//! replacement policy through the token interface. It models cache hits,
//! misses, and write-back penalties to simulate memory hierarchy latency.
//!
//! One policy instance serves the whole cache: the ranking spans every line,
//! while eviction candidates are restricted to the ways of the set being
//! filled.

use tracing::debug;

use crate::config::{CacheConfig, Config};
use crate::error::PolicyError;
use crate::policy::{EntryToken, LruIpv, ReplacementPolicy};
use crate::stats::SimStats;

/// Cache line entry containing tag, validity, dirty bit, and the line's
/// replacement metadata token.
#[derive(Clone, Copy, Debug)]
struct CacheLine {
    tag: u64,
    valid: bool,
    dirty: bool,
    token: EntryToken,
}

/// Cache model driving a replacement policy.
///
/// Supports lookups, line installation with policy-selected eviction,
/// explicit invalidation, and flushing. All operations are synchronous; a
/// policy error aborts the operation and must be treated as fatal by the
/// caller.
#[derive(Debug)]
pub struct Cache {
    /// Access latency in cycles (added on hit; miss adds next-level latency).
    pub latency: u64,
    /// When false, accesses bypass this cache and use next-level latency only.
    pub enabled: bool,
    /// Access/eviction counters.
    pub stats: SimStats,
    lines: Vec<CacheLine>,
    num_sets: usize,
    ways: usize,
    line_bytes: usize,
    policy: Box<dyn ReplacementPolicy>,
}

impl Cache {
    /// Creates a cache with an LRU-IPV policy built from `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_policy(&config.cache, Box::new(LruIpv::new(&config.policy)))
    }

    /// Creates a cache around an injected replacement policy.
    ///
    /// One metadata record is instantiated per line up front; the records
    /// stay unranked until their lines are filled.
    pub fn with_policy(config: &CacheConfig, mut policy: Box<dyn ReplacementPolicy>) -> Self {
        let safe_ways = if config.ways == 0 { 1 } else { config.ways };
        let safe_line = if config.line_bytes == 0 {
            64
        } else {
            config.line_bytes
        };
        let safe_size = if config.size_bytes == 0 {
            4096
        } else {
            config.size_bytes
        };

        let num_lines = safe_size / safe_line;
        let num_sets = (num_lines / safe_ways).max(1);

        let lines = (0..num_sets * safe_ways)
            .map(|_| CacheLine {
                tag: 0,
                valid: false,
                dirty: false,
                token: policy.instantiate_entry(),
            })
            .collect();

        Self {
            latency: config.latency,
            enabled: config.enabled,
            stats: SimStats::default(),
            lines,
            num_sets,
            ways: safe_ways,
            line_bytes: safe_line,
            policy,
        }
    }

    /// Splits an address into (set index, tag, first line index of the set).
    fn locate(&self, addr: u64) -> (usize, u64, usize) {
        let set_index = ((addr as usize) / self.line_bytes) % self.num_sets;
        let tag = addr / (self.line_bytes * self.num_sets) as u64;
        (set_index, tag, set_index * self.ways)
    }

    /// Checks whether the cache holds the specified address.
    ///
    /// Pure lookup: does not touch the replacement state.
    pub fn contains(&self, addr: u64) -> bool {
        if !self.enabled {
            return false;
        }
        let (_, tag, base_idx) = self.locate(addr);
        (0..self.ways)
            .map(|i| &self.lines[base_idx + i])
            .any(|line| line.valid && line.tag == tag)
    }

    /// Accesses the cache for the specified address.
    ///
    /// On a hit the line is promoted through the policy; on a miss a line is
    /// installed, evicting a policy-selected victim when the set is full.
    /// Returns `(hit, penalty)` where `penalty` is the write-back cost in
    /// cycles charged for a dirty victim.
    ///
    /// # Errors
    ///
    /// Propagates any [`PolicyError`]; the access is aborted and the ranking
    /// is left as the policy defined it at the failure point.
    pub fn access(
        &mut self,
        addr: u64,
        is_write: bool,
        next_level_latency: u64,
    ) -> Result<(bool, u64), PolicyError> {
        if !self.enabled {
            return Ok((false, 0));
        }

        self.stats.accesses += 1;
        let (_, tag, base_idx) = self.locate(addr);

        for i in 0..self.ways {
            let idx = base_idx + i;
            if self.lines[idx].valid && self.lines[idx].tag == tag {
                self.policy.touch(self.lines[idx].token)?;
                if is_write {
                    self.lines[idx].dirty = true;
                }
                self.stats.hits += 1;
                return Ok((true, 0));
            }
        }

        self.stats.misses += 1;
        let penalty = self.install_line(addr, is_write, next_level_latency)?;
        Ok((false, penalty))
    }

    /// Installs a line for `addr`, filling an invalid way when one exists and
    /// evicting a policy-selected victim otherwise. Returns the write-back
    /// penalty for a dirty victim.
    fn install_line(
        &mut self,
        addr: u64,
        is_write: bool,
        next_level_latency: u64,
    ) -> Result<u64, PolicyError> {
        let (set_index, tag, base_idx) = self.locate(addr);

        let invalid_way = (0..self.ways).find(|i| !self.lines[base_idx + i].valid);
        let (victim_idx, penalty) = match invalid_way {
            Some(way) => (base_idx + way, 0),
            None => {
                let candidates: Vec<EntryToken> = (0..self.ways)
                    .map(|i| self.lines[base_idx + i].token)
                    .collect();
                let victim = self.policy.select_victim(&candidates)?;
                let way = (0..self.ways)
                    .find(|i| self.lines[base_idx + i].token == victim)
                    .ok_or(PolicyError::UnknownEntry(victim))?;
                let idx = base_idx + way;

                self.stats.evictions += 1;
                let mut penalty = 0;
                if self.lines[idx].dirty {
                    self.stats.writebacks += 1;
                    penalty = next_level_latency;
                }
                debug!(addr = %format_args!("{addr:#x}"), set = set_index, way, "evict");
                (idx, penalty)
            }
        };

        let line = &mut self.lines[victim_idx];
        line.tag = tag;
        line.valid = true;
        line.dirty = is_write;
        let token = line.token;
        self.policy.reset(token)?;

        Ok(penalty)
    }

    /// Explicitly invalidates the line holding `addr`, if resident.
    ///
    /// The line's metadata is demoted to the tail of the ranking, making the
    /// line the preferred victim once its way is refilled. Returns whether a
    /// line was invalidated.
    ///
    /// # Errors
    ///
    /// Propagates any [`PolicyError`] from the demotion.
    pub fn invalidate(&mut self, addr: u64) -> Result<bool, PolicyError> {
        if !self.enabled {
            return Ok(false);
        }
        let (_, tag, base_idx) = self.locate(addr);

        for i in 0..self.ways {
            let idx = base_idx + i;
            if self.lines[idx].valid && self.lines[idx].tag == tag {
                self.lines[idx].valid = false;
                self.lines[idx].dirty = false;
                self.policy.invalidate(self.lines[idx].token)?;
                self.stats.invalidations += 1;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Flushes all dirty cache lines, invalidating them.
    ///
    /// Each flushed line is counted as a write-back and demoted through the
    /// policy. Clean lines stay resident.
    ///
    /// # Errors
    ///
    /// Propagates any [`PolicyError`] from the demotions.
    pub fn flush(&mut self) -> Result<(), PolicyError> {
        if !self.enabled {
            return Ok(());
        }
        for idx in 0..self.lines.len() {
            if self.lines[idx].valid && self.lines[idx].dirty {
                self.lines[idx].valid = false;
                self.lines[idx].dirty = false;
                self.stats.writebacks += 1;
                self.policy.invalidate(self.lines[idx].token)?;
            }
        }
        Ok(())
    }
}
