//! Simulation statistics collection and reporting.
//!
//! Tracks per-cache counters: accesses, hits, misses, evictions, write-backs,
//! and explicit invalidations, plus the derived hit rate.

/// Counters for one simulated cache.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimStats {
    /// Total accesses observed while the cache was enabled.
    pub accesses: u64,
    /// Accesses that hit a resident line.
    pub hits: u64,
    /// Accesses that missed and installed a line.
    pub misses: u64,
    /// Lines evicted through victim selection.
    pub evictions: u64,
    /// Dirty lines written back (on eviction or flush).
    pub writebacks: u64,
    /// Lines removed through explicit invalidation.
    pub invalidations: u64,
}

impl SimStats {
    /// Fraction of accesses that hit, in `0.0..=1.0`. Zero when no accesses
    /// were recorded.
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }

    /// Prints a human-readable statistics report to stdout.
    pub fn print(&self) {
        println!("=== Cache Statistics ===");
        println!("  Accesses:      {}", self.accesses);
        println!("  Hits:          {}", self.hits);
        println!("  Misses:        {}", self.misses);
        println!("  Hit rate:      {:.2}%", self.hit_rate() * 100.0);
        println!("  Evictions:     {}", self.evictions);
        println!("  Write-backs:   {}", self.writebacks);
        println!("  Invalidations: {}", self.invalidations);
    }
}
