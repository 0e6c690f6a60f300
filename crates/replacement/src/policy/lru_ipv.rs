//! Insertion/Promotion-Vector LRU (LRU-IPV) Replacement Policy.
//!
//! LRU-IPV generalizes the LRU recency stack: instead of moving a touched
//! line all the way to the most-recently-used position, a fixed promotion
//! vector decides how far up the ranking the line moves from its current
//! rank, and filled lines enter the ranking at a probationary insertion rank
//! rather than at the head. The ranking is a single ordered sequence shared
//! across every line the policy manages; the entry at rank 0 is the most
//! favored, the entry at the tail is the next eviction victim.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(N) in the promotion distance (ranks are re-stamped in place)
//!   - `select_victim()`: O(C + N) for C candidates
//! - **Space Complexity:** O(N) where N is the number of managed lines
//! - **Hardware Cost:** High - models a full rank vector, like true LRU
//! - **Best Case:** Mixed workloads; probationary insertion resists scans
//!   that would flush a pure LRU stack
//! - **Worst Case:** Tight loops over few lines pay the promotion walk on
//!   every hit

use tracing::trace;

use super::{EntryToken, ReplacementPolicy};
use crate::config::{IPV_ARITY, MIN_POPULATION, PolicyConfig, PromotionVector};
use crate::error::PolicyError;

/// Per-line replacement metadata.
#[derive(Clone, Copy, Debug, Default)]
struct LineMeta {
    /// Position in the ranking; `None` until the line is first inserted, and
    /// again after it is removed by victim selection.
    rank: Option<usize>,
}

/// LRU-IPV policy state.
///
/// Each instance owns its ranking outright; two caches holding separate
/// instances are fully isolated.
#[derive(Debug)]
pub struct LruIpv {
    /// Current-rank → target-rank mapping for ranks below [`IPV_ARITY`].
    promotions: PromotionVector,
    /// Rank assigned to freshly (re)filled lines.
    insertion_rank: usize,
    /// Metadata records, indexed by token id. Slots are never reused.
    entries: Vec<LineMeta>,
    /// The ranking: `order[r]` is the id of the entry holding rank `r`.
    order: Vec<usize>,
}

impl LruIpv {
    /// Creates a new policy instance from its configuration.
    ///
    /// The promotion vector and insertion rank are fixed for the instance's
    /// lifetime.
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            promotions: config.promotions,
            insertion_rank: config.insertion_rank,
            entries: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Number of entries currently holding a rank.
    pub fn population(&self) -> usize {
        self.order.len()
    }

    /// Current rank of `entry`, or `None` if it holds no rank (never
    /// inserted, or evicted and not yet refilled). Unknown tokens also
    /// yield `None`.
    pub fn rank_of(&self, entry: EntryToken) -> Option<usize> {
        self.entries.get(entry.0).and_then(|meta| meta.rank)
    }

    /// Looks the entry up in the metadata store.
    fn meta_rank(&self, entry: EntryToken) -> Result<Option<usize>, PolicyError> {
        self.entries
            .get(entry.0)
            .map(|meta| meta.rank)
            .ok_or(PolicyError::UnknownEntry(entry))
    }

    /// Like [`meta_rank`](Self::meta_rank), but the entry must be ranked.
    fn current_rank(&self, entry: EntryToken) -> Result<usize, PolicyError> {
        self.meta_rank(entry)?.ok_or(PolicyError::NotRanked(entry))
    }

    /// Re-stamps `rank` for every position in `lo..hi` to match the ranking.
    fn restamp(&mut self, lo: usize, hi: usize) {
        for pos in lo..hi {
            let id = self.order[pos];
            self.entries[id].rank = Some(pos);
        }
    }

    /// Moves the entry at rank `from` to rank `to`, shifting everything in
    /// between by one slot and re-stamping the affected span.
    fn shift(&mut self, from: usize, to: usize) {
        let id = self.order.remove(from);
        self.order.insert(to, id);
        self.restamp(from.min(to), from.max(to) + 1);
    }

    /// Verifies the rank/position correspondence and the absence of
    /// duplicates. Corruption here is a programming error in the policy or
    /// the host, never a runtime condition, so it asserts.
    #[cfg(debug_assertions)]
    fn assert_coherent(&self) {
        let mut seen = vec![false; self.entries.len()];
        for (pos, &id) in self.order.iter().enumerate() {
            assert!(!seen[id], "entry #{id} appears twice in the ranking");
            seen[id] = true;
            assert_eq!(
                self.entries[id].rank,
                Some(pos),
                "entry #{id} rank does not match its position {pos}"
            );
        }
    }

    #[cfg(not(debug_assertions))]
    fn assert_coherent(&self) {}
}

impl ReplacementPolicy for LruIpv {
    /// Allocates a fresh, unranked metadata record and returns its token.
    fn instantiate_entry(&mut self) -> EntryToken {
        let id = self.entries.len();
        self.entries.push(LineMeta::default());
        EntryToken(id)
    }

    /// Promotes the entry from its current rank to the promotion vector's
    /// target for that rank.
    ///
    /// Ranks at or beyond [`IPV_ARITY`] are out of the vector's domain and
    /// keep their rank. Targets past the current tail are clamped to it.
    fn touch(&mut self, entry: EntryToken) -> Result<(), PolicyError> {
        let cur = self.current_rank(entry)?;
        let tgt = if cur < IPV_ARITY {
            self.promotions[cur].min(self.order.len() - 1)
        } else {
            cur
        };
        if tgt != cur {
            self.shift(cur, tgt);
        }
        trace!(entry = %entry, from = cur, to = tgt, "touch");
        self.assert_coherent();
        Ok(())
    }

    /// Moves the entry to the tail of the ranking, closing the gap it left
    /// behind. Every entry that sat below it moves up one rank.
    fn invalidate(&mut self, entry: EntryToken) -> Result<(), PolicyError> {
        let cur = self.current_rank(entry)?;
        let id = self.order.remove(cur);
        self.order.push(id);
        self.restamp(cur, self.order.len());
        trace!(entry = %entry, from = cur, to = self.order.len() - 1, "invalidate");
        self.assert_coherent();
        Ok(())
    }

    /// Inserts the entry at the configured insertion rank, shifting every
    /// entry at or below that rank one slot toward the tail.
    ///
    /// While the ranking is shorter than the insertion rank the entry is
    /// appended instead, so the ranking grows without gaps. An entry that is
    /// already ranked is first removed, so reset never duplicates it.
    fn reset(&mut self, entry: EntryToken) -> Result<(), PolicyError> {
        let prev = self.meta_rank(entry)?;
        if let Some(cur) = prev {
            let _ = self.order.remove(cur);
        }
        let at = self.insertion_rank.min(self.order.len());
        self.order.insert(at, entry.0);
        let lo = prev.map_or(at, |cur| cur.min(at));
        let hi = prev.map_or(self.order.len(), |cur| cur.max(at) + 1);
        self.restamp(lo, hi);
        trace!(entry = %entry, rank = at, "reset");
        self.assert_coherent();
        Ok(())
    }

    /// Returns the rank-maximal candidate and removes it from the ranking.
    ///
    /// Later candidates replace the running victim only with a strictly
    /// higher rank, so the earliest-seen candidate wins any tie. Entries
    /// below the victim's old rank move up one slot to close the gap.
    fn select_victim(&mut self, candidates: &[EntryToken]) -> Result<EntryToken, PolicyError> {
        let Some((&first, rest)) = candidates.split_first() else {
            return Err(PolicyError::EmptyCandidates);
        };
        if self.order.len() < MIN_POPULATION {
            return Err(PolicyError::Underpopulated {
                have: self.order.len(),
                need: MIN_POPULATION,
            });
        }

        let mut victim = first;
        let mut victim_rank = self.current_rank(first)?;
        for &candidate in rest {
            let rank = self.current_rank(candidate)?;
            if rank > victim_rank {
                victim = candidate;
                victim_rank = rank;
            }
        }

        let _ = self.order.remove(victim_rank);
        self.entries[victim.0].rank = None;
        self.restamp(victim_rank, self.order.len());
        trace!(entry = %victim, rank = victim_rank, "evict");
        self.assert_coherent();
        Ok(victim)
    }
}
