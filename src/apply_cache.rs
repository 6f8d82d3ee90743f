//! Per-operator apply cache (`spec.md` §4.4).
//!
//! Open-addressed, single probe: `find` computes one bucket from the key's
//! hash and hands the caller an index to inspect; the caller is
//! responsible for checking the stored key actually matches before trusting
//! the cached result (`spec.md` §9, "open question": the source's
//! `apply_cache::find` "collides silently on mismatching keys"; we keep
//! that contract rather than resolve it, since the open question is
//! explicitly left unresolved).

use crate::node::NodeId;
use crate::operators::OpId;
use crate::pool::NodePool;
use crate::unique_table::{gte_capacity, CAPACITY_SCHEDULE};
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    op_id: OpId,
    lhs: NodeId,
    rhs: NodeId,
    result: NodeId,
}

pub struct ApplyCache {
    entries: Vec<Option<CacheEntry>>,
    size: usize,
}

/// Index into the cache returned by `find`; the caller checks `matches`
/// before either using the cached `result` or overwriting the slot with
/// `put`.
pub struct Probe {
    index: usize,
}

impl ApplyCache {
    pub fn new() -> Self {
        ApplyCache {
            entries: vec![None; CAPACITY_SCHEDULE[0]],
            size: 0,
        }
    }

    fn key_hash(op_id: OpId, lhs: NodeId, rhs: NodeId) -> u64 {
        let mut hasher = SipHasher13::new();
        op_id.hash(&mut hasher);
        lhs.hash(&mut hasher);
        rhs.hash(&mut hasher);
        hasher.finish()
    }

    /// Canonicalises commutative operator keys so `(a, b)` and `(b, a)`
    /// probe the same slot, increasing the hit rate (`spec.md` §4.4).
    fn canonical_key(commutative: bool, lhs: NodeId, rhs: NodeId) -> (NodeId, NodeId) {
        if commutative && rhs < lhs {
            (rhs, lhs)
        } else {
            (lhs, rhs)
        }
    }

    pub fn find(&self, op_id: OpId, commutative: bool, lhs: NodeId, rhs: NodeId) -> Probe {
        let (lhs, rhs) = Self::canonical_key(commutative, lhs, rhs);
        let h = Self::key_hash(op_id, lhs, rhs);
        Probe {
            index: (h as usize) % self.entries.len(),
        }
    }

    /// Checks whether the slot `probe` points at actually holds `(op_id,
    /// lhs, rhs)`, accounting for commutative canonicalisation.
    pub fn matches(&self, probe: &Probe, op_id: OpId, commutative: bool, lhs: NodeId, rhs: NodeId) -> Option<NodeId> {
        let (lhs, rhs) = Self::canonical_key(commutative, lhs, rhs);
        match self.entries[probe.index] {
            Some(entry) if entry.op_id == op_id && entry.lhs == lhs && entry.rhs == rhs => {
                Some(entry.result)
            }
            _ => None,
        }
    }

    pub fn put(
        &mut self,
        probe: &Probe,
        op_id: OpId,
        commutative: bool,
        lhs: NodeId,
        rhs: NodeId,
        result: NodeId,
    ) {
        let (lhs, rhs) = Self::canonical_key(commutative, lhs, rhs);
        if self.entries[probe.index].is_none() {
            self.size += 1;
        }
        self.entries[probe.index] = Some(CacheEntry {
            op_id,
            lhs,
            rhs,
            result,
        });
    }

    /// Clears any entry whose `lhs`, `rhs`, or `result` is no longer a live
    /// node (`spec.md` §4.4, §4.5: dead-node cache entries are reclaimed by
    /// `rm_unused` or during rehash).
    pub fn rm_unused(&mut self, pool: &NodePool) {
        for slot in &mut self.entries {
            if let Some(entry) = slot {
                if !pool.is_live(entry.lhs) || !pool.is_live(entry.rhs) || !pool.is_live(entry.result)
                {
                    *slot = None;
                    self.size -= 1;
                }
            }
        }
    }

    /// Rehashes to the smallest schedule capacity `> approx`, only if the
    /// current load factor exceeds 0.75 and the schedule isn't exhausted
    /// (`spec.md` §4.4).
    pub fn adjust_capacity(&mut self, approx: usize) {
        let load = self.size as f64 / self.entries.len() as f64;
        if load <= 0.75 {
            return;
        }
        let target = gte_capacity(approx.max(self.size));
        if target == self.entries.len() {
            return;
        }
        let mut new_entries = vec![None; target];
        for entry in self.entries.iter().flatten().copied() {
            let h = Self::key_hash(entry.op_id, entry.lhs, entry.rhs);
            new_entries[(h as usize) % target] = Some(entry);
        }
        self.entries = new_entries;
    }
}

impl Default for ApplyCache {
    fn default() -> Self {
        Self::new()
    }
}
