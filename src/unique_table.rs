//! Per-variable unique table (`spec.md` §4.3).
//!
//! The source chains overflowing buckets through the nodes' own intrusive
//! `next` pointer. Our nodes live in an arena addressed by [`NodeId`]
//! rather than by pointer, so each bucket is instead a small `Vec<NodeId>`
//! of the nodes that currently hash to it — same separate-chaining
//! behaviour, without reaching for unsafe intrusive links the arena
//! doesn't need.

use crate::node::NodeId;
use crate::pool::NodePool;
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

/// Ascending capacity schedule, starting at ~307 and roughly doubling,
/// exactly as `spec.md` §4.3 specifies (24 entries).
pub const CAPACITY_SCHEDULE: [usize; 24] = [
    307, 617, 1237, 2477, 4957, 9923, 19_853, 39_709, 79_423, 158_849, 317_701, 635_413,
    1_270_849, 2_541_701, 5_083_423, 10_166_857, 20_333_761, 40_667_527, 81_335_063, 162_670_163,
    325_340_329, 650_680_673, 1_301_361_349, 2_602_722_701,
];

/// First schedule entry strictly greater than `n`, clamped to the largest.
pub fn gte_capacity(n: usize) -> usize {
    CAPACITY_SCHEDULE
        .iter()
        .copied()
        .find(|&c| c > n)
        .unwrap_or(*CAPACITY_SCHEDULE.last().unwrap())
}

/// Combines a son's hash into a running seed using the 32-bit mixing step
/// named in `spec.md` §4.3 (the familiar `boost::hash_combine` formula).
fn combine(seed: u32, h: u32) -> u32 {
    seed ^ h
        .wrapping_add(0x9e3779b9)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

pub fn hash_sons(sons: &[NodeId]) -> u32 {
    let mut seed = 0u32;
    for son in sons {
        let mut hasher = SipHasher13::new();
        son.hash(&mut hasher);
        seed = combine(seed, hasher.finish() as u32);
    }
    seed
}

pub struct UniqueTable {
    buckets: Vec<Vec<NodeId>>,
    size: usize,
}

impl UniqueTable {
    pub fn new() -> Self {
        UniqueTable {
            buckets: vec![Vec::new(); CAPACITY_SCHEDULE[0]],
            size: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn bucket_index(&self, h: u32) -> usize {
        (h as usize) % self.buckets.len()
    }

    /// Looks up a node whose sons array componentwise equals `sons`.
    pub fn find(&self, pool: &NodePool, h: u32, sons: &[NodeId]) -> Option<NodeId> {
        let bucket = &self.buckets[self.bucket_index(h)];
        bucket
            .iter()
            .copied()
            .find(|&id| pool.get(id).node.sons() == sons)
    }

    pub fn insert(&mut self, pool: &NodePool, id: NodeId, h: u32) {
        let idx = self.bucket_index(h);
        self.buckets[idx].push(id);
        self.size += 1;
        let _ = pool; // equality is checked by the caller via `find` before insert
    }

    pub fn erase(&mut self, id: NodeId, h: u32) {
        let idx = self.bucket_index(h);
        if let Some(pos) = self.buckets[idx].iter().position(|&n| n == id) {
            self.buckets[idx].swap_remove(pos);
            self.size -= 1;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.buckets.iter().flatten().copied()
    }

    /// Rehashes to the smallest schedule capacity `> size + size/pool_ratio`
    /// (`spec.md` §4.3's `4*size/3` is this formula's `pool_ratio == 3`
    /// case; `ManagerConfig::pool_ratio` makes the load-factor buffer
    /// configurable rather than fixing it at that one value).
    pub fn adjust_capacity(&mut self, pool: &NodePool, pool_ratio: usize) {
        let target = gte_capacity(self.size + self.size / pool_ratio.max(1));
        if target == self.buckets.len() {
            return;
        }
        self.rehash_to(target, pool);
    }

    fn rehash_to(&mut self, new_capacity: usize, pool: &NodePool) {
        let mut new_buckets: Vec<Vec<NodeId>> = vec![Vec::new(); new_capacity];
        for id in self.buckets.iter().flatten().copied() {
            let h = hash_sons(pool.get(id).node.sons());
            new_buckets[(h as usize) % new_capacity].push(id);
        }
        self.buckets = new_buckets;
    }
}

impl Default for UniqueTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn smaller_pool_ratio_grows_capacity_sooner() {
        let mut pool = NodePool::new(CAPACITY_SCHEDULE[0] * 2, crate::pool::DEFAULT_OVERFLOW_RATIO);
        let mut table = UniqueTable::new();
        for v in 0..200u32 {
            let leaf = pool
                .try_create(Node::Terminal(v))
                .expect("within init capacity");
            let id = pool
                .try_create(Node::Internal {
                    index: 0,
                    sons: vec![leaf],
                })
                .expect("within init capacity");
            let h = hash_sons(pool.get(id).node.sons());
            table.insert(&pool, id, h);
        }
        let initial = table.buckets.len();

        let mut loose = UniqueTable {
            buckets: table.buckets.clone(),
            size: table.size,
        };
        loose.adjust_capacity(&pool, 100);
        assert_eq!(loose.buckets.len(), initial, "ratio 100 barely pads, shouldn't grow yet at 200 entries");

        let mut tight = UniqueTable {
            buckets: table.buckets.clone(),
            size: table.size,
        };
        tight.adjust_capacity(&pool, 1);
        assert!(
            tight.buckets.len() > initial,
            "ratio 1 doubles the target (size + size/1), forcing a regrowth"
        );
    }
}
