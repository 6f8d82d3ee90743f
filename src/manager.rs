//! The node manager (`spec.md` §4.5): owns the pool, one unique table per
//! variable, one apply cache per operator, the level/index permutation and
//! domain info.

use crate::apply_cache::ApplyCache;
use crate::node::{Node, NodeId};
use crate::operators::OpId;
use crate::pool::{NodePool, DEFAULT_OVERFLOW_RATIO};
use crate::unique_table::{hash_sons, UniqueTable};
use crate::domain::Domain;
use std::collections::HashMap;

/// Tunable knobs the source keeps as manager-level constants (`spec.md`
/// §4.2, §4.5): initial pool size, overflow growth ratio, and the ratios
/// `adjust_sizes` uses to size unique tables and apply caches relative to
/// `node_count` (`SPEC_FULL.md` §D).
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub pool_init_size: usize,
    pub overflow_ratio: usize,
    pub cache_ratio: usize,
    /// Drives each unique table's load-factor target: `adjust_capacity`
    /// rehashes once `size` exceeds `size + size/pool_ratio` entries
    /// (`spec.md` §4.3's `4*size/3` is this formula's `pool_ratio == 3`).
    pub pool_ratio: usize,
    /// Enables `sift_vars` inside `adjust_sizes` whenever a GC ran
    /// (`spec.md` §4.5, §9: left to the implementation whether reordering
    /// runs on every call or only on high-water events; we pick "every GC",
    /// see `DESIGN.md`).
    pub auto_reorder: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            pool_init_size: 307,
            overflow_ratio: DEFAULT_OVERFLOW_RATIO,
            cache_ratio: 2,
            pool_ratio: 3,
            auto_reorder: false,
        }
    }
}

pub struct NodeManager {
    domain: Domain,
    pool: NodePool,
    unique_tables: Vec<UniqueTable>,
    terminals: Vec<Option<NodeId>>,
    level_to_index: Vec<u32>,
    index_to_level: Vec<u32>,
    caches: HashMap<OpId, ApplyCache>,
    needs_gc: bool,
    node_count: usize,
    config: ManagerConfig,
}

impl NodeManager {
    pub fn new(var_count: usize, domain: Domain, config: ManagerConfig) -> Self {
        let pool = NodePool::new(config.pool_init_size, config.overflow_ratio);
        let unique_tables = (0..var_count).map(|_| UniqueTable::new()).collect();
        let level_to_index: Vec<u32> = (0..var_count as u32).collect();
        let index_to_level = level_to_index.clone();
        NodeManager {
            domain,
            pool,
            unique_tables,
            terminals: Vec::new(),
            level_to_index,
            index_to_level,
            caches: HashMap::new(),
            needs_gc: false,
            node_count: 0,
            config,
        }
    }

    pub fn var_count(&self) -> usize {
        self.unique_tables.len()
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn level(&self, index: u32) -> u32 {
        self.index_to_level[index as usize]
    }

    pub fn index_at_level(&self, level: u32) -> u32 {
        self.level_to_index[level as usize]
    }

    /// Whole-manager node count, `spec.md` §4.5/§8 scenario 3
    /// (`SPEC_FULL.md` §E.4).
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.pool.get(id).node
    }

    pub fn mark(&self, id: NodeId) -> bool {
        self.pool.get(id).mark
    }

    pub fn set_mark(&mut self, id: NodeId, value: bool) {
        self.pool.get_mut(id).mark = value;
    }

    pub fn ref_count(&self, id: NodeId) -> u32 {
        self.pool.get(id).ref_count
    }

    pub fn inc_ref(&mut self, id: NodeId) {
        self.pool.get_mut(id).inc_ref_count();
    }

    pub fn dec_ref(&mut self, id: NodeId) {
        self.pool.get_mut(id).dec_ref_count();
        if self.pool.get(id).ref_count == 0 {
            self.needs_gc = true;
        }
    }

    /// `spec.md` §4.5 `terminal_node`.
    pub fn terminal_node(&mut self, v: u32) -> NodeId {
        let idx = v as usize;
        if idx < self.terminals.len() {
            if let Some(id) = self.terminals[idx] {
                return id;
            }
        } else {
            self.terminals.resize(idx + 1, None);
        }
        let id = self.new_node(Node::Terminal(v));
        self.terminals[idx] = Some(id);
        id
    }

    /// `spec.md` §4.5 `internal_node`. Redundancy check first (all sons
    /// equal short-circuits to that son without allocating), then a
    /// unique-table lookup for canonicity, only allocating on a true miss.
    pub fn internal_node(&mut self, index: u32, sons: Vec<NodeId>) -> NodeId {
        debug_assert_eq!(sons.len(), self.domain.size(index) as usize);
        if sons.iter().all(|&s| s == sons[0]) {
            return sons[0];
        }
        let h = hash_sons(&sons);
        if let Some(existing) = self.unique_tables[index as usize].find(&self.pool, h, &sons) {
            return existing;
        }
        let id = self.new_node(Node::Internal {
            index,
            sons: sons.clone(),
        });
        self.unique_tables[index as usize].insert(&self.pool, id, h);
        for &son in &sons {
            self.pool.get_mut(son).inc_ref_count();
        }
        id
    }

    fn new_node(&mut self, node: Node) -> NodeId {
        let id = match self.pool.try_create(node) {
            Ok(id) => id,
            Err(node) => {
                self.needs_gc = true;
                self.pool.force_create(node)
            }
        };
        self.node_count += 1;
        id
    }

    fn delete_node(&mut self, id: NodeId) {
        self.node_count -= 1;
        self.pool.destroy(id);
    }

    /// All live nodes currently filed under variable `index`'s unique table
    /// (`crate::dot`'s whole-manager export).
    pub fn unique_table_ids(&self, index: u32) -> Vec<NodeId> {
        self.unique_tables[index as usize].iter().collect()
    }

    /// All live terminal nodes (`crate::dot`'s whole-manager export).
    pub fn terminal_ids(&self) -> Vec<NodeId> {
        self.terminals.iter().flatten().copied().collect()
    }

    pub(crate) fn cache_entry(&mut self, op: OpId) -> &mut ApplyCache {
        self.caches.entry(op).or_default()
    }

    /// `spec.md` §4.5 `adjust_sizes`, called after every top-level
    /// operation.
    pub fn adjust_sizes(&mut self) {
        if self.needs_gc {
            self.collect_garbage();
            if self.config.auto_reorder {
                self.sift_vars();
            }
        }
        for table in &mut self.unique_tables {
            table.adjust_capacity(&self.pool, self.config.pool_ratio);
        }
        let cache_ratio = self.config.cache_ratio.max(1);
        let approx = self.node_count / cache_ratio;
        for cache in self.caches.values_mut() {
            cache.rm_unused(&self.pool);
            cache.adjust_capacity(approx);
        }
    }

    /// `spec.md` §4.5 `collect_garbage`. Cascades: decrementing a son's ref
    /// count to zero enqueues it for the same pass.
    pub fn collect_garbage(&mut self) {
        self.needs_gc = false;
        let mut queue: Vec<NodeId> = Vec::new();
        for table in &self.unique_tables {
            for id in table.iter() {
                if self.pool.get(id).ref_count == 0 {
                    queue.push(id);
                }
            }
        }
        for id in self.terminals.iter().flatten().copied() {
            if self.pool.get(id).ref_count == 0 {
                queue.push(id);
            }
        }

        let mut i = 0;
        while i < queue.len() {
            let id = queue[i];
            i += 1;
            if !self.pool.is_live(id) || self.pool.get(id).ref_count != 0 {
                continue;
            }
            let node = self.pool.get(id).node.clone();
            match node {
                Node::Internal { index, sons } => {
                    let h = hash_sons(&sons);
                    self.unique_tables[index as usize].erase(id, h);
                    for son in sons {
                        let slot = self.pool.get_mut(son);
                        slot.dec_ref_count();
                        if slot.ref_count == 0 {
                            queue.push(son);
                        }
                    }
                }
                Node::Terminal(v) => {
                    self.terminals[v as usize] = None;
                }
            }
            self.delete_node(id);
        }
    }

    /// `spec.md` §4.5 `swap_vars`: swaps the level of variable `index`
    /// with the next level down, reusing the node objects that used to
    /// test `index` to now test the other variable, building fresh
    /// `index`-testing nodes for the cofactor table.
    pub fn swap_vars(&mut self, index: u32) {
        let level_i = self.index_to_level[index as usize] as usize;
        let level_j = level_i + 1;
        assert!(
            level_j < self.level_to_index.len(),
            "swap_vars called on the bottom-most level"
        );
        let other = self.level_to_index[level_j];

        let di = self.domain.size(index) as usize;
        let dj = self.domain.size(other) as usize;

        let nodes_at_i: Vec<NodeId> = self.unique_tables[index as usize].iter().collect();
        for v in nodes_at_i {
            let v_sons = self.pool.get(v).node.sons().to_vec();
            let old_hash = hash_sons(&v_sons);

            // Erase `v` before rebuilding its cofactors at this level: the
            // rebuild below calls `internal_node(index, ..)`, which must not
            // be able to hash-cons onto `v` itself while it is still filed
            // under its old sons, or `v` ends up as its own son.
            self.unique_tables[index as usize].erase(v, old_hash);

            let mut cofactors: Vec<Vec<NodeId>> = Vec::with_capacity(di);
            for &son in &v_sons {
                let row = match &self.pool.get(son).node {
                    Node::Internal { index: s_index, sons } if *s_index == other => sons.clone(),
                    _ => vec![son; dj],
                };
                cofactors.push(row);
            }

            let mut new_sons = Vec::with_capacity(dj);
            for b in 0..dj {
                let column: Vec<NodeId> = cofactors.iter().map(|row| row[b]).collect();
                new_sons.push(self.internal_node(index, column));
            }

            for &s in &new_sons {
                self.pool.get_mut(s).inc_ref_count();
            }
            for &s in &v_sons {
                let slot = self.pool.get_mut(s);
                slot.dec_ref_count();
                if slot.ref_count == 0 {
                    self.needs_gc = true;
                }
            }

            if let Node::Internal { index: idx_field, sons } = &mut self.pool.get_mut(v).node {
                *idx_field = other;
                *sons = new_sons;
            }
            let new_hash = hash_sons(self.pool.get(v).node.sons());
            self.unique_tables[other as usize].insert(&self.pool, v, new_hash);
        }

        self.unique_tables[index as usize].adjust_capacity(&self.pool, self.config.pool_ratio);

        self.level_to_index.swap(level_i, level_j);
        self.index_to_level[index as usize] = level_j as u32;
        self.index_to_level[other as usize] = level_i as u32;
    }

    /// `spec.md` §4.5 `sift_vars`: visit variables in descending order of
    /// their current unique-table size, sweep each one down to the bottom
    /// and back up to the top recording `(level, node_count)`, then settle
    /// it at the earliest level that produced the minimum observed count.
    pub fn sift_vars(&mut self) {
        let n_vars = self.unique_tables.len();
        if n_vars < 2 {
            return;
        }
        let mut order: Vec<u32> = (0..n_vars as u32).collect();
        order.sort_by_key(|&idx| std::cmp::Reverse(self.unique_tables[idx as usize].size()));

        let n_levels = self.level_to_index.len() as u32;
        for idx in order {
            let start_level = self.index_to_level[idx as usize];
            let mut history: Vec<(u32, usize)> = vec![(start_level, self.node_count)];

            let mut level = start_level;
            while level + 1 < n_levels {
                self.swap_vars(idx);
                level += 1;
                history.push((level, self.node_count));
            }
            while level > 0 {
                let above = self.level_to_index[(level - 1) as usize];
                self.swap_vars(above);
                level -= 1;
                history.push((level, self.node_count));
            }

            let best_level = history
                .into_iter()
                .min_by_key(|&(lvl, cnt)| (cnt, lvl))
                .map(|(lvl, _)| lvl)
                .unwrap_or(0);
            while self.index_to_level[idx as usize] < best_level {
                self.swap_vars(idx);
            }
        }
    }

    /// Level-order traversal from `root`, visiting each reachable node
    /// exactly once (`SPEC_FULL.md` §E.2: the per-node user-data/traversal
    /// contract the reliability layer relies on).
    pub fn level_order(&self, root: NodeId, mut visit: impl FnMut(NodeId, &Node)) {
        let mut seen = vec![false; self.pool.len()];
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(root);
        seen[root.index()] = true;
        while let Some(id) = queue.pop_front() {
            let node = self.get(id);
            visit(id, node);
            if let Node::Internal { sons, .. } = node {
                for &son in sons {
                    if !seen[son.index()] {
                        seen[son.index()] = true;
                        queue.push_back(son);
                    }
                }
            }
        }
    }
}
