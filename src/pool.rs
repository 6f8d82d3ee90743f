//! The node pool (`spec.md` §4.2).
//!
//! The source pre-sizes a primary arena and falls back to overflow arenas
//! sized `InitSize / OverflowRatio` once the primary is exhausted, recycling
//! freed slots through an intrusive free list. A `Vec`-backed arena with a
//! logical capacity threshold gives the same externally observable
//! contract without hand-rolled arena chaining: `try_create` only succeeds
//! while the arena is below its current capacity or the free list has a
//! slot to offer; `force_create` always succeeds by growing the logical
//! capacity (the `Vec`'s own amortized growth plays the role the source
//! gives its overflow arenas, c.f. `src/patch/bytetable.rs`'s
//! doubling-on-growth table).

use crate::node::{Node, NodeId, NodeSlot};

/// Overflow arenas are sized `InitSize / OverflowRatio` in the source; here
/// that ratio instead governs by how much the logical capacity grows each
/// time `force_create` is invoked.
pub const DEFAULT_OVERFLOW_RATIO: usize = 2;

pub struct NodePool {
    slots: Vec<Option<NodeSlot>>,
    free_list: Vec<NodeId>,
    capacity: usize,
    overflow_ratio: usize,
}

impl NodePool {
    pub fn new(init_size: usize, overflow_ratio: usize) -> Self {
        NodePool {
            slots: Vec::with_capacity(init_size),
            free_list: Vec::new(),
            capacity: init_size,
            overflow_ratio,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &NodeSlot {
        self.slots[id.index()]
            .as_ref()
            .expect("dangling NodeId: slot is unused")
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        id.index() < self.slots.len() && self.slots[id.index()].is_some()
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeSlot {
        self.slots[id.index()]
            .as_mut()
            .expect("dangling NodeId: slot is unused")
    }

    /// (a) reuse a free-list slot, else (b) take the next unused slot in
    /// the arena if under `capacity`. Returns `None` if both are
    /// exhausted — the caller (`NodeManager::new_node`) then falls back to
    /// [`Self::force_create`].
    pub fn try_create(&mut self, node: Node) -> Result<NodeId, Node> {
        if let Some(id) = self.free_list.pop() {
            self.slots[id.index()] = Some(NodeSlot::new(node));
            return Ok(id);
        }
        if self.slots.len() < self.capacity {
            let id = NodeId(self.slots.len() as u32);
            self.slots.push(Some(NodeSlot::new(node)));
            return Ok(id);
        }
        Err(node)
    }

    /// Grows the logical capacity by an overflow arena of size
    /// `capacity / overflow_ratio` and retries. Always succeeds, memory
    /// permitting, as `spec.md` §4.2 requires.
    pub fn force_create(&mut self, node: Node) -> NodeId {
        let growth = (self.capacity / self.overflow_ratio).max(1);
        self.capacity += growth;
        self.try_create(node)
            .unwrap_or_else(|_| unreachable!("force_create must succeed after growing capacity"))
    }

    /// Pushes the slot onto the free list. The slot's object is left
    /// destructed (`None`), matching the source's `destroy` contract.
    pub fn destroy(&mut self, id: NodeId) {
        self.slots[id.index()] = None;
        self.free_list.push(id);
    }
}
