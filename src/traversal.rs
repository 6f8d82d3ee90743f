//! Two-pass mark-bit pre-order traversal (`spec.md` §4.7).
//!
//! The first pass toggles each reached node's mark bit away from its
//! current value and invokes the visitor; a son is only descended into if
//! its mark still differs from the target (i.e. it hasn't been visited yet
//! in this pass). A second, silent pass flips the marks back, restoring
//! parity. This trades a separate visited set for reusing the node's mark
//! bit, at the cost of not being reentrant on the same subgraph
//! concurrently (`spec.md` §5).

use crate::manager::NodeManager;
use crate::node::{Node, NodeId};

pub fn pre_order(manager: &mut NodeManager, root: NodeId, mut visit: impl FnMut(NodeId, &Node)) {
    let original = manager.mark(root);
    let target = !original;
    walk(manager, root, target, &mut visit);
    let mut noop = |_: NodeId, _: &Node| {};
    walk(manager, root, original, &mut noop);
}

fn walk(manager: &mut NodeManager, id: NodeId, target: bool, visit: &mut dyn FnMut(NodeId, &Node)) {
    if manager.mark(id) == target {
        return;
    }
    manager.set_mark(id, target);
    visit(id, manager.get(id));
    if let Node::Internal { sons, .. } = manager.get(id).clone() {
        for son in sons {
            walk(manager, son, target, visit);
        }
    }
}

/// Counts the nodes reachable from `root`, used for
/// [`crate::diagram::DiagramManager::node_count`] (`SPEC_FULL.md` §E.4:
/// single-diagram node count via level-order/mark-bit traversal, as
/// distinct from [`NodeManager::node_count`]'s whole-manager counter).
pub fn count_reachable(manager: &mut NodeManager, root: NodeId) -> usize {
    let mut count = 0;
    pre_order(manager, root, |_, _| count += 1);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::manager::{ManagerConfig, NodeManager};

    #[test]
    fn pre_order_restores_mark_parity() {
        let mut mgr = NodeManager::new(2, Domain::Fixed(2), ManagerConfig::default());
        let x0 = mgr.terminal_node(0);
        let x1 = mgr.terminal_node(1);
        let root = mgr.internal_node(0, vec![x0, x1]);
        let before = mgr.mark(root);
        let mut visited = Vec::new();
        pre_order(&mut mgr, root, |id, _| visited.push(id));
        assert_eq!(mgr.mark(root), before);
        assert_eq!(visited.len(), 3);
    }
}
