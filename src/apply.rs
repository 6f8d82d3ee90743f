//! The generic `apply` recursion (`spec.md` §4.6).
//!
//! Memoised on `(operator, lhs, rhs)` identity so each pair is processed at
//! most once; work is `O(|d1| * |d2|)` worst case, typically far less
//! thanks to operator short-circuits and the reduction invariant.

use crate::manager::NodeManager;
use crate::node::{Node, NodeId};
use crate::operators::{apply_operator, Operator, Val};

fn value_or_nondetermined(manager: &NodeManager, id: NodeId) -> Val {
    match manager.get(id) {
        Node::Terminal(v) => Val::Value(*v),
        Node::Internal { .. } => Val::Nondetermined,
    }
}

/// Terminals sit conceptually beyond every real level (`spec.md` §3's
/// sentinel "leaf level"), so they never win a `min(level(l), level(r))`
/// comparison against an internal node.
fn level_of(manager: &NodeManager, id: NodeId) -> u32 {
    match manager.get(id) {
        Node::Terminal(_) => u32::MAX,
        Node::Internal { index, .. } => manager.level(*index),
    }
}

/// Top-level entry point: computes `v -> Op(d1(v), d2(v))` and runs
/// `adjust_sizes` once the recursion settles, as `spec.md` §4.6 requires.
///
/// The fresh result carries a ref count of zero until its caller claims
/// ownership (e.g. `DiagramManager::wrap`), but `adjust_sizes` may collect
/// garbage in that same window. A transient ref protects it from being
/// swept up as if it were itself unreachable.
pub fn apply<Op: Operator>(manager: &mut NodeManager, d1: NodeId, d2: NodeId) -> NodeId {
    let result = apply_step::<Op>(manager, d1, d2);
    manager.inc_ref(result);
    manager.adjust_sizes();
    manager.dec_ref(result);
    result
}

/// The recursive step, without the top-level `adjust_sizes` call — used
/// both by [`apply`] and by callers (e.g. `from_vector`) that want to fold
/// several `apply` calls before paying for size adjustment once.
pub fn apply_step<Op: Operator>(manager: &mut NodeManager, l: NodeId, r: NodeId) -> NodeId {
    let probe = {
        let cache = manager.cache_entry(Op::ID);
        cache.find(Op::ID, Op::COMMUTATIVE, l, r)
    };
    if let Some(result) = manager
        .cache_entry(Op::ID)
        .matches(&probe, Op::ID, Op::COMMUTATIVE, l, r)
    {
        return result;
    }

    let lv = value_or_nondetermined(manager, l);
    let rv = value_or_nondetermined(manager, r);
    let modulus = manager.domain().max_size();
    let ov = apply_operator::<Op>(lv, rv, modulus);

    let u = match ov {
        Val::Value(v) => manager.terminal_node(v),
        Val::Undefined => manager.terminal_node(modulus),
        Val::Nondetermined => {
            let level_l = level_of(manager, l);
            let level_r = level_of(manager, r);
            let top_level = level_l.min(level_r);
            let index = manager.index_at_level(top_level);
            let degree = manager.domain().size(index) as usize;

            let mut sons = Vec::with_capacity(degree);
            for k in 0..degree {
                let fst = if level_l == top_level {
                    manager.get(l).get_son(k)
                } else {
                    l
                };
                let snd = if level_r == top_level {
                    manager.get(r).get_son(k)
                } else {
                    r
                };
                sons.push(apply_step::<Op>(manager, fst, snd));
            }
            manager.internal_node(index, sons)
        }
    };

    manager
        .cache_entry(Op::ID)
        .put(&probe, Op::ID, Op::COMMUTATIVE, l, r, u);
    u
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::manager::{ManagerConfig, NodeManager};
    use crate::operators::{And, Or, Xor};

    fn variable(manager: &mut NodeManager, index: u32) -> NodeId {
        let degree = manager.domain().size(index) as usize;
        let sons: Vec<NodeId> = (0..degree as u32).map(|v| manager.terminal_node(v)).collect();
        manager.internal_node(index, sons)
    }

    #[test]
    fn and_of_two_variables() {
        let mut mgr = NodeManager::new(2, Domain::Fixed(2), ManagerConfig::default());
        let x0 = variable(&mut mgr, 0);
        let x1 = variable(&mut mgr, 1);
        let d = apply::<And>(&mut mgr, x0, x1);

        assert_eq!(crate::diagram::evaluate(&mgr, d, &[0, 0]), 0);
        assert_eq!(crate::diagram::evaluate(&mgr, d, &[0, 1]), 0);
        assert_eq!(crate::diagram::evaluate(&mgr, d, &[1, 0]), 0);
        assert_eq!(crate::diagram::evaluate(&mgr, d, &[1, 1]), 1);
    }

    #[test]
    fn apply_is_idempotent_on_identical_diagrams() {
        let mut mgr = NodeManager::new(2, Domain::Fixed(2), ManagerConfig::default());
        let x0 = variable(&mut mgr, 0);
        let x1 = variable(&mut mgr, 1);
        let d = apply::<Or>(&mut mgr, x0, x1);
        assert_eq!(apply::<And>(&mut mgr, d, d), d);
        assert_eq!(apply::<Or>(&mut mgr, d, d), d);
        let zero = mgr.terminal_node(0);
        assert_eq!(apply::<Xor>(&mut mgr, d, d), zero);
    }

    #[test]
    fn commutative_apply_returns_same_root() {
        let mut mgr = NodeManager::new(2, Domain::Fixed(2), ManagerConfig::default());
        let x0 = variable(&mut mgr, 0);
        let x1 = variable(&mut mgr, 1);
        let d1 = apply::<Or>(&mut mgr, x0, x1);
        let d2 = apply::<Or>(&mut mgr, x1, x0);
        assert_eq!(d1, d2);
    }

    #[cfg(feature = "proptest")]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn and_matches_bitwise_and(bits in prop::collection::vec(any::<bool>(), 3)) {
                let mut mgr = NodeManager::new(3, Domain::Fixed(2), ManagerConfig::default());
                let vars: Vec<NodeId> = (0..3).map(|i| variable(&mut mgr, i)).collect();
                let ab = apply::<And>(&mut mgr, vars[0], vars[1]);
                let d = apply::<And>(&mut mgr, ab, vars[2]);
                let assignment: Vec<u32> = bits.iter().map(|&b| b as u32).collect();
                let expected = (bits[0] && bits[1] && bits[2]) as u32;
                prop_assert_eq!(crate::diagram::evaluate(&mgr, d, &assignment), expected);
            }

            #[test]
            fn apply_is_insensitive_to_operand_order_for_commutative_ops(
                bits in prop::collection::vec(any::<bool>(), 2)
            ) {
                let mut mgr = NodeManager::new(2, Domain::Fixed(2), ManagerConfig::default());
                let x0 = variable(&mut mgr, 0);
                let x1 = variable(&mut mgr, 1);
                let fwd = apply::<Xor>(&mut mgr, x0, x1);
                let rev = apply::<Xor>(&mut mgr, x1, x0);
                let assignment: Vec<u32> = bits.iter().map(|&b| b as u32).collect();
                prop_assert_eq!(
                    crate::diagram::evaluate(&mgr, fwd, &assignment),
                    crate::diagram::evaluate(&mgr, rev, &assignment)
                );
            }
        }
    }
}
