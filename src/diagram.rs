//! The diagram handle and the `DiagramManager` facade (`spec.md` §2's
//! points 6-7, §3's "Diagram handle" row, §4.8 `evaluate`).
//!
//! A [`Diagram`] is an owning, reference-counted handle to a root node; its
//! `Clone`/`Drop` impls are the RAII increment/decrement the spec
//! describes. [`DiagramManager`] is the thin facade users actually program
//! against: `constant`, `variable`, `apply`, `evaluate`, `node_count`,
//! `to_dot`, plus the `from_vector`/`from_pla` convenience constructors
//! added in `SPEC_FULL.md` §E.3.

use crate::apply::apply as apply_generic;
use crate::domain::Domain;
use crate::manager::{ManagerConfig, NodeManager};
use crate::node::{Node, NodeId};
use crate::operators::Operator;
use crate::pla::ParsedPla;
use crate::traversal::count_reachable;
use std::cell::RefCell;
use std::rc::Rc;

/// `evaluate(d, vars)` (`spec.md` §4.8): walk from the root, taking the son
/// indexed by `vars[index]` at each internal node, until a terminal is
/// reached. `vars[i]` out of range for `D(i)` is a precondition violation.
pub fn evaluate(manager: &NodeManager, root: NodeId, vars: &[u32]) -> u32 {
    let mut current = root;
    loop {
        match manager.get(current) {
            Node::Terminal(v) => return *v,
            Node::Internal { index, .. } => {
                let value = vars[*index as usize];
                assert!(
                    value < manager.domain().size(*index),
                    "evaluate: assignment {value} out of range for variable {index}"
                );
                current = manager.get(current).get_son(value as usize);
            }
        }
    }
}

/// An owning, ref-counted handle to a root node (`spec.md` §3). Must not
/// outlive the [`DiagramManager`] that produced it.
pub struct Diagram {
    manager: Rc<RefCell<NodeManager>>,
    root: NodeId,
}

impl Diagram {
    pub fn root(&self) -> NodeId {
        self.root
    }
}

impl Clone for Diagram {
    fn clone(&self) -> Self {
        self.manager.borrow_mut().inc_ref(self.root);
        Diagram {
            manager: self.manager.clone(),
            root: self.root,
        }
    }
}

impl Drop for Diagram {
    fn drop(&mut self) {
        self.manager.borrow_mut().dec_ref(self.root);
    }
}

pub struct DiagramManager {
    manager: Rc<RefCell<NodeManager>>,
}

impl DiagramManager {
    pub fn new(var_count: usize, domain: Domain, config: ManagerConfig) -> Self {
        DiagramManager {
            manager: Rc::new(RefCell::new(NodeManager::new(var_count, domain, config))),
        }
    }

    fn wrap(&self, root: NodeId) -> Diagram {
        self.manager.borrow_mut().inc_ref(root);
        Diagram {
            manager: self.manager.clone(),
            root,
        }
    }

    pub fn constant(&self, value: u32) -> Diagram {
        let root = self.manager.borrow_mut().terminal_node(value);
        self.wrap(root)
    }

    pub fn variable(&self, index: u32) -> Diagram {
        let mut manager = self.manager.borrow_mut();
        let degree = manager.domain().size(index);
        let sons: Vec<NodeId> = (0..degree).map(|v| manager.terminal_node(v)).collect();
        let root = manager.internal_node(index, sons);
        drop(manager);
        self.wrap(root)
    }

    pub fn apply<Op: Operator>(&self, lhs: &Diagram, rhs: &Diagram) -> Diagram {
        let root = apply_generic::<Op>(&mut self.manager.borrow_mut(), lhs.root, rhs.root);
        self.wrap(root)
    }

    pub fn evaluate(&self, d: &Diagram, vars: &[u32]) -> u32 {
        evaluate(&self.manager.borrow(), d.root, vars)
    }

    /// Node count reachable from `d`'s root (`spec.md` §8: `node_count(d)`),
    /// distinct from [`NodeManager::node_count`]'s whole-manager counter.
    pub fn node_count(&self, d: &Diagram) -> usize {
        count_reachable(&mut self.manager.borrow_mut(), d.root)
    }

    /// Whole-manager node count (`spec.md` §4.5/§8 scenario 3).
    pub fn manager_node_count(&self) -> usize {
        self.manager.borrow().node_count()
    }

    pub fn swap_vars(&self, index: u32) {
        self.manager.borrow_mut().swap_vars(index);
    }

    pub fn sift_vars(&self) {
        self.manager.borrow_mut().sift_vars();
    }

    pub fn to_dot(&self, d: &Diagram) -> String {
        crate::dot::diagram_to_dot(&mut self.manager.borrow_mut(), d.root)
    }

    pub fn to_dot_manager(&self) -> String {
        crate::dot::manager_to_dot(&self.manager.borrow())
    }

    /// Builds a diagram directly from a full `domain-product`-entry truth
    /// table, ordered so the last variable varies fastest (`SPEC_FULL.md`
    /// §E.3, grounded on `original_source/include/teddy/impl/.../truth_vector.hpp`).
    pub fn from_vector(&self, values: &[u32]) -> Diagram {
        let var_count = self.manager.borrow().var_count();
        assert!(var_count > 0, "from_vector requires at least one variable");
        let mut manager = self.manager.borrow_mut();
        let root = build_from_vector(&mut manager, 0, var_count, values);
        drop(manager);
        self.wrap(root)
    }

    /// Builds a diagram representing the logical OR of every PLA product
    /// line's output column `output_index` (`SPEC_FULL.md` §E.3, §6.2).
    pub fn from_pla(&self, pla: &ParsedPla, output_index: usize) -> Diagram {
        use crate::operators::Or;
        use crate::pla::CubeValue;

        let mut acc = self.constant(0);
        for product in &pla.products {
            if product.outputs[output_index] != CubeValue::One {
                continue;
            }
            let mut term = self.constant(1);
            for (i, cube_val) in product.cube.iter().enumerate() {
                if *cube_val == CubeValue::DontCare {
                    continue;
                }
                let lit = if *cube_val == CubeValue::One {
                    self.variable(i as u32)
                } else {
                    let v = self.variable(i as u32);
                    let one = self.constant(1);
                    self.apply::<crate::operators::Xor>(&v, &one)
                };
                term = self.apply::<crate::operators::And>(&term, &lit);
            }
            acc = self.apply::<Or>(&acc, &term);
        }
        acc
    }
}

fn build_from_vector(
    manager: &mut NodeManager,
    var_index: usize,
    var_count: usize,
    values: &[u32],
) -> NodeId {
    if var_index == var_count {
        return manager.terminal_node(values[0]);
    }
    let degree = manager.domain().size(var_index as u32) as usize;
    let chunk = values.len() / degree;
    let mut sons = Vec::with_capacity(degree);
    for v in 0..degree {
        let slice = &values[v * chunk..(v + 1) * chunk];
        sons.push(build_from_vector(manager, var_index + 1, var_count, slice));
    }
    manager.internal_node(var_index as u32, sons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::And;

    #[test]
    fn evaluate_matches_variable_projection() {
        let dm = DiagramManager::new(2, Domain::Fixed(2), ManagerConfig::default());
        let x0 = dm.variable(0);
        assert_eq!(dm.evaluate(&x0, &[0, 0]), 0);
        assert_eq!(dm.evaluate(&x0, &[1, 0]), 1);
    }

    #[test]
    fn node_count_bounded_by_manager_count() {
        let dm = DiagramManager::new(2, Domain::Fixed(2), ManagerConfig::default());
        let x0 = dm.variable(0);
        let x1 = dm.variable(1);
        let d = dm.apply::<And>(&x0, &x1);
        assert!(dm.node_count(&d) <= dm.manager_node_count());
    }

    #[test]
    fn from_vector_matches_mixed_domain_example() {
        // spec.md §8 scenario 2: 4 variables, domains [2,3,2,3].
        let dm = DiagramManager::new(4, Domain::Mixed(vec![2, 3, 2, 3]), ManagerConfig::default());
        let values: Vec<u32> = vec![
            0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2,
            2, 1, 2, 2, 2, 2, 2,
        ];
        let d = dm.from_vector(&values);
        assert_eq!(dm.evaluate(&d, &[0, 0, 0, 0]), 0);
        assert_eq!(dm.evaluate(&d, &[0, 0, 0, 1]), 1);
        assert_eq!(dm.evaluate(&d, &[1, 0, 0, 0]), 0);
        assert_eq!(dm.evaluate(&d, &[1, 1, 1, 1]), 2);
    }
}
