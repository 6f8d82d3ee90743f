//! GraphViz DOT export (`spec.md` §6.1). Whole-manager and single-diagram
//! variants share the same structural output; only the set of nodes
//! visited differs.

use crate::manager::NodeManager;
use crate::node::{Node, NodeId};
use std::collections::BTreeMap;
use std::fmt::Write as _;

fn label(node: &Node) -> String {
    match node {
        Node::Terminal(v) => v.to_string(),
        Node::Internal { index, .. } => format!("x{index}"),
    }
}

fn render<'a>(manager: &NodeManager, nodes: impl Iterator<Item = (NodeId, &'a Node)>) -> String
where
    Node: 'a,
{
    let binary = manager.domain().is_binary();
    let mut terminals = Vec::new();
    let mut labels = Vec::new();
    let mut edges = Vec::new();
    // level -> node ids sharing that rank; terminals all share the bottom rank.
    let mut ranks: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    let bottom_rank = u32::MAX;

    for (id, node) in nodes {
        let raw = id.0;
        labels.push((raw, label(node)));
        match node {
            Node::Terminal(_) => {
                terminals.push(raw);
                ranks.entry(bottom_rank).or_default().push(raw);
            }
            Node::Internal { index, sons } => {
                let level = manager.level(*index);
                ranks.entry(level).or_default().push(raw);
                for (k, son) in sons.iter().enumerate() {
                    if binary {
                        let style = if k == 0 { "dashed" } else { "solid" };
                        edges.push(format!("    {} -> {} [style = {}];", raw, son.0, style));
                    } else {
                        edges.push(format!("    {} -> {} [label = {}];", raw, son.0, k));
                    }
                }
            }
        }
    }

    let mut out = String::new();
    writeln!(out, "digraph DD {{").unwrap();
    write!(out, "    node [shape = square]").unwrap();
    for t in &terminals {
        write!(out, " {t}").unwrap();
    }
    writeln!(out, " ;").unwrap();
    writeln!(out, "    node [shape = circle];").unwrap();
    writeln!(out).unwrap();
    for (id, lbl) in &labels {
        writeln!(out, "    {id} [label = \"{lbl}\"];").unwrap();
    }
    writeln!(out).unwrap();
    for edge in &edges {
        writeln!(out, "{edge}").unwrap();
    }
    writeln!(out).unwrap();
    for (_, ids) in ranks {
        if ids.is_empty() {
            continue;
        }
        let joined = ids
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "    {{ rank = same; {joined} }}").unwrap();
    }
    writeln!(out, "}}").unwrap();
    out
}

/// DOT for the subgraph reachable from a single diagram's root.
pub fn diagram_to_dot(manager: &mut NodeManager, root: NodeId) -> String {
    let mut nodes: Vec<(NodeId, Node)> = Vec::new();
    crate::traversal::pre_order(manager, root, |id, node| nodes.push((id, node.clone())));
    render(manager, nodes.iter().map(|(id, n)| (*id, n)))
}

/// DOT for every live node currently owned by the manager.
pub fn manager_to_dot(manager: &NodeManager) -> String {
    let mut nodes: Vec<(NodeId, Node)> = Vec::new();
    for index in 0..manager.var_count() as u32 {
        for id in manager.unique_table_ids(index) {
            nodes.push((id, manager.get(id).clone()));
        }
    }
    for id in manager.terminal_ids() {
        nodes.push((id, manager.get(id).clone()));
    }
    render(manager, nodes.iter().map(|(id, n)| (*id, n)))
}
