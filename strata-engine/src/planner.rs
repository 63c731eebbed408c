//! Execution planner.
//!
//! Turns an immutable (nodes, connections) snapshot into an ordered
//! sequence of parallel-safe layers. Planning is a pure function: no I/O,
//! no concurrency, and total — it never fails and never loops, even on
//! cyclic input.
//!
//! Every connection, data *and* execution, counts as an ordinary
//! dependency edge for layering purposes. Nodes left unresolved by a cycle
//! are appended as a single trailing fallback layer instead of failing the
//! whole graph.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use strata_core::graph::{ConnectionDescriptor, NodeDescriptor};

/// A set of nodes that may execute concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionLayer {
    /// The layer's nodes, in ordinal node-id order.
    pub nodes: Vec<NodeDescriptor>,
}

impl ExecutionLayer {
    /// The ids of the nodes in this layer.
    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    /// Number of nodes in the layer.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the layer is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether the layer contains a node.
    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == node_id)
    }
}

/// An ordered sequence of execution layers.
///
/// Layer order is a strict barrier: layer N+1 never starts before every
/// node in layer N has finished. The layers partition the node-id set
/// exactly once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecutionPlan {
    layers: Vec<ExecutionLayer>,
}

impl ExecutionPlan {
    /// The plan's layers in execution order.
    pub fn layers(&self) -> &[ExecutionLayer] {
        &self.layers
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if the plan has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Total number of nodes across all layers.
    pub fn node_count(&self) -> usize {
        self.layers.iter().map(ExecutionLayer::len).sum()
    }

    /// The index of the layer containing a node, if any.
    pub fn layer_of(&self, node_id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.contains(node_id))
    }
}

/// Build an execution plan from a graph snapshot.
///
/// Deterministic variant of Kahn's algorithm:
/// - in-degrees and successor sets are built from all connections;
///   connections referencing unknown node ids are ignored, and duplicate
///   edges between the same node pair count once;
/// - each round snapshots the current ready set (ordinal node-id order) as
///   one layer; nodes released by that layer only become ready in the
///   *next* round, preserving strict layering;
/// - nodes still unresolved when the ready set empties (a cycle, or
///   dependents of one) form a single trailing fallback layer.
///
/// The same node/connection sets yield structurally identical plans
/// regardless of input order.
pub fn build_plan(
    nodes: &[NodeDescriptor],
    connections: &[ConnectionDescriptor],
) -> ExecutionPlan {
    // Node ids are unique within a run; tolerate duplicates by keeping the
    // first descriptor.
    let mut known: BTreeMap<&str, &NodeDescriptor> = BTreeMap::new();
    for node in nodes {
        known.entry(node.id.as_str()).or_insert(node);
    }

    let mut in_degree: HashMap<&str, usize> = known.keys().map(|&id| (id, 0)).collect();
    let mut successors: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    let mut seen_edges: HashSet<(&str, &str)> = HashSet::new();

    for conn in connections {
        let from = conn.output_node.as_str();
        let to = conn.input_node.as_str();
        if !known.contains_key(from) || !known.contains_key(to) {
            continue;
        }
        if seen_edges.insert((from, to)) {
            successors.entry(from).or_default().insert(to);
            *in_degree.get_mut(to).expect("endpoint is known") += 1;
        }
    }

    // Seed with every node that has no incoming edges; BTreeMap iteration
    // gives ordinal id order.
    let mut ready: Vec<&str> = known
        .keys()
        .filter(|&&id| in_degree[id] == 0)
        .copied()
        .collect();

    let mut placed: HashSet<&str> = HashSet::new();
    let mut layers: Vec<ExecutionLayer> = Vec::new();

    while !ready.is_empty() {
        let mut next_ready: Vec<&str> = Vec::new();

        for &id in &ready {
            placed.insert(id);
            if let Some(succs) = successors.get(id) {
                for &succ in succs {
                    let degree = in_degree.get_mut(succ).expect("endpoint is known");
                    *degree -= 1;
                    if *degree == 0 {
                        next_ready.push(succ);
                    }
                }
            }
        }

        layers.push(ExecutionLayer {
            nodes: ready.iter().map(|&id| known[id].clone()).collect(),
        });

        next_ready.sort_unstable();
        ready = next_ready;
    }

    // Anything left is part of a cycle or depends on one. Never block the
    // whole graph on it: append one trailing fallback layer.
    let unresolved: Vec<&str> = known
        .keys()
        .filter(|&&id| !placed.contains(id))
        .copied()
        .collect();
    if !unresolved.is_empty() {
        tracing::warn!(
            nodes = ?unresolved,
            "Unresolved dependencies (cycle?); appending fallback layer"
        );
        layers.push(ExecutionLayer {
            nodes: unresolved.iter().map(|&id| known[id].clone()).collect(),
        });
    }

    ExecutionPlan { layers }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> NodeDescriptor {
        NodeDescriptor::new(id)
    }

    fn conn(from: &str, to: &str) -> ConnectionDescriptor {
        ConnectionDescriptor::new(from, "out", to, "in")
    }

    fn layer_ids(plan: &ExecutionPlan, index: usize) -> Vec<String> {
        plan.layers()[index].node_ids()
    }

    #[test]
    fn empty_graph_yields_empty_plan() {
        let plan = build_plan(&[], &[]);
        assert!(plan.is_empty());
        assert_eq!(plan.node_count(), 0);
    }

    #[test]
    fn diamond_with_two_roots() {
        // A→C, B→C, C→D, C→E  ⇒  [{A,B}, {C}, {D,E}]
        let nodes = vec![node("A"), node("B"), node("C"), node("D"), node("E")];
        let connections = vec![
            conn("A", "C"),
            conn("B", "C"),
            conn("C", "D"),
            conn("C", "E"),
        ];

        let plan = build_plan(&nodes, &connections);
        assert_eq!(plan.len(), 3);
        assert_eq!(layer_ids(&plan, 0), vec!["A", "B"]);
        assert_eq!(layer_ids(&plan, 1), vec!["C"]);
        assert_eq!(layer_ids(&plan, 2), vec!["D", "E"]);
    }

    #[test]
    fn layers_partition_all_nodes_exactly_once() {
        let nodes = vec![node("a"), node("b"), node("c"), node("d")];
        let connections = vec![conn("a", "b"), conn("b", "c"), conn("a", "d")];

        let plan = build_plan(&nodes, &connections);
        assert_eq!(plan.node_count(), nodes.len());

        for n in &nodes {
            assert!(plan.layer_of(&n.id).is_some());
        }
    }

    #[test]
    fn every_node_is_placed_after_its_dependencies() {
        let nodes = vec![node("a"), node("b"), node("c"), node("d"), node("e")];
        let connections = vec![
            conn("a", "c"),
            conn("b", "c"),
            conn("c", "d"),
            conn("d", "e"),
            conn("a", "e"),
        ];

        let plan = build_plan(&nodes, &connections);
        for c in &connections {
            let from = plan.layer_of(&c.output_node).unwrap();
            let to = plan.layer_of(&c.input_node).unwrap();
            assert!(to > from, "{} must come after {}", c.input_node, c.output_node);
        }
    }

    #[test]
    fn execution_edges_count_as_dependencies() {
        let nodes = vec![node("start"), node("work")];
        let connections = vec![ConnectionDescriptor::execution("start", "done", "work", "run")];

        let plan = build_plan(&nodes, &connections);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.layer_of("start"), Some(0));
        assert_eq!(plan.layer_of("work"), Some(1));
    }

    #[test]
    fn cycle_lands_in_single_trailing_fallback_layer() {
        let nodes = vec![node("a"), node("b"), node("c"), node("d")];
        let connections = vec![
            conn("a", "b"),
            conn("b", "c"),
            conn("c", "b"), // cycle b↔c
            conn("c", "d"), // d depends on the cycle
        ];

        let plan = build_plan(&nodes, &connections);
        assert_eq!(plan.len(), 2);
        assert_eq!(layer_ids(&plan, 0), vec!["a"]);
        // b, c, and their dependent d all fall back together.
        assert_eq!(layer_ids(&plan, 1), vec!["b", "c", "d"]);
        assert_eq!(plan.node_count(), 4);
    }

    #[test]
    fn self_loop_falls_back() {
        let nodes = vec![node("a"), node("loop")];
        let connections = vec![conn("loop", "loop")];

        let plan = build_plan(&nodes, &connections);
        assert_eq!(plan.len(), 2);
        assert_eq!(layer_ids(&plan, 0), vec!["a"]);
        assert_eq!(layer_ids(&plan, 1), vec!["loop"]);
    }

    #[test]
    fn connection_to_unknown_node_is_ignored() {
        let nodes = vec![node("a"), node("b")];
        let connections = vec![
            conn("ghost", "b"), // unknown source
            conn("a", "phantom"), // unknown target
        ];

        let plan = build_plan(&nodes, &connections);
        // Both real nodes stay in the earliest eligible layer.
        assert_eq!(plan.len(), 1);
        assert_eq!(layer_ids(&plan, 0), vec!["a", "b"]);
    }

    #[test]
    fn duplicate_edges_count_once() {
        let nodes = vec![node("a"), node("b")];
        let connections = vec![
            ConnectionDescriptor::new("a", "x", "b", "p"),
            ConnectionDescriptor::new("a", "y", "b", "q"),
        ];

        let plan = build_plan(&nodes, &connections);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.layer_of("b"), Some(1));
    }

    #[test]
    fn plan_is_deterministic_under_input_reordering() {
        let nodes = vec![node("n3"), node("n1"), node("n2"), node("n4")];
        let connections = vec![conn("n1", "n3"), conn("n2", "n3"), conn("n3", "n4")];

        let plan_a = build_plan(&nodes, &connections);

        let mut shuffled_nodes = nodes.clone();
        shuffled_nodes.reverse();
        let mut shuffled_connections = connections.clone();
        shuffled_connections.reverse();
        let plan_b = build_plan(&shuffled_nodes, &shuffled_connections);

        assert_eq!(plan_a, plan_b);
    }

    #[test]
    fn ready_set_is_ordinally_ordered() {
        let nodes = vec![node("zeta"), node("alpha"), node("mid")];
        let plan = build_plan(&nodes, &[]);
        assert_eq!(layer_ids(&plan, 0), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn duplicate_node_ids_keep_first_descriptor() {
        let nodes = vec![node("a").with_name("first"), node("a").with_name("second")];
        let plan = build_plan(&nodes, &[]);
        assert_eq!(plan.node_count(), 1);
        assert_eq!(plan.layers()[0].nodes[0].name, "first");
    }
}
