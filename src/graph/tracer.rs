use std::collections::{BTreeSet, HashSet};

use crate::graph::GraphStore;
use crate::models::FlowStep;

/// Bounded depth-first enumeration of data flows out of the changed
/// components.
///
/// Cycle protection is per-branch: the visited set is cloned when recursing
/// into a neighbor, so a node may be revisited via a sibling branch. That
/// favors completeness of representative paths over a minimal path count,
/// and is kept finite by the depth bound, a per-level neighbor cap and a
/// hard per-seed step cap.
pub struct DataFlowTracer<'a> {
    store: &'a GraphStore,
    max_depth: u32,
}

pub const DEFAULT_FLOW_DEPTH: u32 = 5;

/// Soft cap on neighbors expanded at each level of the walk.
const NEIGHBORS_PER_LEVEL: usize = 5;

/// Hard resource bound on steps emitted per seed.
const MAX_STEPS_PER_SEED: usize = 512;

impl<'a> DataFlowTracer<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self {
            store,
            max_depth: DEFAULT_FLOW_DEPTH,
        }
    }

    pub fn with_max_depth(store: &'a GraphStore, max_depth: u32) -> Self {
        Self { store, max_depth }
    }

    pub fn trace_flows(&self, seeds: &BTreeSet<String>) -> Vec<FlowStep> {
        let mut steps = Vec::new();
        for seed in seeds {
            if !self.store.contains(seed) {
                continue;
            }
            let budget = steps.len() + MAX_STEPS_PER_SEED;
            let mut visited = HashSet::new();
            visited.insert(seed.clone());
            self.walk(seed, 1, &visited, budget, &mut steps);
        }
        steps
    }

    fn walk(
        &self,
        current: &str,
        depth: u32,
        visited: &HashSet<String>,
        budget: usize,
        steps: &mut Vec<FlowStep>,
    ) {
        if depth > self.max_depth {
            return;
        }

        for neighbor in self.store.neighbors(current).iter().take(NEIGHBORS_PER_LEVEL) {
            if steps.len() >= budget {
                return;
            }
            if visited.contains(&neighbor.id) {
                continue;
            }

            let edge = self.store.edge(neighbor.edge_index);
            steps.push(FlowStep {
                from: current.to_string(),
                to: neighbor.id.clone(),
                edge_kind: edge.kind,
                weight: edge.weight,
                depth,
            });

            // Branch-local visited set: siblings may revisit this node.
            let mut branch_visited = visited.clone();
            branch_visited.insert(neighbor.id.clone());
            self.walk(&neighbor.id, depth + 1, &branch_visited, budget, steps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::store::test_support::*;
    use crate::models::{EdgeKind, NodeKind};

    fn seeds(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_steps_record_edge_metadata_and_depth() {
        let store = GraphStore::new(graph(
            vec![
                node("A", NodeKind::Class, 0, 1),
                node("B", NodeKind::Class, 1, 1),
                node("C", NodeKind::Function, 1, 0),
            ],
            vec![
                edge("A", "B", EdgeKind::MethodCall),
                edge("B", "C", EdgeKind::StaticCall),
            ],
        ));

        let tracer = DataFlowTracer::new(&store);
        let steps = tracer.trace_flows(&seeds(&["A"]));

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].from, "A");
        assert_eq!(steps[0].to, "B");
        assert_eq!(steps[0].edge_kind, EdgeKind::MethodCall);
        assert_eq!(steps[0].depth, 1);
        assert_eq!(steps[1].from, "B");
        assert_eq!(steps[1].to, "C");
        assert_eq!(steps[1].depth, 2);
    }

    #[test]
    fn test_depth_bound_is_respected() {
        // A chain longer than the depth bound.
        let ids = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let nodes = ids
            .iter()
            .map(|id| node(id, NodeKind::Function, 1, 1))
            .collect();
        let edges = ids
            .windows(2)
            .map(|w| edge(w[0], w[1], EdgeKind::StaticCall))
            .collect();
        let store = GraphStore::new(graph(nodes, edges));

        let tracer = DataFlowTracer::with_max_depth(&store, 3);
        let steps = tracer.trace_flows(&seeds(&["A"]));
        assert!(steps.iter().all(|s| s.depth <= 3));
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn test_sibling_branches_may_revisit_a_node() {
        // A fans out to B and C, both of which reach D.
        let store = GraphStore::new(graph(
            vec![
                node("A", NodeKind::Class, 0, 2),
                node("B", NodeKind::Function, 1, 1),
                node("C", NodeKind::Function, 1, 1),
                node("D", NodeKind::Function, 2, 0),
            ],
            vec![
                edge("A", "B", EdgeKind::MethodCall),
                edge("A", "C", EdgeKind::MethodCall),
                edge("B", "D", EdgeKind::StaticCall),
                edge("C", "D", EdgeKind::StaticCall),
            ],
        ));

        let tracer = DataFlowTracer::new(&store);
        let steps = tracer.trace_flows(&seeds(&["A"]));
        let arrivals_at_d = steps.iter().filter(|s| s.to == "D").count();
        assert_eq!(arrivals_at_d, 2);
    }

    #[test]
    fn test_cycles_do_not_loop_within_a_branch() {
        let store = GraphStore::new(graph(
            vec![
                node("A", NodeKind::Class, 1, 1),
                node("B", NodeKind::Class, 1, 1),
            ],
            vec![
                edge("A", "B", EdgeKind::MethodCall),
                edge("B", "A", EdgeKind::MethodCall),
            ],
        ));

        let tracer = DataFlowTracer::new(&store);
        let steps = tracer.trace_flows(&seeds(&["A"]));
        assert!(steps.len() <= 2 * MAX_STEPS_PER_SEED);
        // Within one branch A cannot be re-entered.
        assert!(steps.iter().filter(|s| s.from == "A" && s.to == "B").count() <= 2);
    }

    #[test]
    fn test_neighbor_cap_limits_fanout_per_level() {
        // A hub with more direct neighbors than the per-level cap.
        let mut nodes = vec![node("Hub", NodeKind::Class, 0, 8)];
        let mut edges = Vec::new();
        for i in 0..8 {
            let leaf = format!("Leaf{}", i);
            nodes.push(node(&leaf, NodeKind::Function, 1, 0));
            edges.push(edge("Hub", &leaf, EdgeKind::MethodCall));
        }
        let store = GraphStore::new(graph(nodes, edges));

        let tracer = DataFlowTracer::new(&store);
        let steps = tracer.trace_flows(&seeds(&["Hub"]));

        assert_eq!(steps.len(), NEIGHBORS_PER_LEVEL);
        assert!(steps.iter().all(|s| s.depth == 1));
    }

    #[test]
    fn test_step_cap_bounds_dense_graphs() {
        // A ternary tree with far more edges than the per-seed cap.
        let total = 1093; // 7 full levels
        let nodes = (0..total)
            .map(|i| node(&format!("n{}", i), NodeKind::Function, 1, 3))
            .collect();
        let mut edges = Vec::new();
        for i in 0..total {
            for child in (3 * i + 1)..=(3 * i + 3) {
                if child < total {
                    edges.push(edge(
                        &format!("n{}", i),
                        &format!("n{}", child),
                        EdgeKind::StaticCall,
                    ));
                }
            }
        }
        let store = GraphStore::new(graph(nodes, edges));

        let tracer = DataFlowTracer::with_max_depth(&store, 6);
        let steps = tracer.trace_flows(&seeds(&["n0"]));
        assert_eq!(steps.len(), MAX_STEPS_PER_SEED);

        // The cap is per seed, not global.
        let steps = tracer.trace_flows(&seeds(&["n0", "n1"]));
        assert_eq!(steps.len(), 2 * MAX_STEPS_PER_SEED);
    }

    #[test]
    fn test_missing_seed_contributes_nothing() {
        let store = GraphStore::empty();
        let tracer = DataFlowTracer::new(&store);
        assert!(tracer.trace_flows(&seeds(&["Ghost"])).is_empty());
    }
}
