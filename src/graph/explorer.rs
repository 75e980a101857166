use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::graph::GraphStore;

/// Bounded breadth-first discovery of the components related to a change.
///
/// The result is the blast radius of a seed: every component reachable
/// within `max_depth` undirected hops, excluding the seed itself.
pub struct RelationshipExplorer<'a> {
    store: &'a GraphStore,
    max_depth: u32,
}

pub const DEFAULT_RELATION_DEPTH: u32 = 3;

impl<'a> RelationshipExplorer<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self {
            store,
            max_depth: DEFAULT_RELATION_DEPTH,
        }
    }

    pub fn with_max_depth(store: &'a GraphStore, max_depth: u32) -> Self {
        Self { store, max_depth }
    }

    /// Components within `max_depth` hops of `seed`. A seed absent from the
    /// store yields an empty set; depth 0 yields an empty set.
    pub fn related_components(&self, seed: &str) -> BTreeSet<String> {
        let mut related = BTreeSet::new();
        if !self.store.contains(seed) || self.max_depth == 0 {
            return related;
        }

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(seed.to_string());

        let mut queue: VecDeque<(String, u32)> = VecDeque::new();
        queue.push_back((seed.to_string(), 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= self.max_depth {
                continue;
            }
            for neighbor in self.store.neighbors(&current) {
                if visited.insert(neighbor.id.clone()) {
                    related.insert(neighbor.id.clone());
                    queue.push_back((neighbor.id.clone(), depth + 1));
                }
            }
        }

        related
    }

    /// Union of the blast radii of all seeds, traversed independently.
    pub fn related_to_all<I, S>(&self, seeds: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut union = BTreeSet::new();
        for seed in seeds {
            union.extend(self.related_components(seed.as_ref()));
        }
        union
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::store::test_support::*;
    use crate::models::{EdgeKind, NodeKind};

    fn chain_store() -> GraphStore {
        // A - B - C - D - E, plus a cycle C - A
        GraphStore::new(graph(
            vec![
                node("A", NodeKind::Class, 1, 1),
                node("B", NodeKind::Class, 1, 1),
                node("C", NodeKind::Class, 2, 1),
                node("D", NodeKind::Function, 1, 1),
                node("E", NodeKind::Function, 1, 0),
            ],
            vec![
                edge("A", "B", EdgeKind::MethodCall),
                edge("B", "C", EdgeKind::MethodCall),
                edge("C", "D", EdgeKind::StaticCall),
                edge("D", "E", EdgeKind::StaticCall),
                edge("C", "A", EdgeKind::Instantiates),
            ],
        ))
    }

    #[test]
    fn test_zero_depth_yields_empty_set() {
        let store = chain_store();
        let explorer = RelationshipExplorer::with_max_depth(&store, 0);
        assert!(explorer.related_components("A").is_empty());
    }

    #[test]
    fn test_seed_excluded_from_own_result() {
        let store = chain_store();
        let explorer = RelationshipExplorer::with_max_depth(&store, 2);
        let related = explorer.related_components("A");
        assert!(!related.contains("A"));
    }

    #[test]
    fn test_depth_one_reaches_direct_neighbors_only() {
        let store = GraphStore::new(graph(
            vec![
                node("A", NodeKind::Class, 6, 6),
                node("B", NodeKind::Class, 1, 1),
            ],
            vec![edge("A", "B", EdgeKind::MethodCall)],
        ));
        let explorer = RelationshipExplorer::with_max_depth(&store, 1);
        let related = explorer.related_components("A");
        assert_eq!(related.into_iter().collect::<Vec<_>>(), vec!["B".to_string()]);
    }

    #[test]
    fn test_result_monotone_in_depth() {
        let store = chain_store();
        let mut previous = BTreeSet::new();
        for depth in 0..6 {
            let explorer = RelationshipExplorer::with_max_depth(&store, depth);
            let current = explorer.related_components("A");
            assert!(
                previous.is_subset(&current),
                "depth {} shrank the result set",
                depth
            );
            previous = current;
        }
    }

    #[test]
    fn test_missing_seed_yields_empty_set() {
        let store = chain_store();
        let explorer = RelationshipExplorer::new(&store);
        assert!(explorer.related_components("Nope").is_empty());
    }

    #[test]
    fn test_cycle_terminates_and_covers_graph() {
        let store = chain_store();
        let explorer = RelationshipExplorer::with_max_depth(&store, 10);
        let related = explorer.related_components("A");
        assert_eq!(related.len(), 4);
    }

    #[test]
    fn test_multi_seed_union_deduplicates() {
        let store = chain_store();
        let explorer = RelationshipExplorer::with_max_depth(&store, 1);
        let related = explorer.related_to_all(["A", "C"]);
        // A reaches {B, C}; C reaches {A, B, D}
        let expected: BTreeSet<String> =
            ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        assert_eq!(related, expected);
    }
}
