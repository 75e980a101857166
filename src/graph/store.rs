use std::collections::HashMap;

use crate::models::{ComponentNode, DependencyGraph, Edge};

/// Immutable in-memory index over the dependency graph, built once per run.
///
/// Adjacency is undirected: an edge connects its endpoints regardless of
/// direction. Edges referencing an id that was never loaded as a node are
/// kept in the edge list but excluded from adjacency, so they are silently
/// untraversable rather than an error.
pub struct GraphStore {
    nodes: HashMap<String, ComponentNode>,
    edges: Vec<Edge>,
    adjacency: HashMap<String, Vec<Neighbor>>,
}

#[derive(Debug, Clone)]
pub struct Neighbor {
    pub id: String,
    pub edge_index: usize,
}

impl GraphStore {
    pub fn new(graph: DependencyGraph) -> Self {
        let mut nodes = HashMap::with_capacity(graph.nodes.len());
        for node in graph.nodes {
            nodes.insert(node.id.clone(), node);
        }

        let mut adjacency: HashMap<String, Vec<Neighbor>> = HashMap::new();
        let mut dangling = 0usize;
        for (index, edge) in graph.edges.iter().enumerate() {
            if !nodes.contains_key(&edge.source) || !nodes.contains_key(&edge.target) {
                dangling += 1;
                continue;
            }
            adjacency.entry(edge.source.clone()).or_default().push(Neighbor {
                id: edge.target.clone(),
                edge_index: index,
            });
            adjacency.entry(edge.target.clone()).or_default().push(Neighbor {
                id: edge.source.clone(),
                edge_index: index,
            });
        }

        if dangling > 0 {
            tracing::warn!("{} edges reference unknown components and will not be traversed", dangling);
        }

        Self {
            nodes,
            edges: graph.edges,
            adjacency,
        }
    }

    pub fn empty() -> Self {
        Self::new(DependencyGraph::default())
    }

    pub fn node(&self, id: &str) -> Option<&ComponentNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn edge(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    /// Undirected neighbors of a node. Unknown ids yield an empty slice.
    pub fn neighbors(&self, id: &str) -> &[Neighbor] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::{EdgeKind, NodeKind};

    #[test]
    fn test_adjacency_is_undirected() {
        let store = GraphStore::new(graph(
            vec![
                node("A", NodeKind::Class, 0, 1),
                node("B", NodeKind::Class, 1, 0),
            ],
            vec![edge("A", "B", EdgeKind::MethodCall)],
        ));

        assert_eq!(store.neighbors("A").len(), 1);
        assert_eq!(store.neighbors("A")[0].id, "B");
        assert_eq!(store.neighbors("B").len(), 1);
        assert_eq!(store.neighbors("B")[0].id, "A");
    }

    #[test]
    fn test_dangling_edges_are_untraversable() {
        let store = GraphStore::new(graph(
            vec![node("A", NodeKind::Function, 0, 1)],
            vec![edge("A", "Missing", EdgeKind::StaticCall)],
        ));

        assert!(store.neighbors("A").is_empty());
        assert!(store.neighbors("Missing").is_empty());
    }

    #[test]
    fn test_empty_store() {
        let store = GraphStore::empty();
        assert!(store.is_empty());
        assert!(store.neighbors("anything").is_empty());
    }
}
