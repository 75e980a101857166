use serde::{Deserialize, Serialize};

/// A node in the code-relationship graph, as emitted by the external
/// source analyzers (one per class, method or function).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub in_degree: u32,
    #[serde(default)]
    pub out_degree: u32,
}

impl ComponentNode {
    pub fn connectivity(&self) -> u32 {
        self.in_degree + self.out_degree
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Class,
    Method,
    Function,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Function
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Class => write!(f, "class"),
            NodeKind::Method => write!(f, "method"),
            NodeKind::Function => write!(f, "function"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    Extends,
    Instantiates,
    StaticCall,
    MethodCall,
}

impl Default for EdgeKind {
    fn default() -> Self {
        EdgeKind::MethodCall
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Extends => write!(f, "extends"),
            EdgeKind::Instantiates => write!(f, "instantiates"),
            EdgeKind::StaticCall => write!(f, "staticCall"),
            EdgeKind::MethodCall => write!(f, "methodCall"),
        }
    }
}

/// The graph record produced once per run by the external analyzers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    #[serde(default)]
    pub nodes: Vec<ComponentNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub stats: GraphStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    #[serde(default)]
    pub total_nodes: u32,
    #[serde(default)]
    pub total_edges: u32,
    #[serde(default)]
    pub classes: u32,
    #[serde(default)]
    pub methods: u32,
    #[serde(default)]
    pub functions: u32,
}
