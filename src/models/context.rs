use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::finding::RiskLevel;
use super::graph::EdgeKind;

/// Everything the graph engine derives for one changeset. Built fresh per
/// run by the context builder and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityContext {
    pub related_components: BTreeSet<String>,
    pub security_hotspots: Vec<Hotspot>,
    pub data_flows: Vec<FlowStep>,
    pub external_dependencies: Vec<String>,
    pub attack_vectors: Vec<AttackVector>,
    pub privilege_escalation_paths: Vec<EscalationPath>,
}

/// A component flagged with at least one heuristic risk factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub component: String,
    pub file: String,
    pub line: u32,
    pub connectivity: u32,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackVector {
    pub component: String,
    pub category: RiskCategory,
    pub severity: RiskLevel,
    pub cwe: String,
    pub description: String,
}

/// A privilege-sensitive component together with its direct neighbors,
/// which are the first hops of any escalation route through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationPath {
    pub component: String,
    pub cwe: String,
    pub neighbors: Vec<String>,
}

/// One hop of a traced data flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowStep {
    pub from: String,
    pub to: String,
    pub edge_kind: EdgeKind,
    pub weight: u32,
    pub depth: u32,
}

/// Fixed heuristic categories used by the keyword classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RiskCategory {
    Database,
    Authentication,
    FileSystem,
    Network,
    UserInput,
    PrivilegeEscalation,
}

impl RiskCategory {
    /// Static category-to-CWE lookup. The category enum is closed, so every
    /// category maps; CWE-710 would be the fallback if one ever did not.
    pub fn cwe(&self) -> &'static str {
        match self {
            RiskCategory::Database => "CWE-89",
            RiskCategory::Authentication => "CWE-287",
            RiskCategory::FileSystem => "CWE-22",
            RiskCategory::UserInput => "CWE-20",
            RiskCategory::Network => "CWE-918",
            RiskCategory::PrivilegeEscalation => "CWE-269",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskCategory::Database => write!(f, "database"),
            RiskCategory::Authentication => write!(f, "authentication"),
            RiskCategory::FileSystem => write!(f, "file-system"),
            RiskCategory::Network => write!(f, "network"),
            RiskCategory::UserInput => write!(f, "user-input"),
            RiskCategory::PrivilegeEscalation => write!(f, "privilege-escalation"),
        }
    }
}
