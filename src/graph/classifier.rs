use std::collections::BTreeSet;

use crate::graph::GraphStore;
use crate::models::{AttackVector, EscalationPath, Finding, Hotspot, RiskCategory, RiskLevel};

/// Heuristic hotspot and attack-vector tagging.
///
/// Two independent rules run per component: a connectivity threshold and a
/// fixed keyword table over the lowercased component id. This is a
/// documented heuristic layer, not a parser; precision beyond substring
/// matching is deliberately out of scope.
pub struct HotspotClassifier<'a> {
    store: &'a GraphStore,
}

/// Degree above which a component is considered a broad attack surface.
pub const CONNECTIVITY_THRESHOLD: u32 = 10;

const KEYWORD_RULES: &[(RiskCategory, &[&str])] = &[
    (RiskCategory::Database, &["sql", "query", "db"]),
    (RiskCategory::Authentication, &["auth", "login", "password"]),
    (RiskCategory::FileSystem, &["file", "upload", "download"]),
    (RiskCategory::Network, &["api", "http", "curl"]),
    (RiskCategory::UserInput, &["input", "validate", "sanitize"]),
    (
        RiskCategory::PrivilegeEscalation,
        &["admin", "sudo", "root", "permission", "role"],
    ),
];

/// Fixed category-to-severity table for emitted attack vectors. Categories
/// absent from this table contribute risk factors but no attack vector.
const VECTOR_SEVERITIES: &[(RiskCategory, RiskLevel)] = &[
    (RiskCategory::UserInput, RiskLevel::High),
    (RiskCategory::Authentication, RiskLevel::Critical),
    (RiskCategory::FileSystem, RiskLevel::High),
    (RiskCategory::Database, RiskLevel::High),
];

#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub hotspots: Vec<Hotspot>,
    pub attack_vectors: Vec<AttackVector>,
    pub escalation_paths: Vec<EscalationPath>,
}

/// Attack vectors restated as findings, severities mapped onto the 1-10
/// scale. These become the `original_findings` input to consolidation.
pub fn vector_findings(vectors: &[AttackVector]) -> Vec<Finding> {
    vectors
        .iter()
        .map(|vector| Finding {
            kind: format!("{}-exposure", vector.category),
            severity: match vector.severity {
                RiskLevel::Critical => 9,
                RiskLevel::High => 7,
                RiskLevel::Medium => 5,
                RiskLevel::Low => 3,
            },
            title: format!("Potential {} exposure in {}", vector.category, vector.component),
            description: vector.description.clone(),
            location: vector.component.clone(),
            recommendation: String::new(),
            cwe: Some(vector.cwe.clone()),
            component: Some(vector.component.clone()),
        })
        .collect()
}

impl<'a> HotspotClassifier<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Classify a set of components. Deterministic and order-independent:
    /// the input set is iterated in sorted id order, so two runs over the
    /// same set produce identical output.
    pub fn classify(&self, components: &BTreeSet<String>) -> Classification {
        let mut result = Classification::default();

        for id in components {
            let Some(node) = self.store.node(id) else {
                continue;
            };

            let lowered = id.to_lowercase();
            let mut risk_factors = Vec::new();

            if node.connectivity() > CONNECTIVITY_THRESHOLD {
                risk_factors.push("High connectivity - broad attack surface".to_string());
            }

            for (category, keywords) in KEYWORD_RULES {
                if !keywords.iter().any(|k| lowered.contains(k)) {
                    continue;
                }

                if *category == RiskCategory::PrivilegeEscalation {
                    result.escalation_paths.push(EscalationPath {
                        component: id.clone(),
                        cwe: category.cwe().to_string(),
                        neighbors: self
                            .store
                            .neighbors(id)
                            .iter()
                            .map(|n| n.id.clone())
                            .collect(),
                    });
                    continue;
                }

                risk_factors.push(format!("Touches {} surface", category));

                if let Some((_, severity)) =
                    VECTOR_SEVERITIES.iter().find(|(c, _)| c == category)
                {
                    result.attack_vectors.push(AttackVector {
                        component: id.clone(),
                        category: *category,
                        severity: *severity,
                        cwe: category.cwe().to_string(),
                        description: format!(
                            "Component '{}' matches the {} keyword heuristic",
                            id, category
                        ),
                    });
                }
            }

            if !risk_factors.is_empty() {
                result.hotspots.push(Hotspot {
                    component: id.clone(),
                    file: node.file.clone(),
                    line: node.line,
                    connectivity: node.connectivity(),
                    risk_factors,
                });
            }
        }

        result
    }
}
