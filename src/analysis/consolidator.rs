use std::collections::{HashMap, HashSet};

use crate::models::{
    Consensus, FinalAssessment, Finding, ReviewPass, RiskLevel, RiskMatrix,
};

/// Consolidates independent review passes into one verdict.
///
/// Narratives are mined with substring heuristics; this layer is documented
/// as fuzzy on purpose and should not grow into a parser. Consolidation is
/// a pure reduction over the passes list and is invariant under permutation
/// of it: vote tallying is order-insensitive and ties break by declared
/// risk priority, never arrival order.
pub struct FindingConsolidator;

/// Narrative markers checked in priority order; the first level with a
/// matching marker wins. No marker at all reads as Medium.
const RISK_MARKERS: &[(RiskLevel, &[&str])] = &[
    (RiskLevel::Critical, &["critical", "severe"]),
    (RiskLevel::High, &["high risk", "high priority"]),
    (RiskLevel::Medium, &["medium risk", "moderate"]),
    (RiskLevel::Low, &["low risk", "minimal"]),
];

const RECOMMENDATION_KEYWORDS: &[&str] = &["recommend", "should", "must", "implement"];

const ROADMAP_KEYWORDS: &[&str] = &["remediat", "fix", "patch", "mitigat", "upgrade"];
const COMPLIANCE_KEYWORDS: &[&str] = &["compliance", "owasp", "pci", "gdpr", "regulat", "standard"];
const MONITORING_KEYWORDS: &[&str] = &["monitor", "alert", "audit", "detect", "logging"];

const MAX_RECOMMENDATIONS: usize = 10;
const MAX_ROADMAP_LINES: usize = 10;
const MAX_COMPLIANCE_LINES: usize = 5;
const MAX_MONITORING_LINES: usize = 5;
const MAX_CRITICAL_FINDINGS: usize = 5;

impl FindingConsolidator {
    pub fn new() -> Self {
        Self
    }

    pub fn consolidate(
        &self,
        passes: &[ReviewPass],
        original_findings: &[Finding],
    ) -> (Consensus, FinalAssessment) {
        let consensus = self.build_consensus(passes, original_findings);
        let assessment = self.build_assessment(passes, original_findings);
        (consensus, assessment)
    }

    fn build_consensus(&self, passes: &[ReviewPass], original_findings: &[Finding]) -> Consensus {
        if passes.is_empty() {
            return Consensus {
                overall_risk: RiskLevel::Medium,
                agreement: true,
                escalated_severity: None,
                recommendations: Vec::new(),
            };
        }

        let votes: Vec<RiskLevel> = passes
            .iter()
            .map(|p| extract_risk_level(&p.narrative))
            .collect();

        let mut tally: HashMap<RiskLevel, usize> = HashMap::new();
        for vote in &votes {
            *tally.entry(*vote).or_insert(0) += 1;
        }

        // Majority wins; tied counts resolve toward the higher risk level,
        // which keeps the verdict independent of pass arrival order.
        let overall_risk = tally
            .iter()
            .max_by_key(|(level, count)| (**count, **level))
            .map(|(level, _)| *level)
            .unwrap_or(RiskLevel::Medium);

        let agreement = tally.len() <= 1;
        let escalated_severity = if agreement {
            None
        } else {
            let base = original_findings
                .iter()
                .map(|f| f.severity)
                .max()
                .unwrap_or(5);
            Some((base + 1).min(10))
        };

        if !agreement {
            tracing::warn!(
                ?votes,
                "review passes disagree on risk level; escalating severity"
            );
        }

        Consensus {
            overall_risk,
            agreement,
            escalated_severity,
            recommendations: extract_recommendations(passes),
        }
    }

    fn build_assessment(
        &self,
        passes: &[ReviewPass],
        original_findings: &[Finding],
    ) -> FinalAssessment {
        let mut all_findings: Vec<Finding> = original_findings.to_vec();
        for pass in passes {
            all_findings.extend(pass.findings.iter().cloned());
        }

        let mut risk_matrix = RiskMatrix::default();
        for finding in &all_findings {
            match finding.severity {
                9..=10 => risk_matrix.critical += 1,
                7..=8 => risk_matrix.high += 1,
                4..=6 => risk_matrix.medium += 1,
                _ => risk_matrix.low += 1,
            }
        }

        let mut critical_findings: Vec<Finding> = all_findings
            .iter()
            .filter(|f| f.severity >= 8)
            .cloned()
            .collect();
        // Stable sort keeps original order among equal severities.
        critical_findings.sort_by(|a, b| b.severity.cmp(&a.severity));
        critical_findings.truncate(MAX_CRITICAL_FINDINGS);

        // The final pass plays the synthesis role; its narrative feeds the
        // roadmap and notes sections.
        let synthesis = passes.last().map(|p| p.narrative.as_str()).unwrap_or("");

        FinalAssessment {
            risk_matrix,
            critical_findings,
            remediation_roadmap: filter_lines(synthesis, ROADMAP_KEYWORDS, MAX_ROADMAP_LINES),
            compliance_notes: filter_lines(synthesis, COMPLIANCE_KEYWORDS, MAX_COMPLIANCE_LINES),
            monitoring_notes: filter_lines(synthesis, MONITORING_KEYWORDS, MAX_MONITORING_LINES),
        }
    }
}

impl Default for FindingConsolidator {
    fn default() -> Self {
        Self::new()
    }
}

/// First matching marker in priority order decides the level.
pub fn extract_risk_level(narrative: &str) -> RiskLevel {
    let lowered = narrative.to_lowercase();
    for (level, markers) in RISK_MARKERS {
        if markers.iter().any(|m| lowered.contains(m)) {
            return *level;
        }
    }
    RiskLevel::Medium
}

fn is_recommendation_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }

    let starts_with_marker = trimmed.starts_with('-')
        || trimmed.starts_with('*')
        || trimmed.starts_with('•')
        || trimmed
            .split_once(['.', ')'])
            .map(|(head, _)| !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false);

    if starts_with_marker {
        return true;
    }

    let lowered = trimmed.to_lowercase();
    RECOMMENDATION_KEYWORDS.iter().any(|k| lowered.contains(k))
}

fn extract_recommendations(passes: &[ReviewPass]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut recommendations = Vec::new();

    for pass in passes {
        for line in pass.narrative.lines() {
            if !is_recommendation_line(line) {
                continue;
            }
            let trimmed = line.trim().to_string();
            if seen.insert(trimmed.clone()) {
                recommendations.push(trimmed);
                if recommendations.len() == MAX_RECOMMENDATIONS {
                    return recommendations;
                }
            }
        }
    }

    recommendations
}

fn filter_lines(narrative: &str, keywords: &[&str], cap: usize) -> Vec<String> {
    narrative
        .lines()
        .map(str::trim)
        .filter(|line| {
            let lowered = line.to_lowercase();
            keywords.iter().any(|k| lowered.contains(k))
        })
        .map(str::to_string)
        .take(cap)
        .collect()
}
