use serde::{Deserialize, Serialize};

/// A single vulnerability finding, produced either by the review backend or
/// by the hotspot classifier. Severity is clamped to 1..=10 at ingestion;
/// a missing severity defaults to 5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub kind: String,
    #[serde(default = "default_severity", deserialize_with = "clamp_severity")]
    pub severity: u8,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub cwe: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
}

fn default_severity() -> u8 {
    5
}

fn clamp_severity<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    // Backends sometimes emit severities outside the declared range or as
    // a wider integer; clamp rather than reject.
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(match raw {
        Some(value) => value.clamp(1, 10) as u8,
        None => default_severity(),
    })
}

/// The outcome of one independent assessment invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPass {
    pub reviewer_name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

impl ReviewPass {
    /// The degraded stand-in for a pass whose backend call failed or timed
    /// out: no additional findings, neutral risk.
    pub fn neutral(reviewer_name: &str) -> Self {
        Self {
            reviewer_name: reviewer_name.to_string(),
            specialty: None,
            narrative: String::new(),
            findings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Critical => write!(f, "Critical"),
        }
    }
}

/// The aggregated verdict from voting across review passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consensus {
    pub overall_risk: RiskLevel,
    pub agreement: bool,
    pub escalated_severity: Option<u8>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskMatrix {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalAssessment {
    pub risk_matrix: RiskMatrix,
    pub critical_findings: Vec<Finding>,
    pub remediation_roadmap: Vec<String>,
    pub compliance_notes: Vec<String>,
    pub monitoring_notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_clamped_on_ingestion() {
        let finding: Finding =
            serde_json::from_str(r#"{"title": "overflow", "severity": 14}"#).unwrap();
        assert_eq!(finding.severity, 10);

        let finding: Finding =
            serde_json::from_str(r#"{"title": "underflow", "severity": -2}"#).unwrap();
        assert_eq!(finding.severity, 1);
    }

    #[test]
    fn test_missing_severity_defaults_to_five() {
        let finding: Finding = serde_json::from_str(r#"{"title": "no severity"}"#).unwrap();
        assert_eq!(finding.severity, 5);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }
}
