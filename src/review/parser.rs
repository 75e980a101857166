use serde::Deserialize;

use crate::models::{Finding, ReviewPass};
use crate::review::prompts::ReviewerProfile;

#[derive(Deserialize)]
struct RawAssessment {
    #[serde(default)]
    narrative: String,
    #[serde(default)]
    findings: Vec<Finding>,
}

/// Parse a backend response into a review pass.
///
/// Backend output is untyped text and may not contain valid JSON at all.
/// Parse failures fall back to an empty-findings pass that keeps the raw
/// text as the narrative, so risk extraction and recommendation mining in
/// consolidation still see it.
pub fn parse_assessment(reviewer: ReviewerProfile, response: &str) -> ReviewPass {
    let parsed = extract_json(response)
        .and_then(|json| serde_json::from_str::<RawAssessment>(&json).ok());

    let (narrative, findings) = match parsed {
        Some(raw) => (raw.narrative, raw.findings),
        None => {
            tracing::warn!(
                reviewer = reviewer.name,
                "assessment was not parseable JSON; keeping raw text"
            );
            (response.trim().to_string(), Vec::new())
        }
    };

    ReviewPass {
        reviewer_name: reviewer.name.to_string(),
        specialty: reviewer.specialty.map(str::to_string),
        narrative,
        findings,
    }
}

fn extract_json(text: &str) -> Option<String> {
    // Try to find JSON block in markdown code blocks
    if let Some(start) = text.find("```json") {
        let start = start + 7;
        if let Some(end) = text[start..].find("```") {
            return Some(text[start..start + end].trim().to_string());
        }
    }

    // Try plain code block
    if let Some(start) = text.find("```") {
        let start = start + 3;
        // Skip any language identifier on the same line
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            let content = text[start..start + end].trim();
            if content.starts_with('{') {
                return Some(content.to_string());
            }
        }
    }

    // Try to find raw JSON object
    if let Some(start) = text.find('{') {
        let mut depth = 0;
        let mut end = start;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, c) in text[start..].chars().enumerate() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        end = start + i + 1;
                        break;
                    }
                }
                _ => {}
            }
        }

        if depth == 0 && end > start {
            return Some(text[start..end].to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const REVIEWER: ReviewerProfile = ReviewerProfile {
        name: "test-reviewer",
        specialty: None,
    };

    #[test]
    fn test_extract_json_from_markdown() {
        let input = r#"Here's the assessment:
```json
{"narrative": "low risk overall", "findings": []}
```
"#;
        let pass = parse_assessment(REVIEWER, input);
        assert_eq!(pass.narrative, "low risk overall");
        assert!(pass.findings.is_empty());
    }

    #[test]
    fn test_extract_raw_json() {
        let input = r#"The result is {"narrative": "medium risk", "findings": []}"#;
        let pass = parse_assessment(REVIEWER, input);
        assert_eq!(pass.narrative, "medium risk");
    }

    #[test]
    fn test_findings_are_ingested_with_clamping() {
        let input = r#"{"narrative": "critical", "findings": [
            {"kind": "sqli", "severity": 12, "title": "Unescaped query"}
        ]}"#;
        let pass = parse_assessment(REVIEWER, input);
        assert_eq!(pass.findings.len(), 1);
        assert_eq!(pass.findings[0].severity, 10);
    }

    #[test]
    fn test_unparseable_response_keeps_raw_text() {
        let input = "This change looks like a high risk to me, no JSON for you.";
        let pass = parse_assessment(REVIEWER, input);
        assert!(pass.findings.is_empty());
        assert_eq!(pass.narrative, input);
    }
}
