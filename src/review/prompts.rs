use crate::models::SecurityContext;

pub const SYSTEM_PROMPT: &str = r#"You are an application security engineer reviewing a code change.
You are given the changed code, the components related to it in the dependency graph,
known security hotspots and traced data flows. Assess the change for vulnerabilities.

You must respond with valid JSON matching this exact schema:
{
    "narrative": "free-text assessment; state the overall risk explicitly using one of: critical, high risk, medium risk, low risk",
    "findings": [
        {
            "kind": "string (e.g., 'sql-injection', 'auth-bypass')",
            "severity": 1-10,
            "title": "string",
            "description": "string",
            "location": "file or component where the issue lives",
            "recommendation": "string",
            "cwe": "CWE-### or null",
            "component": "component id or null"
        }
    ]
}

Guidelines:
- Only report issues supported by the code or the supplied context
- Severity: 1-3 informational, 4-6 needs attention, 7-8 serious, 9-10 exploitable now
- Include concrete recommendations; lines starting with '-' are extracted verbatim
- Focus on your assigned specialty if one is given"#;

/// One reviewer persona. Each pass runs under a different specialty so the
/// passes disagree for the right reasons.
#[derive(Debug, Clone, Copy)]
pub struct ReviewerProfile {
    pub name: &'static str,
    pub specialty: Option<&'static str>,
}

pub const REVIEWER_ROSTER: &[ReviewerProfile] = &[
    ReviewerProfile {
        name: "injection-reviewer",
        specialty: Some("injection and input handling"),
    },
    ReviewerProfile {
        name: "auth-reviewer",
        specialty: Some("authentication and session management"),
    },
    ReviewerProfile {
        name: "exposure-reviewer",
        specialty: Some("data exposure and privilege boundaries"),
    },
    ReviewerProfile {
        name: "general-reviewer",
        specialty: None,
    },
];

/// Per-file cap on snippet content included in the prompt.
const MAX_SNIPPET_CHARS: usize = 6000;

#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub reviewer: ReviewerProfile,
    pub changed_files: Vec<String>,
    pub snippets: Vec<CodeSnippet>,
    pub context: SecurityContext,
}

#[derive(Debug, Clone)]
pub struct CodeSnippet {
    pub path: String,
    pub content: String,
}

impl ReviewRequest {
    pub fn to_prompt(&self) -> String {
        let mut prompt = String::new();

        if let Some(specialty) = self.reviewer.specialty {
            prompt.push_str(&format!("Your specialty for this pass: {}.\n\n", specialty));
        }

        prompt.push_str(&format!(
            "Review the following change touching {} file(s).\n\n",
            self.changed_files.len()
        ));

        for snippet in &self.snippets {
            prompt.push_str(&format!("### File: {}\n```\n", snippet.path));
            // Keep individual files from dominating the prompt. Truncation
            // counts chars, not bytes, so multi-byte content cannot split.
            if snippet.content.len() > MAX_SNIPPET_CHARS {
                let truncated: String =
                    snippet.content.chars().take(MAX_SNIPPET_CHARS).collect();
                prompt.push_str(&truncated);
                prompt.push_str("...\n[truncated]");
            } else {
                prompt.push_str(&snippet.content);
            }
            prompt.push_str("\n```\n\n");
        }

        if !self.context.related_components.is_empty() {
            prompt.push_str("Related components (blast radius):\n");
            for id in self.context.related_components.iter().take(40) {
                prompt.push_str(&format!("- {}\n", id));
            }
            prompt.push('\n');
        }

        if !self.context.security_hotspots.is_empty() {
            prompt.push_str("Known security hotspots:\n");
            for hotspot in self.context.security_hotspots.iter().take(20) {
                prompt.push_str(&format!(
                    "- {} ({}): {}\n",
                    hotspot.component,
                    hotspot.file,
                    hotspot.risk_factors.join("; ")
                ));
            }
            prompt.push('\n');
        }

        if !self.context.data_flows.is_empty() {
            prompt.push_str("Traced data flows:\n");
            for step in self.context.data_flows.iter().take(30) {
                prompt.push_str(&format!(
                    "- {} -[{}]-> {} (depth {})\n",
                    step.from, step.edge_kind, step.to, step.depth
                ));
            }
            prompt.push('\n');
        }

        prompt.push_str("Provide your assessment as JSON:\n");
        prompt
    }

    pub fn estimate_tokens(&self) -> usize {
        let char_count: usize = self.snippets.iter().map(|s| s.content.len()).sum();
        // Rough estimate: ~4 characters per token
        char_count / 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SecurityContext;

    fn request_with_content(content: String) -> ReviewRequest {
        ReviewRequest {
            reviewer: ReviewerProfile {
                name: "test-reviewer",
                specialty: None,
            },
            changed_files: vec!["src/i18n.php".to_string()],
            snippets: vec![CodeSnippet {
                path: "src/i18n.php".to_string(),
                content,
            }],
            context: SecurityContext::default(),
        }
    }

    #[test]
    fn test_truncation_survives_multibyte_at_the_limit() {
        // A two-byte character straddling the byte limit must not panic.
        let mut content = "a".repeat(MAX_SNIPPET_CHARS - 1);
        content.push('é');
        content.push_str(&"x".repeat(100));

        let prompt = request_with_content(content).to_prompt();
        assert!(prompt.contains("[truncated]"));
        assert!(prompt.contains('é'));
        assert!(!prompt.contains('x'));
    }

    #[test]
    fn test_short_snippet_kept_verbatim() {
        let prompt = request_with_content("écho = 1;".to_string()).to_prompt();
        assert!(prompt.contains("écho = 1;"));
        assert!(!prompt.contains("[truncated]"));
    }
}
