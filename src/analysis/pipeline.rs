use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;

use crate::analysis::consolidator::FindingConsolidator;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::graph::{vector_findings, GraphStore, SecurityContextBuilder};
use crate::models::{ChangeSet, DependencyGraph, ReviewPass, ReviewReport};
use crate::review::prompts::{CodeSnippet, ReviewRequest, REVIEWER_ROSTER};
use crate::review::ReviewProvider;
use crate::storage::Storage;

/// End-to-end review run: graph load, context build, concurrent assessment
/// passes, consolidation, storage.
pub struct ReviewPipeline {
    provider: Arc<dyn ReviewProvider>,
    consolidator: FindingConsolidator,
    storage: Storage,
    config: PipelineConfig,
}

impl ReviewPipeline {
    pub fn new(
        provider: impl ReviewProvider + 'static,
        storage: Storage,
        config: PipelineConfig,
    ) -> Self {
        Self {
            provider: Arc::new(provider),
            consolidator: FindingConsolidator::new(),
            storage,
            config,
        }
    }

    pub async fn review(
        &self,
        graph: DependencyGraph,
        change: ChangeSet,
        repo_root: &Path,
    ) -> Result<ReviewReport> {
        // Step 1: Index the dependency graph
        let store = GraphStore::new(graph);
        tracing::info!("Graph store holds {} components", store.len());
        if store.is_empty() {
            tracing::warn!("Dependency graph is empty; review runs on file content only");
        }

        // Step 2: Build the security context for this changeset
        let builder = SecurityContextBuilder::with_depths(
            &store,
            self.config.max_graph_depth,
            self.config.max_flow_depth,
        );
        let context = builder.build(&change);

        // Classifier-derived findings seed consolidation alongside whatever
        // the review passes surface.
        let original_findings = vector_findings(&context.attack_vectors);

        // Step 3: Resolve changed file contents for the prompt
        let snippets = resolve_snippets(repo_root, &change.changed_files);

        // Step 4: Run the review passes concurrently
        let (passes, degraded) = self.run_passes(&change, &context, snippets).await;
        tracing::info!(
            "Completed {} review passes ({} degraded)",
            passes.len(),
            degraded
        );

        // Step 5: Consolidate into one verdict
        let (consensus, assessment) = self.consolidator.consolidate(&passes, &original_findings);
        tracing::info!(
            risk = %consensus.overall_risk,
            agreement = consensus.agreement,
            "consolidation complete"
        );

        let report = ReviewReport {
            changeset_digest: change.digest(),
            changed_files: change.changed_files.clone(),
            context,
            consensus,
            assessment,
            passes_completed: self.config.review_passes,
            passes_degraded: degraded,
            reviewed_at: Utc::now(),
        };

        // Step 6: Cache the completed run
        self.storage.save_report(&report)?;
        tracing::info!("Report saved to database");

        Ok(report)
    }

    async fn run_passes(
        &self,
        change: &ChangeSet,
        context: &crate::models::SecurityContext,
        snippets: Vec<CodeSnippet>,
    ) -> (Vec<ReviewPass>, usize) {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency_limit));

        let pb = ProgressBar::new(self.config.review_passes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} passes")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut pass_futures = Vec::new();

        for index in 0..self.config.review_passes {
            let reviewer = REVIEWER_ROSTER[index % REVIEWER_ROSTER.len()];
            let request = ReviewRequest {
                reviewer,
                changed_files: change.changed_files.clone(),
                snippets: snippets.clone(),
                context: context.clone(),
            };
            let provider = self.provider.clone();
            let sem = semaphore.clone();
            let pb_clone = pb.clone();

            pass_futures.push(async move {
                let _permit = sem.acquire().await.ok();
                let outcome = provider.assess(request).await;
                pb_clone.inc(1);
                match outcome {
                    Ok(pass) => (pass, false),
                    Err(e) => {
                        // A failed pass degrades to a neutral vote rather
                        // than failing the whole consolidation.
                        tracing::warn!(reviewer = reviewer.name, "pass degraded: {}", e);
                        (ReviewPass::neutral(reviewer.name), true)
                    }
                }
            });
        }

        let results = join_all(pass_futures).await;
        pb.finish_with_message("Review passes complete");

        let degraded = results.iter().filter(|(_, d)| *d).count();
        (results.into_iter().map(|(pass, _)| pass).collect(), degraded)
    }
}

/// Read the changed files so their content can be shown to the reviewers.
/// An unreadable file becomes a placeholder string and a warning, never a
/// failed run.
fn resolve_snippets(repo_root: &Path, changed_files: &[String]) -> Vec<CodeSnippet> {
    changed_files
        .iter()
        .map(|file| {
            let path: PathBuf = repo_root.join(file);
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("could not read {}: {}", path.display(), e);
                    format!("[source for {} unavailable: {}]", file, e)
                }
            };
            CodeSnippet {
                path: file.clone(),
                content,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComponentNode, Edge, EdgeKind, Finding, NodeKind, RiskLevel};
    use async_trait::async_trait;

    struct ScriptedProvider {
        narratives: Vec<&'static str>,
        counter: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl ReviewProvider for ScriptedProvider {
        async fn assess(&self, request: ReviewRequest) -> crate::error::Result<ReviewPass> {
            let index = self
                .counter
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if self.narratives[index % self.narratives.len()] == "FAIL" {
                return Err(crate::error::Error::Backend("scripted failure".to_string()));
            }
            Ok(ReviewPass {
                reviewer_name: request.reviewer.name.to_string(),
                specialty: None,
                narrative: self.narratives[index % self.narratives.len()].to_string(),
                findings: vec![Finding {
                    kind: "scripted".to_string(),
                    severity: 8,
                    title: "scripted finding".to_string(),
                    description: String::new(),
                    location: String::new(),
                    recommendation: String::new(),
                    cwe: None,
                    component: None,
                }],
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn auth_graph() -> DependencyGraph {
        DependencyGraph {
            nodes: vec![
                ComponentNode {
                    id: "UserAuth".to_string(),
                    label: "UserAuth".to_string(),
                    kind: NodeKind::Class,
                    file: "src/userauth.php".to_string(),
                    line: 1,
                    in_degree: 2,
                    out_degree: 1,
                },
                ComponentNode {
                    id: "Session".to_string(),
                    label: "Session".to_string(),
                    kind: NodeKind::Class,
                    file: "src/session.php".to_string(),
                    line: 1,
                    in_degree: 1,
                    out_degree: 0,
                },
            ],
            edges: vec![Edge {
                source: "UserAuth".to_string(),
                target: "Session".to_string(),
                kind: EdgeKind::MethodCall,
                weight: 1,
            }],
            stats: Default::default(),
        }
    }

    fn change() -> ChangeSet {
        ChangeSet {
            changed_files: vec!["src/userauth.php".to_string()],
            affected_classes: vec!["UserAuth".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_pipeline_end_to_end_with_stub_provider() {
        let provider = ScriptedProvider {
            narratives: vec!["high risk", "high risk", "high risk"],
            counter: Default::default(),
        };
        let pipeline = ReviewPipeline::new(
            provider,
            Storage::in_memory().unwrap(),
            PipelineConfig::default(),
        );

        let report = pipeline
            .review(auth_graph(), change(), Path::new("/nonexistent"))
            .await
            .unwrap();

        assert_eq!(report.consensus.overall_risk, RiskLevel::High);
        assert!(report.consensus.agreement);
        assert!(report.context.related_components.contains("Session"));
        assert_eq!(report.passes_degraded, 0);
        // Three scripted severity-8 findings plus the classifier's
        // authentication vector land in the high/critical buckets.
        assert!(report.assessment.risk_matrix.high >= 3);
        assert_eq!(report.assessment.risk_matrix.critical, 1);
    }

    #[tokio::test]
    async fn test_failed_pass_degrades_to_neutral() {
        let provider = ScriptedProvider {
            narratives: vec!["FAIL", "low risk", "low risk"],
            counter: Default::default(),
        };
        let pipeline = ReviewPipeline::new(
            provider,
            Storage::in_memory().unwrap(),
            PipelineConfig::default(),
        );

        let report = pipeline
            .review(auth_graph(), change(), Path::new("/nonexistent"))
            .await
            .unwrap();

        assert_eq!(report.passes_degraded, 1);
        // The neutral pass votes Medium, so the passes disagree.
        assert!(!report.consensus.agreement);
        assert_eq!(report.consensus.overall_risk, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_empty_graph_still_produces_report() {
        let provider = ScriptedProvider {
            narratives: vec!["medium risk"],
            counter: Default::default(),
        };
        let pipeline = ReviewPipeline::new(
            provider,
            Storage::in_memory().unwrap(),
            PipelineConfig {
                review_passes: 1,
                ..Default::default()
            },
        );

        let report = pipeline
            .review(DependencyGraph::default(), change(), Path::new("/nonexistent"))
            .await
            .unwrap();

        assert!(report.context.related_components.is_empty());
        assert_eq!(report.consensus.overall_risk, RiskLevel::Medium);
    }
}
