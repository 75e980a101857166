use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use secreview::models::{ChangeSet, DependencyGraph, ReviewReport};
use secreview::{
    ClaudeProvider, Config, PipelineConfig, ReviewPipeline, Storage,
};

#[derive(Parser, Debug)]
#[command(name = "secreview")]
#[command(version = "0.1.0")]
#[command(about = "Graph-assisted security review of code changes")]
struct Args {
    /// Path to the dependency graph JSON produced by the source analyzers
    #[arg(short, long)]
    graph: PathBuf,

    /// Path to the changeset JSON produced by the change detector
    #[arg(short, long)]
    changeset: PathBuf,

    /// Repository root used to resolve changed file contents
    #[arg(short, long, default_value = ".")]
    repo: PathBuf,

    /// Number of independent review passes
    #[arg(long)]
    passes: Option<usize>,

    /// Output format (json, text, markdown)
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Database path for caching completed reviews
    #[arg(long, default_value = "secreview.db")]
    database: String,

    /// Use a cached report for this changeset if one exists
    #[arg(long)]
    cached: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("secreview=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize storage
    let storage = Storage::new(&args.database)?;

    // Load the graph and changeset; both degrade to empty on malformed input
    let graph = load_graph(&args.graph);
    let change = load_changeset(&args.changeset);

    if change.is_empty() {
        tracing::warn!("Changeset is empty; nothing meaningful to review");
    }

    // Check for a cached report if requested
    if args.cached {
        if let Some(report) = storage.get_report(&change.digest())? {
            tracing::info!("Using cached report from {}", report.reviewed_at);
            output_report(&report, &args)?;
            return Ok(());
        }
        tracing::info!("No cached report found, running a fresh review");
    }

    // Load configuration; backend credentials are only required from here on
    let config = Config::from_env()?;

    // Initialize the assessment backend
    let provider = ClaudeProvider::new(
        config.anthropic_api_key.clone(),
        config.review_model.clone(),
        Duration::from_secs(config.backend_timeout_secs),
    )?;

    // Create the pipeline
    let mut pipeline_config = PipelineConfig::from(&config);
    if let Some(passes) = args.passes {
        pipeline_config.review_passes = passes;
    }

    let pipeline = ReviewPipeline::new(provider, storage, pipeline_config);

    // Run the review
    tracing::info!(
        "Starting review of {} changed file(s)",
        change.changed_files.len()
    );
    let report = pipeline.review(graph, change, &args.repo).await?;

    // Output results
    output_report(&report, &args)?;

    Ok(())
}

fn load_graph(path: &PathBuf) -> DependencyGraph {
    match std::fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!("graph file {} is malformed ({}); using empty graph", path.display(), e);
                DependencyGraph::default()
            }
        },
        Err(e) => {
            tracing::warn!("could not read graph file {} ({}); using empty graph", path.display(), e);
            DependencyGraph::default()
        }
    }
}

fn load_changeset(path: &PathBuf) -> ChangeSet {
    match std::fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(change) => change,
            Err(e) => {
                tracing::warn!("changeset file {} is malformed ({}); using empty changeset", path.display(), e);
                ChangeSet::default()
            }
        },
        Err(e) => {
            tracing::warn!("could not read changeset file {} ({}); using empty changeset", path.display(), e);
            ChangeSet::default()
        }
    }
}

fn output_report(report: &ReviewReport, args: &Args) -> anyhow::Result<()> {
    let output = match args.format.as_str() {
        "markdown" => format_markdown(report),
        "text" => format_text(report),
        _ => serde_json::to_string_pretty(report)?,
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(report: &ReviewReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n=== Security Review: {} file(s) changed ===\n\n",
        report.changed_files.len()
    ));
    output.push_str(&format!("Overall risk: {}\n", report.consensus.overall_risk));
    output.push_str(&format!(
        "Reviewer agreement: {}\n",
        if report.consensus.agreement { "yes" } else { "no" }
    ));
    if let Some(severity) = report.consensus.escalated_severity {
        output.push_str(&format!("Escalated severity: {}/10\n", severity));
    }
    output.push_str(&format!(
        "Passes: {} ({} degraded)\n\n",
        report.passes_completed, report.passes_degraded
    ));

    let matrix = &report.assessment.risk_matrix;
    output.push_str(&format!(
        "Findings: {} critical, {} high, {} medium, {} low\n",
        matrix.critical, matrix.high, matrix.medium, matrix.low
    ));

    if !report.assessment.critical_findings.is_empty() {
        output.push_str("\nTop findings:\n");
        for finding in &report.assessment.critical_findings {
            output.push_str(&format!(
                "  [{}] {} ({})\n",
                finding.severity,
                finding.title,
                finding.cwe.as_deref().unwrap_or("no CWE")
            ));
        }
    }

    if !report.context.security_hotspots.is_empty() {
        output.push_str("\nHotspots:\n");
        for hotspot in report.context.security_hotspots.iter().take(10) {
            output.push_str(&format!(
                "  - {}: {}\n",
                hotspot.component,
                hotspot.risk_factors.join("; ")
            ));
        }
    }

    if !report.consensus.recommendations.is_empty() {
        output.push_str("\nRecommendations:\n");
        for recommendation in &report.consensus.recommendations {
            output.push_str(&format!("  {}\n", recommendation));
        }
    }

    output.push_str(&format!(
        "\nReviewed at: {}\n",
        report.reviewed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

fn format_markdown(report: &ReviewReport) -> String {
    let mut output = String::new();

    output.push_str("# Security Review\n\n");
    output.push_str("| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!("| Overall Risk | {} |\n", report.consensus.overall_risk));
    output.push_str(&format!(
        "| Agreement | {} |\n",
        if report.consensus.agreement { "yes" } else { "no" }
    ));
    if let Some(severity) = report.consensus.escalated_severity {
        output.push_str(&format!("| Escalated Severity | {}/10 |\n", severity));
    }
    output.push_str(&format!("| Changed Files | {} |\n", report.changed_files.len()));
    output.push_str(&format!(
        "| Related Components | {} |\n",
        report.context.related_components.len()
    ));

    let matrix = &report.assessment.risk_matrix;
    output.push_str("\n## Risk Matrix\n\n");
    output.push_str("| Critical | High | Medium | Low |\n|----------|------|--------|-----|\n");
    output.push_str(&format!(
        "| {} | {} | {} | {} |\n",
        matrix.critical, matrix.high, matrix.medium, matrix.low
    ));

    if !report.assessment.critical_findings.is_empty() {
        output.push_str("\n## Top Findings\n\n");
        output.push_str("| Severity | Title | CWE | Location |\n|----------|-------|-----|----------|\n");
        for finding in &report.assessment.critical_findings {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                finding.severity,
                finding.title,
                finding.cwe.as_deref().unwrap_or("-"),
                finding.location
            ));
        }
    }

    if !report.consensus.recommendations.is_empty() {
        output.push_str("\n## Recommendations\n\n");
        for recommendation in &report.consensus.recommendations {
            output.push_str(&format!("- {}\n", recommendation.trim_start_matches(['-', '*', ' '])));
        }
    }

    if !report.assessment.remediation_roadmap.is_empty() {
        output.push_str("\n## Remediation Roadmap\n\n");
        for line in &report.assessment.remediation_roadmap {
            output.push_str(&format!("- {}\n", line));
        }
    }

    output.push_str(&format!(
        "\n---\n*Reviewed at {}*\n",
        report.reviewed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}
