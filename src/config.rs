use crate::error::{Error, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub review_model: Option<String>,
    pub database_path: String,
    pub review_passes: usize,
    pub max_graph_depth: u32,
    pub max_flow_depth: u32,
    pub backend_timeout_secs: u64,
    pub concurrency_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let anthropic_api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| Error::Config("ANTHROPIC_API_KEY environment variable not set".to_string()))?;

        let review_model = env::var("REVIEW_MODEL").ok();

        let database_path = env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "secreview.db".to_string());

        let review_passes = env::var("REVIEW_PASSES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let max_graph_depth = env::var("MAX_GRAPH_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let max_flow_depth = env::var("MAX_FLOW_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let backend_timeout_secs = env::var("BACKEND_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        let concurrency_limit = env::var("CONCURRENCY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);

        Ok(Self {
            anthropic_api_key,
            review_model,
            database_path,
            review_passes,
            max_graph_depth,
            max_flow_depth,
            backend_timeout_secs,
            concurrency_limit,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub review_passes: usize,
    pub max_graph_depth: u32,
    pub max_flow_depth: u32,
    pub concurrency_limit: usize,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            review_passes: config.review_passes,
            max_graph_depth: config.max_graph_depth,
            max_flow_depth: config.max_flow_depth,
            concurrency_limit: config.concurrency_limit,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            review_passes: 3,
            max_graph_depth: 3,
            max_flow_depth: 5,
            concurrency_limit: 4,
        }
    }
}
