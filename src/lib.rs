pub mod config;
pub mod error;
pub mod models;
pub mod graph;
pub mod review;
pub mod analysis;
pub mod storage;

pub use config::{Config, PipelineConfig};
pub use error::{Error, Result};
pub use graph::{GraphStore, SecurityContextBuilder};
pub use review::{ClaudeProvider, ReviewProvider};
pub use analysis::{FindingConsolidator, ReviewPipeline};
pub use storage::Storage;
