pub mod consolidator;
pub mod pipeline;

pub use consolidator::FindingConsolidator;
pub use pipeline::ReviewPipeline;
