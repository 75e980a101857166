pub mod store;
pub mod explorer;
pub mod classifier;
pub mod tracer;
pub mod context_builder;

pub use store::GraphStore;
pub use explorer::RelationshipExplorer;
pub use classifier::{vector_findings, Classification, HotspotClassifier};
pub use tracer::DataFlowTracer;
pub use context_builder::SecurityContextBuilder;
