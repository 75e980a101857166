pub mod graph;
pub mod change;
pub mod context;
pub mod finding;
pub mod report;

pub use graph::*;
pub use change::*;
pub use context::*;
pub use finding::*;
pub use report::*;
