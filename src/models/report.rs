use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::SecurityContext;
use super::finding::{Consensus, FinalAssessment};

/// The serialized artifact handed to the downstream report collaborator:
/// the graph-derived context plus the consolidated verdict for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    pub changeset_digest: String,
    pub changed_files: Vec<String>,
    pub context: SecurityContext,
    pub consensus: Consensus,
    pub assessment: FinalAssessment,
    pub passes_completed: usize,
    pub passes_degraded: usize,
    pub reviewed_at: DateTime<Utc>,
}
