pub mod provider;
pub mod claude;
pub mod prompts;
pub mod parser;

pub use provider::ReviewProvider;
pub use claude::ClaudeProvider;
pub use prompts::{ReviewRequest, ReviewerProfile, REVIEWER_ROSTER};
