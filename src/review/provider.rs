use async_trait::async_trait;
use crate::error::Result;
use crate::models::ReviewPass;
use crate::review::prompts::ReviewRequest;

#[async_trait]
pub trait ReviewProvider: Send + Sync {
    async fn assess(&self, request: ReviewRequest) -> Result<ReviewPass>;
    fn name(&self) -> &str;
}
