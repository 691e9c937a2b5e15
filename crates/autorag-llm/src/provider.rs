//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Driver for the conversational model
///
/// Given the transcript so far and the advertised tools, a provider returns
/// the next assistant message. Tool calls in that message are handed to the
/// dispatcher; the provider never executes anything itself.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate the next assistant turn
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name
    fn name(&self) -> &str;
}
