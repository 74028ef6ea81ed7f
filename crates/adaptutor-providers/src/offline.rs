//! Provider for deployments with no generation backend.
//!
//! Every call fails with a permanent `NotConfigured` error, so the engine
//! serves built-in content without retrying.

use async_trait::async_trait;

use adaptutor_core::error::ProviderError;
use adaptutor_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo};

pub struct OfflineProvider {
    reason: String,
}

impl OfflineProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for OfflineProvider {
    fn default() -> Self {
        Self::new("no generation provider configured")
    }
}

#[async_trait]
impl LlmProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(&self, _request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        Err(ProviderError::NotConfigured(self.reason.clone()).into())
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![]
    }
}
