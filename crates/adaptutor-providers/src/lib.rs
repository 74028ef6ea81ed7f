//! adaptutor-providers — text-generation provider integrations.
//!
//! Implements the `LlmProvider` trait for OpenAI-compatible endpoints and
//! Google Gemini, plus an offline provider for deployments without a key
//! and a scriptable mock for tests.

pub mod config;
mod http;
pub mod gemini;
pub mod mock;
pub mod offline;
pub mod openai;

pub use adaptutor_core::error::ProviderError;
pub use config::{
    create_provider, load_config, load_config_from, resolve_provider, AdaptutorConfig,
    ProviderConfig,
};
