//! Subcommand implementations.

pub mod evaluate;
pub mod init;
pub mod list_models;
pub mod plan;
pub mod progress;
pub mod questions;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use adaptutor_core::engine::AssessmentEngine;
use adaptutor_providers::config::{load_config_from, resolve_provider, AdaptutorConfig};
use adaptutor_store::JsonFileStore;

/// Flags shared by every subcommand.
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn load_config(&self) -> Result<AdaptutorConfig> {
        load_config_from(self.config.as_deref())
    }
}

/// Wire config, provider, and file store into an engine.
pub fn build_engine(
    global: &GlobalArgs,
    provider: Option<&str>,
    model: Option<&str>,
) -> Result<AssessmentEngine> {
    let config = global.load_config()?;
    let data_dir = global
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data_dir.clone());

    let provider = resolve_provider(&config, provider)?;
    let store = JsonFileStore::open(&data_dir)?;
    tracing::debug!(
        "provider {} with progress in {}",
        provider.name(),
        data_dir.display()
    );

    Ok(AssessmentEngine::new(
        Arc::from(provider),
        Arc::new(store),
        config.engine_config(model),
    ))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
