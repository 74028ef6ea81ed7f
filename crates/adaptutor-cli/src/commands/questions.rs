//! The `adaptutor questions` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use adaptutor_core::engine::ContentSource;
use adaptutor_core::model::Subject;

use super::{build_engine, print_json, GlobalArgs};

pub async fn execute(
    global: &GlobalArgs,
    learner: String,
    grade: u8,
    subject: Subject,
    provider: Option<String>,
    model: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let engine = build_engine(global, provider.as_deref(), model.as_deref())?;
    let set = engine.get_adaptive_questions(&learner, grade, subject).await?;

    if let Some(path) = &output {
        let json = serde_json::to_string_pretty(&set)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write questions: {}", path.display()))?;
        eprintln!("Questions saved to: {}", path.display());
    }

    if set.source == ContentSource::Fallback {
        eprintln!("Note: generation unavailable, serving built-in questions.");
    }
    print_json(&set)
}
