//! adaptutor-core — Adaptive assessment engine, traits, and scoring.
//!
//! This crate defines the learner data model, the scoring pipeline
//! (aggregate, classify, transition), the progress record and its store
//! seam, prompt composition, generation-output parsing, and the
//! orchestrator that ties one assessment round together.

pub mod engine;
pub mod error;
pub mod fallback;
pub mod model;
pub mod parser;
pub mod plan;
pub mod progress;
pub mod prompt;
pub mod scoring;
pub mod traits;
