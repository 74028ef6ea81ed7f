//! End-to-end assessment rounds through the real provider mock and file store.
//!
//! These tests drive question generation, evaluation, and re-adaptation the
//! way a deployment would, with progress persisted to a temporary directory.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use adaptutor_core::engine::{AdaptedFrom, AssessmentEngine, ContentSource, EngineConfig};
use adaptutor_core::model::{AnswerSet, Subject, Tier};
use adaptutor_providers::mock::MockProvider;
use adaptutor_store::JsonFileStore;

const MATH_ROUND: &str = r#"```json
[
  {"id": 1, "question": "5 + 3?", "options": ["7", "8", "9", "10"], "correctAnswer": "8", "topic": "Addition", "difficulty": "beginner"},
  {"id": 2, "question": "7 + 6?", "options": ["12", "13", "14", "15"], "correctAnswer": "13", "topic": "Addition", "difficulty": "beginner"},
  {"id": 3, "question": "Half of 8?", "options": ["2", "4", "6", "8"], "correctAnswer": "4", "topic": "Fractions", "difficulty": "beginner"},
  {"id": 4, "question": "A quarter of 8?", "options": ["2", "4", "6", "8"], "correctAnswer": "2", "topic": "Fractions", "difficulty": "beginner"},
  {"id": 5, "question": "9 - 4?", "options": ["3", "4", "5", "6"], "correctAnswer": "5", "topic": "Subtraction", "difficulty": "beginner"}
]
```"#;

fn config() -> EngineConfig {
    EngineConfig {
        model: "mock-model".into(),
        retry_delay: Duration::ZERO,
        ..Default::default()
    }
}

fn engine(provider: Arc<MockProvider>, dir: &tempfile::TempDir) -> AssessmentEngine {
    let store = JsonFileStore::open(dir.path()).unwrap();
    AssessmentEngine::new(provider, Arc::new(store), config())
}

fn answers(pairs: &[(&str, &str)]) -> AnswerSet {
    pairs
        .iter()
        .map(|(id, a)| (id.to_string(), a.to_string()))
        .collect()
}

#[tokio::test]
async fn e2e_weak_topic_drives_next_round() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::with_fixed_response(MATH_ROUND));
    let engine = engine(provider.clone(), &dir);

    let round = engine
        .get_adaptive_questions("ravi", 3, Subject::Math)
        .await
        .unwrap();
    assert_eq!(round.source, ContentSource::Generated);
    assert_eq!(round.questions.len(), 5);

    // Additions right, fractions wrong, subtraction right: 3/5.
    let summary = engine
        .evaluate_and_adapt(
            "ravi",
            &round.questions,
            &answers(&[("1", "8"), ("2", "13"), ("3", "6"), ("4", "8"), ("5", "5")]),
            3,
            Subject::Math,
        )
        .await
        .unwrap();
    assert_eq!(summary.score, 60);
    assert_eq!(summary.current_tier, Tier::Intermediate);
    assert_eq!(summary.weaknesses, vec!["Fractions"]);
    assert_eq!(summary.strengths, vec!["Addition", "Subtraction"]);

    let next = engine
        .get_adaptive_questions("ravi", 3, Subject::Math)
        .await
        .unwrap();
    assert_eq!(next.adapted_from, AdaptedFrom::PreviousPerformance);
    assert_eq!(next.difficulty_tier, Tier::Intermediate);

    let prompt = provider.last_request().unwrap().prompt;
    assert!(prompt.contains("at intermediate level"));
    assert!(prompt.contains("Score: 3/5"));
    assert!(prompt.contains("weak areas (Fractions)"));
}

#[tokio::test]
async fn e2e_progress_persists_across_engines() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::with_fixed_response(MATH_ROUND));

    {
        let engine = engine(provider.clone(), &dir);
        let round = engine
            .get_adaptive_questions("ravi", 3, Subject::Math)
            .await
            .unwrap();
        engine
            .evaluate_and_adapt(
                "ravi",
                &round.questions,
                &answers(&[("1", "8"), ("2", "13"), ("3", "4"), ("4", "2"), ("5", "5")]),
                3,
                Subject::Math,
            )
            .await
            .unwrap();
    }

    let engine = engine(provider, &dir);
    let record = engine
        .get_progress("ravi", Subject::Math)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.version, 1);
    assert_eq!(record.current_tier, Some(Tier::Advanced));
    assert_eq!(record.history[0].score, 5);
    assert_eq!(record.history[0].difficulty, Tier::Beginner);
    assert!(engine
        .get_progress("ravi", Subject::English)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn e2e_failing_provider_serves_fallback_and_keeps_record_clean() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::failing("connection refused"));
    let engine = engine(provider.clone(), &dir);

    let round = engine
        .get_adaptive_questions("meera", 5, Subject::English)
        .await
        .unwrap();
    assert_eq!(round.source, ContentSource::Fallback);
    assert_eq!(round.questions.len(), 5);
    assert_eq!(provider.call_count(), config().max_retries + 1);

    assert!(engine
        .get_progress("meera", Subject::English)
        .await
        .unwrap()
        .is_none());

    // Fallback questions are scoreable like any other round.
    let none_right = AnswerSet::new();
    let summary = engine
        .evaluate_and_adapt("meera", &round.questions, &none_right, 5, Subject::English)
        .await
        .unwrap();
    assert_eq!(summary.score, 0);
    assert_eq!(summary.current_tier, Tier::Beginner);
    assert!(summary.strengths.is_empty());
}

#[tokio::test]
async fn e2e_both_subject_prompt_mixes_catalogues() {
    let dir = tempfile::tempdir().unwrap();
    let mut responses = HashMap::new();
    responses.insert("English topic areas".to_string(), MATH_ROUND.to_string());
    let provider = Arc::new(MockProvider::new(responses));
    let engine = engine(provider.clone(), &dir);

    let round = engine
        .get_adaptive_questions("ravi", 4, Subject::Both)
        .await
        .unwrap();
    assert_eq!(round.source, ContentSource::Generated);

    let prompt = provider.last_request().unwrap().prompt;
    assert!(prompt.contains("Math topic areas"));
    assert!(prompt.contains("English topic areas"));
}
