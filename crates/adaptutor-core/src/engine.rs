//! Assessment round orchestrator.
//!
//! Two independent, request-scoped phases share nothing but the progress
//! record: the question phase reads it to adapt the prompt, the
//! evaluation phase folds answers into it. Generation failures never touch
//! the record; they fall back to built-in content instead.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AssessmentError, AssessmentResult, ProviderError, StoreError};
use crate::fallback::{fallback_plan, fallback_questions};
use crate::model::{AnswerSet, Grade, Question, Subject, Tier};
use crate::parser::{parse_questions, parse_study_plan};
use crate::plan::StudyPlan;
use crate::progress::{load_or_create, LearnerProgressRecord, ProgressStore, RecordKey};
use crate::prompt::{
    compose_plan_prompt, compose_question_prompt, PlanPrompt, QuestionPrompt,
    DEFAULT_QUESTION_COUNT,
};
use crate::scoring::{aggregate, classify, display_score, next_tier, TopicTally};
use crate::traits::{GenerateRequest, LlmProvider, DEFAULT_SYSTEM_PROMPT};

/// Scores at or above this get the "excellent" message.
pub const EXCELLENT_THRESHOLD_PCT: f64 = 70.0;
/// Scores at or above this (and below excellent) get the "good effort" message.
pub const GOOD_EFFORT_THRESHOLD_PCT: f64 = 50.0;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Configuration for the assessment engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Max tokens for generation.
    pub max_tokens: u32,
    /// Upper bound on a single generation call.
    pub generation_timeout: Duration,
    /// Retries on transient provider errors.
    pub max_retries: u32,
    /// Initial delay between retries, doubled each time.
    pub retry_delay: Duration,
    /// Load/apply/compare-and-swap attempts before giving up on a write.
    pub max_update_attempts: u32,
    /// Questions requested per round.
    pub question_count: usize,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            generation_timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_delay: Duration::from_millis(500),
            max_update_attempts: 5,
            question_count: DEFAULT_QUESTION_COUNT,
            system_prompt_override: None,
        }
    }
}

/// Whether a question set was adapted to prior rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdaptedFrom {
    #[serde(rename = "previous performance")]
    PreviousPerformance,
    #[serde(rename = "initial assessment")]
    InitialAssessment,
}

/// Where returned content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Generated,
    Fallback,
}

/// Result of the question phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveQuestions {
    pub questions: Vec<Question>,
    pub difficulty_tier: Tier,
    pub adapted_from: AdaptedFrom,
    pub source: ContentSource,
}

/// Bilingual feedback line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encouragement {
    pub english: String,
    pub hindi: String,
}

/// Result of the evaluation phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    /// Rounded percentage.
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    /// This round's strengths.
    pub strengths: Vec<String>,
    /// This round's weaknesses.
    pub weaknesses: Vec<String>,
    pub current_tier: Tier,
    pub topic_breakdown: BTreeMap<String, TopicTally>,
    pub encouragement: Encouragement,
}

/// Result of a study-plan request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanResponse {
    pub plan: StudyPlan,
    pub difficulty_tier: Tier,
    pub adapted_from: AdaptedFrom,
    pub source: ContentSource,
}

/// Pick the feedback message for a score.
pub fn encouragement(score_percentage: f64) -> Encouragement {
    let (english, hindi) = if score_percentage >= EXCELLENT_THRESHOLD_PCT {
        (
            "Excellent work! You're doing great!",
            "बहुत बढ़िया! आप बहुत अच्छा कर रहे हैं!",
        )
    } else if score_percentage >= GOOD_EFFORT_THRESHOLD_PCT {
        (
            "Good effort! Let's practice more together!",
            "अच्छा प्रयास! आइए और अभ्यास करें!",
        )
    } else {
        (
            "Don't worry! We'll learn together step by step!",
            "चिंता मत करो! हम एक साथ सीखेंगे!",
        )
    };
    Encouragement {
        english: english.to_string(),
        hindi: hindi.to_string(),
    }
}

/// The assessment engine.
pub struct AssessmentEngine {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn ProgressStore>,
    config: EngineConfig,
}

impl AssessmentEngine {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn ProgressStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Question phase: adapt to prior rounds, generate, parse, or fall back.
    ///
    /// Never writes the progress record.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn get_adaptive_questions(
        &self,
        learner_id: &str,
        grade: u8,
        subject: Subject,
    ) -> AssessmentResult<AdaptiveQuestions> {
        check_learner_id(learner_id)?;
        let grade = Grade::new(grade).map_err(AssessmentError::InvalidInput)?;

        let record = self.read_for_adaptation(learner_id, subject).await;
        let summary = record.as_ref().and_then(|r| r.performance_summary());
        let tier = record.as_ref().map(|r| r.tier()).unwrap_or_default();
        let adapted_from = if summary.is_some() {
            AdaptedFrom::PreviousPerformance
        } else {
            AdaptedFrom::InitialAssessment
        };

        let prompt = compose_question_prompt(&QuestionPrompt {
            grade,
            subject,
            tier,
            question_count: self.config.question_count,
            previous: summary.as_ref(),
        });
        tracing::debug!("question prompt:\n{prompt}");

        let generated = match self.generate_text(prompt).await {
            Ok(text) => parse_questions(&text, tier, self.config.question_count)
                .map_err(|e| AssessmentError::MalformedGenerationOutput(e.to_string())),
            Err(e) => Err(e),
        };

        let (questions, source) = match generated {
            Ok(questions) => (questions, ContentSource::Generated),
            Err(e) => {
                tracing::warn!("serving built-in questions for {learner_id}/{subject}: {e}");
                (fallback_questions(subject, tier), ContentSource::Fallback)
            }
        };

        tracing::info!(
            "{} {tier} question(s) for {learner_id}/{subject} ({:?}, {:?})",
            questions.len(),
            adapted_from,
            source
        );

        Ok(AdaptiveQuestions {
            questions,
            difficulty_tier: tier,
            adapted_from,
            source,
        })
    }

    /// Evaluation phase: score the round and fold it into the progress record.
    #[instrument(skip(self, questions, answers), fields(questions = questions.len()))]
    pub async fn evaluate_and_adapt(
        &self,
        learner_id: &str,
        questions: &[Question],
        answers: &AnswerSet,
        grade: u8,
        subject: Subject,
    ) -> AssessmentResult<EvaluationSummary> {
        check_learner_id(learner_id)?;
        Grade::new(grade).map_err(AssessmentError::InvalidInput)?;
        check_questions(questions)?;

        let round = aggregate(questions, answers);
        let score_percentage = round
            .score_percentage()
            .ok_or_else(|| AssessmentError::invalid("no questions to evaluate"))?;
        let classification = classify(&round.topics);
        let tier = next_tier(score_percentage);
        let played_at = questions.first().map(|q| q.difficulty).unwrap_or_default();

        let key = RecordKey::new(learner_id, subject);
        let mut attempt = 0u32;
        let saved = loop {
            attempt += 1;
            let record = load_or_create(self.store.as_ref(), &key)
                .await
                .map_err(persistence_failure)?;
            let updated =
                record.apply_evaluation(&round, &classification, tier, played_at, Utc::now());

            match self.store.compare_and_swap(updated).await {
                Ok(saved) => break saved,
                Err(e) if is_conflict(&e) && attempt < self.config.max_update_attempts => {
                    tracing::debug!("retrying update of {key} after conflict (attempt {attempt})");
                }
                Err(e) => return Err(persistence_failure(e)),
            }
        };

        tracing::info!(
            "{key}: {}/{} correct ({:.1}%), {played_at} -> {tier}, {} round(s) recorded",
            round.correct,
            round.total,
            score_percentage,
            saved.history.len()
        );

        Ok(EvaluationSummary {
            score: display_score(score_percentage),
            correct_answers: round.correct,
            total_questions: round.total,
            strengths: classification.strengths.into_iter().collect(),
            weaknesses: classification.weaknesses.into_iter().collect(),
            current_tier: tier,
            topic_breakdown: round.topics,
            encouragement: encouragement(score_percentage),
        })
    }

    /// Read a learner's record without modifying it.
    pub async fn get_progress(
        &self,
        learner_id: &str,
        subject: Subject,
    ) -> AssessmentResult<Option<LearnerProgressRecord>> {
        check_learner_id(learner_id)?;
        self.store
            .load(&RecordKey::new(learner_id, subject))
            .await
            .map_err(persistence_failure)
    }

    /// Build a weekly study plan from the learner's progress.
    ///
    /// Never writes the progress record.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn generate_study_plan(
        &self,
        learner_id: &str,
        grade: u8,
        subject: Subject,
        learner_name: Option<&str>,
    ) -> AssessmentResult<StudyPlanResponse> {
        check_learner_id(learner_id)?;
        let grade = Grade::new(grade).map_err(AssessmentError::InvalidInput)?;

        let record = self.read_for_adaptation(learner_id, subject).await;
        let summary = record.as_ref().and_then(|r| r.performance_summary());
        let tier = record.as_ref().map(|r| r.tier()).unwrap_or_default();
        let adapted_from = if summary.is_some() {
            AdaptedFrom::PreviousPerformance
        } else {
            AdaptedFrom::InitialAssessment
        };

        let prompt = compose_plan_prompt(&PlanPrompt {
            grade,
            subject,
            tier,
            learner_name,
            previous: summary.as_ref(),
        });

        let generated = match self.generate_text(prompt).await {
            Ok(text) => parse_study_plan(&text)
                .map_err(|e| AssessmentError::MalformedGenerationOutput(e.to_string())),
            Err(e) => Err(e),
        };

        let (plan, source) = match generated {
            Ok(plan) => (plan, ContentSource::Generated),
            Err(e) => {
                tracing::warn!("serving built-in study plan for {learner_id}/{subject}: {e}");
                let weaknesses = summary.map(|s| s.weak_areas).unwrap_or_default();
                (
                    fallback_plan(subject, tier, &weaknesses),
                    ContentSource::Fallback,
                )
            }
        };

        Ok(StudyPlanResponse {
            plan,
            difficulty_tier: tier,
            adapted_from,
            source,
        })
    }

    /// Load the record for prompt adaptation. Store failures degrade to
    /// "first-time learner" instead of failing the request.
    async fn read_for_adaptation(
        &self,
        learner_id: &str,
        subject: Subject,
    ) -> Option<LearnerProgressRecord> {
        let key = RecordKey::new(learner_id, subject);
        match self.store.load(&key).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    "progress unavailable for {key}, treating as first assessment: {e:#}"
                );
                None
            }
        }
    }

    /// Call the provider with a bounded timeout, retrying transient errors
    /// with exponential backoff.
    async fn generate_text(&self, prompt: String) -> AssessmentResult<String> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            system_prompt: Some(
                self.config
                    .system_prompt_override
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            ),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut retry_delay = self.config.retry_delay;
        let mut last_error: Option<anyhow::Error> = None;

        for retry in 0..=self.config.max_retries {
            if retry > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
            }

            let outcome = tokio::time::timeout(
                self.config.generation_timeout,
                self.provider.generate(&request),
            )
            .await;
            let error = match outcome {
                Ok(Ok(response)) => {
                    tracing::debug!(
                        "{} responded in {}ms ({} tokens)",
                        response.model,
                        response.latency_ms,
                        response.token_usage.total_tokens
                    );
                    return Ok(response.extracted_payload);
                }
                Ok(Err(e)) => e,
                Err(_) => ProviderError::Timeout(self.config.generation_timeout.as_secs()).into(),
            };

            if let Some(provider_error) = error.downcast_ref::<ProviderError>() {
                if provider_error.is_permanent() {
                    return Err(AssessmentError::GenerationCapabilityUnavailable(
                        provider_error.to_string(),
                    ));
                }
                if let Some(ms) = provider_error.retry_after_ms() {
                    retry_delay = Duration::from_millis(ms).min(MAX_RETRY_DELAY);
                }
            }
            tracing::debug!("generation attempt {} failed: {error:#}", retry + 1);
            last_error = Some(error);
        }

        Err(AssessmentError::GenerationCapabilityUnavailable(
            last_error
                .map(|e| format!("{e:#}"))
                .unwrap_or_else(|| "no attempts made".to_string()),
        ))
    }
}

fn check_learner_id(learner_id: &str) -> AssessmentResult<()> {
    if learner_id.trim().is_empty() {
        return Err(AssessmentError::invalid("learner id is required"));
    }
    Ok(())
}

fn check_questions(questions: &[Question]) -> AssessmentResult<()> {
    if questions.is_empty() {
        return Err(AssessmentError::invalid("questions are required"));
    }
    let mut seen = HashSet::new();
    for question in questions {
        if question.topic.trim().is_empty() {
            return Err(AssessmentError::invalid(format!(
                "question {} has no topic",
                question.id
            )));
        }
        if !seen.insert(question.id.as_str()) {
            return Err(AssessmentError::invalid(format!(
                "duplicate question id {}",
                question.id
            )));
        }
    }
    Ok(())
}

fn is_conflict(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<StoreError>(),
        Some(StoreError::Conflict { .. })
    )
}

fn persistence_failure(error: anyhow::Error) -> AssessmentError {
    AssessmentError::RecordPersistenceFailure(format!("{error:#}"))
}
