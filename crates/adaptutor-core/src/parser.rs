//! Parse-and-validate for generation output.
//!
//! Generated text is untrusted: it may be wrapped in markdown, prefixed by
//! chatter, or contain questions whose answer is not among the options.
//! Parsing extracts the JSON payload, validates each question into a typed
//! `Question`, and drops the ones that cannot be scored.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::{Question, Tier};
use crate::plan::StudyPlan;
use crate::traits::extract_json_from_markdown;

/// Why generation output could not be used.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Nothing that looks like the expected JSON shape.
    #[error("no JSON {expected} found in generation output")]
    NoPayload { expected: &'static str },

    /// A JSON-looking payload that does not parse.
    #[error("generation output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Every question was rejected by validation.
    #[error("no valid questions in generation output ({rejected} rejected)")]
    NoValidQuestions { rejected: usize },

    /// A study plan without any days.
    #[error("study plan has no days")]
    EmptyPlan,
}

/// Loosely-typed question as generated. Validation turns it into a `Question`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    question_hindi: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    options_hindi: Vec<String>,
    #[serde(default)]
    correct_answer: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    explanation_hindi: Option<String>,
}

/// Parse generated text into at most `max_questions` validated questions.
///
/// Questions without a difficulty (or with an unknown one) take
/// `requested`. Questions missing an id are numbered by position.
pub fn parse_questions(
    raw: &str,
    requested: Tier,
    max_questions: usize,
) -> Result<Vec<Question>, ParseError> {
    let value = extract_value(raw, '[', ']', "array")?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => return Err(ParseError::NoPayload { expected: "array" }),
        },
        _ => return Err(ParseError::NoPayload { expected: "array" }),
    };

    let mut seen_ids = HashSet::new();
    let mut questions = Vec::new();
    let mut rejected = 0usize;

    for (position, item) in items.into_iter().enumerate() {
        let validated = serde_json::from_value::<RawQuestion>(item)
            .map_err(|e| e.to_string())
            .and_then(|raw| validate_question(raw, position, requested));

        match validated {
            Ok(question) if seen_ids.insert(question.id.clone()) => questions.push(question),
            Ok(question) => {
                tracing::warn!("dropping generated question with duplicate id {}", question.id);
                rejected += 1;
            }
            Err(reason) => {
                tracing::warn!("dropping generated question #{}: {reason}", position + 1);
                rejected += 1;
            }
        }
    }

    if questions.is_empty() {
        return Err(ParseError::NoValidQuestions { rejected });
    }
    questions.truncate(max_questions);
    Ok(questions)
}

fn validate_question(
    raw: RawQuestion,
    position: usize,
    requested: Tier,
) -> Result<Question, String> {
    let text = non_empty(raw.question).ok_or("missing question text")?;
    let topic = non_empty(raw.topic).ok_or("missing topic")?;
    let correct_answer = raw.correct_answer.ok_or("missing correctAnswer")?;

    if raw.options.len() < 2 {
        return Err(format!("expected at least 2 options, got {}", raw.options.len()));
    }
    if !raw.options.contains(&correct_answer) {
        return Err(format!("correct answer {correct_answer:?} is not one of the options"));
    }

    let id = match raw.id {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => (position + 1).to_string(),
    };

    let difficulty = raw
        .difficulty
        .and_then(|d| d.parse::<Tier>().ok())
        .unwrap_or(requested);

    Ok(Question {
        id,
        question: text,
        question_hindi: non_empty(raw.question_hindi),
        options: raw.options,
        options_hindi: raw.options_hindi,
        correct_answer,
        topic,
        difficulty,
        explanation: non_empty(raw.explanation),
        explanation_hindi: non_empty(raw.explanation_hindi),
    })
}

/// Parse generated text into a study plan.
pub fn parse_study_plan(raw: &str) -> Result<StudyPlan, ParseError> {
    let value = extract_value(raw, '{', '}', "object")?;
    let plan: StudyPlan = serde_json::from_value(value)?;
    if plan.days.is_empty() {
        return Err(ParseError::EmptyPlan);
    }
    Ok(plan)
}

/// Locate and parse the JSON payload.
///
/// Tries the fence-stripped text first, then the largest substring
/// delimited by `open`/`close`.
fn extract_value(
    raw: &str,
    open: char,
    close: char,
    expected: &'static str,
) -> Result<Value, ParseError> {
    let payload = extract_json_from_markdown(raw);
    if let Ok(value) = serde_json::from_str::<Value>(&payload) {
        return Ok(value);
    }

    let candidate = largest_delimited(&payload, open, close)
        .ok_or(ParseError::NoPayload { expected })?;
    Ok(serde_json::from_str(candidate)?)
}

/// From the first `open` to the last `close`, inclusive.
pub fn largest_delimited(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
