//! Core data model types for adaptutor.
//!
//! These are the types every other module speaks: difficulty tiers,
//! subjects, grades, questions, and answer sets.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Adaptive difficulty level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Beginner, Tier::Intermediate, Tier::Advanced];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Beginner => write!(f, "beginner"),
            Tier::Intermediate => write!(f, "intermediate"),
            Tier::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Tier::Beginner),
            "intermediate" => Ok(Tier::Intermediate),
            "advanced" => Ok(Tier::Advanced),
            other => Err(format!("unknown difficulty tier: {other}")),
        }
    }
}

/// Subject a learner is assessed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Subject {
    Math,
    English,
    /// A mix of Math and English questions.
    Both,
}

impl Subject {
    /// Long-form description used in prompts.
    pub fn describe(&self) -> &'static str {
        match self {
            Subject::Math => "Mathematics",
            Subject::English => "English Language Arts",
            Subject::Both => "Mathematics and English Language Arts (mix of both)",
        }
    }

    pub fn includes_math(&self) -> bool {
        matches!(self, Subject::Math | Subject::Both)
    }

    pub fn includes_english(&self) -> bool {
        matches!(self, Subject::English | Subject::Both)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Math => write!(f, "Math"),
            Subject::English => write!(f, "English"),
            Subject::Both => write!(f, "Both"),
        }
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "math" | "maths" | "mathematics" => Ok(Subject::Math),
            "english" => Ok(Subject::English),
            "both" => Ok(Subject::Both),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// School grade, 1 through 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 12;

    pub fn new(value: u8) -> Result<Self, String> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Grade(value))
        } else {
            Err(format!(
                "grade must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            ))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Grade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Grade::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single multiple-choice question.
///
/// Generated questions carry every field; questions re-submitted by a
/// caller for evaluation only need `id`, `topic`, `correctAnswer` and
/// `difficulty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier, unique within a round. JSON numbers are accepted.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Question text.
    #[serde(default)]
    pub question: String,
    /// Question text in Hindi.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_hindi: Option<String>,
    /// Answer options.
    #[serde(default)]
    pub options: Vec<String>,
    /// Answer options in Hindi, parallel to `options`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options_hindi: Vec<String>,
    /// The option that counts as correct (exact match).
    pub correct_answer: String,
    /// Topic the question exercises.
    pub topic: String,
    /// Tier the question was written for.
    #[serde(default)]
    pub difficulty: Tier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_hindi: Option<String>,
}

impl Question {
    /// Whether the answer set holds exactly this question's correct answer.
    ///
    /// Comparison is case-sensitive with no normalization.
    pub fn is_answered_correctly(&self, answers: &AnswerSet) -> bool {
        answers
            .get(&self.id)
            .is_some_and(|chosen| *chosen == self.correct_answer)
    }
}

/// The learner's chosen option per question id. Unanswered questions are absent.
pub type AnswerSet = HashMap<String, String>;

/// Accept ids written as JSON strings or numbers.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
