//! Per-topic aggregation, strength/weakness classification, and
//! difficulty transitions.
//!
//! All three steps are pure functions over one round's data. The tier
//! transition deliberately ignores the previous tier: each round
//! re-derives it from the round's own score.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{AnswerSet, Question, Tier};

/// A topic scoring at or above this percentage is a strength.
pub const STRENGTH_THRESHOLD_PCT: f64 = 70.0;
/// A topic scoring strictly below this percentage is a weakness.
pub const WEAKNESS_THRESHOLD_PCT: f64 = 50.0;
/// Overall score at or above this moves the learner to `Advanced`.
pub const ADVANCED_THRESHOLD_PCT: f64 = 80.0;
/// Overall score at or above this (and below advanced) is `Intermediate`.
pub const INTERMEDIATE_THRESHOLD_PCT: f64 = 60.0;

/// Correct/total counts for one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTally {
    pub correct: u32,
    pub total: u32,
}

impl TopicTally {
    /// Percentage correct, 0.0 for an empty tally.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.correct as f64 / self.total as f64
    }
}

/// Result of folding a round's answers into tallies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundAggregate {
    /// Per-topic tallies. Every entry has `total >= 1`.
    pub topics: BTreeMap<String, TopicTally>,
    /// Total correct answers.
    pub correct: u32,
    /// Total questions asked.
    pub total: u32,
}

impl RoundAggregate {
    /// Unrounded overall percentage, or `None` when no questions were asked.
    pub fn score_percentage(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(100.0 * self.correct as f64 / self.total as f64)
        }
    }
}

/// Fold answered questions into per-topic tallies.
///
/// Every question counts toward its topic's total. A question counts as
/// correct only when its answer is present and matches exactly.
pub fn aggregate(questions: &[Question], answers: &AnswerSet) -> RoundAggregate {
    let mut result = RoundAggregate::default();

    for question in questions {
        let correct = question.is_answered_correctly(answers);
        let tally = result.topics.entry(question.topic.clone()).or_default();
        tally.total += 1;
        result.total += 1;
        if correct {
            tally.correct += 1;
            result.correct += 1;
        }
    }

    result
}

/// Strong and weak topics for one round. Disjoint by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub strengths: BTreeSet<String>,
    pub weaknesses: BTreeSet<String>,
}

/// Classify topics against the fixed strength and weakness thresholds.
///
/// Topics in `[50, 70)` are neither.
pub fn classify(topics: &BTreeMap<String, TopicTally>) -> Classification {
    let mut classification = Classification::default();

    for (topic, tally) in topics {
        let percentage = tally.percentage();
        if percentage >= STRENGTH_THRESHOLD_PCT {
            classification.strengths.insert(topic.clone());
        } else if percentage < WEAKNESS_THRESHOLD_PCT {
            classification.weaknesses.insert(topic.clone());
        }
    }

    classification
}

/// Map an unrounded score percentage to the next tier.
pub fn next_tier(score_percentage: f64) -> Tier {
    if score_percentage >= ADVANCED_THRESHOLD_PCT {
        Tier::Advanced
    } else if score_percentage >= INTERMEDIATE_THRESHOLD_PCT {
        Tier::Intermediate
    } else {
        Tier::Beginner
    }
}

/// Rounded percentage shown to learners.
pub fn display_score(score_percentage: f64) -> u32 {
    score_percentage.round().clamp(0.0, 100.0) as u32
}
