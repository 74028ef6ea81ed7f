//! Learner progress records and the store seam they persist through.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Subject, Tier};
use crate::scoring::{Classification, RoundAggregate};

/// Identifies one progress record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub learner_id: String,
    pub subject: Subject,
}

impl RecordKey {
    pub fn new(learner_id: impl Into<String>, subject: Subject) -> Self {
        Self {
            learner_id: learner_id.into(),
            subject,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.learner_id, self.subject)
    }
}

/// One completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique per evaluated round.
    #[serde(default = "Uuid::new_v4")]
    pub round_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Correct answers in the round.
    pub score: u32,
    pub total_questions: u32,
    /// Tier the round was played at.
    pub difficulty: Tier,
}

/// Durable adaptive state for one (learner, subject) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProgressRecord {
    pub learner_id: String,
    pub subject: Subject,
    /// Append-only round history, oldest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Union of every round's strengths.
    #[serde(default)]
    pub strengths: BTreeSet<String>,
    /// Weak topics from the latest round only.
    #[serde(default)]
    pub weaknesses: BTreeSet<String>,
    /// `None` until the first evaluation.
    #[serde(default)]
    pub current_tier: Option<Tier>,
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
    /// Bumped by the store on every successful write.
    #[serde(default)]
    pub version: u64,
}

/// What the prompt composer needs to know about past rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub last_score: u32,
    pub last_total: u32,
    pub weak_areas: Vec<String>,
    pub strong_areas: Vec<String>,
    pub current_tier: Tier,
}

impl LearnerProgressRecord {
    /// A fresh record with no history.
    pub fn new(key: &RecordKey) -> Self {
        Self {
            learner_id: key.learner_id.clone(),
            subject: key.subject,
            history: Vec::new(),
            strengths: BTreeSet::new(),
            weaknesses: BTreeSet::new(),
            current_tier: None,
            last_active: None,
            version: 0,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.learner_id.clone(), self.subject)
    }

    /// Current tier, `Beginner` before the first evaluation.
    pub fn tier(&self) -> Tier {
        self.current_tier.unwrap_or_default()
    }

    pub fn last_round(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    /// Summary of prior performance, `None` for a learner with no rounds.
    pub fn performance_summary(&self) -> Option<PerformanceSummary> {
        let last = self.last_round()?;
        Some(PerformanceSummary {
            last_score: last.score,
            last_total: last.total_questions,
            weak_areas: self.weaknesses.iter().cloned().collect(),
            strong_areas: self.strengths.iter().cloned().collect(),
            current_tier: self.tier(),
        })
    }

    /// Produce the record after one evaluated round.
    ///
    /// Appends history, unions strengths, replaces weaknesses, and sets the
    /// tier. The version is left for the store to bump.
    pub fn apply_evaluation(
        &self,
        aggregate: &RoundAggregate,
        classification: &Classification,
        next_tier: Tier,
        played_at: Tier,
        now: DateTime<Utc>,
    ) -> Self {
        let mut updated = self.clone();
        updated.history.push(HistoryEntry {
            round_id: Uuid::new_v4(),
            timestamp: now,
            score: aggregate.correct,
            total_questions: aggregate.total,
            difficulty: played_at,
        });
        updated
            .strengths
            .extend(classification.strengths.iter().cloned());
        updated.weaknesses = classification.weaknesses.clone();
        updated.current_tier = Some(next_tier);
        updated.last_active = Some(now);
        updated
    }
}

/// Durable storage for progress records.
///
/// Implementations must make `compare_and_swap` atomic per key: a write is
/// accepted only when the stored version equals `record.version`, in which
/// case the stored copy gets `record.version + 1`. A rejected write returns
/// `StoreError::Conflict` (downcastable from the `anyhow::Error`).
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Fetch a record, `None` if the learner has never been evaluated.
    async fn load(&self, key: &RecordKey) -> anyhow::Result<Option<LearnerProgressRecord>>;

    /// Persist `record` if nobody else wrote since it was loaded.
    async fn compare_and_swap(
        &self,
        record: LearnerProgressRecord,
    ) -> anyhow::Result<LearnerProgressRecord>;
}

/// Load the record for `key`, or a fresh one if none exists.
pub async fn load_or_create(
    store: &dyn ProgressStore,
    key: &RecordKey,
) -> anyhow::Result<LearnerProgressRecord> {
    Ok(store
        .load(key)
        .await?
        .unwrap_or_else(|| LearnerProgressRecord::new(key)))
}

/// In-memory store, for tests and single-process embedding.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordKey, LearnerProgressRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn load(&self, key: &RecordKey) -> anyhow::Result<Option<LearnerProgressRecord>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn compare_and_swap(
        &self,
        mut record: LearnerProgressRecord,
    ) -> anyhow::Result<LearnerProgressRecord> {
        let key = record.key();
        let mut records = self.records.write().await;
        let found = records.get(&key).map(|r| r.version).unwrap_or(0);
        if found != record.version {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected: record.version,
                found,
            }
            .into());
        }
        record.version += 1;
        records.insert(key, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::TopicTally;

    fn round(topics: &[(&str, u32, u32)]) -> (RoundAggregate, Classification) {
        let mut agg = RoundAggregate::default();
        for (topic, correct, total) in topics {
            agg.topics.insert(
                topic.to_string(),
                TopicTally {
                    correct: *correct,
                    total: *total,
                },
            );
            agg.correct += correct;
            agg.total += total;
        }
        let classification = crate::scoring::classify(&agg.topics);
        (agg, classification)
    }

    #[test]
    fn fresh_record_defaults_to_beginner() {
        let record = LearnerProgressRecord::new(&RecordKey::new("u1", Subject::Math));
        assert_eq!(record.tier(), Tier::Beginner);
        assert!(record.current_tier.is_none());
        assert!(record.performance_summary().is_none());
    }

    #[test]
    fn strengths_union_and_weaknesses_replace() {
        let record = LearnerProgressRecord::new(&RecordKey::new("u1", Subject::Both));
        let now = Utc::now();

        // Round 1: A strong, C weak.
        let (agg, c) = round(&[("A", 3, 3), ("C", 0, 2)]);
        let r1 = record.apply_evaluation(&agg, &c, Tier::Intermediate, Tier::Beginner, now);
        assert_eq!(r1.weaknesses, BTreeSet::from(["C".to_string()]));

        // Round 2: B weak, A not measured.
        let (agg, c) = round(&[("B", 0, 2), ("D", 2, 2)]);
        let r2 = r1.apply_evaluation(&agg, &c, Tier::Beginner, Tier::Intermediate, now);

        assert_eq!(r2.weaknesses, BTreeSet::from(["B".to_string()]));
        assert!(r2.strengths.contains("A") && r2.strengths.contains("D"));
        assert_eq!(r2.history.len(), 2);
        assert_eq!(r2.history[0], r1.history[0]);
        assert_eq!(r2.current_tier, Some(Tier::Beginner));
        assert_eq!(r2.history[1].difficulty, Tier::Intermediate);
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = LearnerProgressRecord::new(&RecordKey::new("u1", Subject::Math));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("currentTier").is_some());
        assert_eq!(json["subject"], "Math");
    }

    #[tokio::test]
    async fn memory_store_rejects_stale_writes() {
        let store = MemoryStore::new();
        let key = RecordKey::new("u1", Subject::Math);

        let fresh = load_or_create(&store, &key).await.unwrap();
        assert_eq!(fresh.version, 0);
        assert!(store.is_empty().await);

        let saved = store.compare_and_swap(fresh.clone()).await.unwrap();
        assert_eq!(saved.version, 1);

        let err = store.compare_and_swap(fresh).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Conflict {
                expected: 0,
                found: 1,
                ..
            })
        ));

        let loaded = store.load(&key).await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(store.len().await, 1);
    }
}
