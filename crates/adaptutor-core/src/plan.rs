//! Weekly study plan types.

use serde::{Deserialize, Serialize};

/// A personalized weekly learning plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting_hindi: Option<String>,
    pub week_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivational_message: Option<String>,
    pub days: Vec<PlanDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend_challenge: Option<WeekendChallenge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_guidance: Option<ParentGuidance>,
}

/// One day of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDay {
    pub day: String,
    pub topic: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    /// Free text; generated plans do not always use the tier names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekendChallenge {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentGuidance {
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub hindi: String,
}
