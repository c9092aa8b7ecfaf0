use serde::{Deserialize, Serialize};

use crate::models::ChatRole;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A prior turn as sent by the browser. Role is free text; anything other
/// than `user` is treated as the assistant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

impl From<&HistoryEntry> for ChatMessage {
    fn from(entry: &HistoryEntry) -> Self {
        if entry.role == "user" {
            ChatMessage::user(entry.content.clone())
        } else {
            ChatMessage::assistant(entry.content.clone())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub chat_history: Vec<HistoryEntry>,
    /// Arbitrary profile data passed through into the system prompt.
    #[serde(default)]
    pub user_profile: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Risk summary the diet and exercise generators tailor their output to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diabetes_risk: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_disease_risk: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kidney_disease_risk: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liver_disease_risk: Option<f64>,
    pub age: f64,
    pub gender: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DietPlan {
    pub diet_plan: String,
    pub foods_to_eat: Vec<String>,
    pub foods_to_avoid: Vec<String>,
    pub meal_ideas: MealIdeas,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealIdeas {
    pub breakfast: Vec<String>,
    pub lunch: Vec<String>,
    pub dinner: Vec<String>,
    pub snacks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExercisePlan {
    pub plan_type: String,
    pub plan_description: String,
    pub weekly_schedule: Vec<ScheduleDay>,
    pub precautions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleDay {
    pub day: String,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    pub name: String,
    pub duration: String,
    pub intensity: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EducationRequest {
    pub disease: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationalContent {
    pub overview: String,
    pub symptoms: Vec<String>,
    pub risk_factors: Vec<String>,
    pub prevention_tips: Vec<String>,
    pub management_strategies: Vec<String>,
}
