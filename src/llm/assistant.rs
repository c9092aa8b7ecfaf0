//! Assistant tasks: free-form chat plus three structured generators.

use serde::de::DeserializeOwned;

use super::prompts;
use super::types::*;
use super::{CompletionRequest, LlmClient, LlmError};
use crate::models::Condition;

pub const MAX_MESSAGE_CHARS: usize = 2000;
/// Older turns beyond this are dropped before forwarding.
pub const MAX_HISTORY: usize = 20;

/// The trimmed message, or why it cannot be sent.
pub fn chat_message(request: &ChatRequest) -> Result<&str, LlmError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(LlmError::InvalidRequest("Message is required".into()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(LlmError::InvalidRequest(format!(
            "Message must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(message)
}

/// Answer a chat message in the context of recent history.
pub fn chat_reply(client: &dyn LlmClient, request: &ChatRequest) -> Result<String, LlmError> {
    let message = chat_message(request)?;

    let today = chrono::Local::now().date_naive();
    let history = &request.chat_history;
    let recent = &history[history.len().saturating_sub(MAX_HISTORY)..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(ChatMessage::system(prompts::chat_system(
        &request.user_profile,
        today,
    )));
    messages.extend(recent.iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(message));

    tracing::debug!(
        model = client.model(),
        history = recent.len(),
        "Forwarding chat message"
    );

    client.complete(&CompletionRequest {
        messages,
        json_response: false,
    })
}

pub fn diet_recommendations(
    client: &dyn LlmClient,
    profile: &HealthProfile,
) -> Result<DietPlan, LlmError> {
    structured(client, prompts::DIET_SYSTEM, profile_json(profile)?)
}

pub fn exercise_plan(
    client: &dyn LlmClient,
    profile: &HealthProfile,
) -> Result<ExercisePlan, LlmError> {
    structured(client, prompts::EXERCISE_SYSTEM, profile_json(profile)?)
}

pub fn educational_content(
    client: &dyn LlmClient,
    condition: Condition,
) -> Result<EducationalContent, LlmError> {
    structured(
        client,
        prompts::EDUCATION_SYSTEM,
        prompts::education_user(condition.display_name()),
    )
}

fn profile_json(profile: &HealthProfile) -> Result<String, LlmError> {
    serde_json::to_string(profile).map_err(|e| LlmError::InvalidRequest(e.to_string()))
}

/// Run a JSON-mode completion and deserialize the reply. Missing fields
/// fall back to empty values; anything that is not a JSON object fails.
fn structured<T: DeserializeOwned>(
    client: &dyn LlmClient,
    system: &str,
    user: String,
) -> Result<T, LlmError> {
    let raw = client.complete(&CompletionRequest {
        messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        json_response: true,
    })?;

    let trimmed = raw.trim();
    let json = if trimmed.is_empty() {
        "{}"
    } else {
        extract_json_block(trimmed)?
    };

    serde_json::from_str(json).map_err(|e| {
        tracing::warn!(error = %e, "LLM returned unusable JSON");
        LlmError::ResponseParsing(e.to_string())
    })
}

/// Extract a JSON object from LLM response text, tolerating markdown
/// fences and text around it.
fn extract_json_block(response: &str) -> Result<&str, LlmError> {
    if let Some(start) = response.find("```json") {
        let after_fence = &response[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return Ok(after_fence[..end].trim());
        }
    }

    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if start < end {
            return Ok(&response[start..=end]);
        }
    }

    Err(LlmError::ResponseParsing(
        "No JSON object found in LLM response".to_string(),
    ))
}
