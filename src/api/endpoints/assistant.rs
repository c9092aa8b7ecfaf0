//! AI assistant endpoints under `/api/openai/`.
//!
//! Chat checks its message before resolving the configured client (503
//! when absent), then runs the blocking provider request off the async
//! workers.

use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::blocking;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::llm::{
    self, ChatReply, ChatRequest, DietPlan, EducationRequest, EducationalContent, ExercisePlan,
    HealthProfile,
};
use crate::models::Condition;

/// `POST /api/openai/chat`
pub async fn chat(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload?;
    llm::chat_message(&request)?;
    let client = ctx.llm()?;

    let reply = blocking(move || Ok(llm::chat_reply(&*client, &request)?)).await?;
    Ok(Json(ChatReply { reply }))
}

/// `POST /api/openai/diet-recommendations`
pub async fn diet(
    State(ctx): State<ApiContext>,
    payload: Result<Json<HealthProfile>, JsonRejection>,
) -> Result<Json<DietPlan>, ApiError> {
    let client = ctx.llm()?;
    let Json(profile) = payload?;

    let plan = blocking(move || Ok(llm::diet_recommendations(&*client, &profile)?)).await?;
    Ok(Json(plan))
}

/// `POST /api/openai/exercise-plan`
pub async fn exercise(
    State(ctx): State<ApiContext>,
    payload: Result<Json<HealthProfile>, JsonRejection>,
) -> Result<Json<ExercisePlan>, ApiError> {
    let client = ctx.llm()?;
    let Json(profile) = payload?;

    let plan = blocking(move || Ok(llm::exercise_plan(&*client, &profile)?)).await?;
    Ok(Json(plan))
}

/// `POST /api/openai/educational-content`
pub async fn education(
    State(ctx): State<ApiContext>,
    payload: Result<Json<EducationRequest>, JsonRejection>,
) -> Result<Json<EducationalContent>, ApiError> {
    let client = ctx.llm()?;
    let Json(request) = payload?;
    let condition = Condition::from_str(request.disease.trim())
        .map_err(|_| ApiError::BadRequest(format!("Unknown disease: {}", request.disease)))?;

    let content =
        blocking(move || Ok(llm::educational_content(&*client, condition)?)).await?;
    Ok(Json(content))
}
