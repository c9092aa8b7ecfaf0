//! Risk prediction endpoints.
//!
//! `POST /api/predictions/:condition` is registered once per condition
//! with the matching input type; the read endpoints dispatch on the
//! condition slug in the path.

use std::str::FromStr;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db::{self, PredictionTable};
use crate::models::*;
use crate::risk::{recommendations_for, ClinicalInput, RiskFactor};

/// A stored record plus the explanation that goes with it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse<I: Serialize> {
    #[serde(flatten)]
    pub record: PredictionRecord<I>,
    pub factors: Vec<RiskFactor>,
    pub recommendations: Vec<&'static str>,
}

/// `POST /api/predictions/<condition>`: validate, score, store.
///
/// The record is attached to the logged-in user, or stored anonymously.
/// A `userId` in the body is ignored.
pub async fn submit<I>(
    State(ctx): State<ApiContext>,
    user: Option<Extension<UserContext>>,
    payload: Result<Json<I>, JsonRejection>,
) -> Result<(StatusCode, Json<PredictionResponse<I>>), ApiError>
where
    I: ClinicalInput + PredictionTable + DeserializeOwned + Serialize + Send + 'static,
{
    let Json(input) = payload?;
    input.validate()?;

    let assessment = input.assess();
    let condition = I::CONDITION;
    let recommendations = recommendations_for(condition, assessment.risk_category);
    let user_id = user.map(|Extension(u)| u.user_id);

    let conn = ctx.open_db()?;
    let record = db::insert_prediction(&conn, user_id, input, &assessment)?;

    tracing::info!(
        %condition,
        prediction_id = record.id,
        ?user_id,
        risk = record.risk_percentage,
        category = %record.risk_category,
        "Prediction stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(PredictionResponse {
            record,
            factors: assessment.factors,
            recommendations,
        }),
    ))
}

fn parse_condition(slug: &str) -> Result<Condition, ApiError> {
    Condition::from_str(slug).map_err(|_| ApiError::NotFound(format!("Unknown condition: {slug}")))
}

/// `GET /api/users/:user_id/predictions/:condition`: a user's history,
/// newest first. Only the user themselves may read it.
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<UserContext>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path((user_id, slug)) = path?;
    let user_id: i64 = user_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid user ID".into()))?;
    let condition = parse_condition(&slug)?;
    if user_id != session.user_id {
        return Err(ApiError::Forbidden);
    }

    let conn = ctx.open_db()?;
    Ok(match condition {
        Condition::Diabetes => list::<DiabetesInput>(&conn, user_id)?,
        Condition::HeartDisease => list::<HeartDiseaseInput>(&conn, user_id)?,
        Condition::KidneyDisease => list::<KidneyDiseaseInput>(&conn, user_id)?,
        Condition::LiverDisease => list::<LiverDiseaseInput>(&conn, user_id)?,
    })
}

fn list<I>(conn: &Connection, user_id: i64) -> Result<Response, ApiError>
where
    I: PredictionTable + Serialize,
{
    let records = db::list_predictions::<I>(conn, user_id)?;
    Ok(Json(records).into_response())
}

/// `GET /api/predictions/:condition/:id`: one record. Owned records are
/// visible to their owner only; anonymous ones to anybody. Anything else
/// is reported as missing.
pub async fn detail(
    State(ctx): State<ApiContext>,
    user: Option<Extension<UserContext>>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path((slug, id)) = path?;
    let condition = parse_condition(&slug)?;
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid prediction ID".into()))?;
    let viewer = user.map(|Extension(u)| u.user_id);

    let conn = ctx.open_db()?;
    match condition {
        Condition::Diabetes => fetch::<DiabetesInput>(&conn, id, viewer),
        Condition::HeartDisease => fetch::<HeartDiseaseInput>(&conn, id, viewer),
        Condition::KidneyDisease => fetch::<KidneyDiseaseInput>(&conn, id, viewer),
        Condition::LiverDisease => fetch::<LiverDiseaseInput>(&conn, id, viewer),
    }
}

fn fetch<I>(conn: &Connection, id: i64, viewer: Option<i64>) -> Result<Response, ApiError>
where
    I: PredictionTable + Serialize,
{
    match db::get_prediction::<I>(conn, id)? {
        Some(record) if record.user_id.is_none() || record.user_id == viewer => {
            Ok(Json(record).into_response())
        }
        _ => Err(ApiError::NotFound("Prediction not found".into())),
    }
}
