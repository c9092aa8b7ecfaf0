//! Per-condition clinical inputs and stored prediction records.
//!
//! Field names serialize in camelCase to match the web client's forms.
//! Every numeric field is an `f64`; range checks live in
//! `risk::validation`, not in deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::RiskCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiabetesInput {
    pub age: f64,
    pub gender: String,
    pub family_history: bool,
    /// Fasting plasma glucose, mg/dL.
    pub glucose: f64,
    pub bmi: f64,
    /// Systolic, mmHg.
    pub blood_pressure: f64,
    /// Serum insulin, μU/mL.
    pub insulin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartDiseaseInput {
    pub age: f64,
    pub gender: String,
    pub chest_pain_type: String,
    pub blood_pressure: f64,
    /// Total cholesterol, mg/dL.
    pub cholesterol: f64,
    pub max_heart_rate: f64,
    pub fasting_blood_sugar: f64,
    pub exercise_angina: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KidneyDiseaseInput {
    pub age: f64,
    pub blood_pressure: f64,
    /// Serum creatinine, mg/dL.
    pub creatinine: f64,
    /// Urine albumin grade, 0-5.
    pub albumin: f64,
    pub blood_sugar: f64,
    /// g/dL.
    pub hemoglobin: f64,
    /// Blood urea, mg/dL.
    pub urea: f64,
    /// mEq/L.
    pub sodium: f64,
    /// mEq/L.
    pub potassium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiverDiseaseInput {
    pub age: f64,
    pub gender: String,
    pub total_bilirubin: f64,
    pub direct_bilirubin: f64,
    pub alkaline_phosphatase: f64,
    pub alt: f64,
    pub ast: f64,
    pub total_proteins: f64,
    pub albumin_globulin_ratio: f64,
}

/// A scored input set as persisted in its condition's table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord<I> {
    pub id: i64,
    pub user_id: Option<i64>,
    #[serde(flatten)]
    pub input: I,
    pub risk_percentage: f64,
    pub risk_category: RiskCategory,
    pub created_at: DateTime<Utc>,
}
