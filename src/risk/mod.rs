//! Heuristic disease-risk scoring.
//!
//! Each condition maps its clinical inputs to a handful of factor risks,
//! caps every factor at 100, averages them with equal weight and clamps
//! the average into `[0, 100]`. The percentage is banded into a
//! [`RiskCategory`] by fixed, condition-independent thresholds.
//!
//! Scoring is pure and never fails. Range checks are a caller contract,
//! enforced by [`validation`] before [`ClinicalInput::assess`] runs.

pub mod recommendations;
pub mod scorer;
pub mod validation;

use serde::Serialize;

use crate::models::{Condition, RiskCategory};

pub use recommendations::recommendations_for;
pub use scorer::{assess_diabetes, assess_heart_disease, assess_kidney_disease, assess_liver_disease};
pub use validation::{FieldError, ValidationErrors};

/// One factor's contribution before averaging (already capped at 100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskFactor {
    pub name: &'static str,
    pub risk: f64,
}

/// Output of a single scoring call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_percentage: f64,
    pub risk_category: RiskCategory,
    pub factors: Vec<RiskFactor>,
}

/// A condition-specific input set that can be validated and scored.
pub trait ClinicalInput {
    const CONDITION: Condition;

    /// Per-factor risks, each capped at 100.
    fn risk_factors(&self) -> Vec<RiskFactor>;

    /// Check every field against its declared range.
    fn validate(&self) -> Result<(), ValidationErrors>;

    fn assess(&self) -> RiskAssessment {
        scorer::combine(self.risk_factors())
    }
}
