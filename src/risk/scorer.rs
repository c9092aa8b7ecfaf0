use super::{ClinicalInput, RiskAssessment, RiskFactor};
use crate::models::*;

/// Upper bound for any single factor and for the final percentage.
pub const MAX_RISK: f64 = 100.0;

/// Percentage at which the category becomes `Moderate`.
pub const MODERATE_THRESHOLD: f64 = 40.0;

/// Percentage at which the category becomes `High`.
pub const HIGH_THRESHOLD: f64 = 70.0;

impl RiskCategory {
    /// Band a percentage: `< 40` Low, `< 70` Moderate, otherwise High.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= HIGH_THRESHOLD {
            RiskCategory::High
        } else if percentage >= MODERATE_THRESHOLD {
            RiskCategory::Moderate
        } else {
            RiskCategory::Low
        }
    }
}

fn factor(name: &'static str, risk: f64) -> RiskFactor {
    RiskFactor {
        name,
        risk: risk.min(MAX_RISK),
    }
}

fn flag_risk(present: bool, weight: f64) -> f64 {
    if present {
        weight
    } else {
        0.0
    }
}

/// Unweighted mean of the factor risks, clamped into `[0, 100]`.
///
/// Factors are only capped from above; a factor may be negative and
/// pull the mean down before the final clamp.
pub(crate) fn combine(factors: Vec<RiskFactor>) -> RiskAssessment {
    let average = if factors.is_empty() {
        0.0
    } else {
        factors.iter().map(|f| f.risk).sum::<f64>() / factors.len() as f64
    };
    let risk_percentage = average.clamp(0.0, MAX_RISK);

    RiskAssessment {
        risk_percentage,
        risk_category: RiskCategory::from_percentage(risk_percentage),
        factors,
    }
}

pub fn assess_diabetes(input: &DiabetesInput) -> RiskAssessment {
    input.assess()
}

pub fn assess_heart_disease(input: &HeartDiseaseInput) -> RiskAssessment {
    input.assess()
}

pub fn assess_kidney_disease(input: &KidneyDiseaseInput) -> RiskAssessment {
    input.assess()
}

pub fn assess_liver_disease(input: &LiverDiseaseInput) -> RiskAssessment {
    input.assess()
}

impl ClinicalInput for DiabetesInput {
    const CONDITION: Condition = Condition::Diabetes;

    fn risk_factors(&self) -> Vec<RiskFactor> {
        vec![
            factor("glucose", (self.glucose - 70.0) / 2.0),
            factor("bmi", (self.bmi - 18.5) * 4.0),
            factor("familyHistory", flag_risk(self.family_history, 30.0)),
            factor("age", self.age / 2.0),
        ]
    }

    fn validate(&self) -> Result<(), super::ValidationErrors> {
        super::validation::validate_diabetes(self)
    }
}

impl ClinicalInput for HeartDiseaseInput {
    const CONDITION: Condition = Condition::HeartDisease;

    fn risk_factors(&self) -> Vec<RiskFactor> {
        vec![
            factor("cholesterol", (self.cholesterol - 150.0) / 3.0),
            factor("age", self.age / 1.5),
            factor("maxHeartRate", (self.max_heart_rate - 120.0).abs() / 1.5),
            factor("bloodPressure", (self.blood_pressure - 90.0) / 1.5),
            factor("exerciseAngina", flag_risk(self.exercise_angina, 40.0)),
        ]
    }

    fn validate(&self) -> Result<(), super::ValidationErrors> {
        super::validation::validate_heart_disease(self)
    }
}

impl ClinicalInput for KidneyDiseaseInput {
    const CONDITION: Condition = Condition::KidneyDisease;

    fn risk_factors(&self) -> Vec<RiskFactor> {
        vec![
            factor("creatinine", (self.creatinine - 0.7) * 80.0),
            factor("albumin", self.albumin * 25.0),
            factor("bloodPressure", (self.blood_pressure - 90.0) / 1.5),
            factor("age", self.age / 1.5),
        ]
    }

    fn validate(&self) -> Result<(), super::ValidationErrors> {
        super::validation::validate_kidney_disease(self)
    }
}

impl ClinicalInput for LiverDiseaseInput {
    const CONDITION: Condition = Condition::LiverDisease;

    fn risk_factors(&self) -> Vec<RiskFactor> {
        let mean_enzyme = (self.alt + self.ast) / 2.0;
        vec![
            factor("bilirubin", (self.total_bilirubin - 0.3) * 50.0),
            factor("liverEnzymes", (mean_enzyme - 10.0) / 3.0),
            factor("proteinRatio", (self.albumin_globulin_ratio - 1.5).abs() * 30.0),
            factor("age", self.age / 1.5),
        ]
    }

    fn validate(&self) -> Result<(), super::ValidationErrors> {
        super::validation::validate_liver_disease(self)
    }
}
