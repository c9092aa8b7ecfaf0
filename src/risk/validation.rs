//! Declared input ranges, checked before scoring.
//!
//! All violations are collected rather than stopping at the first, so a
//! form can highlight every bad field in one round trip.

use serde::Serialize;

use crate::models::*;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|e| e.field)
    }
}

/// Inclusive numeric range for one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

const fn range(min: f64, max: f64) -> FieldRange {
    FieldRange { min, max }
}

pub const AGE: FieldRange = range(18.0, 120.0);

pub const DIABETES_GLUCOSE: FieldRange = range(70.0, 300.0);
pub const DIABETES_BMI: FieldRange = range(15.0, 50.0);
pub const DIABETES_BLOOD_PRESSURE: FieldRange = range(80.0, 200.0);
pub const DIABETES_INSULIN: FieldRange = range(0.0, 300.0);

pub const HEART_BLOOD_PRESSURE: FieldRange = range(80.0, 220.0);
pub const HEART_CHOLESTEROL: FieldRange = range(100.0, 400.0);
pub const HEART_MAX_HEART_RATE: FieldRange = range(60.0, 220.0);
pub const HEART_FASTING_BLOOD_SUGAR: FieldRange = range(0.0, 300.0);

pub const KIDNEY_BLOOD_PRESSURE: FieldRange = range(80.0, 220.0);
pub const KIDNEY_CREATININE: FieldRange = range(0.1, 15.0);
pub const KIDNEY_ALBUMIN: FieldRange = range(0.0, 5.0);
pub const KIDNEY_BLOOD_SUGAR: FieldRange = range(70.0, 300.0);
pub const KIDNEY_HEMOGLOBIN: FieldRange = range(7.0, 20.0);
pub const KIDNEY_UREA: FieldRange = range(10.0, 150.0);
pub const KIDNEY_SODIUM: FieldRange = range(120.0, 160.0);
pub const KIDNEY_POTASSIUM: FieldRange = range(2.0, 7.0);

pub const LIVER_TOTAL_BILIRUBIN: FieldRange = range(0.1, 30.0);
pub const LIVER_DIRECT_BILIRUBIN: FieldRange = range(0.1, 20.0);
pub const LIVER_ALKALINE_PHOSPHATASE: FieldRange = range(20.0, 500.0);
pub const LIVER_ALT: FieldRange = range(5.0, 500.0);
pub const LIVER_AST: FieldRange = range(5.0, 500.0);
pub const LIVER_TOTAL_PROTEINS: FieldRange = range(2.0, 10.0);
pub const LIVER_ALBUMIN_GLOBULIN_RATIO: FieldRange = range(0.1, 5.0);

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn number(&mut self, field: &'static str, value: f64, range: FieldRange) -> &mut Self {
        if !value.is_finite() {
            self.errors.push(FieldError {
                field,
                message: "must be a finite number".into(),
            });
        } else if value < range.min || value > range.max {
            self.errors.push(FieldError {
                field,
                message: format!("must be between {} and {}", range.min, range.max),
            });
        }
        self
    }

    fn text(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError {
                field,
                message: "is required".into(),
            });
        }
        self
    }

    fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.errors)))
        }
    }
}

pub fn validate_diabetes(input: &DiabetesInput) -> Result<(), ValidationErrors> {
    Checker::default()
        .number("age", input.age, AGE)
        .text("gender", &input.gender)
        .number("glucose", input.glucose, DIABETES_GLUCOSE)
        .number("bmi", input.bmi, DIABETES_BMI)
        .number("bloodPressure", input.blood_pressure, DIABETES_BLOOD_PRESSURE)
        .number("insulin", input.insulin, DIABETES_INSULIN)
        .finish()
}

pub fn validate_heart_disease(input: &HeartDiseaseInput) -> Result<(), ValidationErrors> {
    Checker::default()
        .number("age", input.age, AGE)
        .text("gender", &input.gender)
        .text("chestPainType", &input.chest_pain_type)
        .number("bloodPressure", input.blood_pressure, HEART_BLOOD_PRESSURE)
        .number("cholesterol", input.cholesterol, HEART_CHOLESTEROL)
        .number("maxHeartRate", input.max_heart_rate, HEART_MAX_HEART_RATE)
        .number(
            "fastingBloodSugar",
            input.fasting_blood_sugar,
            HEART_FASTING_BLOOD_SUGAR,
        )
        .finish()
}

pub fn validate_kidney_disease(input: &KidneyDiseaseInput) -> Result<(), ValidationErrors> {
    Checker::default()
        .number("age", input.age, AGE)
        .number("bloodPressure", input.blood_pressure, KIDNEY_BLOOD_PRESSURE)
        .number("creatinine", input.creatinine, KIDNEY_CREATININE)
        .number("albumin", input.albumin, KIDNEY_ALBUMIN)
        .number("bloodSugar", input.blood_sugar, KIDNEY_BLOOD_SUGAR)
        .number("hemoglobin", input.hemoglobin, KIDNEY_HEMOGLOBIN)
        .number("urea", input.urea, KIDNEY_UREA)
        .number("sodium", input.sodium, KIDNEY_SODIUM)
        .number("potassium", input.potassium, KIDNEY_POTASSIUM)
        .finish()
}

pub fn validate_liver_disease(input: &LiverDiseaseInput) -> Result<(), ValidationErrors> {
    Checker::default()
        .number("age", input.age, AGE)
        .text("gender", &input.gender)
        .number("totalBilirubin", input.total_bilirubin, LIVER_TOTAL_BILIRUBIN)
        .number("directBilirubin", input.direct_bilirubin, LIVER_DIRECT_BILIRUBIN)
        .number(
            "alkalinePhosphatase",
            input.alkaline_phosphatase,
            LIVER_ALKALINE_PHOSPHATASE,
        )
        .number("alt", input.alt, LIVER_ALT)
        .number("ast", input.ast, LIVER_AST)
        .number("totalProteins", input.total_proteins, LIVER_TOTAL_PROTEINS)
        .number(
            "albuminGlobulinRatio",
            input.albumin_globulin_ratio,
            LIVER_ALBUMIN_GLOBULIN_RATIO,
        )
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::ClinicalInput;

    fn diabetes() -> DiabetesInput {
        DiabetesInput {
            age: 45.0,
            gender: "female".into(),
            family_history: false,
            glucose: 100.0,
            bmi: 24.0,
            blood_pressure: 120.0,
            insulin: 80.0,
        }
    }

    #[test]
    fn valid_diabetes_input_passes() {
        assert!(diabetes().validate().is_ok());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let mut input = diabetes();
        input.age = 18.0;
        input.glucose = 300.0;
        input.bmi = 15.0;
        input.insulin = 0.0;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let mut input = diabetes();
        input.age = 17.0;
        input.glucose = 301.0;
        input.gender = "   ".into();
        let err = input.validate().unwrap_err();
        let fields: Vec<_> = err.fields().collect();
        assert_eq!(fields, vec!["age", "gender", "glucose"]);
        assert_eq!(err.0[0].message, "must be between 18 and 120");
    }

    #[test]
    fn non_finite_numbers_rejected() {
        let mut input = diabetes();
        input.bmi = f64::NAN;
        let err = input.validate().unwrap_err();
        assert_eq!(err.0[0].field, "bmi");
        assert_eq!(err.0[0].message, "must be a finite number");
    }

    #[test]
    fn heart_requires_chest_pain_type() {
        let input = HeartDiseaseInput {
            age: 50.0,
            gender: "male".into(),
            chest_pain_type: String::new(),
            blood_pressure: 225.0,
            cholesterol: 200.0,
            max_heart_rate: 150.0,
            fasting_blood_sugar: 90.0,
            exercise_angina: true,
        };
        let err = input.validate().unwrap_err();
        let fields: Vec<_> = err.fields().collect();
        assert_eq!(fields, vec!["chestPainType", "bloodPressure"]);
    }

    #[test]
    fn kidney_fractional_bounds() {
        let mut input = KidneyDiseaseInput {
            age: 50.0,
            blood_pressure: 120.0,
            creatinine: 0.1,
            albumin: 0.0,
            blood_sugar: 100.0,
            hemoglobin: 14.0,
            urea: 30.0,
            sodium: 140.0,
            potassium: 4.0,
        };
        assert!(input.validate().is_ok());

        input.creatinine = 0.09;
        input.potassium = 7.5;
        let err = input.validate().unwrap_err();
        let fields: Vec<_> = err.fields().collect();
        assert_eq!(fields, vec!["creatinine", "potassium"]);
    }

    #[test]
    fn liver_enzymes_checked_independently() {
        let input = LiverDiseaseInput {
            age: 40.0,
            gender: "female".into(),
            total_bilirubin: 0.8,
            direct_bilirubin: 0.2,
            alkaline_phosphatase: 90.0,
            alt: 501.0,
            ast: 4.0,
            total_proteins: 7.0,
            albumin_globulin_ratio: 1.4,
        };
        let err = input.validate().unwrap_err();
        let fields: Vec<_> = err.fields().collect();
        assert_eq!(fields, vec!["alt", "ast"]);
    }
}
