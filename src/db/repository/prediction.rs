use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

use crate::db::DatabaseError;
use crate::models::*;
use crate::risk::RiskAssessment;

/// Storage mapping for one condition's input set.
///
/// Each condition owns a table whose input columns sit between the
/// common `id, user_id` prefix and the `risk_percentage, risk_category,
/// created_at` suffix.
pub trait PredictionTable: Sized {
    const TABLE: &'static str;
    const INPUT_COLUMNS: &'static [&'static str];

    /// Values in `INPUT_COLUMNS` order.
    fn input_values(&self) -> Vec<Value>;

    /// Read the input columns starting at `offset`.
    fn input_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self>;
}

const PREFIX_COLUMNS: usize = 2;

fn select_sql<I: PredictionTable>(predicate: &str) -> String {
    format!(
        "SELECT id, user_id, {}, risk_percentage, risk_category, created_at FROM {} WHERE {predicate}",
        I::INPUT_COLUMNS.join(", "),
        I::TABLE,
    )
}

pub fn insert_prediction<I: PredictionTable>(
    conn: &Connection,
    user_id: Option<i64>,
    input: I,
    assessment: &RiskAssessment,
) -> Result<PredictionRecord<I>, DatabaseError> {
    let created_at = Utc::now();
    let category = assessment.risk_category.as_str();
    let input_values = input.input_values();

    let column_count = PREFIX_COLUMNS - 1 + I::INPUT_COLUMNS.len() + 3;
    let placeholders = (1..=column_count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} (user_id, {}, risk_percentage, risk_category, created_at) VALUES ({placeholders})",
        I::TABLE,
        I::INPUT_COLUMNS.join(", "),
    );

    let mut bound: Vec<&dyn ToSql> = Vec::with_capacity(column_count);
    bound.push(&user_id);
    bound.extend(input_values.iter().map(|v| v as &dyn ToSql));
    bound.push(&assessment.risk_percentage);
    bound.push(&category);
    bound.push(&created_at);

    conn.execute(&sql, bound.as_slice())?;

    Ok(PredictionRecord {
        id: conn.last_insert_rowid(),
        user_id,
        input,
        risk_percentage: assessment.risk_percentage,
        risk_category: assessment.risk_category,
        created_at,
    })
}

/// All of a user's records for one condition, newest first.
pub fn list_predictions<I: PredictionTable>(
    conn: &Connection,
    user_id: i64,
) -> Result<Vec<PredictionRecord<I>>, DatabaseError> {
    let sql = select_sql::<I>("user_id = ?1 ORDER BY created_at DESC, id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], record_from_row::<I>)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

pub fn get_prediction<I: PredictionTable>(
    conn: &Connection,
    id: i64,
) -> Result<Option<PredictionRecord<I>>, DatabaseError> {
    let sql = select_sql::<I>("id = ?1");
    let record = conn
        .query_row(&sql, params![id], record_from_row::<I>)
        .optional()?;
    Ok(record)
}

fn record_from_row<I: PredictionTable>(row: &Row<'_>) -> rusqlite::Result<PredictionRecord<I>> {
    let suffix = PREFIX_COLUMNS + I::INPUT_COLUMNS.len();
    let category: String = row.get(suffix + 1)?;
    let risk_category = RiskCategory::from_str(&category).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(suffix + 1, Type::Text, e.to_string().into())
    })?;

    Ok(PredictionRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        input: I::input_from_row(row, PREFIX_COLUMNS)?,
        risk_percentage: row.get(suffix)?,
        risk_category,
        created_at: row.get::<_, DateTime<Utc>>(suffix + 2)?,
    })
}

fn flag(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

impl PredictionTable for DiabetesInput {
    const TABLE: &'static str = "diabetes_predictions";
    const INPUT_COLUMNS: &'static [&'static str] = &[
        "age",
        "gender",
        "family_history",
        "glucose",
        "bmi",
        "blood_pressure",
        "insulin",
    ];

    fn input_values(&self) -> Vec<Value> {
        vec![
            Value::Real(self.age),
            Value::Text(self.gender.clone()),
            flag(self.family_history),
            Value::Real(self.glucose),
            Value::Real(self.bmi),
            Value::Real(self.blood_pressure),
            Value::Real(self.insulin),
        ]
    }

    fn input_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            age: row.get(offset)?,
            gender: row.get(offset + 1)?,
            family_history: row.get(offset + 2)?,
            glucose: row.get(offset + 3)?,
            bmi: row.get(offset + 4)?,
            blood_pressure: row.get(offset + 5)?,
            insulin: row.get(offset + 6)?,
        })
    }
}

impl PredictionTable for HeartDiseaseInput {
    const TABLE: &'static str = "heart_disease_predictions";
    const INPUT_COLUMNS: &'static [&'static str] = &[
        "age",
        "gender",
        "chest_pain_type",
        "blood_pressure",
        "cholesterol",
        "max_heart_rate",
        "fasting_blood_sugar",
        "exercise_angina",
    ];

    fn input_values(&self) -> Vec<Value> {
        vec![
            Value::Real(self.age),
            Value::Text(self.gender.clone()),
            Value::Text(self.chest_pain_type.clone()),
            Value::Real(self.blood_pressure),
            Value::Real(self.cholesterol),
            Value::Real(self.max_heart_rate),
            Value::Real(self.fasting_blood_sugar),
            flag(self.exercise_angina),
        ]
    }

    fn input_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            age: row.get(offset)?,
            gender: row.get(offset + 1)?,
            chest_pain_type: row.get(offset + 2)?,
            blood_pressure: row.get(offset + 3)?,
            cholesterol: row.get(offset + 4)?,
            max_heart_rate: row.get(offset + 5)?,
            fasting_blood_sugar: row.get(offset + 6)?,
            exercise_angina: row.get(offset + 7)?,
        })
    }
}

impl PredictionTable for KidneyDiseaseInput {
    const TABLE: &'static str = "kidney_disease_predictions";
    const INPUT_COLUMNS: &'static [&'static str] = &[
        "age",
        "blood_pressure",
        "creatinine",
        "albumin",
        "blood_sugar",
        "hemoglobin",
        "urea",
        "sodium",
        "potassium",
    ];

    fn input_values(&self) -> Vec<Value> {
        [
            self.age,
            self.blood_pressure,
            self.creatinine,
            self.albumin,
            self.blood_sugar,
            self.hemoglobin,
            self.urea,
            self.sodium,
            self.potassium,
        ]
        .into_iter()
        .map(Value::Real)
        .collect()
    }

    fn input_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            age: row.get(offset)?,
            blood_pressure: row.get(offset + 1)?,
            creatinine: row.get(offset + 2)?,
            albumin: row.get(offset + 3)?,
            blood_sugar: row.get(offset + 4)?,
            hemoglobin: row.get(offset + 5)?,
            urea: row.get(offset + 6)?,
            sodium: row.get(offset + 7)?,
            potassium: row.get(offset + 8)?,
        })
    }
}

impl PredictionTable for LiverDiseaseInput {
    const TABLE: &'static str = "liver_disease_predictions";
    const INPUT_COLUMNS: &'static [&'static str] = &[
        "age",
        "gender",
        "total_bilirubin",
        "direct_bilirubin",
        "alkaline_phosphatase",
        "alt",
        "ast",
        "total_proteins",
        "albumin_globulin_ratio",
    ];

    fn input_values(&self) -> Vec<Value> {
        vec![
            Value::Real(self.age),
            Value::Text(self.gender.clone()),
            Value::Real(self.total_bilirubin),
            Value::Real(self.direct_bilirubin),
            Value::Real(self.alkaline_phosphatase),
            Value::Real(self.alt),
            Value::Real(self.ast),
            Value::Real(self.total_proteins),
            Value::Real(self.albumin_globulin_ratio),
        ]
    }

    fn input_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            age: row.get(offset)?,
            gender: row.get(offset + 1)?,
            total_bilirubin: row.get(offset + 2)?,
            direct_bilirubin: row.get(offset + 3)?,
            alkaline_phosphatase: row.get(offset + 4)?,
            alt: row.get(offset + 5)?,
            ast: row.get(offset + 6)?,
            total_proteins: row.get(offset + 7)?,
            albumin_globulin_ratio: row.get(offset + 8)?,
        })
    }
}
