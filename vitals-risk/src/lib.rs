//! Rule-based health-risk scoring for daily vitals, plus the JSON ingestion,
//! storage, pipeline and simulator glue around it.

pub mod engine;
pub mod pipeline;
pub mod simulator;
pub mod store;

use serde_json::Value;
use vitals_core::{EngineConfig, RiskInsight, VitalsError, VitalsSnapshot};

pub use engine::{
    analyze, analyze_at, evaluate_cardiovascular, evaluate_cardiovascular_at, evaluate_diabetes,
    evaluate_diabetes_at, evaluate_hypertension, evaluate_hypertension_at,
    needs_urgent_attention, urgent_insights,
};
pub use pipeline::{ingest, ingest_at, Assessment};
pub use simulator::{HealthProfile, VitalsSimulator};
pub use store::{InsightStore, MemoryInsightStore, StoreError};

/// Score a snapshot given as a JSON string.
pub fn analyze_snapshot_str(
    snapshot_json: &str,
    config: &EngineConfig,
) -> Result<Vec<RiskInsight>, VitalsError> {
    let value: Value =
        serde_json::from_str(snapshot_json).map_err(|err| VitalsError::Parse(err.to_string()))?;
    analyze_snapshot_value(&value, config)
}

/// Score a snapshot given as a `serde_json::Value`.
pub fn analyze_snapshot_value(
    snapshot: &Value,
    config: &EngineConfig,
) -> Result<Vec<RiskInsight>, VitalsError> {
    let snapshot = parse_snapshot(snapshot)?;
    Ok(analyze(&snapshot, config))
}

/// Build a `VitalsSnapshot` from dashboard JSON.
///
/// `subjectId` is required; numeric ids are accepted and kept as their
/// decimal string.
pub fn parse_snapshot(value: &Value) -> Result<VitalsSnapshot, VitalsError> {
    let object = value.as_object().ok_or_else(|| {
        VitalsError::Parse(format!("Expected a JSON object, received {}", type_name(value)))
    })?;

    let subject_id = match object.get("subjectId") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::Number(id)) => id.to_string(),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            return Err(VitalsError::MissingData)
        }
        Some(other) => {
            return Err(VitalsError::Parse(format!(
                "subjectId must be a string or number, received {}",
                type_name(other)
            )))
        }
    };

    let mut normalized = object.clone();
    normalized.insert("subjectId".to_string(), Value::String(subject_id));

    serde_json::from_value(Value::Object(normalized))
        .map_err(|err| VitalsError::Parse(err.to_string()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
