//! REST request and response bodies.
//!
//! The submission request is deserialised loosely and validated explicitly, so a bad body gets
//! one message per violated rule instead of a single serde error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use triage_core::AlertLists;
use utoipa::ToSchema;

const HIGH_RISK_FIELD: &str = "high_risk_patients";
const FEVER_FIELD: &str = "fever_patients";
const DATA_QUALITY_FIELD: &str = "data_quality_issues";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub message: String,
    /// Individual validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Status returned by the remote API, when the failure came from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    /// Body returned by the remote API; JSON when it parses, a string otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub upstream_body: Option<Value>,
}

impl ErrorRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// The three alert lists as returned by `POST /healthcare/process`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AlertListsRes {
    pub high_risk_patients: Vec<String>,
    pub fever_patients: Vec<String>,
    pub data_quality_issues: Vec<String>,
}

impl From<AlertLists> for AlertListsRes {
    fn from(lists: AlertLists) -> Self {
        Self {
            high_risk_patients: lists.high_risk_patients,
            fever_patients: lists.fever_patients,
            data_quality_issues: lists.data_quality_issues,
        }
    }
}

/// Body of `POST /healthcare/submit`.
///
/// Every list must be present, non-empty and contain only strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AssessmentSubmissionReq {
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub high_risk_patients: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub fever_patients: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub data_quality_issues: Option<Value>,
}

impl AssessmentSubmissionReq {
    /// Validate the body and convert it into alert lists.
    ///
    /// # Errors
    ///
    /// Returns every validation message, in field order.
    pub fn validate(self) -> Result<AlertLists, Vec<String>> {
        let mut errors = Vec::new();

        let high_risk_patients =
            validate_id_list(HIGH_RISK_FIELD, self.high_risk_patients, &mut errors);
        let fever_patients = validate_id_list(FEVER_FIELD, self.fever_patients, &mut errors);
        let data_quality_issues =
            validate_id_list(DATA_QUALITY_FIELD, self.data_quality_issues, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(AlertLists {
            high_risk_patients,
            fever_patients,
            data_quality_issues,
        })
    }
}

fn validate_id_list(name: &str, value: Option<Value>, errors: &mut Vec<String>) -> Vec<String> {
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => {
            errors.push(format!("{name} must be an array"));
            return Vec::new();
        }
    };

    if items.is_empty() {
        errors.push(format!("{name} must not be empty"));
        return Vec::new();
    }

    let total = items.len();
    let ids: Vec<String> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(id) => Some(id),
            _ => None,
        })
        .collect();

    if ids.len() != total {
        errors.push(format!("Each {name} item must be a string"));
        return Vec::new();
    }
    ids
}
