//! Patient records as delivered by the remote API.
//!
//! The remote source is loosely typed: clinical fields can arrive as numbers, strings, sentinel
//! strings such as `"N/A"`, `null`, or be missing entirely. Records are therefore deserialised
//! without validation and every clinical field is kept as a [`FieldValue`]; the scorer decides
//! what counts as usable data.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A raw clinical field value exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// `null` or absent from the payload.
    #[default]
    Missing,
    Number(f64),
    Text(String),
    /// Anything else (booleans, arrays, objects). Never scoreable.
    Other(Value),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Missing, Into::into)
    }
}

/// One patient's record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Numeric ids are kept as their JSON text; a missing or `null` id becomes `""`.
    #[serde(default, deserialize_with = "lenient_id")]
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub age: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub blood_pressure: FieldValue,
    #[serde(default)]
    pub temperature: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<String>,
}

impl Patient {
    /// Build a record carrying only the fields the scorer reads.
    pub fn with_vitals(
        patient_id: impl Into<String>,
        blood_pressure: impl Into<FieldValue>,
        temperature: impl Into<FieldValue>,
        age: impl Into<FieldValue>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            blood_pressure: blood_pressure.into(),
            temperature: temperature.into(),
            age: age.into(),
            ..Self::default()
        }
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(id)) => id,
        Some(other) => other.to_string(),
    })
}

/// Pagination block of a patients page. Only `has_next` drives the fetch loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub total_pages: u32,
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// One page of the `/patients` listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientsPage {
    pub data: Vec<Patient>,
    pub pagination: Pagination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}
