//! # Triage Core
//!
//! Core business logic for the patient triage pipeline:
//! - Paginated patient retrieval with retry, exponential backoff and jitter (`fetcher`)
//! - Deterministic per-patient risk scoring with data-quality detection (`scoring`)
//! - Alert classification and assessment submission (`assessment`)
//! - The `reqwest` client for the remote healthcare API (`client`)
//!
//! **No API concerns**: REST routing and request validation belong in `api-rest` and
//! `api-shared`. Logging is reported through [`observer::PipelineObserver`].

pub mod assessment;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod fetcher;
pub mod observer;
pub mod patient;
pub mod scoring;
pub mod source;

#[cfg(test)]
mod test_support;

pub use assessment::{
    classify, classify_scores, AlertCounts, AlertLists, AssessmentResponse, AssessmentService,
};
pub use client::{assessment_service, HealthcareApiClient};
pub use config::CoreConfig;
pub use error::{ApiError, ApiResult, ConfigError, ConfigResult};
pub use fetcher::{PatientFetcher, RetryDecision, RetryPolicy};
pub use observer::{NoopObserver, PipelineObserver, TracingObserver};
pub use patient::{FieldValue, Pagination, Patient, PatientsPage};
pub use scoring::{
    calculate_risk_score, has_fever, score_age, score_blood_pressure, score_temperature,
    DimensionScore, RiskScore, TemperatureScore,
};
pub use source::{RecordSource, SubmissionChannel};
