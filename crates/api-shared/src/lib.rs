//! # API Shared
//!
//! Shared request/response types for the triage APIs.
//!
//! Contains:
//! - REST DTOs with their OpenAPI schemas (`dto` module)
//! - Boundary validation of submitted alert lists
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`; the pipeline itself lives in `triage-core`.

pub mod dto;
pub mod health;

pub use dto::{AlertListsRes, AssessmentSubmissionReq, ErrorRes, HealthRes};
pub use health::HealthService;
