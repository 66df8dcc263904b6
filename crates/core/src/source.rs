//! Collaborator seams of the pipeline.
//!
//! The fetcher only needs something that returns one page of patients, and the assessment
//! service only needs something that accepts alert lists. Both are traits so services can be
//! wired against the HTTP client in production and against in-memory fakes in tests.

use crate::assessment::{AlertLists, AssessmentResponse};
use crate::error::ApiResult;
use crate::patient::PatientsPage;
use async_trait::async_trait;

/// Source of paginated patient records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch page `page` (1-based) holding at most `limit` records.
    async fn fetch_page(&self, page: u32, limit: u32) -> ApiResult<PatientsPage>;
}

/// Destination of an assessment submission.
#[async_trait]
pub trait SubmissionChannel: Send + Sync {
    /// Submit the alert lists and return the grader's response untouched.
    async fn submit(&self, submission: &AlertLists) -> ApiResult<AssessmentResponse>;
}
