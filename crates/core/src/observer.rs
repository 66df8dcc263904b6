//! Pipeline observation hooks.
//!
//! The fetcher and the assessment service report progress through [`PipelineObserver`] instead
//! of logging directly, so the core can be driven and inspected in tests without a subscriber.
//! [`TracingObserver`] is the implementation wired up by the binaries.

use crate::assessment::{AlertCounts, AssessmentResponse};
use crate::error::ApiError;
use crate::patient::Pagination;
use std::time::Duration;

/// Receives pipeline events. Every method defaults to a no-op.
pub trait PipelineObserver: Send + Sync {
    fn fetch_started(&self) {}

    /// A page was fetched; `accumulated` counts records fetched so far, this page included.
    fn page_fetched(&self, _pagination: &Pagination, _accumulated: usize) {}

    /// A retryable failure on `page` will be retried after `delay`. `attempt` starts at 1.
    fn retry_scheduled(
        &self,
        _page: u32,
        _error: &ApiError,
        _delay: Duration,
        _attempt: u32,
        _max_retries: u32,
    ) {
    }

    /// `page` failed for good after `retries` retries; the fetch is aborted.
    fn page_failed(&self, _page: u32, _retries: u32, _error: &ApiError) {}

    fn fetch_completed(&self, _total: usize) {}

    fn alerts_built(&self, _counts: &AlertCounts) {}

    fn submission_started(&self, _counts: &AlertCounts) {}

    fn submission_succeeded(&self, _response: &AssessmentResponse) {}

    fn submission_failed(&self, _error: &ApiError) {}
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Observer that turns pipeline events into `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn fetch_started(&self) {
        tracing::info!("Starting to fetch all patients");
    }

    fn page_fetched(&self, pagination: &Pagination, accumulated: usize) {
        tracing::info!(
            page = pagination.page,
            total_pages = pagination.total_pages,
            accumulated,
            "Fetched page {}/{} ({} patients so far)",
            pagination.page,
            pagination.total_pages,
            accumulated
        );
    }

    fn retry_scheduled(
        &self,
        page: u32,
        error: &ApiError,
        delay: Duration,
        attempt: u32,
        max_retries: u32,
    ) {
        tracing::warn!(
            page,
            status = error.status(),
            delay_ms = delay.as_millis() as u64,
            "Request failed with status {:?}, retrying in {}ms (attempt {}/{})",
            error.status(),
            delay.as_millis(),
            attempt,
            max_retries
        );
    }

    fn page_failed(&self, page: u32, retries: u32, error: &ApiError) {
        tracing::error!(
            page,
            retries,
            "Failed to fetch patients page {} after {} retries: {}",
            page,
            retries,
            error
        );
    }

    fn fetch_completed(&self, total: usize) {
        tracing::info!(total, "Finished fetching all patients");
    }

    fn alerts_built(&self, counts: &AlertCounts) {
        tracing::info!(
            high_risk = counts.high_risk,
            fever = counts.fever,
            data_quality = counts.data_quality,
            "Built alert lists"
        );
    }

    fn submission_started(&self, counts: &AlertCounts) {
        tracing::info!(
            high_risk = counts.high_risk,
            fever = counts.fever,
            data_quality = counts.data_quality,
            "Submitting assessment"
        );
    }

    fn submission_succeeded(&self, response: &AssessmentResponse) {
        tracing::info!(
            score = response.score(),
            "Assessment submitted successfully"
        );
    }

    fn submission_failed(&self, error: &ApiError) {
        tracing::error!(status = error.status(), "Failed to submit assessment: {}", error);
        if let Some(body) = error.body() {
            tracing::error!("Response data: {}", body);
        }
    }
}
