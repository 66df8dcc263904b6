//! Paginated patient retrieval with retry and backoff.
//!
//! A fetch walks the pages in order, one request at a time, until the source reports
//! `hasNext == false`:
//!
//! ```text
//! Idle -> Requesting(page) -> Success & hasNext   -> (pacing delay) -> Requesting(page + 1)
//!                          -> Success & !hasNext  -> Done
//!                          -> retryable failure   -> Backoff -> Requesting(page)
//!                          -> fatal / exhausted   -> Aborted
//! ```
//!
//! Retry counters are per page and reset whenever a page succeeds. A fetch either returns every
//! record or the error that aborted it; partial results are dropped.

use crate::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_PAGE_DELAY_MS, DEFAULT_RETRY_DELAY_MS, FIRST_PAGE, MAX_JITTER_MS,
    MAX_PAGE_SIZE,
};
use crate::error::{ApiError, ApiResult};
use crate::observer::PipelineObserver;
use crate::patient::{Patient, PatientsPage};
use crate::source::RecordSource;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Pagination and retry settings for a fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed per page after the first attempt.
    pub max_retries: u32,
    /// Backoff base; retry `n` waits `base_delay * 2^n` plus jitter.
    pub base_delay: Duration,
    /// Exclusive upper bound of the random jitter.
    pub max_jitter: Duration,
    /// Pause between successful page requests.
    pub page_delay: Duration,
    /// Records requested per page.
    pub page_size: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_jitter: Duration::from_millis(MAX_JITTER_MS),
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            page_size: MAX_PAGE_SIZE,
        }
    }
}

/// What to do after a failed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    /// Retryable, but the page has used its whole retry budget.
    Exhausted,
    Fatal,
}

impl RetryPolicy {
    /// Decide whether a page that has already been retried `retries` times may try again.
    pub fn decide(&self, error: &ApiError, retries: u32) -> RetryDecision {
        if !error.is_retryable() {
            RetryDecision::Fatal
        } else if retries < self.max_retries {
            RetryDecision::Retry
        } else {
            RetryDecision::Exhausted
        }
    }

    /// Delay before retry number `retries + 1`. Saturates instead of overflowing.
    pub fn backoff(&self, retries: u32, jitter: Duration) -> Duration {
        2u32.checked_pow(retries)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
            .saturating_add(jitter)
    }

    fn random_jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        let max_ms = self.max_jitter.as_millis().max(1) as u64;
        Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
    }
}

/// Fetches the complete patient collection from a [`RecordSource`].
#[derive(Clone)]
pub struct PatientFetcher {
    source: Arc<dyn RecordSource>,
    policy: RetryPolicy,
    observer: Arc<dyn PipelineObserver>,
}

impl PatientFetcher {
    pub fn new(
        source: Arc<dyn RecordSource>,
        policy: RetryPolicy,
        observer: Arc<dyn PipelineObserver>,
    ) -> Self {
        Self {
            source,
            policy,
            observer,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch every page and concatenate the records in page order.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error, or the last retryable error once a page has exhausted its
    /// retries. Records from earlier pages are discarded.
    pub async fn fetch_all_patients(&self) -> ApiResult<Vec<Patient>> {
        self.observer.fetch_started();

        let mut patients = Vec::new();
        let mut page = FIRST_PAGE;

        loop {
            let response = self.fetch_page(page).await?;
            patients.extend(response.data);
            self.observer.page_fetched(&response.pagination, patients.len());

            if !response.pagination.has_next {
                break;
            }

            page += 1;
            if !self.policy.page_delay.is_zero() {
                tokio::time::sleep(self.policy.page_delay).await;
            }
        }

        self.observer.fetch_completed(patients.len());
        Ok(patients)
    }

    /// Fetch a single page, retrying retryable failures with exponential backoff and jitter.
    pub async fn fetch_page(&self, page: u32) -> ApiResult<PatientsPage> {
        let mut retries = 0u32;

        loop {
            let error = match self.source.fetch_page(page, self.policy.page_size).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            match self.policy.decide(&error, retries) {
                RetryDecision::Retry => {
                    let delay = self.policy.backoff(retries, self.policy.random_jitter());
                    retries += 1;
                    self.observer.retry_scheduled(
                        page,
                        &error,
                        delay,
                        retries,
                        self.policy.max_retries,
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Exhausted | RetryDecision::Fatal => {
                    self.observer.page_failed(page, retries, &error);
                    return Err(error);
                }
            }
        }
    }
}
