//! Constants used throughout the triage core crate.
//!
//! This module contains the wire paths, header names, defaults and clinical thresholds so that
//! the fetcher, scorer and client agree on a single value for each.

/// Header carrying the API key on every request to the remote API.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Path of the paginated patient listing endpoint.
pub const PATIENTS_PATH: &str = "/patients";

/// Path of the assessment submission endpoint.
pub const SUBMIT_ASSESSMENT_PATH: &str = "/submit-assessment";

/// Largest page size the remote API accepts. Requesting the maximum keeps the request count low.
pub const MAX_PAGE_SIZE: u32 = 20;

/// First page number of the remote pagination scheme.
pub const FIRST_PAGE: u32 = 1;

/// Default number of retries per page for retryable failures.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Default base delay for exponential backoff, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Default pacing delay between successful page requests, in milliseconds.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 200;

/// Default per-request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound (exclusive) of the random jitter added to every backoff delay, in milliseconds.
pub const MAX_JITTER_MS: u64 = 1_000;

/// HTTP statuses that are worth retrying: rate limiting and transient server failures.
pub const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Minimum total risk score for a patient to be listed as high risk.
pub const HIGH_RISK_THRESHOLD: u8 = 4;
