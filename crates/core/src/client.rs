//! HTTP client for the remote healthcare API.
//!
//! [`HealthcareApiClient`] implements both collaborator traits: it is the [`RecordSource`] the
//! fetcher pages through and the [`SubmissionChannel`] assessments are posted to. Every request
//! carries the API key in the `x-api-key` header.

use crate::assessment::{AlertLists, AssessmentResponse, AssessmentService};
use crate::config::CoreConfig;
use crate::constants::{API_KEY_HEADER, PATIENTS_PATH, SUBMIT_ASSESSMENT_PATH};
use crate::error::{ApiError, ApiResult, ConfigError, ConfigResult};
use crate::fetcher::PatientFetcher;
use crate::observer::PipelineObserver;
use crate::patient::PatientsPage;
use crate::source::{RecordSource, SubmissionChannel};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct HealthcareApiClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl HealthcareApiClient {
    /// Build a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::HttpClient` if the underlying HTTP client cannot be constructed.
    pub fn new(config: &CoreConfig) -> ConfigResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            api_key: config.api_key().to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.ok().filter(|b| !b.is_empty());
        Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        })
    }
}

fn transport_error(url: &str, error: reqwest::Error) -> ApiError {
    ApiError::Transport {
        url: url.to_string(),
        message: error.to_string(),
    }
}

fn body_error(url: &str, error: reqwest::Error) -> ApiError {
    if error.is_decode() {
        ApiError::Decode {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        transport_error(url, error)
    }
}

#[async_trait]
impl RecordSource for HealthcareApiClient {
    async fn fetch_page(&self, page: u32, limit: u32) -> ApiResult<PatientsPage> {
        let url = self.url(PATIENTS_PATH);
        let request = self.http.get(&url).query(&[("page", page), ("limit", limit)]);

        self.send(&url, request)
            .await?
            .json::<PatientsPage>()
            .await
            .map_err(|e| body_error(&url, e))
    }
}

#[async_trait]
impl SubmissionChannel for HealthcareApiClient {
    async fn submit(&self, submission: &AlertLists) -> ApiResult<AssessmentResponse> {
        let url = self.url(SUBMIT_ASSESSMENT_PATH);
        let request = self.http.post(&url).json(submission);

        self.send(&url, request)
            .await?
            .json::<AssessmentResponse>()
            .await
            .map_err(|e| body_error(&url, e))
    }
}

/// Wire an [`AssessmentService`] against the configured API.
pub fn assessment_service(
    config: &CoreConfig,
    observer: Arc<dyn PipelineObserver>,
) -> ConfigResult<AssessmentService> {
    let client = Arc::new(HealthcareApiClient::new(config)?);
    let fetcher = PatientFetcher::new(
        client.clone(),
        config.retry_policy().clone(),
        observer.clone(),
    );
    Ok(AssessmentService::new(fetcher, client, observer))
}
