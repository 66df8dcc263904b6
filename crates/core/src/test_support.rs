//! In-memory collaborators shared by the unit tests.

use crate::assessment::{AlertCounts, AlertLists, AssessmentResponse};
use crate::error::{ApiError, ApiResult};
use crate::observer::PipelineObserver;
use crate::patient::{Pagination, Patient, PatientsPage};
use crate::source::{RecordSource, SubmissionChannel};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn status_error(status: u16) -> ApiError {
    ApiError::Status {
        status,
        url: "http://api.test/patients".into(),
        body: Some(format!(r#"{{"error":"status {status}"}}"#)),
    }
}

pub(crate) fn page(number: u32, has_next: bool, ids: &[&str]) -> PatientsPage {
    page_of(
        number,
        has_next,
        ids.iter()
            .map(|id| Patient {
                patient_id: id.to_string(),
                ..Patient::default()
            })
            .collect(),
    )
}

pub(crate) fn page_of(number: u32, has_next: bool, data: Vec<Patient>) -> PatientsPage {
    PatientsPage {
        data,
        pagination: Pagination {
            page: number,
            limit: 20,
            has_next,
            has_previous: number > 1,
            ..Pagination::default()
        },
        metadata: None,
    }
}

/// Replays scripted page responses and records every request.
pub(crate) struct ScriptedSource {
    responses: Mutex<VecDeque<ApiResult<PatientsPage>>>,
    fallback: Option<u16>,
    calls: Mutex<Vec<(u32, u32)>>,
}

impl ScriptedSource {
    pub(crate) fn new(responses: Vec<ApiResult<PatientsPage>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every request with the status of `error`.
    pub(crate) fn repeating(error: ApiResult<PatientsPage>) -> Self {
        let status = error
            .err()
            .and_then(|e| e.status())
            .expect("repeating source needs a status error");
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: Some(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(u32, u32)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    async fn fetch_page(&self, page: u32, limit: u32) -> ApiResult<PatientsPage> {
        self.calls.lock().expect("calls lock").push((page, limit));
        let next = self.responses.lock().expect("responses lock").pop_front();
        match (next, self.fallback) {
            (Some(response), _) => response,
            (None, Some(status)) => Err(status_error(status)),
            (None, None) => panic!("no scripted response for page {page}"),
        }
    }
}

/// Records submissions and answers with a fixed result.
pub(crate) struct RecordingChannel {
    result: Mutex<Option<ApiResult<AssessmentResponse>>>,
    submissions: Mutex<Vec<AlertLists>>,
}

impl RecordingChannel {
    pub(crate) fn answering(result: ApiResult<AssessmentResponse>) -> Self {
        Self {
            result: Mutex::new(Some(result)),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn submissions(&self) -> Vec<AlertLists> {
        self.submissions.lock().expect("submissions lock").clone()
    }
}

#[async_trait]
impl SubmissionChannel for RecordingChannel {
    async fn submit(&self, submission: &AlertLists) -> ApiResult<AssessmentResponse> {
        self.submissions
            .lock()
            .expect("submissions lock")
            .push(submission.clone());
        self.result
            .lock()
            .expect("result lock")
            .take()
            .expect("channel answers once")
    }
}

/// Keeps the events the tests assert on.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    retry_delays: Mutex<Vec<Duration>>,
    failures: Mutex<Vec<(u32, u32)>>,
    completed: Mutex<Option<usize>>,
    alerts: Mutex<Option<AlertCounts>>,
    submission_errors: Mutex<Vec<(Option<u16>, Option<String>)>>,
}

impl RecordingObserver {
    pub(crate) fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays.lock().expect("lock").clone()
    }

    pub(crate) fn failures(&self) -> Vec<(u32, u32)> {
        self.failures.lock().expect("lock").clone()
    }

    pub(crate) fn completed_total(&self) -> Option<usize> {
        *self.completed.lock().expect("lock")
    }

    pub(crate) fn alert_counts(&self) -> Option<AlertCounts> {
        *self.alerts.lock().expect("lock")
    }

    pub(crate) fn submission_errors(&self) -> Vec<(Option<u16>, Option<String>)> {
        self.submission_errors.lock().expect("lock").clone()
    }
}

impl PipelineObserver for RecordingObserver {
    fn retry_scheduled(
        &self,
        _page: u32,
        _error: &ApiError,
        delay: Duration,
        _attempt: u32,
        _max_retries: u32,
    ) {
        self.retry_delays.lock().expect("lock").push(delay);
    }

    fn page_failed(&self, page: u32, retries: u32, _error: &ApiError) {
        self.failures.lock().expect("lock").push((page, retries));
    }

    fn fetch_completed(&self, total: usize) {
        *self.completed.lock().expect("lock") = Some(total);
    }

    fn alerts_built(&self, counts: &AlertCounts) {
        *self.alerts.lock().expect("lock") = Some(*counts);
    }

    fn submission_failed(&self, error: &ApiError) {
        self.submission_errors
            .lock()
            .expect("lock")
            .push((error.status(), error.body().map(str::to_string)));
    }
}
