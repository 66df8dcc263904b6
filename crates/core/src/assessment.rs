//! Alert classification and assessment submission.
//!
//! [`AssessmentService`] is the pipeline: fetch every patient, score each one, build the three
//! alert lists and hand them to the submission channel. Classification itself is available on
//! its own through [`classify`] and [`classify_scores`].

use crate::constants::HIGH_RISK_THRESHOLD;
use crate::error::ApiResult;
use crate::fetcher::PatientFetcher;
use crate::observer::PipelineObserver;
use crate::patient::Patient;
use crate::scoring::{calculate_risk_score, RiskScore};
use crate::source::SubmissionChannel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The three alert lists, each sorted ascending by patient id.
///
/// Serialises to the submission wire format. A patient may appear in several lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertLists {
    pub high_risk_patients: Vec<String>,
    pub fever_patients: Vec<String>,
    pub data_quality_issues: Vec<String>,
}

impl AlertLists {
    pub fn counts(&self) -> AlertCounts {
        AlertCounts {
            high_risk: self.high_risk_patients.len(),
            fever: self.fever_patients.len(),
            data_quality: self.data_quality_issues.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.high_risk_patients.is_empty()
            && self.fever_patients.is_empty()
            && self.data_quality_issues.is_empty()
    }
}

/// List sizes, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub high_risk: usize,
    pub fever: usize,
    pub data_quality: usize,
}

/// Response of the submission endpoint, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentResponse(pub serde_json::Value);

impl AssessmentResponse {
    /// `results.score`, if the grader reported one.
    pub fn score(&self) -> Option<f64> {
        self.0
            .pointer("/results/score")
            .and_then(serde_json::Value::as_f64)
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// Score every patient and build the alert lists.
pub fn classify(patients: &[Patient]) -> AlertLists {
    let scores: Vec<RiskScore> = patients.iter().map(calculate_risk_score).collect();
    classify_scores(&scores)
}

/// Build the alert lists from precomputed scores.
pub fn classify_scores<'a>(scores: impl IntoIterator<Item = &'a RiskScore>) -> AlertLists {
    let mut lists = AlertLists::default();

    for score in scores {
        if score.total_score >= HIGH_RISK_THRESHOLD {
            lists.high_risk_patients.push(score.patient_id.clone());
        }
        if score.has_fever {
            lists.fever_patients.push(score.patient_id.clone());
        }
        if score.has_data_quality_issue {
            lists.data_quality_issues.push(score.patient_id.clone());
        }
    }

    lists.high_risk_patients.sort_unstable();
    lists.fever_patients.sort_unstable();
    lists.data_quality_issues.sort_unstable();
    lists
}

/// Fetch, classify and submit.
#[derive(Clone)]
pub struct AssessmentService {
    fetcher: PatientFetcher,
    channel: Arc<dyn SubmissionChannel>,
    observer: Arc<dyn PipelineObserver>,
}

impl AssessmentService {
    pub fn new(
        fetcher: PatientFetcher,
        channel: Arc<dyn SubmissionChannel>,
        observer: Arc<dyn PipelineObserver>,
    ) -> Self {
        Self {
            fetcher,
            channel,
            observer,
        }
    }

    pub fn fetcher(&self) -> &PatientFetcher {
        &self.fetcher
    }

    /// Fetch all patients and build the alert lists.
    ///
    /// An empty collection yields three empty lists.
    pub async fn process_patients(&self) -> ApiResult<AlertLists> {
        let patients = self.fetcher.fetch_all_patients().await?;
        let lists = classify(&patients);
        self.observer.alerts_built(&lists.counts());
        Ok(lists)
    }

    /// Submit the alert lists once.
    ///
    /// Failures are reported to the observer and returned; there is no retry.
    pub async fn submit(&self, submission: &AlertLists) -> ApiResult<AssessmentResponse> {
        self.observer.submission_started(&submission.counts());

        match self.channel.submit(submission).await {
            Ok(response) => {
                self.observer.submission_succeeded(&response);
                Ok(response)
            }
            Err(error) => {
                self.observer.submission_failed(&error);
                Err(error)
            }
        }
    }

    pub async fn process_and_submit(&self) -> ApiResult<AssessmentResponse> {
        let submission = self.process_patients().await?;
        self.submit(&submission).await
    }
}
