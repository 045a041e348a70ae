//! Job status records exposed to polling clients.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow variant of a job; fixed at creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Single,
    Batch,
    Ocr,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobType::Single => write!(f, "single"),
            JobType::Batch => write!(f, "batch"),
            JobType::Ocr => write!(f, "ocr"),
        }
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Running => write!(f, "running"),
            JobState::Completed => write!(f, "completed"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// Download locations of the three OCR pipeline artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OcrArtifacts {
    pub ocr_text: String,
    pub searchable_document: String,
    pub translated_document: String,
}

/// Workflow-specific result payload, set once a job completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WorkflowOutput {
    Single {
        output_file: String,
        download_url: String,
        detected_source_language: String,
        target_language: String,
    },
    Batch {
        output_folder: String,
        download_urls: BTreeMap<String, Vec<String>>,
        detected_source_languages: BTreeMap<String, String>,
        target_languages: Vec<String>,
    },
    Ocr {
        output_folder: String,
        download_urls: OcrArtifacts,
        detected_source_language: String,
        target_language: String,
    },
}

/// Snapshot of one workflow execution.
///
/// Records are mutated only through [`JobRegistry::update`]; everything a
/// reader sees is a clone taken under the registry lock.
///
/// [`JobRegistry::update`]: super::store::JobRegistry::update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub job_type: JobType,
    pub status: JobState,
    /// 0-100, non-decreasing within a run.
    pub progress: u8,
    /// Current-stage description, overwritten on each stage transition.
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<WorkflowOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn new(job_id: &str, job_type: JobType) -> Self {
        Self {
            job_id: job_id.to_string(),
            job_type,
            status: JobState::Pending,
            progress: 0,
            message: "Job queued".to_string(),
            result: None,
            error: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Applies a partial update in place.
    ///
    /// `completed_at` is stamped exactly once, on the first transition into a
    /// terminal state. Progress never regresses; an update carrying a lower
    /// value keeps the current one.
    pub(crate) fn apply(&mut self, update: JobUpdate) {
        if let Some(status) = update.status {
            self.status = status;
            if status.is_terminal() && self.completed_at.is_none() {
                self.completed_at = Some(Utc::now());
            }
        }
        if let Some(progress) = update.progress {
            if progress > self.progress {
                self.progress = progress;
            }
        }
        if let Some(message) = update.message {
            self.message = message;
        }
        if let Some(result) = update.result {
            self.result = Some(result);
        }
        if let Some(error) = update.error {
            self.error = Some(error);
        }
    }
}

/// Partial update applied atomically by the registry; only supplied fields
/// change.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobState>,
    pub progress: Option<u8>,
    pub message: Option<String>,
    pub result: Option<WorkflowOutput>,
    pub error: Option<String>,
}

impl JobUpdate {
    /// A running-stage update with new progress and message.
    pub fn stage(progress: u8, message: &str) -> Self {
        Self {
            status: Some(JobState::Running),
            progress: Some(progress),
            message: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// A completion update carrying the workflow result.
    pub fn completed(message: &str, result: WorkflowOutput) -> Self {
        Self {
            status: Some(JobState::Completed),
            progress: Some(100),
            message: Some(message.to_string()),
            result: Some(result),
            ..Self::default()
        }
    }

    /// A failure update carrying the error detail.
    pub fn failed(error: &str) -> Self {
        Self {
            status: Some(JobState::Failed),
            message: Some(format!("Error: {}", error)),
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}
