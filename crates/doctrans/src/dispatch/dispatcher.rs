//! Non-blocking job dispatch.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use chrono::Utc;
use tracing::{error, info};

use crate::error::{DispatchError, WorkflowError};
use crate::registry::{JobRecord, JobRegistry, JobType, JobUpdate, WorkflowOutput};
use crate::workflow::{RegistryProgress, TranslationEngine};

use super::request::WorkflowRequest;

/// Outcome of a dispatch call: the external handle plus the initial record
/// snapshot.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub job_id: String,
    pub record: JobRecord,
}

/// Accepts workflow requests, allocates job records, and runs each workflow
/// on its own thread so the request path returns immediately.
pub struct JobDispatcher {
    registry: Arc<JobRegistry>,
    engine: Arc<TranslationEngine>,
}

impl JobDispatcher {
    pub fn new(registry: Arc<JobRegistry>, engine: Arc<TranslationEngine>) -> Self {
        Self { registry, engine }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Validates the request, creates the record, and starts the workflow in
    /// the background. Validation failures never create a record.
    pub fn dispatch(&self, request: WorkflowRequest) -> Result<Dispatched, DispatchError> {
        request.validate()?;

        let (job_id, record) = self.allocate_job(request.job_type)?;
        info!(
            job = %job_id,
            job_type = %request.job_type,
            files = request.files.len(),
            languages = ?request.target_languages,
            "dispatching job"
        );
        for file in &request.files {
            info!(
                job = %job_id,
                file = %file.filename,
                size = file.size,
                mime = file.mime_type().as_deref().unwrap_or("unknown"),
                "queued input file"
            );
        }

        let registry = Arc::clone(&self.registry);
        let engine = Arc::clone(&self.engine);
        let thread_job_id = job_id.clone();
        thread::Builder::new()
            .name(format!("doctrans-job-{}", job_id))
            .spawn(move || run_job(registry, engine, thread_job_id, request))
            .map_err(|e| DispatchError::SpawnFailed(e.to_string()))?;

        Ok(Dispatched { job_id, record })
    }

    /// Allocates `{job_type}_{timestamp}`. Dispatches within the same second
    /// collide on the timestamp; number them like conflicting output files.
    fn allocate_job(&self, job_type: JobType) -> Result<(String, JobRecord), DispatchError> {
        let base = format!("{}_{}", job_type, Utc::now().format("%Y%m%d_%H%M%S"));
        if let Some(record) = self.registry.create(&base, job_type) {
            return Ok((base, record));
        }

        for counter in 2..=1000 {
            let candidate = format!("{}_{}", base, counter);
            if let Some(record) = self.registry.create(&candidate, job_type) {
                return Ok((candidate, record));
            }
        }

        Err(DispatchError::DuplicateJob(base))
    }
}

/// Thread body: runs the workflow and converts its outcome into the
/// record's terminal state. Errors and panics both land in `failed`; nothing
/// escapes the thread and nothing is dropped.
fn run_job(
    registry: Arc<JobRegistry>,
    engine: Arc<TranslationEngine>,
    job_id: String,
    request: WorkflowRequest,
) {
    let progress = RegistryProgress::new(Arc::clone(&registry), &job_id);
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        execute(&engine, &job_id, &request, &progress)
    }));

    match outcome {
        Ok(Ok(output)) => {
            let message = completion_message(&request);
            registry.update(&job_id, JobUpdate::completed(&message, output));
            info!(job = %job_id, "job completed");
        }
        Ok(Err(e)) => {
            error!(job = %job_id, error = %e, "job failed");
            registry.update(&job_id, JobUpdate::failed(&e.to_string()));
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(job = %job_id, error = %message, "job panicked");
            registry.update(&job_id, JobUpdate::failed(&message));
        }
    }
}

fn execute(
    engine: &TranslationEngine,
    job_id: &str,
    request: &WorkflowRequest,
    progress: &RegistryProgress,
) -> Result<WorkflowOutput, WorkflowError> {
    let source_language = request.source_language.as_deref();
    match request.job_type {
        JobType::Single => engine.run_single(
            job_id,
            request.files[0].path(),
            &request.target_languages[0],
            source_language,
            progress,
        ),
        JobType::Batch => {
            let paths: Vec<PathBuf> = request
                .files
                .iter()
                .map(|file| file.local_path.clone())
                .collect();
            engine.run_batch(
                job_id,
                &paths,
                &request.target_languages,
                source_language,
                progress,
            )
        }
        JobType::Ocr => engine.run_ocr(
            job_id,
            request.files[0].path(),
            &request.target_languages[0],
            source_language,
            progress,
        ),
    }
}

fn completion_message(request: &WorkflowRequest) -> String {
    match request.job_type {
        JobType::Single => "Translation completed successfully".to_string(),
        JobType::Batch => format!(
            "Batch translation completed for {} languages",
            request.target_languages.len()
        ),
        JobType::Ocr => "OCR and translation completed successfully".to_string(),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "workflow panicked".to_string()
    }
}
