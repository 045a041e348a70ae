//! Single-document translation workflow.

use std::path::Path;

use tracing::{info, info_span};

use crate::error::WorkflowError;
use crate::naming::redact_path;
use crate::registry::WorkflowOutput;
use crate::remote::{DocumentResult, DocumentStatus, RemoteError, TranslationSubmission};

use super::engine::{TranslationEngine, DETECTED_LANGUAGE_SENTINEL};
use super::progress::ProgressReporter;

impl TranslationEngine {
    /// Translates one document into one target language.
    ///
    /// The single outcome the remote job produces decides the job: a failed
    /// document fails the workflow with the remote error detail.
    pub fn run_single(
        &self,
        job_id: &str,
        input_file: &Path,
        target_language: &str,
        source_language: Option<&str>,
        progress: &dyn ProgressReporter,
    ) -> Result<WorkflowOutput, WorkflowError> {
        let _span = info_span!("workflow.single",
            job_id = %job_id,
            file = %redact_path(input_file),
            target = %target_language,
        )
        .entered();

        let targets = vec![target_language.to_string()];
        Self::check_languages(source_language, &targets)?;

        progress.stage(10, "Initializing translator...");
        progress.stage(30, "Uploading source document...");
        let source_url = self.prepare_source(job_id, &[input_file.to_path_buf()])?;
        let translation_targets = self.prepare_targets(job_id, &targets)?;

        let submission = TranslationSubmission {
            source_url,
            targets: translation_targets,
            source_language: source_language.map(|s| s.to_string()),
        };
        let results = self.submit_and_wait(&submission)?;
        let outcome = results
            .into_iter()
            .next()
            .ok_or(WorkflowError::MissingTranslatedUrl)?;
        let translated_url = take_translated_url(outcome)?;

        progress.stage(80, "Downloading translated document...");
        let base_name = input_file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document");
        let output_file = format!("translated_{}_{}", target_language, base_name);
        let dest = self.config().output_root.join(job_id).join(&output_file);
        self.gateway().download_url(&translated_url, &dest)?;

        info!(
            detected_source = DETECTED_LANGUAGE_SENTINEL,
            target = %target_language,
            output = %output_file,
            "translation completed"
        );

        Ok(WorkflowOutput::Single {
            download_url: format!("/download/{}/{}", job_id, output_file),
            output_file,
            detected_source_language: DETECTED_LANGUAGE_SENTINEL.to_string(),
            target_language: target_language.to_string(),
        })
    }
}

/// Unwraps a succeeded outcome into its translated-document URL.
pub(crate) fn take_translated_url(outcome: DocumentResult) -> Result<String, WorkflowError> {
    match outcome.status {
        DocumentStatus::Failed => {
            let RemoteError { code, message } = outcome.error.unwrap_or_else(|| RemoteError {
                code: "Unknown".to_string(),
                message: "Unknown error".to_string(),
            });
            Err(WorkflowError::DocumentFailed { code, message })
        }
        DocumentStatus::Succeeded => outcome
            .translated_url
            .ok_or(WorkflowError::MissingTranslatedUrl),
    }
}
