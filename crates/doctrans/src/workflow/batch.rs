//! Batch multi-language translation workflow.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::{info, info_span, warn};

use crate::error::{StorageError, WorkflowError};
use crate::naming::{redact_path, ContainerName};
use crate::registry::WorkflowOutput;
use crate::remote::{DocumentResult, DocumentStatus, TranslationSubmission};

use super::engine::{TranslationEngine, DETECTED_LANGUAGE_SENTINEL};
use super::progress::ProgressReporter;

impl TranslationEngine {
    /// Translates a set of documents into every requested language with one
    /// remote submission.
    ///
    /// Per-document failures are captured in the aggregated result rather
    /// than failing the job; a batch with some failed documents still
    /// completes with partial results.
    pub fn run_batch(
        &self,
        job_id: &str,
        input_files: &[PathBuf],
        target_languages: &[String],
        source_language: Option<&str>,
        progress: &dyn ProgressReporter,
    ) -> Result<WorkflowOutput, WorkflowError> {
        let _span = info_span!("workflow.batch",
            job_id = %job_id,
            files = input_files.len(),
            languages = target_languages.len(),
        )
        .entered();

        Self::check_languages(source_language, target_languages)?;

        progress.stage(10, "Initializing batch translator...");

        progress.stage(20, "Preparing batch files...");
        let staged = self.stage_batch_files(job_id, input_files)?;

        progress.stage(
            40,
            &format!("Translating to {} languages...", target_languages.len()),
        );
        let source_url = self.prepare_source(job_id, &staged)?;
        let targets = self.prepare_targets(job_id, target_languages)?;

        let submission = TranslationSubmission {
            source_url,
            targets,
            source_language: source_language.map(|s| s.to_string()),
        };
        let results = self.submit_and_wait(&submission)?;
        let (by_language, detected_source_languages) =
            group_outcomes(results, target_languages);

        progress.stage(80, "Downloading translated documents...");
        let output_folder = format!("batch_{}", job_id);
        let mut download_urls: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (language, outcomes) in &by_language {
            if outcomes.is_empty() {
                continue;
            }
            let container = ContainerName::derive(job_id, "target", Some(language));
            let local_dir = self
                .config()
                .output_root
                .join(&output_folder)
                .join(language);
            let files = self.gateway().download_all(&container, &local_dir)?;
            download_urls.insert(
                language.clone(),
                files
                    .iter()
                    .map(|file| format!("/download/{}/{}/{}", output_folder, language, file))
                    .collect(),
            );
        }

        info!(
            languages = download_urls.len(),
            documents = detected_source_languages.len(),
            "batch translation completed"
        );

        Ok(WorkflowOutput::Batch {
            output_folder,
            download_urls,
            detected_source_languages,
            target_languages: target_languages.to_vec(),
        })
    }

    /// Copies the batch inputs into a job-scoped working folder under the
    /// upload root, mirroring what the intake delivered. Missing files are
    /// skipped here and again at upload.
    fn stage_batch_files(
        &self,
        job_id: &str,
        input_files: &[PathBuf],
    ) -> Result<Vec<PathBuf>, StorageError> {
        let batch_dir = self.config().upload_root.join(format!("batch_{}", job_id));
        if !batch_dir.exists() {
            fs::create_dir_all(&batch_dir).map_err(|e| StorageError::CreateDirectory {
                path: batch_dir.clone(),
                source: e,
            })?;
        }

        let mut staged = Vec::with_capacity(input_files.len());
        for file in input_files {
            if !file.exists() {
                warn!(file = %redact_path(file), "skipping missing batch input");
                continue;
            }
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("document");
            let dest = batch_dir.join(name);
            fs::copy(file, &dest).map_err(|e| StorageError::WriteFile {
                path: dest.clone(),
                source: e,
            })?;
            staged.push(dest);
        }
        Ok(staged)
    }
}

/// Groups outcomes by target language and records the detected-language
/// sentinel for every source document that produced at least one success.
fn group_outcomes(
    results: Vec<DocumentResult>,
    target_languages: &[String],
) -> (
    BTreeMap<String, Vec<DocumentResult>>,
    BTreeMap<String, String>,
) {
    let mut by_language: BTreeMap<String, Vec<DocumentResult>> = target_languages
        .iter()
        .map(|language| (language.clone(), Vec::new()))
        .collect();
    let mut detected: BTreeMap<String, String> = BTreeMap::new();
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for document in results {
        let source_file = document.source_file_name();
        match document.status {
            DocumentStatus::Succeeded => {
                succeeded += 1;
                detected
                    .entry(source_file)
                    .or_insert_with(|| DETECTED_LANGUAGE_SENTINEL.to_string());
                match document.translated_to.clone() {
                    Some(language) => by_language.entry(language).or_default().push(document),
                    None => {
                        warn!(source = %document.source_file_name(),
                            "succeeded outcome carries no target language")
                    }
                }
            }
            DocumentStatus::Failed => {
                failed += 1;
                let (code, message) = document
                    .error
                    .as_ref()
                    .map(|e| (e.code.as_str(), e.message.as_str()))
                    .unwrap_or(("Unknown", "Unknown error"));
                warn!(source = %source_file, code = %code, message = %message,
                    "document translation failed");
            }
        }
    }

    info!(succeeded, failed, "collected batch outcomes");
    (by_language, detected)
}
