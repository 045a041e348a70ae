//! OCR-then-translate workflow.

use std::fs;
use std::path::Path;

use tracing::{info, info_span};

use crate::error::{OcrError, StorageError, WorkflowError};
use crate::naming::redact_path;
use crate::registry::{OcrArtifacts, WorkflowOutput};
use crate::remote::{OcrAnalysis, TranslationSubmission, READ_MODEL_ID};

use super::engine::{TranslationEngine, DETECTED_LANGUAGE_SENTINEL};
use super::progress::ProgressReporter;
use super::single::take_translated_url;

impl TranslationEngine {
    /// Extracts text with the remote OCR analyzer, then translates a
    /// searchable copy of the document into one target language.
    ///
    /// The searchable copy is a byte-identical copy of the original; no text
    /// layer is embedded into the binary. The transcript lives alongside it
    /// as a plain-text artifact.
    pub fn run_ocr(
        &self,
        job_id: &str,
        input_file: &Path,
        target_language: &str,
        source_language: Option<&str>,
        progress: &dyn ProgressReporter,
    ) -> Result<WorkflowOutput, WorkflowError> {
        let _span = info_span!("workflow.ocr",
            job_id = %job_id,
            file = %redact_path(input_file),
            target = %target_language,
        )
        .entered();

        let targets = vec![target_language.to_string()];
        Self::check_languages(source_language, &targets)?;

        progress.stage(10, "Initializing OCR pipeline...");
        let output_folder = format!("ocr_{}", job_id);
        let output_dir = self.config().output_root.join(&output_folder);
        if !output_dir.exists() {
            fs::create_dir_all(&output_dir).map_err(|e| StorageError::CreateDirectory {
                path: output_dir.clone(),
                source: e,
            })?;
        }

        progress.stage(20, "Running OCR analysis...");
        let document = fs::read(input_file).map_err(|e| OcrError::ReadDocument {
            path: input_file.to_path_buf(),
            source: e,
        })?;
        let poller = self.ocr_analyzer().begin_analyze(&document, READ_MODEL_ID)?;
        let analysis = self.wait_for_ocr(poller)?;
        info!(
            pages = analysis.pages.len(),
            paragraphs = analysis.paragraphs.len(),
            "OCR analysis finished"
        );

        progress.stage(40, "Extracting recognized text...");
        let stem = input_file
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("document");
        let extension = input_file.extension().and_then(|e| e.to_str());

        let transcript_name = format!("{}_searchable_ocr_text.txt", stem);
        let transcript_path = output_dir.join(&transcript_name);
        fs::write(&transcript_path, render_transcript(&analysis)).map_err(|e| {
            StorageError::WriteFile {
                path: transcript_path.clone(),
                source: e,
            }
        })?;

        let searchable_name = with_extension(&format!("{}_searchable", stem), extension);
        let searchable_path = output_dir.join(&searchable_name);
        fs::copy(input_file, &searchable_path).map_err(|e| StorageError::WriteFile {
            path: searchable_path.clone(),
            source: e,
        })?;

        progress.stage(60, "Translating searchable document...");
        let source_url = self.prepare_source(job_id, &[searchable_path.clone()])?;
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
        let translated_name = with_extension(
            &format!("{}_translated_{}", stem, target_language),
            extension,
        );
        self.gateway()
            .download_url(&translated_url, &output_dir.join(&translated_name))?;

        info!(
            detected_source = DETECTED_LANGUAGE_SENTINEL,
            target = %target_language,
            "OCR pipeline completed"
        );

        Ok(WorkflowOutput::Ocr {
            download_urls: OcrArtifacts {
                ocr_text: format!("/download/{}/{}", output_folder, transcript_name),
                searchable_document: format!("/download/{}/{}", output_folder, searchable_name),
                translated_document: format!("/download/{}/{}", output_folder, translated_name),
            },
            output_folder,
            detected_source_language: DETECTED_LANGUAGE_SENTINEL.to_string(),
            target_language: target_language.to_string(),
        })
    }
}

/// Plain-text transcript: paragraph content grouped under per-page headers.
fn render_transcript(analysis: &OcrAnalysis) -> String {
    let mut transcript = String::new();
    for page in &analysis.pages {
        transcript.push_str(&format!("=== Page {} ===\n", page.page_number));
        transcript.push_str(&analysis.page_text(page.page_number));
    }
    transcript
}

fn with_extension(base: &str, extension: Option<&str>) -> String {
    match extension {
        Some(extension) => format!("{}.{}", base, extension),
        None => base.to_string(),
    }
}
