//! Shared remote-submission protocol used by all workflow variants.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::WorkflowError;
use crate::naming::ContainerName;
use crate::remote::{
    AccessScope, DocumentResult, DocumentTranslator, ObjectStore, OcrAnalysis, OcrAnalyzer,
    OcrPoller, TranslationSubmission, TranslationTarget,
};
use crate::transfer::TransferGateway;

/// The remote service does not report which source language it detected;
/// results carry this sentinel instead of a fabricated guess.
pub const DETECTED_LANGUAGE_SENTINEL: &str = "auto-detected";

/// Runs the translation workflow variants against the remote collaborators.
pub struct TranslationEngine {
    gateway: TransferGateway,
    translator: Arc<dyn DocumentTranslator>,
    ocr: Arc<dyn OcrAnalyzer>,
    config: EngineConfig,
}

impl TranslationEngine {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        translator: Arc<dyn DocumentTranslator>,
        ocr: Arc<dyn OcrAnalyzer>,
        config: EngineConfig,
    ) -> Self {
        let gateway = TransferGateway::new(store, config.access, config.signed_url_ttl);
        Self {
            gateway,
            translator,
            ocr,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn gateway(&self) -> &TransferGateway {
        &self.gateway
    }

    pub(crate) fn ocr_analyzer(&self) -> &Arc<dyn OcrAnalyzer> {
        &self.ocr
    }

    /// A pinned source language that is also a requested target is rejected
    /// before anything is submitted.
    pub(crate) fn check_languages(
        source_language: Option<&str>,
        target_languages: &[String],
    ) -> Result<(), WorkflowError> {
        if let Some(source) = source_language {
            if target_languages
                .iter()
                .any(|target| target.eq_ignore_ascii_case(source))
            {
                return Err(WorkflowError::SourceEqualsTarget {
                    language: source.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Uploads the given files into the job's source container and returns
    /// its access URL.
    pub(crate) fn prepare_source(
        &self,
        job_id: &str,
        files: &[PathBuf],
    ) -> Result<String, WorkflowError> {
        let container = ContainerName::derive(job_id, "source", None);
        self.gateway.ensure_container(&container)?;
        self.gateway.purge(&container)?;

        let uploaded = self.gateway.upload_all(files, &container)?;
        if uploaded.is_empty() {
            return Err(WorkflowError::NoDocuments);
        }
        info!(container = %container, count = uploaded.len(), "uploaded source documents");

        let url = self.gateway.access_url(&container, AccessScope::source())?;
        Ok(url)
    }

    /// Builds one purged, access-configured target per requested language.
    pub(crate) fn prepare_targets(
        &self,
        job_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranslationTarget>, WorkflowError> {
        let mut targets = Vec::with_capacity(languages.len());
        for language in languages {
            let container = ContainerName::derive(job_id, "target", Some(language));
            self.gateway.ensure_container(&container)?;
            self.gateway.purge(&container)?;
            let target_url = self.gateway.access_url(&container, AccessScope::target())?;
            targets.push(TranslationTarget {
                language: language.clone(),
                target_url,
            });
        }
        Ok(targets)
    }

    /// Submits a translation request and blocks until the remote job
    /// finishes, polling at the configured interval.
    ///
    /// With no configured deadline this waits as long as the remote side
    /// takes.
    pub(crate) fn submit_and_wait(
        &self,
        submission: &TranslationSubmission,
    ) -> Result<Vec<DocumentResult>, WorkflowError> {
        let mut poller = self.translator.begin_translation(submission)?;
        info!(
            targets = submission.targets.len(),
            source_language = submission.source_language.as_deref().unwrap_or("auto"),
            "translation job submitted, waiting for completion"
        );

        let started = Instant::now();
        while !poller.is_done()? {
            self.check_deadline(started)?;
            debug!("remote translation still processing");
            thread::sleep(self.config.poll_interval);
        }

        Ok(poller.take_results()?)
    }

    /// Blocks until an OCR analysis finishes, polling at the same interval.
    pub(crate) fn wait_for_ocr(
        &self,
        mut poller: Box<dyn OcrPoller>,
    ) -> Result<OcrAnalysis, WorkflowError> {
        let started = Instant::now();
        while !poller.is_done()? {
            self.check_deadline(started)?;
            debug!("remote OCR analysis still processing");
            thread::sleep(self.config.poll_interval);
        }
        Ok(poller.take_result()?)
    }

    fn check_deadline(&self, started: Instant) -> Result<(), WorkflowError> {
        if let Some(deadline) = self.config.poll_deadline {
            if started.elapsed() >= deadline {
                return Err(WorkflowError::PollTimeout {
                    seconds: deadline.as_secs(),
                });
            }
        }
        Ok(())
    }
}
