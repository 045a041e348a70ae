use crate::error::TranslateError;

/// One requested output language and the container URL the service writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTarget {
    pub language: String,
    pub target_url: String,
}

/// A single translation request covering every document in the source
/// container.
#[derive(Debug, Clone)]
pub struct TranslationSubmission {
    /// Access-configured URL of the source container.
    pub source_url: String,
    /// One entry per requested output language.
    pub targets: Vec<TranslationTarget>,
    /// Pinned source language; `None` lets the service auto-detect.
    pub source_language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Succeeded,
    Failed,
}

/// Error detail reported by the service for a failed document.
#[derive(Debug, Clone)]
pub struct RemoteError {
    pub code: String,
    pub message: String,
}

/// Per-document outcome of a finished translation job.
#[derive(Debug, Clone)]
pub struct DocumentResult {
    pub status: DocumentStatus,
    pub source_url: String,
    pub translated_url: Option<String>,
    pub translated_to: Option<String>,
    pub error: Option<RemoteError>,
}

impl DocumentResult {
    /// Base name of the source document, with any token query stripped.
    pub fn source_file_name(&self) -> String {
        let without_query = self.source_url.split('?').next().unwrap_or("");
        without_query
            .rsplit('/')
            .next()
            .unwrap_or(without_query)
            .to_string()
    }
}

/// Handle for an in-flight remote translation job.
pub trait TranslationPoller: Send {
    /// Returns true once the remote side reports completion.
    fn is_done(&mut self) -> Result<bool, TranslateError>;

    /// Consumes the handle and yields the per-document outcomes. Only valid
    /// after `is_done` returned true.
    fn take_results(self: Box<Self>) -> Result<Vec<DocumentResult>, TranslateError>;
}

/// Remote document-translation service.
pub trait DocumentTranslator: Send + Sync {
    fn begin_translation(
        &self,
        submission: &TranslationSubmission,
    ) -> Result<Box<dyn TranslationPoller>, TranslateError>;
}
