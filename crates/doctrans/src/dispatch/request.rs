use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::registry::JobType;

/// One file as delivered by the upload intake.
///
/// `local_path` is the only field the core requires; `filename` and `size`
/// are carried for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub local_path: PathBuf,
    #[serde(default)]
    pub size: u64,
}

impl UploadedFile {
    /// Builds an entry from a path on disk, reading the size when available.
    pub fn from_path(local_path: impl Into<PathBuf>) -> Self {
        let local_path = local_path.into();
        let filename = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        let size = std::fs::metadata(&local_path).map(|m| m.len()).unwrap_or(0);
        Self {
            filename,
            local_path,
            size,
        }
    }

    /// MIME type guessed from the file extension.
    pub fn mime_type(&self) -> Option<String> {
        mime_guess::from_path(&self.local_path)
            .first()
            .map(|m| m.to_string())
    }

    pub fn path(&self) -> &Path {
        &self.local_path
    }
}

/// Inputs for one workflow execution.
#[derive(Debug, Clone)]
pub struct WorkflowRequest {
    pub job_type: JobType,
    pub files: Vec<UploadedFile>,
    pub target_languages: Vec<String>,
    /// Pinned source language; `None` lets the service auto-detect.
    pub source_language: Option<String>,
}

impl WorkflowRequest {
    pub fn single(file: UploadedFile, target_language: &str) -> Self {
        Self {
            job_type: JobType::Single,
            files: vec![file],
            target_languages: vec![target_language.to_string()],
            source_language: None,
        }
    }

    pub fn batch(files: Vec<UploadedFile>, target_languages: Vec<String>) -> Self {
        Self {
            job_type: JobType::Batch,
            files,
            target_languages,
            source_language: None,
        }
    }

    pub fn ocr(file: UploadedFile, target_language: &str) -> Self {
        Self {
            job_type: JobType::Ocr,
            files: vec![file],
            target_languages: vec![target_language.to_string()],
            source_language: None,
        }
    }

    pub fn with_source_language(mut self, language: &str) -> Self {
        self.source_language = Some(language.to_string());
        self
    }

    /// Variant-specific arity and language checks, rejected before any job
    /// record exists.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.files.is_empty() || self.target_languages.is_empty() {
            return Err(DispatchError::MissingInputs);
        }

        match self.job_type {
            JobType::Single => {
                if self.files.len() != 1 || self.target_languages.len() != 1 {
                    return Err(DispatchError::SingleArity);
                }
            }
            JobType::Ocr => {
                if self.files.len() != 1 || self.target_languages.len() != 1 {
                    return Err(DispatchError::OcrArity);
                }
            }
            JobType::Batch => {}
        }

        if let Some(source) = &self.source_language {
            if self
                .target_languages
                .iter()
                .any(|target| target.eq_ignore_ascii_case(source))
            {
                return Err(DispatchError::SourceEqualsTarget {
                    language: source.clone(),
                });
            }
        }

        Ok(())
    }
}
