use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DoctransError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Translation error: {0}")]
    Translate(#[from] TranslateError),

    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{name}' is not set")]
    MissingVar { name: String },

    #[error("Invalid value for '{name}': {reason}")]
    InvalidVar { name: String, reason: String },

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Container already exists: {0}")]
    ContainerAlreadyExists(String),

    #[error("Failed to create container '{name}': {message}")]
    CreateContainer { name: String, message: String },

    #[error("Failed to upload '{object}' to container '{container}': {message}")]
    Upload {
        container: String,
        object: String,
        message: String,
    },

    #[error("Failed to download '{object}' from container '{container}': {message}")]
    Download {
        container: String,
        object: String,
        message: String,
    },

    #[error("Failed to list container '{container}': {message}")]
    List { container: String, message: String },

    #[error("Failed to delete '{object}' from container '{container}': {message}")]
    Delete {
        container: String,
        object: String,
        message: String,
    },

    #[error("Failed to sign access for container '{container}': {message}")]
    Signing { container: String, message: String },

    #[error("Object URL '{0}' has no container/object path")]
    InvalidObjectUrl(String),

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Translation submission failed: {0}")]
    Submission(String),

    #[error("Translation poll failed: {0}")]
    Poll(String),

    #[error("Translation service error {code}: {message}")]
    Service { code: String, message: String },
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR submission failed: {0}")]
    Submission(String),

    #[error("OCR poll failed: {0}")]
    Poll(String),

    #[error("OCR analysis failed: {0}")]
    Analysis(String),

    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Translation failed: {0}")]
    Translate(#[from] TranslateError),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Source language '{language}' is already a target language")]
    SourceEqualsTarget { language: String },

    #[error("No documents were uploaded for translation")]
    NoDocuments,

    #[error("Document translation failed ({code}): {message}")]
    DocumentFailed { code: String, message: String },

    #[error("No translated document URL returned")]
    MissingTranslatedUrl,

    #[error("Remote job did not finish within {seconds}s")]
    PollTimeout { seconds: u64 },
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Files and target languages are required")]
    MissingInputs,

    #[error("Single translation requires exactly one file and one target language")]
    SingleArity,

    #[error("OCR translation requires exactly one file and one target language")]
    OcrArity,

    #[error("Source language '{language}' is already a target language")]
    SourceEqualsTarget { language: String },

    #[error("A job with id '{0}' already exists")]
    DuplicateJob(String),

    #[error("Failed to spawn workflow thread: {0}")]
    SpawnFailed(String),
}

pub type Result<T> = std::result::Result<T, DoctransError>;
