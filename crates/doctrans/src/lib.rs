pub mod config;
pub mod dispatch;
pub mod error;
pub mod naming;
pub mod registry;
pub mod remote;
pub mod telemetry;
pub mod transfer;
pub mod workflow;

pub use config::{EngineConfig, DEFAULT_POLL_INTERVAL, DEFAULT_SIGNED_URL_TTL};
pub use dispatch::{Dispatched, JobDispatcher, UploadedFile, WorkflowRequest};
pub use error::{
    ConfigError, DispatchError, DoctransError, OcrError, Result, StorageError, TranslateError,
    WorkflowError,
};
pub use naming::ContainerName;
pub use registry::{
    JobEventBroadcaster, JobRecord, JobRegistry, JobState, JobType, JobUpdate, OcrArtifacts,
    RetentionPolicy, WorkflowOutput,
};
pub use remote::{
    AccessMode, AccessScope, DocumentTranslator, ObjectStore, OcrAnalyzer, TranslationTarget,
};
pub use transfer::TransferGateway;
pub use workflow::{
    NoopProgress, ProgressReporter, TranslationEngine, DETECTED_LANGUAGE_SENTINEL,
};
