//! Job status tracking and event streaming.

pub mod broadcaster;
pub mod record;
pub mod store;

pub use broadcaster::JobEventBroadcaster;
pub use record::{JobRecord, JobState, JobType, JobUpdate, OcrArtifacts, WorkflowOutput};
pub use store::{JobRegistry, RetentionPolicy};
