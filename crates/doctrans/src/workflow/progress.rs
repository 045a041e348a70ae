use std::sync::Arc;

use crate::registry::{JobRegistry, JobUpdate};

/// Receives stage transitions while a workflow runs.
pub trait ProgressReporter: Send + Sync {
    fn stage(&self, progress: u8, message: &str);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn stage(&self, _progress: u8, _message: &str) {}
}

/// Bridges workflow stage reports into registry updates for one job.
pub struct RegistryProgress {
    registry: Arc<JobRegistry>,
    job_id: String,
}

impl RegistryProgress {
    pub fn new(registry: Arc<JobRegistry>, job_id: &str) -> Self {
        Self {
            registry,
            job_id: job_id.to_string(),
        }
    }
}

impl ProgressReporter for RegistryProgress {
    fn stage(&self, progress: u8, message: &str) {
        self.registry
            .update(&self.job_id, JobUpdate::stage(progress, message));
    }
}
