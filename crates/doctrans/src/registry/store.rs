//! In-process job registry.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::broadcaster::JobEventBroadcaster;
use super::record::{JobRecord, JobState, JobType, JobUpdate};

/// What happens to terminal records over the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Records accumulate for the process lifetime (the default contract;
    /// callers polling old jobs always find them).
    KeepAll,
    /// Keep at most this many terminal records, evicting the oldest ones.
    /// Pending/running jobs are never evicted.
    MaxCompleted(usize),
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::KeepAll
    }
}

/// Process-wide map from job id to mutable status record.
///
/// Constructed and owned explicitly by the caller (tests build a fresh
/// instance per case). Each record is written only by its own workflow
/// thread; readers take snapshots. Updates are applied atomically under one
/// write-lock acquisition so a reader never observes a half-applied update.
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, JobRecord>>,
    retention: RetentionPolicy,
    events: Option<JobEventBroadcaster>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::with_retention(RetentionPolicy::KeepAll)
    }

    pub fn with_retention(retention: RetentionPolicy) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            retention,
            events: None,
        }
    }

    /// Attaches a broadcaster that receives a snapshot after every mutation.
    pub fn with_broadcaster(mut self, events: JobEventBroadcaster) -> Self {
        self.events = Some(events);
        self
    }

    fn read_jobs(&self) -> RwLockReadGuard<'_, HashMap<String, JobRecord>> {
        match self.jobs.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job registry lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_jobs(&self) -> RwLockWriteGuard<'_, HashMap<String, JobRecord>> {
        match self.jobs.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job registry lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Creates a pending record. Returns `None` when the id is already taken.
    pub fn create(&self, job_id: &str, job_type: JobType) -> Option<JobRecord> {
        let record = {
            let mut jobs = self.write_jobs();
            if jobs.contains_key(job_id) {
                return None;
            }
            let record = JobRecord::new(job_id, job_type);
            jobs.insert(job_id.to_string(), record.clone());
            record
        };
        self.emit(&record);
        Some(record)
    }

    /// Applies a partial update and returns the post-update snapshot.
    ///
    /// Returns `None` for an unknown job id.
    pub fn update(&self, job_id: &str, update: JobUpdate) -> Option<JobRecord> {
        let snapshot = {
            let mut jobs = self.write_jobs();
            let record = jobs.get_mut(job_id)?;
            record.apply(update);
            let snapshot = record.clone();
            if snapshot.is_finished() {
                Self::enforce_retention(&mut jobs, self.retention);
            }
            snapshot
        };
        self.emit(&snapshot);
        Some(snapshot)
    }

    fn enforce_retention(jobs: &mut HashMap<String, JobRecord>, retention: RetentionPolicy) {
        let RetentionPolicy::MaxCompleted(cap) = retention else {
            return;
        };

        let mut finished: Vec<(String, chrono::DateTime<chrono::Utc>)> = jobs
            .values()
            .filter(|record| record.is_finished())
            .map(|record| {
                let finished_at = record.completed_at.unwrap_or(record.started_at);
                (record.job_id.clone(), finished_at)
            })
            .collect();

        if finished.len() <= cap {
            return;
        }

        finished.sort_by_key(|(_, finished_at)| *finished_at);
        let excess = finished.len() - cap;
        for (job_id, _) in finished.into_iter().take(excess) {
            log::debug!("Evicting finished job {} per retention policy", job_id);
            jobs.remove(&job_id);
        }
    }

    /// Returns a snapshot of one record.
    pub fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.read_jobs().get(job_id).cloned()
    }

    /// Returns all records sorted by started_at (newest first).
    pub fn list_all(&self) -> Vec<JobRecord> {
        let jobs = self.read_jobs();
        let mut result: Vec<JobRecord> = jobs.values().cloned().collect();
        result.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        result
    }

    /// Counts of (pending, running, completed, failed) jobs.
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        let jobs = self.read_jobs();
        let mut pending = 0;
        let mut running = 0;
        let mut completed = 0;
        let mut failed = 0;

        for record in jobs.values() {
            match record.status {
                JobState::Pending => pending += 1,
                JobState::Running => running += 1,
                JobState::Completed => completed += 1,
                JobState::Failed => failed += 1,
            }
        }

        (pending, running, completed, failed)
    }

    fn emit(&self, record: &JobRecord) {
        if let Some(events) = &self.events {
            events.send(record.clone());
        }
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::record::WorkflowOutput;

    fn single_output() -> WorkflowOutput {
        WorkflowOutput::Single {
            output_file: "translated_es_doc.pdf".to_string(),
            download_url: "/download/job/translated_es_doc.pdf".to_string(),
            detected_source_language: "auto-detected".to_string(),
            target_language: "es".to_string(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let registry = JobRegistry::new();
        let record = registry.create("single_1", JobType::Single).unwrap();
        assert_eq!(record.status, JobState::Pending);

        let fetched = registry.get("single_1").unwrap();
        assert_eq!(fetched.job_id, "single_1");
    }

    #[test]
    fn test_create_duplicate_returns_none() {
        let registry = JobRegistry::new();
        assert!(registry.create("job", JobType::Single).is_some());
        assert!(registry.create("job", JobType::Single).is_none());
    }

    #[test]
    fn test_get_unknown_job() {
        let registry = JobRegistry::new();
        assert!(registry.get("missing").is_none());
        assert!(registry.update("missing", JobUpdate::stage(10, "x")).is_none());
    }

    #[test]
    fn test_update_is_idempotent_for_same_progress() {
        let registry = JobRegistry::new();
        registry.create("job", JobType::Single);

        let first = registry
            .update("job", JobUpdate::stage(50, "Halfway"))
            .unwrap();
        let second = registry
            .update("job", JobUpdate::stage(50, "Halfway"))
            .unwrap();

        assert_eq!(first.status, second.status);
        assert_eq!(first.progress, second.progress);
        assert_eq!(first.message, second.message);
        assert_eq!(first.completed_at, second.completed_at);
    }

    #[test]
    fn test_progress_monotonic_across_updates() {
        let registry = JobRegistry::new();
        registry.create("job", JobType::Batch);

        let observed: Vec<u8> = [10u8, 40, 20, 80, 80, 100]
            .iter()
            .map(|p| {
                registry
                    .update("job", JobUpdate::stage(*p, "stage"))
                    .unwrap()
                    .progress
            })
            .collect();

        let mut sorted = observed.clone();
        sorted.sort_unstable();
        assert_eq!(observed, sorted, "progress regressed: {:?}", observed);
    }

    #[test]
    fn test_only_first_terminal_transition_stamps_completed_at() {
        let registry = JobRegistry::new();
        registry.create("job", JobType::Single);

        let first = registry
            .update(
                "job",
                JobUpdate::completed("Translation completed successfully", single_output()),
            )
            .unwrap();
        let stamped = first.completed_at;
        assert!(stamped.is_some());

        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = registry.update("job", JobUpdate::failed("late error")).unwrap();
        assert_eq!(second.completed_at, stamped);
    }

    #[test]
    fn test_list_all_newest_first() {
        let registry = JobRegistry::new();
        registry.create("older", JobType::Single);
        std::thread::sleep(std::time::Duration::from_millis(5));
        registry.create("newer", JobType::Batch);

        let all = registry.list_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].job_id, "newer");
        assert_eq!(all[1].job_id, "older");
    }

    #[test]
    fn test_counts() {
        let registry = JobRegistry::new();
        registry.create("p1", JobType::Single);
        registry.create("r1", JobType::Single);
        registry.create("c1", JobType::Single);
        registry.create("f1", JobType::Ocr);

        registry.update("r1", JobUpdate::stage(10, "running"));
        registry.update(
            "c1",
            JobUpdate::completed("done", single_output()),
        );
        registry.update("f1", JobUpdate::failed("boom"));

        assert_eq!(registry.counts(), (1, 1, 1, 1));
    }

    #[test]
    fn test_keep_all_never_evicts() {
        let registry = JobRegistry::new();
        for i in 0..20 {
            let id = format!("job_{}", i);
            registry.create(&id, JobType::Single);
            registry.update(&id, JobUpdate::failed("x"));
        }
        assert_eq!(registry.list_all().len(), 20);
    }

    #[test]
    fn test_max_completed_evicts_oldest_terminal() {
        let registry = JobRegistry::with_retention(RetentionPolicy::MaxCompleted(2));

        registry.create("keep_running", JobType::Single);
        registry.update("keep_running", JobUpdate::stage(10, "running"));

        for i in 0..4 {
            let id = format!("done_{}", i);
            registry.create(&id, JobType::Single);
            registry.update(&id, JobUpdate::completed("done", single_output()));
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        // The two most recent terminal records survive, running jobs are
        // untouched.
        assert!(registry.get("keep_running").is_some());
        assert!(registry.get("done_0").is_none());
        assert!(registry.get("done_1").is_none());
        assert!(registry.get("done_2").is_some());
        assert!(registry.get("done_3").is_some());
    }

    #[test]
    fn test_broadcaster_sees_every_mutation() {
        let broadcaster = JobEventBroadcaster::new(16);
        let mut rx = broadcaster.subscribe();
        let registry = JobRegistry::new().with_broadcaster(broadcaster);

        registry.create("job", JobType::Single);
        registry.update("job", JobUpdate::stage(30, "Uploading source document..."));

        let created = rx.try_recv().unwrap();
        assert_eq!(created.status, JobState::Pending);
        let staged = rx.try_recv().unwrap();
        assert_eq!(staged.progress, 30);
    }
}
