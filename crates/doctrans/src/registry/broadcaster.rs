//! Job event broadcasting for streaming consumers.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::record::JobRecord;

/// Broadcasts job record snapshots whenever the registry mutates one.
///
/// Lossy by design: sends with no active receivers are dropped silently, and
/// slow receivers miss events once the channel buffer wraps.
#[derive(Clone)]
pub struct JobEventBroadcaster {
    sender: Arc<broadcast::Sender<JobRecord>>,
}

impl JobEventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends a snapshot to all subscribers.
    pub fn send(&self, record: JobRecord) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(record);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobRecord> {
        self.sender.subscribe()
    }
}

impl Default for JobEventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
