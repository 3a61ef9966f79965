use crate::BlocklistReloadJob;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Starts the configured background jobs, sharing one shutdown token.
pub struct JobRunner {
    blocklist_reload: Option<BlocklistReloadJob>,
    shutdown: Option<CancellationToken>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            blocklist_reload: None,
            shutdown: None,
        }
    }

    pub fn with_blocklist_reload(mut self, job: BlocklistReloadJob) -> Self {
        self.blocklist_reload = Some(job);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Spawns every configured job and returns their handles, which finish
    /// once the shutdown token is cancelled.
    pub fn start(self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();

        if let Some(job) = self.blocklist_reload {
            let job = match &self.shutdown {
                Some(token) => job.with_cancellation(token.clone()),
                None => job,
            };
            handles.push(Arc::new(job).start());
        }

        info!(jobs = handles.len(), "Background jobs started");
        handles
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
