use ferrous_frontend_application::ports::{BlocklistSink, BlocklistSource};
use ferrous_frontend_domain::{BlocklistSet, DomainError};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Watches the blocklist source and hands a fresh set to the dispatcher
/// whenever its modification time changes. A source that disappears
/// empties the blocklist.
pub struct BlocklistReloadJob {
    source: Arc<dyn BlocklistSource>,
    sink: Arc<dyn BlocklistSink>,
    interval_secs: u64,
    last_modified: Mutex<Option<SystemTime>>,
    shutdown: CancellationToken,
}

impl BlocklistReloadJob {
    pub fn new(source: Arc<dyn BlocklistSource>, sink: Arc<dyn BlocklistSink>) -> Self {
        Self {
            source,
            sink,
            interval_secs: 30,
            last_modified: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs.max(1);
        self
    }

    /// Marks the source as already loaded at `modified`.
    pub fn with_last_modified(mut self, modified: Option<SystemTime>) -> Self {
        self.last_modified = Mutex::new(modified);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Reloads if the source changed since the last successful check.
    /// Returns whether a new set was handed over.
    pub async fn check(&self) -> Result<bool, DomainError> {
        let modified = self.source.modified().await;
        let mut last_modified = self.last_modified.lock().await;
        if modified == *last_modified {
            return Ok(false);
        }

        let blocklist = match modified {
            Some(_) => self.source.load().await?,
            None => {
                info!("Blocklist source removed, clearing blocklist");
                BlocklistSet::new()
            }
        };
        self.sink.replace(blocklist)?;
        *last_modified = modified;
        Ok(true)
    }

    /// Spawns the reload loop. The returned handle completes once the
    /// cancellation token fires.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!(
            interval_secs = self.interval_secs,
            "Starting blocklist reload job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("BlocklistReloadJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.check().await {
                            Ok(true) => debug!("BlocklistReloadJob: blocklist replaced"),
                            Ok(false) => {}
                            Err(e) => error!(error = %e, "BlocklistReloadJob: reload failed"),
                        }
                    }
                }
            }
        })
    }
}
