use super::codec::FrameCodec;
use super::messages::{decode_event, encode_request};
use crate::server::FrontendEvent;
use ferrous_frontend_application::ports::BackendPort;
use ferrous_frontend_domain::{BackendRequest, DomainError};
use futures::{SinkExt, StreamExt};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info};

/// Sending half of the backend channel. Sends never block; frames are
/// queued and written by a background task.
#[derive(Debug, Clone)]
pub struct BackendClient {
    requests: mpsc::UnboundedSender<BackendRequest>,
}

impl BackendPort for BackendClient {
    fn send(&self, request: BackendRequest) -> Result<(), DomainError> {
        self.requests
            .send(request)
            .map_err(|_| DomainError::BackendUnavailable)
    }
}

pub async fn connect_backend(
    path: &Path,
    events: mpsc::Sender<FrontendEvent>,
) -> Result<BackendClient, DomainError> {
    let stream = UnixStream::connect(path).await.map_err(|e| {
        DomainError::IoError(format!("connect {}: {}", path.display(), e))
    })?;
    info!(socket = %path.display(), "Connected to resolution engine");
    let (reader, writer) = stream.into_split();
    Ok(spawn_backend(reader, writer, events))
}

/// Starts the reader and writer tasks for an established channel.
pub fn spawn_backend<R, W>(
    reader: R,
    writer: W,
    events: mpsc::Sender<FrontendEvent>,
) -> BackendClient
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (requests, mut outgoing) = mpsc::unbounded_channel::<BackendRequest>();

    tokio::spawn(async move {
        let mut sink = FramedWrite::new(writer, FrameCodec);
        while let Some(request) = outgoing.recv().await {
            let kind = request.kind();
            if let Err(e) = sink.send(encode_request(&request)).await {
                error!(error = %e, kind, "Backend write failed");
                break;
            }
        }
        debug!("Backend writer stopped");
    });

    tokio::spawn(async move {
        let mut frames = FramedRead::new(reader, FrameCodec);
        let reason = loop {
            match frames.next().await {
                Some(Ok(frame)) => match decode_event(frame) {
                    Ok(Some(event)) => {
                        if events.send(FrontendEvent::Backend(event)).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => break Some(e),
                },
                Some(Err(e)) => break Some(DomainError::BackendProtocol(e.to_string())),
                None => break None,
            }
        };
        let _ = events.send(FrontendEvent::BackendClosed(reason)).await;
    });

    BackendClient { requests }
}
