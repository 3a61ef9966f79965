//! The single owner of the pending query table.
//!
//! Listener, backend and job tasks only produce [`FrontendEvent`]s; the
//! dispatcher applies them to the [`QueryEngine`] one at a time and drives
//! the TCP connections it holds through abortable readiness futures.

use super::connection::TcpConnection;
use super::events::FrontendEvent;
use ferrous_frontend_application::ports::BlocklistSink;
use ferrous_frontend_application::use_cases::TrustAnchorManager;
use ferrous_frontend_application::{Datagram, Outcome, QueryEngine};
use ferrous_frontend_domain::{BackendEvent, BlocklistSet, DomainError, QueryId};
use futures::future::{abortable, BoxFuture};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

enum ConnectionEvent {
    Readable(QueryId),
    Writable(QueryId),
    TimedOut(QueryId),
    Failed(QueryId, io::Error),
}

type ConnectionFuture = BoxFuture<'static, Option<ConnectionEvent>>;

pub struct Dispatcher {
    engine: QueryEngine<TcpConnection>,
    trust_anchors: TrustAnchorManager,
    udp: Vec<Arc<UdpSocket>>,
    events: mpsc::Receiver<FrontendEvent>,
    connections: FuturesUnordered<ConnectionFuture>,
    tcp_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        engine: QueryEngine<TcpConnection>,
        trust_anchors: TrustAnchorManager,
        udp: Vec<Arc<UdpSocket>>,
        events: mpsc::Receiver<FrontendEvent>,
        tcp_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            trust_anchors,
            udp,
            events,
            connections: FuturesUnordered::new(),
            tcp_timeout,
        }
    }

    pub fn engine(&self) -> &QueryEngine<TcpConnection> {
        &self.engine
    }

    pub fn trust_anchors(&self) -> &TrustAnchorManager {
        &self.trust_anchors
    }

    /// Runs until shutdown, the end of the event stream or a fatal error
    /// (backend lost, protocol violation, listener failure).
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), DomainError> {
        info!(udp_listeners = self.udp.len(), "Dispatcher started");
        let result = loop {
            tokio::select! {
                _ = shutdown.cancelled() => break Ok(()),
                event = self.events.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.on_event(event) {
                            break Err(e);
                        }
                    }
                    None => break Ok(()),
                },
                Some(event) = self.connections.next(), if !self.connections.is_empty() => {
                    if let Some(event) = event {
                        self.on_connection_event(event);
                    }
                }
            }
        };
        match &result {
            Ok(()) => info!(pending = self.engine.pending_count(), "Dispatcher stopped"),
            Err(e) => error!(pending = self.engine.pending_count(), error = %e, "Dispatcher failed"),
        }
        result
    }

    fn on_event(&mut self, event: FrontendEvent) -> Result<(), DomainError> {
        match event {
            FrontendEvent::Datagram {
                listener,
                peer,
                payload,
            } => {
                let outcome = self.engine.udp_received(listener, peer, &payload);
                self.apply(None, outcome);
            }
            FrontendEvent::Accepted { stream, peer } => self.on_accepted(stream, peer),
            FrontendEvent::Backend(BackendEvent::Answer(fragment)) => {
                let id = fragment.id;
                let outcome = self.engine.backend_answer(fragment)?;
                self.apply(Some(id), outcome);
            }
            FrontendEvent::Backend(BackendEvent::TrustAnchorAdd(anchor)) => {
                self.trust_anchors.propose(anchor)
            }
            FrontendEvent::Backend(BackendEvent::TrustAnchorSetAbort) => {
                self.trust_anchors.abort_proposal()
            }
            FrontendEvent::Backend(BackendEvent::TrustAnchorSetDone) => {
                self.trust_anchors.complete_proposal()?;
            }
            FrontendEvent::BackendClosed(reason) => {
                return Err(reason.unwrap_or(DomainError::BackendUnavailable));
            }
            FrontendEvent::ListenerFailed(e) => return Err(e),
            FrontendEvent::ReplaceBlocklist(blocklist) => {
                info!(domains = blocklist.len(), "Blocklist replaced");
                self.engine.replace_blocklist(blocklist);
            }
        }
        Ok(())
    }

    fn on_accepted(&mut self, stream: TcpStream, peer: SocketAddr) {
        match self.engine.tcp_accepted(peer, TcpConnection::new(stream)) {
            Ok(id) => {
                self.arm_idle_timer(id);
                self.watch_readable(id);
            }
            Err(e) => warn!(peer = %peer, error = %e, "Dropping TCP connection"),
        }
    }

    fn on_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Readable(id) => self.on_readable(id),
            ConnectionEvent::Writable(id) => self.on_writable(id),
            ConnectionEvent::TimedOut(id) => {
                self.engine.expire(id);
            }
            ConnectionEvent::Failed(id, e) => {
                debug!(id = %id, error = %e, "TCP connection failed");
                self.engine.release(id);
            }
        }
    }

    fn on_readable(&mut self, id: QueryId) {
        let Some(window) = self.engine.tcp_read_window(id) else {
            return;
        };
        let Some(conn) = self.engine.connection(id) else {
            return;
        };
        let mut buf = vec![0u8; window.max(1)];
        let read = conn.stream().try_read(&mut buf);

        match read {
            Ok(n) => {
                let outcome = self.engine.tcp_received(id, &buf[..n]);
                if matches!(outcome, Outcome::Waiting | Outcome::StartWriting) {
                    if let Some(conn) = self.engine.connection_mut(id) {
                        if let Err(e) = conn.shutdown_read() {
                            debug!(id = %id, error = %e, "TCP read shutdown failed");
                        }
                    }
                }
                self.apply(Some(id), outcome);
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                self.watch_readable(id)
            }
            Err(e) => {
                debug!(id = %id, error = %e, "TCP read failed");
                self.engine.release(id);
            }
        }
    }

    fn on_writable(&mut self, id: QueryId) {
        let written = match (self.engine.tcp_pending_write(id), self.engine.connection(id)) {
            (Some(data), Some(conn)) => conn.stream().try_write(data),
            _ => return,
        };

        match written {
            Ok(n) => {
                let outcome = self.engine.tcp_wrote(id, n);
                self.apply(Some(id), outcome);
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                self.watch_writable(id)
            }
            Err(e) => {
                debug!(id = %id, error = %e, "TCP write failed");
                self.engine.release(id);
            }
        }
    }

    fn apply(&mut self, id: Option<QueryId>, outcome: Outcome) {
        match (outcome, id) {
            (Outcome::SendDatagram(datagram), _) => self.send_datagram(datagram),
            (Outcome::ReadMore, Some(id)) => self.watch_readable(id),
            (Outcome::StartWriting | Outcome::WriteMore, Some(id)) => self.watch_writable(id),
            _ => {}
        }
    }

    fn send_datagram(&self, datagram: Datagram) {
        let Some(socket) = self.udp.get(datagram.listener) else {
            warn!(listener = datagram.listener, "Answer for unknown UDP listener");
            return;
        };
        if let Err(e) = socket.try_send_to(&datagram.payload, datagram.peer) {
            warn!(peer = %datagram.peer, error = %e, "UDP send failed");
        }
    }

    fn watch_readable(&mut self, id: QueryId) {
        let Some(conn) = self.engine.connection_mut(id) else {
            return;
        };
        let stream = conn.stream().clone();
        let (readable, handle) = abortable(async move { stream.readable().await });
        conn.set_read_interest(handle);
        self.connections.push(Box::pin(async move {
            match readable.await {
                Ok(Ok(())) => Some(ConnectionEvent::Readable(id)),
                Ok(Err(e)) => Some(ConnectionEvent::Failed(id, e)),
                Err(_aborted) => None,
            }
        }));
    }

    fn watch_writable(&mut self, id: QueryId) {
        let Some(conn) = self.engine.connection_mut(id) else {
            return;
        };
        let stream = conn.stream().clone();
        let (writable, handle) = abortable(async move { stream.writable().await });
        conn.set_write_interest(handle);
        self.connections.push(Box::pin(async move {
            match writable.await {
                Ok(Ok(())) => Some(ConnectionEvent::Writable(id)),
                Ok(Err(e)) => Some(ConnectionEvent::Failed(id, e)),
                Err(_aborted) => None,
            }
        }));
    }

    fn arm_idle_timer(&mut self, id: QueryId) {
        let Some(conn) = self.engine.connection_mut(id) else {
            return;
        };
        let (timer, handle) = abortable(tokio::time::sleep(self.tcp_timeout));
        conn.set_idle_timer(handle);
        self.connections.push(Box::pin(async move {
            timer.await.ok().map(|()| ConnectionEvent::TimedOut(id))
        }));
    }
}

/// Hands reloaded blocklists to a running dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    events: mpsc::Sender<FrontendEvent>,
}

impl DispatcherHandle {
    pub fn new(events: mpsc::Sender<FrontendEvent>) -> Self {
        Self { events }
    }
}

impl BlocklistSink for DispatcherHandle {
    fn replace(&self, blocklist: BlocklistSet) -> Result<(), DomainError> {
        self.events
            .try_send(FrontendEvent::ReplaceBlocklist(blocklist))
            .map_err(|e| DomainError::IoError(format!("dispatcher unavailable: {}", e)))
    }
}
