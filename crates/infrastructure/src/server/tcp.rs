use super::events::FrontendEvent;
use ferrous_frontend_domain::DomainError;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const LISTEN_BACKLOG: i32 = 1024;

pub fn bind_tcp(addr: SocketAddr) -> io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if addr.is_ipv6() {
        socket.set_only_v6(true)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

/// Tells the accept loop whether taking another descriptor is safe.
pub trait DescriptorBudget: Send + Sync {
    fn near_limit(&self) -> bool;
}

/// Compares the process's open descriptors against `RLIMIT_NOFILE`,
/// keeping `reserve` descriptors free for everything else.
#[derive(Debug, Clone, Copy)]
pub struct ProcessDescriptors {
    reserve: usize,
}

impl ProcessDescriptors {
    pub fn new(reserve: usize) -> Self {
        Self { reserve }
    }

    fn soft_limit() -> Option<usize> {
        let mut limit = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: getrlimit only writes into the struct we pass.
        let rc = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) };
        if rc != 0 {
            return None;
        }
        Some(usize::try_from(limit.rlim_cur).unwrap_or(usize::MAX))
    }

    fn open_descriptors() -> Option<usize> {
        std::fs::read_dir("/proc/self/fd")
            .or_else(|_| std::fs::read_dir("/dev/fd"))
            .ok()
            .map(|entries| entries.count())
    }
}

impl DescriptorBudget for ProcessDescriptors {
    fn near_limit(&self) -> bool {
        match (Self::soft_limit(), Self::open_descriptors()) {
            (Some(limit), Some(open)) => open.saturating_add(self.reserve) >= limit,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptAction {
    /// Try again right away.
    Retry,
    /// Out of descriptors; stop accepting for the backoff period.
    Pause,
    Fatal,
}

pub fn classify_accept_error(error: &io::Error) -> AcceptAction {
    match error.raw_os_error() {
        Some(libc::EMFILE) | Some(libc::ENFILE) => return AcceptAction::Pause,
        Some(libc::EINTR) | Some(libc::EAGAIN) | Some(libc::ECONNABORTED) => {
            return AcceptAction::Retry
        }
        _ => {}
    }
    match error.kind() {
        io::ErrorKind::Interrupted
        | io::ErrorKind::WouldBlock
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset => AcceptAction::Retry,
        _ => AcceptAction::Fatal,
    }
}

/// Accepts connections and hands them to the dispatcher. While the
/// descriptor budget is exhausted no connection is accepted; the loop waits
/// `backoff` and looks again.
pub async fn run_accept_loop(
    listener: TcpListener,
    budget: Arc<dyn DescriptorBudget>,
    backoff: Duration,
    events: mpsc::Sender<FrontendEvent>,
    shutdown: CancellationToken,
) {
    let local = listener.local_addr().ok();
    info!(address = ?local, "TCP listener started");

    loop {
        if budget.near_limit() {
            warn!(backoff_ms = backoff.as_millis() as u64, "Descriptor reserve reached, pausing accept");
            if pause(backoff, &shutdown).await {
                break;
            }
            continue;
        }

        let accepted = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };
        match accepted {
            Ok((stream, peer)) => {
                if events
                    .send(FrontendEvent::Accepted { stream, peer })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(e) => match classify_accept_error(&e) {
                AcceptAction::Retry => debug!(error = %e, "Accept interrupted"),
                AcceptAction::Pause => {
                    warn!(error = %e, "Out of descriptors, pausing accept");
                    if pause(backoff, &shutdown).await {
                        break;
                    }
                }
                AcceptAction::Fatal => {
                    error!(error = %e, "Accept failed");
                    let _ = events
                        .send(FrontendEvent::ListenerFailed(DomainError::IoError(format!(
                            "accept: {}",
                            e
                        ))))
                        .await;
                    break;
                }
            },
        }
    }
    debug!(address = ?local, "TCP listener stopped");
}

/// Returns true when shutdown was requested during the pause.
async fn pause(backoff: Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => true,
        _ = tokio::time::sleep(backoff) => false,
    }
}
