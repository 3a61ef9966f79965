use super::netlink::parse_messages;
use ferrous_frontend_application::use_cases::{NetworkChangeMonitor, NetworkEvent};
use ferrous_frontend_domain::DomainError;
use tracing::{debug, info};

/// Applies one route socket datagram. Returns the events forwarded to the
/// engine.
pub fn handle_datagram(
    monitor: &NetworkChangeMonitor,
    datagram: &[u8],
) -> Result<Vec<NetworkEvent>, DomainError> {
    let mut forwarded = Vec::new();
    for message in parse_messages(datagram) {
        if let Some(event) = monitor.handle(message)? {
            match &event {
                NetworkEvent::Proposal(proposal) => info!(
                    if_index = proposal.if_index,
                    source = proposal.source,
                    resolvers = proposal.addresses.len(),
                    "Resolver proposal"
                ),
                NetworkEvent::Changed => debug!("Network changed"),
            }
            forwarded.push(event);
        }
    }
    Ok(forwarded)
}

#[cfg(target_os = "linux")]
pub use linux::{run_route_monitor, RouteSocket};

#[cfg(not(target_os = "linux"))]
pub async fn run_route_monitor(
    _monitor: NetworkChangeMonitor,
    _shutdown: tokio_util::sync::CancellationToken,
) -> Result<(), DomainError> {
    tracing::warn!("Route monitoring is not supported on this platform");
    Ok(())
}

#[cfg(target_os = "linux")]
mod linux {
    use super::super::netlink::{group_mask, RTMGRP_LINK, RTNLGRP_ND_USEROPT};
    use super::handle_datagram;
    use ferrous_frontend_application::use_cases::NetworkChangeMonitor;
    use ferrous_frontend_domain::DomainError;
    use std::io;
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
    use tokio::io::unix::AsyncFd;
    use tokio_util::sync::CancellationToken;
    use tracing::{info, warn};

    const RECV_BUFFER: usize = 16 * 1024;

    /// Non-blocking `NETLINK_ROUTE` socket subscribed to link and ND user
    /// option notifications.
    pub struct RouteSocket {
        fd: AsyncFd<OwnedFd>,
    }

    impl RouteSocket {
        pub fn open() -> io::Result<Self> {
            // SAFETY: plain socket(2) call; the result is checked before use.
            let raw = unsafe {
                libc::socket(
                    libc::AF_NETLINK,
                    libc::SOCK_RAW | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
                    libc::NETLINK_ROUTE,
                )
            };
            if raw < 0 {
                return Err(io::Error::last_os_error());
            }
            // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
            let fd = unsafe { OwnedFd::from_raw_fd(raw) };

            // SAFETY: sockaddr_nl is plain old data; all-zero is a valid value.
            let mut addr: libc::sockaddr_nl = unsafe { std::mem::zeroed() };
            addr.nl_family = libc::AF_NETLINK as libc::sa_family_t;
            addr.nl_groups = RTMGRP_LINK | group_mask(RTNLGRP_ND_USEROPT);
            // SAFETY: addr outlives the call and the length matches its type.
            let rc = unsafe {
                libc::bind(
                    fd.as_raw_fd(),
                    &addr as *const libc::sockaddr_nl as *const libc::sockaddr,
                    std::mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
                )
            };
            if rc < 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(Self {
                fd: AsyncFd::new(fd)?,
            })
        }

        pub async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
            loop {
                let mut guard = self.fd.readable().await?;
                let result = guard.try_io(|inner| {
                    // SAFETY: buf is valid for writes of buf.len() bytes.
                    let n = unsafe {
                        libc::recv(
                            inner.as_raw_fd(),
                            buf.as_mut_ptr() as *mut libc::c_void,
                            buf.len(),
                            0,
                        )
                    };
                    if n < 0 {
                        Err(io::Error::last_os_error())
                    } else {
                        Ok(n as usize)
                    }
                });
                match result {
                    Ok(received) => return received,
                    Err(_would_block) => continue,
                }
            }
        }
    }

    pub async fn run_route_monitor(
        monitor: NetworkChangeMonitor,
        shutdown: CancellationToken,
    ) -> Result<(), DomainError> {
        let socket = RouteSocket::open()
            .map_err(|e| DomainError::IoError(format!("route socket: {}", e)))?;
        info!("Route monitor started");
        let mut buf = vec![0u8; RECV_BUFFER];

        loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                received = socket.recv(&mut buf) => received,
            };
            match received {
                Ok(len) => {
                    handle_datagram(&monitor, &buf[..len])?;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => warn!(error = %e, "Route socket read failed"),
            }
        }
    }
}
