use super::events::FrontendEvent;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Binds a non-blocking UDP listener. IPv6 sockets are v6-only so that an
/// IPv4 and an IPv6 wildcard can be configured side by side.
pub fn bind_udp(addr: SocketAddr) -> io::Result<UdpSocket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if addr.is_ipv6() {
        socket.set_only_v6(true)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}

/// Receives datagrams on `socket` and hands each one to the dispatcher.
/// Replies are sent by the dispatcher through the same socket.
pub async fn run_udp_listener(
    listener: usize,
    socket: Arc<UdpSocket>,
    max_datagram: usize,
    events: mpsc::Sender<FrontendEvent>,
    shutdown: CancellationToken,
) {
    let local = socket.local_addr().ok();
    info!(listener, address = ?local, "UDP listener started");
    let mut buf = vec![0u8; max_datagram.max(1)];

    loop {
        let received = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut buf) => received,
        };
        match received {
            Ok((len, peer)) => {
                let event = FrontendEvent::Datagram {
                    listener,
                    peer,
                    payload: buf[..len].to_vec(),
                };
                if events.send(event).await.is_err() {
                    break;
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock
                        | io::ErrorKind::Interrupted
                        | io::ErrorKind::ConnectionRefused
                        | io::ErrorKind::ConnectionReset
                ) =>
            {
                debug!(listener, error = %e, "Transient UDP receive error");
            }
            Err(e) => warn!(listener, error = %e, "UDP receive failed"),
        }
    }
    debug!(listener, "UDP listener stopped");
}
