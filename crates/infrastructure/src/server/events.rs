use ferrous_frontend_domain::{BackendEvent, BlocklistSet, DomainError};
use std::net::SocketAddr;
use tokio::net::TcpStream;

/// Everything the dispatcher reacts to, funnelled through one channel.
#[derive(Debug)]
pub enum FrontendEvent {
    Datagram {
        listener: usize,
        peer: SocketAddr,
        payload: Vec<u8>,
    },
    Accepted {
        stream: TcpStream,
        peer: SocketAddr,
    },
    Backend(BackendEvent),
    /// The backend channel is gone; `None` on a clean end of stream.
    BackendClosed(Option<DomainError>),
    ListenerFailed(DomainError),
    ReplaceBlocklist(BlocklistSet),
}
