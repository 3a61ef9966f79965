use futures::future::AbortHandle;
use socket2::SockRef;
use std::io;
use std::net::Shutdown;
use std::sync::Arc;
use tokio::net::TcpStream;

/// A client TCP connection as stored in its pending query. Readiness
/// watchers and the idle timer are tied to this value: dropping it aborts
/// them and closes the socket.
#[derive(Debug)]
pub struct TcpConnection {
    stream: Arc<TcpStream>,
    read_interest: Option<AbortHandle>,
    write_interest: Option<AbortHandle>,
    idle_timer: Option<AbortHandle>,
}

impl TcpConnection {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream: Arc::new(stream),
            read_interest: None,
            write_interest: None,
            idle_timer: None,
        }
    }

    pub fn stream(&self) -> &Arc<TcpStream> {
        &self.stream
    }

    pub fn set_read_interest(&mut self, handle: AbortHandle) {
        replace(&mut self.read_interest, handle);
    }

    pub fn set_write_interest(&mut self, handle: AbortHandle) {
        replace(&mut self.write_interest, handle);
    }

    pub fn set_idle_timer(&mut self, handle: AbortHandle) {
        replace(&mut self.idle_timer, handle);
    }

    /// Stops reading: the request is complete.
    pub fn shutdown_read(&mut self) -> io::Result<()> {
        if let Some(handle) = self.read_interest.take() {
            handle.abort();
        }
        SockRef::from(self.stream.as_ref()).shutdown(Shutdown::Read)
    }
}

fn replace(slot: &mut Option<AbortHandle>, handle: AbortHandle) {
    if let Some(previous) = slot.replace(handle) {
        previous.abort();
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        for handle in [
            self.read_interest.take(),
            self.write_interest.take(),
            self.idle_timer.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}
