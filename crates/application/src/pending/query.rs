use crate::wire::ParsedQuery;
use ferrous_frontend_domain::{QueryId, TransportKind, WireBuffer};
use std::net::SocketAddr;

/// Where the answer goes. A TCP query owns its connection handle; dropping
/// the handle closes the connection and cancels its timers.
#[derive(Debug)]
pub enum Transport<C> {
    Udp { listener: usize },
    Tcp { conn: C },
}

impl<C> Transport<C> {
    pub fn kind(&self) -> TransportKind {
        match self {
            Transport::Udp { .. } => TransportKind::Udp,
            Transport::Tcp { .. } => TransportKind::Tcp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Accepted,
    /// TCP: waiting for the two-byte length prefix.
    ReadingLength,
    /// TCP: length known, buffering the message.
    ReadingBody,
    /// Sent to the engine, answer not complete yet.
    Forwarded,
    /// TCP: framed answer partially written.
    Writing,
}

impl QueryState {
    pub fn is_reading(self) -> bool {
        matches!(self, QueryState::ReadingLength | QueryState::ReadingBody)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryState::Accepted => "accepted",
            QueryState::ReadingLength => "reading_length",
            QueryState::ReadingBody => "reading_body",
            QueryState::Forwarded => "forwarded",
            QueryState::Writing => "writing",
        }
    }
}

#[derive(Debug)]
pub struct PendingQuery<C> {
    pub(crate) id: QueryId,
    pub(crate) peer: SocketAddr,
    pub(crate) transport: Transport<C>,
    pub(crate) state: QueryState,
    pub(crate) query: WireBuffer,
    pub(crate) answer: WireBuffer,
    pub(crate) parsed: Option<ParsedQuery>,
}

impl<C> PendingQuery<C> {
    pub fn new(
        id: QueryId,
        peer: SocketAddr,
        transport: Transport<C>,
        query: WireBuffer,
        answer: WireBuffer,
    ) -> Self {
        Self {
            id,
            peer,
            transport,
            state: QueryState::Accepted,
            query,
            answer,
            parsed: None,
        }
    }

    pub fn id(&self) -> QueryId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn transport(&self) -> &Transport<C> {
        &self.transport
    }

    pub fn connection(&self) -> Option<&C> {
        match &self.transport {
            Transport::Tcp { conn } => Some(conn),
            Transport::Udp { .. } => None,
        }
    }

    pub fn connection_mut(&mut self) -> Option<&mut C> {
        match &mut self.transport {
            Transport::Tcp { conn } => Some(conn),
            Transport::Udp { .. } => None,
        }
    }
}
