//! Pending-query lifecycle: admission, forwarding, answer reassembly and
//! reply framing. Performs no I/O; callers feed it bytes and act on the
//! returned [`Outcome`].

use crate::pending::{IdSource, PendingQuery, PendingQueryTable, QueryState, Transport};
use crate::policy::{Admission, AdmissionPolicy};
use crate::ports::{AnswerEncoder, AnswerLimits, BackendPort};
use ferrous_frontend_domain::{
    AnswerFragment, BackendQuery, BackendRequest, BlocklistSet, DomainError, QueryId, Rcode,
    WireBuffer,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, trace, warn};

const TCP_LENGTH_PREFIX: usize = 2;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub tcp_initial_buffer: usize,
    pub minimize_answers: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tcp_initial_buffer: 512,
            minimize_answers: true,
        }
    }
}

/// A UDP reply ready for one send attempt. Its query is already released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub listener: usize,
    pub peer: SocketAddr,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Waiting on the engine; nothing for the caller to do.
    Waiting,
    /// The TCP request is incomplete.
    ReadMore,
    SendDatagram(Datagram),
    /// A framed TCP answer is ready to be written.
    StartWriting,
    /// Part of the TCP answer is still unwritten.
    WriteMore,
    /// The query is gone; its connection, if any, has been dropped.
    Released,
}

pub struct QueryEngine<C> {
    table: PendingQueryTable<C>,
    policy: AdmissionPolicy,
    backend: Arc<dyn BackendPort>,
    encoder: Arc<dyn AnswerEncoder>,
    settings: EngineSettings,
}

impl<C> QueryEngine<C> {
    pub fn new(
        policy: AdmissionPolicy,
        backend: Arc<dyn BackendPort>,
        encoder: Arc<dyn AnswerEncoder>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            table: PendingQueryTable::new(),
            policy,
            backend,
            encoder,
            settings,
        }
    }

    pub fn with_id_source(mut self, ids: Box<dyn IdSource>) -> Self {
        self.table = PendingQueryTable::with_id_source(ids);
        self
    }

    pub fn pending_count(&self) -> usize {
        self.table.count()
    }

    pub fn query(&self, id: QueryId) -> Option<&PendingQuery<C>> {
        self.table.find(id)
    }

    pub fn state(&self, id: QueryId) -> Option<QueryState> {
        self.table.find(id).map(PendingQuery::state)
    }

    pub fn connection(&self, id: QueryId) -> Option<&C> {
        self.table.find(id)?.connection()
    }

    pub fn connection_mut(&mut self, id: QueryId) -> Option<&mut C> {
        self.table.find_mut(id)?.connection_mut()
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    pub fn replace_blocklist(&mut self, blocklist: BlocklistSet) {
        debug!(domains = blocklist.len(), "Blocklist replaced");
        self.policy.replace_blocklist(blocklist);
    }

    pub fn udp_received(&mut self, listener: usize, peer: SocketAddr, datagram: &[u8]) -> Outcome {
        let id = self.table.allocate_id();
        let buffers = WireBuffer::try_with_capacity(datagram.len())
            .and_then(|q| Ok((q, WireBuffer::try_with_capacity(datagram.len())?)));
        let (mut query, answer) = match buffers {
            Ok(buffers) => buffers,
            Err(e) => {
                warn!(peer = %peer, error = %e, "Dropping UDP query");
                return Outcome::Released;
            }
        };
        if let Err(e) = query.write(datagram) {
            warn!(peer = %peer, error = %e, "Dropping UDP query");
            return Outcome::Released;
        }
        query.flip();

        trace!(id = %id, peer = %peer, bytes = ?datagram, "UDP query");

        let pending = PendingQuery::new(id, peer, Transport::Udp { listener }, query, answer);
        if let Err(e) = self.table.insert(pending) {
            warn!(error = %e, "Dropping UDP query");
            return Outcome::Released;
        }
        self.handle_query(id)
    }

    /// Registers a new TCP connection; the query starts by reading the
    /// length prefix.
    pub fn tcp_accepted(&mut self, peer: SocketAddr, conn: C) -> Result<QueryId, DomainError> {
        let id = self.table.allocate_id();
        let query = WireBuffer::try_with_capacity(self.settings.tcp_initial_buffer)?;
        let mut pending = PendingQuery::new(
            id,
            peer,
            Transport::Tcp { conn },
            query,
            WireBuffer::default(),
        );
        pending.state = QueryState::ReadingLength;
        self.table.insert(pending)?;
        debug!(id = %id, peer = %peer, "TCP connection accepted");
        Ok(id)
    }

    /// How many bytes the connection may read next, `None` when not reading.
    pub fn tcp_read_window(&self, id: QueryId) -> Option<usize> {
        let pending = self.table.find(id)?;
        pending
            .state
            .is_reading()
            .then(|| pending.query.remaining())
    }

    /// Feeds bytes read from a TCP connection. An empty chunk means the
    /// peer closed its side.
    pub fn tcp_received(&mut self, id: QueryId, chunk: &[u8]) -> Outcome {
        let Some(pending) = self.table.find_mut(id) else {
            return Outcome::Released;
        };
        if !pending.state.is_reading() {
            return Outcome::Waiting;
        }
        if chunk.is_empty() {
            debug!(id = %id, peer = %pending.peer, "TCP peer closed before request completed");
            return self.release_outcome(id);
        }

        let take = chunk.len().min(pending.query.remaining());
        if pending.query.write(&chunk[..take]).is_err() {
            return self.release_outcome(id);
        }

        if pending.state == QueryState::ReadingLength
            && pending.query.position() >= TCP_LENGTH_PREFIX
        {
            pending.query.flip();
            let Some(length) = pending.query.read_u16() else {
                return self.release_outcome(id);
            };
            let mut body = match WireBuffer::try_with_capacity(length as usize) {
                Ok(body) => body,
                Err(e) => {
                    warn!(id = %id, error = %e, "Dropping TCP query");
                    return self.release_outcome(id);
                }
            };
            let surplus = pending.query.current();
            let keep = surplus.len().min(length as usize);
            if body.write(&surplus[..keep]).is_err() {
                return self.release_outcome(id);
            }
            pending.query = body;
            pending.state = QueryState::ReadingBody;
        }

        if pending.state == QueryState::ReadingBody && pending.query.remaining() == 0 {
            pending.query.flip();
            trace!(id = %id, bytes = ?pending.query.as_slice(), "TCP query");
            return self.handle_query(id);
        }
        Outcome::ReadMore
    }

    /// Unwritten part of the framed answer.
    pub fn tcp_pending_write(&self, id: QueryId) -> Option<&[u8]> {
        let pending = self.table.find(id)?;
        (pending.state == QueryState::Writing).then(|| pending.answer.current())
    }

    pub fn tcp_wrote(&mut self, id: QueryId, written: usize) -> Outcome {
        let Some(pending) = self.table.find_mut(id) else {
            return Outcome::Released;
        };
        if pending.state != QueryState::Writing {
            return Outcome::Waiting;
        }
        if pending.answer.skip(written).is_err() {
            return self.release_outcome(id);
        }
        if pending.answer.remaining() == 0 {
            debug!(id = %id, peer = %pending.peer, "TCP answer sent");
            return self.release_outcome(id);
        }
        Outcome::WriteMore
    }

    /// Idle timer fired. Safe in any state and after release.
    pub fn expire(&mut self, id: QueryId) -> bool {
        match self.table.remove(id) {
            Some(pending) => {
                debug!(id = %id, peer = %pending.peer, state = pending.state.as_str(), "TCP connection timed out");
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self, id: QueryId) -> bool {
        self.table.remove(id).is_some()
    }

    /// Applies one answer fragment from the engine.
    ///
    /// Unknown ids and queries not awaiting an answer are logged and ignored.
    /// A fragment that would overflow the declared answer length is a
    /// protocol violation and returned as an error.
    pub fn backend_answer(&mut self, fragment: AnswerFragment) -> Result<Outcome, DomainError> {
        let id = fragment.id;
        let Some(pending) = self.table.find_mut(id) else {
            warn!(id = %id, "Cannot find pending query");
            return Ok(Outcome::Waiting);
        };
        let (QueryState::Forwarded, Some(parsed)) = (pending.state, pending.parsed.as_ref()) else {
            warn!(id = %id, state = pending.state.as_str(), "Answer for query not awaiting one");
            return Ok(Outcome::Waiting);
        };

        if fragment.srvfail || (fragment.bogus && !parsed.checking_disabled()) {
            debug!(
                id = %id,
                qname = %parsed.question.name,
                srvfail = fragment.srvfail,
                bogus = fragment.bogus,
                "Engine failed query"
            );
            pending.answer = WireBuffer::from_vec(parsed.error_answer(Rcode::ServFail));
            return Ok(self.send_answer(id));
        }

        if pending.answer.position() == 0 {
            if let Err(e) = pending.answer.set_capacity(fragment.answer_len as usize) {
                warn!(id = %id, error = %e, "Cannot buffer answer");
                pending.answer = WireBuffer::from_vec(parsed.error_answer(Rcode::ServFail));
                return Ok(self.send_answer(id));
            }
        }

        if pending.answer.position() + fragment.data.len() > pending.answer.capacity() {
            return Err(DomainError::BackendProtocol(format!(
                "answer fragment of {} bytes at offset {} exceeds {} byte answer for query {}",
                fragment.data.len(),
                pending.answer.position(),
                pending.answer.capacity(),
                id
            )));
        }
        pending.answer.write(&fragment.data)?;
        if !pending.answer.is_full() {
            return Ok(Outcome::Waiting);
        }

        pending.answer.flip();
        let limits = AnswerLimits {
            max_size: parsed.max_answer_size(pending.transport.kind()),
            dnssec_ok: parsed.dnssec_ok(),
            minimize: self.settings.minimize_answers,
        };
        let reply = match self.encoder.encode(pending.answer.as_slice(), parsed, limits) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(id = %id, qname = %parsed.question.name, error = %e, "Cannot encode answer");
                parsed.error_answer(Rcode::ServFail)
            }
        };
        pending.answer = WireBuffer::from_vec(reply);
        Ok(self.send_answer(id))
    }

    fn handle_query(&mut self, id: QueryId) -> Outcome {
        let Some(pending) = self.table.find_mut(id) else {
            return Outcome::Released;
        };

        match self.policy.admit(pending.query.as_slice(), pending.peer) {
            Admission::Drop(reason) => {
                debug!(id = %id, peer = %pending.peer, reason, "Dropping query");
                self.release_outcome(id)
            }
            Admission::Reply(reply) => {
                pending.answer = WireBuffer::from_vec(reply);
                self.send_answer(id)
            }
            Admission::Forward(parsed) => {
                let request = BackendRequest::Query(BackendQuery {
                    id,
                    qname: parsed.question.name.clone(),
                    qtype: parsed.question.qtype,
                    qclass: parsed.question.qclass,
                });
                match self.backend.send(request) {
                    Ok(()) => {
                        debug!(
                            id = %id,
                            qname = %parsed.question.name,
                            qtype = %parsed.question.qtype,
                            transport = %pending.transport.kind(),
                            "Query forwarded"
                        );
                        pending.state = QueryState::Forwarded;
                        pending.parsed = Some(parsed);
                        Outcome::Waiting
                    }
                    Err(e) => {
                        warn!(id = %id, error = %e, "Cannot forward query");
                        pending.answer = WireBuffer::from_vec(parsed.error_answer(Rcode::ServFail));
                        pending.parsed = Some(parsed);
                        self.send_answer(id)
                    }
                }
            }
        }
    }

    fn send_answer(&mut self, id: QueryId) -> Outcome {
        let Some(pending) = self.table.find_mut(id) else {
            return Outcome::Released;
        };

        if let Transport::Udp { listener } = pending.transport {
            let Some(pending) = self.table.remove(id) else {
                return Outcome::Released;
            };
            trace!(id = %id, bytes = ?pending.answer.current(), "UDP answer");
            return Outcome::SendDatagram(Datagram {
                listener,
                peer: pending.peer,
                payload: pending.answer.into_readable(),
            });
        }

        match frame_tcp_answer(pending.answer.current()) {
            Ok(framed) => {
                pending.answer = framed;
                pending.state = QueryState::Writing;
                Outcome::StartWriting
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Cannot frame TCP answer");
                self.release_outcome(id)
            }
        }
    }

    fn release_outcome(&mut self, id: QueryId) -> Outcome {
        self.table.remove(id);
        Outcome::Released
    }
}

fn frame_tcp_answer(answer: &[u8]) -> Result<WireBuffer, DomainError> {
    let length = u16::try_from(answer.len()).map_err(|_| DomainError::BufferOverflow {
        needed: answer.len(),
        available: u16::MAX as usize,
    })?;
    let mut framed = WireBuffer::try_with_capacity(answer.len() + TCP_LENGTH_PREFIX)?;
    framed.write(&length.to_be_bytes())?;
    framed.write(answer)?;
    framed.flip();
    Ok(framed)
}
