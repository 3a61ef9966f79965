use ferrous_frontend_application::wire::Header;
use ferrous_frontend_domain::{QueryClass, QueryType};
use std::net::SocketAddr;

pub const FLAG_QR: u16 = 0x8000;
pub const FLAG_TC: u16 = 0x0200;
pub const FLAG_RD: u16 = 0x0100;
pub const FLAG_RA: u16 = 0x0080;
pub const FLAG_CD: u16 = 0x0010;

pub fn peer() -> SocketAddr {
    "192.0.2.10:53000".parse().unwrap()
}

pub fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.trim_end_matches('.').split('.').filter(|l| !l.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

/// Builds client query packets.
#[derive(Clone)]
pub struct QueryBuilder {
    id: u16,
    flags: u16,
    qname: String,
    qtype: QueryType,
    qclass: QueryClass,
    counts: Option<[u16; 4]>,
    edns: Option<(u16, bool)>,
}

impl QueryBuilder {
    pub fn new(qname: &str) -> Self {
        Self {
            id: 0x1234,
            flags: FLAG_RD,
            qname: qname.to_string(),
            qtype: QueryType::A,
            qclass: QueryClass::IN,
            counts: None,
            edns: None,
        }
    }

    pub fn id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn qtype(mut self, qtype: QueryType) -> Self {
        self.qtype = qtype;
        self
    }

    pub fn qclass(mut self, qclass: QueryClass) -> Self {
        self.qclass = qclass;
        self
    }

    /// Header counts written verbatim, regardless of the sections present.
    pub fn counts(mut self, qd: u16, an: u16, ns: u16, ar: u16) -> Self {
        self.counts = Some([qd, an, ns, ar]);
        self
    }

    pub fn edns(mut self, udp_size: u16, dnssec_ok: bool) -> Self {
        self.edns = Some((udp_size, dnssec_ok));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let counts = self
            .counts
            .unwrap_or([1, 0, 0, self.edns.is_some() as u16]);
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.extend_from_slice(&self.flags.to_be_bytes());
        for count in counts {
            buf.extend_from_slice(&count.to_be_bytes());
        }
        buf.extend_from_slice(&encode_name(&self.qname));
        buf.extend_from_slice(&self.qtype.0.to_be_bytes());
        buf.extend_from_slice(&self.qclass.0.to_be_bytes());
        if let Some((size, dnssec_ok)) = self.edns {
            buf.push(0);
            buf.extend_from_slice(&41u16.to_be_bytes());
            buf.extend_from_slice(&size.to_be_bytes());
            buf.extend_from_slice(&[0, 0]);
            buf.extend_from_slice(&(if dnssec_ok { 0x8000u16 } else { 0 }).to_be_bytes());
            buf.extend_from_slice(&[0, 0]);
        }
        buf
    }
}

/// Engine-style answer for `qname`: one A record, id zero.
pub fn engine_answer(qname: &str, address: [u8; 4]) -> Vec<u8> {
    let mut buf = vec![0, 0, 0x81, 0x80, 0, 1, 0, 1, 0, 0, 0, 0];
    buf.extend_from_slice(&encode_name(qname));
    buf.extend_from_slice(&[0, 1, 0, 1]);
    buf.extend_from_slice(&[0xC0, 0x0C, 0, 1, 0, 1, 0, 0, 0x0e, 0x10, 0, 4]);
    buf.extend_from_slice(&address);
    buf
}

pub fn header(reply: &[u8]) -> Header {
    Header::parse(reply).expect("reply shorter than a header")
}

pub fn rcode(reply: &[u8]) -> u8 {
    header(reply).rcode()
}
