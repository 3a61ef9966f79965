//! DNSKEY records in zone-file presentation form, as kept in the trust
//! anchor file: `owner [ttl] [class] DNSKEY flags protocol algorithm key`.

use base64::{engine::general_purpose::STANDARD, Engine};
use ferrous_frontend_domain::DomainError;
use std::fmt;

const ZONE_KEY: u16 = 0x0100;
const SECURE_ENTRY_POINT: u16 = 0x0001;
const DNSSEC_PROTOCOL: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnskeyRecord {
    pub owner: String,
    pub ttl: Option<u32>,
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

impl DnskeyRecord {
    pub fn from_presentation(line: &str) -> Result<Self, DomainError> {
        let line = line.split(';').next().unwrap_or_default();
        let mut tokens = line.split_whitespace();
        let invalid = |reason: &str| DomainError::InvalidTrustAnchor(reason.to_string());

        let owner = tokens.next().ok_or_else(|| invalid("empty line"))?;
        let mut ttl = None;
        loop {
            let token = tokens.next().ok_or_else(|| invalid("missing record type"))?;
            if token.eq_ignore_ascii_case("DNSKEY") {
                break;
            }
            if ["IN", "CH", "HS"].iter().any(|c| c.eq_ignore_ascii_case(token)) {
                continue;
            }
            match token.parse::<u32>() {
                Ok(value) if ttl.is_none() => ttl = Some(value),
                _ => return Err(invalid(&format!("not a DNSKEY record: {}", token))),
            }
        }

        let flags = parse_field::<u16>(tokens.next(), "flags")?;
        let protocol = parse_field::<u8>(tokens.next(), "protocol")?;
        let algorithm = parse_field::<u8>(tokens.next(), "algorithm")?;
        let key: String = tokens.collect();
        if key.is_empty() {
            return Err(invalid("missing public key"));
        }
        let public_key = STANDARD
            .decode(key.as_bytes())
            .map_err(|e| invalid(&format!("bad public key: {}", e)))?;

        if protocol != DNSSEC_PROTOCOL {
            return Err(invalid(&format!("protocol {} (expected 3)", protocol)));
        }
        if flags & ZONE_KEY == 0 {
            return Err(invalid("zone key flag not set"));
        }

        Ok(Self {
            owner: owner.to_string(),
            ttl,
            flags,
            protocol,
            algorithm,
            public_key,
        })
    }

    pub fn is_ksk(&self) -> bool {
        self.flags & SECURE_ENTRY_POINT != 0
    }

    pub fn key_tag(&self) -> u16 {
        let mut wire = Vec::with_capacity(4 + self.public_key.len());
        wire.extend_from_slice(&self.flags.to_be_bytes());
        wire.push(self.protocol);
        wire.push(self.algorithm);
        wire.extend_from_slice(&self.public_key);

        let mut accumulator: u32 = 0;
        for chunk in wire.chunks(2) {
            accumulator += match chunk {
                [hi, lo] => u32::from(u16::from_be_bytes([*hi, *lo])),
                [hi] => u32::from(*hi) << 8,
                _ => 0,
            };
        }
        accumulator += accumulator >> 16;
        (accumulator & 0xFFFF) as u16
    }
}

impl fmt::Display for DnskeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} DNSKEY(alg={}, tag={}, {})",
            self.owner,
            self.algorithm,
            self.key_tag(),
            if self.is_ksk() { "KSK" } else { "ZSK" }
        )
    }
}

fn parse_field<T: std::str::FromStr>(token: Option<&str>, name: &str) -> Result<T, DomainError> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| DomainError::InvalidTrustAnchor(format!("bad {}", name)))
}
