use super::header::Header;
use super::question::skip_name;
use ferrous_frontend_domain::QueryType;

const EDNS_DO: u16 = 0x8000;
const RR_FIXED_LEN: usize = 10;

/// Client EDNS parameters from its OPT record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edns {
    pub udp_size: u16,
    pub version: u8,
    pub dnssec_ok: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdnsError {
    /// Record sections cannot be walked.
    Malformed,
    /// More than one OPT record.
    DuplicateOpt,
    /// OPT record not owned by the root name.
    NonRootOpt,
}

/// Walks the answer, authority and additional sections after the question
/// and extracts the OPT record, if any.
pub fn parse_edns(buf: &[u8], header: &Header, question_end: usize) -> Result<Option<Edns>, EdnsError> {
    let mut pos = question_end;

    for _ in 1..header.qdcount {
        pos = skip_name(buf, pos).ok_or(EdnsError::Malformed)? + 4;
        if pos > buf.len() {
            return Err(EdnsError::Malformed);
        }
    }

    for _ in 0..(header.ancount as usize + header.nscount as usize) {
        pos = skip_record(buf, pos)?;
    }

    let mut edns = None;
    for _ in 0..header.arcount {
        let name_start = pos;
        let name_end = skip_name(buf, pos).ok_or(EdnsError::Malformed)?;
        let fixed = buf
            .get(name_end..name_end + RR_FIXED_LEN)
            .ok_or(EdnsError::Malformed)?;
        let rr_type = QueryType(u16::from_be_bytes([fixed[0], fixed[1]]));
        let rdlen = u16::from_be_bytes([fixed[8], fixed[9]]) as usize;
        let next = name_end + RR_FIXED_LEN + rdlen;
        if next > buf.len() {
            return Err(EdnsError::Malformed);
        }

        if rr_type == QueryType::OPT {
            if edns.is_some() {
                return Err(EdnsError::DuplicateOpt);
            }
            if name_end - name_start != 1 {
                return Err(EdnsError::NonRootOpt);
            }
            edns = Some(Edns {
                udp_size: u16::from_be_bytes([fixed[2], fixed[3]]),
                version: fixed[5],
                dnssec_ok: u16::from_be_bytes([fixed[6], fixed[7]]) & EDNS_DO != 0,
            });
        }
        pos = next;
    }

    Ok(edns)
}

fn skip_record(buf: &[u8], pos: usize) -> Result<usize, EdnsError> {
    let name_end = skip_name(buf, pos).ok_or(EdnsError::Malformed)?;
    let fixed = buf
        .get(name_end..name_end + RR_FIXED_LEN)
        .ok_or(EdnsError::Malformed)?;
    let rdlen = u16::from_be_bytes([fixed[8], fixed[9]]) as usize;
    let next = name_end + RR_FIXED_LEN + rdlen;
    if next > buf.len() {
        return Err(EdnsError::Malformed);
    }
    Ok(next)
}
