use super::header::HEADER_LEN;
use ferrous_frontend_domain::{QueryClass, QueryType};

/// Longest name in wire form, root label included.
pub const MAX_NAME_WIRE_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Presentation form with trailing dot, case preserved.
    pub name: String,
    pub qtype: QueryType,
    pub qclass: QueryClass,
    /// Question section exactly as received: name, type and class.
    pub wire: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionError {
    /// Packet ends inside the question.
    Truncated,
    /// Compression pointer, reserved label type or name too long.
    InvalidName,
}

/// Parses the single question following the header.
///
/// Returns the question and the offset just past it.
pub fn parse_question(buf: &[u8]) -> Result<(Question, usize), QuestionError> {
    let mut pos = HEADER_LEN;
    let mut name = String::new();
    let mut wire_len = 1usize;

    loop {
        let Some(&label_len) = buf.get(pos) else {
            return Err(QuestionError::Truncated);
        };
        let label_len = label_len as usize;
        if label_len == 0 {
            pos += 1;
            break;
        }
        if label_len & 0xC0 != 0 {
            return Err(QuestionError::InvalidName);
        }
        let label = buf
            .get(pos + 1..pos + 1 + label_len)
            .ok_or(QuestionError::Truncated)?;
        wire_len += label_len + 1;
        if wire_len > MAX_NAME_WIRE_LEN {
            return Err(QuestionError::InvalidName);
        }
        for &b in label {
            name.push(presentation_char(b));
        }
        name.push('.');
        pos += 1 + label_len;
    }

    if name.is_empty() {
        name.push('.');
    }

    let fixed = buf.get(pos..pos + 4).ok_or(QuestionError::Truncated)?;
    let qtype = QueryType(u16::from_be_bytes([fixed[0], fixed[1]]));
    let qclass = QueryClass(u16::from_be_bytes([fixed[2], fixed[3]]));
    let end = pos + 4;

    Ok((
        Question {
            name,
            qtype,
            qclass,
            wire: buf[HEADER_LEN..end].to_vec(),
        },
        end,
    ))
}

fn presentation_char(b: u8) -> char {
    if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'*' {
        b as char
    } else {
        '?'
    }
}

/// Advances past a possibly compressed name in a resource record.
pub(crate) fn skip_name(buf: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let label_len = *buf.get(pos)? as usize;
        match label_len & 0xC0 {
            0x00 if label_len == 0 => return Some(pos + 1),
            0x00 => {
                pos += 1 + label_len;
                if pos > buf.len() {
                    return None;
                }
            }
            0xC0 => {
                buf.get(pos + 1)?;
                return Some(pos + 2);
            }
            _ => return None,
        }
    }
}
