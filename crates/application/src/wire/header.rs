pub const HEADER_LEN: usize = 12;

pub const FLAG_QR: u16 = 0x8000;
pub const FLAG_AA: u16 = 0x0400;
pub const FLAG_TC: u16 = 0x0200;
pub const FLAG_RD: u16 = 0x0100;
pub const FLAG_RA: u16 = 0x0080;
pub const FLAG_AD: u16 = 0x0020;
pub const FLAG_CD: u16 = 0x0010;

const OPCODE_MASK: u16 = 0x7800;
const RCODE_MASK: u16 = 0x000F;

pub const OPCODE_QUERY: u8 = 0;

/// Fixed 12-byte DNS message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub flags: u16,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        let word = |at: usize| u16::from_be_bytes([buf[at], buf[at + 1]]);
        Some(Self {
            id: word(0),
            flags: word(2),
            qdcount: word(4),
            ancount: word(6),
            nscount: word(8),
            arcount: word(10),
        })
    }

    pub fn is_response(&self) -> bool {
        self.flags & FLAG_QR != 0
    }

    pub fn opcode(&self) -> u8 {
        ((self.flags & OPCODE_MASK) >> 11) as u8
    }

    pub fn rcode(&self) -> u8 {
        (self.flags & RCODE_MASK) as u8
    }

    pub fn truncated(&self) -> bool {
        self.flags & FLAG_TC != 0
    }

    pub fn recursion_desired(&self) -> bool {
        self.flags & FLAG_RD != 0
    }

    pub fn checking_disabled(&self) -> bool {
        self.flags & FLAG_CD != 0
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        for word in [
            self.id,
            self.flags,
            self.qdcount,
            self.ancount,
            self.nscount,
            self.arcount,
        ] {
            out.extend_from_slice(&word.to_be_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reads_all_fields() {
        let buf = [0xab, 0xcd, 0x81, 0x10, 0, 1, 0, 2, 0, 3, 0, 4];
        let header = Header::parse(&buf).unwrap();
        assert_eq!(header.id, 0xabcd);
        assert!(header.is_response());
        assert!(header.recursion_desired());
        assert!(header.checking_disabled());
        assert_eq!(header.opcode(), 0);
        assert_eq!(
            (header.qdcount, header.ancount, header.nscount, header.arcount),
            (1, 2, 3, 4)
        );
    }

    #[test]
    fn test_parse_short_buffer_is_none() {
        assert!(Header::parse(&[0; 11]).is_none());
    }

    #[test]
    fn test_opcode_extraction() {
        let buf = [0, 0, 0x28, 0, 0, 1, 0, 0, 0, 0, 0, 0];
        assert_eq!(Header::parse(&buf).unwrap().opcode(), 5);
    }
}
