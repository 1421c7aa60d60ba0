//! ICMP (Internet Control Message Protocol) header
//!
//! Only the echo layout is modelled: type, code, checksum, identifier and
//! sequence number. Other message types reuse the last four bytes differently.

use crate::header::{Field, WireHeader};
use crate::network::checksum;
use byteorder::{BigEndian, ByteOrder};

/// ICMP header length in bytes
const ICMP_HEADER_LEN: usize = 8;

/// ICMP message types
pub const ICMP_TYPE_ECHO_REPLY: u8 = 0;
pub const ICMP_TYPE_ECHO_REQUEST: u8 = 8;

/// ICMP packet header structure
///
/// Represents the standard 8-byte ICMP header as defined in RFC 792
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeader {
    pub msg_type: u8,
    pub msg_code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: u16,
}

impl WireHeader for IcmpHeader {
    const NAME: &'static str = "icmp_header";
    const LEN: usize = ICMP_HEADER_LEN;
    const FIELDS: &'static [Field] = &[
        Field::new("type", 8),
        Field::new("code", 8),
        Field::new("checksum", 16),
        Field::new("identifier", 16),
        Field::new("sequence", 16),
    ];

    fn encode(&self, bytes: &mut [u8]) {
        bytes[0] = self.msg_type;
        bytes[1] = self.msg_code;
        BigEndian::write_u16(&mut bytes[2..4], self.checksum);
        BigEndian::write_u16(&mut bytes[4..6], self.identifier);
        BigEndian::write_u16(&mut bytes[6..8], self.sequence);
    }

    fn decode(data: &[u8]) -> Self {
        IcmpHeader {
            msg_type: data[0],
            msg_code: data[1],
            checksum: BigEndian::read_u16(&data[2..4]),
            identifier: BigEndian::read_u16(&data[4..6]),
            sequence: BigEndian::read_u16(&data[6..8]),
        }
    }
}

impl IcmpHeader {
    /// Echo request with a zero checksum
    pub fn echo_request(identifier: u16, sequence: u16) -> Self {
        IcmpHeader {
            msg_type: ICMP_TYPE_ECHO_REQUEST,
            msg_code: 0,
            checksum: 0,
            identifier,
            sequence,
        }
    }

    /// Convert ICMP header to bytes
    pub fn to_bytes(&self) -> [u8; ICMP_HEADER_LEN] {
        let mut bytes = [0u8; ICMP_HEADER_LEN];
        self.encode(&mut bytes);
        bytes
    }

    /// Compute the checksum over the populated header and store it
    ///
    /// The checksum field must be zero beforehand.
    pub fn stamp_checksum(&mut self) {
        debug_assert_eq!(self.checksum, 0);
        self.checksum = checksum(&self.to_bytes());
    }

    pub fn is_echo_request(&self) -> bool {
        self.msg_type == ICMP_TYPE_ECHO_REQUEST
    }

    pub fn is_echo_reply(&self) -> bool {
        self.msg_type == ICMP_TYPE_ECHO_REPLY
    }
}
