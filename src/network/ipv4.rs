//! IPv4 header layout
//!
//! This module provides IPv4 header packing and unpacking and checksum helpers.
//! Unpacking does not look at the version, length or checksum fields; a raw
//! socket hands us whatever the kernel received and the caller decides what to
//! trust.

use std::net::Ipv4Addr;

use crate::error::PacketError;
use crate::header::{Field, WireHeader};
use crate::network::checksum;
use byteorder::{BigEndian, ByteOrder};

const IPV4_HEADER_LEN: usize = 20;
const IPV4_VERSION: u8 = 4;
const DEFAULT_IHL: u8 = 5; // 5 * 4 = 20 bytes (standard header length)
const DEFAULT_TTL: u8 = 64;

/// IPv4 packet header structure
///
/// Represents the standard 20-byte IPv4 header as defined in RFC 791
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    pub ihl: u8, // Internet Header Length, in 32-bit words
    pub tos: u8, // Type of Service
    pub total_len: u16,
    pub id: u16,
    pub flags_frag_offset: u16, // Flags and Fragment Offset
    pub ttl: u8,                // Time to Live
    pub protocol: u8,           // Next Protocol
    pub checksum: u16,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
}

impl WireHeader for Ipv4Header {
    const NAME: &'static str = "ip_header";
    const LEN: usize = IPV4_HEADER_LEN;
    const FIELDS: &'static [Field] = &[
        Field::new("version", 4),
        Field::new("ihl", 4),
        Field::new("tos", 8),
        Field::new("total_len", 16),
        Field::new("id", 16),
        Field::new("flags_frag_offset", 16),
        Field::new("ttl", 8),
        Field::new("protocol", 8),
        Field::new("checksum", 16),
        Field::new("src_addr", 32),
        Field::new("dst_addr", 32),
    ];

    fn encode(&self, bytes: &mut [u8]) {
        bytes[0] = (self.version << 4) | (self.ihl & 0x0F);
        bytes[1] = self.tos;
        BigEndian::write_u16(&mut bytes[2..4], self.total_len);
        BigEndian::write_u16(&mut bytes[4..6], self.id);
        BigEndian::write_u16(&mut bytes[6..8], self.flags_frag_offset);
        bytes[8] = self.ttl;
        bytes[9] = self.protocol;
        BigEndian::write_u16(&mut bytes[10..12], self.checksum);
        BigEndian::write_u32(&mut bytes[12..16], u32::from(self.src_addr));
        BigEndian::write_u32(&mut bytes[16..20], u32::from(self.dst_addr));
    }

    fn decode(data: &[u8]) -> Self {
        Ipv4Header {
            version: data[0] >> 4,
            ihl: data[0] & 0x0F,
            tos: data[1],
            total_len: BigEndian::read_u16(&data[2..4]),
            id: BigEndian::read_u16(&data[4..6]),
            flags_frag_offset: BigEndian::read_u16(&data[6..8]),
            ttl: data[8],
            protocol: data[9],
            checksum: BigEndian::read_u16(&data[10..12]),
            src_addr: Ipv4Addr::from(BigEndian::read_u32(&data[12..16])),
            dst_addr: Ipv4Addr::from(BigEndian::read_u32(&data[16..20])),
        }
    }
}

impl Ipv4Header {
    /// Create an option-less IPv4 header carrying `payload_len` bytes
    ///
    /// The checksum is left at zero; call [`Ipv4Header::update_checksum`] once
    /// every field is final. Fails when the total length would not fit 16 bits.
    pub fn new_simple(
        protocol: u8,
        src_addr: Ipv4Addr,
        dst_addr: Ipv4Addr,
        payload_len: u16,
    ) -> Result<Self, PacketError> {
        let total_len = (IPV4_HEADER_LEN as u16)
            .checked_add(payload_len)
            .ok_or(PacketError::LengthOverflow(IPV4_HEADER_LEN + payload_len as usize))?;

        Ok(Ipv4Header {
            version: IPV4_VERSION,
            ihl: DEFAULT_IHL,
            tos: 0,
            total_len,
            id: 0,
            flags_frag_offset: 0,
            ttl: DEFAULT_TTL,
            protocol,
            checksum: 0,
            src_addr,
            dst_addr,
        })
    }

    /// Convert IPv4 header to bytes
    pub fn to_bytes(&self) -> [u8; IPV4_HEADER_LEN] {
        let mut bytes = [0u8; IPV4_HEADER_LEN];
        self.encode(&mut bytes);
        bytes
    }

    /// Header length in bytes, as announced by the IHL field
    pub fn header_len(&self) -> usize {
        (self.ihl as usize) * 4
    }

    /// Checksum of this header with the checksum field treated as zero
    pub fn compute_checksum(&self) -> u16 {
        let mut bytes = self.to_bytes();
        bytes[10..12].copy_from_slice(&[0, 0]);
        checksum(&bytes)
    }

    /// Recalculate and store the checksum field
    pub fn update_checksum(&mut self) {
        self.checksum = self.compute_checksum();
    }

    pub fn checksum_valid(&self) -> bool {
        self.compute_checksum() == self.checksum
    }
}

/// Offset of the payload in a raw IPv4 datagram, taken from the low nibble of
/// the first byte.
pub fn payload_offset(datagram: &[u8]) -> Option<usize> {
    datagram.first().map(|b| ((b & 0x0F) as usize) * 4)
}

/// IPv4 protocol constants
pub mod protocol {
    pub const ICMP: u8 = 1;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
}
