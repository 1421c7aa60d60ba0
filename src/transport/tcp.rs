//! TCP (Transmission Control Protocol) header and pseudo-header
//!
//! Only the header shapes live here; connection handling belongs to higher layers.

use std::net::Ipv4Addr;

use crate::error::PacketError;
use crate::header::{Field, WireHeader};
use crate::network::{checksum, protocol};
use byteorder::{BigEndian, ByteOrder};

const TCP_HEADER_LEN: usize = 20;
const TCP_PSEUDO_HEADER_LEN: usize = 12;

/// TCP packet header structure
///
/// Represents the standard 20-byte TCP header as defined in RFC 793
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq_number: u32,
    pub ack_number: u32,
    pub data_offset_and_flags: u16, // Data offset (4 bits) + Reserved (3 bits) + Flags (9 bits)
    pub window_size: u16,
    pub checksum: u16,
    pub urgent_ptr: u16,
}

impl WireHeader for TcpHeader {
    const NAME: &'static str = "tcp_header";
    const LEN: usize = TCP_HEADER_LEN;
    const FIELDS: &'static [Field] = &[
        Field::new("src_port", 16),
        Field::new("dst_port", 16),
        Field::new("seq_number", 32),
        Field::new("ack_number", 32),
        Field::new("offset_control", 16),
        Field::new("window", 16),
        Field::new("checksum", 16),
        Field::new("urgent_ptr", 16),
    ];

    fn encode(&self, bytes: &mut [u8]) {
        BigEndian::write_u16(&mut bytes[0..2], self.src_port);
        BigEndian::write_u16(&mut bytes[2..4], self.dst_port);
        BigEndian::write_u32(&mut bytes[4..8], self.seq_number);
        BigEndian::write_u32(&mut bytes[8..12], self.ack_number);
        BigEndian::write_u16(&mut bytes[12..14], self.data_offset_and_flags);
        BigEndian::write_u16(&mut bytes[14..16], self.window_size);
        BigEndian::write_u16(&mut bytes[16..18], self.checksum);
        BigEndian::write_u16(&mut bytes[18..20], self.urgent_ptr);
    }

    fn decode(data: &[u8]) -> Self {
        TcpHeader {
            src_port: BigEndian::read_u16(&data[0..2]),
            dst_port: BigEndian::read_u16(&data[2..4]),
            seq_number: BigEndian::read_u32(&data[4..8]),
            ack_number: BigEndian::read_u32(&data[8..12]),
            data_offset_and_flags: BigEndian::read_u16(&data[12..14]),
            window_size: BigEndian::read_u16(&data[14..16]),
            checksum: BigEndian::read_u16(&data[16..18]),
            urgent_ptr: BigEndian::read_u16(&data[18..20]),
        }
    }
}

impl TcpHeader {
    pub fn to_bytes(&self) -> [u8; TCP_HEADER_LEN] {
        let mut bytes = [0u8; TCP_HEADER_LEN];
        self.encode(&mut bytes);
        bytes
    }
}

/// IPv4 pseudo-header prepended to a TCP segment for checksumming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpPseudoHeader {
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub reserved: u8,
    pub protocol: u8,
    pub tcp_len: u16,
}

impl WireHeader for TcpPseudoHeader {
    const NAME: &'static str = "tcp_pseudo_header";
    const LEN: usize = TCP_PSEUDO_HEADER_LEN;
    const FIELDS: &'static [Field] = &[
        Field::new("src_addr", 32),
        Field::new("dst_addr", 32),
        Field::new("reserved", 8),
        Field::new("protocol", 8),
        Field::new("tcp_len", 16),
    ];

    fn encode(&self, bytes: &mut [u8]) {
        BigEndian::write_u32(&mut bytes[0..4], u32::from(self.src_addr));
        BigEndian::write_u32(&mut bytes[4..8], u32::from(self.dst_addr));
        bytes[8] = self.reserved;
        bytes[9] = self.protocol;
        BigEndian::write_u16(&mut bytes[10..12], self.tcp_len);
    }

    fn decode(data: &[u8]) -> Self {
        TcpPseudoHeader {
            src_addr: Ipv4Addr::from(BigEndian::read_u32(&data[0..4])),
            dst_addr: Ipv4Addr::from(BigEndian::read_u32(&data[4..8])),
            reserved: data[8],
            protocol: data[9],
            tcp_len: BigEndian::read_u16(&data[10..12]),
        }
    }
}

impl TcpPseudoHeader {
    pub fn new(src_addr: Ipv4Addr, dst_addr: Ipv4Addr, tcp_len: u16) -> Self {
        TcpPseudoHeader {
            src_addr,
            dst_addr,
            reserved: 0,
            protocol: protocol::TCP,
            tcp_len,
        }
    }
}

/// Checksum of a TCP segment (header with zeroed checksum, plus payload)
///
/// Fails when the segment is too long for the pseudo-header length field.
pub fn tcp_checksum(
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
    segment: &[u8],
) -> Result<u16, PacketError> {
    let tcp_len =
        u16::try_from(segment.len()).map_err(|_| PacketError::LengthOverflow(segment.len()))?;
    let pseudo = TcpPseudoHeader::new(src_addr, dst_addr, tcp_len);

    let mut buf = Vec::with_capacity(TCP_PSEUDO_HEADER_LEN + segment.len());
    buf.extend_from_slice(&pseudo.pack());
    buf.extend_from_slice(segment);

    Ok(checksum(&buf))
}
