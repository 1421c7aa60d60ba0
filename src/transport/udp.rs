//! UDP (User Datagram Protocol) header

use std::net::Ipv4Addr;

use crate::error::PacketError;
use crate::header::{Field, WireHeader};
use crate::network::{checksum, protocol};
use byteorder::{BigEndian, ByteOrder};

/// UDP header length in bytes
const UDP_HEADER_LEN: usize = 8;

/// UDP packet header structure
///
/// Represents the standard 8-byte UDP header as defined in RFC 768
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub length: u16, // Length of UDP header and data
    pub checksum: u16,
}

impl WireHeader for UdpHeader {
    const NAME: &'static str = "udp_header";
    const LEN: usize = UDP_HEADER_LEN;
    const FIELDS: &'static [Field] = &[
        Field::new("src_port", 16),
        Field::new("dst_port", 16),
        Field::new("len", 16),
        Field::new("checksum", 16),
    ];

    fn encode(&self, bytes: &mut [u8]) {
        BigEndian::write_u16(&mut bytes[0..2], self.src_port);
        BigEndian::write_u16(&mut bytes[2..4], self.dst_port);
        BigEndian::write_u16(&mut bytes[4..6], self.length);
        BigEndian::write_u16(&mut bytes[6..8], self.checksum);
    }

    fn decode(data: &[u8]) -> Self {
        UdpHeader {
            src_port: BigEndian::read_u16(&data[0..2]),
            dst_port: BigEndian::read_u16(&data[2..4]),
            length: BigEndian::read_u16(&data[4..6]),
            checksum: BigEndian::read_u16(&data[6..8]),
        }
    }
}

impl UdpHeader {
    pub fn to_bytes(&self) -> [u8; UDP_HEADER_LEN] {
        let mut bytes = [0u8; UDP_HEADER_LEN];
        self.encode(&mut bytes);
        bytes
    }
}

/// Calculate UDP checksum with the IPv4 pseudo header
///
/// `datagram` is the UDP header (checksum zeroed) followed by its payload.
pub fn udp_checksum(
    src_ip: Ipv4Addr,
    dst_ip: Ipv4Addr,
    datagram: &[u8],
) -> Result<u16, PacketError> {
    let udp_len =
        u16::try_from(datagram.len()).map_err(|_| PacketError::LengthOverflow(datagram.len()))?;

    // src_ip(4) + dst_ip(4) + zero(1) + protocol(1) + udp_len(2) = 12 bytes
    let mut buf = Vec::with_capacity(12 + datagram.len());
    buf.extend_from_slice(&src_ip.octets());
    buf.extend_from_slice(&dst_ip.octets());
    buf.push(0);
    buf.push(protocol::UDP);
    buf.extend_from_slice(&udp_len.to_be_bytes());
    buf.extend_from_slice(datagram);

    Ok(checksum(&buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let header = UdpHeader {
            src_port: 5353,
            dst_port: 53,
            length: 8,
            checksum: 0xFFFF,
        };
        assert_eq!(header.to_bytes(), [0x14, 0xE9, 0x00, 0x35, 0x00, 0x08, 0xFF, 0xFF]);
        assert_eq!(UdpHeader::unpack(&header.to_bytes()), Ok(header));
    }

    #[test]
    fn datagram_checksum_verifies() {
        let src = Ipv4Addr::new(192, 168, 1, 10);
        let dst = Ipv4Addr::new(192, 168, 1, 1);
        let payload = b"ping";

        let mut header = UdpHeader {
            src_port: 40000,
            dst_port: 7,
            length: (UDP_HEADER_LEN + payload.len()) as u16,
            checksum: 0,
        };
        let mut datagram = header.to_bytes().to_vec();
        datagram.extend_from_slice(payload);
        header.checksum = udp_checksum(src, dst, &datagram).unwrap();
        datagram[6..8].copy_from_slice(&header.checksum.to_be_bytes());

        assert_eq!(udp_checksum(src, dst, &datagram), Ok(0));
    }

    #[test]
    fn oversized_datagram_is_rejected() {
        let any = Ipv4Addr::UNSPECIFIED;
        assert_eq!(
            udp_checksum(any, any, &vec![0u8; 70_000]),
            Err(PacketError::LengthOverflow(70_000))
        );
    }
}
