//! Fixed-layout protocol headers.
//!
//! Every header type carries one static field table describing its wire layout
//! in order, with widths in bits. Packing always emits exactly [`WireHeader::LEN`]
//! bytes in network byte order; unpacking reads the first `LEN` bytes of the
//! input and ignores whatever follows (a payload or the next record). Field
//! values are never checked for meaning, that is left to the caller.

use crate::dns::{DnsHeader, ResourceRecordHeader};
use crate::error::PacketError;
use crate::network::{IcmpHeader, Ipv4Header};
use crate::transport::{TcpHeader, TcpPseudoHeader, UdpHeader};

/// One named field of a header layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub bits: u16,
}

impl Field {
    pub const fn new(name: &'static str, bits: u16) -> Self {
        Field { name, bits }
    }
}

/// A header with a fixed, statically known wire layout.
pub trait WireHeader: Sized {
    const NAME: &'static str;
    /// Total wire width in bytes.
    const LEN: usize;
    /// Field layout in wire order.
    const FIELDS: &'static [Field];

    /// Write the header into `out`, which is exactly `LEN` bytes long.
    fn encode(&self, out: &mut [u8]);

    /// Read the header from `data`, which is exactly `LEN` bytes long.
    fn decode(data: &[u8]) -> Self;

    fn pack(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::LEN];
        self.encode(&mut out);
        out
    }

    fn unpack(data: &[u8]) -> Result<Self, PacketError> {
        ensure_len(data, Self::LEN)?;
        Ok(Self::decode(&data[..Self::LEN]))
    }
}

pub(crate) fn ensure_len(data: &[u8], needed: usize) -> Result<(), PacketError> {
    if data.len() < needed {
        return Err(PacketError::Truncated {
            needed,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Selector for the dynamic [`pack_header`] / [`unpack_header`] entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    Ipv4,
    Tcp,
    TcpPseudo,
    Udp,
    Icmp,
    DnsResourceRecord,
    Dns,
}

impl HeaderKind {
    pub const ALL: [HeaderKind; 7] = [
        HeaderKind::Ipv4,
        HeaderKind::Tcp,
        HeaderKind::TcpPseudo,
        HeaderKind::Udp,
        HeaderKind::Icmp,
        HeaderKind::DnsResourceRecord,
        HeaderKind::Dns,
    ];

    pub fn len(self) -> usize {
        match self {
            HeaderKind::Ipv4 => Ipv4Header::LEN,
            HeaderKind::Tcp => TcpHeader::LEN,
            HeaderKind::TcpPseudo => TcpPseudoHeader::LEN,
            HeaderKind::Udp => UdpHeader::LEN,
            HeaderKind::Icmp => IcmpHeader::LEN,
            HeaderKind::DnsResourceRecord => ResourceRecordHeader::LEN,
            HeaderKind::Dns => DnsHeader::LEN,
        }
    }

    pub fn fields(self) -> &'static [Field] {
        match self {
            HeaderKind::Ipv4 => Ipv4Header::FIELDS,
            HeaderKind::Tcp => TcpHeader::FIELDS,
            HeaderKind::TcpPseudo => TcpPseudoHeader::FIELDS,
            HeaderKind::Udp => UdpHeader::FIELDS,
            HeaderKind::Icmp => IcmpHeader::FIELDS,
            HeaderKind::DnsResourceRecord => ResourceRecordHeader::FIELDS,
            HeaderKind::Dns => DnsHeader::FIELDS,
        }
    }
}

/// A header of any supported kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyHeader {
    Ipv4(Ipv4Header),
    Tcp(TcpHeader),
    TcpPseudo(TcpPseudoHeader),
    Udp(UdpHeader),
    Icmp(IcmpHeader),
    DnsResourceRecord(ResourceRecordHeader),
    Dns(DnsHeader),
}

impl AnyHeader {
    pub fn kind(&self) -> HeaderKind {
        match self {
            AnyHeader::Ipv4(_) => HeaderKind::Ipv4,
            AnyHeader::Tcp(_) => HeaderKind::Tcp,
            AnyHeader::TcpPseudo(_) => HeaderKind::TcpPseudo,
            AnyHeader::Udp(_) => HeaderKind::Udp,
            AnyHeader::Icmp(_) => HeaderKind::Icmp,
            AnyHeader::DnsResourceRecord(_) => HeaderKind::DnsResourceRecord,
            AnyHeader::Dns(_) => HeaderKind::Dns,
        }
    }
}

pub fn pack_header(header: &AnyHeader) -> Vec<u8> {
    match header {
        AnyHeader::Ipv4(h) => h.pack(),
        AnyHeader::Tcp(h) => h.pack(),
        AnyHeader::TcpPseudo(h) => h.pack(),
        AnyHeader::Udp(h) => h.pack(),
        AnyHeader::Icmp(h) => h.pack(),
        AnyHeader::DnsResourceRecord(h) => h.pack(),
        AnyHeader::Dns(h) => h.pack(),
    }
}

pub fn unpack_header(kind: HeaderKind, data: &[u8]) -> Result<AnyHeader, PacketError> {
    Ok(match kind {
        HeaderKind::Ipv4 => AnyHeader::Ipv4(Ipv4Header::unpack(data)?),
        HeaderKind::Tcp => AnyHeader::Tcp(TcpHeader::unpack(data)?),
        HeaderKind::TcpPseudo => AnyHeader::TcpPseudo(TcpPseudoHeader::unpack(data)?),
        HeaderKind::Udp => AnyHeader::Udp(UdpHeader::unpack(data)?),
        HeaderKind::Icmp => AnyHeader::Icmp(IcmpHeader::unpack(data)?),
        HeaderKind::DnsResourceRecord => {
            AnyHeader::DnsResourceRecord(ResourceRecordHeader::unpack(data)?)
        }
        HeaderKind::Dns => AnyHeader::Dns(DnsHeader::unpack(data)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    /// Read `bits` bits starting at bit `offset`, most significant first.
    fn read_bits(bytes: &[u8], offset: usize, bits: usize) -> u64 {
        (offset..offset + bits).fold(0u64, |acc, bit| {
            let set = (bytes[bit / 8] >> (7 - bit % 8)) & 1;
            (acc << 1) | u64::from(set)
        })
    }

    /// One header per kind with a distinct marker in every field, plus the
    /// markers in field table order.
    fn marked_headers() -> Vec<(AnyHeader, Vec<u64>)> {
        vec![
            (
                AnyHeader::Ipv4(Ipv4Header {
                    version: 0x4,
                    ihl: 0xA,
                    tos: 0x11,
                    total_len: 0x2233,
                    id: 0x4455,
                    flags_frag_offset: 0x6677,
                    ttl: 0x88,
                    protocol: 0x99,
                    checksum: 0xAABB,
                    src_addr: Ipv4Addr::new(0x0A, 0x0B, 0x0C, 0x0D),
                    dst_addr: Ipv4Addr::new(0x1A, 0x1B, 0x1C, 0x1D),
                }),
                vec![
                    0x4, 0xA, 0x11, 0x2233, 0x4455, 0x6677, 0x88, 0x99, 0xAABB, 0x0A0B0C0D,
                    0x1A1B1C1D,
                ],
            ),
            (
                AnyHeader::Tcp(TcpHeader {
                    src_port: 0x0102,
                    dst_port: 0x0304,
                    seq_number: 0x05060708,
                    ack_number: 0x090A0B0C,
                    data_offset_and_flags: 0x5012,
                    window_size: 0x0D0E,
                    checksum: 0x0F10,
                    urgent_ptr: 0x1112,
                }),
                vec![0x0102, 0x0304, 0x05060708, 0x090A0B0C, 0x5012, 0x0D0E, 0x0F10, 0x1112],
            ),
            (
                AnyHeader::TcpPseudo(TcpPseudoHeader {
                    src_addr: Ipv4Addr::new(1, 2, 3, 4),
                    dst_addr: Ipv4Addr::new(5, 6, 7, 8),
                    reserved: 0x09,
                    protocol: 0x0A,
                    tcp_len: 0x0B0C,
                }),
                vec![0x01020304, 0x05060708, 0x09, 0x0A, 0x0B0C],
            ),
            (
                AnyHeader::Udp(UdpHeader {
                    src_port: 0x1111,
                    dst_port: 0x2222,
                    length: 0x3333,
                    checksum: 0x4444,
                }),
                vec![0x1111, 0x2222, 0x3333, 0x4444],
            ),
            (
                AnyHeader::Icmp(IcmpHeader {
                    msg_type: 0x08,
                    msg_code: 0x01,
                    checksum: 0x0203,
                    identifier: 0x0405,
                    sequence: 0x0607,
                }),
                vec![0x08, 0x01, 0x0203, 0x0405, 0x0607],
            ),
            (
                AnyHeader::DnsResourceRecord(ResourceRecordHeader {
                    name_ptr: 0xC00C,
                    rr_type: 0x0102,
                    class: 0x0304,
                    ttl: 0x05060708,
                    rd_len: 0x090A,
                    rd_data: 0x0B0C0D0E,
                }),
                vec![0xC00C, 0x0102, 0x0304, 0x05060708, 0x090A, 0x0B0C0D0E],
            ),
            (
                AnyHeader::Dns(DnsHeader {
                    id: 0x0102,
                    flags: 0x0304,
                    qd_count: 0x0506,
                    an_count: 0x0708,
                    ns_count: 0x090A,
                    ar_count: 0x0B0C,
                }),
                vec![0x0102, 0x0304, 0x0506, 0x0708, 0x090A, 0x0B0C],
            ),
        ]
    }

    #[test]
    fn field_tables_follow_the_codecs() {
        let headers = marked_headers();
        assert_eq!(headers.len(), HeaderKind::ALL.len());

        for (header, markers) in headers {
            let kind = header.kind();
            let bytes = pack_header(&header);
            assert_eq!(kind.fields().len(), markers.len(), "{kind:?}");

            let mut offset = 0;
            for (field, marker) in kind.fields().iter().zip(markers) {
                let bits = field.bits as usize;
                assert_eq!(
                    read_bits(&bytes, offset, bits),
                    marker,
                    "{kind:?} field {}",
                    field.name
                );
                offset += bits;
            }
            assert_eq!(offset, kind.len() * 8, "{kind:?}");
        }
    }

    #[test]
    fn field_tables_match_lengths() {
        for kind in HeaderKind::ALL {
            let bits: usize = kind.fields().iter().map(|f| f.bits as usize).sum();
            assert_eq!(bits, kind.len() * 8, "{kind:?}");
        }
    }

    #[test]
    fn short_input_is_truncated() {
        for kind in HeaderKind::ALL {
            let data = vec![0u8; kind.len() - 1];
            assert_eq!(
                unpack_header(kind, &data),
                Err(PacketError::Truncated {
                    needed: kind.len(),
                    actual: kind.len() - 1,
                })
            );
        }
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let udp = UdpHeader {
            src_port: 53,
            dst_port: 40000,
            length: 12,
            checksum: 0,
        };
        let mut data = pack_header(&AnyHeader::Udp(udp));
        data.extend_from_slice(b"data");

        assert_eq!(unpack_header(HeaderKind::Udp, &data), Ok(AnyHeader::Udp(udp)));
    }

    #[test]
    fn pack_width_is_fixed() {
        for kind in HeaderKind::ALL {
            let data = vec![0xA5u8; kind.len()];
            let header = unpack_header(kind, &data).unwrap();
            assert_eq!(header.kind(), kind);
            assert_eq!(pack_header(&header), data);
        }
    }
}
