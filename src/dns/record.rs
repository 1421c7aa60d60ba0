//! DNS message header and the fixed-size resource record layout.

use std::net::Ipv4Addr;

use crate::config::DNS_HEADER_LEN;
use crate::header::{Field, WireHeader};
use byteorder::{BigEndian, ByteOrder};

const FLAG_RD: u16 = 1 << 8;
const FLAG_CD: u16 = 1 << 4;

/// Resource record types used with [`ResourceRecordHeader`].
pub mod rr_type {
    pub const A: u16 = 1;
    pub const CNAME: u16 = 5;
    pub const PTR: u16 = 12;
}

pub const CLASS_IN: u16 = 1;

/// DNS message header (RFC 1035 section 4.1.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub flags: u16,
    pub qd_count: u16,
    pub an_count: u16,
    pub ns_count: u16,
    pub ar_count: u16,
}

impl WireHeader for DnsHeader {
    const NAME: &'static str = "dns_header";
    const LEN: usize = DNS_HEADER_LEN;
    const FIELDS: &'static [Field] = &[
        Field::new("id", 16),
        Field::new("flags", 16),
        Field::new("qd_count", 16),
        Field::new("an_count", 16),
        Field::new("ns_count", 16),
        Field::new("ar_count", 16),
    ];

    fn encode(&self, bytes: &mut [u8]) {
        BigEndian::write_u16(&mut bytes[0..2], self.id);
        BigEndian::write_u16(&mut bytes[2..4], self.flags);
        BigEndian::write_u16(&mut bytes[4..6], self.qd_count);
        BigEndian::write_u16(&mut bytes[6..8], self.an_count);
        BigEndian::write_u16(&mut bytes[8..10], self.ns_count);
        BigEndian::write_u16(&mut bytes[10..12], self.ar_count);
    }

    fn decode(data: &[u8]) -> Self {
        DnsHeader {
            id: BigEndian::read_u16(&data[0..2]),
            flags: BigEndian::read_u16(&data[2..4]),
            qd_count: BigEndian::read_u16(&data[4..6]),
            an_count: BigEndian::read_u16(&data[6..8]),
            ns_count: BigEndian::read_u16(&data[8..10]),
            ar_count: BigEndian::read_u16(&data[10..12]),
        }
    }
}

impl DnsHeader {
    /// Header for a single-question recursive query
    ///
    /// `additional` is the additional record count (e.g. 1 when an OPT record
    /// follows). `checking_disabled` sets the CD bit.
    pub fn query(id: u16, additional: u16, checking_disabled: bool) -> Self {
        let mut flags = FLAG_RD;
        if checking_disabled {
            flags |= FLAG_CD;
        }

        DnsHeader {
            id,
            flags,
            qd_count: 1,
            an_count: 0,
            ns_count: 0,
            ar_count: additional,
        }
    }

    pub fn recursion_desired(&self) -> bool {
        (self.flags & FLAG_RD) != 0
    }

    pub fn checking_disabled(&self) -> bool {
        (self.flags & FLAG_CD) != 0
    }
}

/// Answer record whose owner name is a compression pointer and whose data is
/// a single IPv4 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRecordHeader {
    pub name_ptr: u16,
    pub rr_type: u16,
    pub class: u16,
    pub ttl: u32,
    pub rd_len: u16,
    pub rd_data: u32,
}

impl WireHeader for ResourceRecordHeader {
    const NAME: &'static str = "resource_record";
    const LEN: usize = 16;
    const FIELDS: &'static [Field] = &[
        Field::new("ptr", 16),
        Field::new("type", 16),
        Field::new("class", 16),
        Field::new("ttl", 32),
        Field::new("rd_len", 16),
        Field::new("rd_data", 32),
    ];

    fn encode(&self, bytes: &mut [u8]) {
        BigEndian::write_u16(&mut bytes[0..2], self.name_ptr);
        BigEndian::write_u16(&mut bytes[2..4], self.rr_type);
        BigEndian::write_u16(&mut bytes[4..6], self.class);
        BigEndian::write_u32(&mut bytes[6..10], self.ttl);
        BigEndian::write_u16(&mut bytes[10..12], self.rd_len);
        BigEndian::write_u32(&mut bytes[12..16], self.rd_data);
    }

    fn decode(data: &[u8]) -> Self {
        ResourceRecordHeader {
            name_ptr: BigEndian::read_u16(&data[0..2]),
            rr_type: BigEndian::read_u16(&data[2..4]),
            class: BigEndian::read_u16(&data[4..6]),
            ttl: BigEndian::read_u32(&data[6..10]),
            rd_len: BigEndian::read_u16(&data[10..12]),
            rd_data: BigEndian::read_u32(&data[12..16]),
        }
    }
}

impl ResourceRecordHeader {
    /// A record pointing back at the name stored at message offset `name_offset`
    pub fn a_record(name_offset: u16, ttl: u32, addr: Ipv4Addr) -> Self {
        ResourceRecordHeader {
            name_ptr: 0xC000 | (name_offset & 0x3FFF),
            rr_type: rr_type::A,
            class: CLASS_IN,
            ttl,
            rd_len: 4,
            rd_data: u32::from(addr),
        }
    }

    pub fn address(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.rd_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_header_flags() {
        let header = DnsHeader::query(0xBEEF, 1, true);
        assert_eq!(
            header.pack(),
            vec![0xBE, 0xEF, 0x01, 0x10, 0, 1, 0, 0, 0, 0, 0, 1]
        );
        assert!(header.recursion_desired());
        assert!(header.checking_disabled());

        let plain = DnsHeader::query(1, 0, false);
        assert_eq!(plain.flags, 0x0100);
        assert!(!plain.checking_disabled());
    }

    #[test]
    fn a_record_layout() {
        let record = ResourceRecordHeader::a_record(12, 300, Ipv4Addr::new(10, 1, 2, 3));
        let bytes = record.pack();
        assert_eq!(
            bytes,
            vec![0xC0, 0x0C, 0, 1, 0, 1, 0, 0, 0x01, 0x2C, 0, 4, 10, 1, 2, 3]
        );

        let parsed = ResourceRecordHeader::unpack(&bytes).unwrap();
        assert_eq!(parsed.address(), Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(parsed.ttl, 300);
    }
}
