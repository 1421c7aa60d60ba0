//! Network layer headers
//!
//! This module contains the network layer header layouts:
//! - IPv4: Internet Protocol version 4
//! - ICMP: Internet Control Message Protocol
//!
//! and the Internet checksum shared by every layer.

pub mod icmp;
pub mod ipv4;

// Re-export commonly used items
pub use icmp::{IcmpHeader, ICMP_TYPE_ECHO_REPLY, ICMP_TYPE_ECHO_REQUEST};
pub use ipv4::{protocol, Ipv4Header};

use byteorder::{BigEndian, ByteOrder};

/// Calculate Internet checksum
///
/// Sums the buffer as big-endian 16-bit words, folding carries back in, and
/// returns the one's complement of the result. An odd trailing byte is the high
/// byte of a zero-padded word.
///
/// To stamp a header, zero its checksum field, compute, then write the result
/// back. A stamped buffer checksums to zero.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum = 0u64;

    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum += BigEndian::read_u16(word) as u64;
    }
    if let [last] = words.remainder() {
        sum += (*last as u64) << 8;
    }

    while (sum >> 16) > 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !sum as u16
}
