//! Transport layer headers
//!
//! This module contains the transport layer header layouts:
//! - TCP: Transmission Control Protocol, with its IPv4 pseudo-header
//! - UDP: User Datagram Protocol

pub mod tcp;
pub mod udp;

// Re-export commonly used items
pub use tcp::{tcp_checksum, TcpHeader, TcpPseudoHeader};
pub use udp::{udp_checksum, UdpHeader};
