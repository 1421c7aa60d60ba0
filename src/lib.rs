//! Wire-level toolkit for the firewall
//!
//! This library provides the pieces that touch untrusted bytes directly:
//! - DNS domain name encoding and decoding, including compression pointers
//! - Fixed-layout IPv4, TCP, UDP, ICMP and DNS headers in network byte order
//! - The Internet checksum
//! - ICMP echo reachability probing over a raw socket
//! - Authentication of local socket peers from kernel credentials
//!
//! Linux only: probing uses raw sockets and authentication reads `SCM_CREDENTIALS`.

pub mod auth;
pub mod config;
pub mod convert;
pub mod dns;
pub mod error;
pub mod header;
pub mod network;
pub mod probe;
pub mod transport;

// Re-export commonly used types
pub use auth::{authenticate_peer, AncillaryMessage, PeerAuthenticator, PeerCredential};
pub use config::{AuthConfig, ProbeConfig};
pub use dns::{decode_name, encode_name, skip_name, DecodedName};
pub use error::{ConvertError, PacketError, ProbeError};
pub use header::{pack_header, unpack_header, AnyHeader, HeaderKind, WireHeader};
pub use network::checksum;
pub use probe::{probe_reachable, IcmpProber, ProbeSummary};
