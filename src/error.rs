//! Error types shared by the codecs, conversions and the prober.

use thiserror::Error;

/// Failure to decode or encode wire data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("truncated input: needed {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("invalid label length byte {0:#04x}")]
    InvalidLabel(u8),

    #[error("name scan exceeded the hop limit")]
    PointerLoop,

    #[error("compression pointer at {at} does not point backward (target {target})")]
    ForwardPointer { at: usize, target: usize },

    #[error("compression pointer {0:#06x} points into the message header")]
    PointerIntoHeader(u16),

    #[error("label of {0} bytes exceeds 63")]
    LabelTooLong(usize),

    #[error("name of {0} wire bytes exceeds 255")]
    NameTooLong(usize),

    #[error("name is not valid utf-8")]
    NotUtf8,

    #[error("{0} bytes do not fit a 16-bit length field")]
    LengthOverflow(usize),
}

/// Failure of one of the primitive conversions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("invalid mac address: {0:?}")]
    InvalidMac(String),

    #[error("cidr prefix {0} is greater than 32")]
    InvalidPrefix(u8),

    #[error("value {value} does not fit in {width} bytes")]
    Overflow { value: u64, width: usize },

    #[error("{0} bytes do not fit in a 64-bit integer")]
    TooWide(usize),
}

/// Failure to set up a reachability prober.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to open raw icmp socket: {0}")]
    Open(#[source] std::io::Error),

    #[error("failed to configure raw icmp socket: {0}")]
    Configure(#[source] std::io::Error),
}
