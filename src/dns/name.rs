//! Domain name wire codec.
//!
//! Decoding works on the DNS message *body*: the buffer handed in starts right
//! after the 12-byte message header. Compression pointers carry offsets from the
//! start of the full message, so every pointer target is shifted down by
//! [`DNS_HEADER_LEN`] before it is used as an index into the body.
//!
//! A pointer must land strictly before its own position. Labels are bounded by
//! the 255-byte name limit and pointer hops by [`MAX_POINTER_HOPS`], so a cycle
//! through labels ends in [`PacketError::NameTooLong`] and an overlong pointer
//! chain in [`PacketError::PointerLoop`] instead of spinning.

use crate::config::{DNS_HEADER_LEN, MAX_LABEL_LEN, MAX_NAME_LEN, MAX_POINTER_HOPS};
use crate::error::PacketError;
use crate::header::ensure_len;

const POINTER_MASK: u16 = 0x3FFF;

/// A name read out of a DNS message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedName {
    /// Offset just past the name in the caller's buffer.
    pub offset: usize,
    /// Dotted text form, without a trailing dot. The root name is empty.
    pub name: String,
    /// The name had exactly one label (e.g. `localhost`).
    pub single_label: bool,
}

/// Encode a dotted name into label-sequence wire format.
///
/// Empty parts are skipped, so a trailing dot is accepted. The empty name
/// encodes to nothing at all, with no root terminator.
pub fn encode_name(name: &str) -> Result<Vec<u8>, PacketError> {
    let mut out = Vec::with_capacity(name.len() + 2);

    for label in name.split('.').filter(|l| !l.is_empty()) {
        if label.len() > MAX_LABEL_LEN {
            return Err(PacketError::LabelTooLong(label.len()));
        }
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }

    if !name.is_empty() {
        out.push(0);
    }
    if out.len() > MAX_NAME_LEN {
        return Err(PacketError::NameTooLong(out.len()));
    }

    Ok(out)
}

/// Decode the name starting at `offset` in a DNS message body.
pub fn decode_name(body: &[u8], offset: usize) -> Result<DecodedName, PacketError> {
    let mut name = Vec::new();
    let (end, labels) = scan_name(body, offset, Some(&mut name))?;

    // drop the trailing separator
    name.pop();
    let name = String::from_utf8(name).map_err(|_| PacketError::NotUtf8)?;

    Ok(DecodedName {
        offset: end,
        name,
        single_label: labels == 1,
    })
}

/// Return the offset just past the name at `offset` without building its text.
pub fn skip_name(body: &[u8], offset: usize) -> Result<usize, PacketError> {
    scan_name(body, offset, None).map(|(end, _)| end)
}

/// Walk the labels of one name, following pointers.
///
/// Returns the offset past the name in the caller's stream and the label count.
fn scan_name(
    body: &[u8],
    mut offset: usize,
    mut text: Option<&mut Vec<u8>>,
) -> Result<(usize, usize), PacketError> {
    let mut idx = offset;
    let mut hops = 0usize;
    let mut labels = 0usize;
    let mut wire_len = 0usize;

    loop {
        let len_byte = byte_at(body, idx)?;

        match len_byte {
            0 => {
                offset += if hops > 0 { 2 } else { 1 };
                return Ok((offset, labels));
            }
            1..=63 => {
                let len = len_byte as usize;
                let start = idx + 1;
                ensure_len(body, start + len)?;

                wire_len += len + 1;
                if wire_len + 1 > MAX_NAME_LEN {
                    return Err(PacketError::NameTooLong(wire_len + 1));
                }
                if let Some(text) = text.as_deref_mut() {
                    text.extend_from_slice(&body[start..start + len]);
                    text.push(b'.');
                }
                tracing::trace!(at = idx, len, "dns label");

                labels += 1;
                if hops == 0 {
                    offset += len + 1;
                }
                idx = start + len;
            }
            64..=191 => return Err(PacketError::InvalidLabel(len_byte)),
            192..=255 => {
                let raw = u16::from_be_bytes([len_byte, byte_at(body, idx + 1)?]);
                let target = (raw & POINTER_MASK) as usize;
                if target < DNS_HEADER_LEN {
                    return Err(PacketError::PointerIntoHeader(raw));
                }
                let target = target - DNS_HEADER_LEN;
                if target >= idx {
                    return Err(PacketError::ForwardPointer { at: idx, target });
                }

                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(PacketError::PointerLoop);
                }
                tracing::trace!(at = idx, target, "dns pointer");
                idx = target;
            }
        }
    }
}

fn byte_at(body: &[u8], idx: usize) -> Result<u8, PacketError> {
    body.get(idx).copied().ok_or(PacketError::Truncated {
        needed: idx.saturating_add(1),
        actual: body.len(),
    })
}
