//! Primitive conversions used around rule and interface handling.

use byteorder::{BigEndian, ByteOrder};

use crate::error::ConvertError;

const MAC_LEN: usize = 6;

/// Read an unsigned big-endian integer of up to 8 bytes. Empty input is 0.
pub fn be_bytes_to_int(bytes: &[u8]) -> Result<u64, ConvertError> {
    match bytes.len() {
        0 => Ok(0),
        1..=8 => Ok(BigEndian::read_uint(bytes, bytes.len())),
        n => Err(ConvertError::TooWide(n)),
    }
}

/// Write `value` as exactly `width` big-endian bytes.
pub fn int_to_be_bytes(value: u64, width: usize) -> Result<Vec<u8>, ConvertError> {
    let needed = 8 - (value.leading_zeros() / 8) as usize;
    if needed > width {
        return Err(ConvertError::Overflow { value, width });
    }

    let mut out = vec![0u8; width];
    if needed > 0 {
        BigEndian::write_uint(&mut out[width - needed..], value, needed);
    }
    Ok(out)
}

/// Parse a MAC address written as 12 hex digits, colons optional.
pub fn mac_to_bytes(mac: &str) -> Result<[u8; MAC_LEN], ConvertError> {
    let digits = mac.replace(':', "");
    let mut out = [0u8; MAC_LEN];
    hex::decode_to_slice(&digits, &mut out)
        .map_err(|_| ConvertError::InvalidMac(mac.to_string()))?;
    Ok(out)
}

/// Insert `sep` between each byte of a bare 12-digit MAC string.
pub fn mac_add_separator(mac: &str, sep: &str) -> Result<String, ConvertError> {
    if mac.len() != MAC_LEN * 2 || !mac.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConvertError::InvalidMac(mac.to_string()));
    }

    let pairs: Vec<&str> = (0..mac.len()).step_by(2).map(|i| &mac[i..i + 2]).collect();
    Ok(pairs.join(sep))
}

pub fn mac_to_string(mac: &[u8; MAC_LEN], sep: &str) -> String {
    let pairs: Vec<String> = mac.iter().map(|b| hex::encode([*b])).collect();
    pairs.join(sep)
}

/// Netmask with the top `prefix` bits set.
pub fn cidr_to_mask(prefix: u8) -> Result<u32, ConvertError> {
    match prefix {
        0 => Ok(0),
        1..=32 => Ok(u32::MAX << (32 - prefix)),
        _ => Err(ConvertError::InvalidPrefix(prefix)),
    }
}

/// Stable 32-bit identifier for a rule string (FNV-1a, folded to 32 bits).
///
/// Not collision resistant; never use it for access decisions.
pub fn rule_id(rule: &str) -> u32 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET;
    for &b in rule.as_bytes() {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(PRIME);
    }
    (hash & u64::from(u32::MAX)) as u32
}
