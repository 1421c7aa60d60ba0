//! DNS wire pieces: the name codec plus the message and record headers.

pub mod name;
pub mod record;

pub use name::{decode_name, encode_name, skip_name, DecodedName};
pub use record::{rr_type, DnsHeader, ResourceRecordHeader, CLASS_IN};
