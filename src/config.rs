//! Tunables and fixed wire constants.

use std::time::Duration;

/// Size of the DNS message header that precedes the body handed to the name codec.
pub const DNS_HEADER_LEN: usize = 12;

/// Longest label allowed in a domain name.
pub const MAX_LABEL_LEN: usize = 63;

/// Longest domain name in wire format, length octets and terminator included.
pub const MAX_NAME_LEN: usize = 255;

/// Upper bound on compression pointers followed while decoding one name. A
/// legal name has at most this many labels, each of which may sit behind its
/// own pointer.
pub const MAX_POINTER_HOPS: usize = MAX_NAME_LEN / 2;

/// Receive buffer for echo replies (IP header + ICMP).
pub const RECV_BUF_LEN: usize = 2048;

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(250);
const DEFAULT_PROBE_COUNT: u16 = 2;
const DEFAULT_SERVICE_ACCOUNT: &str = "dnx";

/// Settings for ICMP reachability probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Per-probe wait budget, measured from the send.
    pub timeout: Duration,
    /// Number of echo requests per check.
    pub count: u16,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
            count: DEFAULT_PROBE_COUNT,
        }
    }
}

impl ProbeConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_count(mut self, count: u16) -> Self {
        self.count = count;
        self
    }
}

/// Settings for local socket peer authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// The only account allowed to talk to the service sockets.
    pub service_account: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            service_account: DEFAULT_SERVICE_ACCOUNT.to_string(),
        }
    }
}
