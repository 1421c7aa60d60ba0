//! ICMP echo reachability probing
//!
//! A prober owns one socket and one random identifier for its whole life. Each
//! check sends `count` echo requests with sequence numbers `0..count`, waits up
//! to the timeout for the matching reply to each, and calls the host reachable
//! when a strict majority came back.
//!
//! Receive errors, including the socket's own timeout, only end the wait for
//! the current probe. A prober is not meant to be shared between threads;
//! open one per worker instead.

pub mod socket;

pub use socket::RawIcmpSocket;

use std::io;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use crate::config::{ProbeConfig, RECV_BUF_LEN};
use crate::error::ProbeError;
use crate::header::WireHeader;
use crate::network::ipv4::payload_offset;
use crate::network::IcmpHeader;

/// Where echo requests go and replies come from.
pub trait ProbeTransport {
    fn send_to(&mut self, packet: &[u8], target: Ipv4Addr) -> io::Result<()>;

    /// Receive one raw IPv4 datagram. Expected to fail after the socket's
    /// receive timeout when nothing arrives.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Outcome of one reachability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSummary {
    pub sent: u16,
    pub received: u16,
}

impl ProbeSummary {
    /// More than half of the probes were answered.
    pub fn is_reachable(&self) -> bool {
        self.sent > 0 && u32::from(self.received) * 2 > u32::from(self.sent)
    }
}

pub struct IcmpProber<T = RawIcmpSocket> {
    transport: T,
    identifier: u16,
    timeout: Duration,
}

impl IcmpProber<RawIcmpSocket> {
    /// Open a raw socket and pick a random identifier.
    pub fn open(timeout: Duration) -> Result<Self, ProbeError> {
        let socket = RawIcmpSocket::open(timeout)?;
        Ok(Self::with_transport(socket, rand::random(), timeout))
    }
}

impl<T: ProbeTransport> IcmpProber<T> {
    pub fn with_transport(transport: T, identifier: u16, timeout: Duration) -> Self {
        IcmpProber {
            transport,
            identifier,
            timeout,
        }
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `count` echo requests to `target` and tally the matching replies.
    pub fn probe(&mut self, target: Ipv4Addr, count: u16) -> ProbeSummary {
        let mut buf = [0u8; RECV_BUF_LEN];
        let mut received = 0u16;

        for sequence in 0..count {
            let mut request = IcmpHeader::echo_request(self.identifier, sequence);
            request.stamp_checksum();

            if let Err(err) = self.transport.send_to(&request.to_bytes(), target) {
                tracing::warn!(%target, sequence, "echo request send failed: {err}");
                continue;
            }

            if self.await_reply(sequence, &mut buf) {
                received += 1;
            }
        }

        let summary = ProbeSummary {
            sent: count,
            received,
        };
        tracing::debug!(
            %target,
            sent = summary.sent,
            received = summary.received,
            reachable = summary.is_reachable(),
            "icmp probe finished"
        );
        summary
    }

    pub fn reachable(&mut self, target: Ipv4Addr, count: u16) -> bool {
        self.probe(target, count).is_reachable()
    }

    fn await_reply(&mut self, sequence: u16, buf: &mut [u8]) -> bool {
        let sent_at = Instant::now();

        loop {
            let len = match self.transport.recv(buf) {
                Ok(len) => len,
                Err(err) => {
                    tracing::trace!(sequence, "no echo reply: {err}");
                    return false;
                }
            };

            if sent_at.elapsed() > self.timeout {
                tracing::trace!(sequence, "echo reply wait timed out");
                return false;
            }

            if is_echo_reply_for(&buf[..len], self.identifier, sequence) {
                return true;
            }
        }
    }
}

/// Strip the IP header off a raw datagram and match the echo reply fields.
fn is_echo_reply_for(datagram: &[u8], identifier: u16, sequence: u16) -> bool {
    let icmp = payload_offset(datagram)
        .and_then(|offset| datagram.get(offset..))
        .and_then(|payload| IcmpHeader::unpack(payload).ok());

    match icmp {
        Some(reply) => {
            reply.is_echo_reply() && reply.identifier == identifier && reply.sequence == sequence
        }
        None => false,
    }
}

/// Probe `host` with a freshly opened prober.
pub fn probe_reachable(host: Ipv4Addr, count: u16, timeout: Duration) -> Result<bool, ProbeError> {
    let mut prober = IcmpProber::open(timeout)?;
    Ok(prober.reachable(host, count))
}

/// [`probe_reachable`] driven by a [`ProbeConfig`].
pub fn probe_with_config(host: Ipv4Addr, config: &ProbeConfig) -> Result<bool, ProbeError> {
    probe_reachable(host, config.count, config.timeout)
}
