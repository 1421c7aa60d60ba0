//! Raw ICMP socket used by the reachability prober.

use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::error::ProbeError;
use crate::probe::ProbeTransport;

/// `SO_RCVTIMEO` has microsecond resolution and treats zero as "no timeout".
const MIN_RECV_TIMEOUT: Duration = Duration::from_micros(1);

/// An `AF_INET`/`SOCK_RAW` ICMP socket with a receive timeout.
///
/// Needs `CAP_NET_RAW`. The descriptor is closed on drop.
#[derive(Debug)]
pub struct RawIcmpSocket {
    socket: Socket,
}

impl RawIcmpSocket {
    pub fn open(recv_timeout: Duration) -> Result<Self, ProbeError> {
        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .map_err(ProbeError::Open)?;
        socket
            .set_read_timeout(Some(bounded_timeout(recv_timeout)))
            .map_err(ProbeError::Configure)?;

        Ok(RawIcmpSocket { socket })
    }
}

/// Round a wait budget up to the smallest timeout the kernel still enforces.
fn bounded_timeout(timeout: Duration) -> Duration {
    timeout.max(MIN_RECV_TIMEOUT)
}

impl ProbeTransport for RawIcmpSocket {
    fn send_to(&mut self, packet: &[u8], target: Ipv4Addr) -> io::Result<()> {
        let addr = SockAddr::from(SocketAddrV4::new(target, 0));
        self.socket.send_to(packet, &addr)?;
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.socket.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn zero_timeout_is_still_bounded() {
        assert_eq!(bounded_timeout(Duration::ZERO), MIN_RECV_TIMEOUT);
        assert_eq!(bounded_timeout(Duration::from_nanos(500)), MIN_RECV_TIMEOUT);
        assert_eq!(
            bounded_timeout(Duration::from_millis(250)),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn zero_timeout_recv_returns() {
        // raw sockets need CAP_NET_RAW; nothing to check without it
        let Ok(mut socket) = RawIcmpSocket::open(Duration::ZERO) else {
            return;
        };

        let mut buf = [0u8; 64];
        let started = Instant::now();
        for _ in 0..3 {
            let _ = socket.recv(&mut buf);
        }
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
