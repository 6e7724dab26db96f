//! Local network address detection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// Unroutable probe target. Connecting a UDP socket sends nothing; it only
/// makes the OS pick the outgoing interface.
const PROBE_TARGET: (Ipv4Addr, u16) = (Ipv4Addr::new(10, 255, 255, 255), 1);

/// Primary non-loopback IPv4 address of this machine, if any.
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(PROBE_TARGET).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_loopback() && !ip.is_unspecified()).then_some(ip)
}

/// Address a device should open, given the bound server address.
///
/// A server bound to a concrete interface is reported as is; a wildcard
/// bind is reported with the detected local address.
pub fn connect_url(bound: SocketAddr, detected: Option<IpAddr>) -> Option<String> {
    let ip = if bound.ip().is_unspecified() { detected? } else { bound.ip() };
    Some(format!("http://{}:{}", ip, bound.port()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ip_is_never_loopback() {
        // Sandboxes may have no route at all
        if let Some(ip) = local_ip() {
            assert!(!ip.is_loopback());
            assert!(ip.is_ipv4());
        }
    }

    #[test]
    fn test_connect_url() {
        let wildcard: SocketAddr = "0.0.0.0:8521".parse().unwrap();
        let detected = Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)));
        assert_eq!(connect_url(wildcard, detected).as_deref(), Some("http://192.168.1.20:8521"));
        assert_eq!(connect_url(wildcard, None), None);

        let concrete: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(connect_url(concrete, None).as_deref(), Some("http://127.0.0.1:9000"));
    }
}
