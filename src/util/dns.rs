//! DNS resolution utilities.

use std::net::SocketAddr;

use crate::snmp::SNMP_PORT;

/// Resolve a transport string to a socket address.
///
/// A literal `host:port` pair passes through unchanged; anything else (IP
/// address or host name) gets the default SNMP port.
pub async fn resolve_target(transport: &str) -> Option<SocketAddr> {
    if let Ok(addr) = transport.parse::<SocketAddr>() {
        return Some(addr);
    }
    let target = format!("{}:{}", transport, SNMP_PORT);
    tokio::task::spawn_blocking(move || {
        use std::net::ToSocketAddrs;
        target.to_socket_addrs().ok()?.next()
    })
    .await
    .ok()?
}
