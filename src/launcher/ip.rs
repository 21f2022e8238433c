//! Local and public IP address lookup.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::time::Duration;

/// Service returning the caller's public address as plain text.
pub const PUBLIC_IP_ENDPOINT: &str = "https://api.ipify.org?format=text";

/// Errors raised by address lookups.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The host has no usable IPv4 interface.
    #[error("No IPv4 interface found")]
    NoInterface,

    /// The HTTP request could not be made.
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with an error status.
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
}

/// First IPv4 address the host would use for outbound traffic.
///
/// No packets are sent: connecting a UDP socket only selects a route.
pub fn local_ipv4() -> Result<Ipv4Addr, LookupError> {
    let socket =
        UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(|_| LookupError::NoInterface)?;
    socket
        .connect((Ipv4Addr::new(8, 8, 8, 8), 80))
        .map_err(|_| LookupError::NoInterface)?;

    match socket.local_addr().map_err(|_| LookupError::NoInterface)?.ip() {
        IpAddr::V4(addr) if !addr.is_unspecified() => Ok(addr),
        _ => Err(LookupError::NoInterface),
    }
}

/// Blocking client for the public address endpoint.
pub struct PublicIpClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl PublicIpClient {
    /// Create a client for [`PUBLIC_IP_ENDPOINT`].
    pub fn new() -> Result<Self, LookupError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("hl-launcher/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: PUBLIC_IP_ENDPOINT.to_string(),
        })
    }

    /// Query a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Fetch the public address.
    pub fn fetch(&self) -> Result<String, LookupError> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| LookupError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(LookupError::Http(status.as_u16(), body));
        }

        Ok(body.trim().to_string())
    }
}

/// Look up the local or public address as text.
pub fn lookup(local: bool) -> Result<String, LookupError> {
    if local {
        local_ipv4().map(|addr| addr.to_string())
    } else {
        PublicIpClient::new()?.fetch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}/?format=text", addr)
    }

    #[test]
    fn test_fetch_public_ip() {
        let endpoint = serve_once("200 OK", "203.0.113.7\n");
        let client = PublicIpClient::new().unwrap().with_endpoint(endpoint);
        assert_eq!(client.fetch().unwrap(), "203.0.113.7");
    }

    #[test]
    fn test_fetch_error_status() {
        let endpoint = serve_once("503 Service Unavailable", "down");
        let client = PublicIpClient::new().unwrap().with_endpoint(endpoint);
        let err = client.fetch().unwrap_err();
        assert!(matches!(err, LookupError::Http(503, ref body) if body == "down"));
    }

    #[test]
    fn test_fetch_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let client = PublicIpClient::new().unwrap().with_endpoint(endpoint);
        assert!(matches!(client.fetch(), Err(LookupError::Network(_))));
    }
}
