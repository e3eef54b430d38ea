use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use std::time::SystemTime;

/// A single (address, port) pair under investigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub addr: Ipv4Addr,
    pub port: u16,
}

impl Endpoint {
    pub fn new(addr: Ipv4Addr, port: u16) -> Self {
        Self { addr, port }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.addr, self.port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.addr, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl FromStr for Credential {
    type Err = String;

    /// Parses `user:pass`. The first colon splits, so passwords may contain
    /// colons or be empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((username, password)) = s.split_once(':') else {
            return Err(format!("expected user:pass, got '{s}'"));
        };

        if username.is_empty() {
            return Err(format!("missing username in '{s}'"));
        }

        Ok(Self::new(username, password))
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.username, self.password)
    }
}

/// Outcome of a port or protocol level check.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub endpoint: Endpoint,
    pub reachable: bool,
    pub status: Option<u16>,
    pub payload: Option<String>,
    pub timestamp: SystemTime,
}

impl ProbeResult {
    pub fn new(endpoint: Endpoint, reachable: bool) -> Self {
        Self {
            endpoint,
            reachable,
            status: None,
            payload: None,
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// A confirmed discovery, written once per unique url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundDevice {
    pub url: String,
    pub category: Option<String>,
    pub credential: Option<Credential>,
    pub confidence: Option<u32>,
}

impl FoundDevice {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category: None,
            credential: None,
            confidence: None,
        }
    }
}

impl fmt::Display for FoundDevice {
    /// `<url>[ (Auth: <user>:<pass>)][ [Vendor: <name>]]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)?;
        if let Some(credential) = &self.credential {
            write!(f, " (Auth: {credential})")?;
        }
        if let Some(category) = &self.category {
            write!(f, " [Vendor: {category}]")?;
        }
        Ok(())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
