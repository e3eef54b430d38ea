//! Protocol verifiers.
//!
//! A verifier turns "this port is open" into "this is a camera endpoint",
//! one candidate url at a time. It never writes results itself: it hands a
//! [`Verified`] back to the coordinator together with, for protected
//! endpoints, a [`CredentialTrial`] that knows how to log in.

use async_trait::async_trait;
use camprobe_common::error::ScanError;
use camprobe_common::models::{Credential, Endpoint, FoundDevice, ProbeResult};

use crate::credentials::{CredentialTrial, LoginMethod};

pub mod http;
pub mod rtsp;
pub mod stream;

#[derive(Debug)]
pub enum Verification {
    NoMatch,
    Confirmed(Verified),
}

#[derive(Debug, Clone)]
pub enum Access {
    Open,
    Protected {
        method: LoginMethod,
        credentials: Vec<Credential>,
    },
}

#[derive(Debug, Clone)]
pub struct Verified {
    pub url: String,
    pub category: Option<String>,
    pub confidence: Option<u32>,
    pub access: Access,
    pub evidence: ProbeResult,
}

impl Verified {
    pub fn into_device(self, credential: Option<Credential>) -> FoundDevice {
        FoundDevice {
            url: self.url,
            category: self.category,
            credential,
            confidence: self.confidence,
        }
    }
}

#[async_trait]
pub trait ProtocolVerifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Ports this verifier is run against.
    fn ports(&self) -> &[u16];

    fn claims(&self, port: u16) -> bool {
        self.ports().contains(&port)
    }

    /// Urls to check on an open endpoint, in priority order.
    fn candidates(&self, endpoint: Endpoint) -> Vec<String>;

    /// Checks one candidate. Transport and protocol errors come back as
    /// `Err` and are treated as "not verified" by the caller.
    async fn verify(&self, endpoint: Endpoint, candidate: &str) -> Result<Verification, ScanError>;

    /// Login strategy for a protected endpoint this verifier confirmed.
    fn credential_trial(&self, verified: &Verified) -> Option<Box<dyn CredentialTrial>>;
}

/// Makes sure a configured path starts with `/`.
///
/// Url templates of the form `rtsp://{ip}:{port}/path` are cut down to the
/// path so pattern files written for other tools can be reused.
pub fn normalize_path(pattern: &str) -> String {
    let pattern = pattern.trim();
    let path = match pattern.find("{port}") {
        Some(idx) => &pattern[idx + "{port}".len()..],
        None => pattern,
    };

    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
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
