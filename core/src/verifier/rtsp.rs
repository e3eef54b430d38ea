//! RTSP stream discovery.
//!
//! A candidate is checked with `OPTIONS` followed by `DESCRIBE` on one
//! control connection. `OPTIONS` has to answer `200` before anything else
//! is sent. A `401` on `DESCRIBE` means the stream exists behind a login,
//! which is a confirmation, not a failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use camprobe_common::error::ScanError;
use camprobe_common::models::{Credential, Endpoint, ProbeResult};
use camprobe_protocols::rtsp::{self, Method};
use tracing::debug;

use super::{Access, ProtocolVerifier, Verification, Verified};
use crate::credentials::trials::RtspDescribeTrial;
use crate::credentials::{CredentialTrial, LoginMethod};
use crate::network::rtsp::RtspConnection;
use crate::vendors::VendorTable;

pub struct RtspVerifier {
    ports: Vec<u16>,
    paths: Vec<String>,
    timeout: Duration,
    vendors: Option<Arc<VendorTable>>,
    credentials: Vec<Credential>,
}

impl RtspVerifier {
    /// Tries the same `credentials` on every protected stream.
    pub fn new(ports: Vec<u16>, paths: Vec<String>, timeout: Duration, credentials: Vec<Credential>) -> Self {
        Self {
            ports,
            paths,
            timeout,
            vendors: None,
            credentials,
        }
    }

    /// Picks credentials per stream from the vendor named by its url.
    pub fn with_vendors(mut self, vendors: Arc<VendorTable>) -> Self {
        self.vendors = Some(vendors);
        self
    }

    fn vendor(&self, url: &str) -> Option<&'static str> {
        self.vendors.as_ref().and_then(|vendors| vendors.detect_url(url))
    }

    fn credentials_for(&self, vendor: Option<&str>) -> Vec<Credential> {
        match &self.vendors {
            Some(vendors) => vendors.credentials_for(vendor),
            None => self.credentials.clone(),
        }
    }
}

#[async_trait]
impl ProtocolVerifier for RtspVerifier {
    fn name(&self) -> &'static str {
        "rtsp"
    }

    fn ports(&self) -> &[u16] {
        &self.ports
    }

    fn candidates(&self, endpoint: Endpoint) -> Vec<String> {
        self.paths
            .iter()
            .map(|path| format!("rtsp://{endpoint}{path}"))
            .collect()
    }

    async fn verify(&self, endpoint: Endpoint, candidate: &str) -> Result<Verification, ScanError> {
        let mut connection = RtspConnection::open(endpoint, self.timeout).await?;

        let options = connection.send(Method::Options, candidate, None).await?;
        if !options.is_ok() {
            debug!("{candidate}: OPTIONS answered {}", options.status);
            return Ok(Verification::NoMatch);
        }

        let describe = connection.send(Method::Describe, candidate, None).await?;
        let vendor = self.vendor(candidate);
        let access = if describe.is_ok() && rtsp::is_sdp_video(&describe) {
            Access::Open
        } else if describe.is_unauthorized() {
            Access::Protected {
                method: LoginMethod::Rtsp {
                    challenge: describe.challenge(),
                },
                credentials: self.credentials_for(vendor),
            }
        } else {
            debug!("{candidate}: DESCRIBE answered {}", describe.status);
            return Ok(Verification::NoMatch);
        };

        Ok(Verification::Confirmed(Verified {
            url: candidate.to_string(),
            category: vendor.map(str::to_string),
            confidence: None,
            access,
            evidence: ProbeResult::new(endpoint, true)
                .with_status(describe.status)
                .with_payload(describe.reason),
        }))
    }

    fn credential_trial(&self, verified: &Verified) -> Option<Box<dyn CredentialTrial>> {
        let Access::Protected {
            method: LoginMethod::Rtsp { challenge },
            ..
        } = &verified.access
        else {
            return None;
        };

        Some(Box::new(RtspDescribeTrial {
            endpoint: verified.evidence.endpoint,
            url: verified.url.clone(),
            timeout: self.timeout,
            challenge: challenge.clone(),
        }))
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
