//! HTTP snapshot and MJPEG endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use camprobe_common::error::ScanError;
use camprobe_common::models::Endpoint;
use camprobe_protocols::media;
use tracing::debug;

use super::{Access, ProtocolVerifier, Verification, Verified};
use crate::credentials::trials::HttpStreamTrial;
use crate::credentials::{CredentialTrial, LoginMethod};
use crate::network::http::{HttpClient, HttpReply, MAX_STREAM_PEEK};
use crate::vendors::VendorTable;

pub struct HttpStreamVerifier {
    client: HttpClient,
    ports: Vec<u16>,
    paths: Vec<String>,
    vendors: Arc<VendorTable>,
}

impl HttpStreamVerifier {
    pub fn new(client: HttpClient, ports: Vec<u16>, paths: Vec<String>, vendors: Arc<VendorTable>) -> Self {
        Self {
            client,
            ports,
            paths,
            vendors,
        }
    }

    fn carries_media(url: &str, reply: &HttpReply) -> bool {
        if media::is_stream_content_type(reply.content_type())
            && reply.body.len() > media::MIN_STREAM_CHUNK
        {
            return true;
        }
        media::looks_like_stream_path(url) && media::contains_image_marker(&reply.body)
    }

    fn vendor(&self, reply: &HttpReply) -> Option<&'static str> {
        self.vendors.detect(reply)
    }
}

#[async_trait]
impl ProtocolVerifier for HttpStreamVerifier {
    fn name(&self) -> &'static str {
        "http-stream"
    }

    fn ports(&self) -> &[u16] {
        &self.ports
    }

    fn candidates(&self, endpoint: Endpoint) -> Vec<String> {
        self.paths
            .iter()
            .map(|path| format!("http://{endpoint}{path}"))
            .collect()
    }

    async fn verify(&self, endpoint: Endpoint, candidate: &str) -> Result<Verification, ScanError> {
        let reply = match self.client.get(candidate, None, MAX_STREAM_PEEK).await {
            Ok(reply) => reply,
            Err(e) => {
                debug!("{candidate}: {e}");
                return Ok(Verification::NoMatch);
            }
        };

        let vendor = self.vendor(&reply);
        let access = match reply.status {
            200 if Self::carries_media(candidate, &reply) => Access::Open,
            401 => Access::Protected {
                method: LoginMethod::Stream,
                credentials: self.vendors.credentials_for(vendor),
            },
            _ => return Ok(Verification::NoMatch),
        };

        Ok(Verification::Confirmed(Verified {
            url: candidate.to_string(),
            category: vendor.map(str::to_string),
            confidence: None,
            access,
            evidence: reply.probe_result(endpoint),
        }))
    }

    fn credential_trial(&self, verified: &Verified) -> Option<Box<dyn CredentialTrial>> {
        match &verified.access {
            Access::Protected {
                method: LoginMethod::Stream,
                ..
            } => Some(Box::new(HttpStreamTrial {
                client: self.client.clone(),
                url: verified.url.clone(),
            })),
            _ => None,
        }
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
