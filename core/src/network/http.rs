//! Thin HTTP client used by the web and stream verifiers.

use std::borrow::Cow;
use std::time::Duration;

use camprobe_common::models::{Credential, Endpoint, ProbeResult};
use rand::seq::IndexedRandom;
use reqwest::redirect::Policy;

/// Cap for login pages and other HTML documents.
pub const MAX_PAGE_SIZE: usize = 1024 * 1024;
/// Cap for stream endpoints, which never end on their own.
pub const MAX_STREAM_PEEK: usize = 8 * 1024;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

#[derive(Debug, Clone)]
pub struct HttpReply {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or_default()
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn probe_result(&self, endpoint: Endpoint) -> ProbeResult {
        let preview: String = self.text().chars().take(256).collect();
        ProbeResult::new(endpoint, true)
            .with_status(self.status)
            .with_payload(preview)
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Builds a client for untrusted devices: certificates are not checked,
    /// at most three redirects are followed and every request carries a
    /// desktop browser User-Agent.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let user_agent = USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(true)
            .redirect(Policy::limited(3))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    pub async fn get(
        &self,
        url: &str,
        credential: Option<&Credential>,
        max_body: usize,
    ) -> reqwest::Result<HttpReply> {
        let mut request = self.client.get(url);
        if let Some(credential) = credential {
            request = request.basic_auth(&credential.username, Some(&credential.password));
        }
        read_reply(request.send().await?, max_body).await
    }

    pub async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
        max_body: usize,
    ) -> reqwest::Result<HttpReply> {
        let response = self.client.post(url).form(fields).send().await?;
        read_reply(response, max_body).await
    }
}

/// Reads the body chunk by chunk and stops once `max_body` bytes are in.
async fn read_reply(mut response: reqwest::Response, max_body: usize) -> reqwest::Result<HttpReply> {
    let url = response.url().to_string();
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() >= max_body {
            body.truncate(max_body);
            break;
        }
    }

    Ok(HttpReply {
        url,
        status,
        headers,
        body,
    })
}
