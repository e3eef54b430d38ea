//! Protocol specific [`CredentialTrial`] implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use camprobe_common::models::{Credential, Endpoint};
use camprobe_protocols::media;
use camprobe_protocols::rtsp::{self, AuthChallenge, Method};
use tracing::debug;

use super::{CredentialTrial, FormLoginAttempt, FormSpec};
use crate::network::http::{HttpClient, MAX_PAGE_SIZE, MAX_STREAM_PEEK};
use crate::network::rtsp::RtspConnection;

/// Repeats `DESCRIBE` with the credential in the url and in an
/// `Authorization` header. Only a `200` counts as success.
pub struct RtspDescribeTrial {
    pub endpoint: Endpoint,
    pub url: String,
    pub timeout: Duration,
    pub challenge: Option<AuthChallenge>,
}

#[async_trait]
impl CredentialTrial for RtspDescribeTrial {
    async fn attempt(&self, credential: &Credential) -> bool {
        let mut connection = match RtspConnection::open(self.endpoint, self.timeout).await {
            Ok(connection) => connection,
            Err(e) => {
                debug!("{e}");
                return false;
            }
        };

        let url = rtsp::with_userinfo(&self.url, &credential.username, &credential.password);
        let mut challenge = self.challenge.clone();

        // A Digest nonce may have expired since verification; one retry with
        // the fresh nonce covers that.
        for _ in 0..2 {
            let authorization = match &challenge {
                Some(c) => c.authorization(&credential.username, &credential.password, Method::Describe, &url),
                None => rtsp::basic_authorization(&credential.username, &credential.password),
            };

            let response = match connection.send(Method::Describe, &url, Some(authorization)).await {
                Ok(response) => response,
                Err(e) => {
                    debug!("{e}");
                    return false;
                }
            };

            if response.is_ok() {
                return true;
            }

            match response.challenge() {
                Some(fresh @ AuthChallenge::Digest { .. })
                    if response.is_unauthorized() && challenge.as_ref() != Some(&fresh) =>
                {
                    challenge = Some(fresh);
                }
                _ => return false,
            }
        }

        false
    }
}

/// Basic auth against a fixed device path. Success is a `200`.
pub struct HttpBasicTrial {
    pub client: HttpClient,
    pub url: String,
}

#[async_trait]
impl CredentialTrial for HttpBasicTrial {
    async fn attempt(&self, credential: &Credential) -> bool {
        match self.client.get(&self.url, Some(credential), MAX_PAGE_SIZE).await {
            Ok(reply) => reply.status == 200,
            Err(e) => {
                debug!("{}: {e}", self.url);
                false
            }
        }
    }
}

/// Basic auth on a stream url. The reply must be `200` and actually carry
/// media: an image signature at the start of the body or a stream
/// content type.
pub struct HttpStreamTrial {
    pub client: HttpClient,
    pub url: String,
}

#[async_trait]
impl CredentialTrial for HttpStreamTrial {
    async fn attempt(&self, credential: &Credential) -> bool {
        match self.client.get(&self.url, Some(credential), MAX_STREAM_PEEK).await {
            Ok(reply) => {
                reply.status == 200
                    && (media::starts_with_image_signature(&reply.body)
                        || media::is_stream_content_type(reply.content_type()))
            }
            Err(e) => {
                debug!("{}: {e}", self.url);
                false
            }
        }
    }
}

/// Hands a credential to a [`FormLoginAttempt`] for one login page.
pub struct FormTrial {
    pub login: Arc<dyn FormLoginAttempt>,
    pub url: String,
    pub form: FormSpec,
}

#[async_trait]
impl CredentialTrial for FormTrial {
    async fn attempt(&self, credential: &Credential) -> bool {
        self.login.attempt(&self.url, &self.form, credential).await
    }
}

/// Posts login forms as `application/x-www-form-urlencoded`.
pub struct HttpFormLogin {
    client: HttpClient,
}

impl HttpFormLogin {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FormLoginAttempt for HttpFormLogin {
    async fn attempt(&self, login_url: &str, form: &FormSpec, credential: &Credential) -> bool {
        let action = match &form.action {
            Some(action) => match reqwest::Url::parse(login_url).and_then(|base| base.join(action)) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    debug!("{login_url}: cannot resolve form action '{action}': {e}");
                    return false;
                }
            },
            None => login_url.to_string(),
        };

        let fields = [
            (form.username_field.as_str(), credential.username.as_str()),
            (form.password_field.as_str(), credential.password.as_str()),
        ];

        match self.client.post_form(&action, &fields, MAX_PAGE_SIZE).await {
            Ok(reply) => reply.is_success() && form.accepts(&reply.text()),
            Err(e) => {
                debug!("{action}: {e}");
                false
            }
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
