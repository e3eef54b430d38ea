//! Default credential trials.
//!
//! [`try_credentials`] drives any [`CredentialTrial`] over an ordered list
//! through a small bounded pool. The first success ends the run: nothing
//! new is dispatched and attempts still in flight are dropped, so at most
//! one credential is ever reported per endpoint.

use async_trait::async_trait;
use camprobe_common::models::Credential;
use camprobe_protocols::rtsp::AuthChallenge;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use scraper::{Html, Selector};

pub mod trials;

/// One authentication attempt against one endpoint.
#[async_trait]
pub trait CredentialTrial: Send + Sync {
    async fn attempt(&self, credential: &Credential) -> bool;
}

/// Submits a login form for a fingerprinted device.
///
/// The bundled implementation posts the form over plain HTTP; a browser
/// driven one can be swapped in without touching the scan engine.
#[async_trait]
pub trait FormLoginAttempt: Send + Sync {
    async fn attempt(&self, login_url: &str, form: &FormSpec, credential: &Credential) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialOutcome {
    Found(Credential),
    NoCredentialFound,
}

/// How a protected endpoint expects credentials.
#[derive(Debug, Clone)]
pub enum LoginMethod {
    /// HTML login form posted back to the device.
    Form(FormSpec),
    /// HTTP basic auth against a fixed path of the device.
    HttpBasic { path: String },
    /// HTTP basic auth on the stream url itself.
    Stream,
    /// RTSP `DESCRIBE` answering the challenge the device sent.
    Rtsp { challenge: Option<AuthChallenge> },
}

/// Shape of a login form and how a rejected login looks.
#[derive(Debug, Clone)]
pub struct FormSpec {
    pub action: Option<String>,
    pub username_field: String,
    pub password_field: String,
    error: Selector,
    password_input: Selector,
}

impl FormSpec {
    pub fn new(username_field: &str, password_field: &str, error_css: &str) -> anyhow::Result<Self> {
        let parse = |css: &str| {
            Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid selector '{css}': {e}"))
        };

        Ok(Self {
            action: None,
            username_field: username_field.to_string(),
            password_field: password_field.to_string(),
            error: parse(error_css)?,
            password_input: parse(&format!("input[name=\"{password_field}\"]"))?,
        })
    }

    /// Posts to `action` instead of the page the form was found on.
    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    /// A login went through when the reply shows neither the error element
    /// nor the password field again.
    pub fn accepts(&self, body: &str) -> bool {
        let document = Html::parse_document(body);
        document.select(&self.error).next().is_none()
            && document.select(&self.password_input).next().is_none()
    }
}

/// Tries `credentials` in order with at most `workers` attempts in flight.
pub async fn try_credentials(
    trial: &dyn CredentialTrial,
    credentials: &[Credential],
    workers: usize,
) -> TrialOutcome {
    let workers = workers.max(1);
    let mut pending = credentials.iter();
    let mut in_flight = FuturesUnordered::new();

    loop {
        while in_flight.len() < workers {
            let Some(credential) = pending.next() else {
                break;
            };
            in_flight.push(async move { (credential, trial.attempt(credential).await) });
        }

        match in_flight.next().await {
            Some((credential, true)) => return TrialOutcome::Found(credential.clone()),
            Some((_, false)) => continue,
            None => return TrialOutcome::NoCredentialFound,
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Accepts a fixed set of passwords and records every attempt.
    struct FakeDevice {
        accepted: Vec<&'static str>,
        attempts: Mutex<Vec<String>>,
        delay: Duration,
    }

    impl FakeDevice {
        fn new(accepted: &[&'static str], delay: Duration) -> Self {
            Self {
                accepted: accepted.to_vec(),
                attempts: Mutex::new(Vec::new()),
                delay,
            }
        }
    }

    #[async_trait]
    impl CredentialTrial for FakeDevice {
        async fn attempt(&self, credential: &Credential) -> bool {
            self.attempts.lock().unwrap().push(credential.password.clone());
            tokio::time::sleep(self.delay).await;
            self.accepted.contains(&credential.password.as_str())
        }
    }

    fn creds(passwords: &[&str]) -> Vec<Credential> {
        passwords.iter().map(|p| Credential::new("admin", *p)).collect()
    }

    #[tokio::test]
    async fn stops_dispatching_after_first_success() {
        let device = FakeDevice::new(&["12345", "888888"], Duration::from_millis(5));
        let list = creds(&["admin", "12345", "888888", "hikvision", "123456"]);

        let outcome = try_credentials(&device, &list, 1).await;

        assert_eq!(outcome, TrialOutcome::Found(Credential::new("admin", "12345")));
        assert_eq!(*device.attempts.lock().unwrap(), vec!["admin", "12345"]);
    }

    #[tokio::test]
    async fn reports_a_single_winner_when_many_succeed() {
        let device = FakeDevice::new(&["a", "b", "c", "d"], Duration::from_millis(10));
        let list = creds(&["a", "b", "c", "d"]);

        let outcome = try_credentials(&device, &list, 4).await;

        let TrialOutcome::Found(winner) = outcome else {
            panic!("expected a credential");
        };
        assert!(["a", "b", "c", "d"].contains(&winner.password.as_str()));
    }

    #[tokio::test]
    async fn exhausted_list_is_not_an_error() {
        let device = FakeDevice::new(&[], Duration::ZERO);
        let list = creds(&["1", "2", "3", "4", "5", "6", "7"]);

        let outcome = try_credentials(&device, &list, 3).await;

        assert_eq!(outcome, TrialOutcome::NoCredentialFound);
        assert_eq!(device.attempts.lock().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn never_exceeds_worker_cap() {
        struct Gauge {
            current: AtomicUsize,
            peak: AtomicUsize,
        }

        #[async_trait]
        impl CredentialTrial for Gauge {
            async fn attempt(&self, _credential: &Credential) -> bool {
                let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                self.current.fetch_sub(1, Ordering::SeqCst);
                false
            }
        }

        let gauge = Gauge {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        };
        let list = creds(&["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);

        try_credentials(&gauge, &list, 3).await;

        assert_eq!(gauge.peak.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn form_spec_detects_rejected_login() {
        let form = FormSpec::new("username", "password", ".login-error").unwrap();

        let rejected = r#"<form><input name="username"><input name="password" type="password">
            <div class="login-error"><label>Invalid user name or password</label></div></form>"#;
        let still_login = r#"<form><input name="password" type="password"></form>"#;
        let welcome = r#"<html><body><div id="preview">Live View</div></body></html>"#;

        assert!(!form.accepts(rejected));
        assert!(!form.accepts(still_login));
        assert!(form.accepts(welcome));
    }
}
