//! Web interface fingerprinting.

use std::sync::Arc;

use async_trait::async_trait;
use camprobe_common::error::ScanError;
use camprobe_common::models::Endpoint;
use tracing::{debug, info};

use super::{Access, ProtocolVerifier, Verification, Verified};
use crate::credentials::trials::{FormTrial, HttpBasicTrial};
use crate::credentials::{CredentialTrial, FormLoginAttempt, LoginMethod};
use crate::fingerprint::{MatchPolicy, Page, RuleSet};
use crate::network::http::{HttpClient, HttpReply, MAX_PAGE_SIZE};

const TLS_PORTS: &[u16] = &[443, 8443];

pub struct HttpFingerprintVerifier {
    client: HttpClient,
    ports: Vec<u16>,
    paths: Vec<String>,
    rules: RuleSet,
    both_schemes: bool,
    forms: Arc<dyn FormLoginAttempt>,
}

impl HttpFingerprintVerifier {
    pub fn new(
        client: HttpClient,
        ports: Vec<u16>,
        paths: Vec<String>,
        rules: RuleSet,
        forms: Arc<dyn FormLoginAttempt>,
    ) -> Self {
        Self {
            client,
            ports,
            paths,
            rules,
            both_schemes: false,
            forms,
        }
    }

    /// Tries `https` next to `http` on every port, not only on TLS ports.
    pub fn both_schemes(mut self, enabled: bool) -> Self {
        self.both_schemes = enabled;
        self
    }

    fn schemes(&self, port: u16) -> &'static [&'static str] {
        if TLS_PORTS.contains(&port) {
            &["https"]
        } else if self.both_schemes {
            &["http", "https"]
        } else {
            &["http"]
        }
    }

    fn classify(&self, endpoint: Endpoint, url: &str, reply: &HttpReply) -> Verification {
        let page = Page::from_reply(reply);
        let Some(found) = self.rules.evaluate(&page) else {
            return Verification::NoMatch;
        };

        let rule = found.rule;
        let access = match (&rule.login, self.rules.policy()) {
            (Some(method), _) if !rule.credentials.is_empty() => Access::Protected {
                method: method.clone(),
                credentials: rule.credentials.clone(),
            },
            // Login page rules only report devices whose default login was checked.
            (_, MatchPolicy::FirstMatch) => {
                info!("{url} looks like {}, no login check for it", rule.name);
                return Verification::NoMatch;
            }
            (_, MatchPolicy::Score { .. }) => Access::Open,
        };
        let confidence = match self.rules.policy() {
            MatchPolicy::Score { .. } => Some(found.score),
            MatchPolicy::FirstMatch => None,
        };

        Verification::Confirmed(Verified {
            url: url.to_string(),
            category: Some(rule.name.clone()),
            confidence,
            access,
            evidence: reply.probe_result(endpoint),
        })
    }
}

#[async_trait]
impl ProtocolVerifier for HttpFingerprintVerifier {
    fn name(&self) -> &'static str {
        "http-fingerprint"
    }

    fn ports(&self) -> &[u16] {
        &self.ports
    }

    fn candidates(&self, endpoint: Endpoint) -> Vec<String> {
        let mut candidates = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            for scheme in self.schemes(endpoint.port) {
                candidates.push(format!("{scheme}://{endpoint}{path}"));
            }
        }
        candidates
    }

    async fn verify(&self, endpoint: Endpoint, candidate: &str) -> Result<Verification, ScanError> {
        let reply = match self.client.get(candidate, None, MAX_PAGE_SIZE).await {
            Ok(reply) => reply,
            Err(e) => {
                debug!("{candidate}: {e}");
                return Ok(Verification::NoMatch);
            }
        };

        if !reply.is_success() {
            return Ok(Verification::NoMatch);
        }

        Ok(self.classify(endpoint, candidate, &reply))
    }

    fn credential_trial(&self, verified: &Verified) -> Option<Box<dyn CredentialTrial>> {
        let Access::Protected { method, .. } = &verified.access else {
            return None;
        };

        match method {
            LoginMethod::Form(form) => Some(Box::new(FormTrial {
                login: self.forms.clone(),
                url: verified.url.clone(),
                form: form.clone(),
            })),
            LoginMethod::HttpBasic { path } => {
                let base = reqwest::Url::parse(&verified.url).ok()?;
                let url = base.join(path).ok()?;
                Some(Box::new(HttpBasicTrial {
                    client: self.client.clone(),
                    url: url.to_string(),
                }))
            }
            LoginMethod::Stream | LoginMethod::Rtsp { .. } => None,
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
    use crate::credentials::FormSpec;
    use crate::credentials::trials::HttpFormLogin;
    use crate::fingerprint::{BodyContains, ElementId, FingerprintRule, HeaderContains, SelectorPresent};
    use axum::Router;
    use axum::response::Html;
    use axum::routing::get;
    use camprobe_common::models::Credential;
    use std::net::Ipv4Addr;
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        port
    }

    fn verifier(port: u16, rules: RuleSet) -> HttpFingerprintVerifier {
        let client = HttpClient::new(Duration::from_secs(3)).unwrap();
        HttpFingerprintVerifier::new(
            client.clone(),
            vec![port],
            vec!["/login.asp".into(), "/".into()],
            rules,
            Arc::new(HttpFormLogin::new(client)),
        )
    }

    fn hikvision_rules() -> RuleSet {
        RuleSet::new(
            vec![
                FingerprintRule::new("Hikvision")
                    .signal(SelectorPresent::new(".login-part").unwrap(), 1)
                    .credentials(vec![Credential::new("admin", "admin")])
                    .login(LoginMethod::Form(
                        FormSpec::new("username", "password", ".login-error").unwrap(),
                    )),
            ],
            MatchPolicy::FirstMatch,
        )
    }

    #[tokio::test]
    async fn known_fingerprint_yields_category() {
        let app = Router::new().route(
            "/login.asp",
            get(|| async { Html(r#"<div class="login-part"><input name="password"></div>"#) }),
        );
        let port = serve(app).await;
        let endpoint = Endpoint::new(Ipv4Addr::LOCALHOST, port);
        let verifier = verifier(port, hikvision_rules());

        let url = format!("http://127.0.0.1:{port}/login.asp");
        let Verification::Confirmed(verified) = verifier.verify(endpoint, &url).await.unwrap() else {
            panic!("fingerprint should match");
        };

        assert_eq!(verified.category.as_deref(), Some("Hikvision"));
        assert!(matches!(verified.access, Access::Protected { .. }));
        assert_eq!(verified.evidence.status, Some(200));
        assert!(verifier.credential_trial(&verified).is_some());
    }

    #[tokio::test]
    async fn unrelated_page_is_no_match() {
        let app = Router::new().route("/", get(|| async { Html("<h1>Printer status</h1>") }));
        let port = serve(app).await;
        let endpoint = Endpoint::new(Ipv4Addr::LOCALHOST, port);
        let verifier = verifier(port, hikvision_rules());

        let root = format!("http://127.0.0.1:{port}/");
        let missing = format!("http://127.0.0.1:{port}/login.asp");
        assert!(matches!(
            verifier.verify(endpoint, &root).await.unwrap(),
            Verification::NoMatch
        ));
        assert!(matches!(
            verifier.verify(endpoint, &missing).await.unwrap(),
            Verification::NoMatch
        ));
    }

    #[tokio::test]
    async fn login_page_without_login_check_is_not_confirmed() {
        let app = Router::new().route(
            "/",
            get(|| async { Html(r#"<div id="image-1010-img"></div>"#) }),
        );
        let port = serve(app).await;
        let endpoint = Endpoint::new(Ipv4Addr::LOCALHOST, port);
        let rules = RuleSet::new(
            vec![FingerprintRule::new("XVR").signal(ElementId::new("image-1010-img"), 1)],
            MatchPolicy::FirstMatch,
        );
        let verifier = verifier(port, rules);

        let url = format!("http://127.0.0.1:{port}/");
        assert!(matches!(
            verifier.verify(endpoint, &url).await.unwrap(),
            Verification::NoMatch
        ));
    }

    #[tokio::test]
    async fn scoring_records_confidence() {
        let app = Router::new().route(
            "/",
            get(|| async {
                (
                    [("server", "App-webs/")],
                    Html(r#"<input id="password"><video src="/live"></video>"#),
                )
            }),
        );
        let port = serve(app).await;
        let endpoint = Endpoint::new(Ipv4Addr::LOCALHOST, port);
        let rules = RuleSet::new(
            vec![
                FingerprintRule::new("IP Camera")
                    .signal(HeaderContains::new("App-webs"), 2)
                    .signal(BodyContains::new("App-webs"), 1)
                    .signal(SelectorPresent::new("#password").unwrap(), 2)
                    .signal(SelectorPresent::new("video").unwrap(), 3),
            ],
            MatchPolicy::Score { threshold: 4 },
        );
        let verifier = verifier(port, rules);

        let url = format!("http://127.0.0.1:{port}/");
        let Verification::Confirmed(verified) = verifier.verify(endpoint, &url).await.unwrap() else {
            panic!("score should pass the threshold");
        };
        assert_eq!(verified.confidence, Some(7));
        assert!(matches!(verified.access, Access::Open));
    }

    #[test]
    fn candidates_follow_paths_and_schemes() {
        let client = HttpClient::new(Duration::from_secs(1)).unwrap();
        let verifier = HttpFingerprintVerifier::new(
            client.clone(),
            vec![80, 443],
            vec!["/".into(), "/doc/page/login.asp".into()],
            RuleSet::new(Vec::new(), MatchPolicy::FirstMatch),
            Arc::new(HttpFormLogin::new(client)),
        );

        let http = verifier.candidates(Endpoint::new(Ipv4Addr::new(10, 0, 0, 1), 80));
        assert_eq!(
            http,
            vec!["http://10.0.0.1:80/", "http://10.0.0.1:80/doc/page/login.asp"]
        );

        let tls = verifier.candidates(Endpoint::new(Ipv4Addr::new(10, 0, 0, 1), 443));
        assert_eq!(tls[0], "https://10.0.0.1:443/");

        let both = verifier
            .both_schemes(true)
            .candidates(Endpoint::new(Ipv4Addr::new(10, 0, 0, 1), 8080));
        assert_eq!(both.len(), 4);
    }
}
