//! Device fingerprints.
//!
//! A [`FingerprintRule`] is a named list of weighted signals. Each signal is
//! a [`ContentMatcher`], a predicate over a fetched [`Page`]. How signals are
//! combined into a verdict is the [`MatchPolicy`] of the [`RuleSet`]:
//!
//! * `FirstMatch` picks the first rule whose signals all match.
//! * `Score` adds up the weights of the matching signals and picks the first
//!   rule, in order, that reaches the threshold.
//!
//! Rules are plain data built once per scan and shared read-only.

use std::fmt;

use camprobe_common::models::Credential;
use scraper::node::Element;
use scraper::{Html, Selector};

use crate::credentials::LoginMethod;
use crate::network::http::HttpReply;

/// A fetched document prepared for matching.
pub struct Page {
    headers: String,
    body: String,
    document: Html,
}

impl Page {
    pub fn new(headers: &[(String, String)], body: &str) -> Self {
        let headers = headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<String>>()
            .join("\n")
            .to_lowercase();

        Self {
            headers,
            body: body.to_lowercase(),
            document: Html::parse_document(body),
        }
    }

    pub fn from_reply(reply: &HttpReply) -> Self {
        Self::new(&reply.headers, &reply.text())
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.document.tree.values().filter_map(|node| node.as_element())
    }
}

pub trait ContentMatcher: Send + Sync + fmt::Debug {
    fn matches(&self, page: &Page) -> bool;
}

/// Case-insensitive substring of the body.
#[derive(Debug, Clone)]
pub struct BodyContains(String);

impl BodyContains {
    pub fn new(needle: &str) -> Self {
        Self(needle.to_lowercase())
    }
}

impl ContentMatcher for BodyContains {
    fn matches(&self, page: &Page) -> bool {
        page.body.contains(&self.0)
    }
}

/// Case-insensitive substring of any header name or value.
#[derive(Debug, Clone)]
pub struct HeaderContains(String);

impl HeaderContains {
    pub fn new(needle: &str) -> Self {
        Self(needle.to_lowercase())
    }
}

impl ContentMatcher for HeaderContains {
    fn matches(&self, page: &Page) -> bool {
        page.headers.contains(&self.0)
    }
}

/// At least one element matches a CSS selector.
#[derive(Debug, Clone)]
pub struct SelectorPresent {
    css: String,
    selector: Selector,
}

impl SelectorPresent {
    pub fn new(css: &str) -> anyhow::Result<Self> {
        let selector = Selector::parse(css)
            .map_err(|e| anyhow::anyhow!("invalid selector '{css}': {e}"))?;
        Ok(Self {
            css: css.to_string(),
            selector,
        })
    }

    pub fn css(&self) -> &str {
        &self.css
    }
}

impl ContentMatcher for SelectorPresent {
    fn matches(&self, page: &Page) -> bool {
        page.document.select(&self.selector).next().is_some()
    }
}

/// An element carries this `id`.
#[derive(Debug, Clone)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl ContentMatcher for ElementId {
    fn matches(&self, page: &Page) -> bool {
        page.elements().any(|element| element.id() == Some(self.0.as_str()))
    }
}

/// An element carries this class.
#[derive(Debug, Clone)]
pub struct ElementClass(String);

impl ElementClass {
    pub fn new(class: &str) -> Self {
        Self(class.to_string())
    }
}

impl ContentMatcher for ElementClass {
    fn matches(&self, page: &Page) -> bool {
        page.elements()
            .any(|element| element.classes().any(|class| class == self.0))
    }
}

/// At least one element with this tag name.
#[derive(Debug, Clone)]
pub struct TagPresent(String);

impl TagPresent {
    pub fn new(tag: &str) -> Self {
        Self(tag.to_ascii_lowercase())
    }
}

impl ContentMatcher for TagPresent {
    fn matches(&self, page: &Page) -> bool {
        page.elements().any(|element| element.name() == self.0)
    }
}

#[derive(Debug)]
pub struct Signal {
    pub matcher: Box<dyn ContentMatcher>,
    pub weight: u32,
}

#[derive(Debug)]
pub struct FingerprintRule {
    pub name: String,
    pub signals: Vec<Signal>,
    pub credentials: Vec<Credential>,
    pub login: Option<LoginMethod>,
}

impl FingerprintRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signals: Vec::new(),
            credentials: Vec::new(),
            login: None,
        }
    }

    pub fn signal(mut self, matcher: impl ContentMatcher + 'static, weight: u32) -> Self {
        self.signals.push(Signal {
            matcher: Box::new(matcher),
            weight,
        });
        self
    }

    pub fn credentials(mut self, credentials: Vec<Credential>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn login(mut self, login: LoginMethod) -> Self {
        self.login = Some(login);
        self
    }

    /// True when the rule has signals and every one of them matches.
    pub fn matches_all(&self, page: &Page) -> bool {
        !self.signals.is_empty() && self.signals.iter().all(|s| s.matcher.matches(page))
    }

    pub fn score(&self, page: &Page) -> u32 {
        self.signals
            .iter()
            .filter(|s| s.matcher.matches(page))
            .map(|s| s.weight)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    FirstMatch,
    Score { threshold: u32 },
}

#[derive(Debug)]
pub struct RuleMatch<'a> {
    pub rule: &'a FingerprintRule,
    pub score: u32,
}

#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<FingerprintRule>,
    policy: MatchPolicy,
}

impl RuleSet {
    pub fn new(rules: Vec<FingerprintRule>, policy: MatchPolicy) -> Self {
        Self { rules, policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn rules_mut(&mut self) -> impl Iterator<Item = &mut FingerprintRule> {
        self.rules.iter_mut()
    }

    pub fn evaluate(&self, page: &Page) -> Option<RuleMatch<'_>> {
        match self.policy {
            MatchPolicy::FirstMatch => self
                .rules
                .iter()
                .find(|rule| rule.matches_all(page))
                .map(|rule| RuleMatch {
                    rule,
                    score: rule.score(page),
                }),
            MatchPolicy::Score { threshold } => self
                .rules
                .iter()
                .map(|rule| RuleMatch {
                    rule,
                    score: rule.score(page),
                })
                .find(|candidate| candidate.score >= threshold),
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

    fn page(server: &str, body: &str) -> Page {
        Page::new(&[("Server".to_string(), server.to_string())], body)
    }

    fn selector(css: &str) -> SelectorPresent {
        SelectorPresent::new(css).unwrap()
    }

    #[test]
    fn matchers_are_case_insensitive_where_textual() {
        let page = page("DNVRS-Webs", "<html><title>HIKVISION</title></html>");

        assert!(HeaderContains::new("dnvrs-webs").matches(&page));
        assert!(BodyContains::new("Hikvision").matches(&page));
        assert!(!BodyContains::new("dahua").matches(&page));
    }

    #[test]
    fn selector_matches_structure_not_text() {
        let page = page("", "<div class=\"login-part\"><input id=\"username\"></div><p>.loginbg</p>");

        assert!(selector(".login-part").matches(&page));
        assert!(selector("#username").matches(&page));
        assert!(!selector(".loginbg").matches(&page));
    }

    #[test]
    fn element_matchers_look_at_attributes_and_tags() {
        let page = page(
            "",
            r#"<div id="image-1010-img" class="login-part wide"></div><video></video><p>loginbg</p>"#,
        );

        assert!(ElementId::new("image-1010-img").matches(&page));
        assert!(!ElementId::new("image-1010").matches(&page));
        assert!(ElementClass::new("login-part").matches(&page));
        assert!(ElementClass::new("wide").matches(&page));
        assert!(!ElementClass::new("loginbg").matches(&page));
        assert!(TagPresent::new("VIDEO").matches(&page));
        assert!(!TagPresent::new("object").matches(&page));
    }

    #[test]
    fn invalid_selector_is_rejected() {
        assert!(SelectorPresent::new("div[").is_err());
    }

    #[test]
    fn first_match_requires_every_signal() {
        let rules = RuleSet::new(
            vec![
                FingerprintRule::new("Sanetron")
                    .signal(selector(".loginingtip"), 1)
                    .signal(BodyContains::new("sanetron"), 1),
                FingerprintRule::new("Hikvision").signal(selector(".login-part"), 1),
            ],
            MatchPolicy::FirstMatch,
        );

        let hik = page("", "<div class=\"login-part\"></div><div class=\"loginingtip\"></div>");
        assert_eq!(rules.evaluate(&hik).map(|m| m.rule.name.as_str()), Some("Hikvision"));

        let unrelated = page("nginx", "<html><body>It works!</body></html>");
        assert!(rules.evaluate(&unrelated).is_none());
    }

    #[test]
    fn score_policy_uses_threshold() {
        let rule = FingerprintRule::new("IP Camera")
            .signal(HeaderContains::new("App-webs"), 2)
            .signal(BodyContains::new("App-webs"), 1)
            .signal(selector("#password"), 2)
            .signal(selector(".ptz"), 1)
            .signal(selector("video, object[type=\"application/x-vlc-plugin\"]"), 3);
        let rules = RuleSet::new(vec![rule], MatchPolicy::Score { threshold: 4 });

        let weak = page("App-webs/", "<form><input id=\"user\"></form>");
        assert!(rules.evaluate(&weak).is_none());

        let strong = page("App-webs/", "<input id=\"password\"><video></video>");
        let found = rules.evaluate(&strong).unwrap();
        assert_eq!(found.score, 7);
    }

    #[test]
    fn score_policy_prefers_earlier_rules() {
        let rules = RuleSet::new(
            vec![
                FingerprintRule::new("Hikvision").signal(BodyContains::new("hikvision"), 4),
                FingerprintRule::new("IP Camera")
                    .signal(BodyContains::new("hikvision"), 4)
                    .signal(BodyContains::new("camera"), 4),
            ],
            MatchPolicy::Score { threshold: 4 },
        );

        let page = page("", "hikvision network camera");
        assert_eq!(rules.evaluate(&page).unwrap().rule.name, "Hikvision");
    }
}
