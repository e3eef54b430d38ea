#![cfg(test)]
use std::collections::HashMap;

use axum::Form;
use axum::Router;
use axum::response::Html;
use axum::routing::get;
use camprobe_core::profiles::{self, ProfileOptions};
use tokio::net::TcpListener;

use super::support;

const LOGIN_PAGE: &str = r#"<html><body><div class="login-part">
<form><input name="username"><input name="password" type="password"></form>
</div></body></html>"#;

const LOGIN_FAILED: &str = r#"<html><body><div class="login-part">
<div class="login-error">Invalid user name or password</div>
<form><input name="username"><input name="password" type="password"></form>
</div></body></html>"#;

async fn login(Form(fields): Form<HashMap<String, String>>) -> Html<&'static str> {
    let user = fields.get("username").map(String::as_str);
    let pass = fields.get("password").map(String::as_str);
    if user == Some("admin") && pass == Some("admin") {
        Html("<html><body><div id=\"preview\">Live View</div></body></html>")
    } else {
        Html(LOGIN_FAILED)
    }
}

async fn stub_camera() -> u16 {
    let app = Router::new().route("/login.asp", get(|| async { Html(LOGIN_PAGE) }).post(login));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

/// A fingerprinted login page that accepts admin:admin ends up as exactly
/// one line carrying that credential.
#[tokio::test]
async fn identify_finds_default_login() {
    let port = stub_camera().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("found_devices.txt");

    let opts = ProfileOptions {
        ports: Some(vec![port]),
        paths: Some(vec!["/login.asp".to_string()]),
        ..ProfileOptions::default()
    };
    let profile = profiles::identify(&opts).unwrap();

    let run = support::scan(support::localhost(), profile, &output, None).await;

    assert_eq!(run.summary.discoveries, 1);
    let lines = support::lines(&output);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("admin:admin"), "unexpected line: {}", lines[0]);
    assert!(lines[0].starts_with(&format!("http://127.0.0.1:{port}/login.asp")));
}

/// Repeating the scan against the same file does not touch earlier lines.
#[tokio::test]
async fn output_file_is_appended() {
    let port = stub_camera().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("found_devices.txt");
    std::fs::write(&output, "rtsp://10.0.0.1:554/live\n").unwrap();

    let opts = ProfileOptions {
        ports: Some(vec![port]),
        paths: Some(vec!["/login.asp".to_string()]),
        ..ProfileOptions::default()
    };
    let profile = profiles::identify(&opts).unwrap();
    support::scan(support::localhost(), profile, &output, None).await;

    let lines = support::lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "rtsp://10.0.0.1:554/live");
}

async fn serve_page(page: &'static str) -> u16 {
    let app = Router::new().route("/", get(move || async move { Html(page) }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

/// Ordinary admin pages and login pages without a known login check stay
/// out of the result file.
#[tokio::test]
async fn pages_without_login_check_are_not_recorded() {
    let pages = [
        r#"<html><body><div id="content"><h1>Router admin</h1></div></body></html>"#,
        r#"<html><body><img id="image-1010-img" src="/logo.png"></body></html>"#,
    ];

    for page in pages {
        let port = serve_page(page).await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("found_devices.txt");

        let opts = ProfileOptions {
            ports: Some(vec![port]),
            paths: Some(vec!["/".to_string()]),
            ..ProfileOptions::default()
        };
        let run = support::scan(support::localhost(), profiles::identify(&opts).unwrap(), &output, None).await;

        assert_eq!(run.summary.discoveries, 0, "recorded {page}");
        assert_eq!(run.summary.unverified, 1);
        assert!(support::lines(&output).is_empty());
    }
}
