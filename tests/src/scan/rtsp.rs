#![cfg(test)]
use camprobe_core::profiles::{self, ProfileOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::support;

const OPTIONS_OK: &str = "RTSP/1.0 200 OK\r\nCSeq: 1\r\nPublic: OPTIONS, DESCRIBE, SETUP, PLAY\r\n\r\n";
const DESCRIBE_OK: &str = "RTSP/1.0 200 OK\r\nCSeq: 2\r\nContent-Type: application/sdp\r\nContent-Length: 22\r\n\r\nm=video 0 RTP/AVP 96\r\n";
const UNAUTHORIZED: &str = "RTSP/1.0 401 Unauthorized\r\nCSeq: 2\r\nWWW-Authenticate: Basic realm=\"stub\"\r\n\r\n";
const NOT_FOUND: &str = "RTSP/1.0 404 Not Found\r\nCSeq: 1\r\n\r\n";

/// Serves `/live.sdp` behind admin:12345. Every other path is unknown.
async fn stub_stream() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                while let Ok(n) = socket.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();
                    let line = request.lines().next().unwrap_or_default().to_string();

                    let reply = if !line.contains("/live.sdp ") {
                        NOT_FOUND
                    } else if line.starts_with("OPTIONS") {
                        OPTIONS_OK
                    } else if line.starts_with("DESCRIBE rtsp://admin:12345@") {
                        DESCRIBE_OK
                    } else {
                        UNAUTHORIZED
                    };

                    if socket.write_all(reply.as_bytes()).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    port
}

#[tokio::test]
async fn rtsp_scan_finds_protected_stream() {
    let port = stub_stream().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("rtsp_streams.txt");
    let hosts = dir.path().join("ips.txt");

    let opts = ProfileOptions {
        ports: Some(vec![port]),
        paths: Some(vec!["/11".to_string(), "/live.sdp".to_string()]),
        ..ProfileOptions::default()
    };
    let run = support::scan(support::localhost(), profiles::rtsp(&opts), &output, Some(&hosts)).await;

    assert_eq!(run.summary.discoveries, 1);
    assert_eq!(
        support::lines(&output),
        vec![format!("rtsp://127.0.0.1:{port}/live.sdp (Auth: admin:12345)")]
    );
    assert_eq!(support::lines(&hosts), vec!["127.0.0.1".to_string()]);
}

#[tokio::test]
async fn wrong_password_leaves_stream_locked() {
    let port = stub_stream().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("rtsp_streams.txt");

    let opts = ProfileOptions {
        ports: Some(vec![port]),
        paths: Some(vec!["/live.sdp".to_string()]),
        password: Some("not-the-password".to_string()),
        ..ProfileOptions::default()
    };
    let run = support::scan(support::localhost(), profiles::rtsp(&opts), &output, None).await;

    assert_eq!(run.summary.discoveries, 0);
    assert_eq!(run.summary.locked, 1);
    assert!(run.session.found().is_empty());
    assert!(support::lines(&output).is_empty());
}
