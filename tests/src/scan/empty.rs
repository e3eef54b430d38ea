#![cfg(test)]
use camprobe_common::network::source::AddressSource;
use camprobe_core::profiles::{self, ProfileOptions};

use super::support;

/// Nothing listening anywhere in the subnet: no discoveries and an
/// untouched output file.
#[tokio::test]
async fn unreachable_subnet_has_no_discoveries() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("found_devices.txt");
    let targets = AddressSource::Subnet("127.0.0.0/30".into()).resolve().unwrap();
    assert_eq!(targets.len(), 2);

    let opts = ProfileOptions {
        ports: Some(vec![port]),
        ..ProfileOptions::default()
    };
    let run = support::scan(targets, profiles::rtsp(&opts), &output, None).await;

    assert_eq!(run.summary.discoveries, 0);
    assert_eq!(run.summary.unreachable, 2);
    assert_eq!(run.summary.completed, 2);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
}
