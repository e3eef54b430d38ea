use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use camprobe_common::config::Config;
use camprobe_common::network::range::IpCollection;
use camprobe_core::profiles::ScanProfile;
use camprobe_core::scanner::{ScanSummary, Scanner};
use camprobe_core::session::ScanSession;
use camprobe_core::sink::ResultSink;

pub fn config() -> Config {
    Config {
        threads: 4,
        timeout: Duration::from_secs(2),
        probe_timeout: Duration::from_secs(1),
        disable_input: true,
        no_banner: true,
        ..Config::default()
    }
}

pub fn localhost() -> IpCollection {
    let mut targets = IpCollection::new();
    targets.add_single(Ipv4Addr::LOCALHOST);
    targets
}

pub struct Run {
    pub summary: ScanSummary,
    pub session: Arc<ScanSession>,
}

pub async fn scan(targets: IpCollection, profile: ScanProfile, output: &PathBuf, hosts: Option<&PathBuf>) -> Run {
    let sink = ResultSink::open(output).unwrap();
    let mut session = ScanSession::new(config(), targets, sink);
    if let Some(hosts) = hosts {
        session = session.with_hosts_output(ResultSink::open(hosts).unwrap());
    }
    let session = Arc::new(session);

    let summary = Scanner::new(session.clone(), Arc::new(profile)).run().await;
    Run { summary, session }
}

pub fn lines(path: &PathBuf) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
