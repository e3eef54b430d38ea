use std::time::Duration;

/// Runtime settings shared by the scan engine and the terminal layer.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of addresses processed at the same time.
    pub threads: usize,
    /// Timeout for a single HTTP request or RTSP exchange.
    pub timeout: Duration,
    /// Timeout for a single TCP reachability probe.
    pub probe_timeout: Duration,
    /// Global cap on sockets opened by reachability probes.
    ///
    /// Probes wait for a free slot instead of failing, so a low value slows
    /// the scan down but never hides a host.
    pub max_sockets: usize,
    pub port_workers: usize,
    pub path_workers: usize,
    pub credential_workers: usize,
    /// 0 prints everything, 1 skips headers, 2 prints only the summary.
    pub quiet: u8,
    pub no_banner: bool,
    /// Disables the keyboard listener used to stop a scan early.
    pub disable_input: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 50,
            timeout: Duration::from_secs(3),
            probe_timeout: Duration::from_secs(2),
            max_sockets: 1000,
            port_workers: 16,
            path_workers: 10,
            credential_workers: 5,
            quiet: 0,
            no_banner: false,
            disable_input: false,
        }
    }
}
