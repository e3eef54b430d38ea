//! Mutable state of one scan run.

use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use camprobe_common::config::Config;
use camprobe_common::models::FoundDevice;
use camprobe_common::network::range::IpCollection;

use crate::network::tcp::PortProber;
use crate::sink::ResultSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanProgress {
    pub total: usize,
    pub completed: usize,
}

impl ScanProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 * 100.0 / self.total as f64
    }
}

/// Cloneable switch that asks every worker to stop taking new addresses.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

type ProgressCallback = Box<dyn Fn(ScanProgress) + Send + Sync>;

/// Everything workers share during a scan: the address queue, the socket
/// budget, progress counters, the result files and the stop flag.
///
/// A session is built for exactly one run, so counters always start at zero.
pub struct ScanSession {
    config: Config,
    queue: Mutex<VecDeque<Ipv4Addr>>,
    prober: PortProber,
    progress: Mutex<ScanProgress>,
    sink: ResultSink,
    hosts: Option<ResultSink>,
    found: Mutex<Vec<FoundDevice>>,
    stop: StopHandle,
    on_progress: Option<ProgressCallback>,
}

impl ScanSession {
    pub fn new(config: Config, addresses: IpCollection, sink: ResultSink) -> Self {
        let queue: VecDeque<Ipv4Addr> = addresses.into_iter().collect();
        let progress = ScanProgress {
            total: queue.len(),
            completed: 0,
        };

        Self {
            prober: PortProber::new(config.max_sockets, config.probe_timeout),
            config,
            queue: Mutex::new(queue),
            progress: Mutex::new(progress),
            sink,
            hosts: None,
            found: Mutex::new(Vec::new()),
            stop: StopHandle::default(),
            on_progress: None,
        }
    }

    /// Also appends the bare address of every host with a discovery.
    pub fn with_hosts_output(mut self, hosts: ResultSink) -> Self {
        self.hosts = Some(hosts);
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(ScanProgress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn prober(&self) -> &PortProber {
        &self.prober
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Pops the next address. `None` once the queue is drained or the scan
    /// has been stopped.
    pub fn next_address(&self) -> Option<Ipv4Addr> {
        if self.is_stopped() {
            return None;
        }
        lock(&self.queue).pop_front()
    }

    pub fn complete_one(&self) -> ScanProgress {
        let progress = {
            let mut progress = lock(&self.progress);
            progress.completed += 1;
            *progress
        };

        if let Some(callback) = &self.on_progress {
            callback(progress);
        }
        progress
    }

    pub fn progress(&self) -> ScanProgress {
        *lock(&self.progress)
    }

    /// Persists a discovery. Returns `false` for a url that was already
    /// recorded during this run.
    pub fn record(&self, addr: Ipv4Addr, device: FoundDevice) -> bool {
        if !self.sink.record(&device) {
            return false;
        }

        if let Some(hosts) = &self.hosts {
            hosts.record_line(&addr.to_string());
        }
        lock(&self.found).push(device);
        true
    }

    pub fn found(&self) -> Vec<FoundDevice> {
        lock(&self.found).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
