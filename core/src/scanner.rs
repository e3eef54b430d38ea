//! The scan coordinator.
//!
//! [`Scanner`] runs a pool of workers over the address queue of a
//! [`ScanSession`]. Each worker owns one address at a time and walks it
//! through the same pipeline:
//!
//! 1. **Port check**: every profile port is probed through the session's
//!    socket budget.
//! 2. **Protocol check**: every verifier claiming an open port checks its
//!    candidate urls. The first confirmation per endpoint and verifier wins.
//! 3. **Credential check**: protected confirmations get their default
//!    credentials tried until one works.
//!
//! Confirmed devices go to the session's result sink. A failing target never
//! takes the pool down: errors are logged and the target counts as having
//! no discovery.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use camprobe_common::models::{Endpoint, FoundDevice};
use camprobe_common::{error, success};
use futures::{StreamExt, stream};
use tracing::{debug, info};

use crate::credentials::{TrialOutcome, try_credentials};
use crate::profiles::ScanProfile;
use crate::session::ScanSession;
use crate::verifier::{Access, ProtocolVerifier, Verification, Verified};

/// Where a target is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Queued,
    PortChecking,
    Unreachable,
    ProtocolChecking,
    Unverified,
    CredentialChecking,
    Done { discoveries: usize, locked: usize },
}

#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub total: usize,
    pub completed: usize,
    pub discoveries: usize,
    /// Targets without a single open profile port.
    pub unreachable: usize,
    /// Targets with open ports but no confirmed endpoint.
    pub unverified: usize,
    /// Protected endpoints where no default credential worked.
    pub locked: usize,
    /// Targets whose task panicked.
    pub failed: usize,
    pub elapsed: Duration,
    pub interrupted: bool,
}

#[derive(Default)]
struct Tally {
    discoveries: AtomicUsize,
    unreachable: AtomicUsize,
    unverified: AtomicUsize,
    locked: AtomicUsize,
    failed: AtomicUsize,
}

impl Tally {
    fn count(&self, state: TargetState) {
        match state {
            TargetState::Unreachable => _ = self.unreachable.fetch_add(1, Ordering::Relaxed),
            TargetState::Unverified => _ = self.unverified.fetch_add(1, Ordering::Relaxed),
            TargetState::Done { discoveries, locked } => {
                self.discoveries.fetch_add(discoveries, Ordering::Relaxed);
                self.locked.fetch_add(locked, Ordering::Relaxed);
            }
            _ => {}
        }
    }
}

pub struct Scanner {
    session: Arc<ScanSession>,
    profile: Arc<ScanProfile>,
}

impl Scanner {
    pub fn new(session: Arc<ScanSession>, profile: Arc<ScanProfile>) -> Self {
        Self { session, profile }
    }

    pub async fn run(&self) -> ScanSummary {
        let start = Instant::now();
        let total = self.session.progress().total;
        let workers = self.session.config().threads.max(1).min(total);
        let tally = Arc::new(Tally::default());

        info!(
            "{} scan over {total} addresses with {workers} workers",
            self.profile.name
        );

        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let session = self.session.clone();
                let profile = self.profile.clone();
                let tally = tally.clone();
                tokio::spawn(worker(session, profile, tally))
            })
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Scan worker stopped unexpectedly: {e}");
            }
        }

        ScanSummary {
            total,
            completed: self.session.progress().completed,
            discoveries: tally.discoveries.load(Ordering::Relaxed),
            unreachable: tally.unreachable.load(Ordering::Relaxed),
            unverified: tally.unverified.load(Ordering::Relaxed),
            locked: tally.locked.load(Ordering::Relaxed),
            failed: tally.failed.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
            interrupted: self.session.is_stopped(),
        }
    }
}

async fn worker(session: Arc<ScanSession>, profile: Arc<ScanProfile>, tally: Arc<Tally>) {
    while let Some(addr) = session.next_address() {
        trace_state(addr, TargetState::Queued);

        // Own task per target, so a panic inside a verifier only costs
        // this address.
        let task = tokio::spawn(scan_target(session.clone(), profile.clone(), addr));
        match task.await {
            Ok(state) => tally.count(state),
            Err(e) => {
                error!("{addr}: target scan failed: {e}");
                tally.failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        session.complete_one();
    }
}

async fn scan_target(session: Arc<ScanSession>, profile: Arc<ScanProfile>, addr: Ipv4Addr) -> TargetState {
    let config = session.config();

    trace_state(addr, TargetState::PortChecking);
    let mut open_ports: Vec<u16> = stream::iter(profile.ports.iter().copied())
        .map(|port| {
            let session = &session;
            async move { (port, session.prober().probe(Endpoint::new(addr, port)).await) }
        })
        .buffer_unordered(config.port_workers.max(1))
        .filter_map(|(port, open)| async move { open.then_some(port) })
        .collect()
        .await;

    if open_ports.is_empty() {
        return trace_state(addr, TargetState::Unreachable);
    }
    open_ports.sort_unstable();
    debug!("{addr}: open ports {open_ports:?}");

    trace_state(addr, TargetState::ProtocolChecking);
    let mut confirmed: Vec<(&dyn ProtocolVerifier, Verified)> = Vec::new();
    for &port in &open_ports {
        let endpoint = Endpoint::new(addr, port);
        for verifier in profile.verifiers.iter().filter(|v| v.claims(port)) {
            if let Some(verified) = first_confirmation(verifier.as_ref(), endpoint, config.path_workers).await {
                confirmed.push((verifier.as_ref(), verified));
            }
        }
    }

    if confirmed.is_empty() {
        return trace_state(addr, TargetState::Unverified);
    }

    let mut discoveries = 0;
    let mut locked = 0;
    for (verifier, verified) in confirmed {
        if let Some(score) = verified.confidence {
            info!("{} scored {score}", verified.url);
        }

        let device = match &verified.access {
            Access::Open => Some(verified.into_device(None)),
            Access::Protected { credentials, .. } => {
                trace_state(addr, TargetState::CredentialChecking);
                match verifier.credential_trial(&verified) {
                    Some(trial) => {
                        match try_credentials(trial.as_ref(), credentials, config.credential_workers).await {
                            TrialOutcome::Found(credential) => Some(verified.into_device(Some(credential))),
                            TrialOutcome::NoCredentialFound => {
                                info!("{}: no default credential accepted", verified.url);
                                None
                            }
                        }
                    }
                    None => None,
                }
            }
        };

        match device {
            Some(device) => {
                if record(&session, addr, device) {
                    discoveries += 1;
                }
            }
            None => locked += 1,
        }
    }

    trace_state(addr, TargetState::Done { discoveries, locked })
}

/// Checks candidates on a bounded pool and keeps the first confirmation.
/// Checks still in flight are dropped once one confirms.
async fn first_confirmation(verifier: &dyn ProtocolVerifier, endpoint: Endpoint, workers: usize) -> Option<Verified> {
    let mut checks = stream::iter(verifier.candidates(endpoint))
        .map(|candidate| async move {
            let outcome = verifier.verify(endpoint, &candidate).await;
            (candidate, outcome)
        })
        .buffer_unordered(workers.max(1));

    while let Some((candidate, outcome)) = checks.next().await {
        match outcome {
            Ok(Verification::Confirmed(verified)) => {
                debug!("{candidate}: confirmed by {}", verifier.name());
                return Some(verified);
            }
            Ok(Verification::NoMatch) => {}
            Err(e) => debug!("{candidate}: {e}"),
        }
    }
    None
}

fn record(session: &ScanSession, addr: Ipv4Addr, device: FoundDevice) -> bool {
    let line = device.to_string();
    if session.record(addr, device) {
        success!("{line}");
        true
    } else {
        false
    }
}

fn trace_state(addr: Ipv4Addr, state: TargetState) -> TargetState {
    debug!("{addr}: {state:?}");
    state
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
