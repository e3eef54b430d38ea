use std::sync::Arc;
use std::time::Duration;

use camprobe_common::models::Endpoint;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time::timeout;

/// TCP reachability check bounded by a global socket budget.
#[derive(Debug, Clone)]
pub struct PortProber {
    permits: Arc<Semaphore>,
    max_sockets: usize,
    timeout: Duration,
}

impl PortProber {
    pub fn new(max_sockets: usize, timeout: Duration) -> Self {
        let max_sockets = max_sockets.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_sockets)),
            max_sockets,
            timeout,
        }
    }

    /// Returns true iff a TCP handshake with `endpoint` completes in time.
    ///
    /// A socket slot is held for the whole attempt and released when the
    /// permit drops, whichever way the attempt ends.
    pub async fn probe(&self, endpoint: Endpoint) -> bool {
        let Ok(_permit) = self.permits.acquire().await else {
            return false;
        };

        matches!(
            timeout(self.timeout, TcpStream::connect(endpoint.socket_addr())).await,
            Ok(Ok(_))
        )
    }

    /// Free socket slots right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.max_sockets
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
