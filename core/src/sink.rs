//! Append-only result files.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use camprobe_common::error::ScanError;
use camprobe_common::models::FoundDevice;
use tracing::error;

struct SinkState {
    seen: HashSet<String>,
    file: File,
}

/// Writes each unique entry to the output file exactly once.
///
/// The de-duplication set and the file handle sit behind the same lock, so
/// "check, insert, write" is one step no matter how many workers report the
/// same discovery at once. Existing file contents are never truncated.
pub struct ResultSink {
    path: PathBuf,
    state: Mutex<SinkState>,
}

impl ResultSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| ScanError::FileIo {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            state: Mutex::new(SinkState {
                seen: HashSet::new(),
                file,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` when the device was new and has been handed to the file.
    pub fn record(&self, device: &FoundDevice) -> bool {
        self.append(&device.url, &device.to_string())
    }

    /// Appends a bare line, de-duplicated on its own content.
    pub fn record_line(&self, line: &str) -> bool {
        self.append(line, line)
    }

    pub fn len(&self) -> usize {
        self.lock().seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append(&self, key: &str, line: &str) -> bool {
        let mut state = self.lock();
        if !state.seen.insert(key.to_string()) {
            return false;
        }

        let entry = format!("{line}\n");
        if let Err(source) = state.file.write_all(entry.as_bytes()) {
            let e = ScanError::FileIo {
                path: self.path.clone(),
                source,
            };
            error!("{e}");
        }
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
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
