//! Line based list files: credentials, paths and address lists.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::ScanError;
use crate::models::Credential;
use crate::warn;

/// Yields trimmed lines, skipping blanks and `#` comments.
pub fn clean_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

pub fn read_input(path: &Path) -> Result<String, ScanError> {
    fs::read_to_string(path)
        .map_err(|e| ScanError::InvalidInput(format!("cannot open {}: {e}", path.display())))
}

/// Reads a pattern list, one entry per line.
pub fn read_list(path: &Path) -> Result<Vec<String>, ScanError> {
    let content = read_input(path)?;
    Ok(clean_lines(&content).map(|(_, line)| line.to_string()).collect())
}

/// Reads `user:pass` pairs. Malformed lines are reported and skipped.
pub fn load_credentials(path: &Path) -> Result<Vec<Credential>, ScanError> {
    let content = read_input(path)?;
    let mut credentials = Vec::new();

    for (line_no, line) in clean_lines(&content) {
        match Credential::from_str(line) {
            Ok(credential) => credentials.push(credential),
            Err(e) => warn!("{}:{line_no}: {e}", path.display()),
        }
    }

    if credentials.is_empty() {
        return Err(ScanError::InvalidInput(format!(
            "{} contains no usable credentials",
            path.display()
        )));
    }

    Ok(credentials)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
