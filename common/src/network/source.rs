//! Where scan addresses come from: one host, one subnet, or a list file.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ScanError;
use crate::lists;
use crate::network::range::IpCollection;
use crate::network::target::{self, Target};
use crate::{success, warn};

/// Upper bound on addresses in a single scan (a /8).
pub const MAX_ADDRESSES: u64 = 1 << 24;

#[derive(Debug, Clone)]
pub enum AddressSource {
    Single(Ipv4Addr),
    Subnet(String),
    File(PathBuf),
}

impl AddressSource {
    /// Expands the source into an ordered, de-duplicated address set.
    ///
    /// An empty result is not an error. Malformed lines in a file are
    /// reported and skipped, while a malformed subnet or an unreadable file
    /// aborts with `InvalidInput`.
    pub fn resolve(&self) -> Result<IpCollection, ScanError> {
        let mut collection = IpCollection::new();

        match self {
            AddressSource::Single(addr) => collection.add_single(*addr),
            AddressSource::Subnet(subnet) => {
                let target = target::parse_cidr_range(subnet.trim())
                    .map_err(ScanError::InvalidInput)?
                    .ok_or_else(|| {
                        ScanError::InvalidInput(format!("'{subnet}' is not in CIDR notation"))
                    })?;
                add_bounded(target, &mut collection)?;
            }
            AddressSource::File(path) => {
                let content = lists::read_input(path)?;
                for (line_no, line) in lists::clean_lines(&content) {
                    match parse_line(line) {
                        Ok(target) => add_bounded(target, &mut collection)?,
                        Err(e) => warn!("{}:{line_no}: skipping line, {e}", path.display()),
                    }
                }
            }
        }

        let len: usize = collection.len();
        let unit: &str = if len == 1 { "IP address has been" } else { "IP addresses have been" };
        success!("{len} {unit} parsed successfully");

        Ok(collection)
    }
}

fn add_bounded(target: Target, collection: &mut IpCollection) -> Result<(), ScanError> {
    let incoming = target.address_count();
    if collection.len() as u64 + incoming > MAX_ADDRESSES {
        return Err(ScanError::InvalidInput(format!(
            "target list exceeds {MAX_ADDRESSES} addresses"
        )));
    }
    target.add_to(collection);
    Ok(())
}

/// Parses the first whitespace separated token of a line.
///
/// This lets result files from an earlier run, whose lines carry trailing
/// `(Auth: ...)` segments, be fed back in as targets.
pub fn parse_line(line: &str) -> Result<Target, String> {
    let token = line.split_whitespace().next().unwrap_or_default();
    Target::from_str(token)
}

/// Extracts the host address of a raw result line.
pub fn extract_host(line: &str) -> Option<Ipv4Addr> {
    match parse_line(line).ok()? {
        Target::Host { target_addr } => Some(target_addr),
        _ => None,
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
