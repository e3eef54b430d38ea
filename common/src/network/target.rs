//! # Scan Target Model
//!
//! Parses the address expressions accepted on the command line and in
//! target files:
//! * A single IPv4 address (`192.168.1.5`).
//! * An IPv4 range (`192.168.1.1-100` or `192.168.1.1-192.168.2.10`).
//! * A CIDR block (`192.168.1.0/24`), network and broadcast excluded.
//! * A URL whose host is an IPv4 address (`http://192.168.1.5:8080/login`).
//! * A comma separated list of any of the above.

use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::network::range::{self, IpCollection, Ipv4Range};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A single host.
    Host { target_addr: Ipv4Addr },
    /// A contiguous block of IPv4 addresses.
    Range { ipv4_range: Ipv4Range },
    /// Holds a list of different targets
    Multi { targets: Vec<Target> },
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.contains(',') {
            return parse_commas(s);
        }

        if let Some(target) = parse_host(s) {
            return Ok(target);
        }

        if let Some(target) = parse_url(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_cidr_range(s)? {
            return Ok(target);
        }

        Err(format!("invalid target: {s}"))
    }
}

impl Target {
    /// Number of addresses this target expands to, duplicates included.
    pub fn address_count(&self) -> u64 {
        match self {
            Target::Host { .. } => 1,
            Target::Range { ipv4_range } => ipv4_range.len(),
            Target::Multi { targets } => targets.iter().map(Target::address_count).sum(),
        }
    }

    /// Expands into `collection`, which drops addresses it already holds.
    pub fn add_to(self, collection: &mut IpCollection) {
        match self {
            Target::Host { target_addr } => collection.add_single(target_addr),
            Target::Range { ipv4_range } => collection.add_range(ipv4_range),
            Target::Multi { targets } => targets.into_iter().for_each(|t| t.add_to(collection)),
        }
    }
}

/// `10.0.0.5, 10.0.0.1-50`. Empty items are skipped.
fn parse_commas(s: &str) -> Result<Target, String> {
    let targets = s
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| Target::from_str(part).map_err(|e| format!("bad item '{part}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    if targets.is_empty() {
        return Err(format!("no targets in '{s}'"));
    }

    Ok(Target::Multi { targets })
}

fn parse_host(s: &str) -> Option<Target> {
    s.parse::<Ipv4Addr>()
        .ok()
        .map(|target_addr| Target::Host { target_addr })
}

/// Parses a URL and keeps its host. Only IPv4 hosts are accepted.
fn parse_url(s: &str) -> Result<Option<Target>, String> {
    if !s.contains("://") {
        return Ok(None);
    }

    let parsed = url::Url::parse(s).map_err(|e| format!("invalid url '{s}': {e}"))?;
    // Hosts of non-special schemes such as rtsp:// come back as opaque domains.
    let target_addr = match parsed.host() {
        Some(url::Host::Ipv4(addr)) => Some(addr),
        Some(url::Host::Domain(domain)) => domain.parse::<Ipv4Addr>().ok(),
        _ => None,
    };

    target_addr
        .map(|target_addr| Some(Target::Host { target_addr }))
        .ok_or_else(|| format!("url '{s}' has no IPv4 host"))
}

/// `a.b.c.d-e.f.g.h`, or a short end that replaces the trailing octets of
/// the start (`192.168.1.10-50`, `192.168.1.10-2.66`).
fn parse_ip_range(s: &str) -> Result<Option<Target>, String> {
    let Some((first, last)) = s.split_once('-') else {
        return Ok(None);
    };

    let start_addr: Ipv4Addr = first
        .trim()
        .parse()
        .map_err(|e| format!("bad range start '{first}': {e}"))?;
    let end_addr = range_end(start_addr, last.trim())?;

    if end_addr < start_addr {
        return Err(format!("range '{s}' ends before it starts"));
    }

    Ok(Some(Target::Range {
        ipv4_range: Ipv4Range::new(start_addr, end_addr),
    }))
}

fn range_end(start_addr: Ipv4Addr, end: &str) -> Result<Ipv4Addr, String> {
    if let Ok(addr) = end.parse::<Ipv4Addr>() {
        return Ok(addr);
    }
    if end.is_empty() {
        return Err("range end is empty".to_string());
    }

    let tail = end
        .split('.')
        .map(str::parse::<u8>)
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| format!("bad range end '{end}': {e}"))?;
    if tail.len() > 4 {
        return Err(format!("range end '{end}' has too many octets"));
    }

    let mut octets = start_addr.octets();
    octets[4 - tail.len()..].copy_from_slice(&tail);
    Ok(Ipv4Addr::from(octets))
}

/// `192.168.1.0/24`, expanded to usable hosts.
pub fn parse_cidr_range(s: &str) -> Result<Option<Target>, String> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let ipv4_addr = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|e| format!("Invalid IP in CIDR '{ip_str}': {e}"))?;

    let prefix = prefix_str
        .parse::<u8>()
        .map_err(|e| format!("Invalid prefix in CIDR '{prefix_str}': {e}"))?;

    let ipv4_range = range::cidr_hosts(ipv4_addr, prefix).map_err(|e| e.to_string())?;

    Ok(Some(Target::Range { ipv4_range }))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
