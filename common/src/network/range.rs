use std::collections::HashSet;
use std::net::Ipv4Addr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn to_iter(&self) -> impl Iterator<Item = Ipv4Addr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }

    /// Number of addresses in the range, zero when `end < start`.
    pub fn len(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if end < start {
            return 0;
        }
        u64::from(end - start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Full block of a CIDR network, network and broadcast included.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = pnet::ipnetwork::Ipv4Network::new(ip, prefix)?;
    let start = network.network();
    let end = network.broadcast();

    Ok(Ipv4Range::new(start, end))
}

/// Usable host addresses of a CIDR network.
///
/// Network and broadcast are stripped for prefixes up to /30. A /31 or /32
/// has no such addresses and is returned whole.
pub fn cidr_hosts(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let block = cidr_range(ip, prefix)?;
    if prefix > 30 {
        return Ok(block);
    }

    let start = u32::from(block.start_addr) + 1;
    let end = u32::from(block.end_addr) - 1;
    Ok(Ipv4Range::new(start.into(), end.into()))
}

/// Ordered set of addresses. Insertion order is kept, duplicates are dropped.
#[derive(Debug, Default, Clone)]
pub struct IpCollection {
    addrs: Vec<Ipv4Addr>,
    seen: HashSet<Ipv4Addr>,
}

impl IpCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_single(&mut self, addr: Ipv4Addr) {
        if self.seen.insert(addr) {
            self.addrs.push(addr);
        }
    }

    pub fn add_range(&mut self, range: Ipv4Range) {
        for addr in range.to_iter() {
            self.add_single(addr);
        }
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ipv4Addr> {
        self.addrs.iter()
    }
}

impl IntoIterator for IpCollection {
    type Item = Ipv4Addr;
    type IntoIter = std::vec::IntoIter<Ipv4Addr>;

    fn into_iter(self) -> Self::IntoIter {
        self.addrs.into_iter()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_iter_and_len() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 250), Ipv4Addr::new(10, 0, 1, 2));
        let addrs: Vec<Ipv4Addr> = range.to_iter().collect();
        assert_eq!(addrs.len(), 9);
        assert_eq!(range.len(), 9);
        assert_eq!(addrs[6], Ipv4Addr::new(10, 0, 1, 0));
    }

    #[test]
    fn reversed_range_is_empty() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 9), Ipv4Addr::new(10, 0, 0, 1));
        assert!(range.is_empty());
        assert_eq!(range.to_iter().count(), 0);
    }

    #[test]
    fn cidr_hosts_excludes_network_and_broadcast() {
        for prefix in 0..=30u8 {
            let range = cidr_hosts(Ipv4Addr::new(172, 16, 5, 77), prefix).unwrap();
            assert_eq!(range.len(), (1u64 << (32 - prefix)) - 2, "prefix /{prefix}");
        }
    }

    #[test]
    fn cidr_hosts_slash_24() {
        let range = cidr_hosts(Ipv4Addr::new(192, 168, 1, 77), 24).unwrap();
        assert_eq!(range.start_addr, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(range.end_addr, Ipv4Addr::new(192, 168, 1, 254));
    }

    #[test]
    fn cidr_hosts_point_to_point_and_single() {
        assert_eq!(cidr_hosts(Ipv4Addr::new(10, 0, 0, 0), 31).unwrap().len(), 2);
        let single = cidr_hosts(Ipv4Addr::new(10, 0, 0, 7), 32).unwrap();
        assert_eq!(single.start_addr, single.end_addr);
    }

    #[test]
    fn cidr_rejects_invalid_prefix() {
        assert!(cidr_range(Ipv4Addr::new(10, 0, 0, 0), 33).is_err());
    }

    #[test]
    fn collection_deduplicates_in_order() {
        let mut collection = IpCollection::new();
        collection.add_single(Ipv4Addr::new(10, 0, 0, 3));
        collection.add_range(Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 4)));

        let addrs: Vec<Ipv4Addr> = collection.into_iter().collect();
        assert_eq!(
            addrs,
            vec![
                Ipv4Addr::new(10, 0, 0, 3),
                Ipv4Addr::new(10, 0, 0, 1),
                Ipv4Addr::new(10, 0, 0, 2),
                Ipv4Addr::new(10, 0, 0, 4),
            ]
        );
    }
}
