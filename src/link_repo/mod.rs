// Link inventory: interfaces, traffic counters and reachable neighbour counts

mod iproute;

pub use iproute::IpRouteLinkSource;

use crate::models::{ClientCount, Interface, Link, LinkStats, NeighbourEntry};
use std::collections::HashSet;

/// Name of the loopback link, never reported.
pub const LOOPBACK: &str = "lo";

/// OS view of links and their neighbour tables. Blocking; call from a blocking context.
pub trait LinkSource: Send + Sync + 'static {
    /// All links, in the order the OS enumerates them.
    fn links(&self) -> std::io::Result<Vec<Link>>;

    fn link_stats(&self, link: &Link) -> std::io::Result<LinkStats>;

    /// Neighbour table of the link, all address families.
    fn neighbours(&self, link: &Link) -> std::io::Result<Vec<NeighbourEntry>>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkInventory {
    pub interfaces: Vec<Interface>,
    pub clients: Vec<ClientCount>,
    /// Sum of `clients` counts.
    pub client_count: usize,
}

/// Number of distinct hardware addresses among reachable entries.
pub fn count_reachable(entries: &[NeighbourEntry]) -> usize {
    entries
        .iter()
        .filter(|e| e.state.is_reachable())
        .map(|e| e.lladdr.as_deref().unwrap_or_default().to_ascii_lowercase())
        .collect::<HashSet<_>>()
        .len()
}

/// Scan every non-loopback link. The first failing lookup aborts the scan.
#[tracing::instrument(skip(source), fields(repo = "link", operation = "scan"))]
pub fn scan<S: LinkSource + ?Sized>(source: &S) -> std::io::Result<LinkInventory> {
    let mut inventory = LinkInventory::default();
    for link in source.links()? {
        if link.name == LOOPBACK {
            continue;
        }

        let stats = source.link_stats(&link)?;
        let neighbours = source.neighbours(&link)?;
        let count = count_reachable(&neighbours);
        tracing::debug!(
            interface = %link.name,
            index = link.index,
            neighbours = neighbours.len(),
            reachable = count,
            "link scanned"
        );

        inventory.client_count += count;
        inventory.clients.push(ClientCount {
            interface: link.name.clone(),
            count,
        });
        inventory.interfaces.push(Interface {
            name: link.name,
            mtu: link.mtu,
            mac_addr: link.mac,
            traffic_rx: stats.rx_bytes,
            traffic_tx: stats.tx_bytes,
        });
    }
    Ok(inventory)
}
