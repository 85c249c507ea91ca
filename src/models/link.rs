// Network interface and link-layer neighbour models

use serde::Serialize;

/// One link as enumerated by the OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub index: u32,
    pub name: String,
    pub mtu: u32,
    /// Hardware address, empty for links without one (e.g. tunnels).
    pub mac: String,
}

/// Cumulative byte counters of a link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Kernel neighbour-unreachability-detection state bits (NUD_*).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct NeighbourState(pub u16);

impl NeighbourState {
    pub const NONE: Self = Self(0x00);
    pub const INCOMPLETE: Self = Self(0x01);
    pub const REACHABLE: Self = Self(0x02);
    pub const STALE: Self = Self(0x04);
    pub const DELAY: Self = Self(0x08);
    pub const PROBE: Self = Self(0x10);
    pub const FAILED: Self = Self(0x20);
    pub const NOARP: Self = Self(0x40);
    pub const PERMANENT: Self = Self(0x80);

    /// Parse a state name as printed by iproute2 (case-insensitive). Unknown names map to NONE.
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "INCOMPLETE" => Self::INCOMPLETE,
            "REACHABLE" => Self::REACHABLE,
            "STALE" => Self::STALE,
            "DELAY" => Self::DELAY,
            "PROBE" => Self::PROBE,
            "FAILED" => Self::FAILED,
            "NOARP" => Self::NOARP,
            "PERMANENT" => Self::PERMANENT,
            _ => Self::NONE,
        }
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_reachable(self) -> bool {
        self.contains(Self::REACHABLE)
    }
}

impl std::ops::BitOr for NeighbourState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl FromIterator<NeighbourState> for NeighbourState {
    fn from_iter<I: IntoIterator<Item = NeighbourState>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, |acc, s| acc | s)
    }
}

/// One entry of a link's neighbour table (ARP or NDP).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighbourEntry {
    pub lladdr: Option<String>,
    pub state: NeighbourState,
}

/// Observed state of one interface, as reported to the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub name: String,
    pub mtu: u32,
    pub mac_addr: String,
    pub traffic_rx: u64,
    pub traffic_tx: u64,
}

/// Number of distinct reachable neighbours seen on one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientCount {
    pub interface: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_fold_into_bitmask() {
        let state: NeighbourState = ["reachable", "PERMANENT"]
            .into_iter()
            .map(NeighbourState::from_name)
            .collect();
        assert!(state.is_reachable());
        assert!(state.contains(NeighbourState::PERMANENT));
        assert!(!state.contains(NeighbourState::STALE));
    }

    #[test]
    fn unknown_state_name_is_none() {
        assert_eq!(NeighbourState::from_name("bogus"), NeighbourState::NONE);
        assert!(!NeighbourState::from_name("STALE").is_reachable());
    }
}
