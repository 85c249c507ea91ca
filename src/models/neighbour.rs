// Babel routing daemon neighbour models

use serde::Serialize;

/// A neighbour from the routing daemon's dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingNeighbour {
    pub mac_addr: String,
    pub outgoing_interface: String,
}

/// How a dump session ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpOutcome {
    /// End-of-dump marker seen.
    Complete,
    /// Connection to the daemon could not be established.
    #[default]
    Unreachable,
    /// Read error or timeout; neighbours collected so far were discarded.
    Failed,
    /// Daemon closed the session before the end-of-dump marker.
    Truncated,
}

/// Neighbours plus the outcome of the session that produced them.
/// An empty list with `Complete` means the daemon has no neighbours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NeighbourDump {
    pub outcome: DumpOutcome,
    pub neighbours: Vec<RoutingNeighbour>,
}

impl NeighbourDump {
    pub fn unreachable() -> Self {
        Self {
            outcome: DumpOutcome::Unreachable,
            neighbours: Vec::new(),
        }
    }

    pub fn failed() -> Self {
        Self {
            outcome: DumpOutcome::Failed,
            neighbours: Vec::new(),
        }
    }
}
