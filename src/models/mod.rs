// Domain models for one crawl

mod host;
mod link;
mod neighbour;
mod snapshot;

pub use host::{HostMetrics, MemoryStats};
pub use link::{ClientCount, Interface, Link, LinkStats, NeighbourEntry, NeighbourState};
pub use neighbour::{DumpOutcome, NeighbourDump, RoutingNeighbour};
pub use snapshot::{Geo, NodeIdentity, Snapshot, SystemData};
