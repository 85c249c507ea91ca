// Babel dump line schemas

use crate::models::RoutingNeighbour;

/// Extracts a neighbour from one line of dump output. Lines that are not neighbour records
/// yield `None`.
pub trait DumpSchema: Send + Sync {
    fn parse_line(&self, line: &str) -> Option<RoutingNeighbour>;
}

/// Positional schema of babeld's `dump` output:
/// `add neighbour <id> address <addr> if <ifname> reach .. ureach .. rxcost .. txcost .. ...`
#[derive(Debug, Clone, Copy, Default)]
pub struct BabelDumpV1;

impl BabelDumpV1 {
    pub const MIN_FIELDS: usize = 21;
    pub const KIND: usize = 1;
    pub const ADDRESS: usize = 4;
    pub const INTERFACE: usize = 6;
    pub const NEIGHBOUR_KIND: &'static str = "neighbour";
}

impl DumpSchema for BabelDumpV1 {
    fn parse_line(&self, line: &str) -> Option<RoutingNeighbour> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < Self::MIN_FIELDS || fields[Self::KIND] != Self::NEIGHBOUR_KIND {
            return None;
        }
        Some(RoutingNeighbour {
            mac_addr: fields[Self::ADDRESS].to_string(),
            outgoing_interface: fields[Self::INTERFACE].to_string(),
        })
    }
}
