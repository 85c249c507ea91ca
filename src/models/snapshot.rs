// Snapshot: the unit of report

use serde::Serialize;

use super::{ClientCount, DumpOutcome, Interface, RoutingNeighbour};
use crate::version;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Geo {
    pub lat: f64,
    pub lng: f64,
}

/// Node identity supplied by configuration, overlaid after assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeIdentity {
    pub hostname: String,
    pub contact: String,
    pub hood: String,
    pub distname: String,
    pub distversion: String,
    pub geo: Geo,
}

/// `system_data` section. Fields this crawler has no source for stay empty but are still
/// serialized, the collector expects all of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemData {
    pub status: String,
    pub hostname: String,
    pub description: String,
    pub geo: Geo,
    pub position_comment: String,
    pub contact: String,
    pub hood: String,
    pub hoodid: String,
    pub distname: String,
    pub distversion: String,
    pub chipset: String,
    pub cpu: Vec<String>,
    pub model: String,
    pub memory_total: u64,
    pub memory_free: u64,
    pub memory_buffering: u64,
    pub memory_caching: u64,
    pub loadavg: f64,
    pub processes: String,
    pub uptime: u64,
    pub idletime: f64,
    pub local_time: i64,
    pub batman_advanced_version: String,
    pub kernel_version: String,
    pub nodewatcher_version: String,
    pub firmware_version: String,
    pub firmware_revision: String,
    pub openwrt_core_revision: String,
    pub openwrt_feeds_packages_revision: String,
    pub vpn_active: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub system_data: SystemData,
    pub interfaces: Vec<Interface>,
    pub batman_adv_interfaces: String,
    pub batman_adv_originators: String,
    pub batman_adv_gateway_mode: String,
    pub batman_adv_gateway_list: String,
    pub babel_neighbours: Vec<RoutingNeighbour>,
    /// Not part of the wire format; lets callers tell "no neighbours" from "daemon unreachable".
    #[serde(skip)]
    pub babel_outcome: DumpOutcome,
    pub client_count: usize,
    pub clients: Vec<ClientCount>,
}

impl Snapshot {
    /// Overlay configured identity and the fixed version labels.
    pub fn apply_identity(&mut self, identity: &NodeIdentity) {
        let sd = &mut self.system_data;
        sd.hostname = identity.hostname.clone();
        sd.contact = identity.contact.clone();
        sd.hood = identity.hood.clone();
        sd.distname = identity.distname.clone();
        sd.distversion = identity.distversion.clone();
        sd.geo = identity.geo;
        sd.firmware_version = version::FIRMWARE_VERSION.to_string();
        sd.nodewatcher_version = version::VERSION.to_string();
    }

    /// MAC address of the first interface, used as the node key in the envelope.
    pub fn primary_mac(&self) -> Option<&str> {
        self.interfaces.first().map(|i| i.mac_addr.as_str())
    }
}
