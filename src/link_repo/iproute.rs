// iproute2-backed link source: `ip -json` for links and neighbours, sysfs for counters.

use super::LinkSource;
use crate::models::{Link, LinkStats, NeighbourEntry, NeighbourState};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Deserialize)]
struct IpLink {
    ifindex: u32,
    ifname: String,
    #[serde(default)]
    mtu: u32,
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpNeigh {
    #[serde(default)]
    lladdr: Option<String>,
    #[serde(default)]
    state: Vec<String>,
}

pub struct IpRouteLinkSource {
    ip_bin: PathBuf,
    sys_class_net: PathBuf,
}

impl Default for IpRouteLinkSource {
    fn default() -> Self {
        Self::new("ip", "/sys/class/net")
    }
}

impl IpRouteLinkSource {
    pub fn new(ip_bin: impl Into<PathBuf>, sys_class_net: impl Into<PathBuf>) -> Self {
        Self {
            ip_bin: ip_bin.into(),
            sys_class_net: sys_class_net.into(),
        }
    }

    fn run_ip(&self, args: &[&str]) -> std::io::Result<Vec<u8>> {
        let output = Command::new(&self.ip_bin).args(args).output()?;
        if !output.status.success() {
            return Err(std::io::Error::other(format!(
                "ip {}: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output.stdout)
    }

    fn read_counter(&self, link: &Link, name: &str) -> std::io::Result<u64> {
        let path = self.sys_class_net.join(&link.name).join(name);
        let content = std::fs::read_to_string(&path)?;
        content.trim().parse().map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{}: invalid value '{}'", path.display(), content.trim()),
            )
        })
    }
}

impl LinkSource for IpRouteLinkSource {
    fn links(&self) -> std::io::Result<Vec<Link>> {
        parse_links(&self.run_ip(&["-json", "link", "show"])?)
    }

    fn link_stats(&self, link: &Link) -> std::io::Result<LinkStats> {
        // Guards against the name having moved to another link since enumeration.
        let index = self.read_counter(link, "ifindex")?;
        if index != u64::from(link.index) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!(
                    "link {} changed index: {} -> {}",
                    link.name, link.index, index
                ),
            ));
        }
        Ok(LinkStats {
            rx_bytes: self.read_counter(link, "statistics/rx_bytes")?,
            tx_bytes: self.read_counter(link, "statistics/tx_bytes")?,
        })
    }

    fn neighbours(&self, link: &Link) -> std::io::Result<Vec<NeighbourEntry>> {
        parse_neighbours(&self.run_ip(&[
            "-json",
            "neigh",
            "show",
            "dev",
            link.name.as_str(),
            "nud",
            "all",
        ])?)
    }
}

fn parse_json<'a, T: Deserialize<'a>>(raw: &'a [u8]) -> std::io::Result<Vec<T>> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(raw)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

pub(crate) fn parse_links(raw: &[u8]) -> std::io::Result<Vec<Link>> {
    let links: Vec<IpLink> = parse_json(raw)?;
    Ok(links
        .into_iter()
        .map(|l| Link {
            index: l.ifindex,
            name: l.ifname,
            mtu: l.mtu,
            mac: l.address.unwrap_or_default(),
        })
        .collect())
}

pub(crate) fn parse_neighbours(raw: &[u8]) -> std::io::Result<Vec<NeighbourEntry>> {
    let neighs: Vec<IpNeigh> = parse_json(raw)?;
    Ok(neighs
        .into_iter()
        .map(|n| NeighbourEntry {
            lladdr: n.lladdr,
            state: n.state.iter().map(|s| NeighbourState::from_name(s)).collect(),
        })
        .collect())
}
