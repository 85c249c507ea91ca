// One crawl: host metrics, link inventory, babel neighbours -> Snapshot.
// Host and link failures abort the crawl; the babel dump is best-effort.

use crate::babel_repo::BabelClient;
use crate::host_repo::HostSource;
use crate::link_repo::{self, LinkInventory, LinkSource};
use crate::models::{HostMetrics, NeighbourDump, Snapshot, SystemData};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Status reported once assembly succeeds.
pub const STATUS_ONLINE: &str = "online";

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("host metrics: {0}")]
    HostMetrics(#[source] std::io::Error),

    #[error("link inventory: {0}")]
    LinkInventory(#[source] std::io::Error),

    #[error("blocking task join: {0}")]
    Join(String),
}

pub struct Crawler<H, L> {
    host: Arc<H>,
    links: Arc<L>,
    babel: BabelClient,
}

impl<H: HostSource, L: LinkSource> Crawler<H, L> {
    pub fn new(host: H, links: L, babel: BabelClient) -> Self {
        Self {
            host: Arc::new(host),
            links: Arc::new(links),
            babel,
        }
    }

    #[instrument(skip(self), fields(operation = "crawl"))]
    pub async fn crawl(&self) -> Result<Snapshot, CrawlError> {
        let host = self.host.clone();
        let metrics = tokio::task::spawn_blocking(move || host.read())
            .await
            .map_err(|e| CrawlError::Join(e.to_string()))?
            .map_err(CrawlError::HostMetrics)?;

        let links = self.links.clone();
        let inventory = tokio::task::spawn_blocking(move || link_repo::scan(links.as_ref()))
            .await
            .map_err(|e| CrawlError::Join(e.to_string()))?
            .map_err(CrawlError::LinkInventory)?;

        let babel = self.babel.dump().await;

        let snapshot = assemble(metrics, inventory, babel, chrono::Local::now().timestamp());
        tracing::info!(
            interfaces = snapshot.interfaces.len(),
            client_count = snapshot.client_count,
            babel_neighbours = snapshot.babel_neighbours.len(),
            "snapshot assembled"
        );
        Ok(snapshot)
    }
}

/// Merge reader outputs into a snapshot. Identity fields are left for the caller to overlay.
pub fn assemble(
    host: HostMetrics,
    links: LinkInventory,
    babel: NeighbourDump,
    local_time: i64,
) -> Snapshot {
    let system_data = SystemData {
        status: STATUS_ONLINE.to_string(),
        idletime: host.idle_time,
        loadavg: host.load15,
        local_time,
        memory_buffering: host.memory.buffers,
        memory_caching: host.memory.cached,
        memory_free: host.memory.free,
        memory_total: host.memory.total,
        processes: host.processes(),
        uptime: host.uptime_secs,
        kernel_version: host.kernel_release,
        ..Default::default()
    };

    Snapshot {
        system_data,
        interfaces: links.interfaces,
        babel_neighbours: babel.neighbours,
        babel_outcome: babel.outcome,
        client_count: links.client_count,
        clients: links.clients,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientCount, DumpOutcome, MemoryStats};

    #[test]
    fn assemble_copies_host_figures() {
        let host = HostMetrics {
            idle_time: 12.5,
            load15: 0.25,
            runnable_processes: 3,
            total_processes: 99,
            uptime_secs: 3600,
            memory: MemoryStats {
                total: 1000,
                free: 400,
                buffers: 50,
                cached: 200,
            },
            kernel_release: "6.6.0".into(),
        };
        let links = LinkInventory {
            interfaces: vec![],
            clients: vec![ClientCount {
                interface: "eth0".into(),
                count: 4,
            }],
            client_count: 4,
        };
        let s = assemble(host, links, NeighbourDump::unreachable(), 1_700_000_000);
        let sd = &s.system_data;
        assert_eq!(sd.status, "online");
        assert_eq!(sd.processes, "3/99");
        assert_eq!(sd.memory_caching, 200);
        assert_eq!(sd.memory_buffering, 50);
        assert_eq!(sd.uptime, 3600);
        assert_eq!(sd.kernel_version, "6.6.0");
        assert_eq!(sd.local_time, 1_700_000_000);
        assert_eq!(s.client_count, 4);
        assert!(s.babel_neighbours.is_empty());
        assert_eq!(s.babel_outcome, DumpOutcome::Unreachable);
    }
}
