// Shared test helpers: fake host, fake links, fake babel daemon

#![allow(dead_code)]

use nodewatcher::host_repo::HostSource;
use nodewatcher::link_repo::LinkSource;
use nodewatcher::models::*;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

pub const BABEL_GREETING: &str = "BABEL 1.0\nversion babeld-1.12.1\nhost node-1\nmy-id 56:28:a1:ff:fe:e1:ea:00\nok\n";

pub fn sample_host() -> HostMetrics {
    HostMetrics {
        idle_time: 4321.5,
        load15: 0.12,
        runnable_processes: 1,
        total_processes: 80,
        uptime_secs: 86400,
        memory: MemoryStats {
            total: 1_004_096,
            free: 123_456,
            buffers: 20_480,
            cached: 300_000,
        },
        kernel_release: "6.1.0-18-amd64".into(),
    }
}

pub struct FakeHost {
    pub metrics: HostMetrics,
    pub fail: bool,
}

impl FakeHost {
    pub fn ok() -> Self {
        Self {
            metrics: sample_host(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            metrics: sample_host(),
            fail: true,
        }
    }
}

impl HostSource for FakeHost {
    fn read(&self) -> std::io::Result<HostMetrics> {
        if self.fail {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "/proc/meminfo: no such file",
            ));
        }
        Ok(self.metrics.clone())
    }
}

pub fn link(index: u32, name: &str, mtu: u32, mac: &str) -> Link {
    Link {
        index,
        name: name.into(),
        mtu,
        mac: mac.into(),
    }
}

pub fn neigh(lladdr: &str, state: NeighbourState) -> NeighbourEntry {
    NeighbourEntry {
        lladdr: Some(lladdr.into()),
        state,
    }
}

#[derive(Default)]
pub struct FakeLinks {
    pub links: Vec<Link>,
    pub stats: HashMap<u32, LinkStats>,
    pub neighbours: HashMap<u32, Vec<NeighbourEntry>>,
    pub fail_neighbours_for: Option<u32>,
    pub neighbour_calls: AtomicUsize,
}

impl FakeLinks {
    pub fn add(&mut self, link: Link, stats: LinkStats, neighbours: Vec<NeighbourEntry>) {
        self.stats.insert(link.index, stats);
        self.neighbours.insert(link.index, neighbours);
        self.links.push(link);
    }
}

impl LinkSource for FakeLinks {
    fn links(&self) -> std::io::Result<Vec<Link>> {
        Ok(self.links.clone())
    }

    fn link_stats(&self, link: &Link) -> std::io::Result<LinkStats> {
        self.stats.get(&link.index).copied().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no link {}", link.index))
        })
    }

    fn neighbours(&self, link: &Link) -> std::io::Result<Vec<NeighbourEntry>> {
        self.neighbour_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_neighbours_for == Some(link.index) {
            return Err(std::io::Error::other("RTM_GETNEIGH failed"));
        }
        Ok(self.neighbours.get(&link.index).cloned().unwrap_or_default())
    }
}

/// lo, eth0 (2 distinct reachable neighbours, one seen over both families), wlan0 (none reachable).
pub fn fake_environment() -> FakeLinks {
    let mut env = FakeLinks::default();
    env.add(
        link(1, "lo", 65536, "00:00:00:00:00:00"),
        LinkStats {
            rx_bytes: 999,
            tx_bytes: 999,
        },
        vec![],
    );
    env.add(
        link(2, "eth0", 1500, "52:54:00:12:34:56"),
        LinkStats {
            rx_bytes: 10_240,
            tx_bytes: 20_480,
        },
        vec![
            neigh("aa:bb:cc:00:00:01", NeighbourState::REACHABLE),
            neigh("aa:bb:cc:00:00:01", NeighbourState::REACHABLE),
            neigh("aa:bb:cc:00:00:02", NeighbourState::REACHABLE),
            neigh("aa:bb:cc:00:00:03", NeighbourState::STALE),
        ],
    );
    env.add(
        link(3, "wlan0", 1500, "52:54:00:ab:cd:ef"),
        LinkStats {
            rx_bytes: 5,
            tx_bytes: 6,
        },
        vec![neigh("aa:bb:cc:00:00:09", NeighbourState::DELAY)],
    );
    env
}

/// A babel neighbour dump line with 21 fields.
pub fn neighbour_line(addr: &str, ifname: &str) -> String {
    format!(
        "add neighbour 5628a1e1ea00 address {addr} if {ifname} reach ffff ureach 0000 rxcost 96 txcost 96 rtt 0.000 rttcost 0 cost 96"
    )
}

/// Serve one babel session: greeting, wait for a command line, reply with `dump_lines` and the
/// end marker. Resolves to the command received.
pub async fn spawn_babel_daemon(
    dump_lines: Vec<String>,
) -> (SocketAddr, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (rd, mut wr) = stream.into_split();
        wr.write_all(BABEL_GREETING.as_bytes()).await.unwrap();
        let mut command = String::new();
        BufReader::new(rd).read_line(&mut command).await.unwrap();
        for line in dump_lines {
            wr.write_all(line.as_bytes()).await.unwrap();
            wr.write_all(b"\n").await.unwrap();
        }
        wr.write_all(b"ok\n").await.unwrap();
        command
    });
    (addr, handle)
}

/// An address nothing listens on.
pub async fn closed_endpoint() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
