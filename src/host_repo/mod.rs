// Host metrics via /proc and sysinfo

mod error;
mod linux;

pub use error::ProcParseError;

use crate::models::HostMetrics;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use sysinfo::System;

/// Source of host metrics. Blocking; call from a blocking context.
pub trait HostSource: Send + Sync + 'static {
    fn read(&self) -> std::io::Result<HostMetrics>;
}

/// Reads memory, load, idle time and uptime from a procfs mount; the kernel release comes from
/// sysinfo.
pub struct ProcHostRepo {
    proc_root: PathBuf,
}

impl Default for ProcHostRepo {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcHostRepo {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    fn open(&self, name: &str) -> std::io::Result<BufReader<File>> {
        File::open(self.proc_root.join(name)).map(BufReader::new)
    }

    fn read_to_string(&self, name: &str) -> std::io::Result<String> {
        std::fs::read_to_string(self.proc_root.join(name))
    }

    /// Everything but the kernel release, all from the procfs root.
    fn read_counters(&self) -> std::io::Result<HostMetrics> {
        let memory = linux::parse_meminfo(self.open("meminfo")?)?;
        let load = linux::parse_loadavg(&self.read_to_string("loadavg")?)?;
        let idle_time = linux::parse_stat_idle(self.open("stat")?)?;
        let uptime_secs = linux::parse_uptime(&self.read_to_string("uptime")?)?;

        Ok(HostMetrics {
            idle_time,
            load15: load.load15,
            runnable_processes: load.runnable,
            total_processes: load.total,
            uptime_secs,
            memory,
            kernel_release: String::new(),
        })
    }
}

impl HostSource for ProcHostRepo {
    #[tracing::instrument(skip(self), fields(repo = "host", operation = "read"))]
    fn read(&self) -> std::io::Result<HostMetrics> {
        let mut metrics = self.read_counters()?;
        metrics.kernel_release = System::kernel_version().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "kernel release unavailable")
        })?;

        tracing::debug!(
            memory_total = metrics.memory.total,
            load15 = metrics.load15,
            uptime_secs = metrics.uptime_secs,
            "host metrics read"
        );
        Ok(metrics)
    }
}
