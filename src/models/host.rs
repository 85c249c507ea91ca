// Host metrics read from /proc and the kernel

use serde::Serialize;

/// Memory figures in kB, as the kernel reports them in /proc/meminfo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub total: u64,
    pub free: u64,
    pub buffers: u64,
    pub cached: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HostMetrics {
    /// Seconds spent idle since boot, summed over all CPUs.
    pub idle_time: f64,
    pub load15: f64,
    pub runnable_processes: u32,
    pub total_processes: u32,
    pub uptime_secs: u64,
    pub memory: MemoryStats,
    pub kernel_release: String,
}

impl HostMetrics {
    /// `runnable/total`, the format the collector expects for `processes`.
    pub fn processes(&self) -> String {
        format!("{}/{}", self.runnable_processes, self.total_processes)
    }
}
