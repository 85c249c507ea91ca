// Linux /proc parsers: meminfo, loadavg, stat, uptime.

use std::io::BufRead;

use super::error::ProcParseError;
use crate::models::MemoryStats;

/// Clock ticks per second used by /proc/stat (USER_HZ).
pub(crate) const USER_HZ: f64 = 100.0;

/// Parse `MemTotal`, `MemFree`, `Buffers` and `Cached` (kB) from /proc/meminfo.
pub(crate) fn parse_meminfo<R: BufRead>(reader: R) -> std::io::Result<MemoryStats> {
    let (mut total, mut free, mut buffers, mut cached) = (None, None, None, None);
    for line in reader.lines() {
        let line = line?;
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let (slot, field) = match key.trim() {
            "MemTotal" => (&mut total, "MemTotal"),
            "MemFree" => (&mut free, "MemFree"),
            "Buffers" => (&mut buffers, "Buffers"),
            "Cached" => (&mut cached, "Cached"),
            _ => continue,
        };
        let raw = rest.split_whitespace().next().unwrap_or_default();
        let value = raw.parse::<u64>().map_err(|_| ProcParseError::InvalidValue {
            file: "meminfo",
            field,
            value: raw.to_string(),
        })?;
        *slot = Some(value);
    }

    let require = |v: Option<u64>, field: &'static str| {
        v.ok_or(ProcParseError::MissingField {
            file: "meminfo",
            field,
        })
    };
    Ok(MemoryStats {
        total: require(total, "MemTotal")?,
        free: require(free, "MemFree")?,
        buffers: require(buffers, "Buffers")?,
        cached: require(cached, "Cached")?,
    })
}

/// Parsed /proc/loadavg line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LoadAvg {
    pub load15: f64,
    pub runnable: u32,
    pub total: u32,
}

/// Parse `0.20 0.18 0.12 1/80 11206`.
pub(crate) fn parse_loadavg(content: &str) -> std::io::Result<LoadAvg> {
    let mut fields = content.split_whitespace();
    let load15_raw = fields.nth(2).ok_or(ProcParseError::MissingField {
        file: "loadavg",
        field: "load15",
    })?;
    let load15 = load15_raw
        .parse::<f64>()
        .map_err(|_| ProcParseError::InvalidValue {
            file: "loadavg",
            field: "load15",
            value: load15_raw.to_string(),
        })?;

    let procs_raw = fields.next().ok_or(ProcParseError::MissingField {
        file: "loadavg",
        field: "processes",
    })?;
    let invalid_procs = || ProcParseError::InvalidValue {
        file: "loadavg",
        field: "processes",
        value: procs_raw.to_string(),
    };
    let (runnable, total) = procs_raw.split_once('/').ok_or_else(invalid_procs)?;
    Ok(LoadAvg {
        load15,
        runnable: runnable.parse().map_err(|_| invalid_procs())?,
        total: total.parse().map_err(|_| invalid_procs())?,
    })
}

/// Idle seconds summed over all CPUs, from the aggregate `cpu` line of /proc/stat.
pub(crate) fn parse_stat_idle<R: BufRead>(reader: R) -> std::io::Result<f64> {
    for line in reader.lines() {
        let line = line?;
        let mut fields = line.split_whitespace();
        if fields.next() != Some("cpu") {
            continue;
        }
        // user nice system idle ...
        let raw = fields.nth(3).ok_or(ProcParseError::MissingField {
            file: "stat",
            field: "idle",
        })?;
        let ticks = raw.parse::<u64>().map_err(|_| ProcParseError::InvalidValue {
            file: "stat",
            field: "idle",
            value: raw.to_string(),
        })?;
        return Ok(ticks as f64 / USER_HZ);
    }
    Err(ProcParseError::MissingField {
        file: "stat",
        field: "cpu",
    }
    .into())
}

/// Whole seconds since boot from /proc/uptime (`86400.73 172000.10`).
pub(crate) fn parse_uptime(content: &str) -> std::io::Result<u64> {
    let raw = content.split_whitespace().next().ok_or(ProcParseError::MissingField {
        file: "uptime",
        field: "uptime",
    })?;
    let secs = raw
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
        .ok_or_else(|| ProcParseError::InvalidValue {
            file: "uptime",
            field: "uptime",
            value: raw.to_string(),
        })?;
    Ok(secs as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(err: &std::io::Error) -> &ProcParseError {
        err.get_ref()
            .and_then(|e| e.downcast_ref::<ProcParseError>())
            .unwrap()
    }

    #[test]
    fn meminfo_reads_required_fields() {
        let data = b"\
MemTotal:        1004096 kB
MemFree:          123456 kB
MemAvailable:     654321 kB
Buffers:           20480 kB
Cached:           300000 kB
SwapCached:            0 kB
";
        let mem = parse_meminfo(&data[..]).unwrap();
        assert_eq!(
            mem,
            MemoryStats {
                total: 1004096,
                free: 123456,
                buffers: 20480,
                cached: 300000,
            }
        );
    }

    #[test]
    fn meminfo_missing_buffers_is_invalid_data() {
        let data = b"MemTotal: 100 kB\nMemFree: 50 kB\nCached: 10 kB\n";
        let err = parse_meminfo(&data[..]).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert!(matches!(
            extract(&err),
            ProcParseError::MissingField {
                field: "Buffers",
                ..
            }
        ));
    }

    #[test]
    fn meminfo_swap_cached_does_not_shadow_cached() {
        let data = b"MemTotal: 100 kB\nMemFree: 50 kB\nBuffers: 1 kB\nCached: 10 kB\nSwapCached: 99 kB\n";
        assert_eq!(parse_meminfo(&data[..]).unwrap().cached, 10);
    }

    #[test]
    fn meminfo_garbage_value() {
        let data = b"MemTotal: lots kB\n";
        let err = parse_meminfo(&data[..]).unwrap_err();
        assert!(matches!(
            extract(&err),
            ProcParseError::InvalidValue {
                field: "MemTotal",
                ..
            }
        ));
    }

    #[test]
    fn loadavg_fields() {
        let load = parse_loadavg("0.20 0.18 0.12 1/80 11206\n").unwrap();
        assert_eq!(load.load15, 0.12);
        assert_eq!(load.runnable, 1);
        assert_eq!(load.total, 80);
    }

    #[test]
    fn loadavg_truncated() {
        let err = parse_loadavg("0.20 0.18").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        let err = parse_loadavg("0.20 0.18 0.12 180 11206").unwrap_err();
        assert!(matches!(
            extract(&err),
            ProcParseError::InvalidValue {
                field: "processes",
                ..
            }
        ));
    }

    #[test]
    fn stat_idle_from_aggregate_line() {
        let data = b"\
cpu  10132153 290696 3084719 46828483 16683 0 25195 0 175628 0
cpu0 1393280 32966 572056 13343292 6130 0 17875 0 23933 0
intr 1 2 3
";
        let idle = parse_stat_idle(&data[..]).unwrap();
        assert!((idle - 468284.83).abs() < 1e-6);
    }

    #[test]
    fn stat_without_cpu_line() {
        let err = parse_stat_idle(&b"intr 1 2 3\n"[..]).unwrap_err();
        assert!(matches!(
            extract(&err),
            ProcParseError::MissingField { field: "cpu", .. }
        ));
    }

    #[test]
    fn uptime_truncates_to_whole_seconds() {
        assert_eq!(parse_uptime("350735.47 234388.90\n").unwrap(), 350735);
        assert_eq!(parse_uptime("0.99 0.50").unwrap(), 0);
    }

    #[test]
    fn uptime_empty_or_garbage() {
        let err = parse_uptime("").unwrap_err();
        assert!(matches!(
            extract(&err),
            ProcParseError::MissingField { file: "uptime", .. }
        ));
        let err = parse_uptime("-1.0 2.0").unwrap_err();
        assert!(matches!(
            extract(&err),
            ProcParseError::InvalidValue { file: "uptime", .. }
        ));
    }
}
