use serde::Deserialize;
use std::time::Duration;

use crate::babel_repo;
use crate::models::{Geo, NodeIdentity};
use crate::report;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub node: NodeConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub babel: BabelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub hostname: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub hood: String,
    #[serde(default)]
    pub distname: String,
    #[serde(default)]
    pub distversion: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_collector_url")]
    pub collector_url: String,
    /// Print the XML, the JSON envelope and the collector response to stdout.
    #[serde(default)]
    pub debug: bool,
    /// Crawl and encode, but do not deliver.
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_report_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            collector_url: default_collector_url(),
            debug: false,
            dry_run: false,
            timeout_secs: default_report_timeout_secs(),
        }
    }
}

fn default_collector_url() -> String {
    report::DEFAULT_COLLECTOR_URL.into()
}

fn default_report_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct BabelConfig {
    #[serde(default = "default_babel_endpoint")]
    pub endpoint: String,
    /// Bounds the connect and the dump read loop, each.
    #[serde(default = "default_babel_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for BabelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_babel_endpoint(),
            timeout_ms: default_babel_timeout_ms(),
        }
    }
}

fn default_babel_endpoint() -> String {
    babel_repo::DEFAULT_ENDPOINT.into()
}

fn default_babel_timeout_ms() -> u64 {
    babel_repo::DEFAULT_TIMEOUT.as_millis() as u64
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "nodewatcher.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.node.hostname.trim().is_empty(),
            "node.hostname must be non-empty"
        );
        anyhow::ensure!(
            (-90.0..=90.0).contains(&self.node.latitude),
            "node.latitude must be between -90 and 90, got {}",
            self.node.latitude
        );
        anyhow::ensure!(
            (-180.0..=180.0).contains(&self.node.longitude),
            "node.longitude must be between -180 and 180, got {}",
            self.node.longitude
        );
        anyhow::ensure!(
            !self.report.collector_url.is_empty(),
            "report.collector_url must be non-empty"
        );
        anyhow::ensure!(
            self.report.timeout_secs > 0,
            "report.timeout_secs must be > 0, got {}",
            self.report.timeout_secs
        );
        anyhow::ensure!(
            self.babel.endpoint.parse::<std::net::SocketAddr>().is_ok(),
            "babel.endpoint must be an ip:port socket address, got {:?}",
            self.babel.endpoint
        );
        anyhow::ensure!(
            self.babel.timeout_ms > 0,
            "babel.timeout_ms must be > 0, got {}",
            self.babel.timeout_ms
        );
        Ok(())
    }

    pub fn identity(&self) -> NodeIdentity {
        NodeIdentity {
            hostname: self.node.hostname.clone(),
            contact: self.node.contact.clone(),
            hood: self.node.hood.clone(),
            distname: self.node.distname.clone(),
            distversion: self.node.distversion.clone(),
            geo: Geo {
                lat: self.node.latitude,
                lng: self.node.longitude,
            },
        }
    }

    pub fn babel_timeout(&self) -> Duration {
        Duration::from_millis(self.babel.timeout_ms)
    }

    pub fn report_timeout(&self) -> Duration {
        Duration::from_secs(self.report.timeout_secs)
    }
}
