// Report encoding and delivery to the monitoring collector

mod xml;

pub use xml::{to_xml, to_xml_pretty};

use crate::models::Snapshot;
use crate::version::PROTOCOL_VERSION;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

pub const DEFAULT_COLLECTOR_URL: &str = "https://monitoring.freifunk-franken.de/api/alfred";
pub const XML_DECLARATION: &str = "<?xml version='1.0' standalone='yes'?>";
const CONTENT_TYPE: &str = "application/json; charset=UTF-8";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("xml encoding: {0}")]
    Xml(String),

    #[error("snapshot has no interfaces to key the report by")]
    NoInterfaces,

    #[error("json encoding: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("collector returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Wrap the XML payload as `{"64": {"<primary mac>": "<?xml ...?><data>...</data>"}}`.
///
/// Unlike the XML, the JSON is not byte-exact with older reporters: it is written compact
/// (`{"64":{...}}`, no space after the colons). The collector receives the same JSON value.
pub fn envelope(snapshot: &Snapshot, xml_payload: &str) -> Result<String, ReportError> {
    let mac = snapshot.primary_mac().ok_or(ReportError::NoInterfaces)?;

    let mut node = Map::new();
    node.insert(
        mac.to_string(),
        Value::String(format!("{XML_DECLARATION}{xml_payload}")),
    );
    let mut root = Map::new();
    root.insert(PROTOCOL_VERSION.to_string(), Value::Object(node));
    Ok(serde_json::to_string(&Value::Object(root))?)
}

/// HTTP client for the collector endpoint.
pub struct Collector {
    client: reqwest::Client,
    url: String,
}

impl Collector {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nodewatcher/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// POST the envelope; returns the response body.
    #[instrument(skip(self, body), fields(operation = "deliver", url = %self.url, bytes = body.len()))]
    pub async fn deliver(&self, body: String) -> Result<String, ReportError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ReportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        tracing::info!(status = status.as_u16(), "report delivered");
        Ok(text)
    }
}
