// Babel routing daemon neighbour dump over the local control socket

mod dump;

pub use dump::{BabelDumpV1, DumpSchema};

use crate::models::{DumpOutcome, NeighbourDump};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, instrument, warn};

pub const DEFAULT_ENDPOINT: &str = "[::1]:33123";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sent by the daemon once on connect, and again after the dump.
const ACK: &str = "ok";
const DUMP_COMMAND: &[u8] = b"dump\n";

pub struct BabelClient {
    endpoint: String,
    timeout: Duration,
    schema: Box<dyn DumpSchema>,
}

impl Default for BabelClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)
    }
}

impl BabelClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
            schema: Box::new(BabelDumpV1),
        }
    }

    pub fn with_schema(mut self, schema: Box<dyn DumpSchema>) -> Self {
        self.schema = schema;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the daemon's neighbour table. Never fails: an unreachable daemon or a broken
    /// session yields an empty list, tagged with the outcome.
    #[instrument(skip(self), fields(repo = "babel", operation = "dump", endpoint = %self.endpoint))]
    pub async fn dump(&self) -> NeighbourDump {
        let stream =
            match tokio::time::timeout(self.timeout, TcpStream::connect(&self.endpoint)).await {
                Ok(Ok(s)) => s,
                Ok(Err(e)) => {
                    warn!(error = %e, "babel daemon unreachable");
                    return NeighbourDump::unreachable();
                }
                Err(_) => {
                    warn!(timeout_ms = self.timeout.as_millis() as u64, "babel connect timed out");
                    return NeighbourDump::unreachable();
                }
            };
        let dump = dump_session(stream, self.schema.as_ref(), self.timeout).await;
        match dump.outcome {
            DumpOutcome::Complete => debug!(neighbours = dump.neighbours.len(), "babel dump complete"),
            outcome => warn!(?outcome, neighbours = dump.neighbours.len(), "babel dump incomplete"),
        }
        dump
    }
}

/// Run one dump session on an established transport. The command is written from a separate
/// task so the reader never waits on it; `timeout` bounds the read loop.
pub async fn dump_session<S, D>(stream: S, schema: &D, timeout: Duration) -> NeighbourDump
where
    S: AsyncRead + AsyncWrite + Send + 'static,
    D: DumpSchema + ?Sized,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let send = tokio::spawn(async move {
        if let Err(e) = writer.write_all(DUMP_COMMAND).await {
            debug!(error = %e, "dump command write failed");
            return;
        }
        let _ = writer.flush().await;
    });

    let result = tokio::time::timeout(timeout, read_dump(BufReader::new(reader), schema)).await;
    send.abort();

    match result {
        Ok(Ok(dump)) => dump,
        Ok(Err(e)) => {
            warn!(error = %e, "babel dump read failed");
            NeighbourDump::failed()
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "babel dump timed out");
            NeighbourDump::failed()
        }
    }
}

async fn read_dump<R, D>(reader: R, schema: &D) -> std::io::Result<NeighbourDump>
where
    R: tokio::io::AsyncBufRead + Unpin,
    D: DumpSchema + ?Sized,
{
    let mut lines = LossyLines::new(reader);

    loop {
        match lines.next_line().await? {
            Some(line) if line == ACK => break,
            Some(_) => continue,
            None => {
                return Ok(NeighbourDump {
                    outcome: DumpOutcome::Truncated,
                    neighbours: Vec::new(),
                });
            }
        }
    }

    let mut neighbours = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let mut fields = line.split_whitespace();
        if fields.next() == Some(ACK) && fields.next().is_none() {
            return Ok(NeighbourDump {
                outcome: DumpOutcome::Complete,
                neighbours,
            });
        }
        if let Some(n) = schema.parse_line(&line) {
            neighbours.push(n);
        }
    }

    Ok(NeighbourDump {
        outcome: DumpOutcome::Truncated,
        neighbours,
    })
}

/// Line reader that decodes invalid UTF-8 lossily, so a garbled line is just another
/// non-matching line.
struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: tokio::io::AsyncBufRead + Unpin> LossyLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}
