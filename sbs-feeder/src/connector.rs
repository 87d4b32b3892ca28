//! Station feed connector.
//!
//! One connector per configured `host:port`. It owns the TCP connection,
//! frames the byte stream into `\n`-terminated records, parses each record
//! and forwards the resulting `Message` to the shared merge channel.
//!
//! Responsibilities:
//! - Framing: trim ASCII whitespace (drops the `\r` of CRLF), skip blanks
//! - Parse failures: log and keep reading
//! - Disconnects and connect failures: reconnect under `ReconnectPolicy`
//! - Cancellation: stop promptly, drop the sender, return final stats

use std::io;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use sbs_core::{parse, Message};

use crate::backoff::ReconnectPolicy;
use crate::stats::StationStats;

/// Why a single connection's read loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpEnd {
    /// The station closed the connection.
    Eof,
    Cancelled,
    /// Nobody is listening on the merge channel any more.
    ChannelClosed,
}

/// Read records from `reader` until EOF, cancellation, or a closed channel.
///
/// I/O errors are returned to the caller; parse errors are logged and
/// counted.
pub async fn pump<R>(
    station: &str,
    reader: &mut R,
    tx: &mpsc::Sender<Message>,
    stats: &StationStats,
    cancel: &CancellationToken,
) -> io::Result<PumpEnd>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        let n = tokio::select! {
            _ = cancel.cancelled() => return Ok(PumpEnd::Cancelled),
            r = reader.read_until(b'\n', &mut buf) => r?,
        };
        if n == 0 {
            return Ok(PumpEnd::Eof);
        }

        let record = buf.trim_ascii();
        if record.is_empty() {
            continue;
        }
        StationStats::bump(&stats.lines);

        match parse(station, record) {
            Ok(msg) => {
                StationStats::bump(&stats.parsed);
                if tx.send(msg).await.is_err() {
                    return Ok(PumpEnd::ChannelClosed);
                }
            }
            Err(e) => {
                StationStats::bump(&stats.parse_errors);
                warn!(
                    station,
                    record = %String::from_utf8_lossy(record),
                    error = %e,
                    "dropping unparseable record"
                );
            }
        }
    }
}

pub struct FeedConnector {
    station: String,
    tx: mpsc::Sender<Message>,
    policy: ReconnectPolicy,
    cancel: CancellationToken,
    stats: Arc<StationStats>,
}

impl FeedConnector {
    pub fn new(
        station: impl Into<String>,
        tx: mpsc::Sender<Message>,
        policy: ReconnectPolicy,
        cancel: CancellationToken,
    ) -> Self {
        FeedConnector {
            station: station.into(),
            tx,
            policy,
            cancel,
            stats: Arc::new(StationStats::default()),
        }
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn stats(&self) -> Arc<StationStats> {
        Arc::clone(&self.stats)
    }

    /// Run on the current runtime. The handle resolves to the final stats.
    pub fn spawn(self) -> JoinHandle<Arc<StationStats>> {
        tokio::spawn(self.run())
    }

    /// Connect, read, and reconnect until cancelled or out of attempts.
    pub async fn run(self) -> Arc<StationStats> {
        let station = self.station.as_str();
        let mut failures: u32 = 0;
        let mut ever_connected = false;

        loop {
            StationStats::bump(&self.stats.connect_attempts);
            let connect = tokio::select! {
                _ = self.cancel.cancelled() => break,
                r = TcpStream::connect(station) => r,
            };

            match connect {
                Ok(stream) => {
                    if ever_connected {
                        StationStats::bump(&self.stats.reconnects);
                    }
                    ever_connected = true;
                    failures = 0;
                    self.stats.connected.store(true, Ordering::Relaxed);
                    info!(station, "connected");

                    let mut reader = BufReader::new(stream);
                    let end = pump(station, &mut reader, &self.tx, &self.stats, &self.cancel).await;
                    self.stats.connected.store(false, Ordering::Relaxed);

                    match end {
                        Ok(PumpEnd::Cancelled) => break,
                        Ok(PumpEnd::ChannelClosed) => {
                            debug!(station, "merge channel closed");
                            break;
                        }
                        Ok(PumpEnd::Eof) => warn!(station, "station closed the connection"),
                        Err(e) => warn!(station, error = %e, "read failed"),
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(station, attempt = failures, error = %e, "connect failed");
                }
            }

            if self.policy.exhausted(failures) {
                error!(station, attempts = failures, "giving up on station");
                break;
            }

            let delay = self.policy.delay(failures);
            debug!(station, delay_ms = delay.as_millis() as u64, "reconnecting");
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(station, "connector stopped");
        self.stats
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
