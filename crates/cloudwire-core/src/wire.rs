//! Wire logging: a diagnostic sink for raw signing and exchange bytes.
//!
//! Wire records exist to debug authentication problems (comparing the
//! string-to-sign a client produced with the one a provider reports). They
//! never participate in control flow, and a sink must never block or fail the
//! caller. Components receive an `Arc<dyn WireSink>`; [`NoopWire`] is the
//! default.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Tracing target used by [`TracingWire`].
pub const WIRE_TARGET: &str = "cloudwire::wire";

/// What a wire record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireChannel {
    /// The canonical string a signature was computed over.
    Signature,
    /// An outbound request head (method, URI, headers).
    Request,
    /// An inbound response head and body.
    Response,
}

impl WireChannel {
    /// Short lowercase label for log output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

impl fmt::Display for WireChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only destination for wire records.
pub trait WireSink: Send + Sync + fmt::Debug {
    /// Record raw bytes on a channel. Must not block and must not panic.
    fn record(&self, channel: WireChannel, data: &[u8]);

    /// Whether records are kept at all. Callers may skip formatting when this is `false`.
    fn enabled(&self) -> bool {
        true
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWire;

impl WireSink for NoopWire {
    fn record(&self, _channel: WireChannel, _data: &[u8]) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Sink that emits each record as a `debug` event on the [`WIRE_TARGET`] target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingWire;

impl WireSink for TracingWire {
    fn record(&self, channel: WireChannel, data: &[u8]) {
        tracing::debug!(
            target: WIRE_TARGET,
            channel = %channel,
            len = data.len(),
            data = %String::from_utf8_lossy(data),
            "wire"
        );
    }

    fn enabled(&self) -> bool {
        tracing::enabled!(target: WIRE_TARGET, tracing::Level::DEBUG)
    }
}

/// One captured record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRecord {
    /// Channel the record was written to.
    pub channel: WireChannel,
    /// Raw bytes.
    pub data: Vec<u8>,
}

/// In-memory sink, useful to inspect what was signed.
///
/// Writes that find the buffer locked are dropped and counted rather than
/// waiting on the lock.
#[derive(Debug, Default)]
pub struct MemoryWire {
    records: Mutex<Vec<WireRecord>>,
    dropped: AtomicU64,
}

impl MemoryWire {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records captured so far.
    #[must_use]
    pub fn records(&self) -> Vec<WireRecord> {
        self.records.lock().clone()
    }

    /// Records on one channel, decoded lossily as UTF-8.
    #[must_use]
    pub fn channel_text(&self, channel: WireChannel) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.channel == channel)
            .map(|r| String::from_utf8_lossy(&r.data).into_owned())
            .collect()
    }

    /// Number of writes dropped due to contention.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl WireSink for MemoryWire {
    fn record(&self, channel: WireChannel, data: &[u8]) {
        match self.records.try_lock() {
            Some(mut records) => records.push(WireRecord {
                channel,
                data: data.to_vec(),
            }),
            None => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// The default sink handed to components that were not given one.
#[must_use]
pub fn noop() -> Arc<dyn WireSink> {
    Arc::new(NoopWire)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_capture_records_in_order() {
        let wire = MemoryWire::new();
        wire.record(WireChannel::Signature, b"GET\n\n\n");
        wire.record(WireChannel::Response, b"<Error/>");

        let records = wire.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].channel, WireChannel::Signature);
        assert_eq!(wire.channel_text(WireChannel::Response), vec!["<Error/>"]);
        assert_eq!(wire.dropped(), 0);
    }

    #[test]
    fn test_should_drop_instead_of_blocking_when_contended() {
        let wire = MemoryWire::new();
        let guard = wire.records.lock();
        wire.record(WireChannel::Request, b"PUT /bucket");
        drop(guard);

        assert_eq!(wire.dropped(), 1);
        assert!(wire.records().is_empty());
    }

    #[test]
    fn test_should_report_noop_as_disabled() {
        assert!(!noop().enabled());
        assert!(MemoryWire::new().enabled());
    }
}
