//! `Sink` capability: an output destination that accepts a [`Record`],
//! may flush, and may carry its own level and formatter.
//!
//! Design note: spdlog distinguishes "mt" (mutex-guarded) and
//! "st" (unsynchronized, single-writer) variants per sink. This crate shares
//! sinks between a `Logger` and any `AsyncSink` chained after it under
//! shared ownership, which requires every sink to be `Sync`; an
//! unsynchronized "st" variant can't satisfy that while still being usable
//! through `Arc<dyn Sink>`. So each concrete sink here is the "mt" shape —
//! its own state is always safely shared — and the st/mt split collapses to
//! a single implementation per destination, documented at each sink.

pub mod async_sink;
pub mod daily_file;
pub mod file;
pub mod null;
mod retention;
pub mod rotating_file;
pub mod stdout;
pub mod test_sink;
pub mod udp;

use crate::error::Error;
use crate::formatter::{Formatter, PatternFormatter};
use crate::level::{AtomicLevel, Level};
use crate::record::Record;
use parking_lot::Mutex;

pub use async_sink::{AsyncSink, AsyncSinkConfig};
pub use daily_file::DailyFileSink;
pub use file::FileSink;
pub use null::NullSink;
pub use rotating_file::RotatingFileSink;
pub use stdout::{StderrSink, StdoutSink};
pub use test_sink::TestSink;
pub use udp::UdpSink;

/// Abstract log output. Implementations are responsible for their own
/// thread safety (see the module doc above for why that's always true here).
pub trait Sink: Send + Sync {
    /// Writes `record`. Failures are returned, never panicked or silently
    /// swallowed — callers (the `Logger`, or an `AsyncSink` worker) route
    /// them through an `ErrorRelay`.
    fn log(&self, record: &Record<'_>) -> Result<(), Error>;

    fn flush(&self) -> Result<(), Error>;

    fn set_pattern(&self, pattern: &str);

    fn set_formatter(&self, formatter: Box<dyn Formatter>);

    fn set_level(&self, level: Level);

    fn level(&self) -> Level;

    /// `true` if this sink's own level would accept `level`. The `Logger`'s
    /// level check is advisory; this is the authoritative admission test.
    fn accepts(&self, level: Level) -> bool {
        level != Level::Off && level >= self.level()
    }
}

/// Shared level+formatter state, composed into each concrete sink below
/// rather than inherited (idiomatic Rust has no base-class sink).
pub(crate) struct SinkCore {
    level: AtomicLevel,
    formatter: Mutex<Box<dyn Formatter>>,
}

impl SinkCore {
    pub(crate) fn new() -> Self {
        SinkCore { level: AtomicLevel::new(Level::Trace), formatter: Mutex::new(Box::new(PatternFormatter::default())) }
    }

    pub(crate) fn level(&self) -> Level {
        self.level.load()
    }

    pub(crate) fn set_level(&self, level: Level) {
        self.level.store(level);
    }

    pub(crate) fn set_pattern(&self, pattern: &str) {
        *self.formatter.lock() = Box::new(PatternFormatter::new(pattern));
    }

    pub(crate) fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        *self.formatter.lock() = formatter;
    }

    pub(crate) fn render(&self, record: &Record<'_>) -> Vec<u8> {
        let mut buf = Vec::new();
        self.formatter.lock().format(record, &mut buf);
        buf
    }
}

impl Default for SinkCore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_core_defaults_to_trace_and_default_pattern() {
        let core = SinkCore::new();
        assert_eq!(core.level(), Level::Trace);
    }

    #[test]
    fn sink_core_level_round_trips() {
        let core = SinkCore::new();
        core.set_level(Level::Err);
        assert_eq!(core.level(), Level::Err);
    }
}
