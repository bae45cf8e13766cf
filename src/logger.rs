//! `Logger`: the per-logger front-end — level filtering, formatting,
//! per-sink fan-out with error isolation, and conditional flush.
//!
//! Follows a `PyLogger`-style method surface (configure, add sinks, log at
//! each level, flush), generalized here from a single hardcoded global
//! logger into an independently-constructible `Logger` value, any number of
//! which may share the same sinks.

use crate::context::Context;
use crate::error_relay::{ErrorHandler, ErrorRelay};
use crate::formatter::{Formatter, PatternFormatter};
use crate::level::{AtomicLevel, Level};
use crate::record::{Record, SourceLoc};
use crate::sink::Sink;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// A snapshot of a logger's lifetime counters: in-process observability,
/// not distributed delivery or replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggerMetrics {
    pub logged: u64,
    pub sink_errors: u64,
    pub format_errors: u64,
}

struct Metrics {
    logged: AtomicU64,
    sink_errors: AtomicU64,
    format_errors: AtomicU64,
}

impl Metrics {
    fn new() -> Self {
        Metrics {
            logged: AtomicU64::new(0),
            sink_errors: AtomicU64::new(0),
            format_errors: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> LoggerMetrics {
        LoggerMetrics {
            logged: self.logged.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            format_errors: self.format_errors.load(Ordering::Relaxed),
        }
    }
}

/// The logging front-end. Cheap to `clone()` at the `Arc` level through
/// [`Logger::clone_named`]; sinks are shared, never duplicated.
pub struct Logger {
    name: String,
    sinks: SmallVec<[Arc<dyn Sink>; 4]>,
    level: AtomicLevel,
    flush_level: AtomicLevel,
    error_relay: Arc<ErrorRelay>,
    metrics: Metrics,
}

impl Logger {
    /// Builds a logger named `name` with `sinks` (fanned out to in order),
    /// default level `Trace` and `flush_level` `Off` ("never flush").
    pub fn new(name: impl Into<String>, sinks: Vec<Arc<dyn Sink>>) -> Self {
        Logger {
            name: name.into(),
            sinks: sinks.into(),
            level: AtomicLevel::new(Level::Trace),
            flush_level: AtomicLevel::new(Level::Off),
            error_relay: Arc::new(ErrorRelay::new()),
            metrics: Metrics::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level.load()
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level);
    }

    pub fn flush_level(&self) -> Level {
        self.flush_level.load()
    }

    pub fn set_flush_level(&self, level: Level) {
        self.flush_level.store(level);
    }

    pub fn set_error_handler(&self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.error_relay.set_handler(Some(Box::new(handler) as ErrorHandler));
    }

    pub fn clear_error_handler(&self) {
        self.error_relay.set_handler(None);
    }

    pub fn metrics(&self) -> LoggerMetrics {
        self.metrics.snapshot()
    }

    /// Not safe to call concurrently with logging through this same
    /// `Logger`; documented rather than enforced. Clones `formatter` onto
    /// every sink but the last, which takes ownership of it directly.
    pub fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        let Some((last, rest)) = self.sinks.split_last() else { return };
        for sink in rest {
            sink.set_formatter(formatter.clone_box());
        }
        last.set_formatter(formatter);
    }

    /// Equivalent to `set_formatter(PatternFormatter::new(pattern))`.
    pub fn set_pattern(&self, pattern: &str) {
        self.set_formatter(Box::new(PatternFormatter::new(pattern)));
    }

    /// Produces a logger sharing this one's sinks, levels, and error
    /// handler, under a new name. Sinks are shared, not duplicated — each
    /// sink is itself responsible for its own thread safety.
    pub fn clone_named(&self, new_name: impl Into<String>) -> Logger {
        Logger {
            name: new_name.into(),
            sinks: self.sinks.clone(),
            level: AtomicLevel::new(self.level()),
            flush_level: AtomicLevel::new(self.flush_level()),
            error_relay: self.error_relay.clone(),
            metrics: Metrics::new(),
        }
    }

    /// Logs `text` verbatim (no formatting step) at `level`, with an
    /// optional call-site location, at the current time.
    pub fn log(&self, source: Option<SourceLoc<'_>>, level: Level, text: &str) {
        self.log_at(SystemTime::now(), source, level, text);
    }

    /// As `log`, with a caller-supplied timestamp.
    pub fn log_at(&self, timestamp: SystemTime, source: Option<SourceLoc<'_>>, level: Level, text: &str) {
        if level < self.level.load() {
            return;
        }
        let record = Record::at(level, timestamp, &self.name, text, source);
        self.dispatch(&record);
    }

    /// Logs a `format_args!`-built message. A formatting error is routed to
    /// the error relay and the record is dropped, never propagated to the
    /// call site — formatting never "throws" past this boundary.
    pub fn log_fmt(&self, source: Option<SourceLoc<'_>>, level: Level, args: std::fmt::Arguments<'_>) {
        if level < self.level.load() {
            return;
        }
        use std::fmt::Write as _;
        let mut buf = String::new();
        if buf.write_fmt(args).is_err() {
            self.metrics.format_errors.fetch_add(1, Ordering::Relaxed);
            self.error_relay.handle(&self.name, source, "format error: argument formatting failed");
            return;
        }
        let record = Record::at(level, SystemTime::now(), &self.name, &buf, source);
        self.dispatch(&record);
    }

    fn dispatch(&self, record: &Record<'_>) {
        self.metrics.logged.fetch_add(1, Ordering::Relaxed);
        for sink in &self.sinks {
            if !sink.accepts(record.level) {
                continue;
            }
            if let Err(e) = sink.log(record) {
                self.metrics.sink_errors.fetch_add(1, Ordering::Relaxed);
                self.error_relay.handle(&self.name, record.source, &e.to_string());
            }
        }
        if record.level != Level::Off && record.level >= self.flush_level.load() {
            self.flush();
        }
    }

    /// Invokes `flush` on every sink, each call error-isolated the same way
    /// `log` is.
    pub fn flush(&self) {
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                self.metrics.sink_errors.fetch_add(1, Ordering::Relaxed);
                self.error_relay.handle(&self.name, None, &e.to_string());
            }
        }
    }

    /// Pushes `pairs` onto the calling thread's scoped [`Context`] for the
    /// duration of the returned guard; merged into formatted output by
    /// formatters that honor `{extra}`.
    #[must_use]
    pub fn with_context(pairs: &[(&str, &str)]) -> crate::context::ContextGuard {
        Context::push(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::TestSink;
    use std::sync::Mutex as StdMutex;

    fn logger_with(sink: Arc<TestSink>) -> Logger {
        Logger::new("test", vec![sink])
    }

    #[test]
    fn level_gating_suppresses_lower_severity() {
        let sink = Arc::new(TestSink::new());
        let logger = logger_with(sink.clone());
        logger.set_level(Level::Warn);
        logger.log(None, Level::Info, "suppressed");
        assert_eq!(sink.msg_counter(), 0);
        logger.log(None, Level::Warn, "kept");
        assert_eq!(sink.msg_counter(), 1);
    }

    #[test]
    fn flush_gating_fires_only_at_or_above_flush_level() {
        let sink = Arc::new(TestSink::new());
        let logger = logger_with(sink.clone());
        logger.set_flush_level(Level::Err);
        logger.log(None, Level::Info, "no flush");
        assert_eq!(sink.flush_counter(), 0);
        logger.log(None, Level::Err, "flushes");
        assert_eq!(sink.flush_counter(), 1);
    }

    #[test]
    fn flush_level_off_never_flushes() {
        let sink = Arc::new(TestSink::new());
        let logger = logger_with(sink.clone());
        logger.log(None, Level::Critical, "still no flush");
        assert_eq!(sink.flush_counter(), 0);
    }

    #[test]
    fn error_isolation_lets_other_sinks_proceed() {
        let failing = Arc::new(TestSink::new().with_always_fail("boom"));
        let healthy = Arc::new(TestSink::new());
        let logger = Logger::new("svc", vec![failing.clone(), healthy.clone()]);

        let seen: Arc<StdMutex<Vec<String>>> = Arc::new(StdMutex::new(Vec::new()));
        let seen2 = seen.clone();
        logger.set_error_handler(move |msg| seen2.lock().unwrap().push(msg.to_string()));

        logger.log(None, Level::Info, "hello");
        assert_eq!(healthy.msg_counter(), 1);
        assert!(seen.lock().unwrap().iter().any(|m| m.contains("boom")));
    }

    #[test]
    fn clone_named_shares_sinks_and_settings() {
        let sink = Arc::new(TestSink::new());
        let logger = logger_with(sink.clone());
        logger.set_level(Level::Err);
        let cloned = logger.clone_named("other");
        assert_eq!(cloned.name(), "other");
        assert_eq!(cloned.level(), Level::Err);
        cloned.log(None, Level::Critical, "via clone");
        assert_eq!(sink.msg_counter(), 1);
    }

    #[test]
    fn metrics_track_logged_and_sink_errors() {
        let failing = Arc::new(TestSink::new().with_always_fail("x"));
        let logger = Logger::new("svc", vec![failing]);
        logger.log(None, Level::Info, "a");
        logger.log(None, Level::Info, "b");
        let m = logger.metrics();
        assert_eq!(m.logged, 2);
        assert_eq!(m.sink_errors, 2);
    }

    #[test]
    fn log_fmt_builds_the_formatted_payload() {
        let sink = Arc::new(TestSink::new());
        sink.set_pattern("{message}");
        let logger = logger_with(sink.clone());
        logger.log_fmt(None, Level::Info, format_args!("count={}", 42));
        assert_eq!(sink.lines(), vec!["count=42".to_string()]);
    }

    #[test]
    fn context_is_merged_by_pattern_formatter() {
        let sink = Arc::new(TestSink::new());
        sink.set_pattern("{message} {extra}");
        let logger = logger_with(sink.clone());
        let _guard = Logger::with_context(&[("request_id", "abc")]);
        logger.log(None, Level::Info, "hi");
        assert!(sink.lines()[0].contains("request_id=abc"));
    }
}
