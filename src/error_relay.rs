//! `ErrorRelay`: the mutex-guarded, rate-limited channel by which sink
//! and formatter failures become either a user-handler invocation or a
//! stderr line.
//!
//! Follows spdlog's `src/details/err_helper.cpp`: same
//! message shape, same one-report-per-second default rate limit, same
//! "a throwing custom handler is caught and reported without recursion"
//! contract.

use crate::record::SourceLoc;
use chrono::Local;
use parking_lot::Mutex;
use std::io::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// User-supplied error handler. May panic; a panic is caught and reported
/// on stderr, never propagated back into the logging call site.
pub type ErrorHandler = Box<dyn Fn(&str) + Send + Sync>;

struct Inner {
    custom_handler: Option<ErrorHandler>,
    last_report: Option<Instant>,
}

pub struct ErrorRelay {
    inner: Mutex<Inner>,
    /// Counts every default (no-user-handler) stderr report that actually
    /// fired, i.e. was not suppressed by the 1s rate limit. Lets the rate
    /// limit be asserted on without intercepting stderr.
    default_reports: AtomicUsize,
}

impl Default for ErrorRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorRelay {
    pub fn new() -> Self {
        ErrorRelay {
            inner: Mutex::new(Inner { custom_handler: None, last_report: None }),
            default_reports: AtomicUsize::new(0),
        }
    }

    /// Installs (or clears, with `None`) a user error handler. Atomic with
    /// respect to `handle`/`handle_unknown`.
    pub fn set_handler(&self, handler: Option<ErrorHandler>) {
        self.inner.lock().custom_handler = handler;
    }

    /// Number of default (no-user-handler) stderr reports that have actually
    /// fired so far, i.e. survived the 1s rate limit gate.
    pub fn default_report_count(&self) -> usize {
        self.default_reports.load(Ordering::Relaxed)
    }

    /// Reports `message`, occurring at `origin` (typically a logger or sink
    /// name), optionally tied to a source location.
    pub fn handle(&self, origin: &str, source_loc: Option<SourceLoc<'_>>, message: &str) {
        self.handle_at(origin, source_loc, message, Instant::now());
    }

    /// As `handle`, but with the "now" used by the rate-limit gate supplied
    /// by the caller (mirrors the original's `steady_clock` gate), so the
    /// gate's decision can be tested without sleeping in real time.
    fn handle_at(&self, origin: &str, source_loc: Option<SourceLoc<'_>>, message: &str, now: Instant) {
        let mut guard = self.inner.lock();

        if let Some(handler) = guard.custom_handler.as_ref() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(message)));
            if result.is_err() {
                let _ = writeln!(
                    std::io::stderr(),
                    "[*** LOG ERROR ***] [{origin}] exception during custom error handler"
                );
            }
            return;
        }

        if let Some(last) = guard.last_report {
            if now.duration_since(last) < Duration::from_secs(1) {
                return;
            }
        }
        guard.last_report = Some(now);
        drop(guard);
        self.default_reports.fetch_add(1, Ordering::Relaxed);

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = match source_loc {
            Some(loc) => format!(
                "[*** LOG ERROR ***] [{}({})] [{timestamp}] [{origin}] {message}",
                loc.filename, loc.line
            ),
            None => format!("[*** LOG ERROR ***] [{timestamp}] [{origin}] {message}"),
        };
        let _ = writeln!(std::io::stderr(), "{line}");
    }

    /// Equivalent to `handle` with a fixed "unknown exception" message.
    pub fn handle_unknown(&self, origin: &str, source_loc: Option<SourceLoc<'_>>) {
        self.handle(origin, source_loc, "unknown exception");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn custom_handler_receives_message() {
        let relay = ErrorRelay::new();
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        relay.set_handler(Some(Box::new(move |msg| seen2.lock().push(msg.to_string()))));
        relay.handle("logger", None, "boom");
        assert_eq!(seen.lock().as_slice(), ["boom".to_string()]);
    }

    #[test]
    fn panicking_custom_handler_is_swallowed() {
        let relay = ErrorRelay::new();
        relay.set_handler(Some(Box::new(|_msg| panic!("handler exploded"))));
        // Must not propagate past `handle`.
        relay.handle("logger", None, "boom");
    }

    #[test]
    fn default_reports_are_rate_limited() {
        let relay = ErrorRelay::new();
        let t0 = Instant::now();

        // No handler installed: the first report always fires.
        relay.handle_at("logger", None, "first", t0);
        assert_eq!(relay.default_report_count(), 1);

        // A second report less than 1s later is suppressed.
        relay.handle_at("logger", None, "second", t0 + Duration::from_millis(500));
        assert_eq!(relay.default_report_count(), 1);

        // Once a full second has passed, the next report fires again.
        relay.handle_at("logger", None, "third", t0 + Duration::from_millis(1_000));
        assert_eq!(relay.default_report_count(), 2);
    }

    #[test]
    fn handle_unknown_uses_fixed_message() {
        let relay = ErrorRelay::new();
        let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let seen2 = seen.clone();
        relay.set_handler(Some(Box::new(move |msg| *seen2.lock() = Some(msg.to_string()))));
        relay.handle_unknown("logger", None);
        assert_eq!(seen.lock().as_deref(), Some("unknown exception"));
    }

    #[test]
    fn clearing_handler_restores_default_path() {
        let relay = ErrorRelay::new();
        relay.set_handler(Some(Box::new(|_| panic!("should not run"))));
        relay.set_handler(None);
        // Falls back to the rate-limited stderr path; must not call the cleared handler.
        relay.handle("logger", None, "after clear");
    }
}
