//! A test-only [`Sink`] fixture: counts delivered messages/flushes, keeps the
//! last rendered lines, and can be configured to sleep or always fail.
//!
//! Follows spdlog's `tests/test_sink.h` (`msg_counter`, `flush_counter`,
//! `set_delay`, `set_exception`, `lines()`) and the test-double style used
//! elsewhere in this crate's fixtures.

use super::{Sink, SinkCore};
use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::level::Level;
use crate::record::Record;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const LINES_TO_SAVE: usize = 100;

struct State {
    delay: Duration,
    fail_message: Option<String>,
    lines: Vec<String>,
}

/// Counts everything it's given and can be configured to misbehave, for use
/// in ordering, overflow, and error-isolation tests.
pub struct TestSink {
    core: SinkCore,
    msg_counter: AtomicUsize,
    flush_counter: AtomicUsize,
    state: Mutex<State>,
}

impl TestSink {
    pub fn new() -> Self {
        TestSink {
            core: SinkCore::new(),
            msg_counter: AtomicUsize::new(0),
            flush_counter: AtomicUsize::new(0),
            state: Mutex::new(State { delay: Duration::ZERO, fail_message: None, lines: Vec::new() }),
        }
    }

    /// Builder form: sleeps for `delay` inside every `log` call, simulating
    /// a slow downstream (used by the overrun/discard/`wait_all` tests).
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().delay = delay;
        self
    }

    /// Builder form: every `log`/`flush` call fails with `message`.
    pub fn with_always_fail(self, message: impl Into<String>) -> Self {
        self.state.lock().fail_message = Some(message.into());
        self
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = delay;
    }

    pub fn set_exception(&self, message: impl Into<String>) {
        self.state.lock().fail_message = Some(message.into());
    }

    pub fn clear_exception(&self) {
        self.state.lock().fail_message = None;
    }

    pub fn msg_counter(&self) -> usize {
        self.msg_counter.load(Ordering::Relaxed)
    }

    pub fn flush_counter(&self) -> usize {
        self.flush_counter.load(Ordering::Relaxed)
    }

    /// The last `LINES_TO_SAVE` rendered lines (EOL stripped), in delivery order.
    pub fn lines(&self) -> Vec<String> {
        self.state.lock().lines.clone()
    }
}

impl Default for TestSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for TestSink {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        let rendered = self.core.render(record);
        let mut state = self.state.lock();
        if let Some(message) = state.fail_message.clone() {
            return Err(Error::SinkError(message));
        }
        let text = String::from_utf8_lossy(&rendered);
        let trimmed = text.trim_end_matches(['\r', '\n']).to_string();
        if state.lines.len() < LINES_TO_SAVE {
            state.lines.push(trimmed);
        }
        let delay = state.delay;
        drop(state);
        self.msg_counter.fetch_add(1, Ordering::Relaxed);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(message) = self.state.lock().fail_message.clone() {
            return Err(Error::SinkError(message));
        }
        self.flush_counter.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn set_pattern(&self, pattern: &str) {
        self.core.set_pattern(pattern);
    }

    fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        self.core.set_formatter(formatter);
    }

    fn set_level(&self, level: Level) {
        self.core.set_level(level);
    }

    fn level(&self) -> Level {
        self.core.level()
    }
}
