//! Log level taxonomy.
//!
//! Mirrors the seven-level scheme used throughout the logging core: filtering,
//! flush gating, and sink-level admission all compare against this ordering.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Severity of a log record, ordered `Trace < Debug < Info < Warn < Err < Critical < Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Err = 4,
    Critical = 5,
    /// Never admitted by any sink; also used as a flush_level sentinel meaning "never flush".
    Off = 6,
}

pub(crate) const LEVEL_STRINGS: [&str; 7] =
    ["trace", "debug", "info", "warning", "error", "critical", "off"];
pub(crate) const LEVEL_SHORT: [&str; 7] = ["T", "D", "I", "W", "E", "C", "O"];

impl Level {
    #[inline]
    pub const fn as_usize(self) -> usize {
        self as u8 as usize
    }

    #[inline]
    const fn from_u8(v: u8) -> Self {
        match v {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Err,
            5 => Level::Critical,
            _ => Level::Off,
        }
    }

    /// Canonical lowercase name, e.g. `"warning"`, `"critical"`, `"off"`.
    pub const fn as_str(self) -> &'static str {
        LEVEL_STRINGS[self.as_usize()]
    }

    /// One-letter form, e.g. `"W"`, `"C"`, `"O"`.
    pub const fn as_short_str(self) -> &'static str {
        LEVEL_SHORT[self.as_usize()]
    }

    /// Parses a level name. Accepts the canonical names, the one-letter forms,
    /// and the documented aliases `"warn"` (-> `Warn`) and `"null"` (-> `Off`).
    /// Unknown strings map to `Off`, matching spdlog's historical behavior of
    /// treating an unrecognized level name as "disable logging" rather than an error.
    pub fn from_str(s: &str) -> Level {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "trace" | "t" => Level::Trace,
            "debug" | "d" => Level::Debug,
            "info" | "i" => Level::Info,
            "warning" | "warn" | "w" => Level::Warn,
            "error" | "err" | "e" => Level::Err,
            "critical" | "c" => Level::Critical,
            "off" | "null" | "o" => Level::Off,
            _ => Level::Off,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atomic `Level` cell, used for `Logger::level`/`Logger::flush_level`.
///
/// Relaxed ordering is sufficient: the level check on the hot path is advisory,
/// and the authoritative admission decision is each sink's own `accepts`.
pub struct AtomicLevel(AtomicU8);

impl AtomicLevel {
    pub const fn new(level: Level) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    #[inline]
    pub fn load(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, level: Level) {
        self.0.store(level as u8, Ordering::Relaxed);
    }
}

impl fmt::Debug for AtomicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtomicLevel({:?})", self.load())
    }
}
