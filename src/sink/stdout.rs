//! Console sinks. `std::io::Stdout`/`Stderr` already serialize writes
//! internally, so — per the module-level note in `sink::mod` — a single
//! thread-safe implementation covers both the "mt" and "st" naming
//! conventions some logging libraries split into separate types.

use super::{Sink, SinkCore};
use crate::color::{self, default_color_for};
use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::level::Level;
use crate::record::Record;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

macro_rules! console_sink {
    ($name:ident, $stream:expr, $doc:expr) => {
        #[doc = $doc]
        pub struct $name {
            core: SinkCore,
            colorize: AtomicBool,
        }

        impl $name {
            pub fn new() -> Self {
                $name { core: SinkCore::new(), colorize: AtomicBool::new(true) }
            }

            /// Enables or disables ANSI colorization of the level field.
            pub fn set_colorize(&self, enabled: bool) {
                self.colorize.store(enabled, Ordering::Relaxed);
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Sink for $name {
            fn log(&self, record: &Record<'_>) -> Result<()> {
                let mut rendered = self.core.render(record);
                if self.colorize.load(Ordering::Relaxed) {
                    rendered = paint_level(&rendered, record);
                }
                $stream()
                    .write_all(&rendered)
                    .map_err(|e| Error::SinkError(e.to_string()))
            }

            fn flush(&self) -> Result<()> {
                $stream().flush().map_err(|e| Error::SinkError(e.to_string()))
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
    };
}

/// Wraps the record's own level name, wherever it appears in the rendered
/// line, in its default ANSI color. A cheap substring replace rather than a
/// formatter hook, so it works uniformly with both pattern and JSON output.
fn paint_level(rendered: &[u8], record: &Record<'_>) -> Vec<u8> {
    let Ok(text) = std::str::from_utf8(rendered) else {
        return rendered.to_vec();
    };
    let needle = record.level.as_str().to_uppercase();
    if let Some(pos) = text.find(&needle) {
        let painted = color::colorize(&needle, default_color_for(record.level));
        let mut out = String::with_capacity(text.len() + painted.len());
        out.push_str(&text[..pos]);
        out.push_str(&painted);
        out.push_str(&text[pos + needle.len()..]);
        out.into_bytes()
    } else {
        rendered.to_vec()
    }
}

console_sink!(StdoutSink, std::io::stdout, "Writes formatted records to standard output.");
console_sink!(StderrSink, std::io::stderr, "Writes formatted records to standard error.");
