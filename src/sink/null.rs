//! A sink that discards everything. Useful as a benchmark baseline or a
//! placeholder destination while a logger is being assembled.

use super::{Sink, SinkCore};
use crate::error::Result;
use crate::formatter::Formatter;
use crate::level::Level;
use crate::record::Record;

#[derive(Default)]
pub struct NullSink {
    core: SinkCore,
}

impl NullSink {
    pub fn new() -> Self {
        NullSink { core: SinkCore::new() }
    }
}

impl Sink for NullSink {
    fn log(&self, _record: &Record<'_>) -> Result<()> {
        Ok(())
    }

    fn flush(&self) -> Result<()> {
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
