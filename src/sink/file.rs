//! Plain, non-rotating file sink. Appends to a single path for the life of
//! the process; use [`super::RotatingFileSink`] or [`super::DailyFileSink`]
//! when rotation is needed.

use super::{Sink, SinkCore};
use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::level::Level;
use crate::record::Record;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct FileSink {
    core: SinkCore,
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::InvalidConfig(e.to_string()))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(FileSink { core: SinkCore::new(), path, file: Mutex::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        let rendered = self.core.render(record);
        self.file.lock().write_all(&rendered).map_err(|e| Error::SinkError(e.to_string()))
    }

    fn flush(&self) -> Result<()> {
        self.file.lock().flush().map_err(|e| Error::SinkError(e.to_string()))
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
