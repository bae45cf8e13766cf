//! Period-triggered (daily/hourly/minutely) file rotation.
//!
//! Shares its rotate-on-write-if-needed shape with [`super::rotating_file`]'s
//! `SimpleRollingWriter`-style threshold check made on every write; here the
//! threshold is "has the current period ended" rather than "would this write
//! exceed a byte limit".

use super::rotating_file::{compress_in_place, Compression};
use super::{retention, Sink, SinkCore};
use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::level::Level;
use crate::record::Record;
use chrono::{DateTime, Datelike, Timelike, Utc};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The period on which [`DailyFileSink`] rotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Daily,
    Hourly,
    Minutely,
}

impl Rotation {
    /// The period identifier the current file belongs to, at `now`. Two
    /// timestamps in the same period always compare equal.
    fn period_key(self, now: DateTime<Utc>) -> (i32, u32, u32, u32, u32) {
        match self {
            Rotation::Daily => (now.year(), now.month(), now.day(), 0, 0),
            Rotation::Hourly => (now.year(), now.month(), now.day(), now.hour(), 0),
            Rotation::Minutely => (now.year(), now.month(), now.day(), now.hour(), now.minute()),
        }
    }

    fn period_string(self, now: DateTime<Utc>) -> String {
        match self {
            Rotation::Daily => now.format("%Y-%m-%d").to_string(),
            Rotation::Hourly => now.format("%Y-%m-%d_%H").to_string(),
            Rotation::Minutely => now.format("%Y-%m-%d_%H-%M").to_string(),
        }
    }
}

pub struct DailyFileConfig {
    pub path: PathBuf,
    pub rotation: Rotation,
    pub max_files: Option<usize>,
    pub compression: Compression,
}

impl DailyFileConfig {
    pub fn new(path: impl Into<PathBuf>, rotation: Rotation) -> Self {
        DailyFileConfig { path: path.into(), rotation, max_files: None, compression: Compression::None }
    }

    pub fn with_retention(mut self, max_files: usize) -> Self {
        self.max_files = Some(max_files);
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

struct State {
    file: File,
    period: (i32, u32, u32, u32, u32),
}

pub struct DailyFileSink {
    core: SinkCore,
    config: DailyFileConfig,
    state: Mutex<State>,
}

impl DailyFileSink {
    pub fn new(config: DailyFileConfig) -> Result<Self> {
        let file = open_append(&config.path).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        let period = config.rotation.period_key(Utc::now());
        Ok(DailyFileSink { core: SinkCore::new(), config, state: Mutex::new(State { file, period }) })
    }

    fn rotated_name(&self, now: DateTime<Utc>) -> PathBuf {
        let stamp = self.config.rotation.period_string(now);
        let file_name = self.config.path.file_name().and_then(|s| s.to_str()).unwrap_or("log");
        let new_name = match file_name.rfind('.') {
            Some(pos) => format!("{}.{stamp}{}", &file_name[..pos], &file_name[pos..]),
            None => format!("{file_name}.{stamp}"),
        };
        self.config.path.with_file_name(new_name)
    }

    fn rotate_if_needed(&self, state: &mut State, now: DateTime<Utc>) -> io::Result<()> {
        let current_period = self.config.rotation.period_key(now);
        if current_period == state.period {
            return Ok(());
        }
        let rotated = self.rotated_name(now);
        std::fs::rename(&self.config.path, &rotated)?;
        state.file = open_append(&self.config.path)?;
        state.period = current_period;

        if self.config.compression != Compression::None {
            compress_in_place(&rotated, self.config.compression)?;
        }
        if let Some(keep) = self.config.max_files {
            let base_prefix =
                self.config.path.file_stem().and_then(|s| s.to_str()).unwrap_or("log").to_string();
            let current_name = self.config.path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if let Some(dir) = self.config.path.parent() {
                let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
                retention::prune(dir, keep, |p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&base_prefix) && n != current_name)
                })?;
            }
        }
        Ok(())
    }
}

impl Sink for DailyFileSink {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        let rendered = self.core.render(record);
        let mut state = self.state.lock();
        self.rotate_if_needed(&mut state, record.timestamp.into())
            .map_err(|e| Error::SinkError(e.to_string()))?;
        state.file.write_all(&rendered).map_err(|e| Error::SinkError(e.to_string()))
    }

    fn flush(&self) -> Result<()> {
        self.state.lock().file.flush().map_err(|e| Error::SinkError(e.to_string()))
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn rotates_when_the_period_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let sink = DailyFileSink::new(DailyFileConfig::new(&path, Rotation::Minutely)).unwrap();

        let rec1 = Record::at(Level::Info, SystemTime::now(), "l", "first", None);
        sink.log(&rec1).unwrap();

        let later = SystemTime::now() + Duration::from_secs(61);
        let rec2 = Record::at(Level::Info, later, "l", "second", None);
        sink.log(&rec2).unwrap();
        sink.flush().unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(entries.len() > 1, "expected a rotated file once the minute period changed");
    }

    #[test]
    fn stays_in_the_same_file_within_a_period() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let sink = DailyFileSink::new(DailyFileConfig::new(&path, Rotation::Daily)).unwrap();
        for i in 0..5 {
            let rec = Record::at(Level::Info, SystemTime::now(), "l", &format!("m{i}"), None);
            sink.log(&rec).unwrap();
        }
        sink.flush().unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
