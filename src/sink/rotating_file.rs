//! Size-triggered file rotation, with retention pruning and optional
//! compression of rotated-away files.
//!
//! Follows a `SimpleRollingWriter::rotate_if_needed`-style
//! rotate-on-write-if-would-exceed-limit check, with a `Compression` enum
//! actually wired to `flate2`/`zstd` rather than left unused.

use super::{retention, Sink, SinkCore};
use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::level::Level;
use crate::record::Record;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression as GzLevel;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Compression applied to a file once it has been rotated away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Zstd,
}

impl Compression {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "gzip" | "gz" => Compression::Gzip,
            "zstd" | "zst" => Compression::Zstd,
            _ => Compression::None,
        }
    }

    fn extension(self) -> Option<&'static str> {
        match self {
            Compression::None => None,
            Compression::Gzip => Some("gz"),
            Compression::Zstd => Some("zst"),
        }
    }
}

pub(crate) fn compress_in_place(path: &Path, algo: Compression) -> io::Result<()> {
    let Some(ext) = algo.extension() else { return Ok(()) };
    let mut raw = Vec::new();
    File::open(path)?.read_to_end(&mut raw)?;

    let compressed_path = {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    };
    let out = File::create(&compressed_path)?;
    match algo {
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(out, GzLevel::default());
            encoder.write_all(&raw)?;
            encoder.finish()?;
        }
        Compression::Zstd => {
            zstd::stream::copy_encode(raw.as_slice(), out, 0)?;
        }
        Compression::None => unreachable!(),
    }
    std::fs::remove_file(path)?;
    Ok(())
}

/// Parses a human size string (`"10MB"`, `"1.5 GiB"`, a bare byte count) into
/// a byte count, or `None` if it doesn't parse. Uses the `byte-unit` crate
/// rather than a hand-rolled unit-suffix parser.
pub fn parse_size(size_str: &str) -> Option<u64> {
    byte_unit::Byte::parse_str(size_str.trim(), true).ok().map(|b| b.as_u64())
}

pub struct RotatingFileConfig {
    pub path: PathBuf,
    pub max_size_bytes: u64,
    pub max_files: Option<usize>,
    pub compression: Compression,
}

impl RotatingFileConfig {
    pub fn new(path: impl Into<PathBuf>, max_size_bytes: u64) -> Self {
        RotatingFileConfig {
            path: path.into(),
            max_size_bytes,
            max_files: None,
            compression: Compression::None,
        }
    }

    /// As `new`, but accepts a human size string (`"10MB"`) for the limit.
    /// Fails with `Error::InvalidConfig` if the string doesn't parse.
    pub fn with_size_str(path: impl Into<PathBuf>, size_str: &str) -> Result<Self> {
        let max_size_bytes = parse_size(size_str)
            .ok_or_else(|| Error::InvalidConfig(format!("invalid size string: {size_str:?}")))?;
        Ok(RotatingFileConfig::new(path, max_size_bytes))
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

struct State {
    file: File,
    current_size: u64,
}

pub struct RotatingFileSink {
    core: SinkCore,
    config: RotatingFileConfig,
    state: Mutex<State>,
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

impl RotatingFileSink {
    pub fn new(config: RotatingFileConfig) -> Result<Self> {
        if config.max_size_bytes == 0 {
            return Err(Error::InvalidConfig("max_size_bytes must be > 0".into()));
        }
        let file = open_append(&config.path).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        let current_size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(RotatingFileSink { core: SinkCore::new(), config, state: Mutex::new(State { file, current_size }) })
    }

    fn rotated_name(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S%.f");
        let file_name = self.config.path.file_name().and_then(|s| s.to_str()).unwrap_or("log");
        let new_name = match file_name.rfind('.') {
            Some(pos) => format!("{}.{stamp}{}", &file_name[..pos], &file_name[pos..]),
            None => format!("{file_name}.{stamp}"),
        };
        self.config.path.with_file_name(new_name)
    }

    fn rotate(&self, state: &mut State) -> io::Result<()> {
        let rotated = self.rotated_name();
        std::fs::rename(&self.config.path, &rotated)?;
        state.file = open_append(&self.config.path)?;
        state.current_size = 0;

        let compression = self.config.compression;
        let keep = self.config.max_files;
        let base_prefix = self.config.path.file_stem().and_then(|s| s.to_str()).unwrap_or("log").to_string();

        if compression != Compression::None {
            compress_in_place(&rotated, compression)?;
        }
        if let Some(keep) = keep {
            if let Some(dir) = self.config.path.parent() {
                let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
                retention::prune(dir, keep, |p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&base_prefix) && n != self.config.path.file_name().and_then(|n| n.to_str()).unwrap_or(""))
                })?;
            }
        }
        Ok(())
    }
}

impl Sink for RotatingFileSink {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        let rendered = self.core.render(record);
        let mut state = self.state.lock();
        if state.current_size + rendered.len() as u64 > self.config.max_size_bytes {
            self.rotate(&mut state).map_err(|e| Error::SinkError(e.to_string()))?;
        }
        state.file.write_all(&rendered).map_err(|e| Error::SinkError(e.to_string()))?;
        state.current_size += rendered.len() as u64;
        Ok(())
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
