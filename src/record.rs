//! The value describing one log event, and its two storage shapes.
//!
//! The synchronous path (`Logger::log`) builds a [`Record`] whose `logger_name`
//! and `payload` borrow from the caller's stack frame — no allocation on the
//! hot path. The asynchronous path (`AsyncSink::log`) copies that borrowed view
//! into an [`OwnedRecord`] at the enqueue boundary so it can cross threads.

use crate::level::Level;
use crate::os;
use smallvec::SmallVec;
use std::time::SystemTime;

/// File/line/function of the call site, when captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLoc<'a> {
    pub filename: &'a str,
    pub line: u32,
    pub function: &'a str,
}

impl<'a> SourceLoc<'a> {
    pub const fn new(filename: &'a str, line: u32, function: &'a str) -> Self {
        Self { filename, line, function }
    }
}

/// Owned, 'static counterpart of [`SourceLoc`], stored inside [`OwnedRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OwnedSourceLoc {
    pub filename: String,
    pub line: u32,
    pub function: String,
}

impl From<SourceLoc<'_>> for OwnedSourceLoc {
    fn from(loc: SourceLoc<'_>) -> Self {
        OwnedSourceLoc {
            filename: loc.filename.to_string(),
            line: loc.line,
            function: loc.function.to_string(),
        }
    }
}

/// A borrowed log record, valid only for the duration of the synchronous call
/// that created it. `logger_name` and `payload` point into the caller's stack.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub level: Level,
    pub timestamp: SystemTime,
    pub thread_id: u64,
    pub source: Option<SourceLoc<'a>>,
    pub logger_name: &'a str,
    pub payload: &'a str,
}

impl<'a> Record<'a> {
    pub fn new(
        level: Level,
        logger_name: &'a str,
        payload: &'a str,
        source: Option<SourceLoc<'a>>,
    ) -> Self {
        Record {
            level,
            timestamp: SystemTime::now(),
            thread_id: os::thread_id(),
            source,
            logger_name,
            payload,
        }
    }

    pub fn at(
        level: Level,
        timestamp: SystemTime,
        logger_name: &'a str,
        payload: &'a str,
        source: Option<SourceLoc<'a>>,
    ) -> Self {
        Record {
            level,
            timestamp,
            thread_id: os::thread_id(),
            source,
            logger_name,
            payload,
        }
    }

    /// Copies this borrowed record into an owned, thread-movable buffer.
    /// This is the only allocation point on the async enqueue boundary.
    pub fn to_owned(&self) -> OwnedRecord {
        // Single contiguous buffer: logger_name then payload, in that order,
        // so text views can be re-derived purely from byte offsets after any
        // relocation of the buffer (e.g. a Vec reallocation on clone).
        let mut buf: SmallVec<[u8; 128]> = SmallVec::with_capacity(
            self.logger_name.len() + self.payload.len(),
        );
        buf.extend_from_slice(self.logger_name.as_bytes());
        buf.extend_from_slice(self.payload.as_bytes());

        OwnedRecord {
            level: self.level,
            timestamp: self.timestamp,
            thread_id: self.thread_id,
            source: self.source.map(OwnedSourceLoc::from),
            buffer: buf,
            logger_name_len: self.logger_name.len(),
        }
    }
}

/// An owned log record: a single contiguous buffer holds `logger_name` then
/// `payload`, with `logger_name()`/`payload()` re-deriving text views from byte
/// offsets. Safe to move across threads; the views never dangle because they
/// are recomputed from the buffer itself rather than cached as pointers.
#[derive(Debug, Clone)]
pub struct OwnedRecord {
    pub level: Level,
    pub timestamp: SystemTime,
    pub thread_id: u64,
    pub source: Option<OwnedSourceLoc>,
    buffer: SmallVec<[u8; 128]>,
    logger_name_len: usize,
}

impl OwnedRecord {
    pub fn logger_name(&self) -> &str {
        // Safety of UTF-8: both halves were copied directly from `&str`s in `to_owned`.
        std::str::from_utf8(&self.buffer[..self.logger_name_len]).unwrap_or("")
    }

    pub fn payload(&self) -> &str {
        std::str::from_utf8(&self.buffer[self.logger_name_len..]).unwrap_or("")
    }

    pub fn source(&self) -> Option<SourceLoc<'_>> {
        self.source.as_ref().map(|s| SourceLoc {
            filename: &s.filename,
            line: s.line,
            function: &s.function,
        })
    }

    /// Borrows this owned record as a [`Record`], for feeding into code that
    /// is generic over both storage shapes (e.g. a `Sink::log` call).
    pub fn as_record(&self) -> Record<'_> {
        Record {
            level: self.level,
            timestamp: self.timestamp,
            thread_id: self.thread_id,
            source: self.source(),
            logger_name: self.logger_name(),
            payload: self.payload(),
        }
    }
}

/// The tagged variant transported on an `AsyncSink`'s queue.
/// `Terminate` is only ever enqueued by the `AsyncSink` destructor.
pub enum ControlRecord {
    Log(OwnedRecord),
    Flush,
    Terminate,
}
