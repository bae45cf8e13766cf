//! `logforge` — a structured, high-throughput, in-process logging library.
//!
//! Application code emits log records through a [`logger::Logger`]; the
//! logger filters by [`level::Level`], formats each record via a
//! [`formatter::Formatter`], and fans the formatted bytes out to one or more
//! [`sink::Sink`] destinations. The [`sink::AsyncSink`] decouples a slow
//! destination from the calling thread behind a [`queue::BoundedQueue`] and
//! a single background worker, with three overflow policies and a
//! synchronous drain barrier (`wait_all`).
//!
//! ```
//! use logforge::level::Level;
//! use logforge::logger::Logger;
//! use logforge::sink::NullSink;
//! use std::sync::Arc;
//!
//! let logger = Logger::new("app", vec![Arc::new(NullSink::new())]);
//! logger.set_level(Level::Info);
//! logger.log(None, Level::Info, "service started");
//! ```

pub mod color;
pub mod context;
pub mod error;
pub mod error_relay;
pub mod formatter;
pub mod global;
pub mod level;
pub mod logger;
pub mod macros;
pub mod os;
pub mod queue;
pub mod record;
pub mod sink;

pub use error::{Error, Result};
pub use global::{global, set_global};
pub use level::Level;
pub use logger::{Logger, LoggerMetrics};
pub use record::Record;
