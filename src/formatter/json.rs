//! One-JSON-object-per-record formatter.
//!
//! Follows a `JsonRecord`-style shape, extended with the `logger`/`thread`/
//! `source` fields this crate's [`Record`] carries.

use super::Formatter;
use crate::context::Context;
use crate::os;
use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: DateTime<Utc>,
    level: &'a str,
    logger: &'a str,
    message: &'a str,
    thread: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function: Option<&'a str>,
    #[serde(skip_serializing_if = "Value::is_null")]
    fields: Value,
}

#[derive(Clone, Default)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        JsonFormatter { pretty: false }
    }

    pub fn pretty() -> Self {
        JsonFormatter { pretty: true }
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record<'_>, out: &mut Vec<u8>) {
        let extra = Context::snapshot();
        let fields = if extra.is_empty() {
            Value::Null
        } else {
            Value::Object(extra.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
        };

        let rec = JsonRecord {
            timestamp: record.timestamp.into(),
            level: record.level.as_str(),
            logger: record.logger_name,
            message: record.payload,
            thread: record.thread_id,
            file: record.source.map(|s| s.filename),
            line: record.source.map(|s| s.line),
            function: record.source.map(|s| s.function),
            fields,
        };

        let encoded = if self.pretty {
            serde_json::to_string_pretty(&rec)
        } else {
            serde_json::to_string(&rec)
        };
        out.extend_from_slice(encoded.unwrap_or_default().as_bytes());
        out.extend_from_slice(os::EOL.as_bytes());
    }

    fn clone_box(&self) -> Box<dyn Formatter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use std::time::SystemTime;

    #[test]
    fn formats_a_valid_json_line() {
        let fmt = JsonFormatter::new();
        let rec = Record::at(Level::Warn, SystemTime::UNIX_EPOCH, "svc", "uh oh", None);
        let mut out = Vec::new();
        fmt.format(&rec, &mut out);
        let text = String::from_utf8(out).unwrap();
        let value: Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["level"], "warning");
        assert_eq!(value["logger"], "svc");
        assert_eq!(value["message"], "uh oh");
    }

    #[test]
    fn omits_source_fields_when_absent() {
        let fmt = JsonFormatter::new();
        let rec = Record::at(Level::Info, SystemTime::UNIX_EPOCH, "svc", "m", None);
        let mut out = Vec::new();
        fmt.format(&rec, &mut out);
        let value: Value = serde_json::from_str(String::from_utf8(out).unwrap().trim_end()).unwrap();
        assert!(value.get("file").is_none());
    }
}
