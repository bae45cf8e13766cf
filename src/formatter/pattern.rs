//! Compiled placeholder-template formatter.
//!
//! Generalizes a `format_with_template`-style one-shot function called with
//! ad hoc strings into a reusable, compiled [`Formatter`]. Placeholders:
//! `{time}`, `{level}`, `{logger}`, `{message}`, `{thread}`, `{file}`,
//! `{line}`, `{function}`, `{extra}` (thread-local [`crate::context::Context`]
//! pairs), all case-insensitive. `{time:FORMAT}` accepts a
//! `YYYY-MM-DD HH:mm:ss.SSS`-style sub-syntax, translated to `chrono` format
//! specifiers.

use super::Formatter;
use crate::context::Context;
use crate::os;
use crate::record::Record;
use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use std::collections::HashMap;

/// The pattern used when a sink is constructed without an explicit one.
pub const DEFAULT_PATTERN: &str = "{time} [{level}] [{logger}] {message}";

fn convert_time_pattern(pattern: &str) -> String {
    pattern
        .replace("YYYY", "%Y")
        .replace("YY", "%y")
        .replace("MM", "%m")
        .replace("DD", "%d")
        .replace("HH", "%H")
        .replace("mm", "%M")
        .replace("ss", "%S")
        .replace("SSS", "%3f")
}

fn format_timestamp(ts: DateTime<Utc>, pattern: &str) -> String {
    ts.format(&convert_time_pattern(pattern)).to_string()
}

#[derive(Clone)]
pub struct PatternFormatter {
    template: String,
    placeholder: Regex,
}

impl PatternFormatter {
    pub fn new(template: impl Into<String>) -> Self {
        PatternFormatter {
            template: template.into(),
            // Matches `{key}` or `{key:format}`, case-insensitively on `key`.
            placeholder: Regex::new(r"\{([^}:]+)(?::([^}]+))?\}").unwrap(),
        }
    }

    fn render(&self, record: &Record<'_>) -> String {
        let ts: DateTime<Utc> = record.timestamp.into();
        let extra = Context::snapshot();

        let mut fields: HashMap<String, String> = HashMap::new();
        fields.insert("time".into(), ts.to_rfc3339());
        fields.insert("level".into(), record.level.as_str().to_uppercase());
        fields.insert("logger".into(), record.logger_name.to_string());
        fields.insert("message".into(), record.payload.to_string());
        fields.insert("thread".into(), record.thread_id.to_string());
        if let Some(loc) = record.source {
            fields.insert("file".into(), loc.filename.to_string());
            fields.insert("line".into(), loc.line.to_string());
            fields.insert("function".into(), loc.function.to_string());
        }
        for (k, v) in &extra {
            fields.insert(k.to_lowercase(), v.clone());
        }

        self.placeholder
            .replace_all(&self.template, |caps: &Captures<'_>| {
                let key = caps[1].to_lowercase();
                let sub_format = caps.get(2).map(|m| m.as_str());

                if key == "extra" {
                    extra.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(" | ")
                } else if key == "time" && sub_format.is_some() {
                    format_timestamp(ts, sub_format.unwrap())
                } else {
                    fields.get(&key).cloned().unwrap_or_else(|| caps[0].to_string())
                }
            })
            .into_owned()
    }
}

impl Default for PatternFormatter {
    fn default() -> Self {
        PatternFormatter::new(DEFAULT_PATTERN)
    }
}

impl Formatter for PatternFormatter {
    fn format(&self, record: &Record<'_>, out: &mut Vec<u8>) {
        out.extend_from_slice(self.render(record).as_bytes());
        out.extend_from_slice(os::EOL.as_bytes());
    }

    fn clone_box(&self) -> Box<dyn Formatter> {
        Box::new(self.clone())
    }
}
