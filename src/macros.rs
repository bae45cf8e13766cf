//! Call-site sugar over [`crate::logger::Logger`], forwarding to
//! `Logger::log_fmt` with the call site's `file!()`/`line!()`/`module_path!()`
//! captured as the record's source location.
//!
//! A logging crate with zero ergonomic call-site sugar would be an outlier;
//! every mainstream Rust logging crate, and spdlog's own
//! `include/spdlog/spdlog.h`, ships one. No new architecture here — pure
//! sugar over `Logger::log_fmt`.

/// Logs through `$logger` (any expression yielding `&Logger` or
/// `Arc<Logger>`) at `$level`, with `format_args!` semantics.
#[macro_export]
macro_rules! log_with_level {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let loc = $crate::record::SourceLoc::new(file!(), line!(), module_path!());
        $logger.log_fmt(Some(loc), $level, format_args!($($arg)+));
    }};
}

macro_rules! level_macro {
    ($name:ident, $level:expr, $doc:expr) => {
        #[doc = $doc]
        #[macro_export]
        macro_rules! $name {
            ($logger:expr, $($arg:tt)+) => {
                $crate::log_with_level!($logger, $level, $($arg)+)
            };
        }
    };
}

level_macro!(log_trace, $crate::level::Level::Trace, "Logs at `Trace` through the given logger.");
level_macro!(log_debug, $crate::level::Level::Debug, "Logs at `Debug` through the given logger.");
level_macro!(log_info, $crate::level::Level::Info, "Logs at `Info` through the given logger.");
level_macro!(log_warn, $crate::level::Level::Warn, "Logs at `Warn` through the given logger.");
level_macro!(log_err, $crate::level::Level::Err, "Logs at `Err` through the given logger.");
level_macro!(log_critical, $crate::level::Level::Critical, "Logs at `Critical` through the given logger.");

#[cfg(test)]
mod tests {
    use crate::level::Level;
    use crate::logger::Logger;
    use crate::sink::TestSink;
    use std::sync::Arc;

    #[test]
    fn level_macros_forward_to_log_fmt() {
        let sink = Arc::new(TestSink::new());
        sink.set_pattern("{message}");
        let logger = Logger::new("svc", vec![sink.clone()]);
        log_info!(logger, "value={}", 7);
        log_err!(logger, "oops");
        assert_eq!(sink.lines(), vec!["value=7".to_string(), "oops".to_string()]);
    }

    #[test]
    fn level_gating_applies_through_macros() {
        let sink = Arc::new(TestSink::new());
        let logger = Logger::new("svc", vec![sink.clone()]);
        logger.set_level(Level::Warn);
        log_debug!(logger, "suppressed");
        assert_eq!(sink.msg_counter(), 0);
    }
}
