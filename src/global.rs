//! The process-global logger registry.
//!
//! A single shared reference, read atomically, replaces spdlog's
//! recursive-mutex-protected registry (`spdlog::details::registry`) and a
//! `once_cell`/lock-around-shared-state pattern this crate also uses
//! elsewhere, generalized here to `arc_swap::ArcSwap` so a read is a single
//! atomic load with no lock contention among readers.

use crate::logger::Logger;
use crate::sink::NullSink;
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::sync::Arc;

fn default_logger() -> Arc<Logger> {
    Arc::new(Logger::new("default", vec![Arc::new(NullSink::new())]))
}

static GLOBAL: Lazy<ArcSwap<Logger>> = Lazy::new(|| ArcSwap::new(default_logger()));

/// Returns the current process-global logger.
///
/// Swapping the global logger while other threads are actively logging
/// through the previously-returned handle is not safe in the sense that a
/// caller holding an old `Arc<Logger>` keeps logging through the old
/// instance rather than the new one; this is documented, not enforced.
pub fn global() -> Arc<Logger> {
    GLOBAL.load_full()
}

/// Installs `logger` as the new process-global logger.
pub fn set_global(logger: Arc<Logger>) {
    GLOBAL.store(logger);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::sink::TestSink;
    use std::sync::Mutex;

    // `GLOBAL` is process-wide state; serialize the tests that swap it so
    // they don't race against each other under the test harness's default
    // parallel execution.
    static SERIAL: Mutex<()> = Mutex::new(());

    #[test]
    fn default_global_logger_is_usable() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let logger = global();
        logger.log(None, Level::Info, "fine to call before any set_global");
    }

    #[test]
    fn set_global_replaces_the_shared_instance() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let sink = Arc::new(TestSink::new());
        let replacement = Arc::new(Logger::new("replacement", vec![sink.clone()]));
        set_global(replacement.clone());
        global().log(None, Level::Info, "via replacement");
        assert_eq!(sink.msg_counter(), 1);
        assert_eq!(global().name(), "replacement");
        // restore a harmless default so other tests in this process aren't affected
        set_global(default_logger());
    }
}
