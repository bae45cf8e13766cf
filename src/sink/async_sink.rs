//! `AsyncSink`: a [`Sink`] that enqueues records onto a [`BoundedQueue`]
//! and drains them on a single dedicated worker thread.
//!
//! Follows spdlog's `include/spdlog/sinks/async_sink.h` /
//! `src/sinks/async_sink.cpp`: the `config` field names, the `with<Sink>`
//! helper, and the destructor's "enqueue `Terminate` with the *blocking*
//! enqueue even under a non-blocking policy" shutdown contract are all
//! taken from there directly. See `DESIGN.md` for how this differs from an
//! unbounded `crossbeam_channel` buffered writer.

use super::{Sink, SinkCore};
use crate::error::{Error, Result};
use crate::error_relay::{ErrorHandler, ErrorRelay};
use crate::formatter::Formatter;
use crate::level::Level;
use crate::queue::{BoundedQueue, OverflowPolicy, MAX_CAPACITY};
use crate::record::{ControlRecord, Record};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

type ThreadHook = Box<dyn Fn() + Send + Sync>;

/// Configuration accepted by [`AsyncSink::new`]. Mirrors the original's
/// `async_sink::config` field-for-field.
pub struct AsyncSinkConfig {
    pub queue_size: usize,
    pub policy: OverflowPolicy,
    pub sinks: Vec<Arc<dyn Sink>>,
    pub on_thread_start: Option<ThreadHook>,
    pub on_thread_stop: Option<ThreadHook>,
    pub custom_err_handler: Option<ErrorHandler>,
}

/// Default ring capacity, matching the original's `default_queue_size = 8192`.
pub const DEFAULT_QUEUE_SIZE: usize = 8192;

impl Default for AsyncSinkConfig {
    fn default() -> Self {
        AsyncSinkConfig {
            queue_size: DEFAULT_QUEUE_SIZE,
            policy: OverflowPolicy::Block,
            sinks: Vec::new(),
            on_thread_start: None,
            on_thread_stop: None,
            custom_err_handler: None,
        }
    }
}

impl AsyncSinkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    pub fn with_policy(mut self, policy: OverflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_sinks(mut self, sinks: Vec<Arc<dyn Sink>>) -> Self {
        self.sinks = sinks;
        self
    }

    pub fn with_thread_start(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_thread_start = Some(Box::new(hook));
        self
    }

    pub fn with_thread_stop(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_thread_stop = Some(Box::new(hook));
        self
    }

    pub fn with_err_handler(mut self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.custom_err_handler = Some(Box::new(handler));
        self
    }
}

struct Shared {
    queue: BoundedQueue<ControlRecord>,
    sinks: Vec<Arc<dyn Sink>>,
    policy: OverflowPolicy,
    error_relay: Arc<ErrorRelay>,
    terminate: AtomicBool,
}

fn worker_loop(shared: Arc<Shared>, on_thread_start: Option<ThreadHook>, on_thread_stop: Option<ThreadHook>) {
    if let Some(hook) = on_thread_start.as_ref() {
        hook();
    }
    loop {
        let Some(ctrl) = shared.queue.dequeue(None) else { continue };
        match ctrl {
            ControlRecord::Log(owned) => {
                let record: Record<'_> = owned.as_record();
                for sink in &shared.sinks {
                    if !sink.accepts(record.level) {
                        continue;
                    }
                    if let Err(e) = sink.log(&record) {
                        shared.error_relay.handle("async log", record.source, &e.to_string());
                    }
                }
            }
            ControlRecord::Flush => {
                for sink in &shared.sinks {
                    if let Err(e) = sink.flush() {
                        shared.error_relay.handle("async flush", None, &e.to_string());
                    }
                }
            }
            ControlRecord::Terminate => break,
        }
    }
    if let Some(hook) = on_thread_stop.as_ref() {
        hook();
    }
}

/// A [`Sink`] that decouples the calling thread from downstream I/O: records
/// are enqueued onto a bounded queue and a single worker thread drains them
/// into the configured downstream sinks.
pub struct AsyncSink {
    core: SinkCore,
    queue_size: usize,
    policy: OverflowPolicy,
    shared: Arc<Shared>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl AsyncSink {
    /// Constructs and starts the worker thread. Fails with
    /// `Error::InvalidConfig` if `queue_size` is `0` or exceeds
    /// [`MAX_CAPACITY`]; in that case the worker is never started and
    /// neither thread hook runs.
    pub fn new(config: AsyncSinkConfig) -> Result<Self> {
        if config.queue_size == 0 || config.queue_size > MAX_CAPACITY {
            return Err(Error::InvalidConfig(format!(
                "queue_size must be in (0, {MAX_CAPACITY}], got {}",
                config.queue_size
            )));
        }

        let error_relay = Arc::new(ErrorRelay::new());
        if let Some(handler) = config.custom_err_handler {
            error_relay.set_handler(Some(handler));
        }

        let shared = Arc::new(Shared {
            queue: BoundedQueue::new(config.queue_size),
            sinks: config.sinks,
            policy: config.policy,
            error_relay,
            terminate: AtomicBool::new(false),
        });

        let worker_shared = shared.clone();
        let on_start = config.on_thread_start;
        let on_stop = config.on_thread_stop;
        let worker = std::thread::Builder::new()
            .name("logforge-async".to_string())
            .spawn(move || worker_loop(worker_shared, on_start, on_stop))
            .map_err(|e| Error::InvalidConfig(format!("failed to spawn worker thread: {e}")))?;

        Ok(AsyncSink {
            core: SinkCore::new(),
            queue_size: config.queue_size,
            policy: config.policy,
            shared,
            worker: Some(worker),
        })
    }

    /// Builds an `AsyncSink` whose sole downstream sink is `sink`, with an
    /// otherwise-default config. Mirrors the original's `async_sink::with<Sink>`.
    pub fn with<S: Sink + 'static>(sink: S) -> Result<Self> {
        AsyncSink::new(AsyncSinkConfig::new().with_sink(Arc::new(sink)))
    }

    /// Blocks until the queue drains to empty, or `timeout` elapses.
    /// `None` waits indefinitely. A zero or negative duration returns
    /// immediately with the current emptiness.
    pub fn wait_all(&self, timeout: Option<Duration>) -> bool {
        self.shared.queue.wait_until_empty(timeout)
    }

    pub fn overrun_counter(&self) -> usize {
        self.shared.queue.overrun_counter()
    }

    pub fn discard_counter(&self) -> usize {
        self.shared.queue.discard_counter()
    }

    pub fn reset_overrun_counter(&self) {
        self.shared.queue.reset_overrun_counter();
    }

    pub fn reset_discard_counter(&self) {
        self.shared.queue.reset_discard_counter();
    }

    pub fn get_config(&self) -> AsyncSinkSnapshot {
        AsyncSinkSnapshot { queue_size: self.queue_size, policy: self.policy, sink_count: self.shared.sinks.len() }
    }

    fn enqueue(&self, ctrl: ControlRecord) {
        self.shared.queue.enqueue(ctrl, self.policy);
    }
}

/// A point-in-time read of the sink's own configuration, returned by
/// `get_config` (the original's `config` struct carries owned sinks/hooks
/// that can't cheaply be handed back by value here).
#[derive(Debug, Clone, Copy)]
pub struct AsyncSinkSnapshot {
    pub queue_size: usize,
    pub policy: OverflowPolicy,
    pub sink_count: usize,
}

impl Sink for AsyncSink {
    fn log(&self, record: &Record<'_>) -> Result<()> {
        self.enqueue(ControlRecord::Log(record.to_owned()));
        Ok(())
    }

    /// Enqueues a `Flush` control record and returns immediately. Does
    /// **not** wait for the worker to process it — `wait_all` is the
    /// barrier for callers that need the drain to actually finish.
    fn flush(&self) -> Result<()> {
        self.enqueue(ControlRecord::Flush);
        Ok(())
    }

    fn set_pattern(&self, pattern: &str) {
        let formatter = crate::formatter::PatternFormatter::new(pattern);
        self.set_formatter(Box::new(formatter));
    }

    fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        let Some((last, rest)) = self.shared.sinks.split_last() else { return };
        for sink in rest {
            sink.set_formatter(formatter.clone_box());
        }
        last.set_formatter(formatter);
    }

    fn set_level(&self, level: Level) {
        self.core.set_level(level);
    }

    fn level(&self) -> Level {
        self.core.level()
    }
}

impl Drop for AsyncSink {
    fn drop(&mut self) {
        self.shared.terminate.store(true, Ordering::Relaxed);
        // Shutdown must not be lost: always use the blocking enqueue for
        // `Terminate`, even when `policy` is a non-blocking discipline.
        self.shared.queue.enqueue_block(ControlRecord::Terminate);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                let _ = std::io::Write::write_all(
                    &mut std::io::stderr(),
                    b"[*** LOG ERROR ***] [async_sink] worker thread panicked during shutdown\n",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::TestSink;
    use std::time::SystemTime;

    fn rec<'a>(payload: &'a str) -> Record<'a> {
        Record::at(Level::Info, SystemTime::now(), "l", payload, None)
    }

    #[test]
    fn rejects_zero_queue_size() {
        let err = AsyncSink::new(AsyncSinkConfig::new().with_queue_size(0));
        assert!(matches!(err, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_oversized_queue() {
        let err = AsyncSink::new(AsyncSinkConfig::new().with_queue_size(MAX_CAPACITY + 1));
        assert!(matches!(err, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn basic_drain_delivers_every_record() {
        let test_sink = Arc::new(TestSink::new());
        let sink = AsyncSink::new(
            AsyncSinkConfig::new().with_queue_size(16).with_sink(test_sink.clone()),
        )
        .unwrap();
        for i in 0..256 {
            sink.log(&rec(&format!("message {i}"))).unwrap();
        }
        sink.flush().unwrap();
        assert!(sink.wait_all(Some(Duration::from_secs(2))));
        assert_eq!(test_sink.msg_counter(), 256);
        assert_eq!(test_sink.flush_counter(), 1);
        assert_eq!(sink.overrun_counter(), 0);
    }

    #[test]
    fn overrun_policy_drops_and_counts() {
        let test_sink = Arc::new(TestSink::new().with_delay(Duration::from_millis(1)));
        let sink = AsyncSink::new(
            AsyncSinkConfig::new()
                .with_queue_size(4)
                .with_policy(OverflowPolicy::OverrunOldest)
                .with_sink(test_sink.clone()),
        )
        .unwrap();
        for i in 0..1024 {
            sink.log(&rec(&format!("m{i}"))).unwrap();
        }
        sink.wait_all(Some(Duration::from_secs(5)));
        assert!(test_sink.msg_counter() < 1024);
        assert!(sink.overrun_counter() > 0);
        sink.reset_overrun_counter();
        assert_eq!(sink.overrun_counter(), 0);
    }

    #[test]
    fn discard_policy_drops_and_counts() {
        let test_sink = Arc::new(TestSink::new().with_delay(Duration::from_millis(1)));
        let sink = AsyncSink::new(
            AsyncSinkConfig::new()
                .with_queue_size(4)
                .with_policy(OverflowPolicy::DiscardNew)
                .with_sink(test_sink.clone()),
        )
        .unwrap();
        for i in 0..1024 {
            sink.log(&rec(&format!("m{i}"))).unwrap();
        }
        sink.wait_all(Some(Duration::from_secs(5)));
        assert!(test_sink.msg_counter() < 1024);
        assert!(sink.discard_counter() > 0);
    }

    #[test]
    fn sink_error_is_isolated_via_error_relay() {
        let failing = Arc::new(TestSink::new().with_always_fail("test backend exception"));
        let seen: Arc<parking_lot::Mutex<Vec<String>>> = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        let sink = AsyncSink::new(
            AsyncSinkConfig::new()
                .with_sink(failing)
                .with_err_handler(move |msg| seen2.lock().push(msg.to_string())),
        )
        .unwrap();
        sink.log(&rec("X")).unwrap();
        sink.wait_all(Some(Duration::from_secs(2)));
        assert!(seen.lock().iter().any(|m| m.contains("test backend exception")));
    }

    #[test]
    fn wait_all_respects_timeout_then_succeeds() {
        let test_sink = Arc::new(TestSink::new().with_delay(Duration::from_millis(10)));
        let sink = AsyncSink::new(AsyncSinkConfig::new().with_sink(test_sink)).unwrap();
        for i in 0..10 {
            sink.log(&rec(&format!("m{i}"))).unwrap();
        }
        let start = std::time::Instant::now();
        let drained = sink.wait_all(Some(Duration::from_millis(10)));
        let elapsed = start.elapsed();
        assert!(!drained);
        assert!(elapsed >= Duration::from_millis(8));
        assert!(elapsed < Duration::from_millis(200));
        assert!(sink.wait_all(Some(Duration::from_millis(10 * 10 + 500))));
    }

    #[test]
    fn with_helper_builds_single_sink_async() {
        let sink = AsyncSink::with(TestSink::new()).unwrap();
        sink.log(&rec("hi")).unwrap();
        assert!(sink.wait_all(Some(Duration::from_secs(1))));
        assert_eq!(sink.get_config().sink_count, 1);
    }

    #[test]
    fn destructor_drains_full_queue_under_block_policy() {
        let test_sink = Arc::new(TestSink::new());
        {
            let sink = AsyncSink::new(
                AsyncSinkConfig::new().with_queue_size(1).with_sink(test_sink.clone()),
            )
            .unwrap();
            for i in 0..50 {
                sink.log(&rec(&format!("m{i}"))).unwrap();
            }
        }
        assert_eq!(test_sink.msg_counter(), 50);
    }
}
