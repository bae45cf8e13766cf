//! `BoundedQueue`: a fixed-capacity multi-producer/multi-consumer FIFO
//! with three enqueue disciplines, a blocking dequeue, and
//! pending/overrun/discard counters.
//!
//! `crossbeam_channel::unbounded` can't express a true capacity bound,
//! an overrun-oldest policy, or a live overrun/discard counter, so this is
//! hand-built on `parking_lot::Mutex` + `Condvar` instead, guarding shared
//! state with `parking_lot` rather than std sync primitives. See
//! `DESIGN.md` for the full rationale.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Upper bound on `BoundedQueue`/`AsyncSink` capacity. spdlog's
/// `include/spdlog/sinks/async_sink.h` defines `max_queue_size = 250'000`
/// directly alongside the `async_sink` this crate's queue is modeled on, so
/// that value (not the alternate ≈10·2²⁰ figure seen elsewhere in the
/// upstream source tree) is adopted here.
pub const MAX_CAPACITY: usize = 250_000;

/// Enqueue discipline applied when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Block the producer until a slot frees. Never discards. Default.
    #[default]
    Block,
    /// Atomically drop the oldest queued element and push the new one.
    OverrunOldest,
    /// Drop the new element; the queue is left unchanged.
    DiscardNew,
}

struct Shared<T> {
    ring: VecDeque<T>,
    capacity: usize,
}

/// A fixed-capacity FIFO safe to share across threads via `Arc`.
pub struct BoundedQueue<T> {
    shared: Mutex<Shared<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    overrun_counter: AtomicUsize,
    discard_counter: AtomicUsize,
}

impl<T> BoundedQueue<T> {
    /// Allocates a ring of `capacity` slots. `capacity == 0` is rejected by
    /// the caller (`AsyncSink::new` surfaces `Error::InvalidConfig`); this
    /// constructor itself only asserts the invariant, since `BoundedQueue` is
    /// also usable directly in tests.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "BoundedQueue capacity must be > 0");
        BoundedQueue {
            shared: Mutex::new(Shared { ring: VecDeque::with_capacity(capacity), capacity }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            overrun_counter: AtomicUsize::new(0),
            discard_counter: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.shared.lock().capacity
    }

    pub fn size(&self) -> usize {
        self.shared.lock().ring.len()
    }

    pub fn overrun_counter(&self) -> usize {
        self.overrun_counter.load(Ordering::Relaxed)
    }

    pub fn discard_counter(&self) -> usize {
        self.discard_counter.load(Ordering::Relaxed)
    }

    pub fn reset_overrun_counter(&self) {
        self.overrun_counter.store(0, Ordering::Relaxed);
    }

    pub fn reset_discard_counter(&self) {
        self.discard_counter.store(0, Ordering::Relaxed);
    }

    /// Blocks until a slot is free, then pushes. Never discards.
    pub fn enqueue_block(&self, item: T) {
        let mut guard = self.shared.lock();
        while guard.ring.len() >= guard.capacity {
            self.not_full.wait(&mut guard);
        }
        guard.ring.push_back(item);
        drop(guard);
        self.not_empty.notify_one();
    }

    /// If full, atomically drops the oldest element and pushes `item`,
    /// incrementing `overrun_counter`. Never blocks.
    pub fn enqueue_overrun(&self, item: T) {
        let mut guard = self.shared.lock();
        if guard.ring.len() >= guard.capacity {
            guard.ring.pop_front();
            self.overrun_counter.fetch_add(1, Ordering::Relaxed);
        }
        guard.ring.push_back(item);
        drop(guard);
        self.not_empty.notify_one();
    }

    /// If full, increments `discard_counter` and drops `item`. Never blocks.
    /// Returns `true` if the item was enqueued, `false` if discarded.
    pub fn enqueue_if_room(&self, item: T) -> bool {
        let mut guard = self.shared.lock();
        if guard.ring.len() >= guard.capacity {
            self.discard_counter.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        guard.ring.push_back(item);
        drop(guard);
        self.not_empty.notify_one();
        true
    }

    /// Enqueues `item` per `policy`. Returns `true` unless `DiscardNew` dropped it.
    pub fn enqueue(&self, item: T, policy: OverflowPolicy) -> bool {
        match policy {
            OverflowPolicy::Block => {
                self.enqueue_block(item);
                true
            }
            OverflowPolicy::OverrunOldest => {
                self.enqueue_overrun(item);
                true
            }
            OverflowPolicy::DiscardNew => self.enqueue_if_room(item),
        }
    }

    /// Waits (up to `timeout`, or indefinitely if `None`) until an item is
    /// available, then pops it. Returns `None` if the timeout elapsed first.
    pub fn dequeue(&self, timeout: Option<Duration>) -> Option<T> {
        let mut guard = self.shared.lock();
        match timeout {
            None => {
                while guard.ring.is_empty() {
                    self.not_empty.wait(&mut guard);
                }
            }
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                while guard.ring.is_empty() {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    let remaining = deadline - now;
                    let timed_out = self.not_empty.wait_for(&mut guard, remaining).timed_out();
                    if timed_out && guard.ring.is_empty() {
                        return None;
                    }
                }
            }
        }
        let item = guard.ring.pop_front();
        drop(guard);
        self.not_full.notify_one();
        item
    }

    /// Blocks the caller until the queue becomes empty, or `timeout` expires
    /// (waits indefinitely when `timeout` is `None`). A non-positive duration
    /// is treated as zero: returns immediately with the current emptiness.
    pub fn wait_until_empty(&self, timeout: Option<Duration>) -> bool {
        let mut guard = self.shared.lock();
        match timeout {
            None => {
                while !guard.ring.is_empty() {
                    self.not_full.wait(&mut guard);
                }
                true
            }
            Some(timeout) => {
                if guard.ring.is_empty() {
                    return true;
                }
                if timeout.is_zero() {
                    return guard.ring.is_empty();
                }
                let deadline = Instant::now() + timeout;
                while !guard.ring.is_empty() {
                    let now = Instant::now();
                    if now >= deadline {
                        return guard.ring.is_empty();
                    }
                    let remaining = deadline - now;
                    self.not_full.wait_for(&mut guard, remaining);
                }
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fifo_order_single_producer() {
        let q = BoundedQueue::new(8);
        for i in 0..8 {
            q.enqueue_block(i);
        }
        for i in 0..8 {
            assert_eq!(q.dequeue(None), Some(i));
        }
    }

    #[test]
    fn overrun_drops_oldest_and_counts() {
        let q = BoundedQueue::new(2);
        q.enqueue_overrun(1);
        q.enqueue_overrun(2);
        q.enqueue_overrun(3); // drops 1
        assert_eq!(q.overrun_counter(), 1);
        assert_eq!(q.dequeue(None), Some(2));
        assert_eq!(q.dequeue(None), Some(3));
    }

    #[test]
    fn discard_new_drops_incoming_and_counts() {
        let q = BoundedQueue::new(1);
        assert!(q.enqueue_if_room(1));
        assert!(!q.enqueue_if_room(2));
        assert_eq!(q.discard_counter(), 1);
        assert_eq!(q.dequeue(None), Some(1));
    }

    #[test]
    fn reset_counters() {
        let q = BoundedQueue::new(1);
        q.enqueue_overrun(1);
        q.enqueue_overrun(2);
        assert_eq!(q.overrun_counter(), 1);
        q.reset_overrun_counter();
        assert_eq!(q.overrun_counter(), 0);

        assert!(q.enqueue_if_room(3));
        q.dequeue(None);
        assert!(q.enqueue_if_room(4));
        assert!(!q.enqueue_if_room(5));
        q.reset_discard_counter();
        assert_eq!(q.discard_counter(), 0);
    }

    #[test]
    fn dequeue_times_out_on_empty_queue() {
        let q: BoundedQueue<i32> = BoundedQueue::new(4);
        let start = Instant::now();
        let got = q.dequeue(Some(Duration::from_millis(20)));
        assert!(got.is_none());
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn wait_until_empty_returns_true_immediately_when_empty() {
        let q: BoundedQueue<i32> = BoundedQueue::new(4);
        assert!(q.wait_until_empty(Some(Duration::from_millis(0))));
        assert!(q.wait_until_empty(None).then_some(()).is_some());
    }

    #[test]
    fn wait_until_empty_times_out_while_full() {
        let q = BoundedQueue::new(4);
        q.enqueue_block(1);
        let start = Instant::now();
        let drained = q.wait_until_empty(Some(Duration::from_millis(20)));
        assert!(!drained);
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn block_policy_unblocks_a_waiting_producer_once_consumed() {
        let q = Arc::new(BoundedQueue::new(1));
        q.enqueue_block(1);

        let q2 = q.clone();
        let producer = thread::spawn(move || {
            q2.enqueue_block(2); // blocks until the item below is dequeued
        });

        thread::sleep(Duration::from_millis(10));
        assert_eq!(q.dequeue(None), Some(1));
        producer.join().unwrap();
        assert_eq!(q.dequeue(None), Some(2));
    }

    #[test]
    fn multi_producer_fifo_is_a_valid_interleaving() {
        let q = Arc::new(BoundedQueue::new(64));
        let mut handles = Vec::new();
        for t in 0..4 {
            let q = q.clone();
            handles.push(thread::spawn(move || {
                for i in 0..16 {
                    q.enqueue_block((t, i));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        let mut per_thread_last = [-1i32; 4];
        let mut total = 0;
        while let Some((t, i)) = q.dequeue(Some(Duration::from_millis(100))) {
            assert!(i as i32 > per_thread_last[t]);
            per_thread_last[t] = i as i32;
            total += 1;
        }
        assert_eq!(total, 64);
    }
}
