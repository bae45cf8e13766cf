//! Small platform shims: thread ids and the platform end-of-line marker.
//!
//! Follows spdlog's `include/spdlog/details/os.h`, which
//! exposes a cheap numeric `thread_id()` rather than the heavier `std::thread::Id`.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: Cell<u64> = Cell::new(0);
}

/// A cheap, process-unique, numeric id for the calling thread.
///
/// Assigned lazily on first use and cached in a thread-local, avoiding the
/// cost of hashing `std::thread::ThreadId` on every log call.
pub fn thread_id() -> u64 {
    THREAD_ID.with(|cell| {
        let mut id = cell.get();
        if id == 0 {
            id = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
            cell.set(id);
        }
        id
    })
}

/// The platform's end-of-line marker: `"\r\n"` on Windows, `"\n"` elsewhere.
#[cfg(windows)]
pub const EOL: &str = "\r\n";
#[cfg(not(windows))]
pub const EOL: &str = "\n";
