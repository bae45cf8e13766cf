//! Scoped, thread-local key-value context merged into formatted output.
//!
//! A clean `Mapping<text, text>` with scoped insert/remove, rather than
//! spdlog's three mutually-inconsistent attribute headers, following a
//! `global_context: AHashMap<String, String>` shape and its `{extra}`
//! template placeholder.

use ahash::AHashMap;
use std::cell::RefCell;

thread_local! {
    static CONTEXT: RefCell<AHashMap<String, String>> = RefCell::new(AHashMap::new());
}

/// A guard returned by [`Context::push`]. Removes the keys it added when dropped,
/// restoring any value a key previously held (shadowing, not clobbering).
pub struct ContextGuard {
    restore: Vec<(String, Option<String>)>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CONTEXT.with(|ctx| {
            let mut ctx = ctx.borrow_mut();
            for (key, prev) in self.restore.drain(..) {
                match prev {
                    Some(value) => {
                        ctx.insert(key, value);
                    }
                    None => {
                        ctx.remove(&key);
                    }
                }
            }
        });
    }
}

/// Thread-scoped key-value context, merged into every record formatted on
/// the thread that pushed it.
pub struct Context;

impl Context {
    /// Pushes `pairs` onto the current thread's context. Returns a guard that
    /// restores the prior state (removal, or the shadowed prior value) on drop.
    #[must_use]
    pub fn push(pairs: &[(&str, &str)]) -> ContextGuard {
        let mut restore = Vec::with_capacity(pairs.len());
        CONTEXT.with(|ctx| {
            let mut ctx = ctx.borrow_mut();
            for (key, value) in pairs {
                let prev = ctx.insert((*key).to_string(), (*value).to_string());
                restore.push(((*key).to_string(), prev));
            }
        });
        ContextGuard { restore }
    }

    /// Snapshots the current thread's context as an ordered vector of pairs.
    pub fn snapshot() -> Vec<(String, String)> {
        CONTEXT.with(|ctx| ctx.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Clears the current thread's context entirely. Intended for test isolation.
    pub fn clear() {
        CONTEXT.with(|ctx| ctx.borrow_mut().clear());
    }
}
