//! Thread-scoped memoization state.
//!
//! Each OS thread has its own independent state. Threads spawned while a
//! scope is active start inactive and never see their parent's caches.

use std::cell::RefCell;
use std::thread;

use crate::cache::{ResourceCache, ResponseCache};

/// Memoization state of one execution context.
///
/// Active exactly when both caches are present.
#[derive(Debug, Default)]
pub struct MemoizationState {
    caches: Option<(ResourceCache, ResponseCache)>,
}

impl MemoizationState {
    /// Create inactive state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether memoization is active.
    pub fn is_active(&self) -> bool {
        self.caches.is_some()
    }

    /// Activate with fresh caches. Existing caches are kept if already active.
    ///
    /// Returns `true` if this call activated the state.
    pub fn start(&mut self) -> bool {
        if self.caches.is_some() {
            return false;
        }
        self.caches = Some((ResourceCache::new(), ResponseCache::new()));
        true
    }

    /// Deactivate, handing back the caches that were discarded.
    pub fn stop(&mut self) -> Option<(ResourceCache, ResponseCache)> {
        self.caches.take()
    }

    /// Resource cache of the active scope.
    pub fn resource_cache(&self) -> Option<ResourceCache> {
        self.caches.as_ref().map(|(resources, _)| resources.clone())
    }

    /// Response cache of the active scope.
    pub fn response_cache(&self) -> Option<ResponseCache> {
        self.caches.as_ref().map(|(_, responses)| responses.clone())
    }
}

thread_local! {
    static STATE: RefCell<MemoizationState> = RefCell::new(MemoizationState::new());
}

/// Check whether the calling thread is memoizing.
pub fn is_memoizing() -> bool {
    STATE.with(|state| state.borrow().is_active())
}

/// Begin memoizing on the calling thread. A no-op if already memoizing.
pub fn start_memoizing() {
    if STATE.with(|state| state.borrow_mut().start()) {
        tracing::debug!(thread = ?thread::current().id(), "memoization started");
    } else {
        tracing::trace!(thread = ?thread::current().id(), "memoization already active");
    }
}

/// Stop memoizing on the calling thread and discard its caches.
/// A no-op if not memoizing.
pub fn stop_memoizing() {
    // Dropped outside the borrow: cached values may touch this state on drop.
    let discarded = STATE.with(|state| state.borrow_mut().stop());
    match discarded {
        Some((resources, responses)) => {
            tracing::debug!(
                thread = ?thread::current().id(),
                resources = resources.len(),
                responses = responses.len(),
                "memoization stopped"
            );
            drop((resources, responses));
        }
        None => {
            tracing::trace!(thread = ?thread::current().id(), "memoization not active");
        }
    }
}

/// Resource cache of the calling thread, if memoizing.
pub fn resource_cache() -> Option<ResourceCache> {
    STATE.with(|state| state.borrow().resource_cache())
}

/// Response cache of the calling thread, if memoizing.
pub fn response_cache() -> Option<ResponseCache> {
    STATE.with(|state| state.borrow().response_cache())
}

/// Scope guard that stops memoizing on drop if it was the one to start it.
#[derive(Debug)]
#[must_use = "memoization stops as soon as the guard is dropped"]
pub struct MemoizeGuard {
    started: bool,
}

impl MemoizeGuard {
    /// Start memoizing unless the calling thread already is.
    pub fn enter() -> Self {
        let started = !is_memoizing();
        if started {
            start_memoizing();
        }
        Self { started }
    }

    /// Whether this guard opened the scope.
    pub fn is_outermost(&self) -> bool {
        self.started
    }
}

impl Drop for MemoizeGuard {
    fn drop(&mut self) {
        if self.started {
            stop_memoizing();
        }
    }
}

/// Run `block` with memoization enabled.
///
/// Inside an active scope this only runs `block`. Otherwise memoization is
/// started first and stopped when `block` finishes, returns early or
/// panics.
pub fn memoize<T>(block: impl FnOnce() -> T) -> T {
    let _guard = MemoizeGuard::enter();
    block()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;

    fn reset() {
        stop_memoizing();
    }

    // === State ===

    #[test]
    fn test_state_lifecycle() {
        let mut state = MemoizationState::new();
        assert!(!state.is_active());
        assert!(state.resource_cache().is_none());

        assert!(state.start());
        assert!(state.is_active());
        let first = state.resource_cache().unwrap();

        assert!(!state.start());
        assert!(first.ptr_eq(&state.resource_cache().unwrap()));

        assert!(state.stop().is_some());
        assert!(!state.is_active());
        assert!(state.response_cache().is_none());
        assert!(state.stop().is_none());
    }

    // === Start / Stop ===

    #[test]
    fn test_default_inactive() {
        reset();
        assert!(!is_memoizing());
        assert!(resource_cache().is_none());
        assert!(response_cache().is_none());
    }

    #[test]
    fn test_start_allocates_caches() {
        reset();
        start_memoizing();
        assert!(is_memoizing());
        assert!(resource_cache().is_some());
        assert!(response_cache().is_some());
        stop_memoizing();
        assert!(!is_memoizing());
        assert!(resource_cache().is_none());
    }

    #[test]
    fn test_redundant_start_keeps_caches() {
        reset();
        start_memoizing();
        let before = resource_cache().unwrap();
        before.put("k", 1u8);

        start_memoizing();
        let after = resource_cache().unwrap();
        assert!(before.ptr_eq(&after));
        assert_eq!(after.len(), 1);
        stop_memoizing();
    }

    #[test]
    fn test_redundant_stop_is_noop() {
        reset();
        stop_memoizing();
        stop_memoizing();
        assert!(!is_memoizing());
    }

    #[test]
    fn test_each_cycle_gets_fresh_caches() {
        reset();
        start_memoizing();
        let first = response_cache().unwrap();
        first.put("k", 1u8);
        stop_memoizing();

        start_memoizing();
        let second = response_cache().unwrap();
        assert!(!first.ptr_eq(&second));
        assert!(second.is_empty());
        stop_memoizing();
    }

    #[test]
    fn test_getters_return_same_handle() {
        reset();
        start_memoizing();
        assert!(resource_cache().unwrap().ptr_eq(&resource_cache().unwrap()));
        assert!(response_cache().unwrap().ptr_eq(&response_cache().unwrap()));
        stop_memoizing();
    }

    // === memoize ===

    #[test]
    fn test_memoize_scopes_and_returns_value() {
        reset();
        let value = memoize(|| {
            assert!(is_memoizing());
            42
        });
        assert_eq!(value, 42);
        assert!(!is_memoizing());
    }

    #[test]
    fn test_memoize_nested_is_noop() {
        reset();
        memoize(|| {
            let outer = resource_cache().unwrap();
            memoize(|| {
                assert!(outer.ptr_eq(&resource_cache().unwrap()));
            });
            assert!(is_memoizing());
            assert!(outer.ptr_eq(&resource_cache().unwrap()));
        });
        assert!(!is_memoizing());
    }

    #[test]
    fn test_memoize_inside_manual_scope_does_not_stop() {
        reset();
        start_memoizing();
        memoize(|| ());
        assert!(is_memoizing());
        stop_memoizing();
    }

    #[test]
    fn test_memoize_stops_on_err() {
        reset();
        let result: Result<(), String> = memoize(|| {
            if is_memoizing() {
                return Err("failed".to_string());
            }
            Ok(())
        });
        assert_eq!(result, Err("failed".to_string()));
        assert!(!is_memoizing());
    }

    #[test]
    fn test_memoize_stops_on_panic() {
        reset();
        let outcome = panic::catch_unwind(|| {
            memoize(|| {
                assert!(is_memoizing());
                panic!("boom");
            })
        });
        let payload = outcome.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
        assert!(!is_memoizing());
    }

    #[test]
    fn test_guard_only_stops_what_it_started() {
        reset();
        {
            let outer = MemoizeGuard::enter();
            assert!(outer.is_outermost());
            {
                let inner = MemoizeGuard::enter();
                assert!(!inner.is_outermost());
            }
            assert!(is_memoizing());
        }
        assert!(!is_memoizing());
    }

    // === Thread Isolation ===

    #[test]
    fn test_threads_are_isolated() {
        reset();
        start_memoizing();
        resource_cache().unwrap().put("k", 1u8);

        let child = thread::spawn(|| {
            let inherited = is_memoizing();
            start_memoizing();
            let empty = resource_cache().map(|c| c.is_empty());
            stop_memoizing();
            (inherited, empty)
        })
        .join()
        .unwrap();

        assert_eq!(child, (false, Some(true)));
        assert!(is_memoizing());
        assert_eq!(resource_cache().unwrap().len(), 1);
        stop_memoizing();
    }

    #[test]
    fn test_child_stop_does_not_affect_parent() {
        reset();
        let parent = thread::spawn(|| {
            start_memoizing();
            thread::spawn(|| {
                start_memoizing();
                stop_memoizing();
            })
            .join()
            .unwrap();
            is_memoizing()
        })
        .join()
        .unwrap();
        assert!(parent);
    }
}
