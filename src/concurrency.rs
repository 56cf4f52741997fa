//! Reentrancy flags for the persistence bridge
//!
//! A flag marks one activity (loading, saving) as in progress for as long as
//! its guard is alive. Flags prevent a save triggered from inside a load, or a
//! reload triggered by our own save, from recursing; they do not serialize
//! loads against saves.

use std::sync::atomic::{AtomicBool, Ordering};

/// Atomic "in progress" marker
#[derive(Debug, Default)]
pub struct ActivityFlag {
    active: AtomicBool,
}

impl ActivityFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Mark the activity as running until the guard drops
    ///
    /// Returns `None` when the activity is already running.
    pub fn try_enter(&self) -> Option<ActivityGuard<'_>> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| ActivityGuard { flag: self })
    }
}

/// Clears its flag on drop
#[derive(Debug)]
pub struct ActivityGuard<'a> {
    flag: &'a ActivityFlag,
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        self.flag.active.store(false, Ordering::SeqCst);
    }
}
