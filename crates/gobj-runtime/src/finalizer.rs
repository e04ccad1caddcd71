//! Finalization facilities keyed by identity.
//!
//! A finalizer receives only the [`InstanceId`]: by the time it runs the
//! resource is gone. Finalizers run in a restricted context and must only
//! touch in-memory state.

use std::any::Any;
use std::sync::{Arc, Weak};

use gobj_types::InstanceId;
use parking_lot::Mutex;

/// Sink invoked once per identity after the tracked resource is unreachable.
pub trait Finalize: Send + Sync {
    fn finalize(&self, id: InstanceId);
}

/// Native finalizer: owned by a tracked wrapper, fires when the wrapper drops.
///
/// Declare it after the host resource in the wrapper so the resource is
/// dropped first.
pub struct FinalizerGuard {
    id: InstanceId,
    sink: Arc<dyn Finalize>,
    armed: bool,
}

impl FinalizerGuard {
    pub fn new(id: InstanceId, sink: Arc<dyn Finalize>) -> Self {
        Self {
            id,
            sink,
            armed: true,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// The resource was released explicitly; dropping it later is not a leak.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl Drop for FinalizerGuard {
    fn drop(&mut self) {
        if self.armed {
            self.armed = false;
            self.sink.finalize(self.id);
        }
    }
}

struct WatchEntry {
    target: Weak<dyn Any + Send + Sync>,
    id: InstanceId,
}

/// Approximate finalization for shared host objects: remembers a weak handle
/// per identity and reports the ones whose target has died on [`sweep`].
///
/// [`sweep`]: WeakSweeper::sweep
#[derive(Default)]
pub struct WeakSweeper {
    entries: Mutex<Vec<WatchEntry>>,
}

impl WeakSweeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch<T: Any + Send + Sync>(&self, target: &Arc<T>, id: InstanceId) {
        let target: Arc<dyn Any + Send + Sync> = target.clone();
        self.entries.lock().push(WatchEntry {
            target: Arc::downgrade(&target),
            id,
        });
    }

    /// Stops watching `id` without finalizing it.
    pub fn unwatch(&self, id: InstanceId) {
        self.entries.lock().retain(|entry| entry.id != id);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Finalizes every watched identity whose target is gone. Each identity is
    /// finalized at most once. Returns how many were finalized.
    pub fn sweep(&self, sink: &dyn Finalize) -> usize {
        let dead: Vec<InstanceId> = {
            let mut entries = self.entries.lock();
            let mut dead = Vec::new();
            entries.retain(|entry| {
                if entry.target.strong_count() == 0 {
                    dead.push(entry.id);
                    false
                } else {
                    true
                }
            });
            dead
        };
        for id in &dead {
            sink.finalize(*id);
        }
        dead.len()
    }
}
