//! Minimal observer used by the registries to publish state changes

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Listeners<E> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener<E>)>>,
}

/// Fan-out of events to any number of listeners
///
/// Listeners run on the emitting thread, after the internal lock has been
/// released, so a listener may subscribe, unsubscribe or emit again.
pub struct EventEmitter<E> {
    listeners: Arc<Listeners<E>>,
}

impl<E: 'static> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Listeners {
                next_id: AtomicU64::new(0),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register a listener; it stays registered until the returned
    /// [`Subscription`] is dropped
    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .entries
            .lock()
            .push((id, Arc::new(listener)));

        let weak = Arc::downgrade(&self.listeners);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.entries.lock().retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    pub fn emit(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self
            .listeners
            .entries
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.entries.lock().len()
    }
}

impl<E: 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle keeping a listener registered
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Keep the listener registered for the lifetime of the emitter
    pub fn detach(mut self) {
        self.unsubscribe.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
