//! Synchronous listener lists.
//!
//! Listeners run in registration order on the caller's thread. A listener
//! that panics is logged and skipped; delivery continues with the next one.

use log::warn;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Box<dyn FnMut(&T)>;

/// An ordered list of event listeners.
pub struct Listeners<T> {
    next_id: u64,
    entries: Vec<(ListenerId, Listener<T>)>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it is called after every earlier one.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&T) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver `event` to every listener.
    ///
    /// Returns the number of listeners that completed without panicking.
    pub fn notify(&mut self, event: &T) -> usize {
        let mut delivered = 0;
        for (id, listener) in self.entries.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    let reason = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    warn!("listener {:?} panicked: {}", id, reason);
                }
            }
        }
        delivered
    }
}
