use sketch_common::Size;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener = Box<dyn FnMut(Size)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
    /// Ids unsubscribed while their listener was taken out for `emit`.
    removed: Vec<u64>,
    emitting: u32,
}

impl Listeners {
    /// Returns the listener so the caller can drop it after releasing the borrow.
    fn remove(&mut self, id: u64) -> Option<Listener> {
        match self.entries.iter().position(|(entry, _)| *entry == id) {
            Some(index) => Some(self.entries.remove(index).1),
            None => {
                if self.emitting > 0 {
                    self.removed.push(id);
                }
                None
            }
        }
    }
}

/// Single-threaded resize notifications from the host window.
///
/// Listeners run synchronously, in subscription order, on the emitting
/// thread. A listener may subscribe or unsubscribe while being notified.
#[derive(Clone, Default)]
pub struct ResizeEvents {
    inner: Rc<RefCell<Listeners>>,
}

impl ResizeEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. It stays registered until the returned handle is
    /// unsubscribed or dropped.
    pub fn subscribe(&self, listener: impl FnMut(Size) + 'static) -> ResizeSubscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, Box::new(listener)));
        tracing::debug!(id, "resize listener subscribed");
        ResizeSubscription {
            id,
            listeners: Rc::downgrade(&self.inner),
            active: true,
        }
    }

    /// Notify every current listener of the new size.
    pub fn emit(&self, size: Size) {
        let mut taken: Vec<(u64, Listener)> = {
            let mut inner = self.inner.borrow_mut();
            inner.emitting += 1;
            std::mem::take(&mut inner.entries)
        };

        for (id, listener) in taken.iter_mut() {
            if self.inner.borrow().removed.contains(id) {
                continue;
            }
            listener(size);
        }

        let gone: Vec<(u64, Listener)> = {
            let mut inner = self.inner.borrow_mut();
            inner.emitting -= 1;
            let removed = std::mem::take(&mut inner.removed);
            let (mut kept, gone): (Vec<_>, Vec<_>) = taken
                .into_iter()
                .partition(|(id, _)| !removed.contains(id));
            // Listeners subscribed during the callbacks go after the existing ones.
            kept.append(&mut inner.entries);
            inner.entries = kept;
            if inner.emitting > 0 {
                inner.removed = removed;
            }
            gone
        };
        drop(gone);
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

/// Handle returned by [`ResizeEvents::subscribe`].
///
/// Dropping the handle unsubscribes. Keep it alive for as long as the
/// listener should run.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct ResizeSubscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
    active: bool,
}

impl ResizeSubscription {
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    pub fn is_active(&self) -> bool {
        self.active && self.listeners.strong_count() > 0
    }

    fn detach(&mut self) {
        if !std::mem::replace(&mut self.active, false) {
            return;
        }
        if let Some(listeners) = self.listeners.upgrade() {
            let listener = listeners.borrow_mut().remove(self.id);
            drop(listener);
            tracing::debug!(id = self.id, "resize listener unsubscribed");
        }
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for ResizeSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeSubscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
