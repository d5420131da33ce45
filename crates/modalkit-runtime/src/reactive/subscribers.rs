#![forbid(unsafe_code)]

//! Ordered callback list with isolated notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use modalkit_core::isolate::call_isolated;

use super::subscription::Subscription;

type Callback<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    callbacks: Vec<(u64, Callback<T>)>,
    next_id: u64,
}

impl<T> Registry<T> {
    fn is_registered(&self, id: u64) -> bool {
        self.callbacks.iter().any(|(cid, _)| *cid == id)
    }
}

/// Callbacks notified in registration order.
///
/// # Invariants
///
/// 1. No borrow is held while a callback runs; callbacks may subscribe,
///    unsubscribe, or trigger a nested `notify`.
/// 2. A callback removed during a notification cycle is skipped for the rest
///    of that cycle. Callbacks added during a cycle first run on the next one.
/// 3. A panicking callback is logged and skipped; the rest still run.
pub struct Subscribers<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for Subscribers<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<T: 'static> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Subscribers<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                callbacks: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Register `callback`. Dropping the returned guard unregisters it.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id;
            reg.next_id += 1;
            reg.callbacks.push((id, Rc::new(callback)));
            id
        };
        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription::new(id, move || {
            if let Some(registry) = weak.upgrade() {
                registry.borrow_mut().callbacks.retain(|(cid, _)| *cid != id);
            }
        })
    }

    /// Remove a callback by id. Returns whether it was registered.
    pub fn remove(&self, id: u64) -> bool {
        let mut reg = self.registry.borrow_mut();
        let before = reg.callbacks.len();
        reg.callbacks.retain(|(cid, _)| *cid != id);
        reg.callbacks.len() != before
    }

    /// Call every registered callback with `value`.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<(u64, Callback<T>)> = self.registry.borrow().callbacks.clone();
        for (id, callback) in snapshot {
            if !self.registry.borrow().is_registered(id) {
                continue;
            }
            call_isolated("subscriber", || callback(value));
        }
    }

    pub fn clear(&self) {
        self.registry.borrow_mut().callbacks.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.borrow().callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.registry.borrow().callbacks.len())
            .finish()
    }
}
