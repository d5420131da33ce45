#![forbid(unsafe_code)]

//! Version-tracked shared value with change notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::subscribers::Subscribers;
use super::subscription::Subscription;

struct Slot<T> {
    value: T,
    version: u64,
}

/// A shared value that notifies subscribers when it changes.
///
/// Clones share the value. Writes that leave the value equal are dropped
/// without a version bump or notification.
pub struct Observable<T> {
    slot: Rc<RefCell<Slot<T>>>,
    subscribers: Subscribers<T>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
            subscribers: self.subscribers.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot { value, version: 0 })),
            subscribers: Subscribers::new(),
        }
    }

    /// Snapshot of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.slot.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.borrow().value)
    }

    /// Number of changing writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.slot.borrow().version
    }

    /// Replace the value. Returns whether it changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut slot = self.slot.borrow_mut();
            if slot.value == value {
                return false;
            }
            slot.value = value.clone();
            slot.version += 1;
        }
        self.subscribers.notify(&value);
        true
    }

    /// Mutate a copy of the value in place, then [`set`](Self::set) it.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.get();
        f(&mut next);
        self.set(next)
    }

    /// Called with the new value after every change.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.subscribers.subscribe(callback)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("Observable")
            .field("value", &slot.value)
            .field("version", &slot.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn equal_writes_are_suppressed() {
        let obs = Observable::new(1);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = obs.subscribe(move |_| h.set(h.get() + 1));

        assert!(!obs.set(1));
        assert_eq!(obs.version(), 0);
        assert!(obs.set(2));
        assert_eq!(obs.version(), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn update_mutates_in_place() {
        let obs = Observable::new(vec![1, 2]);
        assert!(obs.update(|v| v.push(3)));
        assert_eq!(obs.get(), vec![1, 2, 3]);
        assert!(!obs.update(|_| {}));
        assert_eq!(obs.with(Vec::len), 3);
    }

    #[test]
    fn subscriber_sees_new_value_and_may_write_back() {
        let obs = Observable::new(0);
        let handle = obs.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = obs.subscribe(move |v| {
            s.borrow_mut().push(*v);
            if *v < 3 {
                handle.set(v + 1);
            }
        });
        obs.set(1);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert_eq!(obs.get(), 3);
    }

    #[test]
    fn clones_share_state() {
        let a = Observable::new("x".to_string());
        let b = a.clone();
        b.set("y".into());
        assert_eq!(a.get(), "y");
        assert_eq!(a.version(), 1);
    }
}
