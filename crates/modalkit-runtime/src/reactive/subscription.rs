#![forbid(unsafe_code)]

//! RAII subscription guard.

use std::fmt;

/// Keeps a callback registered while alive.
///
/// Dropping the guard unsubscribes. Call [`detach`](Self::detach) to keep the
/// callback for the lifetime of its source instead.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(id: u64, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Registration id, usable with `off`-style removal on the source.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unsubscribe now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the callback registered after this guard is gone.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting() -> (Rc<Cell<u32>>, Subscription) {
        let cancelled = Rc::new(Cell::new(0));
        let c = Rc::clone(&cancelled);
        (cancelled, Subscription::new(7, move || c.set(c.get() + 1)))
    }

    #[test]
    fn drop_cancels_once() {
        let (cancelled, sub) = counting();
        assert_eq!(sub.id(), 7);
        drop(sub);
        assert_eq!(cancelled.get(), 1);
    }

    #[test]
    fn explicit_unsubscribe_cancels_once() {
        let (cancelled, sub) = counting();
        sub.unsubscribe();
        assert_eq!(cancelled.get(), 1);
    }

    #[test]
    fn detach_never_cancels() {
        let (cancelled, sub) = counting();
        sub.detach();
        assert_eq!(cancelled.get(), 0);
    }
}
