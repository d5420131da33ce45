#![forbid(unsafe_code)]

//! Typed publish-subscribe keyed by event kind.
//!
//! Events are a tagged union; handlers register for one kind and receive the
//! full event. Matching is exhaustive at compile time rather than by name.
//!
//! # Example
//!
//! ```
//! use modalkit_runtime::reactive::{EventDispatcher, TypedEvent};
//!
//! #[derive(Debug)]
//! enum Door { Opened, Closed(u32) }
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum DoorKind { Opened, Closed }
//!
//! impl TypedEvent for Door {
//!     type Kind = DoorKind;
//!     fn kind(&self) -> DoorKind {
//!         match self {
//!             Door::Opened => DoorKind::Opened,
//!             Door::Closed(_) => DoorKind::Closed,
//!         }
//!     }
//! }
//!
//! let doors = EventDispatcher::<Door>::new();
//! let _sub = doors.on(DoorKind::Closed, |event| {
//!     assert!(matches!(event, Door::Closed(3)));
//! });
//! doors.emit(&Door::Opened);
//! doors.emit(&Door::Closed(3));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use modalkit_core::isolate::call_isolated;

use super::subscription::Subscription;

/// An event with a discriminating kind.
pub trait TypedEvent: 'static {
    type Kind: Copy + Eq + Hash + fmt::Debug + 'static;

    fn kind(&self) -> Self::Kind;
}

type Handler<E> = Rc<dyn Fn(&E)>;

struct Table<E: TypedEvent> {
    handlers: Vec<(u64, E::Kind, Handler<E>)>,
    next_id: u64,
}

/// Handlers grouped by event kind, run in registration order.
///
/// Same isolation and re-entrancy rules as
/// [`Subscribers`](super::Subscribers).
pub struct EventDispatcher<E: TypedEvent> {
    table: Rc<RefCell<Table<E>>>,
}

impl<E: TypedEvent> Clone for EventDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            table: Rc::clone(&self.table),
        }
    }
}

impl<E: TypedEvent> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: TypedEvent> EventDispatcher<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Rc::new(RefCell::new(Table {
                handlers: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Register `handler` for `kind`.
    pub fn on(&self, kind: E::Kind, handler: impl Fn(&E) + 'static) -> Subscription {
        let id = {
            let mut table = self.table.borrow_mut();
            let id = table.next_id;
            table.next_id += 1;
            table.handlers.push((id, kind, Rc::new(handler)));
            id
        };
        let weak = Rc::downgrade(&self.table);
        Subscription::new(id, move || {
            if let Some(table) = weak.upgrade() {
                table.borrow_mut().handlers.retain(|(hid, _, _)| *hid != id);
            }
        })
    }

    /// Remove a handler by subscription id. Returns whether it existed.
    pub fn off(&self, id: u64) -> bool {
        let mut table = self.table.borrow_mut();
        let before = table.handlers.len();
        table.handlers.retain(|(hid, _, _)| *hid != id);
        table.handlers.len() != before
    }

    /// Deliver `event` to every handler registered for its kind.
    pub fn emit(&self, event: &E) {
        let kind = event.kind();
        let matching: Vec<(u64, Handler<E>)> = self
            .table
            .borrow()
            .handlers
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(id, _, h)| (*id, Rc::clone(h)))
            .collect();
        for (id, handler) in matching {
            let live = self
                .table
                .borrow()
                .handlers
                .iter()
                .any(|(hid, _, _)| *hid == id);
            if live {
                call_isolated("event handler", || handler(event));
            }
        }
    }

    pub fn clear(&self) {
        self.table.borrow_mut().handlers.clear();
    }

    #[must_use]
    pub fn handler_count(&self, kind: E::Kind) -> usize {
        self.table
            .borrow()
            .handlers
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }
}

impl<E: TypedEvent> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.table.borrow().handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    enum Ping {
        A(u8),
        B,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum PingKind {
        A,
        B,
    }

    impl TypedEvent for Ping {
        type Kind = PingKind;
        fn kind(&self) -> PingKind {
            match self {
                Ping::A(_) => PingKind::A,
                Ping::B => PingKind::B,
            }
        }
    }

    #[test]
    fn routes_by_kind() {
        let d = EventDispatcher::<Ping>::new();
        let a_sum = Rc::new(Cell::new(0u32));
        let b_hits = Rc::new(Cell::new(0));
        let s = Rc::clone(&a_sum);
        let _a = d.on(PingKind::A, move |e| {
            if let Ping::A(n) = e {
                s.set(s.get() + u32::from(*n));
            }
        });
        let h = Rc::clone(&b_hits);
        let _b = d.on(PingKind::B, move |_| h.set(h.get() + 1));

        d.emit(&Ping::A(2));
        d.emit(&Ping::A(5));
        d.emit(&Ping::B);
        assert_eq!(a_sum.get(), 7);
        assert_eq!(b_hits.get(), 1);
    }

    #[test]
    fn off_removes_by_id() {
        let d = EventDispatcher::<Ping>::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = d.on(PingKind::B, move |_| h.set(h.get() + 1));
        let id = sub.id();
        sub.detach();
        assert_eq!(d.handler_count(PingKind::B), 1);
        assert!(d.off(id));
        assert!(!d.off(id));
        d.emit(&Ping::B);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn handler_panic_does_not_block_others() {
        let d = EventDispatcher::<Ping>::new();
        let hits = Rc::new(Cell::new(0));
        let _bad = d.on(PingKind::B, |_| panic!("handler bug"));
        let h = Rc::clone(&hits);
        let _good = d.on(PingKind::B, move |_| h.set(h.get() + 1));
        d.emit(&Ping::B);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn clear_removes_all_kinds() {
        let d = EventDispatcher::<Ping>::new();
        d.on(PingKind::A, |_| {}).detach();
        d.on(PingKind::B, |_| {}).detach();
        d.clear();
        assert_eq!(d.handler_count(PingKind::A), 0);
        assert_eq!(d.handler_count(PingKind::B), 0);
    }
}
