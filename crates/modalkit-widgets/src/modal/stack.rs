#![forbid(unsafe_code)]

//! Ordered registry of open modals.
//!
//! Members are kept in open order (bottom to top). After every push or
//! removal each member is told its 1-based position and whether it is the
//! top-most, and stack events are emitted.
//!
//! # Invariants
//!
//! - The member at index `i` has `stack_order == i + 1`.
//! - Exactly the last member is top-most (none when empty).
//! - A member appears at most once; duplicate pushes are no-ops.
//! - A removed member is reset to order 0, not top-most.
//! - No borrow of the stack is held while members are updated or handlers
//!   run, so either may re-enter the stack.
//! - Positions are always read from the live member list. A push or removal
//!   made from inside a member update renumbers the whole stack itself; the
//!   interrupted renumber stops there.
//!
//! # Failure Modes
//!
//! - `remove()` of a non-member is a no-op.
//! - `by_order()` out of range returns `None`.
//! - `close_top_most()` on an empty stack does nothing.
//!
//! # Example
//!
//! ```ignore
//! let stack = ModalStack::new();
//! stack.push(a.clone());
//! stack.push(b.clone());
//! assert_eq!(stack.top_most(), Some(b));
//! stack.close_all(); // closes b, then a
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use modalkit_runtime::reactive::{EventDispatcher, Subscription, TypedEvent};

/// Z-index of the first stacked modal's overlay.
pub const BASE_MODAL_Z: u32 = 1000;

/// Z-index step between stacked modals.
pub const Z_INCREMENT: u32 = 10;

/// Overlay z-index for a stack position.
///
/// Order 0 (not yet stacked) yields one increment below the base.
#[inline]
pub const fn z_index_for(order: usize) -> u32 {
    if order == 0 {
        return BASE_MODAL_Z - Z_INCREMENT;
    }
    let steps = if order - 1 > (u32::MAX as usize) {
        u32::MAX
    } else {
        (order - 1) as u32
    };
    BASE_MODAL_Z.saturating_add(steps.saturating_mul(Z_INCREMENT))
}

/// A modal that can live in a [`ModalStack`].
///
/// Equality must be identity: two handles are equal iff they refer to the
/// same modal.
pub trait StackModal: Clone + PartialEq + 'static {
    /// Record the member's position. `order == 0` means "not stacked".
    fn set_stack_position(&self, order: usize, is_top_most: bool);

    /// Run the member's own close, with all of its side effects.
    fn close(&self);
}

/// Stack change notification.
#[derive(Debug, Clone)]
pub enum StackEvent<M> {
    /// A member was appended.
    Push(M),
    /// A member was removed.
    Pop(M),
    /// Members after the change, bottom to top.
    Change(Vec<M>),
}

/// Discriminant of [`StackEvent`], used to subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackEventKind {
    Push,
    Pop,
    Change,
}

impl<M: 'static> TypedEvent for StackEvent<M> {
    type Kind = StackEventKind;

    fn kind(&self) -> StackEventKind {
        match self {
            Self::Push(_) => StackEventKind::Push,
            Self::Pop(_) => StackEventKind::Pop,
            Self::Change(_) => StackEventKind::Change,
        }
    }
}

/// Shared handle to a stack of open modals.
pub struct ModalStack<M: StackModal> {
    members: Rc<RefCell<Vec<M>>>,
    /// Bumped on every membership change.
    generation: Rc<Cell<u64>>,
    events: EventDispatcher<StackEvent<M>>,
}

impl<M: StackModal> Clone for ModalStack<M> {
    fn clone(&self) -> Self {
        Self {
            members: Rc::clone(&self.members),
            generation: Rc::clone(&self.generation),
            events: self.events.clone(),
        }
    }
}

impl<M: StackModal> Default for ModalStack<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: StackModal> ModalStack<M> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self {
            members: Rc::new(RefCell::new(Vec::new())),
            generation: Rc::new(Cell::new(0)),
            events: EventDispatcher::new(),
        }
    }

    // --- Stack Operations ---

    /// Append `modal` unless already present.
    pub fn push(&self, modal: M) {
        let depth = {
            let mut members = self.members.borrow_mut();
            if members.contains(&modal) {
                return;
            }
            members.push(modal.clone());
            members.len()
        };
        let generation = self.bump();
        tracing::debug!(depth, "modal stack: push");
        self.renumber(generation);
        self.events.emit(&StackEvent::Push(modal));
        self.events.emit(&StackEvent::Change(self.all()));
    }

    /// Remove `modal` if present.
    pub fn remove(&self, modal: &M) {
        let depth = {
            let mut members = self.members.borrow_mut();
            let Some(idx) = members.iter().position(|m| m == modal) else {
                return;
            };
            members.remove(idx);
            members.len()
        };
        let generation = self.bump();
        tracing::debug!(depth, "modal stack: remove");
        modal.set_stack_position(0, false);
        self.renumber(generation);
        self.events.emit(&StackEvent::Pop(modal.clone()));
        self.events.emit(&StackEvent::Change(self.all()));
    }

    fn bump(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }

    /// Tell each live member its position, stopping early if a member update
    /// changed the stack (that change has renumbered everything already).
    fn renumber(&self, generation: u64) {
        let mut idx = 0;
        while self.generation.get() == generation {
            let (member, is_last) = {
                let members = self.members.borrow();
                let Some(member) = members.get(idx).cloned() else {
                    return;
                };
                (member, idx + 1 == members.len())
            };
            member.set_stack_position(idx + 1, is_last);
            idx += 1;
        }
    }

    /// Close every member top to bottom through each member's own close.
    pub fn close_all(&self) {
        let members = self.all();
        for member in members.iter().rev() {
            member.close();
        }
    }

    /// Close the top-most member, if any.
    pub fn close_top_most(&self) {
        if let Some(top) = self.top_most() {
            top.close();
        }
    }

    // --- State Queries ---

    /// Number of open members.
    #[inline]
    pub fn count(&self) -> usize {
        self.members.borrow().len()
    }

    /// Whether no modal is open.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// Copy of the members, bottom to top.
    pub fn all(&self) -> Vec<M> {
        self.members.borrow().clone()
    }

    /// The most recently opened member still in the stack.
    pub fn top_most(&self) -> Option<M> {
        self.members.borrow().last().cloned()
    }

    /// Member at 1-based `order`.
    pub fn by_order(&self, order: usize) -> Option<M> {
        let idx = order.checked_sub(1)?;
        self.members.borrow().get(idx).cloned()
    }

    /// Whether `modal` is currently stacked.
    pub fn contains(&self, modal: &M) -> bool {
        self.members.borrow().contains(modal)
    }

    // --- Events ---

    /// Subscribe to one kind of stack event.
    pub fn on(
        &self,
        kind: StackEventKind,
        handler: impl Fn(&StackEvent<M>) + 'static,
    ) -> Subscription {
        self.events.on(kind, handler)
    }

    /// Remove a handler by subscription id.
    pub fn off(&self, id: u64) -> bool {
        self.events.off(id)
    }
}

impl<M: StackModal + fmt::Debug> fmt::Debug for ModalStack<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalStack")
            .field("members", &self.members.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Minimal member: records its position and removes itself on close.
    #[derive(Clone)]
    struct Member {
        name: &'static str,
        position: Rc<Cell<(usize, bool)>>,
        stack: Rc<RefCell<Option<ModalStack<Member>>>>,
        closes: Rc<Cell<u32>>,
        /// Close itself as soon as another member covers it.
        leave_when_covered: Rc<Cell<bool>>,
    }

    impl PartialEq for Member {
        fn eq(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.position, &other.position)
        }
    }

    impl fmt::Debug for Member {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name)
        }
    }

    impl StackModal for Member {
        fn set_stack_position(&self, order: usize, is_top_most: bool) {
            self.position.set((order, is_top_most));
            if self.leave_when_covered.get() && order > 0 && !is_top_most {
                self.close();
            }
        }

        fn close(&self) {
            self.closes.set(self.closes.get() + 1);
            let stack = self.stack.borrow().clone();
            if let Some(stack) = stack {
                stack.remove(self);
            }
        }
    }

    fn member(name: &'static str, stack: &ModalStack<Member>) -> Member {
        Member {
            name,
            position: Rc::new(Cell::new((0, false))),
            stack: Rc::new(RefCell::new(Some(stack.clone()))),
            closes: Rc::new(Cell::new(0)),
            leave_when_covered: Rc::new(Cell::new(false)),
        }
    }

    #[test]
    fn z_index_derivation() {
        assert_eq!(z_index_for(1), 1000);
        assert_eq!(z_index_for(2), 1010);
        assert_eq!(z_index_for(5), 1040);
        assert_eq!(z_index_for(0), 990);
    }

    #[test]
    fn push_assigns_order_and_top_most() {
        let stack = ModalStack::new();
        let a = member("a", &stack);
        let b = member("b", &stack);
        stack.push(a.clone());
        stack.push(b.clone());
        assert_eq!(a.position.get(), (1, false));
        assert_eq!(b.position.get(), (2, true));
        assert_eq!(stack.top_most(), Some(b.clone()));
        assert_eq!(stack.by_order(1), Some(a));
        assert_eq!(stack.by_order(3), None);
        assert_eq!(stack.by_order(0), None);
    }

    #[test]
    fn duplicate_push_and_foreign_remove_are_noops() {
        let stack = ModalStack::new();
        let a = member("a", &stack);
        let stranger = member("x", &stack);
        let changes = Rc::new(Cell::new(0));
        let c = Rc::clone(&changes);
        let _sub = stack.on(StackEventKind::Change, move |_| c.set(c.get() + 1));

        stack.push(a.clone());
        stack.push(a.clone());
        stack.remove(&stranger);
        assert_eq!(stack.count(), 1);
        assert_eq!(changes.get(), 1);
    }

    #[test]
    fn remove_from_middle_renumbers() {
        let stack = ModalStack::new();
        let (a, b, c) = (member("a", &stack), member("b", &stack), member("c", &stack));
        for m in [&a, &b, &c] {
            stack.push(m.clone());
        }
        stack.remove(&b);
        assert_eq!(a.position.get(), (1, false));
        assert_eq!(c.position.get(), (2, true));
        assert_eq!(b.position.get(), (0, false));
        assert!(!stack.contains(&b));
    }

    #[test]
    fn events_fire_in_order_with_copies() {
        let stack = ModalStack::new();
        let a = member("a", &stack);
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in [StackEventKind::Push, StackEventKind::Pop, StackEventKind::Change] {
            let l = Rc::clone(&log);
            stack
                .on(kind, move |event| {
                    l.borrow_mut().push(match event {
                        StackEvent::Push(m) => format!("push {}", m.name),
                        StackEvent::Pop(m) => format!("pop {}", m.name),
                        StackEvent::Change(all) => format!("change {}", all.len()),
                    });
                })
                .detach();
        }
        stack.push(a.clone());
        stack.remove(&a);
        assert_eq!(
            *log.borrow(),
            vec!["push a", "change 1", "pop a", "change 0"]
        );
    }

    #[test]
    fn off_detaches_handler() {
        let stack = ModalStack::<Member>::new();
        let a = member("a", &stack);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = stack.on(StackEventKind::Push, move |_| h.set(h.get() + 1));
        let id = sub.id();
        sub.detach();
        assert!(stack.off(id));
        stack.push(a);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn close_all_runs_top_to_bottom() {
        let stack = ModalStack::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let members: Vec<Member> = ["a", "b", "c"].iter().map(|n| member(n, &stack)).collect();
        for m in &members {
            stack.push(m.clone());
        }
        let o = Rc::clone(&order);
        let _sub = stack.on(StackEventKind::Pop, move |event| {
            if let StackEvent::Pop(m) = event {
                o.borrow_mut().push(m.name);
            }
        });
        stack.close_all();
        assert!(stack.is_empty());
        assert_eq!(*order.borrow(), vec!["c", "b", "a"]);
        assert!(members.iter().all(|m| m.closes.get() == 1));
    }

    #[test]
    fn close_top_most_only_closes_one() {
        let stack = ModalStack::new();
        let a = member("a", &stack);
        let b = member("b", &stack);
        stack.push(a.clone());
        stack.push(b.clone());
        stack.close_top_most();
        assert_eq!(b.closes.get(), 1);
        assert_eq!(a.closes.get(), 0);
        assert_eq!(a.position.get(), (1, true));

        let empty = ModalStack::<Member>::new();
        empty.close_top_most();
    }

    #[test]
    fn push_remove_round_trip_restores_count() {
        let stack = ModalStack::new();
        let base = member("base", &stack);
        stack.push(base.clone());
        let before = stack.count();
        let extra = member("extra", &stack);
        stack.push(extra.clone());
        stack.remove(&extra);
        assert_eq!(stack.count(), before);
        assert_eq!(stack.all(), vec![base]);
    }

    fn assert_positions_match(stack: &ModalStack<Member>) {
        let all = stack.all();
        for (idx, m) in all.iter().enumerate() {
            assert_eq!(m.position.get(), (idx + 1, idx + 1 == all.len()), "{m:?}");
        }
    }

    #[test]
    fn member_leaving_during_push_keeps_live_positions() {
        let stack = ModalStack::new();
        let a = member("a", &stack);
        let b = member("b", &stack);
        a.leave_when_covered.set(true);
        stack.push(a.clone());
        stack.push(b.clone());

        assert_eq!(stack.all(), vec![b.clone()]);
        assert_eq!(a.position.get(), (0, false));
        assert_eq!(b.position.get(), (1, true));
        assert_positions_match(&stack);
    }

    #[test]
    fn member_leaving_during_remove_keeps_live_positions() {
        let stack = ModalStack::new();
        let (a, b, c, d) = (
            member("a", &stack),
            member("b", &stack),
            member("c", &stack),
            member("d", &stack),
        );
        for m in [&a, &b, &c, &d] {
            stack.push(m.clone());
        }
        // `c` leaves on the next renumber that still finds it covered.
        c.leave_when_covered.set(true);
        stack.remove(&a);

        assert_eq!(stack.all(), vec![b.clone(), d.clone()]);
        assert_eq!(c.position.get(), (0, false));
        assert_positions_match(&stack);
    }

    #[test]
    fn change_event_carries_live_members() {
        let stack = ModalStack::new();
        let a = member("a", &stack);
        let b = member("b", &stack);
        a.leave_when_covered.set(true);
        stack.push(a.clone());

        let last = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&last);
        let _sub = stack.on(StackEventKind::Change, move |event| {
            if let StackEvent::Change(all) = event {
                *l.borrow_mut() = all.iter().map(|m| m.name).collect();
            }
        });
        stack.push(b);
        assert_eq!(*last.borrow(), vec!["b"]);
    }
}
