#![forbid(unsafe_code)]

//! Headless document model.
//!
//! The modal core never touches a real browser. It operates on this model,
//! which a host adapter keeps in sync with whatever it actually renders (or
//! which tests drive directly).
//!
//! The model covers exactly what the modal core consumes:
//!
//! - an element tree with attributes and inline styles,
//! - an active element with programmatic focus and `focusin` dispatch,
//! - document-level capture listeners and element-level bubble listeners,
//! - a default action for Tab (sequential focus navigation),
//! - a scroll offset and a viewport for scrollbar measurement.
//!
//! # Invariants
//!
//! 1. An element appears under at most one parent; `append_child` moves it.
//! 2. `Element` equality is identity, never structural.
//! 3. No `RefCell` borrow is held while a listener runs, so listeners may
//!    mutate the tree, move focus, or dispatch further events.

mod document;
mod element;
pub(crate) mod event;

pub use document::{Document, ScrollPosition, Viewport};
pub use element::Element;
pub use event::{
    DomEvent, EventKind, FocusEvent, FocusOptions, Listener, ListenerId, MouseButton, MouseEvent,
};
