#![forbid(unsafe_code)]

//! Core primitives for modalkit.
//!
//! This crate provides:
//! - [`dom`]: a headless document model (elements, focus, event dispatch)
//! - [`focus`]: focusable queries and focus save/restore
//! - [`keyboard`]: key events, classification, and the Escape handler factory
//! - [`id`]: monotonic id generation
//! - [`isolate`]: panic isolation for caller-supplied callbacks

pub mod dom;
pub mod error;
pub mod focus;
pub mod id;
pub mod isolate;
pub mod keyboard;

pub use dom::{Document, DomEvent, Element, EventKind, FocusOptions, MouseEvent};
pub use error::DomError;
pub use id::{IdGenerator, ModalIds};
pub use keyboard::{KeyboardEvent, Modifiers};
