#![forbid(unsafe_code)]

//! Change notification primitives.
//!
//! - [`Subscribers`]: an ordered callback list with panic isolation.
//! - [`Observable`]: a shared, version-tracked value built on `Subscribers`.
//! - [`EventDispatcher`]: typed pub-sub keyed by a [`TypedEvent`]'s kind.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//!
//! # Architecture
//!
//! Everything is single-threaded (`Rc<RefCell<..>>`). Subscription guards
//! hold a `Weak` to their registry, so a guard that outlives its source is
//! harmless.
//!
//! # Invariants
//!
//! 1. Callbacks run in registration order.
//! 2. No `RefCell` borrow is held while a callback runs.
//! 3. A panicking callback is caught and logged with `tracing::error!`; the
//!    remaining callbacks still run.
//! 4. `Observable` writes that leave the value equal are no-ops (no version
//!    bump, no notification).

pub mod dispatcher;
pub mod observable;
pub mod subscribers;
pub mod subscription;

pub use dispatcher::{EventDispatcher, TypedEvent};
pub use observable::Observable;
pub use subscribers::Subscribers;
pub use subscription::Subscription;
