#![forbid(unsafe_code)]

//! Runtime support for modalkit.
//!
//! This crate provides:
//! - [`reactive`]: subscriber lists, observables, and a typed event dispatcher
//! - [`scheduler`]: a host-driven virtual-time timer queue

pub mod reactive;
pub mod scheduler;

pub use reactive::{EventDispatcher, Observable, Subscribers, Subscription, TypedEvent};
pub use scheduler::{Scheduler, TimerId};
