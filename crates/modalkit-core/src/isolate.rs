#![forbid(unsafe_code)]

//! Panic isolation for caller-supplied callbacks.
//!
//! Listener and subscriber callbacks come from arbitrary host code. A panic
//! in one of them is caught, logged, and swallowed so the remaining
//! callbacks still run and the caller's invariants stay intact.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run `f`, catching and logging a panic.
///
/// Returns `true` when `f` completed normally.
pub fn call_isolated<F: FnOnce()>(context: &str, f: F) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            tracing::error!(
                context,
                panic = %panic_message(payload.as_ref()),
                "callback panicked; remaining callbacks still run"
            );
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}
