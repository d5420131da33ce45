#![forbid(unsafe_code)]

//! Reference-counted body scroll lock.
//!
//! Only the 0 → 1 transition touches `<body>` styles, and only 1 → 0
//! restores them, so nested modals can lock and unlock independently.
//!
//! # Invariants
//!
//! 1. `is_locked() == (count() > 0)`.
//! 2. Saved styles are captured once per locked period and restored exactly
//!    once, by the final `unlock` or by `reset`.
//! 3. `unlock` at zero is a no-op.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use modalkit_core::dom::{Document, ScrollPosition};

/// `<body>` styles captured when the lock engages.
#[derive(Debug, Clone, Default)]
struct SavedBody {
    overflow: String,
    padding_right: String,
    position: String,
    top: String,
    left: String,
    width: String,
    scroll: ScrollPosition,
}

#[derive(Debug, Default)]
struct LockState {
    count: usize,
    saved: Option<SavedBody>,
}

/// Shared scroll lock for one document.
///
/// Clones share the same counter.
#[derive(Clone)]
pub struct ScrollLock {
    document: Document,
    fixed_body: bool,
    state: Rc<RefCell<LockState>>,
}

impl ScrollLock {
    pub fn new(document: &Document) -> Self {
        Self {
            document: document.clone(),
            fixed_body: false,
            state: Rc::new(RefCell::new(LockState::default())),
        }
    }

    /// Also pin `<body>` with `position: fixed` while locked.
    ///
    /// Touch browsers that ignore `overflow: hidden` on the document need
    /// this; the scroll offset is restored on release.
    #[must_use]
    pub fn with_fixed_body(mut self, enabled: bool) -> Self {
        self.fixed_body = enabled;
        self
    }

    /// Take one reference; the first one locks `<body>`.
    pub fn lock(&self) {
        let mut state = self.state.borrow_mut();
        state.count += 1;
        if state.count == 1 {
            state.saved = Some(self.engage());
            tracing::debug!("scroll lock: engaged");
        }
    }

    /// Drop one reference; the last one restores `<body>`. No-op at zero.
    pub fn unlock(&self) {
        let mut state = self.state.borrow_mut();
        match state.count {
            0 => {}
            1 => {
                state.count = 0;
                if let Some(saved) = state.saved.take() {
                    self.release(saved);
                }
                tracing::debug!("scroll lock: released");
            }
            _ => state.count -= 1,
        }
    }

    /// Whether any reference is held.
    pub fn is_locked(&self) -> bool {
        self.count() > 0
    }

    /// Number of held references.
    pub fn count(&self) -> usize {
        self.state.borrow().count
    }

    /// Restore body styles and zero the counter regardless of depth.
    pub fn reset(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(saved) = state.saved.take() {
            self.release(saved);
        }
        if state.count > 0 {
            tracing::debug!(depth = state.count, "scroll lock: reset");
        }
        state.count = 0;
    }

    fn engage(&self) -> SavedBody {
        let body = self.document.body();
        let saved = SavedBody {
            overflow: body.style("overflow"),
            padding_right: body.style("padding-right"),
            position: body.style("position"),
            top: body.style("top"),
            left: body.style("left"),
            width: body.style("width"),
            scroll: self.document.scroll_position(),
        };

        body.set_style("overflow", "hidden");
        let viewport = self.document.viewport();
        let scrollbar = viewport.scrollbar_width();
        if viewport.has_scrollbar() && scrollbar > 0 {
            let padded = parse_px(&saved.padding_right) + f64::from(scrollbar);
            body.set_style("padding-right", format!("{padded}px"));
        }

        if self.fixed_body {
            body.set_style("position", "fixed");
            body.set_style("top", negated_px(saved.scroll.y));
            body.set_style("left", negated_px(saved.scroll.x));
            body.set_style("width", "100%");
        }
        saved
    }

    fn release(&self, saved: SavedBody) {
        let body = self.document.body();
        body.set_style("overflow", saved.overflow);
        body.set_style("padding-right", saved.padding_right);
        if self.fixed_body {
            body.set_style("position", saved.position);
            body.set_style("top", saved.top);
            body.set_style("left", saved.left);
            body.set_style("width", saved.width);
            self.document.scroll_to(saved.scroll.x, saved.scroll.y);
        }
    }
}

impl fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLock")
            .field("count", &self.state.borrow().count)
            .field("fixed_body", &self.fixed_body)
            .finish()
    }
}

/// Leading number of a CSS pixel length; 0 when absent or unparsable.
fn parse_px(value: &str) -> f64 {
    let value = value.trim();
    value
        .strip_suffix("px")
        .unwrap_or(value)
        .trim()
        .parse()
        .unwrap_or(0.0)
}

fn negated_px(offset: f64) -> String {
    if offset == 0.0 {
        "0px".to_owned()
    } else {
        format!("{}px", -offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modalkit_core::dom::Viewport;

    #[test]
    fn nested_locks_restore_once() {
        let doc = Document::new();
        doc.body().set_style("overflow", "scroll");
        let lock = ScrollLock::new(&doc);

        lock.lock();
        lock.lock();
        assert_eq!(lock.count(), 2);
        assert_eq!(doc.body().style("overflow"), "hidden");

        lock.unlock();
        assert!(lock.is_locked());
        assert_eq!(doc.body().style("overflow"), "hidden");

        lock.unlock();
        assert!(!lock.is_locked());
        assert_eq!(doc.body().style("overflow"), "scroll");
    }

    #[test]
    fn unlock_at_zero_is_noop() {
        let doc = Document::new();
        let lock = ScrollLock::new(&doc);
        lock.unlock();
        assert_eq!(lock.count(), 0);
        lock.lock();
        assert_eq!(lock.count(), 1);
    }

    #[test]
    fn pads_by_scrollbar_width() {
        let doc = Document::new();
        doc.set_viewport(Viewport::new(1024, 1009));
        doc.body().set_style("padding-right", "4px");
        let lock = ScrollLock::new(&doc);

        lock.lock();
        assert_eq!(doc.body().style("padding-right"), "19px");
        lock.unlock();
        assert_eq!(doc.body().style("padding-right"), "4px");
    }

    #[test]
    fn no_padding_without_scrollbar() {
        let doc = Document::new();
        let lock = ScrollLock::new(&doc);
        lock.lock();
        assert_eq!(doc.body().style("padding-right"), "");
    }

    #[test]
    fn reset_restores_regardless_of_depth() {
        let doc = Document::new();
        let lock = ScrollLock::new(&doc);
        lock.lock();
        lock.lock();
        lock.lock();
        lock.reset();
        assert_eq!(lock.count(), 0);
        assert_eq!(doc.body().style("overflow"), "");
        lock.reset();
    }

    #[test]
    fn clones_share_the_counter() {
        let doc = Document::new();
        let a = ScrollLock::new(&doc);
        let b = a.clone();
        a.lock();
        assert!(b.is_locked());
        b.unlock();
        assert!(!a.is_locked());
    }

    #[test]
    fn fixed_body_pins_and_scrolls_back() {
        let doc = Document::new();
        doc.scroll_to(0.0, 240.0);
        let lock = ScrollLock::new(&doc).with_fixed_body(true);

        lock.lock();
        let body = doc.body();
        assert_eq!(body.style("position"), "fixed");
        assert_eq!(body.style("top"), "-240px");
        assert_eq!(body.style("left"), "0px");
        assert_eq!(body.style("width"), "100%");

        doc.scroll_to(0.0, 0.0);
        lock.unlock();
        assert_eq!(body.style("position"), "");
        assert_eq!(body.style("top"), "");
        assert_eq!(doc.scroll_position(), ScrollPosition::new(0.0, 240.0));
    }

    #[test]
    fn px_parsing() {
        assert_eq!(parse_px("12px"), 12.0);
        assert_eq!(parse_px(" 3.5px "), 3.5);
        assert_eq!(parse_px(""), 0.0);
        assert_eq!(parse_px("auto"), 0.0);
    }
}
