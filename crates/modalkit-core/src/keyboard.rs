#![forbid(unsafe_code)]

//! Keyboard events, key classification, and the Escape handler factory.
//!
//! Classification accepts both the modern `key` string and the legacy
//! numeric `key_code`, so events synthesized by older hosts still match.
//!
//! # Example
//!
//! ```
//! use modalkit_core::keyboard::{KeyboardEvent, Modifiers, is_escape_key, is_tab_key};
//!
//! assert!(is_escape_key(&KeyboardEvent::new("Esc")));
//! assert!(is_tab_key(&KeyboardEvent::from_key_code(9)));
//!
//! let back_tab = KeyboardEvent::new("Tab").with_shift();
//! assert!(back_tab.modifiers().contains(Modifiers::SHIFT));
//! ```

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::dom::Element;
use crate::dom::event::EventFlags;

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// Legacy `keyCode` values the classifiers recognise.
pub mod key_codes {
    pub const TAB: u32 = 9;
    pub const ENTER: u32 = 13;
    pub const ESCAPE: u32 = 27;
    pub const SPACE: u32 = 32;
}

/// A key press.
#[derive(Debug)]
pub struct KeyboardEvent {
    key: String,
    key_code: u32,
    modifiers: Modifiers,
    target: Option<Element>,
    flags: EventFlags,
}

impl KeyboardEvent {
    /// Key press identified by its `key` string (`"Escape"`, `"Tab"`, `"a"`).
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            key_code: 0,
            modifiers: Modifiers::empty(),
            target: None,
            flags: EventFlags::default(),
        }
    }

    /// Key press identified only by a legacy `keyCode`.
    pub fn from_key_code(key_code: u32) -> Self {
        Self::new("").with_key_code(key_code)
    }

    #[must_use]
    pub fn with_key_code(mut self, key_code: u32) -> Self {
        self.key_code = key_code;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_shift(self) -> Self {
        let modifiers = self.modifiers | Modifiers::SHIFT;
        self.with_modifiers(modifiers)
    }

    #[must_use]
    pub fn with_target(mut self, target: &Element) -> Self {
        self.target = Some(target.clone());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Legacy numeric code, 0 when unknown.
    pub fn key_code(&self) -> u32 {
        self.key_code
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[inline]
    pub fn shift_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    pub fn target(&self) -> Option<&Element> {
        self.target.as_ref()
    }

    pub fn prevent_default(&self) {
        self.flags.prevent_default();
    }

    pub fn default_prevented(&self) -> bool {
        self.flags.default_prevented()
    }

    pub fn stop_propagation(&self) {
        self.flags.stop_propagation();
    }

    pub fn propagation_stopped(&self) -> bool {
        self.flags.propagation_stopped()
    }

    /// Classify the key.
    pub fn code(&self) -> KeyCode {
        KeyCode::of(self)
    }
}

/// Keys the modal core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Tab,
    Enter,
    Space,
    Other,
}

impl KeyCode {
    fn of(event: &KeyboardEvent) -> Self {
        match (event.key(), event.key_code()) {
            ("Escape" | "Esc", _) | (_, key_codes::ESCAPE) => Self::Escape,
            ("Tab", _) | (_, key_codes::TAB) => Self::Tab,
            ("Enter", _) | (_, key_codes::ENTER) => Self::Enter,
            (" " | "Spacebar", _) | (_, key_codes::SPACE) => Self::Space,
            _ => Self::Other,
        }
    }
}

#[inline]
pub fn is_escape_key(event: &KeyboardEvent) -> bool {
    event.code() == KeyCode::Escape
}

#[inline]
pub fn is_tab_key(event: &KeyboardEvent) -> bool {
    event.code() == KeyCode::Tab
}

#[inline]
pub fn is_enter_key(event: &KeyboardEvent) -> bool {
    event.code() == KeyCode::Enter
}

#[inline]
pub fn is_space_key(event: &KeyboardEvent) -> bool {
    event.code() == KeyCode::Space
}

/// Prevent the default action and stop propagation.
pub fn stop_event(event: &KeyboardEvent) {
    event.prevent_default();
    event.stop_propagation();
}

// --- Escape handler factory ---

/// Inputs for [`escape_key_handler`].
///
/// Every field is a closure so the handler sees live values at key time
/// rather than a snapshot from when it was built.
#[derive(Clone)]
pub struct EscapeKeyOptions {
    /// Whether an unprevented Escape should close.
    pub close_on_escape: Rc<dyn Fn() -> bool>,
    /// Called first on Escape; may call `prevent_default` to veto closing.
    pub on_escape_key_down: Option<Rc<dyn Fn(&KeyboardEvent)>>,
    pub on_close: Rc<dyn Fn()>,
    /// Live top-most check. Non-top-most handlers ignore every key.
    pub is_top_most: Rc<dyn Fn() -> bool>,
}

impl fmt::Debug for EscapeKeyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EscapeKeyOptions")
            .field("close_on_escape", &(self.close_on_escape)())
            .field("has_on_escape_key_down", &self.on_escape_key_down.is_some())
            .finish_non_exhaustive()
    }
}

/// Build a keydown handler that closes on Escape, gated by top-most.
///
/// Order on Escape: `on_escape_key_down`, then (if closing is enabled and
/// the event was not prevented) prevent + stop the event and `on_close`.
pub fn escape_key_handler(options: EscapeKeyOptions) -> impl Fn(&KeyboardEvent) + 'static {
    move |event: &KeyboardEvent| {
        if !(options.is_top_most)() || !is_escape_key(event) {
            return;
        }
        if let Some(callback) = &options.on_escape_key_down {
            callback(event);
        }
        if (options.close_on_escape)() && !event.default_prevented() {
            stop_event(event);
            (options.on_close)();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn classifies_by_key_and_legacy_code() {
        assert!(is_escape_key(&KeyboardEvent::new("Escape")));
        assert!(is_escape_key(&KeyboardEvent::new("Esc")));
        assert!(is_escape_key(&KeyboardEvent::from_key_code(27)));
        assert!(is_tab_key(&KeyboardEvent::new("Tab")));
        assert!(is_enter_key(&KeyboardEvent::from_key_code(13)));
        assert!(is_space_key(&KeyboardEvent::new(" ")));
        assert!(is_space_key(&KeyboardEvent::new("Spacebar")));
        assert_eq!(KeyboardEvent::new("a").code(), KeyCode::Other);
    }

    #[test]
    fn shift_is_a_modifier() {
        let event = KeyboardEvent::new("Tab").with_shift();
        assert!(event.shift_key());
        assert!(!KeyboardEvent::new("Tab").shift_key());
    }

    struct Harness {
        closes: Rc<Cell<u32>>,
        escapes: Rc<Cell<u32>>,
        top_most: Rc<Cell<bool>>,
    }

    fn harness(close_on_escape: bool, veto: bool) -> (Harness, impl Fn(&KeyboardEvent)) {
        let h = Harness {
            closes: Rc::new(Cell::new(0)),
            escapes: Rc::new(Cell::new(0)),
            top_most: Rc::new(Cell::new(true)),
        };
        let closes = Rc::clone(&h.closes);
        let escapes = Rc::clone(&h.escapes);
        let top_most = Rc::clone(&h.top_most);
        let handler = escape_key_handler(EscapeKeyOptions {
            close_on_escape: Rc::new(move || close_on_escape),
            on_escape_key_down: Some(Rc::new(move |event: &KeyboardEvent| {
                escapes.set(escapes.get() + 1);
                if veto {
                    event.prevent_default();
                }
            })),
            on_close: Rc::new(move || closes.set(closes.get() + 1)),
            is_top_most: Rc::new(move || top_most.get()),
        });
        (h, handler)
    }

    #[test]
    fn escape_closes_and_consumes_event() {
        let (h, handler) = harness(true, false);
        let event = KeyboardEvent::new("Escape");
        handler(&event);
        assert_eq!(h.escapes.get(), 1);
        assert_eq!(h.closes.get(), 1);
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
    }

    #[test]
    fn callback_can_veto_close() {
        let (h, handler) = harness(true, true);
        handler(&KeyboardEvent::new("Escape"));
        assert_eq!(h.escapes.get(), 1);
        assert_eq!(h.closes.get(), 0);
    }

    #[test]
    fn disabled_close_still_reports_escape() {
        let (h, handler) = harness(false, false);
        let event = KeyboardEvent::new("Escape");
        handler(&event);
        assert_eq!(h.escapes.get(), 1);
        assert_eq!(h.closes.get(), 0);
        assert!(!event.default_prevented());
    }

    #[test]
    fn non_top_most_ignores_escape() {
        let (h, handler) = harness(true, false);
        h.top_most.set(false);
        handler(&KeyboardEvent::new("Escape"));
        assert_eq!(h.escapes.get(), 0);
        assert_eq!(h.closes.get(), 0);
    }

    #[test]
    fn other_keys_pass_through() {
        let (h, handler) = harness(true, false);
        handler(&KeyboardEvent::new("Enter"));
        assert_eq!(h.escapes.get(), 0);
    }
}
