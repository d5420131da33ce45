#![forbid(unsafe_code)]

//! Event types dispatched through the document model.

use std::cell::Cell;
use std::rc::Rc;

use crate::dom::Element;
use crate::keyboard::KeyboardEvent;

/// Event families the modal core listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyDown,
    Click,
    FocusIn,
}

/// Identifier returned when registering a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl ListenerId {
    /// Get the raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// A registered event listener.
pub type Listener = Rc<dyn Fn(&DomEvent<'_>)>;

/// Options for programmatic focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusOptions {
    /// Do not scroll the newly focused element into view.
    pub prevent_scroll: bool,
}

impl FocusOptions {
    /// Focus without scrolling.
    pub const fn prevent_scroll() -> Self {
        Self {
            prevent_scroll: true,
        }
    }
}

/// Cancellation flags shared by every event type.
#[derive(Debug, Default)]
pub(crate) struct EventFlags {
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl EventFlags {
    pub(crate) fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub(crate) fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub(crate) fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub(crate) fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Mouse button for click events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Primary,
    Auxiliary,
    Secondary,
}

/// A click.
#[derive(Debug)]
pub struct MouseEvent {
    button: MouseButton,
    target: Option<Element>,
    flags: EventFlags,
}

impl MouseEvent {
    /// Primary-button click on `target`.
    pub fn click(target: &Element) -> Self {
        Self {
            button: MouseButton::Primary,
            target: Some(target.clone()),
            flags: EventFlags::default(),
        }
    }

    /// Click with no target (synthetic).
    pub fn untargeted() -> Self {
        Self {
            button: MouseButton::Primary,
            target: None,
            flags: EventFlags::default(),
        }
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    pub fn button(&self) -> MouseButton {
        self.button
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
}

/// Focus moved onto `target`.
#[derive(Debug)]
pub struct FocusEvent {
    target: Element,
    flags: EventFlags,
}

impl FocusEvent {
    pub fn new(target: &Element) -> Self {
        Self {
            target: target.clone(),
            flags: EventFlags::default(),
        }
    }

    pub fn target(&self) -> &Element {
        &self.target
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
}

/// A borrowed view of any dispatched event.
#[derive(Debug, Clone, Copy)]
pub enum DomEvent<'a> {
    KeyDown(&'a KeyboardEvent),
    Click(&'a MouseEvent),
    FocusIn(&'a FocusEvent),
}

impl DomEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::KeyDown(_) => EventKind::KeyDown,
            Self::Click(_) => EventKind::Click,
            Self::FocusIn(_) => EventKind::FocusIn,
        }
    }

    pub fn target(&self) -> Option<&Element> {
        match self {
            Self::KeyDown(e) => e.target(),
            Self::Click(e) => e.target(),
            Self::FocusIn(e) => Some(e.target()),
        }
    }

    pub fn default_prevented(&self) -> bool {
        match self {
            Self::KeyDown(e) => e.default_prevented(),
            Self::Click(e) => e.default_prevented(),
            Self::FocusIn(e) => e.default_prevented(),
        }
    }

    pub fn propagation_stopped(&self) -> bool {
        match self {
            Self::KeyDown(e) => e.propagation_stopped(),
            Self::Click(e) => e.propagation_stopped(),
            Self::FocusIn(e) => e.propagation_stopped(),
        }
    }
}
