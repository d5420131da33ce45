#![forbid(unsafe_code)]

//! Focus containment for a DOM subtree.
//!
//! A [`FocusTrap`] is `inactive` until [`FocusTrap::activate`], then
//! `active` until [`FocusTrap::deactivate`]. While active it installs three
//! document capture listeners:
//!
//! - **keydown**: Tab / Shift+Tab wrap within the container's live set of
//!   focusable descendants; Escape deactivates when configured.
//! - **click**: clicks outside the container are blocked unless allowed.
//! - **focusin**: focus landing outside the container is pulled back.
//!
//! `paused` is orthogonal to `active` and suspends all interception.
//!
//! # Invariants
//!
//! 1. Listeners are installed exactly while the trap is active.
//! 2. The focusable set is queried on every keypress, never cached.
//! 3. Focus correction never re-enters itself: a correction in progress
//!    ignores the `focusin` it causes. The guard resets on the next
//!    scheduler tick.
//!
//! # Failure Modes
//!
//! - Container detached from its document: activation is skipped with a
//!   warning.
//! - Empty container: focus goes to the container itself, which receives a
//!   temporary `tabindex="-1"` if it has none.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use modalkit_core::dom::{
    Document, DomEvent, Element, EventKind, FocusEvent, FocusOptions, ListenerId, MouseEvent,
};
use modalkit_core::focus::{SavedFocus, first_focusable, focusable_elements};
use modalkit_core::keyboard::{KeyboardEvent, is_escape_key, is_tab_key};
use modalkit_runtime::scheduler::Scheduler;

// --- Targets ---

/// An element to focus, given directly or resolved on demand.
#[derive(Clone)]
pub enum FocusTarget {
    Element(Element),
    /// Resolved each time the trap needs it.
    Lazy(Rc<dyn Fn() -> Option<Element>>),
}

impl FocusTarget {
    pub fn lazy(resolve: impl Fn() -> Option<Element> + 'static) -> Self {
        Self::Lazy(Rc::new(resolve))
    }

    pub fn resolve(&self) -> Option<Element> {
        match self {
            Self::Element(el) => Some(el.clone()),
            Self::Lazy(resolve) => resolve(),
        }
    }
}

impl From<Element> for FocusTarget {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl From<&Element> for FocusTarget {
    fn from(el: &Element) -> Self {
        Self::Element(el.clone())
    }
}

impl fmt::Debug for FocusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(el) => f.debug_tuple("Element").field(el).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Whether a click outside the container may proceed.
#[derive(Clone)]
pub enum OutsideClick {
    Allow(bool),
    Predicate(Rc<dyn Fn(&MouseEvent) -> bool>),
}

impl OutsideClick {
    fn allows(&self, event: &MouseEvent) -> bool {
        match self {
            Self::Allow(allow) => *allow,
            Self::Predicate(allow) => allow(event),
        }
    }
}

impl Default for OutsideClick {
    fn default() -> Self {
        Self::Allow(false)
    }
}

impl fmt::Debug for OutsideClick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow(allow) => f.debug_tuple("Allow").field(allow).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

// --- Options ---

/// Focus trap configuration.
#[derive(Clone)]
pub struct FocusTrapOptions {
    pub initial_focus: Option<FocusTarget>,
    /// Used when `initial_focus` is absent or resolves to nothing.
    pub fallback_focus: Option<FocusTarget>,
    /// Focused on deactivation instead of replaying the saved focus.
    pub return_focus: Option<FocusTarget>,
    pub escape_deactivates: bool,
    pub click_outside_deactivates: bool,
    pub allow_outside_click: OutsideClick,
    pub on_activate: Option<Rc<dyn Fn()>>,
    pub on_deactivate: Option<Rc<dyn Fn()>>,
}

impl Default for FocusTrapOptions {
    fn default() -> Self {
        Self {
            initial_focus: None,
            fallback_focus: None,
            return_focus: None,
            escape_deactivates: true,
            click_outside_deactivates: false,
            allow_outside_click: OutsideClick::default(),
            on_activate: None,
            on_deactivate: None,
        }
    }
}

impl FocusTrapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn initial_focus(mut self, target: impl Into<FocusTarget>) -> Self {
        self.initial_focus = Some(target.into());
        self
    }

    #[must_use]
    pub fn fallback_focus(mut self, target: impl Into<FocusTarget>) -> Self {
        self.fallback_focus = Some(target.into());
        self
    }

    #[must_use]
    pub fn return_focus(mut self, target: impl Into<FocusTarget>) -> Self {
        self.return_focus = Some(target.into());
        self
    }

    #[must_use]
    pub fn escape_deactivates(mut self, enabled: bool) -> Self {
        self.escape_deactivates = enabled;
        self
    }

    #[must_use]
    pub fn click_outside_deactivates(mut self, enabled: bool) -> Self {
        self.click_outside_deactivates = enabled;
        self
    }

    #[must_use]
    pub fn allow_outside_click(mut self, allow: bool) -> Self {
        self.allow_outside_click = OutsideClick::Allow(allow);
        self
    }

    #[must_use]
    pub fn allow_outside_click_if(mut self, allow: impl Fn(&MouseEvent) -> bool + 'static) -> Self {
        self.allow_outside_click = OutsideClick::Predicate(Rc::new(allow));
        self
    }

    #[must_use]
    pub fn on_activate(mut self, f: impl Fn() + 'static) -> Self {
        self.on_activate = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_deactivate(mut self, f: impl Fn() + 'static) -> Self {
        self.on_deactivate = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for FocusTrapOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusTrapOptions")
            .field("initial_focus", &self.initial_focus)
            .field("fallback_focus", &self.fallback_focus)
            .field("return_focus", &self.return_focus)
            .field("escape_deactivates", &self.escape_deactivates)
            .field("click_outside_deactivates", &self.click_outside_deactivates)
            .field("allow_outside_click", &self.allow_outside_click)
            .finish_non_exhaustive()
    }
}

// --- Trap ---

/// Focus-escape correction guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CorrectionState {
    Idle,
    Correcting,
}

struct TrapInner {
    container: Element,
    scheduler: Scheduler,
    options: FocusTrapOptions,
    active: Cell<bool>,
    paused: Cell<bool>,
    correction: Cell<CorrectionState>,
    saved: RefCell<Option<SavedFocus>>,
    listeners: RefCell<Vec<ListenerId>>,
    added_tabindex: Cell<bool>,
}

impl TrapInner {
    fn intercepting(&self) -> bool {
        self.active.get() && !self.paused.get()
    }

    fn remove_listeners(&self) {
        let ids: Vec<ListenerId> = self.listeners.borrow_mut().drain(..).collect();
        if let Some(doc) = self.container.document() {
            for id in ids {
                doc.remove_capture_listener(id);
            }
        }
    }
}

impl Drop for TrapInner {
    fn drop(&mut self) {
        self.remove_listeners();
    }
}

/// Keeps keyboard focus inside a container element.
///
/// Cloning yields another handle to the same trap.
#[derive(Clone)]
pub struct FocusTrap {
    inner: Rc<TrapInner>,
}

impl FocusTrap {
    /// Create an inactive trap over `container`.
    pub fn new(container: &Element, scheduler: &Scheduler, options: FocusTrapOptions) -> Self {
        Self {
            inner: Rc::new(TrapInner {
                container: container.clone(),
                scheduler: scheduler.clone(),
                options,
                active: Cell::new(false),
                paused: Cell::new(false),
                correction: Cell::new(CorrectionState::Idle),
                saved: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
                added_tabindex: Cell::new(false),
            }),
        }
    }

    pub fn container(&self) -> &Element {
        &self.inner.container
    }

    /// Whether listeners are installed.
    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// Whether an active trap is currently ignoring events.
    pub fn is_paused(&self) -> bool {
        self.inner.paused.get()
    }

    /// Start trapping focus. No-op when already active.
    pub fn activate(&self) {
        let inner = &self.inner;
        if inner.active.get() {
            return;
        }
        let Some(doc) = inner.container.document() else {
            tracing::warn!("focus trap: container has no document; not activating");
            return;
        };

        *inner.saved.borrow_mut() = Some(SavedFocus::capture(&doc));
        inner.active.set(true);
        self.install_listeners(&doc);

        let target = self.resolve_initial_focus();
        if target == inner.container && !inner.container.has_attribute("tabindex") {
            inner.container.set_attribute("tabindex", "-1");
            inner.added_tabindex.set(true);
        }
        target.focus_with(FocusOptions::prevent_scroll());
        tracing::debug!(target = ?target, "focus trap: activated");

        if let Some(on_activate) = &inner.options.on_activate {
            on_activate();
        }
    }

    /// Stop trapping and return focus. No-op when inactive.
    pub fn deactivate(&self) {
        let inner = &self.inner;
        if !inner.active.get() {
            return;
        }
        inner.active.set(false);
        inner.remove_listeners();
        if inner.added_tabindex.replace(false) {
            inner.container.remove_attribute("tabindex");
        }

        let saved = inner.saved.borrow_mut().take();
        match inner.options.return_focus.as_ref().and_then(FocusTarget::resolve) {
            Some(target) => {
                target.focus_with(FocusOptions::prevent_scroll());
            }
            None => {
                if let Some(saved) = saved {
                    saved.restore(true);
                }
            }
        }

        inner.paused.set(false);
        inner.correction.set(CorrectionState::Idle);
        tracing::debug!("focus trap: deactivated");

        if let Some(on_deactivate) = &inner.options.on_deactivate {
            on_deactivate();
        }
    }

    /// Suspend interception without deactivating. Only while active.
    pub fn pause(&self) {
        if self.inner.active.get() {
            self.inner.paused.set(true);
        }
    }

    /// Resume handling events after [`FocusTrap::pause`].
    pub fn unpause(&self) {
        if self.inner.active.get() {
            self.inner.paused.set(false);
        }
    }

    // --- Internals ---

    fn resolve_initial_focus(&self) -> Element {
        let options = &self.inner.options;
        options
            .initial_focus
            .as_ref()
            .and_then(FocusTarget::resolve)
            .or_else(|| options.fallback_focus.as_ref().and_then(FocusTarget::resolve))
            .or_else(|| first_focusable(&self.inner.container))
            .unwrap_or_else(|| self.inner.container.clone())
    }

    fn install_listeners(&self, doc: &Document) {
        let weak = Rc::downgrade(&self.inner);
        let on_key = Self::listener(&weak, |trap, event| {
            if let DomEvent::KeyDown(key) = event {
                trap.handle_key_down(key);
            }
        });
        let on_click = Self::listener(&weak, |trap, event| {
            if let DomEvent::Click(click) = event {
                trap.handle_click(click);
            }
        });
        let on_focus = Self::listener(&weak, |trap, event| {
            if let DomEvent::FocusIn(focus) = event {
                trap.handle_focus_in(focus);
            }
        });
        let ids = vec![
            doc.add_capture_listener(EventKind::KeyDown, on_key),
            doc.add_capture_listener(EventKind::Click, on_click),
            doc.add_capture_listener(EventKind::FocusIn, on_focus),
        ];
        *self.inner.listeners.borrow_mut() = ids;
    }

    fn listener(
        weak: &Weak<TrapInner>,
        handle: fn(&FocusTrap, &DomEvent<'_>),
    ) -> impl Fn(&DomEvent<'_>) + 'static {
        let weak = weak.clone();
        move |event: &DomEvent<'_>| {
            if let Some(inner) = weak.upgrade() {
                handle(&FocusTrap { inner }, event);
            }
        }
    }

    fn handle_key_down(&self, event: &KeyboardEvent) {
        let inner = &self.inner;
        if !inner.intercepting() {
            return;
        }
        if is_escape_key(event) {
            if inner.options.escape_deactivates {
                event.prevent_default();
                self.deactivate();
            }
            return;
        }
        if !is_tab_key(event) {
            return;
        }

        let focusables = focusable_elements(&inner.container);
        let (Some(first), Some(last)) = (focusables.first(), focusables.last()) else {
            event.prevent_default();
            inner.container.focus_with(FocusOptions::prevent_scroll());
            return;
        };
        let current = inner
            .container
            .document()
            .and_then(|doc| doc.active_element());
        let position = current
            .as_ref()
            .and_then(|el| focusables.iter().position(|f| f == el));

        let wrap_to = match (event.shift_key(), position) {
            (true, Some(0)) | (true, None) => Some(last),
            (false, Some(idx)) if idx + 1 == focusables.len() => Some(first),
            (false, None) => Some(first),
            _ => None,
        };
        if let Some(target) = wrap_to {
            event.prevent_default();
            target.focus_with(FocusOptions::prevent_scroll());
        }
    }

    fn handle_click(&self, event: &MouseEvent) {
        let inner = &self.inner;
        if !inner.intercepting() {
            return;
        }
        let Some(target) = event.target() else {
            return;
        };
        if inner.container.contains(target) {
            return;
        }
        if !inner.options.allow_outside_click.allows(event) {
            event.prevent_default();
            event.stop_propagation();
        }
        if inner.options.click_outside_deactivates {
            self.deactivate();
        }
    }

    fn handle_focus_in(&self, event: &FocusEvent) {
        let inner = &self.inner;
        if !inner.intercepting() || inner.correction.get() == CorrectionState::Correcting {
            return;
        }
        if inner.container.contains(event.target()) {
            return;
        }

        inner.correction.set(CorrectionState::Correcting);
        tracing::trace!(escaped_to = ?event.target(), "focus trap: correcting focus");
        let destination =
            first_focusable(&inner.container).unwrap_or_else(|| inner.container.clone());
        destination.focus_with(FocusOptions::prevent_scroll());

        let weak = Rc::downgrade(inner);
        inner.scheduler.defer(move || {
            if let Some(inner) = weak.upgrade() {
                inner.correction.set(CorrectionState::Idle);
            }
        });
    }
}

impl fmt::Debug for FocusTrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusTrap")
            .field("container", &self.inner.container)
            .field("active", &self.inner.active.get())
            .field("paused", &self.inner.paused.get())
            .finish_non_exhaustive()
    }
}
