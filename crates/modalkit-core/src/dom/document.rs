#![forbid(unsafe_code)]

//! The document: tree root, active element, capture listeners, dispatch.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

use crate::dom::element::Element;
use crate::dom::event::{
    DomEvent, EventKind, FocusEvent, FocusOptions, Listener, ListenerId, MouseEvent,
};
use crate::focus;
use crate::isolate::call_isolated;
use crate::keyboard::{KeyboardEvent, is_tab_key};

/// Window scroll offset in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

impl ScrollPosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport metrics used to detect and measure a vertical scrollbar.
///
/// `inner_width` includes the scrollbar, `client_width` excludes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub inner_width: u32,
    pub client_width: u32,
}

impl Viewport {
    pub const fn new(inner_width: u32, client_width: u32) -> Self {
        Self {
            inner_width,
            client_width,
        }
    }

    /// Whether a vertical scrollbar currently takes up layout width.
    #[inline]
    pub const fn has_scrollbar(self) -> bool {
        self.inner_width > self.client_width
    }

    /// Scrollbar width in pixels (0 for overlay scrollbars).
    #[inline]
    pub const fn scrollbar_width(self) -> u32 {
        self.inner_width.saturating_sub(self.client_width)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

pub(crate) struct DocumentInner {
    root: Element,
    body: Element,
    active: RefCell<Option<Element>>,
    last_focus_options: Cell<Option<FocusOptions>>,
    capture: RefCell<Vec<(ListenerId, EventKind, Listener)>>,
    next_listener: Cell<u64>,
    scroll: Cell<ScrollPosition>,
    viewport: Cell<Viewport>,
}

/// Shared handle to a headless document.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with `<html>` and `<body>`.
    pub fn new() -> Self {
        let inner = Rc::new_cyclic(|weak| {
            let root = Element::new_in(weak.clone(), "html");
            let body = Element::new_in(weak.clone(), "body");
            let linked = root.append_child(&body);
            debug_assert!(linked.is_ok(), "fresh body always links under html");
            DocumentInner {
                root,
                body,
                active: RefCell::new(None),
                last_focus_options: Cell::new(None),
                capture: RefCell::new(Vec::new()),
                next_listener: Cell::new(1),
                scroll: Cell::new(ScrollPosition::default()),
                viewport: Cell::new(Viewport::default()),
            }
        });
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Rc<DocumentInner>) -> Self {
        Self { inner }
    }

    /// Whether two handles refer to the same document.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn document_element(&self) -> Element {
        self.inner.root.clone()
    }

    pub fn body(&self) -> Element {
        self.inner.body.clone()
    }

    /// Create a detached element owned by this document.
    pub fn create_element(&self, tag: &str) -> Element {
        Element::new_in(Rc::downgrade(&self.inner), tag)
    }

    /// Find a connected element by its `id` attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.inner
            .root
            .descendants()
            .into_iter()
            .find(|el| el.attribute("id").as_deref() == Some(id))
    }

    /// All connected elements carrying `name`, in document order.
    pub fn elements_with_attribute(&self, name: &str) -> Vec<Element> {
        self.inner
            .root
            .descendants()
            .into_iter()
            .filter(|el| el.has_attribute(name))
            .collect()
    }

    // --- Focus ---

    /// The focused element, or `<body>` when nothing is focused.
    pub fn active_element(&self) -> Option<Element> {
        let active = self.inner.active.borrow().clone();
        match active {
            Some(el) if el.is_connected() => Some(el),
            _ => Some(self.body()),
        }
    }

    /// Options passed to the most recent successful focus change.
    pub fn last_focus_options(&self) -> Option<FocusOptions> {
        self.inner.last_focus_options.get()
    }

    pub(crate) fn focus(&self, el: &Element, options: FocusOptions) -> bool {
        if !el.belongs_to(&self.inner) || !el.is_connected() || !focus::can_receive_focus(el) {
            return false;
        }
        if self.inner.active.borrow().as_ref() == Some(el) {
            return true;
        }
        *self.inner.active.borrow_mut() = Some(el.clone());
        self.inner.last_focus_options.set(Some(options));

        let event = FocusEvent::new(el);
        self.dispatch(DomEvent::FocusIn(&event));
        self.inner.active.borrow().as_ref() == Some(el)
    }

    pub(crate) fn blur(&self) {
        *self.inner.active.borrow_mut() = None;
    }

    // --- Scroll & viewport ---

    pub fn scroll_position(&self) -> ScrollPosition {
        self.inner.scroll.get()
    }

    pub fn scroll_to(&self, x: f64, y: f64) {
        self.inner.scroll.set(ScrollPosition::new(x, y));
    }

    pub fn viewport(&self) -> Viewport {
        self.inner.viewport.get()
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.inner.viewport.set(viewport);
    }

    // --- Listeners ---

    /// Register a document-level capture listener.
    pub fn add_capture_listener(
        &self,
        kind: EventKind,
        listener: impl Fn(&DomEvent<'_>) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner
            .capture
            .borrow_mut()
            .push((id, kind, Rc::new(listener)));
        id
    }

    pub fn remove_capture_listener(&self, id: ListenerId) -> bool {
        let mut capture = self.inner.capture.borrow_mut();
        let before = capture.len();
        capture.retain(|(lid, _, _)| *lid != id);
        capture.len() != before
    }

    pub fn capture_listener_count(&self) -> usize {
        self.inner.capture.borrow().len()
    }

    // --- Dispatch ---

    /// Dispatch an event: document capture listeners, then the target and
    /// its ancestors (bubble), then the default action.
    ///
    /// Returns `false` when a listener prevented the default action.
    pub fn dispatch(&self, event: DomEvent<'_>) -> bool {
        let kind = event.kind();
        let capture: Vec<Listener> = self
            .inner
            .capture
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, l)| Rc::clone(l))
            .collect();

        for listener in capture {
            if event.propagation_stopped() {
                break;
            }
            call_isolated("document capture listener", || listener(&event));
        }

        if !event.propagation_stopped()
            && let Some(target) = event.target()
        {
            let mut path = vec![target.clone()];
            path.extend(target.ancestors());
            'path: for node in path {
                for listener in node.listeners_for(kind) {
                    if event.propagation_stopped() {
                        break 'path;
                    }
                    call_isolated("element listener", || listener(&event));
                }
            }
        }

        let proceed = !event.default_prevented();
        if proceed
            && let DomEvent::KeyDown(key) = event
            && is_tab_key(key)
        {
            self.move_focus_sequentially(key.shift_key());
        }
        proceed
    }

    /// Dispatch a keydown, targeting the active element when the event has
    /// no target. Returns the event so callers can inspect its flags.
    pub fn press(&self, event: KeyboardEvent) -> KeyboardEvent {
        let event = if event.target().is_none()
            && let Some(active) = self.active_element()
        {
            event.with_target(&active)
        } else {
            event
        };
        self.dispatch(DomEvent::KeyDown(&event));
        event
    }

    /// Dispatch a primary click on `target`.
    pub fn click(&self, target: &Element) -> MouseEvent {
        let event = MouseEvent::click(target);
        self.dispatch(DomEvent::Click(&event));
        event
    }

    /// Default action for an unprevented Tab: move to the next (or previous)
    /// focusable element in document order, wrapping at the ends.
    fn move_focus_sequentially(&self, backwards: bool) {
        let order = focus::focusable_elements(&self.body());
        if order.is_empty() {
            return;
        }
        let positions: AHashMap<Element, usize> = self
            .body()
            .descendants()
            .into_iter()
            .enumerate()
            .map(|(idx, el)| (el, idx))
            .collect();
        let current = self
            .active_element()
            .and_then(|active| positions.get(&active).copied());
        let position = |el: &Element| positions.get(el).copied().unwrap_or(0);

        let next = match (current, backwards) {
            (None, false) => order.first(),
            (None, true) => order.last(),
            (Some(cur), false) => order
                .iter()
                .find(|el| position(el) > cur)
                .or(order.first()),
            (Some(cur), true) => order
                .iter()
                .rev()
                .find(|el| position(el) < cur)
                .or(order.last()),
        };
        if let Some(next) = next {
            next.focus();
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("active", &self.inner.active.borrow())
            .field("capture_listeners", &self.inner.capture.borrow().len())
            .field("scroll", &self.inner.scroll.get())
            .finish()
    }
}
