#![forbid(unsafe_code)]

//! Props bundles: the attributes, styles, handlers and ref setters a host
//! attaches to the elements it renders for a modal.
//!
//! Bundles are recomputed on every getter call. Handlers are fresh `Rc`
//! closures each time; hosts must not rely on referential stability.
//!
//! | Bundle | Marker |
//! |--------|--------|
//! | [`PortalProps`] | `data-modalkit-portal` |
//! | [`OverlayProps`] | `data-modalkit-overlay` |
//! | [`ContainerProps`] | `data-modalkit-container` |
//! | [`ContentProps`] | `data-modalkit-content` |
//! | [`TitleProps`] | `data-modalkit-title` |
//! | [`DescriptionProps`] | `data-modalkit-description` |
//! | [`CloseButtonProps`] | `data-modalkit-close` |
//! | [`TriggerProps`] | `data-modalkit-trigger` |

use std::fmt;
use std::rc::Rc;

use modalkit_core::dom::{DomEvent, Element, EventKind, ListenerId, MouseEvent};
use modalkit_core::keyboard::KeyboardEvent;

use crate::modal::config::ModalRole;
use crate::modal::state::AnimationState;

pub type ClickHandler = Rc<dyn Fn(&MouseEvent)>;
pub type KeyHandler = Rc<dyn Fn(&KeyboardEvent)>;
/// Receives the rendered element, or `None` on unmount.
pub type RefSetter = Rc<dyn Fn(Option<&Element>)>;

/// Label used by the close button when the host supplies none.
pub const CLOSE_LABEL: &str = "Close";

/// Common surface of every props bundle.
pub trait PropsBundle {
    /// Literal DOM attributes, in a stable order.
    fn attributes(&self) -> Vec<(&'static str, String)>;

    /// Inline CSS declarations.
    fn styles(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Write attributes and styles onto `element`.
    fn apply(&self, element: &Element) {
        for (name, value) in self.attributes() {
            element.set_attribute(name, value);
        }
        for (property, value) in self.styles() {
            element.set_style(property, value);
        }
    }

    /// [`apply`](Self::apply), then hand `element` to the ref setter and
    /// register the handlers as element listeners.
    fn attach(&self, element: &Element) -> Vec<ListenerId> {
        self.apply(element);
        Vec::new()
    }
}

fn on_click_listener(handler: &ClickHandler) -> impl Fn(&DomEvent<'_>) + 'static {
    let handler = Rc::clone(handler);
    move |event: &DomEvent<'_>| {
        if let DomEvent::Click(click) = event {
            handler(click);
        }
    }
}

fn on_key_listener(handler: &KeyHandler) -> impl Fn(&DomEvent<'_>) + 'static {
    let handler = Rc::clone(handler);
    move |event: &DomEvent<'_>| {
        if let DomEvent::KeyDown(key) = event {
            handler(key);
        }
    }
}

fn marker(name: &'static str) -> (&'static str, String) {
    (name, String::new())
}

fn fixed_layer(z_index: u32) -> Vec<(&'static str, String)> {
    vec![
        ("position", "fixed".to_owned()),
        ("inset", "0".to_owned()),
        ("z-index", z_index.to_string()),
    ]
}

// --- Portal ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalProps {
    pub data_state: AnimationState,
}

impl PropsBundle for PortalProps {
    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            marker("data-modalkit-portal"),
            ("data-state", self.data_state.to_string()),
        ]
    }
}

// --- Overlay ---

/// Full-bleed backdrop below the container.
#[derive(Clone)]
pub struct OverlayProps {
    pub data_state: AnimationState,
    pub z_index: u32,
    pub on_click: ClickHandler,
    pub set_ref: RefSetter,
}

impl PropsBundle for OverlayProps {
    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            marker("data-modalkit-overlay"),
            ("data-state", self.data_state.to_string()),
        ]
    }

    fn styles(&self) -> Vec<(&'static str, String)> {
        fixed_layer(self.z_index)
    }

    fn attach(&self, element: &Element) -> Vec<ListenerId> {
        self.apply(element);
        (self.set_ref)(Some(element));
        vec![element.add_event_listener(EventKind::Click, on_click_listener(&self.on_click))]
    }
}

impl fmt::Debug for OverlayProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayProps")
            .field("data_state", &self.data_state)
            .field("z_index", &self.z_index)
            .finish_non_exhaustive()
    }
}

// --- Container ---

/// Centering layer one z-index step above the overlay.
#[derive(Clone)]
pub struct ContainerProps {
    pub data_state: AnimationState,
    pub z_index: u32,
    /// CSS `overflow` value.
    pub overflow: &'static str,
    pub on_click: ClickHandler,
    pub set_ref: RefSetter,
}

impl PropsBundle for ContainerProps {
    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            marker("data-modalkit-container"),
            ("data-state", self.data_state.to_string()),
        ]
    }

    fn styles(&self) -> Vec<(&'static str, String)> {
        let mut styles = fixed_layer(self.z_index);
        styles.extend([
            ("display", "flex".to_owned()),
            ("align-items", "center".to_owned()),
            ("justify-content", "center".to_owned()),
            ("overflow", self.overflow.to_owned()),
        ]);
        styles
    }

    fn attach(&self, element: &Element) -> Vec<ListenerId> {
        self.apply(element);
        (self.set_ref)(Some(element));
        vec![element.add_event_listener(EventKind::Click, on_click_listener(&self.on_click))]
    }
}

impl fmt::Debug for ContainerProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerProps")
            .field("data_state", &self.data_state)
            .field("z_index", &self.z_index)
            .field("overflow", &self.overflow)
            .finish_non_exhaustive()
    }
}

// --- Content ---

/// The dialog element itself.
///
/// `aria-label` replaces `aria-labelledby` when set.
#[derive(Clone)]
pub struct ContentProps {
    pub role: ModalRole,
    pub aria_label: Option<String>,
    pub aria_labelledby: Option<String>,
    pub aria_describedby: Option<String>,
    pub data_state: AnimationState,
    pub on_key_down: KeyHandler,
    /// Sets up the focus trap on first mount while open.
    pub set_ref: RefSetter,
}

impl ContentProps {
    pub const TAB_INDEX: i32 = -1;
}

impl PropsBundle for ContentProps {
    fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            marker("data-modalkit-content"),
            ("role", self.role.as_str().to_owned()),
            ("aria-modal", "true".to_owned()),
            ("tabindex", Self::TAB_INDEX.to_string()),
            ("data-state", self.data_state.to_string()),
        ];
        if let Some(label) = &self.aria_label {
            attrs.push(("aria-label", label.clone()));
        } else if let Some(labelledby) = &self.aria_labelledby {
            attrs.push(("aria-labelledby", labelledby.clone()));
        }
        if let Some(describedby) = &self.aria_describedby {
            attrs.push(("aria-describedby", describedby.clone()));
        }
        attrs
    }

    fn attach(&self, element: &Element) -> Vec<ListenerId> {
        self.apply(element);
        (self.set_ref)(Some(element));
        vec![element.add_event_listener(EventKind::KeyDown, on_key_listener(&self.on_key_down))]
    }
}

impl fmt::Debug for ContentProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentProps")
            .field("role", &self.role)
            .field("aria_label", &self.aria_label)
            .field("aria_labelledby", &self.aria_labelledby)
            .field("aria_describedby", &self.aria_describedby)
            .field("data_state", &self.data_state)
            .finish_non_exhaustive()
    }
}

// --- Title / description ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleProps {
    pub id: String,
}

impl PropsBundle for TitleProps {
    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("id", self.id.clone()), marker("data-modalkit-title")]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionProps {
    pub id: String,
}

impl PropsBundle for DescriptionProps {
    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("id", self.id.clone()), marker("data-modalkit-description")]
    }
}

// --- Buttons ---

#[derive(Clone)]
pub struct CloseButtonProps {
    pub aria_label: String,
    pub on_click: ClickHandler,
}

impl PropsBundle for CloseButtonProps {
    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("type", "button".to_owned()),
            ("aria-label", self.aria_label.clone()),
            marker("data-modalkit-close"),
        ]
    }

    fn attach(&self, element: &Element) -> Vec<ListenerId> {
        self.apply(element);
        vec![element.add_event_listener(EventKind::Click, on_click_listener(&self.on_click))]
    }
}

impl fmt::Debug for CloseButtonProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseButtonProps")
            .field("aria_label", &self.aria_label)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct TriggerProps {
    pub aria_expanded: bool,
    pub on_click: ClickHandler,
}

impl PropsBundle for TriggerProps {
    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("type", "button".to_owned()),
            ("aria-haspopup", "dialog".to_owned()),
            ("aria-expanded", self.aria_expanded.to_string()),
            marker("data-modalkit-trigger"),
        ]
    }

    fn attach(&self, element: &Element) -> Vec<ListenerId> {
        self.apply(element);
        vec![element.add_event_listener(EventKind::Click, on_click_listener(&self.on_click))]
    }
}

impl fmt::Debug for TriggerProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerProps")
            .field("aria_expanded", &self.aria_expanded)
            .finish_non_exhaustive()
    }
}
