#![forbid(unsafe_code)]

//! Focus queries and focus save/restore.
//!
//! An element is *focusable* (Tab-reachable) when it matches one of the
//! interactive forms below and is rendered:
//!
//! | Form | Condition |
//! |------|-----------|
//! | `a`, `area` | has `href` |
//! | `button`, `input`, `select`, `textarea` | not `disabled` |
//! | any element | `tabindex` present and not `-1` |
//! | any element | `contenteditable="true"` |
//! | `audio`, `video` | has `controls` |
//! | `summary` | first `summary` child of a `details` |
//!
//! *Rendered* means no inclusive ancestor is `display: none` or carries the
//! `hidden` attribute, the nearest `visibility` declaration is not `hidden`,
//! and the element is not an `<input type="hidden">`.

use crate::dom::{Document, Element, FocusOptions, ScrollPosition};

fn is_enabled_control(el: &Element) -> bool {
    matches!(el.tag_name(), "button" | "input" | "select" | "textarea")
        && !el.has_attribute("disabled")
}

fn is_first_summary(el: &Element) -> bool {
    if el.tag_name() != "summary" {
        return false;
    }
    let Some(parent) = el.parent() else {
        return false;
    };
    parent.tag_name() == "details"
        && parent
            .children()
            .into_iter()
            .find(|c| c.tag_name() == "summary")
            .is_some_and(|first| first == *el)
}

/// Whether the element matches an interactive form, ignoring visibility.
pub fn matches_focusable(el: &Element) -> bool {
    match el.tag_name() {
        "a" | "area" if el.has_attribute("href") => return true,
        "audio" | "video" if el.has_attribute("controls") => return true,
        _ => {}
    }
    is_enabled_control(el)
        || el.attribute("tabindex").is_some_and(|t| t.trim() != "-1")
        || el.attribute("contenteditable").as_deref() == Some("true")
        || is_first_summary(el)
}

/// Whether the element would be rendered.
pub fn is_rendered(el: &Element) -> bool {
    if el.tag_name() == "input" && el.attribute("type").as_deref() == Some("hidden") {
        return false;
    }
    let mut visibility_decided = false;
    let mut cursor = Some(el.clone());
    while let Some(node) = cursor {
        if node.style("display") == "none" || node.has_attribute("hidden") {
            return false;
        }
        if !visibility_decided {
            match node.style("visibility").as_str() {
                "hidden" | "collapse" => return false,
                "visible" => visibility_decided = true,
                _ => {}
            }
        }
        cursor = node.parent();
    }
    true
}

/// Tab-reachable: interactive and rendered.
pub fn is_focusable(el: &Element) -> bool {
    matches_focusable(el) && is_rendered(el)
}

/// Programmatically focusable: focusable, or any rendered element with a
/// `tabindex` (including `-1`). Disabled controls never take focus.
pub fn can_receive_focus(el: &Element) -> bool {
    let is_control = matches!(el.tag_name(), "button" | "input" | "select" | "textarea");
    if is_control && el.has_attribute("disabled") {
        return false;
    }
    (matches_focusable(el) || el.has_attribute("tabindex")) && is_rendered(el)
}

/// Focusable descendants of `container` in document order, excluding the
/// container itself. Always queried live.
pub fn focusable_elements(container: &Element) -> Vec<Element> {
    container
        .descendants()
        .into_iter()
        .filter(is_focusable)
        .collect()
}

pub fn first_focusable(container: &Element) -> Option<Element> {
    focusable_elements(container).into_iter().next()
}

pub fn last_focusable(container: &Element) -> Option<Element> {
    focusable_elements(container).pop()
}

/// The document's active element.
#[inline]
pub fn active_element(document: &Document) -> Option<Element> {
    document.active_element()
}

/// Focus `element` if present. Returns whether it became active.
pub fn focus_element(element: Option<&Element>, options: FocusOptions) -> bool {
    element.is_some_and(|el| el.focus_with(options))
}

/// Whether the active element is `container` or inside it.
pub fn is_focus_within(container: &Element) -> bool {
    container
        .document()
        .and_then(|doc| doc.active_element())
        .is_some_and(|active| container.contains(&active))
}

/// Inclusive containment that tolerates absent operands.
pub fn contains(container: Option<&Element>, element: Option<&Element>) -> bool {
    match (container, element) {
        (Some(container), Some(element)) => container.contains(element),
        _ => false,
    }
}

/// A captured focus target plus scroll offset, replayed later.
#[derive(Debug, Clone)]
pub struct SavedFocus {
    document: Document,
    element: Option<Element>,
    scroll: ScrollPosition,
}

impl SavedFocus {
    /// Capture the current active element and scroll offset.
    pub fn capture(document: &Document) -> Self {
        let element = document
            .active_element()
            .filter(|el| *el != document.body());
        Self {
            document: document.clone(),
            element,
            scroll: document.scroll_position(),
        }
    }

    pub fn element(&self) -> Option<&Element> {
        self.element.as_ref()
    }

    pub fn scroll(&self) -> ScrollPosition {
        self.scroll
    }

    /// Refocus the saved element if it is still in the document.
    ///
    /// With `prevent_scroll`, the saved scroll offset is written back as well.
    /// Returns whether focus moved to the saved element.
    pub fn restore(self, prevent_scroll: bool) -> bool {
        let Some(element) = self.element else {
            return false;
        };
        if !self.document.body().contains(&element) {
            return false;
        }
        let focused = element.focus_with(FocusOptions { prevent_scroll });
        if prevent_scroll {
            self.document.scroll_to(self.scroll.x, self.scroll.y);
        }
        focused
    }
}
