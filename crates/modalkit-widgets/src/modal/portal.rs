#![forbid(unsafe_code)]

//! Portal container lookup.
//!
//! Modal content renders into a container outside the normal tree. The
//! container is, in order of preference: an explicit element, an element
//! looked up by id, or the shared default root under `<body>`, created on
//! first use.

use std::fmt;

use modalkit_core::dom::{Document, Element};
use modalkit_core::error::DomError;

/// Id of the shared default portal root.
pub const DEFAULT_PORTAL_ID: &str = "modalkit-portal-root";

/// Marker attribute carried by portal containers.
pub const PORTAL_MARKER: &str = "data-modalkit-portal";

/// Where a modal's portal content goes.
#[derive(Clone, PartialEq, Eq)]
pub enum PortalTarget {
    Element(Element),
    /// Looked up with `get_element_by_id` at mount time.
    Id(String),
}

impl From<Element> for PortalTarget {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl From<&str> for PortalTarget {
    fn from(id: &str) -> Self {
        Self::Id(id.to_owned())
    }
}

impl fmt::Debug for PortalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(el) => f.debug_tuple("Element").field(el).finish(),
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
        }
    }
}

/// Resolve the container for `target`, creating the default root if needed.
pub fn portal_container(document: &Document, target: Option<&PortalTarget>) -> Element {
    match target {
        Some(PortalTarget::Element(el)) => return el.clone(),
        Some(PortalTarget::Id(id)) => {
            if let Some(el) = document.get_element_by_id(id) {
                return el;
            }
            tracing::debug!(id = %id, "portal: target id not found; using default root");
        }
        None => {}
    }
    document
        .get_element_by_id(DEFAULT_PORTAL_ID)
        .unwrap_or_else(|| create_portal(document, DEFAULT_PORTAL_ID))
}

/// Create a marked portal container with `id` under `<body>`.
pub fn create_portal(document: &Document, id: &str) -> Element {
    let portal = document
        .create_element("div")
        .with_attribute("id", id)
        .with_attribute(PORTAL_MARKER, "");
    if let Err(err) = document.body().append_child(&portal) {
        tracing::warn!(%err, id, "portal: could not attach container");
    }
    portal
}

/// Append `element` to the container resolved for `target`.
pub fn append_portal(
    document: &Document,
    element: &Element,
    target: Option<&PortalTarget>,
) -> Result<Element, DomError> {
    let container = portal_container(document, target);
    container.append_child(element)?;
    Ok(container)
}

/// Detach `element` from wherever it is mounted.
pub fn remove_portal(element: &Element) {
    element.remove();
}

/// Remove every marked portal container and an empty default root.
///
/// Returns the number of elements removed.
pub fn cleanup_portals(document: &Document) -> usize {
    let mut removed = 0;
    for portal in document.elements_with_attribute(PORTAL_MARKER) {
        if portal.is_connected() {
            portal.remove();
            removed += 1;
        }
    }
    if let Some(root) = document.get_element_by_id(DEFAULT_PORTAL_ID)
        && root.children().is_empty()
    {
        root.remove();
        removed += 1;
    }
    if removed > 0 {
        tracing::debug!(removed, "portal: cleaned up containers");
    }
    removed
}
