#![forbid(unsafe_code)]

//! Element nodes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::dom::document::{Document, DocumentInner};
use crate::dom::event::{EventKind, FocusOptions, Listener, ListenerId};
use crate::error::DomError;

pub(crate) struct ElementNode {
    tag: String,
    attributes: RefCell<AHashMap<String, String>>,
    styles: RefCell<AHashMap<String, String>>,
    parent: RefCell<Weak<ElementNode>>,
    children: RefCell<Vec<Element>>,
    listeners: RefCell<Vec<(ListenerId, EventKind, Listener)>>,
    next_listener: Cell<u64>,
    document: Weak<DocumentInner>,
}

/// Shared handle to an element.
///
/// Cloning is cheap and yields the same element; equality is identity.
#[derive(Clone)]
pub struct Element {
    node: Rc<ElementNode>,
}

impl Element {
    pub(crate) fn new_in(document: Weak<DocumentInner>, tag: &str) -> Self {
        Self {
            node: Rc::new(ElementNode {
                tag: tag.to_ascii_lowercase(),
                attributes: RefCell::new(AHashMap::new()),
                styles: RefCell::new(AHashMap::new()),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(1),
                document,
            }),
        }
    }

    /// Lowercase tag name.
    #[inline]
    pub fn tag_name(&self) -> &str {
        &self.node.tag
    }

    /// Owning document, if it is still alive.
    pub fn document(&self) -> Option<Document> {
        self.node.document.upgrade().map(Document::from_inner)
    }

    pub(crate) fn same_document(&self, other: &Element) -> bool {
        Weak::ptr_eq(&self.node.document, &other.node.document)
    }

    pub(crate) fn belongs_to(&self, inner: &Rc<DocumentInner>) -> bool {
        std::ptr::eq(self.node.document.as_ptr(), Rc::as_ptr(inner))
    }

    // --- Attributes ---

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.node.attributes.borrow().get(name).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.node.attributes.borrow().contains_key(name)
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        self.node
            .attributes
            .borrow_mut()
            .insert(name.to_owned(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.node.attributes.borrow_mut().remove(name);
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attribute(self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    // --- Inline style ---

    /// Inline style value, or an empty string when unset.
    pub fn style(&self, property: &str) -> String {
        self.node
            .styles
            .borrow()
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    /// Set an inline style. An empty value removes the declaration.
    pub fn set_style(&self, property: &str, value: impl Into<String>) {
        let value = value.into();
        let mut styles = self.node.styles.borrow_mut();
        if value.is_empty() {
            styles.remove(property);
        } else {
            styles.insert(property.to_owned(), value);
        }
    }

    /// Builder-style inline style setter.
    #[must_use]
    pub fn with_style(self, property: &str, value: impl Into<String>) -> Self {
        self.set_style(property, value);
        self
    }

    // --- Tree ---

    pub fn parent(&self) -> Option<Element> {
        self.node
            .parent
            .borrow()
            .upgrade()
            .map(|node| Element { node })
    }

    pub fn children(&self) -> Vec<Element> {
        self.node.children.borrow().clone()
    }

    /// Append `child`, detaching it from any previous parent.
    ///
    /// # Errors
    ///
    /// [`DomError::WrongDocument`] when the nodes belong to different
    /// documents, [`DomError::HierarchyRequest`] when `child` is `self` or an
    /// ancestor of `self`.
    pub fn append_child(&self, child: &Element) -> Result<(), DomError> {
        if !self.same_document(child) {
            return Err(DomError::WrongDocument(child.tag_name().to_owned()));
        }
        if child.contains(self) {
            return Err(DomError::HierarchyRequest {
                parent: self.tag_name().to_owned(),
                child: child.tag_name().to_owned(),
            });
        }
        child.remove();
        *child.node.parent.borrow_mut() = Rc::downgrade(&self.node);
        self.node.children.borrow_mut().push(child.clone());
        Ok(())
    }

    /// Builder-style [`append_child`](Self::append_child).
    ///
    /// # Errors
    ///
    /// Same as `append_child`.
    pub fn with_child(self, child: &Element) -> Result<Self, DomError> {
        self.append_child(child)?;
        Ok(self)
    }

    /// Remove `child` from this element.
    ///
    /// # Errors
    ///
    /// [`DomError::NotFound`] when `child` is not a direct child.
    pub fn remove_child(&self, child: &Element) -> Result<(), DomError> {
        let mut children = self.node.children.borrow_mut();
        let Some(idx) = children.iter().position(|c| c == child) else {
            return Err(DomError::NotFound {
                parent: self.tag_name().to_owned(),
                child: child.tag_name().to_owned(),
            });
        };
        children.remove(idx);
        *child.node.parent.borrow_mut() = Weak::new();
        Ok(())
    }

    /// Detach from the parent, if any.
    pub fn remove(&self) {
        if let Some(parent) = self.parent() {
            let _ = parent.remove_child(self);
        }
    }

    /// Inclusive containment: true for `self` and every descendant.
    pub fn contains(&self, other: &Element) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(node) = cursor {
            if node == *self {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    /// All descendants in document (pre-)order, excluding `self`.
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut stack: Vec<Element> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            out.push(node);
        }
        out
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            cursor = node.parent();
            out.push(node);
        }
        out
    }

    /// Whether the element is attached to its document's tree.
    pub fn is_connected(&self) -> bool {
        self.document()
            .is_some_and(|doc| doc.document_element().contains(self))
    }

    // --- Focus ---

    /// Focus this element. Returns whether it became the active element.
    pub fn focus(&self) -> bool {
        self.focus_with(FocusOptions::default())
    }

    pub fn focus_with(&self, options: FocusOptions) -> bool {
        match self.document() {
            Some(doc) => doc.focus(self, options),
            None => false,
        }
    }

    /// Drop focus if this element is active.
    pub fn blur(&self) {
        if let Some(doc) = self.document()
            && doc.active_element().as_ref() == Some(self)
        {
            doc.blur();
        }
    }

    // --- Listeners ---

    /// Register a target/bubble-phase listener.
    pub fn add_event_listener(
        &self,
        kind: EventKind,
        listener: impl Fn(&crate::dom::DomEvent<'_>) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.node.next_listener.get());
        self.node.next_listener.set(id.0 + 1);
        self.node
            .listeners
            .borrow_mut()
            .push((id, kind, Rc::new(listener)));
        id
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.node.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _, _)| *lid != id);
        listeners.len() != before
    }

    pub(crate) fn listeners_for(&self, kind: EventKind) -> Vec<Listener> {
        self.node
            .listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, l)| Rc::clone(l))
            .collect()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.node), state);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.node.tag)?;
        if let Some(id) = self.id() {
            write!(f, " id=\"{id}\"")?;
        }
        write!(f, ">")
    }
}
