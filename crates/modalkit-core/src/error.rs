#![forbid(unsafe_code)]

//! Errors reported by the headless document model.
//!
//! Modal operations never fail; they degrade to no-ops. Only structural
//! misuse of the element tree (the same cases a browser reports as
//! `HierarchyRequestError` / `NotFoundError`) surfaces as [`DomError`].

/// Structural error from an element tree mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Inserting the child would make a node its own ancestor.
    #[error("cannot insert <{child}> into <{parent}>: the node would become its own ancestor")]
    HierarchyRequest { parent: String, child: String },
    /// The node was created by another document.
    #[error("<{0}> belongs to a different document")]
    WrongDocument(String),
    /// The node is not a child of the given parent.
    #[error("<{child}> is not a child of <{parent}>")]
    NotFound { parent: String, child: String },
}
