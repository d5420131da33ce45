#![forbid(unsafe_code)]

//! Headless modal dialogs.
//!
//! Everything a host needs to drive accessible modals without a rendering
//! framework: the per-modal state machine, the stack that orders open
//! modals, focus containment and restoration, body scroll locking, and the
//! attribute/handler bundles ("props") the host attaches to its elements.
//!
//! Start from a [`ModalKit`], which owns the shared document, scheduler,
//! stack, scroll lock and id generator.

pub mod kit;
pub mod modal;

pub use kit::ModalKit;
pub use modal::{
    AnimationState, FocusTarget, FocusTrap, FocusTrapOptions, Modal, ModalConfig, ModalOptions,
    ModalRole, ModalState, PortalTarget, PropsBundle, ScrollBehavior,
};
