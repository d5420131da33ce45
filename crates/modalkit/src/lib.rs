#![forbid(unsafe_code)]

//! modalkit public facade.
//!
//! Re-exports the member crates and a [`prelude`] with the types most hosts
//! touch.
//!
//! ```
//! use modalkit::prelude::*;
//!
//! let kit = ModalKit::headless();
//! let modal = kit.create_modal(ModalOptions::new());
//! let content = kit.document().create_element("div");
//! kit.document().body().append_child(&content).unwrap();
//!
//! modal.open();
//! modal.content_props().attach(&content);
//! kit.scheduler().flush();
//! assert_eq!(kit.document().active_element(), Some(content));
//!
//! kit.document().press(KeyboardEvent::new("Escape"));
//! assert!(!modal.is_open());
//! ```

pub use modalkit_core;
pub use modalkit_runtime;
pub use modalkit_widgets;

pub use modalkit_core::{Document, Element, KeyboardEvent};
pub use modalkit_runtime::Scheduler;
pub use modalkit_widgets::{Modal, ModalKit, ModalOptions};

pub mod prelude {
    pub use modalkit_core::dom::{Document, DomEvent, Element, EventKind, FocusOptions};
    pub use modalkit_core::keyboard::KeyboardEvent;
    pub use modalkit_runtime::scheduler::Scheduler;
    pub use modalkit_widgets::modal::{
        AnimationState, FocusTrap, FocusTrapOptions, Modal, ModalOptions, ModalRole, ModalState,
        PropsBundle, ScrollBehavior,
    };
    pub use modalkit_widgets::ModalKit;
}
