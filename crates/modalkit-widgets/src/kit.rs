#![forbid(unsafe_code)]

//! Composition root shared by every modal of one application.
//!
//! A [`ModalKit`] owns the resources modals coordinate through: the document,
//! the scheduler, the modal stack, the scroll lock and the id generator.
//! Clones share all of them. [`ModalKit::global`] returns a thread-local
//! default for hosts that want one stack per application without wiring.

use std::fmt;

use modalkit_core::dom::{Document, Element};
use modalkit_core::id::IdGenerator;
use modalkit_runtime::scheduler::Scheduler;

use crate::modal::config::ModalOptions;
use crate::modal::focus_trap::{FocusTrap, FocusTrapOptions};
use crate::modal::Modal;
use crate::modal::scroll_lock::ScrollLock;
use crate::modal::stack::ModalStack;

thread_local! {
    static GLOBAL_KIT: ModalKit = ModalKit::headless();
}

/// Shared modal environment.
#[derive(Clone)]
pub struct ModalKit {
    document: Document,
    scheduler: Scheduler,
    stack: ModalStack<Modal>,
    scroll_lock: ScrollLock,
    ids: IdGenerator,
}

impl ModalKit {
    /// Kit bound to an existing document and scheduler.
    #[must_use]
    pub fn new(document: &Document, scheduler: &Scheduler) -> Self {
        Self {
            document: document.clone(),
            scheduler: scheduler.clone(),
            stack: ModalStack::new(),
            scroll_lock: ScrollLock::new(document),
            ids: IdGenerator::new("modal"),
        }
    }

    /// Kit over a fresh document and scheduler.
    #[must_use]
    pub fn headless() -> Self {
        Self::new(&Document::new(), &Scheduler::new())
    }

    /// The thread-local default kit.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_KIT.with(Clone::clone)
    }

    /// Use the fixed-body scroll lock strategy.
    #[must_use]
    pub fn with_fixed_body_scroll_lock(mut self, enabled: bool) -> Self {
        self.scroll_lock = ScrollLock::new(&self.document).with_fixed_body(enabled);
        self
    }

    /// Replace the id generator, e.g. to isolate ids between tests.
    #[must_use]
    pub fn with_ids(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    /// The document every modal of this kit works against.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Clock for animations and deferred focus work; the host advances it.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Open modals, bottom to top.
    pub fn stack(&self) -> &ModalStack<Modal> {
        &self.stack
    }

    /// Body scroll lock shared by all modals.
    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.scroll_lock
    }

    /// Generator for modal ids without an explicit `id`.
    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    /// Create a modal; it opens immediately when `open`/`default_open` says so.
    pub fn create_modal(&self, options: ModalOptions) -> Modal {
        Modal::new(self, options)
    }

    /// Create a standalone focus trap on this kit's scheduler.
    pub fn create_focus_trap(&self, container: &Element, options: FocusTrapOptions) -> FocusTrap {
        FocusTrap::new(container, &self.scheduler, options)
    }
}

impl Default for ModalKit {
    fn default() -> Self {
        Self::headless()
    }
}

impl fmt::Debug for ModalKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalKit")
            .field("open_modals", &self.stack.count())
            .field("scroll_lock", &self.scroll_lock)
            .field("id_prefix", &self.ids.prefix())
            .finish_non_exhaustive()
    }
}
