#![forbid(unsafe_code)]

//! Modal dialogs: state machine, stack, animation, focus trap, scroll lock,
//! portal lookup and props bundles.
//!
//! # Data Flow
//!
//! ```text
//! trigger click ─► Modal::open ─► StateStore ─► subscribers (host re-render)
//!                      │
//!                      ├─► ModalStack::push ─► set_stack_position (all members)
//!                      ├─► ScrollLock::lock
//!                      └─► AnimationController::start_enter ─► Scheduler
//!
//! content ref ─► FocusTrap (built) ─► next tick ─► FocusTrap::activate
//! ```
//!
//! # Example
//!
//! ```
//! use modalkit_widgets::ModalKit;
//! use modalkit_widgets::modal::ModalOptions;
//!
//! let kit = ModalKit::headless();
//! let modal = kit.create_modal(ModalOptions::new().id("confirm"));
//! modal.open();
//! assert!(modal.is_top_most());
//! assert_eq!(modal.overlay_props().z_index, 1000);
//! modal.close();
//! assert!(kit.stack().is_empty());
//! ```

pub mod animation;
pub mod config;
pub mod focus_trap;
mod instance;
pub mod portal;
pub mod props;
pub mod scroll_lock;
pub mod stack;
pub mod state;

pub use animation::{AnimationController, AnimationHooks, NoopAnimation, SkipTarget, TimedAnimation};
pub use config::{
    AnimationKind, DEFAULT_ANIMATION_DURATION, ModalConfig, ModalOptions, ModalRole,
    ScrollBehavior,
};
pub use focus_trap::{FocusTarget, FocusTrap, FocusTrapOptions, OutsideClick};
pub use instance::Modal;
pub use portal::{
    DEFAULT_PORTAL_ID, PORTAL_MARKER, PortalTarget, append_portal, cleanup_portals,
    create_portal, portal_container, remove_portal,
};
pub use props::{
    CloseButtonProps, ContainerProps, ContentProps, DescriptionProps, OverlayProps, PortalProps,
    PropsBundle, TitleProps, TriggerProps,
};
pub use scroll_lock::ScrollLock;
pub use stack::{BASE_MODAL_Z, ModalStack, StackEvent, StackEventKind, StackModal, Z_INCREMENT};
pub use state::{AnimationAction, AnimationState, ModalState, StatePatch, StateStore};
