#![forbid(unsafe_code)]

//! A single modal: lifecycle, stacking, focus wiring and props bundles.
//!
//! # Lifecycle
//!
//! | Step | `open()` | `close()` |
//! |------|----------|-----------|
//! | 1 | save focus (if `restore_focus`) | `open = false` |
//! | 2 | `open = true, mounted = true` | exit animation, or `Idle` + unmounted |
//! | 3 | enter animation, or `Entered` | leave the stack |
//! | 4 | join the stack | tear down the focus trap |
//! | 5 | lock scroll (if `prevent_scroll`) | release the scroll lock |
//! | 6 | `on_open`, `on_open_change(true)` | restore focus (if `restore_focus`) |
//! | 7 | | `on_close`, `on_open_change(false)` |
//!
//! Opening never touches the focus trap. The trap is built when the host
//! hands over the content element (see [`Modal::content_props`]) and, with
//! `auto_focus`, activated on the next scheduler tick.
//!
//! # Invariants
//!
//! 1. Stack membership matches `open` by the time `open`/`close` return.
//! 2. Repeated `open`/`close` are silent no-ops; callbacks do not re-run.
//! 3. Each modal holds at most one scroll lock reference.
//! 4. Only the top-most modal reacts to Escape; traps of covered modals are
//!    paused.
//! 5. No `RefCell` borrow is held while user callbacks run.
//! 6. A subscriber may open or close the modal from inside a notification.
//!    The interrupted transition stops at its next step; the nested one
//!    owns the remaining stack, scroll lock and callback work.
//!
//! # Failure Modes
//!
//! Operations that need an element the host has not provided yet (content,
//! overlay, container) do nothing.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use modalkit_core::dom::{Element, FocusOptions, MouseEvent};
use modalkit_core::focus::{self, SavedFocus};
use modalkit_core::id::ModalIds;
use modalkit_core::keyboard::{EscapeKeyOptions, KeyboardEvent, escape_key_handler};
use modalkit_runtime::reactive::Subscription;
use modalkit_runtime::scheduler::Scheduler;

use crate::kit::ModalKit;
use crate::modal::animation::{
    AnimationController, AnimationHooks, NoopAnimation, SkipTarget, TimedAnimation,
};
use crate::modal::config::{ModalConfig, ModalOptions};
use crate::modal::focus_trap::{FocusTrap, FocusTrapOptions, OutsideClick};
use crate::modal::portal::portal_container;
use crate::modal::props::{
    CLOSE_LABEL, CloseButtonProps, ContainerProps, ContentProps, DescriptionProps, KeyHandler,
    OverlayProps, PortalProps, RefSetter, TitleProps, TriggerProps,
};
use crate::modal::stack::{StackModal, z_index_for};
use crate::modal::state::{
    AnimationState, ModalState, StatePatch, StateStore, should_be_mounted,
};

struct ModalInner {
    kit: ModalKit,
    ids: ModalIds,
    config: RefCell<ModalConfig>,
    store: StateStore,
    animation: RefCell<Rc<dyn AnimationController>>,
    trap: RefCell<Option<FocusTrap>>,
    saved_focus: RefCell<Option<SavedFocus>>,
    holds_scroll_lock: Cell<bool>,
    /// Bumped by every `open`/`close` that changes state.
    transition: Cell<u64>,
    overlay: RefCell<Option<Element>>,
    container: RefCell<Option<Element>>,
    content: RefCell<Option<Element>>,
}

impl ModalInner {
    fn read<R>(&self, f: impl FnOnce(&ModalConfig) -> R) -> R {
        f(&self.config.borrow())
    }

    /// Clone a callback out of the config so it can run unborrowed.
    fn callback<T: Clone>(&self, pick: impl FnOnce(&ModalConfig) -> &Option<T>) -> Option<T> {
        pick(&self.config.borrow()).clone()
    }

    fn begin_transition(&self) -> u64 {
        let next = self.transition.get().wrapping_add(1);
        self.transition.set(next);
        next
    }

    /// Whether a re-entrant open/close has superseded transition `epoch`.
    fn superseded(&self, epoch: u64) -> bool {
        self.transition.get() != epoch
    }

    fn is_backdrop(&self, target: &Element) -> bool {
        self.overlay.borrow().as_ref() == Some(target)
            || self.container.borrow().as_ref() == Some(target)
    }
}

fn build_animation(
    weak: &Weak<ModalInner>,
    scheduler: &Scheduler,
    config: &ModalConfig,
) -> Rc<dyn AnimationController> {
    if !config.animated {
        return Rc::new(NoopAnimation::new());
    }
    let (on_change, on_start, on_end) = (weak.clone(), weak.clone(), weak.clone());
    let hooks = AnimationHooks::new()
        .on_state_change(move |phase| {
            if let Some(inner) = on_change.upgrade() {
                let open = inner.store.get().open;
                inner.store.set_state(
                    StatePatch::new()
                        .animation_state(phase)
                        .mounted(should_be_mounted(open, phase)),
                );
            }
        })
        .on_start(move |kind| {
            if let Some(cb) = on_start
                .upgrade()
                .and_then(|inner| inner.callback(|c| &c.on_animation_start))
            {
                cb(kind);
            }
        })
        .on_end(move |kind| {
            if let Some(cb) = on_end
                .upgrade()
                .and_then(|inner| inner.callback(|c| &c.on_animation_end))
            {
                cb(kind);
            }
        });
    Rc::new(TimedAnimation::new(
        scheduler,
        config.animation_duration,
        hooks,
    ))
}

/// Handle to one modal. Clones refer to the same modal; equality is identity.
#[derive(Clone)]
pub struct Modal {
    inner: Rc<ModalInner>,
}

impl Modal {
    pub(crate) fn new(kit: &ModalKit, options: ModalOptions) -> Self {
        let config = ModalConfig::from_options(options);
        let base = config.id.clone().unwrap_or_else(|| kit.ids().next_id());
        let initially_open = config.initially_open();

        let inner = Rc::new_cyclic(|weak| ModalInner {
            kit: kit.clone(),
            ids: ModalIds::new(base),
            animation: RefCell::new(build_animation(weak, kit.scheduler(), &config)),
            config: RefCell::new(config),
            store: StateStore::new(ModalState::initial(initially_open)),
            trap: RefCell::new(None),
            saved_focus: RefCell::new(None),
            holds_scroll_lock: Cell::new(false),
            transition: Cell::new(0),
            overlay: RefCell::new(None),
            container: RefCell::new(None),
            content: RefCell::new(None),
        });
        let modal = Self { inner };

        if initially_open {
            modal.animation().skip_to(SkipTarget::Entered);
            kit.stack().push(modal.clone());
            if modal.inner.read(|c| c.prevent_scroll) {
                modal.lock_scroll();
            }
        }
        tracing::debug!(id = %modal.id(), open = initially_open, "modal: created");
        modal
    }

    // --- Identity ---

    /// Base id; also the content element's id.
    pub fn id(&self) -> &str {
        &self.inner.ids.modal_id
    }

    /// Id wired to `aria-labelledby` by default.
    pub fn title_id(&self) -> &str {
        &self.inner.ids.title_id
    }

    /// Id wired to `aria-describedby` by default.
    pub fn description_id(&self) -> &str {
        &self.inner.ids.description_id
    }

    /// All generated ids.
    pub fn ids(&self) -> &ModalIds {
        &self.inner.ids
    }

    /// The kit this modal was created by.
    pub fn kit(&self) -> &ModalKit {
        &self.inner.kit
    }

    // --- State ---

    /// Snapshot of the current state.
    pub fn state(&self) -> ModalState {
        self.inner.store.get()
    }

    /// Observe state changes. Dropping the guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&ModalState) + 'static) -> Subscription {
        self.inner.store.subscribe(callback)
    }

    /// Whether the modal is open, regardless of any exit animation.
    pub fn is_open(&self) -> bool {
        self.state().open
    }

    /// Whether the host should keep the modal's elements rendered.
    pub fn is_mounted(&self) -> bool {
        self.state().mounted
    }

    /// 1-based stack position; 0 when closed.
    pub fn stack_order(&self) -> usize {
        self.state().stack_order
    }

    /// Whether this modal is the last one opened that is still open.
    pub fn is_top_most(&self) -> bool {
        self.state().is_top_most
    }

    /// Current animation phase.
    pub fn animation_state(&self) -> AnimationState {
        self.state().animation_state
    }

    /// Whether an enter or exit animation is in flight.
    pub fn is_animating(&self) -> bool {
        self.animation().is_animating()
    }

    fn animation(&self) -> Rc<dyn AnimationController> {
        Rc::clone(&self.inner.animation.borrow())
    }

    // --- Open / close ---

    /// Open the modal. No-op when already open.
    pub fn open(&self) {
        let inner = &self.inner;
        if inner.store.get().open {
            return;
        }
        let epoch = inner.begin_transition();
        let (restore_focus, animated, prevent_scroll) =
            inner.read(|c| (c.restore_focus, c.animated, c.prevent_scroll));

        if restore_focus {
            *inner.saved_focus.borrow_mut() = Some(SavedFocus::capture(inner.kit.document()));
        }
        inner.store.set_state(StatePatch::new().open(true).mounted(true));
        if inner.superseded(epoch) {
            return;
        }

        let animation = self.animation();
        animation.start_enter();
        if !animated {
            inner
                .store
                .set_state(StatePatch::new().animation_state(AnimationState::Entered));
        }
        if inner.superseded(epoch) {
            return;
        }

        inner.kit.stack().push(self.clone());
        if inner.superseded(epoch) {
            return;
        }
        if prevent_scroll {
            self.lock_scroll();
        }
        tracing::debug!(id = %self.id(), animated, "modal: opened");

        if let Some(cb) = inner.callback(|c| &c.on_open) {
            cb();
        }
        if let Some(cb) = inner.callback(|c| &c.on_open_change) {
            cb(true);
        }
    }

    /// Close the modal. No-op when already closed.
    pub fn close(&self) {
        let inner = &self.inner;
        if !inner.store.get().open {
            return;
        }
        let epoch = inner.begin_transition();
        let (restore_focus, animated) = inner.read(|c| (c.restore_focus, c.animated));

        // Exit starts before `open` flips so every notified state keeps
        // `mounted` consistent.
        self.animation().start_exit();
        let mut patch = StatePatch::new().open(false);
        if !animated {
            patch = patch.animation_state(AnimationState::Idle).mounted(false);
        }
        inner.store.set_state(patch);
        if inner.superseded(epoch) {
            return;
        }

        inner.kit.stack().remove(self);
        if inner.superseded(epoch) {
            return;
        }
        self.teardown_trap();
        self.unlock_scroll();

        if restore_focus {
            let saved = inner.saved_focus.borrow_mut().take();
            let final_focus = inner
                .read(|c| c.final_focus.clone())
                .and_then(|target| target.resolve());
            match final_focus {
                Some(el) => {
                    focus::focus_element(Some(&el), FocusOptions::default());
                }
                None => {
                    if let Some(saved) = saved {
                        saved.restore(true);
                    }
                }
            }
        }
        tracing::debug!(id = %self.id(), animated, "modal: closed");

        if let Some(cb) = inner.callback(|c| &c.on_close) {
            cb();
        }
        if let Some(cb) = inner.callback(|c| &c.on_open_change) {
            cb(false);
        }
    }

    /// Close when open, open when closed.
    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    fn lock_scroll(&self) {
        if !self.inner.holds_scroll_lock.replace(true) {
            self.inner.kit.scroll_lock().lock();
        }
    }

    fn unlock_scroll(&self) {
        if self.inner.holds_scroll_lock.replace(false) {
            self.inner.kit.scroll_lock().unlock();
        }
    }

    // --- Focus trap ---

    /// The focus trap, once the content element has been provided.
    pub fn focus_trap(&self) -> Option<FocusTrap> {
        self.inner.trap.borrow().clone()
    }

    fn setup_trap(&self) {
        let inner = &self.inner;
        if inner.trap.borrow().is_some() {
            return;
        }
        let Some(content) = inner.content.borrow().clone() else {
            return;
        };
        let (trap_focus, initial_focus, return_focus) =
            inner.read(|c| (c.trap_focus, c.initial_focus.clone(), c.final_focus.clone()));
        if !trap_focus {
            return;
        }

        let weak = Rc::downgrade(inner);
        let backdrop_clicks = OutsideClick::Predicate(Rc::new(move |event: &MouseEvent| {
            match (weak.upgrade(), event.target()) {
                (Some(inner), Some(target)) => inner.is_backdrop(target),
                _ => false,
            }
        }));
        let options = FocusTrapOptions {
            initial_focus,
            return_focus,
            escape_deactivates: false,
            click_outside_deactivates: false,
            allow_outside_click: backdrop_clicks,
            ..FocusTrapOptions::default()
        };
        *inner.trap.borrow_mut() = Some(FocusTrap::new(&content, inner.kit.scheduler(), options));
    }

    fn activate_trap(&self) {
        self.setup_trap();
        let Some(trap) = self.focus_trap() else {
            return;
        };
        if !trap.is_active() {
            trap.activate();
            if !self.is_top_most() {
                trap.pause();
            }
        }
    }

    fn teardown_trap(&self) {
        let trap = self.inner.trap.borrow_mut().take();
        if let Some(trap) = trap {
            trap.deactivate();
        }
    }

    // --- Focus operations ---

    /// Focus the first focusable element in the content, if any.
    pub fn focus_first(&self) {
        let content = self.inner.content.borrow().clone();
        if let Some(first) = content.as_ref().and_then(focus::first_focusable) {
            focus::focus_element(Some(&first), FocusOptions::default());
        }
    }

    /// Focus the last focusable element in the content, if any.
    pub fn focus_last(&self) {
        let content = self.inner.content.borrow().clone();
        if let Some(last) = content.as_ref().and_then(focus::last_focusable) {
            focus::focus_element(Some(&last), FocusOptions::default());
        }
    }

    /// Whether `element` is the content element or inside it.
    pub fn contains(&self, element: Option<&Element>) -> bool {
        focus::contains(self.inner.content.borrow().as_ref(), element)
    }

    /// The element last handed over through the content ref.
    pub fn content_element(&self) -> Option<Element> {
        self.inner.content.borrow().clone()
    }

    /// Container the modal's portal content mounts into, or `None` when
    /// portalling is disabled.
    pub fn portal_target(&self) -> Option<Element> {
        let (disabled, target) = self
            .inner
            .read(|c| (c.disable_portal, c.portal_target.clone()));
        if disabled {
            return None;
        }
        Some(portal_container(self.inner.kit.document(), target.as_ref()))
    }

    // --- Event handling ---

    fn handle_backdrop_click(&self, event: &MouseEvent) {
        let Some(target) = event.target() else {
            return;
        };
        if !self.inner.is_backdrop(target) {
            return;
        }
        if let Some(cb) = self.inner.callback(|c| &c.on_overlay_click) {
            cb(event);
        }
        if self.inner.read(|c| c.close_on_overlay_click) && !event.default_prevented() {
            self.close();
        }
    }

    fn handle_content_ref(&self, element: Option<&Element>) {
        let inner = &self.inner;
        *inner.content.borrow_mut() = element.cloned();
        if element.is_none() || !self.is_open() || inner.trap.borrow().is_some() {
            return;
        }
        self.setup_trap();
        if inner.read(|c| c.auto_focus) {
            let weak = Rc::downgrade(inner);
            inner.kit.scheduler().defer(move || {
                if let Some(inner) = weak.upgrade() {
                    let modal = Modal { inner };
                    if modal.is_open() {
                        modal.activate_trap();
                    }
                }
            });
        }
    }

    /// Wrap `f` in a handler that holds the modal weakly.
    fn bind<E: 'static>(&self, f: fn(&Modal, &E)) -> Rc<dyn Fn(&E)> {
        let weak = Rc::downgrade(&self.inner);
        Rc::new(move |event: &E| {
            if let Some(inner) = weak.upgrade() {
                f(&Modal { inner }, event);
            }
        })
    }

    fn bind_ref(&self, f: fn(&Modal, Option<&Element>)) -> RefSetter {
        let weak = Rc::downgrade(&self.inner);
        Rc::new(move |element: Option<&Element>| {
            if let Some(inner) = weak.upgrade() {
                f(&Modal { inner }, element);
            }
        })
    }

    fn escape_handler(&self) -> KeyHandler {
        let weak = Rc::downgrade(&self.inner);
        let (w_close, w_key, w_top) = (weak.clone(), weak.clone(), weak.clone());
        let options = EscapeKeyOptions {
            close_on_escape: Rc::new(move || {
                w_close
                    .upgrade()
                    .is_some_and(|inner| inner.read(|c| c.close_on_escape))
            }),
            on_escape_key_down: Some(Rc::new(move |event: &KeyboardEvent| {
                if let Some(cb) = w_key
                    .upgrade()
                    .and_then(|inner| inner.callback(|c| &c.on_escape_key_down))
                {
                    cb(event);
                }
            })),
            on_close: Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Modal { inner }.close();
                }
            }),
            is_top_most: Rc::new(move || {
                w_top
                    .upgrade()
                    .is_some_and(|inner| inner.store.get().is_top_most)
            }),
        };
        Rc::new(escape_key_handler(options))
    }

    // --- Props ---

    /// Props for the portal wrapper.
    pub fn portal_props(&self) -> PortalProps {
        PortalProps {
            data_state: self.animation_state(),
        }
    }

    /// Props for the backdrop. Clicking it closes unless vetoed.
    pub fn overlay_props(&self) -> OverlayProps {
        let state = self.state();
        OverlayProps {
            data_state: state.animation_state,
            z_index: z_index_for(state.stack_order),
            on_click: self.bind(Modal::handle_backdrop_click),
            set_ref: self.bind_ref(|modal, el| *modal.inner.overlay.borrow_mut() = el.cloned()),
        }
    }

    /// Props for the positioning container, layered above the overlay.
    pub fn container_props(&self) -> ContainerProps {
        let state = self.state();
        ContainerProps {
            data_state: state.animation_state,
            z_index: z_index_for(state.stack_order).saturating_add(1),
            overflow: self.inner.read(|c| c.scroll_behavior.overflow()),
            on_click: self.bind(Modal::handle_backdrop_click),
            set_ref: self.bind_ref(|modal, el| *modal.inner.container.borrow_mut() = el.cloned()),
        }
    }

    /// Props for the dialog element. Its ref wires up the focus trap.
    pub fn content_props(&self) -> ContentProps {
        let ids = &self.inner.ids;
        let (role, aria_label, labelledby, describedby) = self.inner.read(|c| {
            (
                c.role,
                c.aria_label.clone(),
                c.aria_labelledby.clone(),
                c.aria_describedby.clone(),
            )
        });
        ContentProps {
            role,
            aria_label,
            aria_labelledby: Some(labelledby.unwrap_or_else(|| ids.title_id.clone())),
            aria_describedby: Some(describedby.unwrap_or_else(|| ids.description_id.clone())),
            data_state: self.animation_state(),
            on_key_down: self.escape_handler(),
            set_ref: self.bind_ref(Modal::handle_content_ref),
        }
    }

    /// Props for the heading referenced by `aria-labelledby`.
    pub fn title_props(&self) -> TitleProps {
        TitleProps {
            id: self.inner.ids.title_id.clone(),
        }
    }

    /// Title props with a caller-chosen id.
    pub fn title_props_with_id(&self, id: impl Into<String>) -> TitleProps {
        TitleProps { id: id.into() }
    }

    /// Props for the text referenced by `aria-describedby`.
    pub fn description_props(&self) -> DescriptionProps {
        DescriptionProps {
            id: self.inner.ids.description_id.clone(),
        }
    }

    /// Description props with a caller-chosen id.
    pub fn description_props_with_id(&self, id: impl Into<String>) -> DescriptionProps {
        DescriptionProps { id: id.into() }
    }

    /// Props for a button that closes the modal.
    pub fn close_button_props(&self) -> CloseButtonProps {
        CloseButtonProps {
            aria_label: CLOSE_LABEL.to_owned(),
            on_click: self.bind::<MouseEvent>(|modal, _| modal.close()),
        }
    }

    /// Props for the element that opens the modal.
    pub fn trigger_props(&self) -> TriggerProps {
        TriggerProps {
            aria_expanded: self.is_open(),
            on_click: self.bind::<MouseEvent>(|modal, _| modal.open()),
        }
    }

    // --- Config ---

    /// Copy of the live configuration.
    pub fn config(&self) -> ModalConfig {
        self.inner.config.borrow().clone()
    }

    /// Merge `options` into the live configuration. Handlers created
    /// earlier see the new values.
    pub fn set_config(&self, options: ModalOptions) {
        let rebuild = options.touches_animation();
        self.inner.config.borrow_mut().merge(options);
        if rebuild {
            self.rebuild_animation();
        }
    }

    fn rebuild_animation(&self) {
        let inner = &self.inner;
        let next = {
            let config = inner.config.borrow();
            build_animation(&Rc::downgrade(inner), inner.kit.scheduler(), &config)
        };
        let previous = inner.animation.replace(Rc::clone(&next));
        previous.destroy();

        let state = inner.store.get();
        if state.open {
            inner.store.set_state(
                StatePatch::new()
                    .animation_state(AnimationState::Entered)
                    .mounted(true),
            );
            next.skip_to(SkipTarget::Entered);
        } else if state.animation_state != AnimationState::Idle {
            inner.store.set_state(
                StatePatch::new()
                    .animation_state(AnimationState::Idle)
                    .mounted(false),
            );
        }
    }

    // --- Teardown ---

    /// Close if open, then drop the trap, the animation and element refs.
    ///
    /// An exit animation cut short here settles the state to `Idle`, so a
    /// host waiting for `mounted == false` still unmounts.
    pub fn destroy(&self) {
        self.close();
        self.teardown_trap();
        self.animation().destroy();
        let inner = &self.inner;
        let state = inner.store.get();
        if !state.open && state.animation_state != AnimationState::Idle {
            inner.store.set_state(
                StatePatch::new()
                    .animation_state(AnimationState::Idle)
                    .mounted(should_be_mounted(false, AnimationState::Idle)),
            );
        }
        *inner.overlay.borrow_mut() = None;
        *inner.container.borrow_mut() = None;
        *inner.content.borrow_mut() = None;
        tracing::debug!(id = %self.id(), "modal: destroyed");
    }
}

impl StackModal for Modal {
    fn set_stack_position(&self, order: usize, is_top_most: bool) {
        self.inner
            .store
            .set_state(StatePatch::new().stack_position(order, is_top_most));
        // Subscribers may have moved the modal again; follow the live state.
        let state = self.state();
        if let Some(trap) = self.focus_trap() {
            if state.is_top_most || state.stack_order == 0 {
                trap.unpause();
            } else {
                trap.pause();
            }
        }
    }

    fn close(&self) {
        Modal::close(self);
    }
}

impl PartialEq for Modal {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Modal {}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("id", &self.id())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::props::PropsBundle;
    use std::time::Duration;

    fn kit() -> ModalKit {
        ModalKit::headless()
    }

    #[test]
    fn open_close_round_trip() {
        let kit = kit();
        let modal = kit.create_modal(ModalOptions::new());
        assert!(!modal.is_open());
        assert!(!modal.is_mounted());

        modal.open();
        let state = modal.state();
        assert!(state.open && state.mounted);
        assert_eq!(state.animation_state, AnimationState::Entered);
        assert_eq!(state.stack_order, 1);
        assert!(state.is_top_most);
        assert!(kit.scroll_lock().is_locked());

        modal.close();
        let state = modal.state();
        assert!(!state.open && !state.mounted);
        assert_eq!(state.animation_state, AnimationState::Idle);
        assert_eq!(state.stack_order, 0);
        assert!(kit.stack().is_empty());
        assert!(!kit.scroll_lock().is_locked());
    }

    #[test]
    fn default_open_joins_stack_without_callbacks() {
        let kit = kit();
        let opened = Rc::new(Cell::new(false));
        let o = Rc::clone(&opened);
        let modal = kit.create_modal(
            ModalOptions::new()
                .default_open(true)
                .on_open(move || o.set(true)),
        );
        assert!(modal.is_open());
        assert!(modal.is_top_most());
        assert!(!opened.get());
        assert!(kit.scroll_lock().is_locked());
        modal.close();
        assert!(!kit.scroll_lock().is_locked());
    }

    #[test]
    fn explicit_open_overrides_default_open() {
        let modal = kit().create_modal(ModalOptions::new().open(false).default_open(true));
        assert!(!modal.is_open());
    }

    #[test]
    fn scroll_lock_released_even_if_config_changed() {
        let kit = kit();
        let modal = kit.create_modal(ModalOptions::new());
        modal.open();
        modal.set_config(ModalOptions::new().prevent_scroll(false));
        modal.close();
        assert_eq!(kit.scroll_lock().count(), 0);
    }

    #[test]
    fn animated_mounted_follows_exit() {
        let kit = kit();
        let modal = kit.create_modal(
            ModalOptions::new()
                .animated(true)
                .animation_duration(Duration::from_millis(100)),
        );
        modal.open();
        assert_eq!(modal.animation_state(), AnimationState::Entering);
        assert!(modal.is_animating());
        kit.scheduler().advance(Duration::from_millis(100));
        assert_eq!(modal.animation_state(), AnimationState::Entered);

        modal.close();
        assert_eq!(modal.animation_state(), AnimationState::Exiting);
        assert!(modal.is_mounted());
        assert!(modal.state().is_consistent());
        kit.scheduler().advance(Duration::from_millis(100));
        assert_eq!(modal.animation_state(), AnimationState::Idle);
        assert!(!modal.is_mounted());
    }

    #[test]
    fn toggling_animation_settles_in_flight_phase() {
        let kit = kit();
        let modal = kit.create_modal(ModalOptions::new().animated(true));
        modal.open();
        modal.set_config(ModalOptions::new().animated(false));
        assert_eq!(modal.animation_state(), AnimationState::Entered);
        assert!(!modal.is_animating());
        kit.scheduler().run_all();
        assert_eq!(modal.animation_state(), AnimationState::Entered);
    }

    #[test]
    fn content_props_default_aria_wiring() {
        let modal = kit().create_modal(ModalOptions::new().id("prefs"));
        let attrs = modal.content_props().attributes();
        assert!(attrs.contains(&("aria-labelledby", "prefs-title".to_owned())));
        assert!(attrs.contains(&("aria-describedby", "prefs-description".to_owned())));

        modal.set_config(ModalOptions::new().aria_label("Preferences"));
        let attrs = modal.content_props().attributes();
        assert!(attrs.contains(&("aria-label", "Preferences".to_owned())));
        assert!(!attrs.iter().any(|(name, _)| *name == "aria-labelledby"));
    }

    #[test]
    fn z_index_tracks_stack_order() {
        let kit = kit();
        let a = kit.create_modal(ModalOptions::new());
        let b = kit.create_modal(ModalOptions::new());
        a.open();
        b.open();
        assert_eq!(a.overlay_props().z_index, 1000);
        assert_eq!(a.container_props().z_index, 1001);
        assert_eq!(b.overlay_props().z_index, 1010);
    }

    #[test]
    fn trigger_props_reflect_open_state() {
        let modal = kit().create_modal(ModalOptions::new());
        assert!(!modal.trigger_props().aria_expanded);
        modal.open();
        assert!(modal.trigger_props().aria_expanded);
    }

    #[test]
    fn focus_ops_without_content_are_noops() {
        let kit = kit();
        let modal = kit.create_modal(ModalOptions::new());
        modal.focus_first();
        modal.focus_last();
        assert!(!modal.contains(None));
        assert!(!modal.contains(Some(&kit.document().body())));
    }

    #[test]
    fn disabled_portal_has_no_target() {
        let kit = kit();
        let modal = kit.create_modal(ModalOptions::new());
        assert!(modal.portal_target().is_some());
        modal.set_config(ModalOptions::new().disable_portal(true));
        assert!(modal.portal_target().is_none());
    }

    #[test]
    fn destroy_closes_and_clears_refs() {
        let kit = kit();
        let modal = kit.create_modal(ModalOptions::new());
        let content = kit.document().create_element("div");
        kit.document().body().append_child(&content).unwrap();
        modal.open();
        modal.content_props().attach(&content);
        assert!(modal.content_element().is_some());

        modal.destroy();
        assert!(!modal.is_open());
        assert!(modal.content_element().is_none());
        assert!(modal.focus_trap().is_none());
        modal.destroy();
    }

    #[test]
    fn destroy_during_exit_settles_to_unmounted() {
        let kit = kit();
        let modal = kit.create_modal(ModalOptions::new().animated(true));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = modal.subscribe(move |state| s.borrow_mut().push(*state));

        modal.open();
        kit.scheduler().advance(Duration::from_millis(200));
        modal.close();
        assert_eq!(modal.animation_state(), AnimationState::Exiting);

        modal.destroy();
        kit.scheduler().run_all();
        let state = modal.state();
        assert_eq!(state.animation_state, AnimationState::Idle);
        assert!(!state.mounted);
        assert!(!modal.is_animating());
        assert!(seen.borrow().iter().all(|state| state.is_consistent()));
        assert!(!seen.borrow().last().is_some_and(|s| s.mounted));
    }
}
