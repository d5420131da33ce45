//! End-to-end host flow: render elements, attach props bundles, drive the
//! modal through trigger clicks, keyboard and backdrop clicks.

use std::cell::Cell;
use std::rc::Rc;

use modalkit_core::dom::{Element, EventKind};
use modalkit_core::keyboard::KeyboardEvent;
use modalkit_widgets::modal::{DEFAULT_PORTAL_ID, Modal, ModalOptions, PropsBundle};
use modalkit_widgets::ModalKit;

struct Host {
    kit: ModalKit,
    modal: Modal,
    trigger: Element,
    outside: Element,
    overlay: Element,
    container: Element,
    content: Element,
    first: Element,
    second: Element,
    close: Element,
}

impl Host {
    fn new(options: ModalOptions) -> Self {
        let kit = ModalKit::headless();
        let doc = kit.document().clone();
        let trigger = doc.create_element("button");
        let outside = doc.create_element("button");
        doc.body().append_child(&trigger).unwrap();
        doc.body().append_child(&outside).unwrap();

        let modal = kit.create_modal(options);
        modal.trigger_props().attach(&trigger);

        let portal = modal.portal_target().expect("portal enabled");
        let overlay = doc.create_element("div");
        let container = doc.create_element("div");
        let content = doc.create_element("div");
        let first = doc.create_element("button");
        let second = doc.create_element("input");
        let close = doc.create_element("button");
        portal.append_child(&overlay).unwrap();
        portal.append_child(&container).unwrap();
        container.append_child(&content).unwrap();
        for el in [&first, &second, &close] {
            content.append_child(el).unwrap();
        }

        Self {
            kit,
            modal,
            trigger,
            outside,
            overlay,
            container,
            content,
            first,
            second,
            close,
        }
    }

    /// What a host does after the open state flips: attach every bundle and
    /// let the deferred trap activation run.
    fn render_open(&self) {
        self.modal.overlay_props().attach(&self.overlay);
        self.modal.container_props().attach(&self.container);
        self.modal.content_props().attach(&self.content);
        self.modal.close_button_props().attach(&self.close);
        self.kit.scheduler().flush();
    }

    fn open_from_trigger(&self) {
        self.trigger.focus();
        self.kit.document().click(&self.trigger);
        assert!(self.modal.is_open());
        self.render_open();
    }

    fn active(&self) -> Option<Element> {
        self.kit.document().active_element()
    }

    fn press(&self, key: KeyboardEvent) -> KeyboardEvent {
        self.kit.document().press(key)
    }
}

#[test]
fn trigger_opens_and_trap_focuses_first_element() {
    let host = Host::new(ModalOptions::new());
    host.open_from_trigger();

    assert_eq!(host.active(), Some(host.first.clone()));
    let trap = host.modal.focus_trap().expect("trap built on content ref");
    assert!(trap.is_active());
    assert!(!trap.is_paused());
    assert_eq!(host.content.attribute("role").as_deref(), Some("dialog"));
    assert_eq!(host.content.attribute("aria-modal").as_deref(), Some("true"));
    assert_eq!(host.overlay.style("z-index"), "1000");
    assert_eq!(host.container.style("z-index"), "1001");
    assert_eq!(host.kit.document().body().style("overflow"), "hidden");
}

#[test]
fn tab_cycles_inside_the_content() {
    let host = Host::new(ModalOptions::new());
    host.open_from_trigger();

    host.press(KeyboardEvent::new("Tab"));
    assert_eq!(host.active(), Some(host.second.clone()));
    host.press(KeyboardEvent::new("Tab"));
    assert_eq!(host.active(), Some(host.close.clone()));

    let wrapped = host.press(KeyboardEvent::new("Tab"));
    assert!(wrapped.default_prevented());
    assert_eq!(host.active(), Some(host.first.clone()));

    host.press(KeyboardEvent::new("Tab").with_shift());
    assert_eq!(host.active(), Some(host.close.clone()));
}

#[test]
fn escape_closes_and_restores_trigger_focus() {
    let host = Host::new(ModalOptions::new());
    host.open_from_trigger();

    let event = host.press(KeyboardEvent::new("Escape"));
    assert!(event.default_prevented());
    assert!(!host.modal.is_open());
    assert!(host.kit.stack().is_empty());
    assert_eq!(host.active(), Some(host.trigger.clone()));
    assert_eq!(host.kit.document().capture_listener_count(), 0);
    assert_eq!(host.kit.document().body().style("overflow"), "");
}

#[test]
fn escape_veto_keeps_modal_open() {
    let host = Host::new(ModalOptions::new().on_escape_key_down(|event| event.prevent_default()));
    host.open_from_trigger();

    host.press(KeyboardEvent::new("Escape"));
    assert!(host.modal.is_open());
}

#[test]
fn escape_disabled_by_config_change() {
    let host = Host::new(ModalOptions::new());
    host.open_from_trigger();
    host.modal
        .set_config(ModalOptions::new().close_on_escape(false));

    host.press(KeyboardEvent::new("Escape"));
    assert!(host.modal.is_open());
}

#[test]
fn overlay_and_container_clicks_close() {
    let host = Host::new(ModalOptions::new());
    host.open_from_trigger();
    host.kit.document().click(&host.overlay);
    assert!(!host.modal.is_open());

    host.open_from_trigger();
    host.kit.document().click(&host.container);
    assert!(!host.modal.is_open());
}

#[test]
fn click_inside_content_keeps_modal_open() {
    let host = Host::new(ModalOptions::new());
    host.open_from_trigger();
    host.kit.document().click(&host.second);
    host.kit.document().click(&host.content);
    assert!(host.modal.is_open());
}

#[test]
fn overlay_click_respects_config_and_veto() {
    let seen = Rc::new(Cell::new(0));
    let s = Rc::clone(&seen);
    let host = Host::new(ModalOptions::new().on_overlay_click(move |event| {
        s.set(s.get() + 1);
        event.prevent_default();
    }));
    host.open_from_trigger();

    host.kit.document().click(&host.overlay);
    assert_eq!(seen.get(), 1);
    assert!(host.modal.is_open());

    let host = Host::new(ModalOptions::new().close_on_overlay_click(false));
    host.open_from_trigger();
    host.kit.document().click(&host.overlay);
    assert!(host.modal.is_open());
}

#[test]
fn close_button_closes() {
    let host = Host::new(ModalOptions::new());
    host.open_from_trigger();
    assert_eq!(host.close.attribute("aria-label").as_deref(), Some("Close"));

    host.kit.document().click(&host.close);
    assert!(!host.modal.is_open());
    assert_eq!(host.active(), Some(host.trigger.clone()));
}

#[test]
fn outside_clicks_are_blocked_while_open() {
    let host = Host::new(ModalOptions::new());
    let clicks = Rc::new(Cell::new(0));
    let c = Rc::clone(&clicks);
    host.outside
        .add_event_listener(EventKind::Click, move |_| c.set(c.get() + 1));

    host.open_from_trigger();
    let event = host.kit.document().click(&host.outside);
    assert!(event.default_prevented());
    assert_eq!(clicks.get(), 0);
    assert!(host.modal.is_open());

    host.modal.close();
    host.kit.document().click(&host.outside);
    assert_eq!(clicks.get(), 1);
}

#[test]
fn focus_escaping_the_content_is_pulled_back() {
    let host = Host::new(ModalOptions::new());
    host.open_from_trigger();
    host.second.focus();

    assert!(!host.outside.focus());
    assert_eq!(host.active(), Some(host.first.clone()));

    host.kit.scheduler().flush();
    assert!(!host.trigger.focus());
    assert_eq!(host.active(), Some(host.first.clone()));
}

#[test]
fn initial_and_final_focus_targets() {
    let host = Host::new(ModalOptions::new());
    host.modal.set_config(
        ModalOptions::new()
            .initial_focus(host.second.clone().into())
            .final_focus(host.outside.clone().into()),
    );
    host.open_from_trigger();
    assert_eq!(host.active(), Some(host.second.clone()));

    host.modal.close();
    assert_eq!(host.active(), Some(host.outside.clone()));
}

#[test]
fn without_restore_focus_the_trigger_is_not_refocused() {
    let host = Host::new(ModalOptions::new().restore_focus(false).trap_focus(false));
    host.open_from_trigger();
    assert!(host.modal.focus_trap().is_none());

    host.first.focus();
    host.modal.close();
    assert_eq!(host.active(), Some(host.first.clone()));
}

#[test]
fn auto_focus_off_builds_an_inactive_trap() {
    let host = Host::new(ModalOptions::new().auto_focus(false));
    host.open_from_trigger();
    let trap = host.modal.focus_trap().expect("trap built");
    assert!(!trap.is_active());
    assert_eq!(host.active(), Some(host.trigger.clone()));
}

#[test]
fn focus_first_and_last() {
    let host = Host::new(ModalOptions::new());
    host.open_from_trigger();
    host.modal.focus_last();
    assert_eq!(host.active(), Some(host.close.clone()));
    host.modal.focus_first();
    assert_eq!(host.active(), Some(host.first.clone()));
    assert!(host.modal.contains(Some(&host.second)));
    assert!(!host.modal.contains(Some(&host.overlay)));
}

#[test]
fn reopening_rebuilds_the_trap() {
    let host = Host::new(ModalOptions::new());
    host.open_from_trigger();
    host.press(KeyboardEvent::new("Escape"));
    assert!(host.modal.focus_trap().is_none());

    host.open_from_trigger();
    assert!(host.modal.focus_trap().is_some_and(|t| t.is_active()));
    assert_eq!(host.active(), Some(host.first.clone()));
}

#[test]
fn content_mounted_while_closed_builds_no_trap() {
    let host = Host::new(ModalOptions::new());
    host.modal.content_props().attach(&host.content);
    host.kit.scheduler().flush();
    assert!(host.modal.focus_trap().is_none());
}

#[test]
fn portal_root_is_shared_and_marked() {
    let host = Host::new(ModalOptions::new());
    let root = host
        .kit
        .document()
        .get_element_by_id(DEFAULT_PORTAL_ID)
        .expect("default root created");
    assert_eq!(host.overlay.parent(), Some(root.clone()));
    host.modal.portal_props().apply(&root);
    assert_eq!(root.attribute("data-state").as_deref(), Some("idle"));

    let other = host.kit.create_modal(ModalOptions::new());
    assert_eq!(other.portal_target(), Some(root));
}
