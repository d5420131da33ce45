#![no_main]

//! Drive a small set of modals with arbitrary host actions and check the
//! stack, scroll lock and focus trap never disagree with modal state.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use modalkit_core::dom::Element;
use modalkit_core::keyboard::KeyboardEvent;
use modalkit_widgets::ModalKit;
use modalkit_widgets::modal::{Modal, ModalOptions, PropsBundle};
use std::time::Duration;

const MODALS: usize = 3;

#[derive(Debug, Arbitrary)]
struct Input {
    animated: [bool; MODALS],
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Open(u8),
    Close(u8),
    Toggle(u8),
    Mount(u8),
    Tab { shift: bool },
    Escape,
    ClickOverlay(u8),
    ClickOutside,
    Advance(u16),
    Flush,
    CloseAll,
    Destroy(u8),
}

struct Rendered {
    modal: Modal,
    overlay: Element,
    content: Element,
}

fn pick(idx: u8) -> usize {
    usize::from(idx) % MODALS
}

fuzz_target!(|input: Input| {
    if input.ops.len() > 256 {
        return;
    }
    let kit = ModalKit::headless();
    let doc = kit.document().clone();
    let outside = doc.create_element("button");
    let _ = doc.body().append_child(&outside);

    let rendered: Vec<Rendered> = input
        .animated
        .iter()
        .map(|&animated| {
            let modal = kit.create_modal(ModalOptions::new().animated(animated));
            let overlay = doc.create_element("div");
            let content = doc.create_element("div");
            for _ in 0..2 {
                let _ = content.append_child(&doc.create_element("button"));
            }
            let _ = doc.body().append_child(&overlay);
            let _ = doc.body().append_child(&content);
            Rendered {
                modal,
                overlay,
                content,
            }
        })
        .collect();

    for op in input.ops {
        match op {
            Op::Open(i) => rendered[pick(i)].modal.open(),
            Op::Close(i) => rendered[pick(i)].modal.close(),
            Op::Toggle(i) => rendered[pick(i)].modal.toggle(),
            Op::Mount(i) => {
                let r = &rendered[pick(i)];
                r.modal.overlay_props().attach(&r.overlay);
                r.modal.content_props().attach(&r.content);
            }
            Op::Tab { shift } => {
                let key = KeyboardEvent::new("Tab");
                doc.press(if shift { key.with_shift() } else { key });
            }
            Op::Escape => {
                doc.press(KeyboardEvent::new("Escape"));
            }
            Op::ClickOverlay(i) => {
                doc.click(&rendered[pick(i)].overlay);
            }
            Op::ClickOutside => {
                doc.click(&outside);
            }
            Op::Advance(ms) => {
                kit.scheduler().advance(Duration::from_millis(u64::from(ms)));
            }
            Op::Flush => {
                kit.scheduler().flush();
            }
            Op::CloseAll => kit.stack().close_all(),
            Op::Destroy(i) => rendered[pick(i)].modal.destroy(),
        }

        let stack = kit.stack().all();
        let open = rendered.iter().filter(|r| r.modal.is_open()).count();
        assert_eq!(stack.len(), open);
        assert_eq!(kit.scroll_lock().count(), open);
        for (idx, member) in stack.iter().enumerate() {
            assert_eq!(member.stack_order(), idx + 1);
            assert_eq!(member.is_top_most(), idx + 1 == stack.len());
        }
        for r in &rendered {
            assert!(r.modal.state().is_consistent());
            if !r.modal.is_open() {
                assert!(r.modal.focus_trap().is_none());
            }
            if let Some(trap) = r.modal.focus_trap()
                && trap.is_active()
            {
                assert_eq!(trap.is_paused(), !r.modal.is_top_most());
            }
        }
    }
});
