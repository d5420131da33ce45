//! Benchmarks for modal stacking and focus trap hot paths.
//!
//! Run with: `cargo bench --package modalkit-widgets --bench stack_bench`
//!
//! # Performance Baselines
//!
//! These benchmarks establish baselines for:
//! - Opening and closing N stacked modals (renumbering is O(N) per change)
//! - Props bundle construction for a stacked modal
//! - Tab handling inside an active focus trap with many focusables

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use modalkit_core::keyboard::KeyboardEvent;
use modalkit_widgets::ModalKit;
use modalkit_widgets::modal::{Modal, ModalOptions, PropsBundle};
use std::hint::black_box;

// ============================================================================
// Stack Benchmarks
// ============================================================================

fn open_modals(kit: &ModalKit, n: usize) -> Vec<Modal> {
    (0..n)
        .map(|_| kit.create_modal(ModalOptions::new()))
        .collect()
}

fn bench_open_close_stack(c: &mut Criterion) {
    let mut group = c.benchmark_group("stack/open_close");
    for depth in [1usize, 4, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let kit = ModalKit::headless();
            let modals = open_modals(&kit, depth);
            b.iter(|| {
                for modal in &modals {
                    modal.open();
                }
                black_box(kit.stack().count());
                kit.stack().close_all();
            });
        });
    }
    group.finish();
}

fn bench_close_middle(c: &mut Criterion) {
    let mut group = c.benchmark_group("stack/close_middle");
    for depth in [8usize, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let kit = ModalKit::headless();
            let modals = open_modals(&kit, depth);
            for modal in &modals {
                modal.open();
            }
            let middle = &modals[depth / 2];
            b.iter(|| {
                middle.close();
                middle.open();
            });
        });
    }
    group.finish();
}

// ============================================================================
// Props Benchmarks
// ============================================================================

fn bench_props(c: &mut Criterion) {
    let kit = ModalKit::headless();
    let modals = open_modals(&kit, 8);
    for modal in &modals {
        modal.open();
    }
    let top = &modals[7];
    c.bench_function("props/content_attributes", |b| {
        b.iter(|| black_box(top.content_props().attributes()));
    });
    c.bench_function("props/container_styles", |b| {
        b.iter(|| black_box(top.container_props().styles()));
    });
}

// ============================================================================
// Focus Trap Benchmarks
// ============================================================================

fn bench_trap_tab(c: &mut Criterion) {
    let mut group = c.benchmark_group("trap/tab");
    for focusables in [4usize, 64, 256] {
        group.bench_with_input(
            BenchmarkId::from_parameter(focusables),
            &focusables,
            |b, &focusables| {
                let kit = ModalKit::headless();
                let doc = kit.document();
                let content = doc.create_element("div");
                for _ in 0..focusables {
                    let button = doc.create_element("button");
                    let _ = content.append_child(&button);
                }
                let _ = doc.body().append_child(&content);

                let modal = kit.create_modal(ModalOptions::new());
                modal.open();
                modal.content_props().attach(&content);
                kit.scheduler().flush();

                b.iter(|| black_box(doc.press(KeyboardEvent::new("Tab"))));
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_open_close_stack,
    bench_close_middle,
    bench_props,
    bench_trap_tab
);
criterion_main!(benches);
