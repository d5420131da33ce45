#![forbid(unsafe_code)]

//! Enter/exit animation phase controllers.
//!
//! Two controllers share one interface so subscribers see the same state
//! machine shape whether or not animation is enabled:
//!
//! | Controller | enter | exit |
//! |------------|-------|------|
//! | [`TimedAnimation`] | `Entering` → (duration) → `Entered` | `Exiting` → (duration) → `Exited` → (next tick) → `Idle` |
//! | [`NoopAnimation`] | `Entered` | `Idle` |
//!
//! # Invariants
//!
//! 1. At most one timer is pending per controller.
//! 2. Starting a new direction cancels the pending timer, so a stale
//!    completion never fires after a newer transition began.
//! 3. State-change hooks fire only when the phase actually changes.
//! 4. Hooks run with the new phase already recorded and the next timer
//!    already scheduled; a hook may start another transition.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use modalkit_runtime::scheduler::{Scheduler, TimerId};

use crate::modal::config::AnimationKind;
use crate::modal::state::AnimationState;

/// Stable phase to jump to with [`AnimationController::skip_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipTarget {
    Entered,
    /// Still bridges to `Idle` on the next tick.
    Exited,
}

/// Drives a modal's animation phase.
pub trait AnimationController {
    fn start_enter(&self);
    fn start_exit(&self);
    /// Cancel any pending timer and jump straight to `target`.
    fn skip_to(&self, target: SkipTarget);
    fn state(&self) -> AnimationState;
    fn is_animating(&self) -> bool {
        self.state().is_animating()
    }
    /// Cancel any pending timer and force `Idle` without notifying.
    fn destroy(&self);
}

/// Hooks invoked by [`TimedAnimation`].
#[derive(Clone, Default)]
pub struct AnimationHooks {
    pub on_state_change: Option<Rc<dyn Fn(AnimationState)>>,
    pub on_start: Option<Rc<dyn Fn(AnimationKind)>>,
    pub on_end: Option<Rc<dyn Fn(AnimationKind)>>,
}

impl AnimationHooks {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_state_change(mut self, f: impl Fn(AnimationState) + 'static) -> Self {
        self.on_state_change = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_start(mut self, f: impl Fn(AnimationKind) + 'static) -> Self {
        self.on_start = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_end(mut self, f: impl Fn(AnimationKind) + 'static) -> Self {
        self.on_end = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for AnimationHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHooks")
            .field("on_state_change", &self.on_state_change.is_some())
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

struct TimedInner {
    scheduler: Scheduler,
    duration: Duration,
    state: Cell<AnimationState>,
    timer: Cell<Option<TimerId>>,
    hooks: AnimationHooks,
}

impl TimedInner {
    fn clear_timer(&self) {
        if let Some(id) = self.timer.take() {
            self.scheduler.clear_timeout(id);
        }
    }

    /// Record `next`; returns whether the phase changed.
    fn record(&self, next: AnimationState) -> bool {
        let changed = self.state.replace(next) != next;
        if changed {
            tracing::trace!(phase = next.as_str(), "animation: phase change");
        }
        changed
    }

    fn notify(&self, changed: bool) {
        if changed && let Some(hook) = &self.hooks.on_state_change {
            hook(self.state.get());
        }
    }

    fn started(&self, kind: AnimationKind) {
        if let Some(hook) = &self.hooks.on_start {
            hook(kind);
        }
    }

    fn ended(&self, kind: AnimationKind) {
        if let Some(hook) = &self.hooks.on_end {
            hook(kind);
        }
    }

    fn schedule(self: &Rc<Self>, delay: Duration, step: fn(&Rc<TimedInner>)) {
        let weak: Weak<TimedInner> = Rc::downgrade(self);
        let id = self.scheduler.set_timeout(delay, move || {
            if let Some(inner) = weak.upgrade() {
                inner.timer.set(None);
                step(&inner);
            }
        });
        self.timer.set(Some(id));
    }

    fn finish_enter(self: &Rc<Self>) {
        let changed = self.record(AnimationState::Entered);
        self.notify(changed);
        self.ended(AnimationKind::Enter);
    }

    fn finish_exit(self: &Rc<Self>) {
        let changed = self.record(AnimationState::Exited);
        self.schedule(Duration::ZERO, TimedInner::settle);
        self.notify(changed);
        self.ended(AnimationKind::Exit);
    }

    fn settle(self: &Rc<Self>) {
        let changed = self.record(AnimationState::Idle);
        self.notify(changed);
    }
}

/// Scheduler-backed controller with a fixed duration.
#[derive(Clone)]
pub struct TimedAnimation {
    inner: Rc<TimedInner>,
}

impl TimedAnimation {
    pub fn new(scheduler: &Scheduler, duration: Duration, hooks: AnimationHooks) -> Self {
        Self {
            inner: Rc::new(TimedInner {
                scheduler: scheduler.clone(),
                duration,
                state: Cell::new(AnimationState::Idle),
                timer: Cell::new(None),
                hooks,
            }),
        }
    }

    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    /// Whether a phase timer is pending.
    pub fn has_pending_timer(&self) -> bool {
        self.inner
            .timer
            .get()
            .is_some_and(|id| self.inner.scheduler.is_pending(id))
    }
}

impl AnimationController for TimedAnimation {
    fn start_enter(&self) {
        let inner = &self.inner;
        inner.clear_timer();
        let changed = inner.record(AnimationState::Entering);
        inner.schedule(inner.duration, TimedInner::finish_enter);
        inner.notify(changed);
        inner.started(AnimationKind::Enter);
    }

    fn start_exit(&self) {
        let inner = &self.inner;
        inner.clear_timer();
        let changed = inner.record(AnimationState::Exiting);
        inner.schedule(inner.duration, TimedInner::finish_exit);
        inner.notify(changed);
        inner.started(AnimationKind::Exit);
    }

    fn skip_to(&self, target: SkipTarget) {
        let inner = &self.inner;
        inner.clear_timer();
        match target {
            SkipTarget::Entered => {
                let changed = inner.record(AnimationState::Entered);
                inner.notify(changed);
            }
            SkipTarget::Exited => {
                let changed = inner.record(AnimationState::Exited);
                inner.schedule(Duration::ZERO, TimedInner::settle);
                inner.notify(changed);
            }
        }
    }

    fn state(&self) -> AnimationState {
        self.inner.state.get()
    }

    fn destroy(&self) {
        self.inner.clear_timer();
        self.inner.state.set(AnimationState::Idle);
    }
}

impl fmt::Debug for TimedAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedAnimation")
            .field("duration", &self.inner.duration)
            .field("state", &self.inner.state.get())
            .field("timer", &self.inner.timer.get())
            .finish()
    }
}

/// Zero-duration controller for modals with animation disabled.
#[derive(Debug, Default)]
pub struct NoopAnimation {
    state: Cell<AnimationState>,
}

impl NoopAnimation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnimationController for NoopAnimation {
    fn start_enter(&self) {
        self.state.set(AnimationState::Entered);
    }

    fn start_exit(&self) {
        self.state.set(AnimationState::Idle);
    }

    fn skip_to(&self, target: SkipTarget) {
        self.state.set(match target {
            SkipTarget::Entered => AnimationState::Entered,
            SkipTarget::Exited => AnimationState::Idle,
        });
    }

    fn state(&self) -> AnimationState {
        self.state.get()
    }

    fn is_animating(&self) -> bool {
        false
    }

    fn destroy(&self) {
        self.state.set(AnimationState::Idle);
    }
}
