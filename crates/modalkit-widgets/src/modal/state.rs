#![forbid(unsafe_code)]

//! Per-modal state record and its change-notifying store.
//!
//! # Invariants
//!
//! 1. `mounted == open || animation_state ∈ {Exiting, Exited}` after every
//!    transition the modal performs.
//! 2. Subscribers are notified only when at least one field changed.
//! 3. `stack_order == 0` iff the modal is not in a stack.

use std::fmt;

use modalkit_runtime::reactive::{Observable, Subscription};

/// Animation phase. `Idle` and `Entered` are stable, `Entering` and
/// `Exiting` transient, `Exited` a one-tick bridge back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AnimationState {
    #[default]
    Idle,
    Entering,
    Entered,
    Exiting,
    Exited,
}

impl AnimationState {
    /// Value of the `data-state` attribute.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Entering => "entering",
            Self::Entered => "entered",
            Self::Exiting => "exiting",
            Self::Exited => "exited",
        }
    }

    #[inline]
    pub const fn is_animating(self) -> bool {
        matches!(self, Self::Entering | Self::Exiting)
    }
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one modal's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ModalState {
    /// Logical open intent, independent of animation.
    pub open: bool,
    pub animation_state: AnimationState,
    /// 1-based stack position; 0 when not stacked.
    pub stack_order: usize,
    pub is_top_most: bool,
    /// Whether the modal's subtree should exist.
    pub mounted: bool,
}

impl ModalState {
    /// Initial state for a modal that starts open or closed.
    pub const fn initial(default_open: bool) -> Self {
        Self {
            open: default_open,
            animation_state: if default_open {
                AnimationState::Entered
            } else {
                AnimationState::Idle
            },
            stack_order: 0,
            is_top_most: false,
            mounted: default_open,
        }
    }

    /// Copy with `patch` applied.
    #[must_use]
    pub fn apply(self, patch: StatePatch) -> Self {
        Self {
            open: patch.open.unwrap_or(self.open),
            animation_state: patch.animation_state.unwrap_or(self.animation_state),
            stack_order: patch.stack_order.unwrap_or(self.stack_order),
            is_top_most: patch.is_top_most.unwrap_or(self.is_top_most),
            mounted: patch.mounted.unwrap_or(self.mounted),
        }
    }

    /// Whether the mounted invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.mounted == should_be_mounted(self.open, self.animation_state)
    }
}

/// Partial update for [`ModalState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatePatch {
    pub open: Option<bool>,
    pub animation_state: Option<AnimationState>,
    pub stack_order: Option<usize>,
    pub is_top_most: Option<bool>,
    pub mounted: Option<bool>,
}

impl StatePatch {
    pub const fn new() -> Self {
        Self {
            open: None,
            animation_state: None,
            stack_order: None,
            is_top_most: None,
            mounted: None,
        }
    }

    #[must_use]
    pub const fn open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }

    #[must_use]
    pub const fn animation_state(mut self, state: AnimationState) -> Self {
        self.animation_state = Some(state);
        self
    }

    #[must_use]
    pub const fn stack_position(mut self, order: usize, is_top_most: bool) -> Self {
        self.stack_order = Some(order);
        self.is_top_most = Some(is_top_most);
        self
    }

    #[must_use]
    pub const fn mounted(mut self, mounted: bool) -> Self {
        self.mounted = Some(mounted);
        self
    }
}

/// Mounted when open, or while an exit animation completes.
#[inline]
pub const fn should_be_mounted(open: bool, phase: AnimationState) -> bool {
    open || matches!(phase, AnimationState::Exiting | AnimationState::Exited)
}

/// Open/close intent fed to [`next_animation_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationAction {
    Open,
    Close,
}

/// Phase a modal enters when `action` is taken from `current`.
pub const fn next_animation_state(
    current: AnimationState,
    action: AnimationAction,
    animated: bool,
) -> AnimationState {
    match (action, animated) {
        (AnimationAction::Open, false) => AnimationState::Entered,
        (AnimationAction::Close, false) => AnimationState::Idle,
        (AnimationAction::Open, true) => AnimationState::Entering,
        (AnimationAction::Close, true) => match current {
            AnimationState::Entered | AnimationState::Entering => AnimationState::Exiting,
            _ => AnimationState::Idle,
        },
    }
}

/// Shared, change-notifying holder of a [`ModalState`].
#[derive(Clone)]
pub struct StateStore {
    state: Observable<ModalState>,
}

impl StateStore {
    pub fn new(initial: ModalState) -> Self {
        Self {
            state: Observable::new(initial),
        }
    }

    /// Current snapshot.
    pub fn get(&self) -> ModalState {
        self.state.get()
    }

    /// Merge `patch`; notifies subscribers only on a real change.
    ///
    /// Returns whether anything changed.
    pub fn set_state(&self, patch: StatePatch) -> bool {
        self.state.update(|state| *state = state.apply(patch))
    }

    /// Called with the new state after every real change.
    pub fn subscribe(&self, callback: impl Fn(&ModalState) + 'static) -> Subscription {
        self.state.subscribe(callback)
    }

    /// Number of real changes so far.
    pub fn version(&self) -> u64 {
        self.state.version()
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.state.get())
            .finish()
    }
}
