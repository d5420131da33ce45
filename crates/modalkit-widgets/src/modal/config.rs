#![forbid(unsafe_code)]

//! Modal configuration: resolved [`ModalConfig`] and partial [`ModalOptions`].
//!
//! Merging is shallow. A `None` in [`ModalOptions`] keeps the current value;
//! an explicit `Some(false)` or `Some(Duration::ZERO)` overrides it.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use modalkit_core::dom::MouseEvent;
use modalkit_core::keyboard::KeyboardEvent;

use crate::modal::focus_trap::FocusTarget;
use crate::modal::portal::PortalTarget;

/// Default enter/exit animation length.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(200);

/// Where overflowing content scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScrollBehavior {
    /// The container scrolls (`overflow: auto`).
    #[default]
    Inside,
    /// The container clips (`overflow: hidden`); the caller scrolls outside.
    Outside,
}

impl ScrollBehavior {
    /// CSS `overflow` value for the container.
    pub const fn overflow(self) -> &'static str {
        match self {
            Self::Inside => "auto",
            Self::Outside => "hidden",
        }
    }
}

/// ARIA role for the content element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ModalRole {
    #[default]
    Dialog,
    AlertDialog,
}

impl ModalRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dialog => "dialog",
            Self::AlertDialog => "alertdialog",
        }
    }
}

impl fmt::Display for ModalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of an animation, reported to animation callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AnimationKind {
    Enter,
    Exit,
}

impl AnimationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
        }
    }
}

pub type Callback = Rc<dyn Fn()>;
pub type OpenChangeCallback = Rc<dyn Fn(bool)>;
pub type AnimationCallback = Rc<dyn Fn(AnimationKind)>;
pub type KeyCallback = Rc<dyn Fn(&KeyboardEvent)>;
pub type ClickCallback = Rc<dyn Fn(&MouseEvent)>;

/// Fully resolved modal configuration.
#[derive(Clone)]
pub struct ModalConfig {
    /// Base id; generated when `None`.
    pub id: Option<String>,
    /// Controlled initial state. Wins over `default_open`.
    pub open: Option<bool>,
    pub default_open: bool,

    pub close_on_overlay_click: bool,
    pub close_on_escape: bool,

    /// Lock body scroll while open.
    pub prevent_scroll: bool,
    pub scroll_behavior: ScrollBehavior,

    pub trap_focus: bool,
    pub auto_focus: bool,
    pub restore_focus: bool,
    pub initial_focus: Option<FocusTarget>,
    pub final_focus: Option<FocusTarget>,

    /// Stored and reported; stacking is always permitted.
    pub stackable: bool,
    /// Stored and reported; opening a modal never closes another.
    pub close_on_stacked_open: bool,

    pub animated: bool,
    pub animation_duration: Duration,

    pub portal_target: Option<PortalTarget>,
    pub disable_portal: bool,

    pub role: ModalRole,
    pub aria_label: Option<String>,
    pub aria_labelledby: Option<String>,
    pub aria_describedby: Option<String>,

    pub on_open: Option<Callback>,
    pub on_close: Option<Callback>,
    pub on_open_change: Option<OpenChangeCallback>,
    pub on_animation_start: Option<AnimationCallback>,
    pub on_animation_end: Option<AnimationCallback>,
    /// Runs before Escape closes; `prevent_default` vetoes the close.
    pub on_escape_key_down: Option<KeyCallback>,
    /// Runs before an overlay click closes; `prevent_default` vetoes it.
    pub on_overlay_click: Option<ClickCallback>,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            id: None,
            open: None,
            default_open: false,
            close_on_overlay_click: true,
            close_on_escape: true,
            prevent_scroll: true,
            scroll_behavior: ScrollBehavior::Inside,
            trap_focus: true,
            auto_focus: true,
            restore_focus: true,
            initial_focus: None,
            final_focus: None,
            stackable: true,
            close_on_stacked_open: false,
            animated: false,
            animation_duration: DEFAULT_ANIMATION_DURATION,
            portal_target: None,
            disable_portal: false,
            role: ModalRole::Dialog,
            aria_label: None,
            aria_labelledby: None,
            aria_describedby: None,
            on_open: None,
            on_close: None,
            on_open_change: None,
            on_animation_start: None,
            on_animation_end: None,
            on_escape_key_down: None,
            on_overlay_click: None,
        }
    }
}

impl ModalConfig {
    /// Defaults overlaid with `options`.
    pub fn from_options(options: ModalOptions) -> Self {
        let mut config = Self::default();
        config.merge(options);
        config
    }

    /// Whether the modal starts open (`open` wins over `default_open`).
    pub fn initially_open(&self) -> bool {
        self.open.unwrap_or(self.default_open)
    }

    /// Shallow merge: every `Some` in `options` replaces the current value.
    pub fn merge(&mut self, options: ModalOptions) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = options.$field { self.$field = value; })*
            };
        }
        macro_rules! take_opt {
            ($($field:ident),* $(,)?) => {
                $(if options.$field.is_some() { self.$field = options.$field; })*
            };
        }
        take!(
            default_open,
            close_on_overlay_click,
            close_on_escape,
            prevent_scroll,
            scroll_behavior,
            trap_focus,
            auto_focus,
            restore_focus,
            stackable,
            close_on_stacked_open,
            animated,
            animation_duration,
            disable_portal,
            role,
        );
        take_opt!(
            id,
            open,
            initial_focus,
            final_focus,
            portal_target,
            aria_label,
            aria_labelledby,
            aria_describedby,
            on_open,
            on_close,
            on_open_change,
            on_animation_start,
            on_animation_end,
            on_escape_key_down,
            on_overlay_click,
        );
    }
}

impl fmt::Debug for ModalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalConfig")
            .field("id", &self.id)
            .field("open", &self.open)
            .field("default_open", &self.default_open)
            .field("close_on_overlay_click", &self.close_on_overlay_click)
            .field("close_on_escape", &self.close_on_escape)
            .field("prevent_scroll", &self.prevent_scroll)
            .field("scroll_behavior", &self.scroll_behavior)
            .field("trap_focus", &self.trap_focus)
            .field("auto_focus", &self.auto_focus)
            .field("restore_focus", &self.restore_focus)
            .field("stackable", &self.stackable)
            .field("close_on_stacked_open", &self.close_on_stacked_open)
            .field("animated", &self.animated)
            .field("animation_duration", &self.animation_duration)
            .field("portal_target", &self.portal_target)
            .field("disable_portal", &self.disable_portal)
            .field("role", &self.role)
            .field("aria_label", &self.aria_label)
            .field("aria_labelledby", &self.aria_labelledby)
            .field("aria_describedby", &self.aria_describedby)
            .finish_non_exhaustive()
    }
}

/// Caller-supplied partial configuration.
///
/// ```
/// use modalkit_widgets::modal::{ModalConfig, ModalOptions};
///
/// let config = ModalConfig::from_options(
///     ModalOptions::new().close_on_escape(false).animated(true),
/// );
/// assert!(!config.close_on_escape);
/// assert!(config.close_on_overlay_click);
/// ```
#[derive(Clone, Default)]
pub struct ModalOptions {
    pub id: Option<String>,
    pub open: Option<bool>,
    pub default_open: Option<bool>,
    pub close_on_overlay_click: Option<bool>,
    pub close_on_escape: Option<bool>,
    pub prevent_scroll: Option<bool>,
    pub scroll_behavior: Option<ScrollBehavior>,
    pub trap_focus: Option<bool>,
    pub auto_focus: Option<bool>,
    pub restore_focus: Option<bool>,
    pub initial_focus: Option<FocusTarget>,
    pub final_focus: Option<FocusTarget>,
    pub stackable: Option<bool>,
    pub close_on_stacked_open: Option<bool>,
    pub animated: Option<bool>,
    pub animation_duration: Option<Duration>,
    pub portal_target: Option<PortalTarget>,
    pub disable_portal: Option<bool>,
    pub role: Option<ModalRole>,
    pub aria_label: Option<String>,
    pub aria_labelledby: Option<String>,
    pub aria_describedby: Option<String>,
    pub on_open: Option<Callback>,
    pub on_close: Option<Callback>,
    pub on_open_change: Option<OpenChangeCallback>,
    pub on_animation_start: Option<AnimationCallback>,
    pub on_animation_end: Option<AnimationCallback>,
    pub on_escape_key_down: Option<KeyCallback>,
    pub on_overlay_click: Option<ClickCallback>,
}

macro_rules! setters {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[must_use]
            pub fn $name(mut self, value: $ty) -> Self {
                self.$name = Some(value);
                self
            }
        )*
    };
}

impl ModalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    setters!(
        open: bool,
        default_open: bool,
        close_on_overlay_click: bool,
        close_on_escape: bool,
        prevent_scroll: bool,
        scroll_behavior: ScrollBehavior,
        trap_focus: bool,
        auto_focus: bool,
        restore_focus: bool,
        initial_focus: FocusTarget,
        final_focus: FocusTarget,
        stackable: bool,
        close_on_stacked_open: bool,
        animated: bool,
        animation_duration: Duration,
        portal_target: PortalTarget,
        disable_portal: bool,
        role: ModalRole,
    );

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn aria_labelledby(mut self, id: impl Into<String>) -> Self {
        self.aria_labelledby = Some(id.into());
        self
    }

    #[must_use]
    pub fn aria_describedby(mut self, id: impl Into<String>) -> Self {
        self.aria_describedby = Some(id.into());
        self
    }

    // --- Callbacks ---

    #[must_use]
    pub fn on_open(mut self, f: impl Fn() + 'static) -> Self {
        self.on_open = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_close(mut self, f: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_open_change(mut self, f: impl Fn(bool) + 'static) -> Self {
        self.on_open_change = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_animation_start(mut self, f: impl Fn(AnimationKind) + 'static) -> Self {
        self.on_animation_start = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_animation_end(mut self, f: impl Fn(AnimationKind) + 'static) -> Self {
        self.on_animation_end = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_escape_key_down(mut self, f: impl Fn(&KeyboardEvent) + 'static) -> Self {
        self.on_escape_key_down = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_overlay_click(mut self, f: impl Fn(&MouseEvent) + 'static) -> Self {
        self.on_overlay_click = Some(Rc::new(f));
        self
    }

    /// Whether applying these options changes the animation setup.
    pub(crate) fn touches_animation(&self) -> bool {
        self.animated.is_some() || self.animation_duration.is_some()
    }
}

impl fmt::Debug for ModalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalOptions")
            .field("id", &self.id)
            .field("open", &self.open)
            .field("default_open", &self.default_open)
            .field("close_on_escape", &self.close_on_escape)
            .field("close_on_overlay_click", &self.close_on_overlay_click)
            .field("animated", &self.animated)
            .field("animation_duration", &self.animation_duration)
            .finish_non_exhaustive()
    }
}
