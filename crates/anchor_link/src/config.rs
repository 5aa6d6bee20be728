//! Anchor configuration
//!
//! [`AnchorConfig`] is immutable once an anchor is created. It deserializes
//! from the camelCase property names hosts already use (`offsetTop`,
//! `showHeightActive`, `toHash`, ...); only `to` is required.
//!
//! ```rust
//! use anchor_link::AnchorConfig;
//!
//! let config: AnchorConfig = serde_json::from_str(r#"{
//!     "to": "pricing",
//!     "offsetTop": 64,
//!     "showHeightActive": ["20%", 120],
//!     "ease": "easeOutCubic"
//! }"#).unwrap();
//!
//! assert_eq!(config.duration_ms, 450);
//! assert_eq!(config.active_class, "active");
//! ```

use std::fmt;
use std::rc::Rc;

use anchor_animation::scheduler::DEFAULT_DURATION_MS;
use anchor_animation::Easing;
use anchor_core::{ActivationWindow, NodeId, ScrollTarget};
use serde::{Deserialize, Serialize};

fn default_component() -> String {
    "div".to_string()
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MS
}

fn default_active_class() -> String {
    "active".to_string()
}

/// Configuration of one scroll-linked anchor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorConfig {
    /// Destination element id
    pub to: String,

    /// Scroll container to observe and animate (`None` = the page)
    #[serde(default)]
    pub target_id: Option<String>,

    /// Pixels to stop short of the destination's top edge
    #[serde(default)]
    pub offset_top: f32,

    /// Tween duration in milliseconds
    #[serde(default = "default_duration", rename = "duration")]
    pub duration_ms: u32,

    /// Class token appended while active
    #[serde(default = "default_active_class", rename = "active")]
    pub active_class: String,

    /// Activation window, one bound for both edges or `[start, end]`
    #[serde(default)]
    pub show_height_active: ActivationWindow,

    /// Align the destination to the activation window's start edge
    #[serde(default)]
    pub to_show_height: bool,

    /// Easing curve name
    #[serde(default)]
    pub ease: Easing,

    /// Push `#to` onto navigation history on activation
    #[serde(default)]
    pub to_hash: bool,

    /// Host element type to render as
    #[serde(default = "default_component")]
    pub component: String,
}

impl AnchorConfig {
    /// Defaults for everything but the destination
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            target_id: None,
            offset_top: 0.0,
            duration_ms: DEFAULT_DURATION_MS,
            active_class: default_active_class(),
            show_height_active: ActivationWindow::default(),
            to_show_height: false,
            ease: Easing::default(),
            to_hash: false,
            component: default_component(),
        }
    }

    pub fn target_id(mut self, id: impl Into<String>) -> Self {
        self.target_id = Some(id.into());
        self
    }

    pub fn offset_top(mut self, px: f32) -> Self {
        self.offset_top = px;
        self
    }

    pub fn duration_ms(mut self, ms: u32) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn active_class(mut self, token: impl Into<String>) -> Self {
        self.active_class = token.into();
        self
    }

    pub fn show_height_active(mut self, window: ActivationWindow) -> Self {
        self.show_height_active = window;
        self
    }

    pub fn to_show_height(mut self, enabled: bool) -> Self {
        self.to_show_height = enabled;
        self
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.ease = easing;
        self
    }

    pub fn to_hash(mut self, enabled: bool) -> Self {
        self.to_hash = enabled;
        self
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    /// The scroll container this anchor observes
    pub fn scroll_target(&self) -> ScrollTarget {
        ScrollTarget::from_container_id(self.target_id.as_deref())
    }
}

/// Payload passed to anchor callbacks
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorEvent {
    /// The anchor's rendered host element (`None` before mount)
    pub target: Option<NodeId>,
    /// Destination element id
    pub to: String,
}

/// Callback receiving an [`AnchorEvent`]
pub type AnchorCallback = Rc<dyn Fn(&AnchorEvent)>;

/// Focus/blur/click hooks
#[derive(Clone, Default)]
pub struct AnchorCallbacks {
    on_focus: Option<AnchorCallback>,
    on_blur: Option<AnchorCallback>,
    on_click: Option<AnchorCallback>,
}

impl AnchorCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when the anchor becomes active
    pub fn on_focus<F>(mut self, f: F) -> Self
    where
        F: Fn(&AnchorEvent) + 'static,
    {
        self.on_focus = Some(Rc::new(f));
        self
    }

    /// Called when the anchor becomes inactive
    pub fn on_blur<F>(mut self, f: F) -> Self
    where
        F: Fn(&AnchorEvent) + 'static,
    {
        self.on_blur = Some(Rc::new(f));
        self
    }

    /// Called on every click, before the scroll starts
    pub fn on_click<F>(mut self, f: F) -> Self
    where
        F: Fn(&AnchorEvent) + 'static,
    {
        self.on_click = Some(Rc::new(f));
        self
    }

    pub(crate) fn focus(&self, event: &AnchorEvent) {
        if let Some(cb) = &self.on_focus {
            cb(event);
        }
    }

    pub(crate) fn blur(&self, event: &AnchorEvent) {
        if let Some(cb) = &self.on_blur {
            cb(event);
        }
    }

    pub(crate) fn click(&self, event: &AnchorEvent) {
        if let Some(cb) = &self.on_click {
            cb(event);
        }
    }
}

impl fmt::Debug for AnchorCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorCallbacks")
            .field("on_focus", &self.on_focus.is_some())
            .field("on_blur", &self.on_blur.is_some())
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_core::Bound;

    #[test]
    fn test_defaults() {
        let config = AnchorConfig::new("intro");
        assert_eq!(config.offset_top, 0.0);
        assert_eq!(config.duration_ms, 450);
        assert_eq!(config.active_class, "active");
        assert_eq!(
            config.show_height_active,
            ActivationWindow::uniform(Bound::Percent(50.0))
        );
        assert!(!config.to_show_height);
        assert_eq!(config.ease, Easing::EaseInOutQuad);
        assert!(!config.to_hash);
        assert_eq!(config.component, "div");
        assert_eq!(config.scroll_target(), ScrollTarget::Page);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: AnchorConfig = serde_json::from_str(
            r#"{
                "to": "faq",
                "targetId": "docs",
                "offsetTop": 20,
                "duration": 300,
                "active": "is-current",
                "showHeightActive": ["10%", 200],
                "toShowHeight": true,
                "ease": "easeOutQuart",
                "toHash": true,
                "component": "a"
            }"#,
        )
        .unwrap();

        assert_eq!(
            config,
            AnchorConfig::new("faq")
                .target_id("docs")
                .offset_top(20.0)
                .duration_ms(300)
                .active_class("is-current")
                .show_height_active(ActivationWindow::new(
                    Bound::Percent(10.0),
                    Bound::Pixels(200.0)
                ))
                .to_show_height(true)
                .ease(Easing::EaseOutQuart)
                .to_hash(true)
                .component("a")
        );
        assert_eq!(config.scroll_target(), ScrollTarget::Container("docs".into()));
    }

    #[test]
    fn test_destination_is_required() {
        assert!(serde_json::from_str::<AnchorConfig>(r#"{ "offsetTop": 4 }"#).is_err());
    }

    #[test]
    fn test_rejects_unknown_curve_and_bad_window() {
        assert!(serde_json::from_str::<AnchorConfig>(r#"{ "to": "a", "ease": "wobble" }"#).is_err());
        assert!(serde_json::from_str::<AnchorConfig>(
            r#"{ "to": "a", "showHeightActive": "lots" }"#
        )
        .is_err());
    }

    #[test]
    fn test_from_toml() {
        let config: AnchorConfig = toml::from_str(
            r#"
            to = "changelog"
            showHeightActive = "25%"
            toHash = true
            "#,
        )
        .unwrap();
        assert_eq!(
            config.show_height_active,
            ActivationWindow::uniform(Bound::Percent(25.0))
        );
        assert!(config.to_hash);
    }

    #[test]
    fn test_callbacks_debug_shows_presence() {
        let callbacks = AnchorCallbacks::new().on_focus(|_| {});
        let debug = format!("{:?}", callbacks);
        assert!(debug.contains("on_focus: true"));
        assert!(debug.contains("on_blur: false"));
    }
}
