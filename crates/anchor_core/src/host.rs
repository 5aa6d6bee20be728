//! Host interface
//!
//! The page (browser, native shell, or a headless test document) supplies
//! geometry, scroll offsets, timestamps, and history writes through
//! [`ScrollHost`]. Anchors never touch the host any other way.

use std::fmt;
use std::time::Instant;

/// Which scroll container a signal or animation refers to
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollTarget {
    /// The page viewport
    #[default]
    Page,
    /// A scrollable element, by id
    Container(String),
}

impl ScrollTarget {
    /// Resolve an optional container id (`None` means the page)
    pub fn from_container_id(id: Option<&str>) -> Self {
        match id {
            Some(id) => ScrollTarget::Container(id.to_string()),
            None => ScrollTarget::Page,
        }
    }

    /// The container id, if this is not the page
    pub fn container_id(&self) -> Option<&str> {
        match self {
            ScrollTarget::Page => None,
            ScrollTarget::Container(id) => Some(id),
        }
    }

    pub fn is_page(&self) -> bool {
        matches!(self, ScrollTarget::Page)
    }
}

impl fmt::Display for ScrollTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollTarget::Page => write!(f, "page"),
            ScrollTarget::Container(id) => write!(f, "#{}", id),
        }
    }
}

/// Measured geometry of a destination element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementGeometry {
    /// Top edge relative to the scroll container's visible top edge
    /// (0 = flush with the edge, negative = scrolled past)
    pub top: f32,
    /// Visible height of the element itself
    pub client_height: f32,
}

impl ElementGeometry {
    pub fn new(top: f32, client_height: f32) -> Self {
        Self { top, client_height }
    }
}

/// Opaque reference to an anchor's rendered host element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Operations an anchor needs from the page it lives on
///
/// All methods take `&self`; implementations use interior mutability.
/// Writes must not call back into the anchor machinery synchronously -
/// scroll signals are delivered by the page context after a write.
pub trait ScrollHost {
    /// Current vertical scroll offset of the page or container
    fn scroll_top(&self, target: &ScrollTarget) -> f32;

    /// Set the vertical scroll offset (page writes keep horizontal scroll)
    fn set_scroll_top(&self, target: &ScrollTarget, value: f32);

    /// Visible height of the page viewport or container
    ///
    /// Returns `None` when a named container does not exist.
    fn client_height(&self, target: &ScrollTarget) -> Option<f32>;

    /// Locate an element and measure it against the target's visible edge
    fn element_geometry(&self, id: &str, target: &ScrollTarget) -> Option<ElementGeometry>;

    /// Push `#fragment` onto the navigation history
    fn push_fragment(&self, fragment: &str);

    /// Frame timestamp used for animation timing
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_target_from_container_id() {
        assert_eq!(ScrollTarget::from_container_id(None), ScrollTarget::Page);
        assert_eq!(
            ScrollTarget::from_container_id(Some("list")),
            ScrollTarget::Container("list".into())
        );
    }

    #[test]
    fn test_scroll_target_display() {
        assert_eq!(ScrollTarget::Page.to_string(), "page");
        assert_eq!(ScrollTarget::Container("list".into()).to_string(), "#list");
        assert_eq!(ScrollTarget::Container("list".into()).container_id(), Some("list"));
        assert!(ScrollTarget::default().is_page());
    }
}
