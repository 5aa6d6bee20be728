//! Headless host document
//!
//! An in-memory [`ScrollHost`]: a viewport, optional scroll containers, and
//! elements laid out in document coordinates. Time only moves when told to,
//! which makes frame-by-frame animation fully deterministic. Used by tests
//! and by the `anchor` simulator.
//!
//! ```rust
//! use anchor_core::{ScrollHost, ScrollTarget};
//! use anchor_link::HeadlessDocument;
//!
//! let doc = HeadlessDocument::new(800.0)
//!     .with_element("intro", 0.0, 1200.0)
//!     .with_container("sidebar", 100.0, 300.0)
//!     .with_element_in("sidebar", "notes", 450.0, 200.0);
//!
//! doc.set_scroll_top(&ScrollTarget::Page, 50.0);
//! let notes = doc
//!     .element_geometry("notes", &ScrollTarget::Container("sidebar".into()))
//!     .unwrap();
//! assert_eq!(notes.top, 450.0);
//! ```

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use anchor_core::{ElementGeometry, ScrollHost, ScrollTarget};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
struct HeadlessContainer {
    /// Document offset of the container's top edge
    top: f32,
    client_height: f32,
    scroll_top: f32,
}

#[derive(Clone, Debug)]
struct HeadlessElement {
    /// Offset within the page, or within its container's content
    top: f32,
    height: f32,
    container: Option<String>,
}

/// In-memory page for driving anchors without a browser
pub struct HeadlessDocument {
    viewport_height: Cell<f32>,
    scroll_x: Cell<f32>,
    scroll_y: Cell<f32>,
    containers: RefCell<FxHashMap<String, HeadlessContainer>>,
    elements: RefCell<IndexMap<String, HeadlessElement>>,
    history: RefCell<Vec<String>>,
    clock: Cell<Instant>,
}

impl HeadlessDocument {
    /// Empty page with the given viewport height
    pub fn new(viewport_height: f32) -> Self {
        Self {
            viewport_height: Cell::new(viewport_height),
            scroll_x: Cell::new(0.0),
            scroll_y: Cell::new(0.0),
            containers: RefCell::new(FxHashMap::default()),
            elements: RefCell::new(IndexMap::new()),
            history: RefCell::new(Vec::new()),
            clock: Cell::new(Instant::now()),
        }
    }

    /// Add a scroll container whose top edge sits at `top` in the page
    pub fn with_container(self, id: &str, top: f32, client_height: f32) -> Self {
        self.insert_container(id, top, client_height);
        self
    }

    /// Add a page-level element
    pub fn with_element(self, id: &str, top: f32, height: f32) -> Self {
        self.insert_element(id, top, height, None);
        self
    }

    /// Add an element inside a container's scrolled content
    pub fn with_element_in(self, container: &str, id: &str, top: f32, height: f32) -> Self {
        self.insert_element(id, top, height, Some(container));
        self
    }

    pub fn insert_container(&self, id: &str, top: f32, client_height: f32) {
        self.containers.borrow_mut().insert(
            id.to_string(),
            HeadlessContainer {
                top,
                client_height,
                scroll_top: 0.0,
            },
        );
    }

    pub fn insert_element(&self, id: &str, top: f32, height: f32, container: Option<&str>) {
        self.elements.borrow_mut().insert(
            id.to_string(),
            HeadlessElement {
                top,
                height,
                container: container.map(str::to_string),
            },
        );
    }

    /// Remove an element. Returns false if it did not exist.
    pub fn remove_element(&self, id: &str) -> bool {
        self.elements.borrow_mut().shift_remove(id).is_some()
    }

    /// Resize the viewport
    pub fn set_viewport_height(&self, height: f32) {
        self.viewport_height.set(height);
    }

    /// Resize a container. Returns false if it does not exist.
    pub fn set_container_height(&self, id: &str, height: f32) -> bool {
        match self.containers.borrow_mut().get_mut(id) {
            Some(container) => {
                container.client_height = height;
                true
            }
            None => false,
        }
    }

    pub fn page_scroll_top(&self) -> f32 {
        self.scroll_y.get()
    }

    pub fn page_scroll_left(&self) -> f32 {
        self.scroll_x.get()
    }

    pub fn set_page_scroll_left(&self, x: f32) {
        self.scroll_x.set(x.max(0.0));
    }

    pub fn container_scroll_top(&self, id: &str) -> Option<f32> {
        self.containers.borrow().get(id).map(|c| c.scroll_top)
    }

    /// Fragments pushed so far, oldest first (`"#intro"`)
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    /// Move the frame clock forward
    pub fn advance(&self, by: Duration) {
        self.clock.set(self.clock.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Largest valid scroll offset for a target
    fn max_scroll(&self, target: &ScrollTarget) -> Option<f32> {
        let elements = self.elements.borrow();
        let containers = self.containers.borrow();
        match target {
            ScrollTarget::Page => {
                let content = elements
                    .values()
                    .filter(|el| el.container.is_none())
                    .map(|el| el.top + el.height)
                    .chain(containers.values().map(|c| c.top + c.client_height))
                    .fold(0.0f32, f32::max);
                Some((content - self.viewport_height.get()).max(0.0))
            }
            ScrollTarget::Container(id) => {
                let container = containers.get(id)?;
                let content = elements
                    .values()
                    .filter(|el| el.container.as_deref() == Some(id.as_str()))
                    .map(|el| el.top + el.height)
                    .fold(0.0f32, f32::max);
                Some((content - container.client_height).max(0.0))
            }
        }
    }

    /// Top of a scroll target's visible area in viewport coordinates
    fn visible_edge(&self, target: &ScrollTarget) -> Option<f32> {
        match target {
            ScrollTarget::Page => Some(0.0),
            ScrollTarget::Container(id) => self
                .containers
                .borrow()
                .get(id)
                .map(|c| c.top - self.scroll_y.get()),
        }
    }
}

impl ScrollHost for HeadlessDocument {
    fn scroll_top(&self, target: &ScrollTarget) -> f32 {
        match target {
            ScrollTarget::Page => self.scroll_y.get(),
            ScrollTarget::Container(id) => self.container_scroll_top(id).unwrap_or(0.0),
        }
    }

    fn set_scroll_top(&self, target: &ScrollTarget, value: f32) {
        let Some(max) = self.max_scroll(target) else {
            tracing::warn!("HeadlessDocument: no scroll container {}", target);
            return;
        };
        let value = value.clamp(0.0, max);
        match target {
            ScrollTarget::Page => self.scroll_y.set(value),
            ScrollTarget::Container(id) => {
                if let Some(container) = self.containers.borrow_mut().get_mut(id) {
                    container.scroll_top = value;
                }
            }
        }
    }

    fn client_height(&self, target: &ScrollTarget) -> Option<f32> {
        match target {
            ScrollTarget::Page => Some(self.viewport_height.get()),
            ScrollTarget::Container(id) => {
                self.containers.borrow().get(id).map(|c| c.client_height)
            }
        }
    }

    fn element_geometry(&self, id: &str, target: &ScrollTarget) -> Option<ElementGeometry> {
        let edge = self.visible_edge(target)?;
        let elements = self.elements.borrow();
        let element = elements.get(id)?;

        let viewport_top = match &element.container {
            None => element.top - self.scroll_y.get(),
            Some(container_id) => {
                let containers = self.containers.borrow();
                let container = containers.get(container_id)?;
                container.top - self.scroll_y.get() + element.top - container.scroll_top
            }
        };
        Some(ElementGeometry::new(viewport_top - edge, element.height))
    }

    fn push_fragment(&self, fragment: &str) {
        self.history.borrow_mut().push(format!("#{}", fragment));
    }

    fn now(&self) -> Instant {
        self.clock.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sidebar() -> ScrollTarget {
        ScrollTarget::Container("sidebar".into())
    }

    #[test]
    fn test_page_geometry_tracks_scroll() {
        let doc = HeadlessDocument::new(800.0)
            .with_element("a", 0.0, 1000.0)
            .with_element("b", 1000.0, 1000.0);

        assert_eq!(
            doc.element_geometry("b", &ScrollTarget::Page),
            Some(ElementGeometry::new(1000.0, 1000.0))
        );
        doc.set_scroll_top(&ScrollTarget::Page, 250.0);
        assert_eq!(doc.element_geometry("b", &ScrollTarget::Page).unwrap().top, 750.0);
        assert!(doc.element_geometry("missing", &ScrollTarget::Page).is_none());
    }

    #[test]
    fn test_scroll_is_clamped() {
        let doc = HeadlessDocument::new(800.0).with_element("a", 0.0, 2000.0);
        doc.set_scroll_top(&ScrollTarget::Page, -40.0);
        assert_eq!(doc.page_scroll_top(), 0.0);
        doc.set_scroll_top(&ScrollTarget::Page, 5000.0);
        assert_eq!(doc.page_scroll_top(), 1200.0);
    }

    #[test]
    fn test_page_write_keeps_horizontal_scroll() {
        let doc = HeadlessDocument::new(800.0).with_element("a", 0.0, 2000.0);
        doc.set_page_scroll_left(30.0);
        doc.set_scroll_top(&ScrollTarget::Page, 100.0);
        assert_eq!(doc.page_scroll_left(), 30.0);
    }

    #[test]
    fn test_container_geometry() {
        let doc = HeadlessDocument::new(800.0)
            .with_element("header", 0.0, 2000.0)
            .with_container("sidebar", 100.0, 300.0)
            .with_element_in("sidebar", "notes", 450.0, 200.0);

        let before = doc.element_geometry("notes", &sidebar()).unwrap();
        assert_eq!(before.top, 450.0);

        doc.set_scroll_top(&sidebar(), 120.0);
        assert_eq!(doc.container_scroll_top("sidebar"), Some(120.0));
        assert_eq!(doc.element_geometry("notes", &sidebar()).unwrap().top, 330.0);

        // Measured against the page instead, the container's own offset counts
        doc.set_scroll_top(&ScrollTarget::Page, 40.0);
        assert_eq!(
            doc.element_geometry("notes", &ScrollTarget::Page).unwrap().top,
            100.0 - 40.0 + 450.0 - 120.0
        );
        // Page scroll does not move it relative to its own container
        assert_eq!(doc.element_geometry("notes", &sidebar()).unwrap().top, 330.0);
    }

    #[test]
    fn test_missing_container() {
        let doc = HeadlessDocument::new(800.0).with_element("a", 0.0, 100.0);
        let ghost = ScrollTarget::Container("ghost".into());
        assert_eq!(doc.client_height(&ghost), None);
        assert!(doc.element_geometry("a", &ghost).is_none());
        doc.set_scroll_top(&ghost, 10.0);
        assert_eq!(doc.scroll_top(&ghost), 0.0);
    }

    #[test]
    fn test_history_and_clock() {
        let doc = HeadlessDocument::new(800.0);
        let t0 = doc.now();
        doc.advance_ms(16);
        assert_eq!(doc.now() - t0, Duration::from_millis(16));

        doc.push_fragment("intro");
        assert_eq!(doc.history(), vec!["#intro".to_string()]);
    }
}
