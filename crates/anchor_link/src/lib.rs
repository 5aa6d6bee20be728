//! Scroll-Linked Anchors
//!
//! A [`ScrollLink`] is a clickable element bound to a destination element.
//! It does two things:
//!
//! 1. **Click**: smoothly animates the page (or a scroll container) to the
//!    destination and becomes the only active anchor on the page.
//! 2. **Scroll**: passively marks itself active whenever the destination is
//!    inside its activation window, and inactive when it leaves.
//!
//! While any anchor's click animation is in flight, passive detection is
//! paused for *every* anchor on the page, so a navigation click always wins
//! over the scroll positions it passes through.
//!
//! # Architecture
//!
//! ```text
//! AnchorPage (one per page)
//!   ├── ScrollHost      geometry, scroll offsets, history (host supplied)
//!   ├── EventChannel    scroll signals -> ScrollLink::evaluate
//!   ├── Registry        "deactivate everyone but me" on click
//!   └── ScrollAnimator  frame-driven tween, resumes detection on completion
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use anchor_core::NodeId;
//! use anchor_link::{AnchorCallbacks, AnchorConfig, AnchorPage, ClickEvent, HeadlessDocument};
//!
//! let doc = Rc::new(
//!     HeadlessDocument::new(800.0)
//!         .with_element("intro", 0.0, 1000.0)
//!         .with_element("usage", 1000.0, 1000.0),
//! );
//! let page = AnchorPage::new(doc.clone());
//! let link = page.link(AnchorConfig::new("usage"), AnchorCallbacks::new());
//! link.mount(NodeId(1));
//! page.settle_layout();
//!
//! link.click(&mut ClickEvent::new());
//! assert!(link.is_active());
//!
//! // Drive frames until the tween lands
//! doc.advance_ms(500);
//! page.frame();
//! assert_eq!(doc.page_scroll_top(), 1000.0);
//! ```

pub mod class_name;
pub mod config;
pub mod headless;
pub mod link;
pub mod page;
pub mod props;
pub mod state;

pub use class_name::toggle_active_class;
pub use config::{AnchorCallback, AnchorCallbacks, AnchorConfig, AnchorEvent};
pub use headless::HeadlessDocument;
pub use link::{destination_offset, ClickEvent, ScrollLink};
pub use page::AnchorPage;
pub use props::{forward_props, Props, RenderedAnchor, CONSUMED_PROPS};
pub use state::{AnchorInput, AnchorState};
