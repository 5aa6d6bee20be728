//! Anchor Core
//!
//! Host-agnostic primitives shared by every scroll-linked anchor on a page:
//!
//! - **Event Channel**: Scroll signal subscriptions with scope-wide pause/resume
//! - **Activation Window**: Geometry that decides whether a target is "in view"
//! - **Registry**: Ordered set of live anchors for mutual-exclusion broadcasts
//! - **Host Interface**: The few operations an anchor needs from its page
//!
//! Everything here is single-threaded. Page-level state lives in `Rc`/`RefCell`
//! owned by one page context, never in statics.
//!
//! # Example
//!
//! ```rust
//! use anchor_core::window::{ActivationWindow, Bound};
//! use anchor_core::host::ElementGeometry;
//!
//! let window = ActivationWindow::uniform(Bound::Percent(50.0));
//!
//! // Target top sits 300px below the visible edge of an 800px viewport
//! let geometry = ElementGeometry::new(300.0, 600.0);
//! assert!(window.contains(geometry, 800.0));
//! ```

pub mod error;
pub mod events;
pub mod host;
pub mod registry;
pub mod window;

pub use error::{AnchorError, Result};
pub use events::{EventChannel, ScopeTag, ScrollListener, SubscriptionId};
pub use host::{ElementGeometry, NodeId, ScrollHost, ScrollTarget};
pub use registry::{MemberId, Registry, RegistryMember};
pub use window::{is_active, round_half_up, ActivationThresholds, ActivationWindow, Bound};
