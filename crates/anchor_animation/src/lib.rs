//! Anchor Animation System
//!
//! Scroll-position tweening for scroll-linked anchors.
//!
//! # Features
//!
//! - **Named Easing Curves**: The standard Penner set (quad, cubic, sine,
//!   expo, back, elastic, bounce, ...) addressed by camelCase name
//! - **Frame-Driven Scheduler**: Runs advance once per host frame and apply
//!   eased offsets to the page or a scroll container
//! - **Owner Exclusivity**: At most one live run per owner; a second start is
//!   refused, not queued; a newer run on the same scroll target supersedes
//!   the older one
//! - **Cancellation**: Cancelled runs stop immediately and never signal
//!   completion

pub mod easing;
pub mod scheduler;

pub use easing::{Easing, UnknownEasing};
pub use scheduler::{
    CompletionCallback, FrameOutcome, ScrollAnimationId, ScrollAnimator, ScrollRun, WakeCallback,
};
