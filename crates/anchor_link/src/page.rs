//! Page context
//!
//! One [`AnchorPage`] per page (or per independent document region). It owns
//! the shared machinery every anchor on that page coordinates through, and
//! is the entry point for the host's two scheduling primitives:
//!
//! - scroll signals -> [`AnchorPage::scroll_signal`]
//! - rendered frames -> [`AnchorPage::frame`]

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;

use anchor_animation::ScrollAnimator;
use anchor_core::{EventChannel, Registry, ScopeTag, ScrollHost, ScrollTarget};

use crate::config::{AnchorCallbacks, AnchorConfig};
use crate::link::ScrollLink;

/// Shared state of all anchors on one page
pub struct AnchorPage {
    host: Rc<dyn ScrollHost>,
    channel: Rc<EventChannel>,
    registry: Registry,
    animator: ScrollAnimator,
    /// Anchors mounted since the last layout settle
    pending: RefCell<Vec<Weak<ScrollLink>>>,
}

impl AnchorPage {
    pub fn new(host: Rc<dyn ScrollHost>) -> Rc<Self> {
        Rc::new(Self {
            host,
            channel: Rc::new(EventChannel::new()),
            registry: Registry::new(),
            animator: ScrollAnimator::new(),
            pending: RefCell::new(Vec::new()),
        })
    }

    /// Create an anchor bound to this page (not yet mounted)
    pub fn link(self: &Rc<Self>, config: AnchorConfig, callbacks: AnchorCallbacks) -> Rc<ScrollLink> {
        ScrollLink::new(self, config, callbacks)
    }

    pub fn host(&self) -> &dyn ScrollHost {
        &*self.host
    }

    pub fn channel(&self) -> &Rc<EventChannel> {
        &self.channel
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn animator(&self) -> &ScrollAnimator {
        &self.animator
    }

    /// Whether any anchor's click animation is in flight
    pub fn is_animating(&self) -> bool {
        self.animator.has_active()
    }

    /// Deliver a scroll signal from the host
    ///
    /// Returns how many anchors received it (0 while detection is paused).
    pub fn scroll_signal(&self, target: &ScrollTarget) -> usize {
        self.channel.dispatch(target)
    }

    /// Scroll like a user would: write the offset, then signal
    pub fn scroll_to(&self, target: &ScrollTarget, y: f32) -> usize {
        self.host.set_scroll_top(target, y);
        self.scroll_signal(target)
    }

    /// Advance animations to the host's current frame time
    ///
    /// Returns true while another frame is needed.
    pub fn frame(&self) -> bool {
        self.frame_at(self.host.now())
    }

    /// Advance animations to `now`
    ///
    /// Every container moved by the frame gets a scroll signal after the
    /// frame's completions have run, the way a browser delivers the scroll
    /// event after the frame callback.
    pub fn frame_at(&self, now: Instant) -> bool {
        let outcome = self.animator.tick_at(now, &*self.host);
        for target in &outcome.moved {
            self.channel.dispatch(target);
        }
        outcome.needs_frame
    }

    pub(crate) fn defer_evaluation(&self, link: Weak<ScrollLink>) {
        self.pending.borrow_mut().push(link);
    }

    /// Run the first activation check for anchors mounted since last call
    ///
    /// Call once layout has settled after mounting. While passive detection
    /// is paused by a click animation the checks stay queued for a later
    /// call. Returns the number of anchors evaluated.
    pub fn settle_layout(&self) -> usize {
        if self.channel.is_paused(ScopeTag::ScrollAnchor) {
            tracing::trace!("AnchorPage: detection paused, initial checks deferred");
            return 0;
        }

        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        let mut evaluated = 0;
        for link in pending.iter().filter_map(Weak::upgrade) {
            if link.is_mounted() {
                link.evaluate();
                evaluated += 1;
            }
        }
        evaluated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDocument;
    use anchor_core::NodeId;

    fn page() -> (Rc<HeadlessDocument>, Rc<AnchorPage>) {
        let doc = Rc::new(
            HeadlessDocument::new(800.0)
                .with_element("intro", 0.0, 1000.0)
                .with_element("usage", 1000.0, 1000.0),
        );
        let page = AnchorPage::new(doc.clone());
        (doc, page)
    }

    #[test]
    fn test_settle_evaluates_each_mount_once() {
        let (_doc, page) = page();
        let intro = page.link(AnchorConfig::new("intro"), AnchorCallbacks::new());
        intro.mount(NodeId(1));
        assert!(!intro.is_active());

        assert_eq!(page.settle_layout(), 1);
        assert!(intro.is_active());
        assert_eq!(page.settle_layout(), 0);
    }

    #[test]
    fn test_settle_waits_while_paused() {
        let (_doc, page) = page();
        let intro = page.link(AnchorConfig::new("intro"), AnchorCallbacks::new());
        intro.mount(NodeId(1));

        page.channel().pause_all(ScopeTag::ScrollAnchor);
        assert_eq!(page.settle_layout(), 0);
        assert!(!intro.is_active());

        page.channel().resume_all(ScopeTag::ScrollAnchor);
        assert_eq!(page.settle_layout(), 1);
        assert!(intro.is_active());
    }

    #[test]
    fn test_settle_skips_unmounted() {
        let (_doc, page) = page();
        let intro = page.link(AnchorConfig::new("intro"), AnchorCallbacks::new());
        intro.mount(NodeId(1));
        intro.unmount();
        assert_eq!(page.settle_layout(), 0);
    }

    #[test]
    fn test_scroll_to_writes_and_signals() {
        let (doc, page) = page();
        let usage = page.link(AnchorConfig::new("usage"), AnchorCallbacks::new());
        usage.mount(NodeId(2));

        assert_eq!(page.scroll_to(&ScrollTarget::Page, 700.0), 1);
        assert_eq!(doc.page_scroll_top(), 700.0);
        assert!(usage.is_active());

        // Container signals don't reach page anchors
        assert_eq!(page.scroll_signal(&ScrollTarget::Container("x".into())), 0);
    }

    #[test]
    fn test_frame_without_animations() {
        let (_doc, page) = page();
        assert!(!page.frame());
        assert!(!page.is_animating());
    }
}
