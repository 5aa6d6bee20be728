//! Scroll-linked anchor controller
//!
//! A [`ScrollLink`] ties one clickable element to a destination element.
//!
//! # Lifecycle
//!
//! ```text
//! new ──mount──► registered + subscribed ──settle_layout──► first check
//!                     │
//!                     ├── scroll signal ──► evaluate ──► Focus / Blur
//!                     ├── click ──► pause detection, tween, Focus,
//!                     │             blur every other anchor
//!                     │             (tween completion resumes detection)
//!                     └── unmount ──► unregistered, tween cancelled
//! ```
//!
//! Focus and blur are edge-triggered through [`AnchorState`]; callbacks only
//! fire on an actual transition.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use anchor_animation::{CompletionCallback, ScrollAnimationId, ScrollRun};
use anchor_core::{
    round_half_up, MemberId, NodeId, RegistryMember, ScopeTag, ScrollListener, ScrollTarget,
    SubscriptionId,
};

use crate::config::{AnchorCallbacks, AnchorConfig, AnchorEvent};
use crate::page::AnchorPage;
use crate::props::{Props, RenderedAnchor};
use crate::state::{AnchorInput, AnchorState};

/// Click delivered to an anchor
///
/// The anchor always suppresses the host's default navigation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClickEvent {
    default_prevented: bool,
}

impl ClickEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Scroll offset that brings the destination into place
///
/// `element_top` is the destination's top relative to the container's
/// visible top edge, `scroll_top` the container's current offset. With
/// `to_show_height` the destination lands on the activation window's start
/// edge, half a pixel inside so the first passive check after the tween
/// still sees it as active.
pub fn destination_offset(
    element_top: f32,
    scroll_top: f32,
    container_height: f32,
    config: &AnchorConfig,
) -> f32 {
    let to_top = round_half_up(element_top + scroll_top) - config.offset_top;
    if config.to_show_height {
        let to_show = config.show_height_active.start.resolve(container_height);
        to_top - to_show + 0.5
    } else {
        to_top
    }
}

/// One scroll-linked anchor
pub struct ScrollLink {
    config: AnchorConfig,
    callbacks: AnchorCallbacks,
    target: ScrollTarget,
    page: Weak<AnchorPage>,
    node: Cell<Option<NodeId>>,
    member: Cell<Option<MemberId>>,
    subscription: Cell<Option<SubscriptionId>>,
    animation: Cell<Option<ScrollAnimationId>>,
    state: Cell<AnchorState>,
}

impl ScrollLink {
    /// Create an unmounted anchor on `page`
    pub fn new(page: &Rc<AnchorPage>, config: AnchorConfig, callbacks: AnchorCallbacks) -> Rc<Self> {
        let target = config.scroll_target();
        Rc::new(Self {
            config,
            callbacks,
            target,
            page: Rc::downgrade(page),
            node: Cell::new(None),
            member: Cell::new(None),
            subscription: Cell::new(None),
            animation: Cell::new(None),
            state: Cell::new(AnchorState::Inactive),
        })
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Scroll container this anchor observes and animates
    pub fn target(&self) -> &ScrollTarget {
        &self.target
    }

    pub fn state(&self) -> AnchorState {
        self.state.get()
    }

    pub fn is_active(&self) -> bool {
        self.state.get().is_active()
    }

    pub fn is_mounted(&self) -> bool {
        self.member.get().is_some()
    }

    /// Host element this anchor rendered into, once mounted
    pub fn node(&self) -> Option<NodeId> {
        self.node.get()
    }

    /// Whether this anchor's click tween is still running
    pub fn is_animating(&self) -> bool {
        match (self.animation.get(), self.page.upgrade()) {
            (Some(id), Some(page)) => page.animator().is_live(id),
            _ => false,
        }
    }

    /// Attach to the page
    ///
    /// Registers for exclusive activation and subscribes to scroll signals
    /// of the target container. The first activation check runs at the
    /// page's next [`AnchorPage::settle_layout`]. Mounting twice is a no-op.
    pub fn mount(self: &Rc<Self>, node: NodeId) {
        if self.is_mounted() {
            tracing::debug!("ScrollLink #{}: already mounted", self.config.to);
            return;
        }
        let Some(page) = self.page.upgrade() else {
            tracing::warn!("ScrollLink #{}: page dropped, mount ignored", self.config.to);
            return;
        };

        self.node.set(Some(node));

        let member = Rc::downgrade(self) as Weak<dyn RegistryMember>;
        self.member.set(Some(page.registry().add(member)));

        let listener = Rc::downgrade(self) as Weak<dyn ScrollListener>;
        let subscription = page
            .channel()
            .subscribe(self.target.clone(), ScopeTag::ScrollAnchor, listener);
        self.subscription.set(Some(subscription));

        page.defer_evaluation(Rc::downgrade(self));
        tracing::debug!("ScrollLink #{}: mounted on {}", self.config.to, self.target);
    }

    /// Detach from the page
    ///
    /// Leaves the registry, drops the scroll subscription and cancels an
    /// in-flight tween. A cancelled tween never resumes passive detection.
    pub fn unmount(&self) {
        let Some(page) = self.page.upgrade() else {
            return;
        };

        if let Some(member) = self.member.take() {
            page.registry().remove(member);
        }
        if let Some(subscription) = self.subscription.take() {
            page.channel().unsubscribe(subscription);
        }
        if let Some(animation) = self.animation.take() {
            page.animator().cancel(animation);
        }
        if self.node.take().is_some() {
            tracing::debug!("ScrollLink #{}: unmounted", self.config.to);
        }
    }

    /// Handle a click
    ///
    /// Scrolls the target container to the destination and makes this the
    /// only active anchor. Passive detection is paused for every anchor
    /// until the tween completes. A missing destination leaves everything
    /// untouched; a click while this anchor's own tween is running is
    /// ignored.
    pub fn click(&self, event: &mut ClickEvent) {
        event.prevent_default();
        self.callbacks.click(&self.event());

        let (Some(page), Some(member)) = (self.page.upgrade(), self.member.get()) else {
            tracing::trace!("ScrollLink #{}: click while unmounted", self.config.to);
            return;
        };
        let host = page.host();

        let Some(geometry) = host.element_geometry(&self.config.to, &self.target) else {
            tracing::debug!(
                "ScrollLink #{}: destination not found, click ignored",
                self.config.to
            );
            return;
        };

        page.channel().pause_all(ScopeTag::ScrollAnchor);
        if self.is_animating() {
            tracing::trace!("ScrollLink #{}: already scrolling", self.config.to);
            return;
        }

        let scroll_top = host.scroll_top(&self.target);
        let container_height = host.client_height(&self.target).unwrap_or(0.0);
        let destination = destination_offset(geometry.top, scroll_top, container_height, &self.config);

        let run = ScrollRun::new(self.target.clone(), scroll_top, destination)
            .duration_ms(self.config.duration_ms)
            .easing(self.config.ease);
        // Detection stays paused until the last in-flight tween lands
        let weak_page = Rc::downgrade(&page);
        let on_complete: CompletionCallback = Box::new(move || {
            let Some(page) = weak_page.upgrade() else {
                return;
            };
            if page.animator().has_active() {
                tracing::trace!("ScrollLink: tween landed, others still running");
                return;
            }
            page.channel().resume_all(ScopeTag::ScrollAnchor);
        });
        self.animation
            .set(page.animator().start_at(member, run, host.now(), Some(on_complete)));

        page.registry().deactivate_all_except(member);
        self.apply(AnchorInput::Focus);
    }

    /// Passive activation check against current geometry
    ///
    /// Returns true if the state changed. A missing destination or
    /// container leaves the state as it is.
    pub fn evaluate(&self) -> bool {
        let Some(page) = self.page.upgrade() else {
            return false;
        };
        let host = page.host();
        let Some(container_height) = host.client_height(&self.target) else {
            return false;
        };
        let Some(geometry) = host.element_geometry(&self.config.to, &self.target) else {
            return false;
        };

        let input = if self.config.show_height_active.contains(geometry, container_height) {
            AnchorInput::Focus
        } else {
            AnchorInput::Blur
        };
        self.apply(input)
    }

    /// Render output for the current state
    pub fn render(&self, props: &Props) -> RenderedAnchor {
        RenderedAnchor::build(
            &self.config.component,
            props,
            &self.config.active_class,
            self.is_active(),
        )
    }

    fn event(&self) -> AnchorEvent {
        AnchorEvent {
            target: self.node.get(),
            to: self.config.to.clone(),
        }
    }

    fn apply(&self, input: AnchorInput) -> bool {
        let Some(next) = self.state.get().on_event(input) else {
            return false;
        };
        self.state.set(next);

        let event = self.event();
        if next.is_active() {
            tracing::debug!("ScrollLink #{}: focus", self.config.to);
            self.callbacks.focus(&event);
            if self.config.to_hash {
                if let Some(page) = self.page.upgrade() {
                    page.host().push_fragment(&self.config.to);
                }
            }
        } else {
            tracing::debug!("ScrollLink #{}: blur", self.config.to);
            self.callbacks.blur(&event);
        }
        true
    }
}

impl ScrollListener for ScrollLink {
    fn on_scroll(&self, _target: &ScrollTarget) {
        self.evaluate();
    }
}

impl RegistryMember for ScrollLink {
    fn deactivate(&self) -> bool {
        self.apply(AnchorInput::Blur)
    }
}

impl Drop for ScrollLink {
    fn drop(&mut self) {
        self.unmount();
    }
}
