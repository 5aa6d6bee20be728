//! Scroll event channel
//!
//! Routes scroll signals from the host to subscribed listeners, scoped by
//! [`ScrollTarget`]. Every subscription carries a [`ScopeTag`]; pausing a tag
//! silences all of its subscriptions at once without removing them.
//!
//! ```text
//! Host scroll (page or container)
//!     ↓
//! EventChannel::dispatch(target)
//!     ↓  (paused scopes dropped, nothing queued)
//! ScrollListener::on_scroll
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::rc::{Rc, Weak};
//! use std::cell::Cell;
//! use anchor_core::events::{EventChannel, ScopeTag, ScrollListener};
//! use anchor_core::host::ScrollTarget;
//!
//! struct Counter(Cell<u32>);
//!
//! impl ScrollListener for Counter {
//!     fn on_scroll(&self, _target: &ScrollTarget) {
//!         self.0.set(self.0.get() + 1);
//!     }
//! }
//!
//! let channel = EventChannel::new();
//! let counter = Rc::new(Counter(Cell::new(0)));
//! let weak: Weak<dyn ScrollListener> = Rc::downgrade(&counter) as Weak<dyn ScrollListener>;
//! channel.subscribe(ScrollTarget::Page, ScopeTag::ScrollAnchor, weak);
//!
//! channel.dispatch(&ScrollTarget::Page);
//! channel.pause_all(ScopeTag::ScrollAnchor);
//! channel.dispatch(&ScrollTarget::Page); // dropped
//! assert_eq!(counter.0.get(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::host::ScrollTarget;

/// Handle to a scroll subscription, used to unsubscribe
///
/// Ids are never reused within a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw value, for logging
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

/// Scope a subscription belongs to, for bulk pause/resume
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeTag {
    /// Passive activation detectors of scroll-linked anchors
    ScrollAnchor,
    /// Application-defined scope
    Custom(u32),
}

/// Receiver of scroll signals
///
/// Registered as a `Weak` reference so a subscription never keeps its
/// owner alive.
pub trait ScrollListener {
    fn on_scroll(&self, target: &ScrollTarget);
}

struct Subscription {
    target: ScrollTarget,
    scope: ScopeTag,
    listener: Weak<dyn ScrollListener>,
}

/// Scroll signal subscriptions with scope-wide pause/resume
///
/// Listeners of one target are invoked in subscription order.
#[derive(Default)]
pub struct EventChannel {
    subscriptions: RefCell<IndexMap<SubscriptionId, Subscription>>,
    paused: RefCell<FxHashSet<ScopeTag>>,
    next_id: Cell<u64>,
}

impl EventChannel {
    /// Create an empty channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener to a target's scroll signal
    pub fn subscribe(
        &self,
        target: ScrollTarget,
        scope: ScopeTag,
        listener: Weak<dyn ScrollListener>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscriptions.borrow_mut().insert(
            id,
            Subscription {
                target,
                scope,
                listener,
            },
        );
        tracing::trace!("EventChannel: subscribed {:?} ({:?})", id, scope);
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.subscriptions.borrow_mut().shift_remove(&id).is_some();
        if removed {
            tracing::trace!("EventChannel: unsubscribed {:?}", id);
        }
        removed
    }

    /// Stop delivering signals to every subscription tagged `scope`
    ///
    /// Idempotent: pausing an already paused scope changes nothing, and a
    /// single `resume_all` re-enables it.
    pub fn pause_all(&self, scope: ScopeTag) {
        if self.paused.borrow_mut().insert(scope) {
            tracing::debug!("EventChannel: paused {:?}", scope);
        }
    }

    /// Resume delivery to every subscription tagged `scope`
    ///
    /// Signals dropped while paused are not replayed.
    pub fn resume_all(&self, scope: ScopeTag) {
        if self.paused.borrow_mut().remove(&scope) {
            tracing::debug!("EventChannel: resumed {:?}", scope);
        }
    }

    pub fn is_paused(&self, scope: ScopeTag) -> bool {
        self.paused.borrow().contains(&scope)
    }

    /// Deliver a scroll signal for `target`
    ///
    /// The set of receivers is fixed before the first listener runs, so a
    /// listener that pauses, resumes, or unsubscribes only affects the next
    /// dispatch. Returns the number of listeners invoked.
    pub fn dispatch(&self, target: &ScrollTarget) -> usize {
        let mut receivers: SmallVec<[Rc<dyn ScrollListener>; 8]> = SmallVec::new();
        let mut dead: SmallVec<[SubscriptionId; 4]> = SmallVec::new();
        let mut dropped = 0usize;

        {
            let paused = self.paused.borrow();
            let subscriptions = self.subscriptions.borrow();
            for (&id, sub) in subscriptions.iter() {
                if &sub.target != target {
                    continue;
                }
                if paused.contains(&sub.scope) {
                    dropped += 1;
                    continue;
                }
                match sub.listener.upgrade() {
                    Some(listener) => receivers.push(listener),
                    None => dead.push(id),
                }
            }
        }

        if !dead.is_empty() {
            let mut subscriptions = self.subscriptions.borrow_mut();
            for id in dead {
                subscriptions.shift_remove(&id);
            }
        }

        if dropped > 0 {
            tracing::trace!("EventChannel: dropped {} signal(s) on {}", dropped, target);
        }

        for listener in &receivers {
            listener.on_scroll(target);
        }
        receivers.len()
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.borrow().is_empty()
    }
}
