//! Scroll animation scheduler
//!
//! Owns every in-flight scroll tween of a page and advances them once per
//! rendered frame. The host drives it: call [`ScrollAnimator::tick_at`] from
//! the frame callback while it keeps returning `needs_frame`.
//!
//! Each run belongs to an owner ([`MemberId`]). An owner may have at most one
//! live run; starting another while one is live is refused rather than
//! queued or restarted. A scroll target is driven by at most one run: a new
//! run from another owner supersedes the old one, whose completion callback
//! is dropped.
//!
//! # Frame Order
//!
//! ```text
//! tick_at(now)
//!     ↓  eased position for every run (elapsed clamped to duration)
//! host.set_scroll_top(...)       all positions of the frame applied
//!     ↓
//! completion callbacks           runs that reached their duration
//! ```
//!
//! Cancelled runs are removed without calling their completion callback.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anchor_core::{MemberId, ScrollHost, ScrollTarget};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::easing::Easing;

new_key_type! {
    /// Handle to a live scroll animation
    pub struct ScrollAnimationId;
}

/// Called once when a run reaches its destination
pub type CompletionCallback = Box<dyn FnOnce()>;

/// Called when a run starts, so an idle host can resume frame scheduling
pub type WakeCallback = Rc<dyn Fn()>;

/// Default tween duration in milliseconds
pub const DEFAULT_DURATION_MS: u32 = 450;

/// A scroll tween request
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollRun {
    pub target: ScrollTarget,
    pub from: f32,
    pub to: f32,
    pub duration_ms: u32,
    pub easing: Easing,
}

impl ScrollRun {
    /// Tween `target` from `from` to `to` with the default duration and curve
    pub fn new(target: ScrollTarget, from: f32, to: f32) -> Self {
        Self {
            target,
            from,
            to,
            duration_ms: DEFAULT_DURATION_MS,
            easing: Easing::default(),
        }
    }

    pub fn duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Eased position after `elapsed_ms`
    pub fn position_at(&self, elapsed_ms: f32) -> f32 {
        let duration = self.duration_ms as f32;
        self.easing
            .tween(elapsed_ms.min(duration), self.from, self.to, duration)
    }
}

struct ActiveRun {
    owner: MemberId,
    run: ScrollRun,
    started_at: Instant,
    on_complete: Option<CompletionCallback>,
}

/// Result of one frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameOutcome {
    /// Scroll targets whose offset was written this frame
    pub moved: SmallVec<[ScrollTarget; 2]>,
    /// Runs that reached their destination this frame
    pub completed: usize,
    /// Whether any run is still live after this frame
    pub needs_frame: bool,
}

/// Frame-driven scroll tween scheduler
#[derive(Default)]
pub struct ScrollAnimator {
    runs: RefCell<SlotMap<ScrollAnimationId, ActiveRun>>,
    wake_callback: RefCell<Option<WakeCallback>>,
}

impl ScrollAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a callback fired whenever a run starts
    pub fn set_wake_callback<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        *self.wake_callback.borrow_mut() = Some(Rc::new(callback));
    }

    /// Start a run timed from `Instant::now()`
    pub fn start(
        &self,
        owner: MemberId,
        run: ScrollRun,
        on_complete: Option<CompletionCallback>,
    ) -> Option<ScrollAnimationId> {
        self.start_at(owner, run, Instant::now(), on_complete)
    }

    /// Start a run timed from `now`
    ///
    /// Returns `None` without touching anything if `owner` already has a
    /// live run. Runs of other owners on the same target are cancelled.
    pub fn start_at(
        &self,
        owner: MemberId,
        run: ScrollRun,
        now: Instant,
        on_complete: Option<CompletionCallback>,
    ) -> Option<ScrollAnimationId> {
        if let Some(existing) = self.live_run_for(owner) {
            tracing::trace!(
                "ScrollAnimator: owner {} already animating ({:?}), start refused",
                owner.to_raw(),
                existing
            );
            return None;
        }

        tracing::debug!(
            "ScrollAnimator: {} {} -> {} over {}ms ({})",
            run.target,
            run.from,
            run.to,
            run.duration_ms,
            run.easing
        );
        let id = {
            let mut runs = self.runs.borrow_mut();
            let superseded: SmallVec<[ScrollAnimationId; 2]> = runs
                .iter()
                .filter(|(_, active)| active.run.target == run.target)
                .map(|(id, _)| id)
                .collect();
            for old in superseded {
                runs.remove(old);
                tracing::debug!("ScrollAnimator: {:?} superseded", old);
            }
            runs.insert(ActiveRun {
                owner,
                run,
                started_at: now,
                on_complete,
            })
        };

        let wake = self.wake_callback.borrow().clone();
        if let Some(wake) = wake {
            wake();
        }
        Some(id)
    }

    /// Stop a run immediately; its completion callback never fires
    pub fn cancel(&self, id: ScrollAnimationId) -> bool {
        let cancelled = self.runs.borrow_mut().remove(id).is_some();
        if cancelled {
            tracing::debug!("ScrollAnimator: cancelled {:?}", id);
        }
        cancelled
    }

    pub fn is_live(&self, id: ScrollAnimationId) -> bool {
        self.runs.borrow().contains_key(id)
    }

    /// The live run owned by `owner`, if any
    pub fn live_run_for(&self, owner: MemberId) -> Option<ScrollAnimationId> {
        self.runs
            .borrow()
            .iter()
            .find(|(_, active)| active.owner == owner)
            .map(|(id, _)| id)
    }

    /// Snapshot of a live run's request
    pub fn run(&self, id: ScrollAnimationId) -> Option<ScrollRun> {
        self.runs.borrow().get(id).map(|active| active.run.clone())
    }

    pub fn has_active(&self) -> bool {
        !self.runs.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.runs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.borrow().is_empty()
    }

    /// Advance every run using `Instant::now()`
    pub fn tick(&self, host: &dyn ScrollHost) -> FrameOutcome {
        self.tick_at(Instant::now(), host)
    }

    /// Advance every run to `now` and apply positions to the host
    pub fn tick_at(&self, now: Instant, host: &dyn ScrollHost) -> FrameOutcome {
        let mut writes: SmallVec<[(ScrollTarget, f32); 2]> = SmallVec::new();
        let mut finished: SmallVec<[ScrollAnimationId; 2]> = SmallVec::new();

        {
            let runs = self.runs.borrow();
            for (id, active) in runs.iter() {
                let duration = Duration::from_millis(active.run.duration_ms as u64);
                let elapsed = now.saturating_duration_since(active.started_at).min(duration);
                let elapsed_ms = elapsed.as_secs_f32() * 1000.0;
                let position = active.run.position_at(elapsed_ms);

                tracing::trace!(
                    "ScrollAnimator: {:?} at {:.1}ms -> {:.2}",
                    id,
                    elapsed_ms,
                    position
                );
                writes.push((active.run.target.clone(), position));
                if elapsed == duration {
                    finished.push(id);
                }
            }
        }

        let callbacks: SmallVec<[CompletionCallback; 2]> = {
            let mut runs = self.runs.borrow_mut();
            let callbacks = finished
                .iter()
                .filter_map(|id| runs.remove(*id))
                .filter_map(|active| active.on_complete)
                .collect();
            callbacks
        };

        let mut moved: SmallVec<[ScrollTarget; 2]> = SmallVec::new();
        for (target, position) in writes {
            host.set_scroll_top(&target, position);
            if !moved.contains(&target) {
                moved.push(target);
            }
        }

        for callback in callbacks {
            callback();
        }
        if !finished.is_empty() {
            tracing::debug!("ScrollAnimator: {} run(s) completed", finished.len());
        }

        FrameOutcome {
            moved,
            completed: finished.len(),
            needs_frame: self.has_active(),
        }
    }
}
