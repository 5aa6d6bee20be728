//! Headless scene playback
//!
//! Mounts every link of a [`Scene`] on a [`HeadlessDocument`], settles
//! layout, then plays the script. `wait` steps run fixed-rate frames; any
//! tween still in flight after the last step is driven to completion.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use anchor_core::{NodeId, ScrollHost, ScrollTarget};
use anchor_link::{
    AnchorCallbacks, AnchorEvent, AnchorPage, ClickEvent, HeadlessDocument, ScrollLink,
};
use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::scene::{Scene, Step};

/// Upper bound on frames spent draining tweens after the script ends
const MAX_DRAIN_FRAMES: usize = 10_000;

/// Highest frame rate accepted; keeps every frame at least 1ms long
pub const MAX_FPS: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    Click,
    Focus,
    Blur,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            TransitionKind::Click => "click",
            TransitionKind::Focus => "focus",
            TransitionKind::Blur => "blur",
        })
    }
}

/// One callback observed during playback
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub at_ms: u128,
    pub kind: TransitionKind,
    pub to: String,
}

/// Outcome of a playback
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    pub transitions: Vec<Transition>,
    /// Destinations of anchors active at the end, in link order
    pub active: Vec<String>,
    /// Final scroll offset of the page and every container
    pub scroll: Vec<(ScrollTarget, f32)>,
    pub frames: usize,
}

/// A scene mounted on a headless page
pub struct Simulation {
    scene: Scene,
    doc: Rc<HeadlessDocument>,
    page: Rc<AnchorPage>,
    links: Vec<Rc<ScrollLink>>,
    log: Rc<RefCell<Vec<Transition>>>,
    elapsed: Rc<Cell<Duration>>,
    frame: Duration,
    frames: usize,
}

impl Simulation {
    pub fn new(scene: Scene, fps: u32) -> Result<Self> {
        if !(1..=MAX_FPS).contains(&fps) {
            bail!("fps must be between 1 and {}, got {}", MAX_FPS, fps);
        }
        let problems = scene.problems();
        if !problems.is_empty() {
            bail!("invalid scene: {}", problems.join("; "));
        }

        let doc = Rc::new(scene.document());
        let page = AnchorPage::new(doc.clone());
        let log = Rc::new(RefCell::new(Vec::new()));
        let elapsed = Rc::new(Cell::new(Duration::ZERO));

        let links = scene
            .links
            .iter()
            .enumerate()
            .map(|(i, config)| {
                let link = page.link(config.clone(), recorder(&log, &elapsed));
                link.mount(NodeId(i as u64 + 1));
                link
            })
            .collect();

        Ok(Self {
            scene,
            doc,
            page,
            links,
            log,
            elapsed,
            frame: Duration::from_nanos(1_000_000_000 / u64::from(fps)),
            frames: 0,
        })
    }

    /// Play the script and collect the results
    pub fn run(mut self) -> Result<Report> {
        self.page.settle_layout();

        let script = std::mem::take(&mut self.scene.script);
        for step in &script {
            debug!("step: {:?}", step);
            self.step(step)?;
        }

        let mut drained = 0;
        while self.page.is_animating() {
            if drained == MAX_DRAIN_FRAMES {
                bail!("animation still running after {} frames", MAX_DRAIN_FRAMES);
            }
            self.tick();
            drained += 1;
        }
        if drained > 0 {
            debug!("drained {} frame(s) after script", drained);
        }

        Ok(self.report())
    }

    fn step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Scroll { y, target } => {
                let target = ScrollTarget::from_container_id(target.as_deref());
                let delivered = self.page.scroll_to(&target, *y);
                debug!("scrolled {} to {} ({} listener(s))", target, y, delivered);
            }
            Step::Click { link } => {
                let Some(anchor) = self.links.iter().find(|l| &l.config().to == link) else {
                    bail!("no link to '{}'", link);
                };
                anchor.click(&mut ClickEvent::new());
            }
            Step::Wait { ms } => {
                let until = self.elapsed.get() + Duration::from_millis(*ms);
                while self.elapsed.get() < until {
                    self.tick();
                }
            }
            Step::Resize { height, target } => {
                match target {
                    None => self.doc.set_viewport_height(*height),
                    Some(id) => {
                        if !self.doc.set_container_height(id, *height) {
                            bail!("no container '{}'", id);
                        }
                    }
                }
                let target = ScrollTarget::from_container_id(target.as_deref());
                self.page.scroll_signal(&target);
            }
        }
        // Mounts deferred by a paused channel get their first check here
        self.page.settle_layout();
        Ok(())
    }

    fn tick(&mut self) {
        self.doc.advance(self.frame);
        self.elapsed.set(self.elapsed.get() + self.frame);
        self.page.frame();
        self.frames += 1;
    }

    fn report(&self) -> Report {
        let mut scroll = vec![(ScrollTarget::Page, self.doc.page_scroll_top())];
        for container in &self.scene.containers {
            let target = ScrollTarget::Container(container.id.clone());
            let top = self.doc.scroll_top(&target);
            scroll.push((target, top));
        }

        let report = Report {
            transitions: self.log.borrow().clone(),
            active: self
                .links
                .iter()
                .filter(|l| l.is_active())
                .map(|l| l.config().to.clone())
                .collect(),
            scroll,
            frames: self.frames,
        };
        info!(
            "simulation finished after {} frame(s), {} transition(s)",
            report.frames,
            report.transitions.len()
        );
        report
    }
}

fn recorder(log: &Rc<RefCell<Vec<Transition>>>, elapsed: &Rc<Cell<Duration>>) -> AnchorCallbacks {
    let record = |kind: TransitionKind| {
        let log = log.clone();
        let elapsed = elapsed.clone();
        move |event: &AnchorEvent| {
            log.borrow_mut().push(Transition {
                at_ms: elapsed.get().as_millis(),
                kind,
                to: event.to.clone(),
            });
        }
    };
    AnchorCallbacks::new()
        .on_click(record(TransitionKind::Click))
        .on_focus(record(TransitionKind::Focus))
        .on_blur(record(TransitionKind::Blur))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(report: &Report) -> Vec<String> {
        report
            .transitions
            .iter()
            .map(|t| format!("{}:{}", t.kind, t.to))
            .collect()
    }

    const PAGE: &str = r#"
        viewport_height = 800

        [[sections]]
        id = "intro"
        top = 0
        height = 1000

        [[sections]]
        id = "usage"
        top = 1000
        height = 1000

        [[sections]]
        id = "faq"
        top = 2000
        height = 1000

        [[links]]
        to = "intro"

        [[links]]
        to = "usage"

        [[links]]
        to = "faq"
        toHash = true
    "#;

    fn scene(script: &str) -> Scene {
        Scene::parse(&format!("{}\n{}", PAGE, script)).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let report = Simulation::new(scene(""), 60).unwrap().run().unwrap();
        assert_eq!(kinds(&report), ["focus:intro"]);
        assert_eq!(report.active, ["intro"]);
        assert_eq!(report.frames, 0);
    }

    #[test]
    fn test_click_then_scroll() {
        let report = Simulation::new(
            scene(
                r#"
                [[script]]
                action = "click"
                link = "faq"

                [[script]]
                action = "wait"
                ms = 600

                [[script]]
                action = "scroll"
                y = 700
                "#,
            ),
            60,
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(
            kinds(&report),
            [
                "focus:intro",
                "click:faq",
                "blur:intro",
                "focus:faq",
                "focus:usage",
                "blur:faq",
            ]
        );
        assert_eq!(report.active, ["usage"]);
        assert_eq!(report.scroll, vec![(ScrollTarget::Page, 700.0)]);
    }

    #[test]
    fn test_unfinished_tween_is_drained() {
        let report = Simulation::new(
            scene(
                r#"
                [[script]]
                action = "click"
                link = "usage"
                "#,
            ),
            50,
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(report.active, ["usage"]);
        assert_eq!(report.scroll[0].1, 1000.0);
        // 450ms at 20ms per frame
        assert_eq!(report.frames, 23);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(Simulation::new(scene(""), 0).is_err());
        assert!(Simulation::new(scene(""), MAX_FPS + 1).is_err());
        assert!(Simulation::new(scene(""), u32::MAX).is_err());
        assert!(Simulation::new(scene(""), MAX_FPS).is_ok());

        let bad = scene(
            r#"
            [[script]]
            action = "click"
            link = "pricing"
            "#,
        );
        assert!(Simulation::new(bad, 60).is_err());
    }
}
