//! Scene files
//!
//! A scene describes a headless page (viewport, scroll containers, sections),
//! the anchors on it, and a script to play against them:
//!
//! ```toml
//! viewport_height = 800
//!
//! [[sections]]
//! id = "intro"
//! top = 0
//! height = 1000
//!
//! [[links]]
//! to = "intro"
//! toHash = true
//!
//! [[script]]
//! action = "click"
//! link = "intro"
//! ```
//!
//! Links use the same camelCase keys as [`AnchorConfig`].

use anchor_link::{AnchorConfig, HeadlessDocument};
use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_viewport_height() -> f32 {
    800.0
}

/// A scroll container on the page
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ContainerSpec {
    pub id: String,
    /// Document offset of the container's top edge
    pub top: f32,
    pub client_height: f32,
}

/// A destination element
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SectionSpec {
    pub id: String,
    pub top: f32,
    pub height: f32,
    /// Container the section scrolls inside (`None` = the page)
    #[serde(default)]
    pub container: Option<String>,
}

/// One scripted action
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    /// User scroll of the page or a container
    Scroll {
        y: f32,
        #[serde(default)]
        target: Option<String>,
    },
    /// Click the anchor whose destination is `link`
    Click { link: String },
    /// Let frames run
    Wait { ms: u64 },
    /// Change the viewport (or a container's) height
    Resize {
        height: f32,
        #[serde(default)]
        target: Option<String>,
    },
}

/// A complete simulation scene
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Scene {
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
    #[serde(default)]
    pub links: Vec<AnchorConfig>,
    #[serde(default)]
    pub script: Vec<Step>,
}

impl Scene {
    /// Read and parse a scene file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Consistency problems, empty when the scene is playable
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !self.viewport_height.is_finite() || self.viewport_height <= 0.0 {
            problems.push(format!("viewport_height must be positive, got {}", self.viewport_height));
        }

        let mut containers = FxHashSet::default();
        for container in &self.containers {
            if !containers.insert(container.id.as_str()) {
                problems.push(format!("duplicate container '{}'", container.id));
            }
            if !container.client_height.is_finite() || container.client_height <= 0.0 {
                problems.push(format!("container '{}' has no height", container.id));
            }
        }

        let mut sections = FxHashSet::default();
        for section in &self.sections {
            if !sections.insert(section.id.as_str()) {
                problems.push(format!("duplicate section '{}'", section.id));
            }
            if section.height < 0.0 {
                problems.push(format!("section '{}' has negative height", section.id));
            }
            if let Some(container) = &section.container {
                if !containers.contains(container.as_str()) {
                    problems.push(format!(
                        "section '{}' is inside unknown container '{}'",
                        section.id, container
                    ));
                }
            }
        }

        let mut links = FxHashSet::default();
        for link in &self.links {
            if !links.insert(link.to.as_str()) {
                problems.push(format!("more than one link to '{}'", link.to));
            }
            if !sections.contains(link.to.as_str()) {
                problems.push(format!("link to unknown section '{}'", link.to));
            }
            if let Some(target) = &link.target_id {
                if !containers.contains(target.as_str()) {
                    problems.push(format!(
                        "link to '{}' observes unknown container '{}'",
                        link.to, target
                    ));
                }
            }
        }

        for (i, step) in self.script.iter().enumerate() {
            let target = match step {
                Step::Click { link } => {
                    if !links.contains(link.as_str()) {
                        problems.push(format!("step {}: no link to '{}'", i + 1, link));
                    }
                    None
                }
                Step::Scroll { target, .. } | Step::Resize { target, .. } => target.as_deref(),
                Step::Wait { .. } => None,
            };
            if let Some(target) = target {
                if !containers.contains(target) {
                    problems.push(format!("step {}: unknown container '{}'", i + 1, target));
                }
            }
        }

        problems
    }

    /// Lay the scene out on a fresh headless document
    pub fn document(&self) -> HeadlessDocument {
        let doc = HeadlessDocument::new(self.viewport_height);
        for container in &self.containers {
            doc.insert_container(&container.id, container.top, container.client_height);
        }
        for section in &self.sections {
            doc.insert_element(
                &section.id,
                section.top,
                section.height,
                section.container.as_deref(),
            );
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_core::{ScrollHost, ScrollTarget};

    const DOCS: &str = include_str!("../scenes/docs.toml");

    #[test]
    fn test_bundled_scene_is_valid() {
        let scene = Scene::parse(DOCS).unwrap();
        assert_eq!(scene.problems(), Vec::<String>::new());
        assert!(!scene.links.is_empty());
        assert!(!scene.script.is_empty());
    }

    #[test]
    fn test_parse_steps() {
        let scene = Scene::parse(
            r#"
            [[script]]
            action = "scroll"
            y = 120

            [[script]]
            action = "click"
            link = "faq"

            [[script]]
            action = "wait"
            ms = 500

            [[script]]
            action = "resize"
            height = 400
            target = "sidebar"
            "#,
        )
        .unwrap();

        assert_eq!(scene.viewport_height, 800.0);
        assert_eq!(
            scene.script,
            vec![
                Step::Scroll { y: 120.0, target: None },
                Step::Click { link: "faq".into() },
                Step::Wait { ms: 500 },
                Step::Resize {
                    height: 400.0,
                    target: Some("sidebar".into())
                },
            ]
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let err = Scene::parse(
            r#"
            [[script]]
            action = "teleport"
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_problems_found() {
        let scene = Scene::parse(
            r#"
            [[containers]]
            id = "side"
            top = 0
            client_height = 300

            [[sections]]
            id = "a"
            top = 0
            height = 100
            container = "nowhere"

            [[links]]
            to = "b"
            targetId = "ghost"

            [[script]]
            action = "click"
            link = "a"
            "#,
        )
        .unwrap();

        let problems = scene.problems();
        assert_eq!(problems.len(), 4, "{:?}", problems);
        assert!(problems.iter().any(|p| p.contains("unknown container 'nowhere'")));
        assert!(problems.iter().any(|p| p.contains("unknown section 'b'")));
        assert!(problems.iter().any(|p| p.contains("'ghost'")));
        assert!(problems.iter().any(|p| p.contains("step 1")));
    }

    #[test]
    fn test_document_layout() {
        let scene = Scene::parse(
            r#"
            viewport_height = 600

            [[containers]]
            id = "side"
            top = 100
            client_height = 300

            [[sections]]
            id = "a"
            top = 0
            height = 2000

            [[sections]]
            id = "note"
            top = 250
            height = 100
            container = "side"
            "#,
        )
        .unwrap();

        let doc = scene.document();
        assert_eq!(doc.client_height(&ScrollTarget::Page), Some(600.0));
        let side = ScrollTarget::Container("side".into());
        assert_eq!(doc.element_geometry("note", &side).unwrap().top, 250.0);
    }
}
