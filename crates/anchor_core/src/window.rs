//! Activation window geometry
//!
//! An activation window says when a destination element counts as "in view".
//! Each edge is a [`Bound`] - literal pixels or a percentage of the scroll
//! container's visible height - resolved against the *current* client height
//! on every evaluation, so resizes are picked up without caching.
//!
//! With `top = round(-element.top)`:
//!
//! ```text
//! active  <=>  top >= round(-start)  &&  top < round(element.height - end)
//! ```
//!
//! The element activates slightly before its top edge crosses into view
//! (`start`) and deactivates slightly before its bottom would leave the
//! visible area (`end`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AnchorError, Result};
use crate::host::ElementGeometry;

/// Round half toward positive infinity, matching browser pixel rounding
///
/// `f32::round` rounds half away from zero, which disagrees for negative
/// halves (`-2.5` must round to `-2`).
pub fn round_half_up(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// One edge of an activation window
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBound", into = "RawBound")]
pub enum Bound {
    /// Literal pixel distance
    Pixels(f32),
    /// Percentage of the container's client height (50.0 = half)
    Percent(f32),
}

impl Bound {
    /// Resolve to pixels against a container client height
    pub fn resolve(&self, container_height: f32) -> f32 {
        match *self {
            Bound::Pixels(px) => px,
            Bound::Percent(pct) => pct / 100.0 * container_height,
        }
    }
}

impl Default for Bound {
    fn default() -> Self {
        Bound::Percent(50.0)
    }
}

impl FromStr for Bound {
    type Err = AnchorError;

    /// Parse `"50%"`, `"120"`, or `"120px"`
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || AnchorError::InvalidBound(s.to_string());

        match trimmed.strip_suffix('%') {
            Some(pct) => parse_finite(pct).map(Bound::Percent).ok_or_else(invalid),
            None => parse_finite(trimmed.strip_suffix("px").unwrap_or(trimmed))
                .map(Bound::Pixels)
                .ok_or_else(invalid),
        }
    }
}

fn parse_finite(number: &str) -> Option<f32> {
    number
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Pixels(px) => write!(f, "{}", px),
            Bound::Percent(pct) => write!(f, "{}%", pct),
        }
    }
}

/// Wire form of a bound: a bare number (pixels) or a string
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawBound {
    Number(f32),
    Text(String),
}

impl TryFrom<RawBound> for Bound {
    type Error = AnchorError;

    fn try_from(raw: RawBound) -> Result<Self> {
        match raw {
            RawBound::Number(px) if px.is_finite() => Ok(Bound::Pixels(px)),
            RawBound::Number(px) => Err(AnchorError::InvalidBound(px.to_string())),
            RawBound::Text(text) => text.parse(),
        }
    }
}

impl From<Bound> for RawBound {
    fn from(bound: Bound) -> Self {
        match bound {
            Bound::Pixels(px) => RawBound::Number(px),
            Bound::Percent(_) => RawBound::Text(bound.to_string()),
        }
    }
}

/// Absolute pixel thresholds for one evaluation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivationThresholds {
    pub start_height: f32,
    pub end_height: f32,
}

impl ActivationThresholds {
    /// Test an element against these thresholds
    pub fn contains(&self, geometry: ElementGeometry) -> bool {
        let top = round_half_up(-geometry.top);
        top >= round_half_up(-self.start_height)
            && top < round_half_up(geometry.client_height - self.end_height)
    }
}

/// Start/end bounds of the activation window
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow", into = "RawWindow")]
pub struct ActivationWindow {
    pub start: Bound,
    pub end: Bound,
}

impl ActivationWindow {
    pub fn new(start: Bound, end: Bound) -> Self {
        Self { start, end }
    }

    /// Same bound on both edges
    pub fn uniform(bound: Bound) -> Self {
        Self::new(bound, bound)
    }

    /// Resolve both bounds against the container's current client height
    pub fn thresholds(&self, container_height: f32) -> ActivationThresholds {
        ActivationThresholds {
            start_height: self.start.resolve(container_height),
            end_height: self.end.resolve(container_height),
        }
    }

    /// Whether an element is inside the window
    pub fn contains(&self, geometry: ElementGeometry, container_height: f32) -> bool {
        self.thresholds(container_height).contains(geometry)
    }
}

impl Default for ActivationWindow {
    fn default() -> Self {
        Self::uniform(Bound::default())
    }
}

impl FromStr for ActivationWindow {
    type Err = AnchorError;

    /// Parse `"50%"` or `"10%, 120"` (start, end)
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        match parts.as_slice() {
            [one] => Ok(Self::uniform(one.parse()?)),
            [start, end] => Ok(Self::new(start.parse()?, end.parse()?)),
            other => Err(AnchorError::InvalidWindow(other.len())),
        }
    }
}

/// Wire form: one bound for both edges, or `[start, end]`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawWindow {
    One(Bound),
    Many(Vec<Bound>),
}

impl TryFrom<RawWindow> for ActivationWindow {
    type Error = AnchorError;

    fn try_from(raw: RawWindow) -> Result<Self> {
        match raw {
            RawWindow::One(bound) => Ok(Self::uniform(bound)),
            RawWindow::Many(bounds) => match bounds.as_slice() {
                [one] => Ok(Self::uniform(*one)),
                [start, end] => Ok(Self::new(*start, *end)),
                other => Err(AnchorError::InvalidWindow(other.len())),
            },
        }
    }
}

impl From<ActivationWindow> for RawWindow {
    fn from(window: ActivationWindow) -> Self {
        if window.start == window.end {
            RawWindow::One(window.start)
        } else {
            RawWindow::Many(vec![window.start, window.end])
        }
    }
}

/// Decide whether a (possibly missing) element is inside the window
///
/// A missing element is never active.
pub fn is_active(
    geometry: Option<ElementGeometry>,
    container_height: f32,
    window: &ActivationWindow,
) -> bool {
    geometry.is_some_and(|g| window.contains(g, container_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(0.4), 0.0);
    }

    #[test]
    fn test_bound_parse() {
        assert_eq!("50%".parse::<Bound>().unwrap(), Bound::Percent(50.0));
        assert_eq!(" 120 ".parse::<Bound>().unwrap(), Bound::Pixels(120.0));
        assert_eq!("120px".parse::<Bound>().unwrap(), Bound::Pixels(120.0));
        assert_eq!("-10".parse::<Bound>().unwrap(), Bound::Pixels(-10.0));
        assert!(matches!(
            "half".parse::<Bound>(),
            Err(AnchorError::InvalidBound(_))
        ));
        assert!("%".parse::<Bound>().is_err());
    }

    #[test]
    fn test_bound_resolve() {
        assert_eq!(Bound::Percent(50.0).resolve(800.0), 400.0);
        assert_eq!(Bound::Percent(25.0).resolve(600.0), 150.0);
        assert_eq!(Bound::Pixels(120.0).resolve(800.0), 120.0);
    }

    #[test]
    fn test_window_parse() {
        let window: ActivationWindow = "10%, 120".parse().unwrap();
        assert_eq!(window.start, Bound::Percent(10.0));
        assert_eq!(window.end, Bound::Pixels(120.0));

        let uniform: ActivationWindow = "50%".parse().unwrap();
        assert_eq!(uniform, ActivationWindow::default());

        assert_eq!(
            "1 2 3".parse::<ActivationWindow>(),
            Err(AnchorError::InvalidWindow(3))
        );
    }

    #[test]
    fn test_window_serde_forms() {
        let one: ActivationWindow = serde_json::from_str("\"50%\"").unwrap();
        assert_eq!(one, ActivationWindow::uniform(Bound::Percent(50.0)));

        let pixels: ActivationWindow = serde_json::from_str("100").unwrap();
        assert_eq!(pixels, ActivationWindow::uniform(Bound::Pixels(100.0)));

        let pair: ActivationWindow = serde_json::from_str("[\"20%\", 80]").unwrap();
        assert_eq!(
            pair,
            ActivationWindow::new(Bound::Percent(20.0), Bound::Pixels(80.0))
        );

        assert!(serde_json::from_str::<ActivationWindow>("[1, 2, 3]").is_err());
        assert!(serde_json::from_str::<ActivationWindow>("\"wide\"").is_err());

        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(json, "[\"20%\",80.0]");
    }

    #[test]
    fn test_contains_percent_window() {
        // 800px viewport, 50% window => [-400, height - 400)
        let window = ActivationWindow::default();

        // Top still 401px below the edge: not yet
        assert!(!window.contains(ElementGeometry::new(401.0, 600.0), 800.0));
        // Exactly at the start threshold
        assert!(window.contains(ElementGeometry::new(400.0, 600.0), 800.0));
        // Scrolled 199px past the top of a 600px element
        assert!(window.contains(ElementGeometry::new(-199.0, 600.0), 800.0));
        // 200px past: bottom would leave the upper half
        assert!(!window.contains(ElementGeometry::new(-200.0, 600.0), 800.0));
    }

    #[test]
    fn test_contains_pixel_window_matches_percent_encoding() {
        let pixels = ActivationWindow::uniform(Bound::Pixels(400.0));
        let percent = ActivationWindow::uniform(Bound::Percent(50.0));

        for top in (-700..=700).step_by(7) {
            let geometry = ElementGeometry::new(top as f32 + 0.3, 600.0);
            let t = round_half_up(-geometry.top);
            let expected = t >= -400.0 && t < 600.0 - 400.0;
            assert_eq!(pixels.contains(geometry, 800.0), expected, "top {}", top);
            assert_eq!(percent.contains(geometry, 800.0), expected, "top {}", top);
        }
    }

    #[test]
    fn test_thresholds_follow_container_height() {
        let window = ActivationWindow::uniform(Bound::Percent(50.0));
        let geometry = ElementGeometry::new(350.0, 600.0);

        assert!(window.contains(geometry, 800.0));
        // Container shrank: the same position is now outside the window
        assert!(!window.contains(geometry, 600.0));
    }

    #[test]
    fn test_missing_element_is_inactive() {
        assert!(!is_active(None, 800.0, &ActivationWindow::default()));
        assert!(is_active(
            Some(ElementGeometry::new(0.0, 600.0)),
            800.0,
            &ActivationWindow::default()
        ));
    }
}
