//! Anchor activation state machine
//!
//! Two states, edge-triggered: only an actual transition produces a new
//! state, so repeated identical inputs never re-fire focus/blur callbacks.
//! An in-flight click animation is tracked separately and is not a state.

/// Whether an anchor is currently marked active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnchorState {
    #[default]
    Inactive,
    Active,
}

/// Inputs that drive [`AnchorState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorInput {
    /// Destination is in view, or the anchor was clicked
    Focus,
    /// Destination left view, or a sibling was clicked
    Blur,
}

impl AnchorState {
    /// Handle an input and return the new state, or None if no transition
    pub fn on_event(&self, input: AnchorInput) -> Option<Self> {
        match (self, input) {
            (AnchorState::Inactive, AnchorInput::Focus) => Some(AnchorState::Active),
            (AnchorState::Active, AnchorInput::Blur) => Some(AnchorState::Inactive),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, AnchorState::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert_eq!(
            AnchorState::Inactive.on_event(AnchorInput::Focus),
            Some(AnchorState::Active)
        );
        assert_eq!(
            AnchorState::Active.on_event(AnchorInput::Blur),
            Some(AnchorState::Inactive)
        );
    }

    #[test]
    fn test_same_state_is_noop() {
        assert_eq!(AnchorState::Active.on_event(AnchorInput::Focus), None);
        assert_eq!(AnchorState::Inactive.on_event(AnchorInput::Blur), None);
        assert!(!AnchorState::default().is_active());
    }
}
