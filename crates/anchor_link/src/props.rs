//! Render output and property forwarding
//!
//! An anchor renders as its configured host element. Every caller-supplied
//! property is forwarded except the ones the anchor consumes itself.

use indexmap::IndexMap;
use serde_json::Value;

use crate::class_name::toggle_active_class;

/// Caller-supplied properties, in declaration order
pub type Props = IndexMap<String, Value>;

/// Property names consumed by the anchor and never forwarded
pub const CONSUMED_PROPS: &[&str] = &[
    "component",
    "duration",
    "active",
    "showHeightActive",
    "ease",
    "toShowHeight",
    "offsetTop",
    "targetId",
    "to",
    "toHash",
];

/// Strip consumed properties
pub fn forward_props(props: &Props) -> Props {
    props
        .iter()
        .filter(|(key, _)| !CONSUMED_PROPS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// What the host should render for an anchor
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedAnchor {
    /// Host element type
    pub component: String,
    /// Final class string (active token toggled)
    pub class_name: String,
    /// Forwarded properties, `className` excluded
    pub props: Props,
}

impl RenderedAnchor {
    /// Build render output from caller props
    pub fn build(component: &str, props: &Props, active_class: &str, active: bool) -> Self {
        let mut forwarded = forward_props(props);
        let existing = forwarded
            .shift_remove("className")
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();

        Self {
            component: component.to_string(),
            class_name: toggle_active_class(&existing, active_class, active),
            props: forwarded,
        }
    }
}
