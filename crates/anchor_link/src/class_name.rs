//! Active class toggling

/// Compute the class string for an anchor
///
/// Active: `token` is appended unless already present. Inactive: every
/// case-insensitive occurrence of `token` is removed. Idempotent either way.
pub fn toggle_active_class(class_name: &str, token: &str, active: bool) -> String {
    let token = token.trim();
    if token.is_empty() {
        return class_name.trim().to_string();
    }

    let mut classes: Vec<&str> = class_name
        .split_whitespace()
        .filter(|class| active || !class.eq_ignore_ascii_case(token))
        .collect();

    if active && !classes.iter().any(|class| class.eq_ignore_ascii_case(token)) {
        classes.push(token);
    }
    classes.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_when_active() {
        assert_eq!(toggle_active_class("nav-link", "active", true), "nav-link active");
        assert_eq!(toggle_active_class("", "active", true), "active");
    }

    #[test]
    fn test_no_duplicate_token() {
        let once = toggle_active_class("nav-link", "active", true);
        let twice = toggle_active_class(&once, "active", true);
        assert_eq!(once, twice);
        assert_eq!(toggle_active_class("ACTIVE nav", "active", true), "ACTIVE nav");
    }

    #[test]
    fn test_strip_every_case_insensitive_occurrence() {
        assert_eq!(
            toggle_active_class("Active nav-link active  ACTIVE", "active", false),
            "nav-link"
        );
        // Only whole tokens are removed
        assert_eq!(toggle_active_class("inactive nav", "active", false), "inactive nav");
    }

    #[test]
    fn test_empty_token() {
        assert_eq!(toggle_active_class("  nav  ", "", true), "nav");
    }
}
