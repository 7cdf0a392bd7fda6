//! Tolerant `{placeholder}` substitution.
//!
//! Operator-authored templates may omit sections deliberately, and defaults
//! must survive templates that never mention a placeholder. Substitution is
//! therefore total: known names get their value, any other `{word}`
//! placeholder renders as the empty string. Braces around anything that is
//! not a bare identifier are left alone.

use regex::Regex;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap())
}

/// Render `template`, substituting each `{name}` from `vars` and collapsing
/// unmatched placeholders to the empty string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    placeholder_re()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_default()
        })
        .into_owned()
}
