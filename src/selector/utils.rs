//! Helpers for rendering CSS selector fragments.
//!
//! Generated selectors only use identifiers that need no escaping. Class
//! names such as `md:flex` or ids starting with a digit are skipped rather
//! than escaped; other qualifiers of the same node usually suffice.

use regex::Regex;
use std::sync::LazyLock;

/// Longest attribute value turned into an `[attr="value"]` selector.
pub const MAX_ATTRIBUTE_VALUE_LEN: usize = 64;

#[allow(clippy::expect_used)]
static CSS_IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[_a-zA-Z][_a-zA-Z0-9-]*$").expect("valid regex"));

/// Whether `s` can be used as a CSS identifier without escaping.
#[inline]
#[must_use]
pub fn is_css_identifier(s: &str) -> bool {
    CSS_IDENTIFIER_RE.is_match(s)
}

/// Whether an attribute value is worth turning into a selector.
#[must_use]
pub fn is_selectable_value(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_ATTRIBUTE_VALUE_LEN
        && !value.chars().any(char::is_control)
}

/// Render a double-quoted CSS string.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Compound selector `tag#id.class1.class2` for the given qualifiers.
#[must_use]
pub fn compound(tag: &str, id: Option<&str>, classes: &[String]) -> String {
    let mut out = tag.to_string();
    if let Some(id) = id {
        out.push('#');
        out.push_str(id);
    }
    for class in classes {
        out.push('.');
        out.push_str(class);
    }
    out
}
