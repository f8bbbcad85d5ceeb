//! Candidate selector generation.
//!
//! Candidates for a node are built from its element path below a scope.
//! The sequence runs from the longest path suffix down to the node alone,
//! so earlier candidates are more specific than later ones. Within one
//! suffix depth, ancestors are rendered positional, then qualified, then as
//! bare tags, and each rendering is combined with every variant of the
//! target's own compound selector.
//!
//! Generation is deterministic: the same node, scope and options always
//! yield the same sequence.

use super::utils::{compound, is_css_identifier, is_selectable_value, quote};
use crate::ancestors::{path_below, tree_path};
use crate::dom::Node;
use crate::options::Options;
use std::collections::HashSet;

/// Tags that occur once per document and never need a position.
const SINGLETON_TAGS: &[&str] = &["html", "head", "body"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AncestorStyle {
    /// `tag#id.class:nth-of-type(n)`
    Positional,
    /// `tag#id.class`
    Qualified,
    /// `tag`
    Bare,
}

impl AncestorStyle {
    const ALL: [AncestorStyle; 3] = [
        AncestorStyle::Positional,
        AncestorStyle::Qualified,
        AncestorStyle::Bare,
    ];

    fn combinators(self) -> &'static [&'static str] {
        match self {
            // a positional chain only pins a node down with direct children
            AncestorStyle::Positional => &[" > "],
            AncestorStyle::Qualified | AncestorStyle::Bare => &[" > ", " "],
        }
    }
}

/// Lazily generate candidate CSS selectors for `node`.
///
/// With `scope` set, paths start below the scope and the selectors are
/// meant to be resolved relative to it; otherwise paths start at the root
/// element. The iterator is finite, free of duplicates and bounded by
/// `Options::max_path_depth` and `Options::max_candidates`. A node equal
/// to its scope has no CSS candidates.
pub fn path_selectors<'a>(
    node: Node<'a>,
    scope: Option<Node<'a>>,
    options: &Options,
) -> impl Iterator<Item = String> + 'a {
    let path = match scope {
        Some(scope) => path_below(scope, node),
        None => tree_path(node),
    };
    let len = path.len();
    let max_depth = len.min(options.max_path_depth.max(1));
    // spread the budget so the short, general selectors are never cut off
    let per_depth = (options.max_candidates / options.max_path_depth.max(1)).max(1);
    let positional = options.positional_selectors;

    let mut seen = HashSet::new();
    (1..=max_depth)
        .rev()
        .flat_map(move |depth| {
            let mut level = selectors_at_depth(&path[len - depth..], positional);
            level.truncate(per_depth);
            level
        })
        .filter(move |css| seen.insert(css.clone()))
}

/// Every candidate for the last node of `segments`, using all segments.
fn selectors_at_depth(segments: &[Node<'_>], positional: bool) -> Vec<String> {
    let Some((target, ancestors)) = segments.split_last() else {
        return Vec::new();
    };
    let target_parts = node_variants(*target, positional);
    if ancestors.is_empty() {
        return target_parts;
    }

    let mut selectors = Vec::new();
    for style in AncestorStyle::ALL {
        if style == AncestorStyle::Positional && !positional {
            continue;
        }
        let parts: Vec<String> = ancestors.iter().map(|a| ancestor_part(*a, style)).collect();
        for combinator in style.combinators() {
            let prefix = parts.join(combinator);
            for part in &target_parts {
                selectors.push(format!("{prefix}{combinator}{part}"));
            }
        }
    }
    selectors
}

/// Compound selectors identifying `node` on its own, most specific first.
#[must_use]
pub fn node_variants(node: Node<'_>, positional: bool) -> Vec<String> {
    let tag = node.tag_name();
    let id = node.id().filter(|id| is_css_identifier(id));
    let classes: Vec<String> = node
        .classes()
        .into_iter()
        .filter(|c| is_css_identifier(c))
        .collect();

    let mut variants = Vec::new();
    if let Some(id) = id.as_deref() {
        if !classes.is_empty() {
            variants.push(compound(&tag, Some(id), &classes));
        }
        variants.push(compound(&tag, Some(id), &[]));
        variants.push(compound("", Some(id), &[]));
    }
    if !classes.is_empty() {
        variants.push(compound(&tag, None, &classes));
        variants.push(compound("", None, &classes));
        if classes.len() > 1 {
            for class in &classes {
                let single = std::slice::from_ref(class);
                variants.push(compound(&tag, None, single));
                variants.push(compound("", None, single));
            }
        }
    }
    for (name, value) in node.attributes() {
        if matches!(name.as_str(), "id" | "class" | "style") || !is_css_identifier(&name) {
            continue;
        }
        if is_selectable_value(value.trim()) {
            let value = quote(value.trim());
            variants.push(format!("{tag}[{name}={value}]"));
            variants.push(format!("[{name}={value}]"));
        }
        variants.push(format!("{tag}[{name}]"));
    }
    if positional && !SINGLETON_TAGS.contains(&tag.as_str()) {
        variants.push(format!("{tag}:nth-of-type({})", node.nth_of_type()));
    }
    variants.push(tag);

    let mut seen = HashSet::new();
    variants.retain(|v| seen.insert(v.clone()));
    variants
}

fn ancestor_part(node: Node<'_>, style: AncestorStyle) -> String {
    let tag = node.tag_name();
    match style {
        AncestorStyle::Bare => tag,
        AncestorStyle::Qualified | AncestorStyle::Positional => {
            let id = node.id().filter(|id| is_css_identifier(id));
            let classes: Vec<String> = node
                .classes()
                .into_iter()
                .filter(|c| is_css_identifier(c))
                .collect();
            let qualified = compound(&tag, id.as_deref(), &classes);
            if style == AncestorStyle::Positional && !SINGLETON_TAGS.contains(&tag.as_str()) {
                format!("{qualified}:nth-of-type({})", node.nth_of_type())
            } else {
                qualified
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Page;

    #[test]
    fn test_node_variants_order() {
        let page = Page::parse(r#"<html><body><p id="x" class="a b">t</p></body></html>"#);
        let p = page.select("p").unwrap()[0];

        let variants = node_variants(p, true);
        assert_eq!(
            variants,
            vec![
                "p#x.a.b", "p#x", "#x", "p.a.b", ".a.b", "p.a", ".a", "p.b", ".b",
                "p:nth-of-type(1)", "p",
            ]
        );
        assert!(!node_variants(p, false).contains(&"p:nth-of-type(1)".to_string()));
    }

    #[test]
    fn test_attribute_variants() {
        let page = Page::parse(r#"<html><body><span itemprop="price">1</span></body></html>"#);
        let span = page.select("span").unwrap()[0];

        let variants = node_variants(span, false);
        assert!(variants.contains(&r#"span[itemprop="price"]"#.to_string()));
        assert!(variants.contains(&r#"[itemprop="price"]"#.to_string()));
        assert!(variants.contains(&"span[itemprop]".to_string()));
        assert_eq!(variants.last().map(String::as_str), Some("span"));
    }

    #[test]
    fn test_generation_runs_from_specific_to_general() {
        let page = Page::parse(r#"<html><body><div class="c"><p>t</p></div></body></html>"#);
        let p = page.select("p").unwrap()[0];

        let candidates: Vec<String> = path_selectors(p, None, &Options::default()).collect();
        assert_eq!(
            candidates.first().map(String::as_str),
            Some("html > body > div.c:nth-of-type(1) > p:nth-of-type(1)")
        );
        assert_eq!(candidates.last().map(String::as_str), Some("p"));
        assert!(candidates.contains(&"div.c p".to_string()));
        assert!(candidates.contains(&"div > p".to_string()));

        let unique: HashSet<&String> = candidates.iter().collect();
        assert_eq!(unique.len(), candidates.len());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let page = Page::parse(r#"<html><body><ul><li class="i">1</li><li>2</li></ul></body></html>"#);
        let li = page.select("li").unwrap()[1];

        let a: Vec<String> = path_selectors(li, None, &Options::default()).collect();
        let b: Vec<String> = path_selectors(li, None, &Options::default()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_relative_generation_stops_at_scope() {
        let page = Page::parse(r#"<html><body><div class="r"><h1>t</h1></div></body></html>"#);
        let div = page.select("div").unwrap()[0];
        let h1 = page.select("h1").unwrap()[0];

        let candidates: Vec<String> = path_selectors(h1, Some(div), &Options::default()).collect();
        assert_eq!(candidates, vec!["h1:nth-of-type(1)", "h1"]);
        assert_eq!(path_selectors(div, Some(div), &Options::default()).count(), 0);
    }

    #[test]
    fn test_depth_budget() {
        let page = Page::parse("<html><body><div><div><div><p>x</p></div></div></div></body></html>");
        let p = page.select("p").unwrap()[0];
        let options = Options {
            max_path_depth: 2,
            ..Options::default()
        };

        for css in path_selectors(p, None, &options) {
            assert!(css.matches('>').count() + css.matches(' ').count() <= 3, "{css}");
            assert!(!css.contains("body"), "{css}");
        }
    }
}
