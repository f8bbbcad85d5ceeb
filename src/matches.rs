//! Matches are located occurrences of sample values on a page.
//!
//! A [`Match`] ties a sample to concrete nodes during training; it is
//! discarded once a rule has been derived. An [`Extractor`] says how a
//! value is read from a node, and a [`Matcher`] pairs it with a selector
//! to form the reusable unit of "find and read a value".

use crate::ancestors::common_ancestor;
use crate::dom::{normalize_text, HtmlMatch, Node, Page};
use crate::error::{Error, Result};
use crate::samples::Value;
use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a value is read from a node.
///
/// Equality is structural: all text extractors are equal, attribute
/// extractors are equal when they read the same attribute. `Text` sorts
/// before every `Attribute`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extractor {
    /// Normalized text content.
    Text,
    /// Trimmed value of an attribute.
    Attribute {
        /// Attribute name.
        name: String,
    },
}

impl Extractor {
    /// Extractor reading the attribute `name`.
    pub fn attribute(name: impl Into<String>) -> Self {
        Extractor::Attribute { name: name.into() }
    }

    /// Read the value from `node`. Text never fails; a missing attribute
    /// yields `None`.
    #[must_use]
    pub fn extract(&self, node: Node<'_>) -> Option<String> {
        match self {
            Extractor::Text => Some(node.text()),
            Extractor::Attribute { name } => node.attr(name).map(|v| v.trim().to_string()),
        }
    }
}

/// Occurrence of a sample on a page.
#[derive(Debug, Clone)]
pub enum Match<'a> {
    /// A single value read from one node.
    Value {
        /// Node holding the value.
        node: Node<'a>,
        /// How the value is read.
        extractor: Extractor,
    },
    /// Named member matches.
    Dict {
        /// Member matches by key.
        matches: BTreeMap<String, Match<'a>>,
        /// Lowest common ancestor of all member roots.
        root: Node<'a>,
    },
    /// Ordered member matches.
    List {
        /// Member matches in sample order.
        matches: Vec<Match<'a>>,
        /// Lowest common ancestor of all member roots.
        root: Node<'a>,
    },
}

impl<'a> Match<'a> {
    /// A value match.
    #[must_use]
    pub fn value(node: Node<'a>, extractor: Extractor) -> Self {
        Match::Value { node, extractor }
    }

    /// A dict match; `None` if empty or spread over several pages.
    #[must_use]
    pub fn dict(matches: BTreeMap<String, Match<'a>>) -> Option<Self> {
        let roots: Vec<Node<'a>> = matches.values().map(Match::root).collect();
        let root = common_ancestor(&roots)?;
        Some(Match::Dict { matches, root })
    }

    /// A list match; `None` if empty or spread over several pages.
    #[must_use]
    pub fn list(matches: Vec<Match<'a>>) -> Option<Self> {
        let roots: Vec<Node<'a>> = matches.iter().map(Match::root).collect();
        let root = common_ancestor(&roots)?;
        Some(Match::List { matches, root })
    }

    /// The lowest node containing every matched node.
    #[must_use]
    pub fn root(&self) -> Node<'a> {
        match self {
            Match::Value { node, .. } => *node,
            Match::Dict { root, .. } | Match::List { root, .. } => *root,
        }
    }

    /// Read the matched value back from the page.
    #[must_use]
    pub fn extract(&self) -> Value {
        match self {
            Match::Value { node, extractor } => extractor.extract(*node).into(),
            Match::Dict { matches, .. } => Value::Dict(
                matches
                    .iter()
                    .map(|(key, m)| (key.clone(), m.extract()))
                    .collect(),
            ),
            Match::List { matches, .. } => Value::List(matches.iter().map(Match::extract).collect()),
        }
    }
}

/// Every exact occurrence of `needle` on `page`, as value matches.
///
/// Text occurrences only count when the node's normalized text equals the
/// normalized needle; partial containment is discarded.
#[must_use]
pub fn generate_value_matches<'a>(
    page: &'a Page,
    needle: &str,
    match_attributes: bool,
) -> Vec<Match<'a>> {
    let needle = normalize_text(needle);
    page.find_all(&needle)
        .into_iter()
        .filter_map(|found| match found {
            HtmlMatch::Text(node) => (node.text() == needle).then(|| Match::value(node, Extractor::Text)),
            HtmlMatch::Attribute { node, name } => {
                match_attributes.then(|| Match::value(node, Extractor::Attribute { name }))
            }
        })
        .collect()
}

/// Group value matches by extractor, text first. Non-value matches are
/// ignored.
#[must_use]
pub fn group_by_extractor<'a>(matches: Vec<Match<'a>>) -> BTreeMap<Extractor, Vec<Node<'a>>> {
    let mut groups: BTreeMap<Extractor, Vec<Node<'a>>> = BTreeMap::new();
    for m in matches {
        if let Match::Value { node, extractor } = m {
            groups.entry(extractor).or_default().push(node);
        }
    }
    groups
}

/// A selector paired with an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Matcher {
    /// Where to find the node.
    pub selector: Selector,
    /// How to read it.
    pub extractor: Extractor,
}

impl Matcher {
    /// Create a matcher.
    #[must_use]
    pub fn new(selector: Selector, extractor: Extractor) -> Self {
        Self {
            selector,
            extractor,
        }
    }

    /// Every match below `scope`, in document order.
    pub fn match_all<'a>(&self, scope: Node<'a>) -> Result<Vec<Match<'a>>> {
        Ok(self
            .selector
            .select(scope)?
            .into_iter()
            .map(|node| Match::value(node, self.extractor.clone()))
            .collect())
    }

    /// The first match in document order.
    pub fn match_first<'a>(&self, scope: Node<'a>) -> Result<Match<'a>> {
        self.match_all(scope)?
            .into_iter()
            .next()
            .ok_or_else(|| self.no_match())
    }

    /// The only match; more than one is [`Error::AmbiguousMatch`].
    pub fn match_one<'a>(&self, scope: Node<'a>) -> Result<Match<'a>> {
        let mut matches = self.match_all(scope)?;
        match matches.len() {
            0 => Err(self.no_match()),
            1 => Ok(matches.remove(0)),
            count => Err(Error::AmbiguousMatch {
                selector: self.selector.to_string(),
                count,
            }),
        }
    }

    fn no_match(&self) -> Error {
        Error::NoMatch {
            selector: self.selector.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_attribute_extractor() {
        let page = Page::parse(
            r#"<html><body><a href="https://karllorey.com"></a><a>no link</a></body></html>"#,
        );
        let extractor = Extractor::attribute("href");
        let a_tags = page.select("a").unwrap();

        assert_eq!(extractor.extract(a_tags[0]).as_deref(), Some("https://karllorey.com"));
        assert_eq!(extractor.extract(a_tags[1]), None);
    }

    #[test]
    fn test_text_extractor_on_empty_node() {
        let page = Page::parse("<html><body><div>  </div></body></html>");
        let div = page.select("div").unwrap()[0];
        assert_eq!(Extractor::Text.extract(div).as_deref(), Some(""));
    }

    #[test]
    fn test_extractor_equality() {
        let set: HashSet<Extractor> = [
            Extractor::attribute("href"),
            Extractor::attribute("href"),
            Extractor::Text,
            Extractor::Text,
            Extractor::attribute("title"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 3);
        assert!(Extractor::Text < Extractor::attribute("a"));
    }

    #[test]
    fn test_dict_match_root_and_extract() {
        let page = Page::parse("<html><body><div><h1>no 1</h1><p>first</p></div></body></html>");
        let h1 = page.select("h1").unwrap()[0];
        let p = page.select("p").unwrap()[0];

        let dict = Match::dict(BTreeMap::from([
            ("h".to_string(), Match::value(h1, Extractor::Text)),
            ("t".to_string(), Match::value(p, Extractor::Text)),
        ]))
        .unwrap();

        assert_eq!(dict.root(), page.select("div").unwrap()[0]);
        assert_eq!(dict.extract(), Value::dict([("h", "no 1"), ("t", "first")]));
        assert!(Match::dict(BTreeMap::new()).is_none());
        assert!(Match::list(Vec::new()).is_none());
    }

    #[test]
    fn test_generate_value_matches_requires_exact_text() {
        let page = Page::parse(
            r#"<html><body><p>test</p><p>testing</p><a title="test">x</a></body></html>"#,
        );

        let matches = generate_value_matches(&page, "test", true);
        let groups = group_by_extractor(matches);
        assert_eq!(groups.get(&Extractor::Text).map(Vec::len), Some(1));
        assert_eq!(groups.get(&Extractor::attribute("title")).map(Vec::len), Some(1));

        let text_only = group_by_extractor(generate_value_matches(&page, "test", false));
        assert_eq!(text_only.len(), 1);
    }

    #[test]
    fn test_matcher_match_one() {
        let page = Page::parse("<html><body><p>1</p><p>2</p><i>3</i></body></html>");
        let root = page.root();

        let p = Matcher::new(Selector::parse("p").unwrap(), Extractor::Text);
        assert!(matches!(p.match_one(root), Err(Error::AmbiguousMatch { count: 2, .. })));
        assert_eq!(p.match_first(root).unwrap().extract(), Value::text("1"));
        assert_eq!(p.match_all(root).unwrap().len(), 2);

        let i = Matcher::new(Selector::parse("i").unwrap(), Extractor::Text);
        assert_eq!(i.match_one(root).unwrap().extract(), Value::text("3"));

        let missing = Matcher::new(Selector::parse("span").unwrap(), Extractor::Text);
        assert!(matches!(missing.match_one(root), Err(Error::NoMatch { .. })));
    }
}
