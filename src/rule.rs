//! Extraction rules: the persisted output of training.
//!
//! A rule holds selectors and extractors only, never nodes or pages, so it
//! can be stored as JSON and applied to any later page.

use crate::dom::{Node, Page};
use crate::error::Result;
use crate::matches::{Match, Matcher};
use crate::samples::Value;
use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A trained extraction rule.
///
/// # Example
///
/// ```rust
/// use rs_mlscraper::{Page, Rule, Value};
///
/// let json = r#"{"type":"value","selector":".price","extractor":{"kind":"text"}}"#;
/// let rule = Rule::from_json(json)?;
///
/// let page = Page::parse(r#"<html><body><span class="price">9.99</span></body></html>"#);
/// assert_eq!(rule.scrape(&page), Value::text("9.99"));
/// # Ok::<(), rs_mlscraper::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Read one value.
    Value(Matcher),
    /// Independent rules per key, all resolved against the same scope.
    Dict {
        /// Rule per key.
        rules: BTreeMap<String, Rule>,
    },
    /// One item per container node.
    List {
        /// Selector yielding one container per item.
        selector: Selector,
        /// Rule applied with each container as scope.
        item: Box<Rule>,
    },
}

impl Rule {
    /// Apply the rule to a whole page.
    #[must_use]
    pub fn scrape(&self, page: &Page) -> Value {
        self.apply(page.root())
    }

    /// Parse `html` and apply the rule to it.
    #[must_use]
    pub fn scrape_html(&self, html: &str) -> Value {
        self.scrape(&Page::parse(html))
    }

    /// Apply the rule below `scope`.
    ///
    /// Misses never abort extraction: a value that cannot be found is
    /// [`Value::Missing`] inside an otherwise complete result. When a value
    /// selector matches several nodes the first one is used.
    #[must_use]
    pub fn apply(&self, scope: Node<'_>) -> Value {
        match self {
            Rule::Value(matcher) => match matcher.match_all(scope) {
                Ok(matches) => {
                    if matches.len() > 1 {
                        ::log::warn!(
                            "Selector {} matched {} nodes, using the first",
                            matcher.selector,
                            matches.len()
                        );
                    }
                    matches.first().map_or(Value::Missing, Match::extract)
                }
                Err(err) => {
                    ::log::warn!("{err}");
                    Value::Missing
                }
            },
            Rule::Dict { rules } => Value::Dict(
                rules
                    .iter()
                    .map(|(key, rule)| (key.clone(), rule.apply(scope)))
                    .collect(),
            ),
            Rule::List { selector, item } => match selector.select(scope) {
                Ok(containers) => Value::List(containers.into_iter().map(|c| item.apply(c)).collect()),
                Err(err) => {
                    ::log::warn!("{err}");
                    Value::List(Vec::new())
                }
            },
        }
    }

    /// Every selector used by the rule, outermost first.
    #[must_use]
    pub fn selectors(&self) -> Vec<&Selector> {
        match self {
            Rule::Value(matcher) => vec![&matcher.selector],
            Rule::Dict { rules } => rules.values().flat_map(Rule::selectors).collect(),
            Rule::List { selector, item } => {
                let mut selectors = vec![selector];
                selectors.extend(item.selectors());
                selectors
            }
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a rule from JSON. Selectors are validated while loading.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
