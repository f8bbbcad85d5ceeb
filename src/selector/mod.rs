//! Selectors and selector synthesis.
//!
//! A [`Selector`] is a reusable query resolved against a scope node: either
//! a CSS selector string or [`Selector::Scope`], which yields the scope
//! node itself. Candidate generation lives in [`candidates`].

use crate::dom::Node;
use crate::error::{Error, Result};
use dom_query::Matcher;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod candidates;
pub mod utils;

/// Serialized form of [`Selector::Scope`].
pub const SCOPE: &str = ":scope";

/// A query resolving to zero or more nodes below a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    /// CSS selector matched against the scope's descendants.
    Css(String),
    /// The scope node itself.
    Scope,
}

impl Selector {
    /// Parse and validate a selector. `":scope"` yields [`Selector::Scope`].
    pub fn parse(css: &str) -> Result<Self> {
        let css = css.trim();
        if css == SCOPE {
            return Ok(Selector::Scope);
        }
        if css.is_empty() || Matcher::new(css).is_err() {
            return Err(Error::InvalidSelector(css.to_string()));
        }
        Ok(Selector::Css(css.to_string()))
    }

    /// Selector text as it is persisted.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Selector::Css(css) => css,
            Selector::Scope => SCOPE,
        }
    }

    /// Ranking weight: shorter selectors are less specific and preferred
    /// on ties. Selecting the scope itself is the simplest of all.
    #[must_use]
    pub fn complexity(&self) -> usize {
        match self {
            Selector::Css(css) => css.len(),
            Selector::Scope => 0,
        }
    }

    /// Resolve against `scope`, in document order.
    pub fn select<'a>(&self, scope: Node<'a>) -> Result<Vec<Node<'a>>> {
        match self {
            Selector::Css(css) => scope.select(css),
            Selector::Scope => Ok(vec![scope]),
        }
    }

    /// First node in document order, if any.
    #[must_use]
    pub fn select_first<'a>(&self, scope: Node<'a>) -> Option<Node<'a>> {
        self.select(scope).ok().and_then(|nodes| nodes.first().copied())
    }
}

impl TryFrom<String> for Selector {
    type Error = Error;

    fn try_from(css: String) -> Result<Self> {
        Selector::parse(&css)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        match selector {
            Selector::Css(css) => css,
            Selector::Scope => SCOPE.to_string(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `selector` selects exactly `nodes` below `scope`, in that order.
#[must_use]
pub fn matches_exactly<'a>(scope: Node<'a>, selector: &Selector, nodes: &[Node<'a>]) -> bool {
    selector
        .select(scope)
        .is_ok_and(|selected| selected.as_slice() == nodes)
}
