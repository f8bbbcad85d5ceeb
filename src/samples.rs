//! Training samples and extracted values.
//!
//! [`Value`] is both the shape of a training sample and the result of
//! applying a rule, so scraping a training page can be compared directly
//! with the sample it was trained on.

use crate::dom::Page;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scraped or sampled value.
///
/// Serializes as plain JSON: a string, `null`, an array or an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A literal string.
    Text(String),
    /// No value (node or attribute absent).
    Missing,
    /// An ordered sequence of values.
    List(Vec<Value>),
    /// Named values.
    Dict(BTreeMap<String, Value>),
}

impl Value {
    /// A text value.
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    /// A dict from key/value pairs.
    pub fn dict<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Dict(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// A list from items.
    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// The text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this value is [`Value::Missing`].
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Look up a key of a dict value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Dict(map) => map.get(key),
            _ => None,
        }
    }

    /// The top-level shape of this value.
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Value::Text(_) | Value::Missing => Shape::Scalar,
            Value::Dict(_) => Shape::Dict,
            Value::List(_) => Shape::List,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Missing, Into::into)
    }
}

/// Top-level shape of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A single string.
    Scalar,
    /// Named strings.
    Dict,
    /// A list of strings or of dicts.
    List,
}

impl Shape {
    /// Human readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Shape::Scalar => "scalar",
            Shape::Dict => "dict",
            Shape::List => "list",
        }
    }
}

/// A page together with the value a trained rule should extract from it.
#[derive(Debug)]
pub struct Sample {
    /// The training page.
    pub page: Page,
    /// The expected value.
    pub value: Value,
}

impl Sample {
    /// Create a sample from an already parsed page.
    pub fn new(page: Page, value: impl Into<Value>) -> Self {
        Self {
            page,
            value: value.into(),
        }
    }

    /// Parse `html` and pair it with `value`.
    pub fn from_html(html: &str, value: impl Into<Value>) -> Self {
        Self::new(Page::parse(html), value)
    }
}

/// Samples of one shape, trained together.
#[derive(Debug, Default)]
pub struct TrainingSet {
    samples: Vec<Sample>,
}

impl TrainingSet {
    /// Create an empty training set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample. All samples must share the shape of the first one.
    pub fn add_sample(&mut self, sample: Sample) -> Result<()> {
        if let Some(expected) = self.shape() {
            let found = sample.value.shape();
            if found != expected {
                return Err(Error::InconsistentSamples {
                    expected: expected.name(),
                    found: found.name(),
                });
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Builder-style [`TrainingSet::add_sample`].
    pub fn with_sample(mut self, sample: Sample) -> Result<Self> {
        self.add_sample(sample)?;
        Ok(self)
    }

    /// Shape shared by all samples, `None` while empty.
    #[must_use]
    pub fn shape(&self) -> Option<Shape> {
        self.samples.first().map(|s| s.value.shape())
    }

    /// The samples in insertion order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the set has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
