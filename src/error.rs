//! Error types for rs-mlscraper.
//!
//! Training errors are hard failures for the key or shape being induced.
//! Application-time misses are not errors: applying a [`crate::Rule`]
//! yields [`crate::Value::Missing`] for fields that cannot be found.

/// Error type for training and matching operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A CSS selector could not be parsed.
    #[error("Invalid CSS selector: {0:?}")]
    InvalidSelector(String),

    /// A sample value has a shape that cannot be trained.
    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    /// Samples added to one training set disagree on their shape.
    #[error("Sample shape {found} does not match training set shape {expected}")]
    InconsistentSamples {
        /// Shape of the samples already in the set.
        expected: &'static str,
        /// Shape of the rejected sample.
        found: &'static str,
    },

    /// Training was started without any samples.
    #[error("Training set contains no samples")]
    EmptyTrainingSet,

    /// A sample value was not found on any page.
    #[error("Sample value {value:?} for key {key:?} not found on any page")]
    NoSampleMatch {
        /// Key the value belongs to (empty for a scalar sample).
        key: String,
        /// The literal that was searched for.
        value: String,
    },

    /// Sample values occur several times on their pages and cannot be located.
    #[error("Sample values for key {key:?} are not unique on their pages")]
    AmbiguousSample {
        /// Key the value belongs to (empty for a scalar sample or list).
        key: String,
    },

    /// No candidate selector generalizes across the samples.
    #[error("No generalizing selector for key {key:?} (best score: {best_score:?})")]
    NoGeneralizingSelector {
        /// Key being trained (empty for a scalar sample).
        key: String,
        /// Best score seen, if any candidate was scored at all.
        best_score: Option<f64>,
    },

    /// No selector yields exactly one container per list record.
    #[error("No selector found that matches exactly one container per record")]
    NoContainerFound,

    /// A selector matched nothing.
    #[error("Selector {selector:?} matched no nodes")]
    NoMatch {
        /// The selector that was applied.
        selector: String,
    },

    /// A selector matched more nodes than the caller expected.
    #[error("Selector {selector:?} matched {count} nodes, expected one")]
    AmbiguousMatch {
        /// The selector that was applied.
        selector: String,
        /// Number of nodes matched.
        count: usize,
    },

    /// A rule could not be (de)serialized.
    #[error("Rule serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for training and matching operations.
pub type Result<T> = std::result::Result<T, Error>;
