//! # rs-mlscraper
//!
//! Scraper induction: learn reusable CSS-selector extraction rules from a
//! handful of pages and the literal values they contain.
//!
//! Instead of writing selectors by hand, give the library a few pages
//! together with the values you want out of them. It locates the values,
//! synthesizes candidate selectors, keeps the ones that generalize across
//! every page, and returns a [`Rule`] that can be applied to new pages of
//! the same template or persisted as JSON.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_mlscraper::{train, Sample, TrainingSet, Value};
//!
//! let html = r#"<html><body>
//!     <div class="r"><h1>no 1</h1><p>the first one</p></div>
//!     <div class="r"><h1>no 2</h1><p>the second one</p></div>
//! </body></html>"#;
//!
//! let sample = Value::list([
//!     Value::dict([("h", "no 1"), ("t", "the first one")]),
//!     Value::dict([("h", "no 2"), ("t", "the second one")]),
//! ]);
//! let set = TrainingSet::new().with_sample(Sample::from_html(html, sample.clone()))?;
//!
//! let rule = train(&set)?;
//! assert_eq!(rule.scrape_html(html), sample);
//! # Ok::<(), rs_mlscraper::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Three shapes**: single values, dicts of values and lists of records
//! - **Attribute values**: values found in attributes (links, image sources)
//!   are read from the attribute instead of the text
//! - **Multi-page generalization**: selectors are scored jointly over all
//!   training pages, so page-specific selectors lose
//! - **Persistent rules**: rules serialize to JSON and are re-validated on load
//! - **Configurable**: [`Options`] bound the search and decide how strictly
//!   imperfect selectors are treated

mod error;
mod options;
mod rule;
mod samples;

/// Tree path and common-ancestor computations.
pub mod ancestors;

/// Parsed pages and node handles over `dom_query`.
pub mod dom;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Located sample values, extractors and matchers.
pub mod matches;

/// Joint generalization scoring of candidate selectors.
pub mod scoring;

/// Record container derivation for list samples.
pub mod segmentation;

/// Selectors and candidate selector generation.
pub mod selector;

/// Rule induction from training sets.
pub mod training;

// Public API - re-exports
pub use dom::{Node, Page};
pub use error::{Error, Result};
pub use matches::{Extractor, Matcher};
pub use options::Options;
pub use rule::Rule;
pub use samples::{Sample, Shape, TrainingSet, Value};
pub use selector::Selector;

/// Trains an extraction rule using default options.
///
/// # Example
///
/// ```rust
/// use rs_mlscraper::{train, Sample, TrainingSet, Value};
///
/// let set = TrainingSet::new()
///     .with_sample(Sample::from_html(
///         r#"<html><body><span class="price">9.99</span></body></html>"#,
///         "9.99",
///     ))?;
///
/// let rule = train(&set)?;
/// let value = rule.scrape_html(r#"<html><body><span class="price">4.50</span></body></html>"#);
/// assert_eq!(value, Value::text("4.50"));
/// # Ok::<(), rs_mlscraper::Error>(())
/// ```
pub fn train(training_set: &TrainingSet) -> Result<Rule> {
    train_with_options(training_set, &Options::default())
}

/// Trains an extraction rule with custom options.
///
/// # Example
///
/// ```rust
/// use rs_mlscraper::{train_with_options, Options, Sample, TrainingSet};
///
/// let set = TrainingSet::new()
///     .with_sample(Sample::from_html(
///         r#"<html><body><a href="/about">About</a></body></html>"#,
///         "/about",
///     ))?;
///
/// let options = Options {
///     strict: true,
///     ..Options::default()
/// };
/// let rule = train_with_options(&set, &options)?;
/// println!("{}", rule.to_json()?);
/// # Ok::<(), rs_mlscraper::Error>(())
/// ```
pub fn train_with_options(training_set: &TrainingSet, options: &Options) -> Result<Rule> {
    training::train(training_set, options)
}
