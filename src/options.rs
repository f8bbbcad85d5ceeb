//! Configuration options for rule induction.
//!
//! The `Options` struct bounds the candidate search and decides how
//! strictly imperfect selectors are treated.

/// Configuration options for rule induction.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_mlscraper::Options;
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     strict: true,
///     max_path_depth: 4,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum number of path segments in a generated selector.
    ///
    /// Bounds candidate enumeration on very deep documents. Segments are
    /// counted from the target node upwards.
    ///
    /// Default: `8`
    pub max_path_depth: usize,

    /// Maximum number of candidate selectors generated per node.
    ///
    /// Default: `512`
    pub max_candidates: usize,

    /// Minimum score a selector must exceed to be usable.
    ///
    /// The score is the intersection-over-union of matched and target
    /// nodes across all training pages. Selectors at or below this value
    /// are rejected with `Error::NoGeneralizingSelector`.
    ///
    /// Default: `0.0`
    pub min_score: f64,

    /// Treat any best selector scoring below `1.0` as a training failure.
    ///
    /// When disabled, an imperfect best selector is kept and a warning is
    /// logged.
    ///
    /// Default: `false`
    pub strict: bool,

    /// Locate sample values in attribute values as well as in text.
    ///
    /// Default: `true`
    pub match_attributes: bool,

    /// Generate `:nth-of-type(n)` selectors.
    ///
    /// Positional selectors can always pin down a single node but
    /// generalize poorly across pages; they lose ties against shorter
    /// selectors with the same score.
    ///
    /// Default: `true`
    pub positional_selectors: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_path_depth: 8,
            max_candidates: 512,
            min_score: 0.0,
            strict: false,
            match_attributes: true,
            positional_selectors: true,
        }
    }
}
