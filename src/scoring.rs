//! Generalization scoring for candidate selectors.
//!
//! A candidate is scored against the target nodes of every training page
//! at once. Matched and target nodes are pooled across pages (node
//! identity includes the page), and the combined score is the
//! intersection over union of the two pools. Selecting too much lowers
//! precision, missing targets lowers recall, and both lower the score.

use crate::dom::Node;
use crate::selector::Selector;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Result of scoring one selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorScore {
    /// Matched targets / all matched nodes.
    pub precision: f64,
    /// Matched targets / all targets.
    pub recall: f64,
    /// Matched targets / (matched nodes ∪ targets).
    pub jaccard: f64,
}

impl SelectorScore {
    /// Create a new `SelectorScore`.
    #[must_use]
    pub fn new(precision: f64, recall: f64, jaccard: f64) -> Self {
        Self {
            precision,
            recall,
            jaccard,
        }
    }

    /// Perfect score (all metrics = 1.0).
    #[must_use]
    pub fn perfect() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Zero score (all metrics = 0.0).
    #[must_use]
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Whether the selector selects exactly the targets on every page.
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.jaccard >= 1.0
    }
}

/// Nodes a selector should select below one scope.
///
/// An empty node list marks a page where the value is absent: anything
/// selected there counts against the selector.
#[derive(Debug, Clone)]
pub struct Target<'a> {
    /// Node the selector is resolved against.
    pub scope: Node<'a>,
    /// Nodes the selector should yield.
    pub nodes: Vec<Node<'a>>,
}

impl<'a> Target<'a> {
    /// Target for a single expected node.
    #[must_use]
    pub fn single(scope: Node<'a>, node: Node<'a>) -> Self {
        Self {
            scope,
            nodes: vec![node],
        }
    }

    /// Target expecting no node at all.
    #[must_use]
    pub fn absent(scope: Node<'a>) -> Self {
        Self {
            scope,
            nodes: Vec::new(),
        }
    }
}

/// Score `selector` jointly against all targets.
///
/// A selector that fails to resolve counts as selecting nothing.
#[must_use]
pub fn score_selector(selector: &Selector, targets: &[Target<'_>]) -> SelectorScore {
    let mut matched_total = 0usize;
    let mut target_total = 0usize;
    let mut hits = 0usize;

    for target in targets {
        let matched = selector.select(target.scope).unwrap_or_else(|err| {
            ::log::debug!("Skipping unresolvable candidate: {err}");
            Vec::new()
        });
        let wanted: HashSet<&Node<'_>> = target.nodes.iter().collect();

        hits += matched.iter().filter(|n| wanted.contains(n)).count();
        matched_total += matched.len();
        target_total += wanted.len();
    }

    if matched_total == 0 && target_total == 0 {
        return SelectorScore::perfect();
    }
    if matched_total == 0 || target_total == 0 {
        return SelectorScore::zero();
    }

    let union = matched_total + target_total - hits;
    SelectorScore::new(
        hits as f64 / matched_total as f64,
        hits as f64 / target_total as f64,
        hits as f64 / union as f64,
    )
}

/// A scored candidate together with its position in generation order.
#[derive(Debug, Clone)]
pub struct ScoredSelector {
    /// The candidate.
    pub selector: Selector,
    /// Its joint score.
    pub score: SelectorScore,
    /// Index in the candidate sequence, used as the final tie-break.
    pub order: usize,
}

/// Ranking order: higher score first, then the simpler selector, then the
/// earlier candidate.
#[must_use]
pub fn compare(a: &ScoredSelector, b: &ScoredSelector) -> Ordering {
    b.score
        .jaccard
        .total_cmp(&a.score.jaccard)
        .then_with(|| a.selector.complexity().cmp(&b.selector.complexity()))
        .then_with(|| a.order.cmp(&b.order))
}

/// Sort candidates best first.
///
/// The order only depends on the candidates themselves, so scoring them
/// in any order (or in parallel) ranks them identically.
pub fn rank(candidates: &mut [ScoredSelector]) {
    candidates.sort_by(compare);
}

/// Score every candidate and return the best one.
pub fn best_selector<I>(candidates: I, targets: &[Target<'_>]) -> Option<ScoredSelector>
where
    I: IntoIterator<Item = Selector>,
{
    let mut scored: Vec<ScoredSelector> = candidates
        .into_iter()
        .enumerate()
        .map(|(order, selector)| {
            let score = score_selector(&selector, targets);
            ScoredSelector {
                selector,
                score,
                order,
            }
        })
        .collect();

    rank(&mut scored);
    if let Some(best) = scored.first() {
        ::log::debug!(
            "Best of {} candidates: {} (score {:.3})",
            scored.len(),
            best.selector,
            best.score.jaccard
        );
    }
    scored.into_iter().next()
}
