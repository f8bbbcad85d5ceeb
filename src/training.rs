//! Rule induction.
//!
//! Turns a [`TrainingSet`] into a [`Rule`]. Sample values are located on
//! their pages, candidate selectors are generated from the located nodes,
//! and the candidate that generalizes best across all pages is kept.
//!
//! - Scalar samples: one value per page, scored jointly over every page.
//! - Dict samples: each key is trained on its own, as a scalar.
//! - List samples: records are segmented into containers first, then
//!   every key is trained relative to its record's container.

use crate::dom::{Node, Page};
use crate::error::{Error, Result};
use crate::matches::{generate_value_matches, group_by_extractor, Extractor, Match, Matcher};
use crate::options::Options;
use crate::rule::Rule;
use crate::samples::{Shape, TrainingSet, Value};
use crate::scoring::{best_selector, ScoredSelector, Target};
use crate::segmentation::{derive_container, RecordSet};
use crate::selector::candidates::path_selectors;
use crate::selector::Selector;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Key of the value in a list of plain strings and of a scalar sample.
const ITEM_KEY: &str = "";

/// Train a rule from every sample in `training_set`.
///
/// # Example
///
/// ```rust
/// use rs_mlscraper::training::train;
/// use rs_mlscraper::{Options, Sample, TrainingSet, Value};
///
/// let set = TrainingSet::new()
///     .with_sample(Sample::from_html(
///         r#"<html><body><p class="test">test</p><p>bla</p></body></html>"#,
///         "test",
///     ))?
///     .with_sample(Sample::from_html(
///         r#"<html><body><div></div><p class="test">hallo</p></body></html>"#,
///         "hallo",
///     ))?;
///
/// let rule = train(&set, &Options::default())?;
/// let value = rule.scrape_html(r#"<html><body><p class="test">new</p></body></html>"#);
/// assert_eq!(value, Value::text("new"));
/// # Ok::<(), rs_mlscraper::Error>(())
/// ```
pub fn train(training_set: &TrainingSet, options: &Options) -> Result<Rule> {
    let Some(shape) = training_set.shape() else {
        return Err(Error::EmptyTrainingSet);
    };
    ::log::debug!(
        "Training {} rule from {} samples",
        shape.name(),
        training_set.len()
    );

    match shape {
        Shape::Scalar => train_scalar(training_set, options),
        Shape::Dict => train_dict(training_set, options),
        Shape::List => train_list(training_set, options),
    }
}

/// The literal of a leaf value, `None` if it is missing.
fn leaf<'v>(key: &str, value: &'v Value) -> Result<Option<&'v str>> {
    match value {
        Value::Text(text) => Ok(Some(text)),
        Value::Missing => Ok(None),
        Value::Dict(_) | Value::List(_) => Err(Error::InvalidSample(format!(
            "value for key {key:?} must be a string, found a nested {}",
            value.shape().name()
        ))),
    }
}

fn train_scalar(training_set: &TrainingSet, options: &Options) -> Result<Rule> {
    let mut observations = Vec::with_capacity(training_set.len());
    for sample in training_set.samples() {
        observations.push((&sample.page, leaf(ITEM_KEY, &sample.value)?));
    }

    Ok(Rule::Value(train_value(ITEM_KEY, &observations, options)?))
}

fn train_dict(training_set: &TrainingSet, options: &Options) -> Result<Rule> {
    let mut keys = BTreeSet::new();
    for sample in training_set.samples() {
        if let Value::Dict(map) = &sample.value {
            for (key, value) in map {
                leaf(key, value)?;
                keys.insert(key.as_str());
            }
        }
    }
    if keys.is_empty() {
        return Err(Error::InvalidSample("dict samples have no keys".to_string()));
    }

    let mut rules = BTreeMap::new();
    for key in keys {
        // a key the sample does not mention is missing on that page
        let observations: Vec<(&Page, Option<&str>)> = training_set
            .samples()
            .iter()
            .map(|sample| (&sample.page, sample.value.get(key).and_then(Value::as_text)))
            .collect();
        let matcher = train_value(key, &observations, options)?;
        ::log::debug!("Key {key:?}: {} ({:?})", matcher.selector, matcher.extractor);
        rules.insert(key.to_string(), Rule::Value(matcher));
    }
    Ok(Rule::Dict { rules })
}

/// Train one value across whole pages.
///
/// `observations` pairs each page with the literal expected on it, or
/// `None` where the value is absent; those pages count against any
/// selector that matches on them.
///
/// Extractors are tried text first. An extractor is only considered when
/// it locates the value on every page the value was found on; pages where
/// it finds the value several times are left out with a warning. The
/// extractor whose best selector scores highest wins, earlier extractors
/// win ties.
pub fn train_value(
    key: &str,
    observations: &[(&Page, Option<&str>)],
    options: &Options,
) -> Result<Matcher> {
    let Some(first) = observations.iter().find_map(|(_, value)| *value) else {
        return Err(Error::InvalidSample(format!(
            "key {key:?} has no value in any sample"
        )));
    };

    let mut located = Vec::new();
    let mut negatives = Vec::new();
    for (index, (page, value)) in observations.iter().enumerate() {
        let Some(value) = value else {
            negatives.push(Target::absent(page.root()));
            continue;
        };
        let groups = group_by_extractor(generate_value_matches(page, value, options.match_attributes));
        if groups.is_empty() {
            ::log::warn!("Value {value:?} for key {key:?} not found in sample {index}, skipping it");
        } else {
            located.push((index, page.root(), groups));
        }
    }
    if located.is_empty() {
        return Err(Error::NoSampleMatch {
            key: key.to_string(),
            value: first.to_string(),
        });
    }

    let extractors: BTreeSet<&Extractor> = located.iter().flat_map(|(_, _, groups)| groups.keys()).collect();
    let mut best: Option<(Extractor, ScoredSelector)> = None;
    let mut ambiguous = false;

    'extractors: for extractor in extractors {
        let mut targets = Vec::new();
        for (index, scope, groups) in &located {
            match groups.get(extractor).map(Vec::as_slice) {
                None | Some([]) => {
                    ::log::debug!("{extractor:?} does not locate {key:?} in sample {index}");
                    continue 'extractors;
                }
                Some([node]) => targets.push(Target::single(*scope, *node)),
                Some(nodes) => ::log::warn!(
                    "Value for key {key:?} occurs {} times in sample {index}, skipping it",
                    nodes.len()
                ),
            }
        }
        if targets.is_empty() {
            ambiguous = true;
            continue;
        }

        let candidates = candidate_selectors(&targets, options);
        targets.extend(negatives.iter().cloned());
        let Some(scored) = best_selector(candidates, &targets) else {
            continue;
        };
        if best
            .as_ref()
            .is_none_or(|(_, current)| scored.score.jaccard > current.score.jaccard)
        {
            best = Some((extractor.clone(), scored));
        }
    }

    let Some((extractor, best)) = best else {
        return Err(if ambiguous {
            Error::AmbiguousSample {
                key: key.to_string(),
            }
        } else {
            Error::NoGeneralizingSelector {
                key: key.to_string(),
                best_score: None,
            }
        });
    };

    let score = best.score.jaccard;
    if score <= options.min_score || (options.strict && !best.score.is_perfect()) {
        return Err(Error::NoGeneralizingSelector {
            key: key.to_string(),
            best_score: Some(score),
        });
    }
    if !best.score.is_perfect() {
        ::log::warn!(
            "Best selector {} for key {key:?} only scores {score:.3} (precision {:.3}, recall {:.3})",
            best.selector,
            best.score.precision,
            best.score.recall
        );
    }
    Ok(Matcher::new(best.selector, extractor))
}

/// Candidates generated from every target node, deduplicated, in
/// generation order.
fn candidate_selectors(targets: &[Target<'_>], options: &Options) -> Vec<Selector> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for target in targets {
        for node in &target.nodes {
            if *node == target.scope && seen.insert(Selector::Scope) {
                candidates.push(Selector::Scope);
            }
            for css in path_selectors(*node, Some(target.scope), options) {
                let selector = Selector::Css(css);
                if seen.insert(selector.clone()) {
                    candidates.push(selector);
                }
            }
        }
    }
    candidates
}

/// Items of a list sample are either all strings or all dicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Scalar,
    Dict,
}

fn item_kind(training_set: &TrainingSet) -> Result<ItemKind> {
    let mut kind = None;
    for sample in training_set.samples() {
        let Value::List(items) = &sample.value else {
            continue;
        };
        for item in items {
            let found = match item {
                Value::Text(_) => ItemKind::Scalar,
                Value::Dict(map) => {
                    for (key, value) in map {
                        leaf(key, value)?;
                    }
                    ItemKind::Dict
                }
                Value::Missing => {
                    return Err(Error::InvalidSample("list items must not be missing".to_string()));
                }
                Value::List(_) => {
                    return Err(Error::InvalidSample("nested lists are not supported".to_string()));
                }
            };
            let Some(existing) = kind else {
                kind = Some(found);
                continue;
            };
            if existing != found {
                return Err(Error::InvalidSample(
                    "list items mix strings and dicts".to_string(),
                ));
            }
        }
    }
    kind.ok_or_else(|| Error::InvalidSample("list samples contain no items".to_string()))
}

/// `(key, literal)` pairs of one list item.
fn item_values(item: &Value) -> Vec<(&str, Option<&str>)> {
    match item {
        Value::Text(text) => vec![(ITEM_KEY, Some(text.as_str()))],
        Value::Dict(map) => map
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_text()))
            .collect(),
        Value::Missing | Value::List(_) => Vec::new(),
    }
}

enum Located<'a> {
    Unique(Node<'a>, Extractor),
    Ambiguous(usize),
    NotFound,
}

/// Locate `needle` on `page` with the first extractor that finds it
/// exactly once. Extractors are tried text first.
fn locate_unique<'a>(page: &'a Page, needle: &str, options: &Options) -> Located<'a> {
    let groups = group_by_extractor(generate_value_matches(page, needle, options.match_attributes));
    let mut ambiguous = None;
    for (extractor, nodes) in groups {
        match nodes.as_slice() {
            [node] => return Located::Unique(*node, extractor),
            _ => {
                ambiguous.get_or_insert(nodes.len());
            }
        }
    }
    ambiguous.map_or(Located::NotFound, Located::Ambiguous)
}

/// Keys whose records were dropped, and why.
#[derive(Debug, Default)]
struct Dropped<'a> {
    /// Keys whose value occurred several times, or whose record collided
    /// with another one.
    ambiguous: BTreeSet<&'a str>,
    /// First literal of each key that was not found at all.
    not_found: BTreeMap<&'a str, &'a str>,
}

impl Dropped<'_> {
    /// Error for `key` when no kept record locates it.
    fn error_for(&self, key: &str) -> Error {
        match self.not_found.get(key) {
            Some(value) if !self.ambiguous.contains(key) => Error::NoSampleMatch {
                key: key.to_string(),
                value: (*value).to_string(),
            },
            _ => Error::AmbiguousSample {
                key: key.to_string(),
            },
        }
    }

    /// Error when no record survived at all. Duplicates win over values
    /// that are simply absent.
    fn error(&self) -> Error {
        match (self.ambiguous.first(), self.not_found.first_key_value()) {
            (Some(key), _) => Error::AmbiguousSample {
                key: (*key).to_string(),
            },
            (None, Some((key, value))) => Error::NoSampleMatch {
                key: (*key).to_string(),
                value: (*value).to_string(),
            },
            (None, None) => Error::AmbiguousSample {
                key: ITEM_KEY.to_string(),
            },
        }
    }
}

/// A list record whose values were all located exactly once.
#[derive(Debug)]
struct Record<'a> {
    root: Node<'a>,
    values: BTreeMap<&'a str, (Node<'a>, Extractor)>,
}

/// Locate every record of one list sample, dropping the ones that cannot
/// be pinned down. Kept records stay in sample order.
fn locate_records<'a>(
    index: usize,
    page: &'a Page,
    items: &'a [Value],
    kind: ItemKind,
    options: &Options,
    dropped: &mut Dropped<'a>,
) -> Vec<Record<'a>> {
    let mut records = Vec::new();

    'items: for (position, item) in items.iter().enumerate() {
        let mut values = BTreeMap::new();
        for (key, needle) in item_values(item) {
            let Some(needle) = needle else {
                continue;
            };
            match locate_unique(page, needle, options) {
                Located::Unique(node, extractor) => {
                    values.insert(key, (node, extractor));
                }
                Located::Ambiguous(count) => {
                    dropped.ambiguous.insert(key);
                    ::log::warn!(
                        "Dropping record {position} of sample {index}: {needle:?} for key {key:?} occurs {count} times"
                    );
                    continue 'items;
                }
                Located::NotFound => {
                    dropped.not_found.entry(key).or_insert(needle);
                    ::log::warn!(
                        "Dropping record {position} of sample {index}: {needle:?} for key {key:?} not found"
                    );
                    continue 'items;
                }
            }
        }

        let matched = match kind {
            ItemKind::Scalar => values
                .get(ITEM_KEY)
                .map(|(node, extractor)| Match::value(*node, extractor.clone())),
            ItemKind::Dict => Match::dict(
                values
                    .iter()
                    .map(|(key, (node, extractor))| {
                        ((*key).to_string(), Match::value(*node, extractor.clone()))
                    })
                    .collect(),
            ),
        };
        let Some(matched) = matched else {
            ::log::warn!("Dropping record {position} of sample {index}: no value to locate it by");
            continue;
        };
        records.push(Record {
            root: matched.root(),
            values,
        });
    }

    // records must own distinct, non-nested subtrees
    let roots: Vec<Node<'a>> = records.iter().map(|r| r.root).collect();
    records.retain(|record| {
        let shared = roots.iter().filter(|root| **root == record.root).count() > 1;
        let nested = roots.iter().any(|root| record.root.is_ancestor_of(root));
        if shared || nested {
            dropped.ambiguous.extend(record.values.keys().copied());
            ::log::warn!(
                "Dropping record at {:?} of sample {index}: it collides with another record",
                record.root
            );
        }
        !(shared || nested)
    });
    if records.windows(2).any(|pair| pair[0].root.position() > pair[1].root.position()) {
        ::log::warn!("Records of sample {index} are not listed in document order");
    }
    records
}

fn train_list(training_set: &TrainingSet, options: &Options) -> Result<Rule> {
    let kind = item_kind(training_set)?;

    let mut keys = BTreeSet::new();
    let mut valued = BTreeSet::new();
    let mut dropped = Dropped::default();
    let mut pages = Vec::new();
    let mut record_sets = Vec::new();
    for (index, sample) in training_set.samples().iter().enumerate() {
        let Value::List(items) = &sample.value else {
            continue;
        };
        for item in items {
            for (key, needle) in item_values(item) {
                keys.insert(key);
                if needle.is_some() {
                    valued.insert(key);
                }
            }
        }

        let records = locate_records(index, &sample.page, items, kind, options, &mut dropped);
        record_sets.push(RecordSet {
            scope: sample.page.root(),
            roots: records.iter().map(|r| r.root).collect(),
            expected: items.len(),
        });
        pages.push(records);
    }
    if pages.iter().all(Vec::is_empty) {
        return Err(dropped.error());
    }

    let segmentation = derive_container(&record_sets, options)?;
    ::log::debug!("Records are selected by {}", segmentation.selector);

    let key_rule = |key: &str| -> Result<Rule> {
        let mut positives = Vec::new();
        let mut negatives = Vec::new();
        for (records, containers) in pages.iter().zip(&segmentation.containers) {
            for (record, container) in records.iter().zip(containers) {
                match record.values.get(key) {
                    Some((node, extractor)) => positives.push(Instance {
                        container: *container,
                        node: *node,
                        extractor,
                    }),
                    None => negatives.push(*container),
                }
            }
        }
        if positives.is_empty() {
            return Err(if valued.contains(key) {
                dropped.error_for(key)
            } else {
                Error::InvalidSample(format!("key {key:?} has no value in any sample"))
            });
        }
        Ok(Rule::Value(train_relative(key, &positives, &negatives, options)?))
    };

    let item = match kind {
        ItemKind::Scalar => key_rule(ITEM_KEY)?,
        ItemKind::Dict => {
            let mut rules = BTreeMap::new();
            for key in keys {
                rules.insert(key.to_string(), key_rule(key)?);
            }
            Rule::Dict { rules }
        }
    };

    Ok(Rule::List {
        selector: segmentation.selector,
        item: Box::new(item),
    })
}

/// A located value together with its record's container.
struct Instance<'a, 'e> {
    container: Node<'a>,
    node: Node<'a>,
    extractor: &'e Extractor,
}

/// Train one key relative to record containers.
///
/// Every instance votes once for each of its candidate selectors paired
/// with its extractor. Pairs are tried by votes, then simplicity, then
/// generation order; the first one that yields each instance's value node
/// as its first match wins. Pairs that also stay silent in containers
/// where the value is missing are preferred.
fn train_relative(
    key: &str,
    positives: &[Instance<'_, '_>],
    negatives: &[Node<'_>],
    options: &Options,
) -> Result<Matcher> {
    // (selector, extractor) -> (votes, first seen)
    let mut votes: HashMap<(Selector, Extractor), (usize, usize)> = HashMap::new();
    for instance in positives {
        let mut candidates = Vec::new();
        if instance.node == instance.container {
            candidates.push(Selector::Scope);
        }
        candidates.extend(path_selectors(instance.node, Some(instance.container), options).map(Selector::Css));

        for selector in candidates {
            let order = votes.len();
            votes
                .entry((selector, instance.extractor.clone()))
                .or_insert((0, order))
                .0 += 1;
        }
    }

    let mut ranked: Vec<((Selector, Extractor), usize, usize)> = votes
        .into_iter()
        .map(|(pair, (count, order))| (pair, count, order))
        .collect();
    ranked.sort_by(|(a, a_count, a_order), (b, b_count, b_order)| {
        b_count
            .cmp(a_count)
            .then_with(|| a.0.complexity().cmp(&b.0.complexity()))
            .then_with(|| a_order.cmp(b_order))
    });

    let mut fallback = None;
    for ((selector, extractor), count, _) in ranked {
        let reproduces = positives.iter().all(|instance| {
            *instance.extractor == extractor && selector.select_first(instance.container) == Some(instance.node)
        });
        if !reproduces {
            continue;
        }
        if negatives.iter().all(|c| selector.select_first(*c).is_none()) {
            ::log::debug!("Key {key:?}: {selector} ({count} votes)");
            return Ok(Matcher::new(selector, extractor));
        }
        if fallback.is_none() {
            fallback = Some(Matcher::new(selector, extractor));
        }
    }

    match fallback {
        Some(matcher) if !options.strict => {
            ::log::warn!(
                "Selector {} for key {key:?} also matches records where the value is missing",
                matcher.selector
            );
            Ok(matcher)
        }
        _ => Err(Error::NoGeneralizingSelector {
            key: key.to_string(),
            best_score: None,
        }),
    }
}
