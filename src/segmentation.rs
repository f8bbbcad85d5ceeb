//! Record segmentation for list pages.
//!
//! Given the root node of every located record, find one selector that
//! yields exactly one container per record. Candidates only come from
//! nodes unique to a single record's path below the records' common
//! ancestor, so a candidate cannot select a node that several records
//! share.

use crate::ancestors::{common_ancestor, path_below, unique_ancestors};
use crate::dom::Node;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::selector::candidates::path_selectors;
use crate::selector::{matches_exactly, Selector};
use std::collections::{HashMap, HashSet};

/// Located records of one list page.
#[derive(Debug, Clone)]
pub struct RecordSet<'a> {
    /// Node the container selector is resolved against (the page root).
    pub scope: Node<'a>,
    /// Root node of each usable record, in record order.
    pub roots: Vec<Node<'a>>,
    /// Number of records the page holds, including ones dropped from
    /// training. The container selector must select exactly this many.
    pub expected: usize,
}

/// The derived container selector and the containers it selects.
#[derive(Debug, Clone)]
pub struct Segmentation<'a> {
    /// Selector yielding one container per record.
    pub selector: Selector,
    /// Per page, the container of each usable record, in record order.
    pub containers: Vec<Vec<Node<'a>>>,
}

/// Nodes that may serve as a container for each record of one page.
///
/// A page with a single usable record has no siblings to tell it apart
/// from, so every node from the record root up to (not including) `body`
/// is allowed. A page without usable records only constrains the count.
fn distinct_paths<'a>(records: &RecordSet<'a>) -> Result<Vec<Vec<Node<'a>>>> {
    if records.roots.is_empty() {
        return Ok(Vec::new());
    }
    if let [root] = records.roots.as_slice() {
        let path: Vec<Node<'a>> = path_below(records.scope, *root)
            .into_iter()
            .filter(|n| !matches!(n.tag_name().as_str(), "html" | "body"))
            .collect();
        let path = if path.is_empty() { vec![*root] } else { path };
        return Ok(vec![path]);
    }

    let distinct: HashSet<&Node<'a>> = records.roots.iter().collect();
    if distinct.len() != records.roots.len() {
        ::log::warn!("Several records share the same root node");
        return Err(Error::NoContainerFound);
    }
    for a in &records.roots {
        if records.roots.iter().any(|b| a.is_ancestor_of(b)) {
            ::log::warn!("Record {a:?} contains another record");
            return Err(Error::NoContainerFound);
        }
    }

    let container = common_ancestor(&records.roots).ok_or(Error::NoContainerFound)?;
    let paths = unique_ancestors(container, &records.roots);
    if paths.iter().any(Vec::is_empty) {
        return Err(Error::NoContainerFound);
    }
    Ok(paths)
}

/// Containers selected by `selector`, one per usable record, or `None` if
/// the selector does not segment every page exactly.
fn segment<'a>(
    selector: &Selector,
    pages: &[RecordSet<'a>],
    paths: &[Vec<Vec<Node<'a>>>],
) -> Option<Vec<Vec<Node<'a>>>> {
    let mut containers = Vec::with_capacity(pages.len());

    for (records, record_paths) in pages.iter().zip(paths) {
        let selected = selector.select(records.scope).ok()?;
        if selected.len() != records.expected {
            return None;
        }

        let page_containers = if record_paths.len() == records.expected {
            // every record was kept: the selection must be the records'
            // containers and nothing else, in record order
            let page_containers: Vec<Node<'a>> = record_paths
                .iter()
                .map(|path| selected.iter().find(|node| path.contains(*node)).copied())
                .collect::<Option<_>>()?;
            if !matches_exactly(records.scope, selector, &page_containers) {
                return None;
            }
            page_containers
        } else {
            owned_in_order(&selected, record_paths)?
        };
        containers.push(page_containers);
    }
    Some(containers)
}

/// The selected nodes owned by a record, each record once and in record
/// order. Nodes owned by no record belong to records dropped from
/// training.
fn owned_in_order<'a>(selected: &[Node<'a>], record_paths: &[Vec<Node<'a>>]) -> Option<Vec<Node<'a>>> {
    let mut owned = Vec::with_capacity(record_paths.len());
    for node in selected {
        let Some(owner) = record_paths.iter().position(|p| p.contains(node)) else {
            continue;
        };
        if owner != owned.len() {
            return None;
        }
        owned.push(*node);
    }
    (owned.len() == record_paths.len()).then_some(owned)
}

/// Derive a selector that yields exactly one container per record on
/// every page.
///
/// Candidates are generated from every record's distinct nodes and ranked
/// by how many records produced them, then by length, then by generation
/// order. The first candidate that segments every page wins.
pub fn derive_container<'a>(pages: &[RecordSet<'a>], options: &Options) -> Result<Segmentation<'a>> {
    let mut paths = Vec::with_capacity(pages.len());
    for records in pages {
        paths.push(distinct_paths(records)?);
    }

    // css -> (votes, first seen)
    let mut votes: HashMap<String, (usize, usize)> = HashMap::new();
    for record_path in paths.iter().flatten() {
        let mut voted = HashSet::new();
        for node in record_path {
            for css in path_selectors(*node, None, options) {
                if voted.insert(css.clone()) {
                    let order = votes.len();
                    votes.entry(css).or_insert((0, order)).0 += 1;
                }
            }
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = votes
        .into_iter()
        .map(|(css, (count, order))| (css, count, order))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.len().cmp(&b.0.len()))
            .then_with(|| a.2.cmp(&b.2))
    });
    ::log::debug!("Evaluating {} container candidates", ranked.len());

    for (css, count, _) in ranked {
        let selector = Selector::Css(css);
        if let Some(containers) = segment(&selector, pages, &paths) {
            ::log::debug!("Container selector {selector} ({count} votes)");
            return Ok(Segmentation {
                selector,
                containers,
            });
        }
    }

    Err(Error::NoContainerFound)
}
