//! Common-ancestor and tree-path computations.
//!
//! Paths contain elements only. The document node is never part of a
//! path, which keeps generated selectors anchored at `html` at most.

use crate::dom::Node;
use std::collections::HashSet;

/// Element path from the root element down to `node` (inclusive).
#[must_use]
pub fn tree_path<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    if !node.is_element() {
        return Vec::new();
    }
    let mut path = node.ancestors();
    path.reverse();
    path.push(node);
    path
}

/// Elements strictly below `ancestor` down to `node` (inclusive).
///
/// Returns an empty path when `node == ancestor` or when `ancestor` is not
/// an ancestor of `node`.
#[must_use]
pub fn path_below<'a>(ancestor: Node<'a>, node: Node<'a>) -> Vec<Node<'a>> {
    if !ancestor.is_ancestor_of(&node) {
        return Vec::new();
    }
    let path = tree_path(node);
    match path.iter().position(|n| *n == ancestor) {
        Some(i) => path[i + 1..].to_vec(),
        // document node: everything is below it
        None => path,
    }
}

/// Lowest node that is an ancestor of, or equal to, every given node.
///
/// `None` for an empty slice or for nodes from different pages.
#[must_use]
pub fn common_ancestor<'a>(nodes: &[Node<'a>]) -> Option<Node<'a>> {
    let (first, rest) = nodes.split_first()?;
    let mut common = tree_path(*first);

    for node in rest {
        if node.page().serial() != first.page().serial() {
            return None;
        }
        let path = tree_path(*node);
        let shared = common
            .iter()
            .zip(&path)
            .take_while(|(a, b)| a == b)
            .count();
        common.truncate(shared);
    }

    common.last().copied()
}

/// For each record root, the nodes on its path below `container` that lie
/// on no other record's path.
///
/// Two records sharing a node means that node cannot tell them apart, so
/// it is removed from both lists. The result keeps path order (nearest
/// the container first).
#[must_use]
pub fn unique_ancestors<'a>(container: Node<'a>, roots: &[Node<'a>]) -> Vec<Vec<Node<'a>>> {
    let paths: Vec<Vec<Node<'a>>> = roots.iter().map(|r| path_below(container, *r)).collect();

    let mut seen: HashSet<Node<'a>> = HashSet::new();
    let mut shared: HashSet<Node<'a>> = HashSet::new();
    for path in &paths {
        for node in path {
            if !seen.insert(*node) {
                shared.insert(*node);
            }
        }
    }

    paths
        .into_iter()
        .map(|path| path.into_iter().filter(|n| !shared.contains(n)).collect())
        .collect()
}
