//! Tree access layer over `dom_query`.
//!
//! A [`Page`] owns one parsed document. A [`Node`] is a cheap, copyable
//! handle to an element (or the document node) inside a page. Node
//! equality and hashing are by tree identity: the page's serial number
//! plus the `dom_query` node id. Two pages parsed from the same markup
//! therefore never produce equal nodes.

use crate::encoding;
use crate::error::{Error, Result};
use dom_query::{Document, Matcher, NodeId, NodeRef, Selection};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PAGE_SERIAL: AtomicU64 = AtomicU64::new(0);

/// Attributes never treated as carrying sample values.
const IGNORED_ATTRIBUTES: &[&str] = &["class", "style"];

/// Collapse runs of whitespace to single spaces and trim both ends.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// An immutable parsed HTML page.
pub struct Page {
    document: Document,
    serial: u64,
    order: HashMap<NodeId, usize>,
}

impl Page {
    /// Parse an HTML string.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let document = Document::from(html);
        let order = index_document_order(document.root());
        Self {
            document,
            serial: NEXT_PAGE_SERIAL.fetch_add(1, Ordering::Relaxed),
            order,
        }
    }

    /// Parse raw HTML bytes, detecting the charset first.
    #[must_use]
    pub fn from_bytes(html: &[u8]) -> Self {
        Self::parse(&encoding::decode_html(html))
    }

    /// Process-unique identity of this parse.
    #[inline]
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// The document node. Selecting from it searches the whole page.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node {
            page: self,
            inner: self.document.root(),
        }
    }

    /// Select all elements matching `css`, in document order.
    pub fn select(&self, css: &str) -> Result<Vec<Node<'_>>> {
        self.root().select(css)
    }

    /// All elements of the page in document order.
    #[must_use]
    pub fn elements(&self) -> Vec<Node<'_>> {
        self.root().descendants()
    }

    /// Serialized markup of the whole page.
    #[must_use]
    pub fn html(&self) -> String {
        self.document.html().to_string()
    }

    /// Find every occurrence of a literal value.
    ///
    /// Text matches are the deepest elements whose normalized text
    /// contains the normalized needle; callers that need exact equality
    /// filter further. Attribute matches require the trimmed attribute
    /// value to equal the needle. Results are in document order.
    #[must_use]
    pub fn find_all(&self, needle: &str) -> Vec<HtmlMatch<'_>> {
        let needle = normalize_text(needle);
        if needle.is_empty() {
            return Vec::new();
        }

        let mut found = Vec::new();
        for node in self.elements() {
            if node.text().contains(&needle)
                && !node.children().iter().any(|child| child.text().contains(&needle))
            {
                found.push(HtmlMatch::Text(node));
            }
            for (name, value) in node.attributes() {
                if !IGNORED_ATTRIBUTES.contains(&name.as_str()) && value.trim() == needle {
                    found.push(HtmlMatch::Attribute { node, name });
                }
            }
        }
        ::log::debug!("find_all({needle:?}) found {} matches", found.len());
        found
    }
}

impl PartialEq for Page {
    /// Pages compare by content; identity lives in [`Page::serial`].
    fn eq(&self, other: &Self) -> bool {
        self.html() == other.html()
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("serial", &self.serial)
            .field("nodes", &self.order.len())
            .finish()
    }
}

/// Pre-order index of every node below (and including) `root`.
fn index_document_order(root: NodeRef<'_>) -> HashMap<NodeId, usize> {
    let mut order = HashMap::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        order.insert(node.id, order.len());
        let mut children = Vec::new();
        let mut child = node.first_child();
        while let Some(c) = child {
            child = c.next_sibling();
            children.push(c);
        }
        stack.extend(children.into_iter().rev());
    }
    order
}

/// A node inside a [`Page`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    page: &'a Page,
    inner: NodeRef<'a>,
}

impl<'a> Node<'a> {
    /// The page this node belongs to.
    #[inline]
    #[must_use]
    pub fn page(&self) -> &'a Page {
        self.page
    }

    /// Whether this node is an element (the document node is not).
    #[inline]
    #[must_use]
    pub fn is_element(&self) -> bool {
        self.inner.is_element()
    }

    /// Position in document order; the document node is `0`.
    #[must_use]
    pub fn position(&self) -> usize {
        self.page.order.get(&self.inner.id).copied().unwrap_or(usize::MAX)
    }

    /// Lowercase tag name, empty for non-elements.
    #[must_use]
    pub fn tag_name(&self) -> String {
        self.inner
            .node_name()
            .filter(|_| self.is_element())
            .map(|t| t.to_string())
            .unwrap_or_default()
    }

    /// All attributes as name/value pairs, in source order.
    #[must_use]
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.inner
            .attrs()
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect()
    }

    /// Value of one attribute, `None` if absent.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        self.inner
            .attrs()
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| attr.value.to_string())
    }

    /// Non-empty `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.attr("id")
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    /// Class names in source order, without duplicates.
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        for class in self.attr("class").unwrap_or_default().split_whitespace() {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }
        classes
    }

    /// Normalized text content of the node and its descendants.
    #[must_use]
    pub fn text(&self) -> String {
        normalize_text(&self.inner.text())
    }

    /// Parent element. The `<html>` element and the document node have none.
    #[must_use]
    pub fn parent(&self) -> Option<Node<'a>> {
        self.inner
            .parent()
            .filter(NodeRef::is_element)
            .map(|inner| self.with(inner))
    }

    /// Ancestor elements, nearest first.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Node<'a>> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            ancestors.push(node);
            current = node.parent();
        }
        ancestors
    }

    /// Child elements in document order.
    #[must_use]
    pub fn children(&self) -> Vec<Node<'a>> {
        let mut children = Vec::new();
        let mut child = self.inner.first_child();
        while let Some(c) = child {
            if c.is_element() {
                children.push(self.with(c));
            }
            child = c.next_sibling();
        }
        children
    }

    /// Descendant elements in document order, excluding this node.
    #[must_use]
    pub fn descendants(&self) -> Vec<Node<'a>> {
        let mut descendants = Vec::new();
        let mut stack: Vec<Node<'a>> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            descendants.push(node);
            stack.extend(node.children().into_iter().rev());
        }
        descendants
    }

    /// 1-based index among element siblings with the same tag name.
    #[must_use]
    pub fn nth_of_type(&self) -> usize {
        let tag = self.tag_name();
        let mut n = 1;
        let mut sibling = self.inner.prev_sibling();
        while let Some(s) = sibling {
            if s.is_element() && self.with(s).tag_name() == tag {
                n += 1;
            }
            sibling = s.prev_sibling();
        }
        n
    }

    /// Whether this node is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Node<'_>) -> bool {
        if self.page.serial != other.page.serial {
            return false;
        }
        let mut current = other.inner.parent();
        while let Some(node) = current {
            if node.id == self.inner.id {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Descendants matching `css`, in document order without duplicates.
    ///
    /// The selector is matched against the full tree, so ancestor parts of
    /// the selector may match above this node; only the selected nodes
    /// themselves are restricted to descendants.
    pub fn select(&self, css: &str) -> Result<Vec<Node<'a>>> {
        let matcher = Matcher::new(css).map_err(|_| Error::InvalidSelector(css.to_string()))?;
        let selection = Selection::from(self.inner).select_matcher(&matcher);

        let mut nodes: Vec<Node<'a>> = selection.nodes().iter().map(|n| self.with(*n)).collect();
        nodes.sort_by_key(Node::position);
        nodes.dedup();
        Ok(nodes)
    }

    fn with(&self, inner: NodeRef<'a>) -> Node<'a> {
        Node {
            page: self.page,
            inner,
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.page.serial == other.page.serial && self.inner.id == other.inner.id
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.page.serial.hash(state);
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_element() {
            return write!(f, "<#document page={}>", self.page.serial);
        }
        write!(f, "<{}", self.tag_name())?;
        if let Some(id) = self.id() {
            write!(f, "#{id}")?;
        }
        for class in self.classes() {
            write!(f, ".{class}")?;
        }
        write!(f, " page={} pos={}>", self.page.serial, self.position())
    }
}

/// An occurrence of a literal value on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlMatch<'a> {
    /// The value occurs in the element's text.
    Text(Node<'a>),
    /// The value is the content of one of the element's attributes.
    Attribute {
        /// Element carrying the attribute.
        node: Node<'a>,
        /// Attribute name.
        name: String,
    },
}

impl<'a> HtmlMatch<'a> {
    /// The element the value was found on.
    #[must_use]
    pub fn node(&self) -> Node<'a> {
        match self {
            HtmlMatch::Text(node) | HtmlMatch::Attribute { node, .. } => *node,
        }
    }
}
