//! Arena node tree for structured (contenteditable-like) regions.
//!
//! Nodes live in a flat `Vec` and refer to each other by `NodeId`. Parent
//! links are plain indices, so there are no reference cycles. A node that is
//! spliced out keeps its slot in the arena but loses its parent, which is how
//! stale endpoints are detected as detached.

use std::fmt;
use std::ops::Range;

use smol_str::SmolStr;

/// Tags rendered without a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "wbr"];

/// Tags that establish block-level structure. Inline marks are never
/// inserted above these.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "div",
    "dl",
    "dt",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "li",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

/// Index of a node in a [`Tree`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Tag, classes and attributes of an element, without its children.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementData {
    pub tag: SmolStr,
    pub classes: Vec<SmolStr>,
    pub attrs: Vec<(SmolStr, SmolStr)>,
}

impl ElementData {
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<SmolStr>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Elements the host will not let us split or re-wrap.
    pub fn is_atomic(&self) -> bool {
        self.attr("contenteditable")
            .is_some_and(|v| v.eq_ignore_ascii_case("false"))
    }

    pub fn is_block(&self) -> bool {
        BLOCK_TAGS.iter().any(|t| self.tag.eq_ignore_ascii_case(t))
    }

    pub fn is_void(&self) -> bool {
        VOID_TAGS.iter().any(|t| self.tag.eq_ignore_ascii_case(t))
    }

    fn write_open(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(
                &self.classes.join(" "),
            ));
            out.push('"');
        }
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(value));
            out.push('"');
        }
        out.push('>');
    }

    fn write_close(&self, out: &mut String) {
        if !self.is_void() {
            out.push_str("</");
            out.push_str(&self.tag);
            out.push('>');
        }
    }
}

/// Payload of a tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Text(String),
    Element {
        data: ElementData,
        children: Vec<NodeId>,
    },
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// Owned, detached node. Used to build trees and to carry replacement
/// content from the toggler to the host.
#[derive(Clone, Debug, PartialEq)]
pub enum FragmentNode {
    Text(String),
    Element {
        data: ElementData,
        children: Vec<FragmentNode>,
    },
}

impl FragmentNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn element(data: ElementData, children: Vec<FragmentNode>) -> Self {
        Self::Element { data, children }
    }

    /// Shorthand for an element with only a tag.
    pub fn tag(tag: &str, children: Vec<FragmentNode>) -> Self {
        Self::element(ElementData::new(tag), children)
    }

    pub fn text_len(&self) -> usize {
        match self {
            Self::Text(t) => t.chars().count(),
            Self::Element { children, .. } => children.iter().map(Self::text_len).sum(),
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(t) => out.push_str(&html_escape::encode_text(t)),
            Self::Element { data, children } => {
                data.write_open(out);
                for child in children {
                    child.write_html(out);
                }
                data.write_close(out);
            }
        }
    }
}

/// An ordered list of detached nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fragment(pub Vec<FragmentNode>);

impl Fragment {
    pub fn new(nodes: Vec<FragmentNode>) -> Self {
        Self(nodes)
    }

    pub fn nodes(&self) -> &[FragmentNode] {
        &self.0
    }

    pub fn text_len(&self) -> usize {
        self.0.iter().map(FragmentNode::text_len).sum()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.0 {
            node.write_html(&mut out);
        }
        out
    }
}

/// Arena-backed element tree with a single root element.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Create a tree with an empty root element.
    pub fn new(root: ElementData) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                kind: NodeKind::Element {
                    data: root,
                    children: Vec::new(),
                },
            }],
            root: NodeId(0),
        }
    }

    /// Create a tree whose root holds the given content.
    pub fn from_fragment(root: ElementData, content: Fragment) -> Self {
        let mut tree = Self::new(root);
        let root = tree.root;
        for node in content.0 {
            tree.append(root, node);
        }
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Children of an element. Text nodes and unknown ids have none.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.kind(id) {
            Some(NodeKind::Element { children, .. }) => children,
            _ => &[],
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Text(t)) => Some(t),
            _ => None,
        }
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            Some(NodeKind::Element { data, .. }) => Some(data),
            _ => None,
        }
    }

    /// Whether a node is the root or has an unbroken parent chain to it.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Flattened text length of a node, in chars.
    pub fn text_len(&self, id: NodeId) -> usize {
        match self.kind(id) {
            Some(NodeKind::Text(t)) => t.chars().count(),
            Some(NodeKind::Element { children, .. }) => {
                children.iter().map(|c| self.text_len(*c)).sum()
            }
            None => 0,
        }
    }

    /// Flattened text content of a node.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(t)) => out.push_str(t),
            Some(NodeKind::Element { children, .. }) => {
                for child in children {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    /// Append an owned node under `parent`, returning its id.
    pub fn append(&mut self, parent: NodeId, node: FragmentNode) -> NodeId {
        let id = self.alloc(parent, node);
        if let Some(NodeKind::Element { children, .. }) =
            self.nodes.get_mut(parent.0).map(|n| &mut n.kind)
        {
            children.push(id);
        }
        id
    }

    fn alloc(&mut self, parent: NodeId, node: FragmentNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        match node {
            FragmentNode::Text(text) => self.nodes.push(Node {
                parent: Some(parent),
                kind: NodeKind::Text(text),
            }),
            FragmentNode::Element { data, children } => {
                self.nodes.push(Node {
                    parent: Some(parent),
                    kind: NodeKind::Element {
                        data,
                        children: Vec::new(),
                    },
                });
                let ids: Vec<NodeId> = children
                    .into_iter()
                    .map(|child| self.alloc(id, child))
                    .collect();
                if let NodeKind::Element { children, .. } = &mut self.nodes[id.0].kind {
                    *children = ids;
                }
            }
        }
        id
    }

    /// Replace `parent`'s children in `range` with the fragment's nodes.
    ///
    /// Removed nodes stay in the arena, detached. Returns the ids of the
    /// inserted nodes in order.
    pub fn splice_children(
        &mut self,
        parent: NodeId,
        range: Range<usize>,
        fragment: Fragment,
    ) -> Vec<NodeId> {
        let new_ids: Vec<NodeId> = fragment
            .0
            .into_iter()
            .map(|node| self.alloc(parent, node))
            .collect();

        let removed: Vec<NodeId> = match self.nodes.get_mut(parent.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element { children, .. }) => {
                let end = range.end.min(children.len());
                let start = range.start.min(end);
                children.splice(start..end, new_ids.iter().copied()).collect()
            }
            _ => Vec::new(),
        };
        for id in removed {
            self.nodes[id.0].parent = None;
        }
        new_ids
    }

    /// Owned copy of a node and its descendants.
    pub fn clone_subtree(&self, id: NodeId) -> Option<FragmentNode> {
        match self.kind(id)? {
            NodeKind::Text(t) => Some(FragmentNode::Text(t.clone())),
            NodeKind::Element { data, children } => Some(FragmentNode::Element {
                data: data.clone(),
                children: children
                    .iter()
                    .filter_map(|c| self.clone_subtree(*c))
                    .collect(),
            }),
        }
    }

    /// Serialize the root's content (not the root itself) as HTML.
    pub fn inner_html(&self) -> String {
        let content: Vec<FragmentNode> = self
            .children(self.root)
            .iter()
            .filter_map(|c| self.clone_subtree(*c))
            .collect();
        Fragment(content).to_html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        // <p>Hello <b>bold</b></p><p>two</p>
        Tree::from_fragment(
            ElementData::new("div"),
            Fragment::new(vec![
                FragmentNode::tag(
                    "p",
                    vec![
                        FragmentNode::text("Hello "),
                        FragmentNode::tag("b", vec![FragmentNode::text("bold")]),
                    ],
                ),
                FragmentNode::tag("p", vec![FragmentNode::text("two")]),
            ]),
        )
    }

    #[test]
    fn test_text_len_and_content() {
        let tree = sample();
        assert_eq!(tree.text_len(tree.root()), 13);
        assert_eq!(tree.text_content(tree.root()), "Hello boldtwo");
    }

    #[test]
    fn test_inner_html_escapes() {
        let tree = Tree::from_fragment(
            ElementData::new("div"),
            Fragment::new(vec![FragmentNode::element(
                ElementData::new("a").with_attr("href", "https://x.test/?a=1&b=\"2\""),
                vec![FragmentNode::text("1 < 2")],
            )]),
        );
        insta::assert_snapshot!(
            tree.inner_html(),
            @r#"<a href="https://x.test/?a=1&amp;b=&quot;2&quot;">1 &lt; 2</a>"#
        );
    }

    #[test]
    fn test_splice_detaches_old_children() {
        let mut tree = sample();
        let root = tree.root();
        let old_first = tree.children(root)[0];
        let inserted = tree.splice_children(
            root,
            0..1,
            Fragment::new(vec![FragmentNode::tag("p", vec![FragmentNode::text("hi")])]),
        );
        assert_eq!(inserted.len(), 1);
        assert!(!tree.is_attached(old_first));
        assert!(tree.is_attached(inserted[0]));
        assert_eq!(tree.inner_html(), "<p>hi</p><p>two</p>");
    }

    #[test]
    fn test_element_flags() {
        assert!(ElementData::new("P").is_block());
        assert!(!ElementData::new("span").is_block());
        assert!(ElementData::new("br").is_void());
        assert!(
            ElementData::new("span")
                .with_attr("contenteditable", "false")
                .is_atomic()
        );
    }
}
