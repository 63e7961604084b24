//! Arena-backed HTML document tree.
//!
//! Nodes live in a flat `Vec` and refer to their children by [`NodeId`].
//! Replacing a node allocates a new one and swaps the id in its parent's
//! child list; the old node stays in the arena, unreachable.

mod attrs;

pub use attrs::{AttrKey, Attributes, DataAttr};

use thiserror::Error;

/// Index of a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The document root is always the first node allocated.
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An element: tag name plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in serialization order.
    pub attrs: Attributes,
}

impl Element {
    /// Creates an element with no attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attributes::new(),
        }
    }

    /// Returns true for `h1` through `h6`.
    pub fn is_heading(&self) -> bool {
        heading_level(&self.tag).is_some()
    }
}

/// Level of a heading tag, or `None` for anything else.
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The single document root.
    Root,
    /// An element with children.
    Element(Element),
    /// Text, escaped on output.
    Text(String),
    /// Trusted markup, emitted verbatim.
    Raw(String),
}

/// A node and its ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Node payload.
    pub kind: NodeKind,
    /// Child ids in document order.
    pub children: Vec<NodeId>,
}

/// Structural errors on the arena.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// An id that does not resolve to a node.
    #[error("dangling node reference {0}")]
    DanglingNode(NodeId),
    /// A child index past the end of a child list.
    #[error("node {parent} has no child at index {index}")]
    ChildOutOfRange {
        /// Parent whose child list was indexed.
        parent: NodeId,
        /// Offending index.
        index: usize,
    },
}

/// HTML document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                children: Vec::new(),
            }],
        }
    }

    /// Root id.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of allocated nodes, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the root is allocated on construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates a detached node.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
        });
        id
    }

    /// Allocates a detached element.
    pub fn element(&mut self, tag: &str, attrs: Attributes) -> NodeId {
        self.alloc(NodeKind::Element(Element {
            tag: tag.to_string(),
            attrs,
        }))
    }

    /// Allocates a detached text node.
    pub fn text(&mut self, value: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(value.into()))
    }

    /// Allocates a detached raw markup node.
    pub fn raw(&mut self, value: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Raw(value.into()))
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Looks up a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Looks up a node, failing on a dangling id.
    pub fn get(&self, id: NodeId) -> Result<&Node, DocumentError> {
        self.node(id).ok_or(DocumentError::DanglingNode(id))
    }

    /// Element payload of `id`, if it is an element.
    pub fn as_element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Mutable element payload of `id`, if it is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Children of `id`; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Appends `child` to `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.get(child)?;
        let node = self
            .node_mut(parent)
            .ok_or(DocumentError::DanglingNode(parent))?;
        node.children.push(child);
        Ok(())
    }

    /// Replaces the whole child list of `parent`.
    pub fn set_children(
        &mut self,
        parent: NodeId,
        children: Vec<NodeId>,
    ) -> Result<(), DocumentError> {
        if let Some(missing) = children.iter().find(|id| self.node(**id).is_none()) {
            return Err(DocumentError::DanglingNode(*missing));
        }
        let node = self
            .node_mut(parent)
            .ok_or(DocumentError::DanglingNode(parent))?;
        node.children = children;
        Ok(())
    }

    /// Swaps the child at `index` of `parent` for `replacement`.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        index: usize,
        replacement: NodeId,
    ) -> Result<(), DocumentError> {
        self.get(replacement)?;
        let node = self
            .node_mut(parent)
            .ok_or(DocumentError::DanglingNode(parent))?;
        let slot = node
            .children
            .get_mut(index)
            .ok_or(DocumentError::ChildOutOfRange { parent, index })?;
        *slot = replacement;
        Ok(())
    }

    /// Concatenated text beneath `id`. Raw markup contributes its text with tags removed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut buffer = String::new();
        self.collect_text(id, &mut buffer);
        buffer
    }

    fn collect_text(&self, id: NodeId, buffer: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => buffer.push_str(text),
            NodeKind::Raw(markup) => buffer.push_str(&crate::outline::strip_tags(markup)),
            NodeKind::Root | NodeKind::Element(_) => {
                for child in &node.children {
                    self.collect_text(*child, buffer);
                }
            }
        }
    }

    /// Returns true if any descendant of `id` (excluding `id`) matches.
    pub fn any_descendant(&self, id: NodeId, predicate: &impl Fn(&Node) -> bool) -> bool {
        self.children(id).iter().any(|child| {
            self.node(*child).is_some_and(|node| predicate(node))
                || self.any_descendant(*child, predicate)
        })
    }
}
