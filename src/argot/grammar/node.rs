//! Arena nodes for grammar trees.
//!
//! A grammar owns all of its nodes in one `Vec`; nodes refer to each other by
//! [`NodeId`] handles (plain indices) rather than pointers. Handles stay
//! valid across a clone of the whole arena, which is what makes
//! clone-per-invocation cheap to reason about: a cloned grammar is an
//! identical, fully independent tree whose internal references need no
//! fixing up.

use crate::argot::handler::FieldHandler;

/// Handle to a node within its owning grammar's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// The four node roles of a grammar tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The single entry node; carries no handler
    Root,
    /// Matches exactly one token via its handler
    Normal,
    /// Matches its handler zero or more times, accumulating captures
    Loop,
    /// Terminates one alternative; `branch_id` is unique per grammar
    Leaf { branch_id: String },
}

impl NodeKind {
    /// Whether this kind terminates an alternative
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Leaf { .. })
    }
}

/// One position in a grammar tree
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) handler: Option<FieldHandler>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Committed capture of a Normal node, written only after a unique match
    pub(crate) value: Option<String>,
    /// Committed captures of a Loop node, in match order
    pub(crate) values: Vec<String>,
}

impl Node {
    /// A node matching exactly one token
    pub fn normal(name: impl Into<String>, handler: FieldHandler) -> Self {
        Self::new(name, NodeKind::Normal, Some(handler))
    }

    /// A node matching its handler zero or more times
    pub fn repeating(name: impl Into<String>, handler: FieldHandler) -> Self {
        Self::new(name, NodeKind::Loop, Some(handler))
    }

    pub(crate) fn root() -> Self {
        Self::new("root", NodeKind::Root, None)
    }

    pub(crate) fn leaf(branch_id: impl Into<String>) -> Self {
        let branch_id = branch_id.into();
        Self::new(branch_id.clone(), NodeKind::Leaf { branch_id }, None)
    }

    fn new(name: impl Into<String>, kind: NodeKind, handler: Option<FieldHandler>) -> Self {
        Self {
            name: name.into(),
            kind,
            handler,
            parent: None,
            children: Vec::new(),
            value: None,
            values: Vec::new(),
        }
    }

    /// The node's name (leaf nodes are named by their branch id)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's role in the tree
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Ordered child handles
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The bound handler (`None` for Root/Leaf nodes)
    pub fn handler(&self) -> Option<&FieldHandler> {
        self.handler.as_ref()
    }
}
