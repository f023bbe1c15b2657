use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Shared handle to a node. Unchanged subtrees are reused by reference across edits.
pub type NodeRef = Arc<TreeNode>;

/// An ordered, shared list of nodes: the forest itself or a node's children.
pub type Nodes = Arc<[NodeRef]>;

/// Opaque, globally unique node identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Allocate a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named node in the forest.
///
/// `children == None` means "not yet known"; together with `lazy == true` it
/// marks a subtree that must be fetched before it is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Nodes>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub lazy: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl TreeNode {
    /// A loaded node with an empty child list.
    pub fn leaf(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self::branch(id, name, Vec::new())
    }

    /// A node whose children will be fetched on first expansion.
    pub fn lazy(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: None,
            lazy: true,
        }
    }

    /// A loaded node with the given children.
    pub fn branch(
        id: impl Into<NodeId>,
        name: impl Into<String>,
        children: impl IntoIterator<Item = TreeNode>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Some(nodes(children)),
            lazy: false,
        }
    }

    /// Whether expanding this node has to go through the child loader.
    pub fn needs_load(&self) -> bool {
        self.lazy && self.children.is_none()
    }

    /// Child slice, empty when unset.
    pub fn child_slice(&self) -> &[NodeRef] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// Build a shared node list from owned nodes.
pub fn nodes(items: impl IntoIterator<Item = TreeNode>) -> Nodes {
    items.into_iter().map(Arc::new).collect()
}

/// Relative placement when dropping onto a node's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
    Inside,
}

impl DropPosition {
    /// Split a row into thirds: top is before, bottom is after, middle is inside.
    ///
    /// `fraction` is the pointer offset from the top of the row divided by its height.
    pub fn from_fraction(fraction: f32) -> Self {
        let y = if fraction.is_nan() {
            0.5
        } else {
            fraction.clamp(0.0, 1.0)
        };
        if y < 1.0 / 3.0 {
            DropPosition::Before
        } else if y > 2.0 / 3.0 {
            DropPosition::After
        } else {
            DropPosition::Inside
        }
    }

    /// Representative pointer fraction for this position.
    pub fn fraction(&self) -> f32 {
        match self {
            DropPosition::Before => 0.0,
            DropPosition::Inside => 0.5,
            DropPosition::After => 1.0,
        }
    }

    /// Cycle before → inside → after → before.
    pub fn next(&self) -> Self {
        match self {
            DropPosition::Before => DropPosition::Inside,
            DropPosition::Inside => DropPosition::After,
            DropPosition::After => DropPosition::Before,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DropPosition::Before => "before",
            DropPosition::After => "after",
            DropPosition::Inside => "inside",
        }
    }
}

/// Where a moved subtree should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropDestination {
    /// Before, after or inside a specific node.
    Node {
        target: NodeId,
        position: DropPosition,
    },
    /// Appended to a parent's child list; `None` is the root list.
    List { parent: Option<NodeId> },
}

impl DropDestination {
    pub fn node(target: impl Into<NodeId>, position: DropPosition) -> Self {
        DropDestination::Node {
            target: target.into(),
            position,
        }
    }

    pub fn list(parent: Option<&str>) -> Self {
        DropDestination::List {
            parent: parent.map(NodeId::from),
        }
    }

    /// The node a destination is anchored to, if any.
    pub fn reference(&self) -> Option<&NodeId> {
        match self {
            DropDestination::Node { target, .. } => Some(target),
            DropDestination::List { parent } => parent.as_ref(),
        }
    }
}
