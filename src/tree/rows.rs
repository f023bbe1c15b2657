use std::collections::HashSet;

use super::node::{NodeId, NodeRef};

/// What a visible row shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Node {
        id: NodeId,
        name: String,
        expanded: bool,
        /// Has children, or may have them once loaded.
        expandable: bool,
    },
    /// Placeholder under a node whose children are being fetched.
    Loading,
    /// Inline draft for a new child of `parent_id`.
    AddChild,
}

/// One line of the flattened, currently visible tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub kind: RowKind,
    pub depth: usize,
    pub parent_id: Option<NodeId>,
    pub is_last_sibling: bool,
}

impl VisibleRow {
    pub fn node_id(&self) -> Option<&NodeId> {
        match &self.kind {
            RowKind::Node { id, .. } => Some(id),
            _ => None,
        }
    }
}

enum Pending<'a> {
    Node {
        node: &'a NodeRef,
        depth: usize,
        parent_id: Option<&'a NodeId>,
        is_last: bool,
    },
    Row(VisibleRow),
}

/// Flatten the expanded part of `forest` in display order.
///
/// A loading node shows a single placeholder instead of its children; the
/// node receiving a new child shows the draft row above its children (or
/// above the placeholder).
pub fn flatten(
    forest: &[NodeRef],
    expanded: &HashSet<NodeId>,
    loading: &HashSet<NodeId>,
    adding_child_to: Option<&NodeId>,
) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    let mut stack: Vec<Pending<'_>> = Vec::new();
    push_level(&mut stack, forest, 0, None);

    while let Some(pending) = stack.pop() {
        let (node, depth, parent_id, is_last) = match pending {
            Pending::Row(row) => {
                rows.push(row);
                continue;
            }
            Pending::Node {
                node,
                depth,
                parent_id,
                is_last,
            } => (node, depth, parent_id, is_last),
        };

        let is_expanded = expanded.contains(&node.id);
        let children = node.child_slice();
        rows.push(VisibleRow {
            kind: RowKind::Node {
                id: node.id.clone(),
                name: node.name.clone(),
                expanded: is_expanded,
                expandable: node.needs_load() || !children.is_empty(),
            },
            depth,
            parent_id: parent_id.cloned(),
            is_last_sibling: is_last,
        });

        if !is_expanded {
            continue;
        }

        let is_loading = loading.contains(&node.id);
        if is_loading {
            stack.push(Pending::Row(VisibleRow {
                kind: RowKind::Loading,
                depth: depth + 1,
                parent_id: Some(node.id.clone()),
                is_last_sibling: true,
            }));
        } else {
            push_level(&mut stack, children, depth + 1, Some(&node.id));
        }
        if adding_child_to == Some(&node.id) {
            stack.push(Pending::Row(VisibleRow {
                kind: RowKind::AddChild,
                depth: depth + 1,
                parent_id: Some(node.id.clone()),
                is_last_sibling: !is_loading && children.is_empty(),
            }));
        }
    }
    rows
}

fn push_level<'a>(
    stack: &mut Vec<Pending<'a>>,
    level: &'a [NodeRef],
    depth: usize,
    parent_id: Option<&'a NodeId>,
) {
    let last = level.len().saturating_sub(1);
    for (i, node) in level.iter().enumerate().rev() {
        stack.push(Pending::Node {
            node,
            depth,
            parent_id,
            is_last: i == last,
        });
    }
}
