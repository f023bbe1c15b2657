//! Pure structural operations over a forest.
//!
//! Every function takes the current forest and returns a new one. Only the
//! path from an edited level up to the roots is rebuilt; every other subtree
//! is shared by `Arc`, so an edit that matched nothing hands back the input
//! `Arc` itself and callers can detect no-ops with `Arc::ptr_eq`.
//!
//! Traversal uses an explicit work stack, so very deep trees do not grow the
//! call stack.

use std::collections::HashSet;
use std::sync::Arc;

use super::node::{DropDestination, DropPosition, NodeId, NodeRef, Nodes, TreeNode};

/// Location of a node among its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentInfo {
    /// `None` when the node is a root.
    pub parent_id: Option<NodeId>,
    pub index: usize,
}

/// Result of detaching a subtree.
#[derive(Debug, Clone)]
pub struct Removal {
    pub forest: Nodes,
    pub removed: Option<NodeRef>,
}

/// Index path from the root list down to `id`, in depth-first order.
pub fn locate(forest: &[NodeRef], id: &str) -> Option<Vec<usize>> {
    let mut stack: Vec<(&[NodeRef], usize)> = vec![(forest, 0)];
    while let Some(top) = stack.last_mut() {
        let (level, cursor) = *top;
        if cursor >= level.len() {
            stack.pop();
            continue;
        }
        top.1 += 1;
        let node = &level[cursor];
        if node.id == id {
            // Every cursor already points one past the node on the path.
            return Some(stack.iter().map(|(_, c)| c - 1).collect());
        }
        let children = node.child_slice();
        if !children.is_empty() {
            stack.push((children, 0));
        }
    }
    None
}

fn node_at<'a>(forest: &'a [NodeRef], path: &[usize]) -> Option<&'a NodeRef> {
    let (&last, ancestors) = path.split_last()?;
    let mut level = forest;
    for &i in ancestors {
        level = level.get(i)?.child_slice();
    }
    level.get(last)
}

/// First node with `id` in depth-first order.
pub fn find<'a>(forest: &'a [NodeRef], id: &str) -> Option<&'a NodeRef> {
    locate(forest, id).and_then(|path| node_at(forest, &path))
}

/// Whether `id` is `root` itself or anywhere below it.
pub fn contains(root: &TreeNode, id: &str) -> bool {
    if root.id == id {
        return true;
    }
    let mut stack: Vec<&NodeRef> = root.child_slice().iter().collect();
    while let Some(node) = stack.pop() {
        if node.id == id {
            return true;
        }
        stack.extend(node.child_slice());
    }
    false
}

/// Immediate parent and sibling index of `id`.
pub fn find_parent_info(forest: &[NodeRef], id: &str) -> Option<ParentInfo> {
    let path = locate(forest, id)?;
    let (&index, ancestors) = path.split_last()?;
    let parent_id = if ancestors.is_empty() {
        None
    } else {
        Some(node_at(forest, ancestors)?.id.clone())
    };
    Some(ParentInfo { parent_id, index })
}

/// The root list for `None`, otherwise the parent's children (empty when absent or unset).
pub fn children_of<'a>(forest: &'a [NodeRef], parent_id: Option<&str>) -> &'a [NodeRef] {
    match parent_id {
        None => forest,
        Some(id) => find(forest, id).map(|p| p.child_slice()).unwrap_or(&[]),
    }
}

/// Rebuild the ancestors along `path`, letting `edit` rewrite the level
/// that holds the last index.
fn rebuild_path<F>(forest: &Nodes, path: &[usize], edit: F) -> Option<Nodes>
where
    F: FnOnce(&mut Vec<NodeRef>, usize),
{
    let (&last, ancestors) = path.split_last()?;

    let mut levels: Vec<&Nodes> = Vec::with_capacity(path.len());
    let mut level = forest;
    levels.push(level);
    for &i in ancestors {
        level = level.get(i)?.children.as_ref()?;
        levels.push(level);
    }

    let mut current: Vec<NodeRef> = level.to_vec();
    edit(&mut current, last);

    for (depth, &i) in ancestors.iter().enumerate().rev() {
        let parent_level = levels[depth];
        let mut parent = TreeNode::clone(&parent_level[i]);
        parent.children = Some(Nodes::from(current));
        let mut next = parent_level.to_vec();
        next[i] = Arc::new(parent);
        current = next;
    }
    Some(Nodes::from(current))
}

/// Replace the node `id` with `transform(node)`.
///
/// Returns the input forest itself when `id` is absent.
pub fn update<F>(forest: &Nodes, id: &str, transform: F) -> Nodes
where
    F: FnOnce(&TreeNode) -> TreeNode,
{
    let Some(path) = locate(forest, id) else {
        return forest.clone();
    };
    rebuild_path(forest, &path, |level, i| {
        let next = Arc::new(transform(&level[i]));
        level[i] = next;
    })
    .unwrap_or_else(|| forest.clone())
}

/// Detach `id` and its subtree.
pub fn remove(forest: &Nodes, id: &str) -> Removal {
    let unchanged = || Removal {
        forest: forest.clone(),
        removed: None,
    };
    let Some(path) = locate(forest, id) else {
        return unchanged();
    };
    let mut removed = None;
    match rebuild_path(forest, &path, |level, i| removed = Some(level.remove(i))) {
        Some(next) => Removal {
            forest: next,
            removed,
        },
        None => unchanged(),
    }
}

/// Insert `subtree` under `parent_id` (or at root level) at `index`, clamped to `[0, len]`.
///
/// A parent that receives a child stops being lazy. Returns the input forest
/// when the parent does not exist.
pub fn insert_at(forest: &Nodes, subtree: NodeRef, parent_id: Option<&str>, index: usize) -> Nodes {
    match parent_id {
        None => {
            let mut next = forest.to_vec();
            let at = index.min(next.len());
            next.insert(at, subtree);
            Nodes::from(next)
        }
        Some(pid) => update(forest, pid, |parent| {
            let mut children = parent.child_slice().to_vec();
            let at = index.min(children.len());
            children.insert(at, subtree);
            TreeNode {
                lazy: false,
                children: Some(Nodes::from(children)),
                ..parent.clone()
            }
        }),
    }
}

/// Move `dragged_id` to `dest`.
///
/// Returns the input forest unchanged when the dragged node is missing, the
/// destination lies inside the dragged subtree, the destination's anchor
/// no longer exists once the subtree is detached, or the node would land
/// exactly where it already is.
pub fn move_node(forest: &Nodes, dragged_id: &str, dest: &DropDestination) -> Nodes {
    let Some(origin) = find_parent_info(forest, dragged_id) else {
        return forest.clone();
    };
    let Removal {
        forest: without,
        removed,
    } = remove(forest, dragged_id);
    let Some(dragged) = removed else {
        return forest.clone();
    };

    if let Some(anchor) = dest.reference() {
        if contains(&dragged, anchor.as_str()) {
            return forest.clone();
        }
    }

    let (parent_id, index): (Option<NodeId>, usize) = match dest {
        DropDestination::List { parent } => {
            let pid = parent.as_ref().map(NodeId::as_str);
            if pid.is_some_and(|p| find(&without, p).is_none()) {
                return forest.clone();
            }
            (parent.clone(), children_of(&without, pid).len())
        }
        DropDestination::Node { target, position } => {
            let Some(info) = find_parent_info(&without, target.as_str()) else {
                return forest.clone();
            };
            match position {
                DropPosition::Inside => {
                    let len = children_of(&without, Some(target.as_str())).len();
                    (Some(target.clone()), len)
                }
                DropPosition::Before | DropPosition::After => {
                    let parent = info.parent_id.as_ref().map(NodeId::as_str);
                    let at = info.index.min(children_of(&without, parent).len());
                    let at = match position {
                        DropPosition::After => at + 1,
                        _ => at,
                    };
                    (info.parent_id, at)
                }
            }
        }
    };
    let parent = parent_id.as_ref().map(NodeId::as_str);
    let index = index.min(children_of(&without, parent).len());
    if parent_id == origin.parent_id && index == origin.index {
        return forest.clone();
    }
    insert_at(&without, dragged, parent, index)
}

/// Every id in the subtree rooted at `node`, including its own.
pub fn collect_ids(node: &TreeNode) -> HashSet<NodeId> {
    let mut ids = HashSet::new();
    ids.insert(node.id.clone());
    let mut stack: Vec<&NodeRef> = node.child_slice().iter().collect();
    while let Some(n) = stack.pop() {
        ids.insert(n.id.clone());
        stack.extend(n.child_slice());
    }
    ids
}

/// Total number of nodes in the forest, descendants included.
pub fn count_nodes(forest: &[NodeRef]) -> usize {
    let mut count = 0;
    let mut stack: Vec<&NodeRef> = forest.iter().collect();
    while let Some(n) = stack.pop() {
        count += 1;
        stack.extend(n.child_slice());
    }
    count
}
