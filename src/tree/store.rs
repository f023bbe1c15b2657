//! Ownership of the authoritative forest value.
//!
//! The controller only ever reads a snapshot and proposes a successor. An
//! [`OwnedStore`] applies proposals itself; a [`ControlledStore`] forwards them
//! to an external owner, who must hand the accepted value back through
//! [`TreeStore::sync`] before the next gesture.

use std::fmt;

use super::node::Nodes;

pub trait TreeStore {
    /// Current forest as the controller should see it.
    fn snapshot(&self) -> Nodes;

    /// Propose `next` as the new forest.
    fn propose(&mut self, next: Nodes);

    /// Accept an authoritative value from outside.
    fn sync(&mut self, nodes: Nodes);
}

type ChangeFn = Box<dyn FnMut(&Nodes) + Send>;

/// Internally owned forest (uncontrolled mode).
pub struct OwnedStore {
    nodes: Nodes,
    on_change: Option<ChangeFn>,
}

impl OwnedStore {
    pub fn new(nodes: Nodes) -> Self {
        Self {
            nodes,
            on_change: None,
        }
    }

    /// Observe every applied change.
    pub fn with_observer(mut self, on_change: impl FnMut(&Nodes) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }
}

impl Default for OwnedStore {
    fn default() -> Self {
        Self::new(Nodes::from(Vec::new()))
    }
}

impl fmt::Debug for OwnedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedStore")
            .field("roots", &self.nodes.len())
            .finish()
    }
}

impl TreeStore for OwnedStore {
    fn snapshot(&self) -> Nodes {
        self.nodes.clone()
    }

    fn propose(&mut self, next: Nodes) {
        self.nodes = next;
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(&self.nodes);
        }
    }

    fn sync(&mut self, nodes: Nodes) {
        self.nodes = nodes;
    }
}

/// Externally owned forest (controlled mode).
///
/// Proposals go to the owner's setter untouched; the store keeps showing the
/// last value the owner synced.
pub struct ControlledStore {
    current: Nodes,
    on_change: ChangeFn,
}

impl ControlledStore {
    pub fn new(current: Nodes, on_change: impl FnMut(&Nodes) + Send + 'static) -> Self {
        Self {
            current,
            on_change: Box::new(on_change),
        }
    }
}

impl fmt::Debug for ControlledStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlledStore")
            .field("roots", &self.current.len())
            .finish()
    }
}

impl TreeStore for ControlledStore {
    fn snapshot(&self) -> Nodes {
        self.current.clone()
    }

    fn propose(&mut self, next: Nodes) {
        (self.on_change)(&next);
    }

    fn sync(&mut self, nodes: Nodes) {
        self.current = nodes;
    }
}
