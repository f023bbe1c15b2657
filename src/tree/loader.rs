use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

use super::node::{NodeId, TreeNode};

/// Boxed future produced by a [`ChildLoader`].
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<Vec<TreeNode>>> + Send + 'static>>;

/// External producer of a lazy node's children.
pub trait ChildLoader: Send + Sync {
    fn load_children(&self, id: &NodeId) -> LoadFuture;
}

impl<F, Fut> ChildLoader for F
where
    F: Fn(NodeId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<TreeNode>>> + Send + 'static,
{
    fn load_children(&self, id: &NodeId) -> LoadFuture {
        Box::pin(self(id.clone()))
    }
}

/// Loader used when none is configured: every lazy node turns out empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLoader;

impl ChildLoader for NoopLoader {
    fn load_children(&self, _id: &NodeId) -> LoadFuture {
        Box::pin(async { Ok(Vec::new()) })
    }
}

/// Completion of a spawned child load, addressed to the node that requested it.
#[derive(Debug)]
pub struct LoadOutcome {
    pub id: NodeId,
    pub result: Result<Vec<TreeNode>>,
}
