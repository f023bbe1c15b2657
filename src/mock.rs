//! Demo data: a small seed forest and a slow, deterministic child loader.

use std::collections::HashSet;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::tree::loader::{ChildLoader, LoadFuture};
use crate::tree::node::{nodes, NodeId, Nodes, TreeNode};

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The forest shown when no `--tree` file is given.
pub fn seed_forest() -> Nodes {
    nodes([
        TreeNode::lazy("A", "A"),
        TreeNode::branch(
            "B",
            "B",
            [
                TreeNode::lazy("C", "C"),
                TreeNode::branch("C-2", "C-2", [TreeNode::leaf("D", "D")]),
            ],
        ),
        TreeNode::lazy("B-2", "B-2"),
    ])
}

/// Loader that pretends to be a remote API.
#[derive(Debug, Clone, Default)]
pub struct MockLoader {
    delay: Duration,
    jitter_ms: u64,
    fail_ids: HashSet<String>,
}

impl MockLoader {
    pub fn new(delay: Duration, jitter_ms: u64) -> Self {
        Self {
            delay,
            jitter_ms,
            fail_ids: HashSet::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Duration::from_millis(config.delay_ms()), config.jitter_ms())
            .failing(config.fail_ids().iter().cloned())
    }

    /// Make loads of these ids fail.
    pub fn failing(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.fail_ids.extend(ids);
        self
    }

    /// Total latency for `id`: the base delay plus a stable share of the jitter.
    fn latency(&self, id: &str) -> Duration {
        if self.jitter_ms == 0 {
            return self.delay;
        }
        let spread = id
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        self.delay + Duration::from_millis(spread % (self.jitter_ms + 1))
    }
}

impl ChildLoader for MockLoader {
    fn load_children(&self, id: &NodeId) -> LoadFuture {
        let latency = self.latency(id.as_str());
        let fails = self.fail_ids.contains(id.as_str());
        let id = id.clone();
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            if fails {
                return Err(AppError::Load {
                    id: id.to_string(),
                    reason: "simulated backend failure".into(),
                });
            }
            Ok(make_children(id.as_str()))
        })
    }
}

/// Child count and depth both derive from the id's bytes.
fn make_children(seed: &str) -> Vec<TreeNode> {
    let bytes = seed.as_bytes();
    let first = bytes.first().copied().unwrap_or(b'N');
    let last = bytes.last().copied().unwrap_or(b'N');
    let count = 2 + usize::from(first % 3);
    let depth = 1 + usize::from(last % 4);
    let initial = char::from(first).to_ascii_uppercase();

    (0..count)
        .map(|i| {
            let letter = char::from(LETTERS[(depth + i) % LETTERS.len()]);
            let name = format!("{initial}-{} Level {letter}", i + 1);
            if depth < 3 && i % 2 == 0 {
                TreeNode::lazy(NodeId::generate(), name)
            } else {
                TreeNode::branch(NodeId::generate(), name, Vec::new())
            }
        })
        .collect()
}
