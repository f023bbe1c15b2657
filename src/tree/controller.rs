//! Mutable, observable state around the pure forest value.
//!
//! The controller is the single writer of the forest. Every gesture reads the
//! store's current snapshot, runs one pure model operation and proposes the
//! result; unchanged results (same `Arc`) are never proposed. Lazy loads are
//! the only asynchronous step: they are spawned onto the tokio runtime and
//! come back as [`LoadOutcome`] messages that the owner's event loop folds in
//! with [`TreeController::apply_load`].

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{AppError, Result};

use super::draft::DraftInput;
use super::loader::{ChildLoader, LoadOutcome, NoopLoader};
use super::model;
use super::node::{nodes, DropDestination, DropPosition, NodeId, NodeRef, Nodes, TreeNode};
use super::rows::{self, VisibleRow};
use super::store::TreeStore;

/// Per-tree edit state. At most one node is renamed or receives a child at a time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Viewing,
    Renaming { id: NodeId, draft: DraftInput },
    AddingChild { parent: NodeId, draft: DraftInput },
}

/// What a call to [`TreeController::toggle_expand`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    Collapsed,
    Expanded,
    /// Expanded, and a child load was handed to the loader.
    LoadStarted,
}

/// Synchronous yes/no decision taken before a destructive removal.
pub trait ConfirmRemoval {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> ConfirmRemoval for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub struct TreeController<S: TreeStore> {
    store: S,
    loader: Arc<dyn ChildLoader>,
    load_tx: mpsc::UnboundedSender<LoadOutcome>,
    expanded: HashSet<NodeId>,
    loading: HashSet<NodeId>,
    edit: EditState,
    root_draft: Option<DraftInput>,
    dragging: Option<NodeId>,
    drop_hint: Option<DropDestination>,
}

impl<S: TreeStore> TreeController<S> {
    /// Create a controller over `store`. Finished loads are sent to `load_tx`.
    pub fn new(store: S, load_tx: mpsc::UnboundedSender<LoadOutcome>) -> Self {
        Self {
            store,
            loader: Arc::new(NoopLoader),
            load_tx,
            expanded: HashSet::new(),
            loading: HashSet::new(),
            edit: EditState::Viewing,
            root_draft: None,
            dragging: None,
            drop_hint: None,
        }
    }

    pub fn with_loader(mut self, loader: impl ChildLoader + 'static) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    // ── Read access ──────────────────────────────────────────────────────

    pub fn nodes(&self) -> Nodes {
        self.store.snapshot()
    }

    pub fn find(&self, id: &str) -> Option<Arc<TreeNode>> {
        model::find(&self.store.snapshot(), id).cloned()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn is_loading(&self, id: &str) -> bool {
        self.loading.contains(id)
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn root_draft(&self) -> Option<&DraftInput> {
        self.root_draft.as_ref()
    }

    pub fn dragging(&self) -> Option<&NodeId> {
        self.dragging.as_ref()
    }

    pub fn drop_hint(&self) -> Option<&DropDestination> {
        self.drop_hint.as_ref()
    }

    /// The draft currently being typed into, if any. Root drafts take precedence.
    pub fn active_draft_mut(&mut self) -> Option<&mut DraftInput> {
        if let Some(draft) = self.root_draft.as_mut() {
            return Some(draft);
        }
        match &mut self.edit {
            EditState::Viewing => None,
            EditState::Renaming { draft, .. } | EditState::AddingChild { draft, .. } => Some(draft),
        }
    }

    /// Flattened rows for rendering.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let adding_child_to = match &self.edit {
            EditState::AddingChild { parent, .. } => Some(parent),
            _ => None,
        };
        rows::flatten(
            &self.store.snapshot(),
            &self.expanded,
            &self.loading,
            adding_child_to,
        )
    }

    // ── Ownership ────────────────────────────────────────────────────────

    /// Accept the owner's authoritative forest (controlled mode).
    pub fn sync(&mut self, nodes: Nodes) {
        self.store.sync(nodes);
    }

    /// Propose `next` unless it is the current value. Returns whether it was proposed.
    fn publish(&mut self, current: &Nodes, next: Nodes, what: &str) -> bool {
        if Arc::ptr_eq(current, &next) {
            tracing::debug!(edit = what, "no-op edit");
            return false;
        }
        tracing::debug!(edit = what, roots = next.len(), "publishing forest");
        self.store.propose(next);
        true
    }

    // ── Expansion and lazy loading ───────────────────────────────────────

    /// Flip a node's expansion; the first expansion of an unloaded lazy node
    /// spawns its child load. Must be called inside a tokio runtime.
    pub fn toggle_expand(&mut self, id: &str) -> Expansion {
        if self.expanded.remove(id) {
            return Expansion::Collapsed;
        }
        self.expanded.insert(NodeId::from(id));

        let Some(node) = self.find(id) else {
            return Expansion::Expanded;
        };
        if !node.needs_load() || self.loading.contains(id) {
            return Expansion::Expanded;
        }

        self.loading.insert(node.id.clone());
        tracing::info!(node = %node.id, "loading children");

        let loader = self.loader.clone();
        let tx = self.load_tx.clone();
        let node_id = node.id.clone();
        tokio::spawn(async move {
            let result = loader.load_children(&node_id).await;
            let _ = tx.send(LoadOutcome {
                id: node_id,
                result,
            });
        });
        Expansion::LoadStarted
    }

    /// Expand if collapsed.
    pub fn expand(&mut self, id: &str) -> Expansion {
        if self.is_expanded(id) {
            return Expansion::Expanded;
        }
        self.toggle_expand(id)
    }

    /// Collapse if expanded. Returns whether anything changed.
    pub fn collapse(&mut self, id: &str) -> bool {
        self.expanded.remove(id)
    }

    /// Fold a finished load back in.
    ///
    /// The loading flag is cleared whatever happened. Children land on the
    /// requesting node even if it was collapsed meanwhile, ahead of any child
    /// it received while loading; a node deleted in
    /// the meantime makes this a no-op. Failures leave the node lazy so the
    /// next expansion retries, and are handed back to the caller.
    pub fn apply_load(&mut self, outcome: LoadOutcome) -> Result<()> {
        let LoadOutcome { id, result } = outcome;
        self.loading.remove(&id);
        match result {
            Ok(children) => {
                tracing::info!(node = %id, count = children.len(), "children loaded");
                let current = self.store.snapshot();
                let next = model::update(&current, id.as_str(), |n| {
                    // Children added or dropped in while the load ran stay after the loaded ones.
                    let mut merged: Vec<NodeRef> = children.into_iter().map(Arc::new).collect();
                    merged.extend(n.child_slice().iter().cloned());
                    TreeNode {
                        lazy: false,
                        children: Some(Nodes::from(merged)),
                        ..n.clone()
                    }
                });
                self.publish(&current, next, "load");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(node = %id, error = %err, "child load failed");
                Err(match err {
                    AppError::Load { .. } => err,
                    other => AppError::Load {
                        id: id.to_string(),
                        reason: other.to_string(),
                    },
                })
            }
        }
    }

    // ── Rename ───────────────────────────────────────────────────────────

    /// Start renaming `id`, abandoning any other draft without committing it.
    pub fn start_rename(&mut self, id: &str) -> bool {
        let Some(node) = self.find(id) else {
            return false;
        };
        self.edit = EditState::Renaming {
            id: node.id.clone(),
            draft: DraftInput::with_text(node.name.clone()),
        };
        true
    }

    /// Commit the rename draft. Blank names revert silently.
    pub fn commit_rename(&mut self) -> bool {
        let (id, draft) = match std::mem::take(&mut self.edit) {
            EditState::Renaming { id, draft } => (id, draft),
            other => {
                self.edit = other;
                return false;
            }
        };
        let name = draft.trimmed();
        if name.is_empty() {
            tracing::debug!(node = %id, "blank rename discarded");
            return false;
        }
        let current = self.store.snapshot();
        let next = model::update(&current, id.as_str(), |n| TreeNode {
            name: name.to_string(),
            ..n.clone()
        });
        self.publish(&current, next, "rename")
    }

    pub fn cancel_rename(&mut self) {
        if matches!(self.edit, EditState::Renaming { .. }) {
            self.edit = EditState::Viewing;
        }
    }

    // ── Add child / add root ─────────────────────────────────────────────

    /// Open an empty child draft under `parent_id` and expand the parent.
    pub fn begin_add_child(&mut self, parent_id: &str) -> bool {
        let Some(parent) = self.find(parent_id) else {
            return false;
        };
        self.root_draft = None;
        self.expanded.insert(parent.id.clone());
        self.edit = EditState::AddingChild {
            parent: parent.id.clone(),
            draft: DraftInput::default(),
        };
        true
    }

    /// Append the drafted child as the parent's last child. Blank names close the draft.
    pub fn commit_add_child(&mut self) -> Option<NodeId> {
        let (parent, draft) = match std::mem::take(&mut self.edit) {
            EditState::AddingChild { parent, draft } => (parent, draft),
            other => {
                self.edit = other;
                return None;
            }
        };
        let name = draft.trimmed();
        if name.is_empty() {
            return None;
        }

        let child = TreeNode {
            id: NodeId::generate(),
            name: name.to_string(),
            children: Some(nodes(Vec::new())),
            lazy: false,
        };
        let child_id = child.id.clone();
        let current = self.store.snapshot();
        let next = model::update(&current, parent.as_str(), |p| {
            let mut children = p.child_slice().to_vec();
            children.push(Arc::new(child));
            TreeNode {
                lazy: false,
                children: Some(Nodes::from(children)),
                ..p.clone()
            }
        });
        if !self.publish(&current, next, "add-child") {
            return None;
        }
        self.expanded.insert(parent);
        Some(child_id)
    }

    pub fn cancel_add_child(&mut self) {
        if matches!(self.edit, EditState::AddingChild { .. }) {
            self.edit = EditState::Viewing;
        }
    }

    /// Open (or reset) the root draft. An open child draft is abandoned.
    pub fn begin_add_root(&mut self) {
        if matches!(self.edit, EditState::AddingChild { .. }) {
            self.edit = EditState::Viewing;
        }
        self.root_draft = Some(DraftInput::default());
    }

    pub fn commit_add_root(&mut self) -> Option<NodeId> {
        let draft = self.root_draft.take()?;
        self.add_root(draft.trimmed())
    }

    pub fn cancel_add_root(&mut self) {
        self.root_draft = None;
    }

    /// Append a new root named `name` (trimmed). Blank names are ignored.
    pub fn add_root(&mut self, name: &str) -> Option<NodeId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let node = Arc::new(TreeNode {
            id: NodeId::generate(),
            name: name.to_string(),
            children: Some(nodes(Vec::new())),
            lazy: false,
        });
        let id = node.id.clone();
        let current = self.store.snapshot();
        let next = model::insert_at(&current, node, None, current.len());
        self.publish(&current, next, "add-root");
        Some(id)
    }

    // ── Removal ──────────────────────────────────────────────────────────

    /// Question shown before removing `id`.
    pub fn removal_prompt(&self, id: &str) -> String {
        let label = self
            .find(id)
            .map(|n| format!("\"{}\"", n.name))
            .unwrap_or_else(|| "this node".to_string());
        format!("Delete {label} and all its children?")
    }

    /// Remove `id` and its subtree if `confirm` agrees.
    ///
    /// Transient state that referenced any removed id is dropped with it.
    pub fn remove(&mut self, id: &str, mut confirm: impl ConfirmRemoval) -> bool {
        if !confirm.confirm(&self.removal_prompt(id)) {
            return false;
        }

        let current = self.store.snapshot();
        let model::Removal { forest, removed } = model::remove(&current, id);
        let Some(removed) = removed else {
            return false;
        };
        let gone = model::collect_ids(&removed);

        self.expanded.retain(|n| !gone.contains(n));
        self.loading.retain(|n| !gone.contains(n));
        let edit_gone = match &self.edit {
            EditState::Renaming { id, .. } => gone.contains(id),
            EditState::AddingChild { parent, .. } => gone.contains(parent),
            EditState::Viewing => false,
        };
        if edit_gone {
            self.edit = EditState::Viewing;
        }
        if self.dragging.as_ref().is_some_and(|d| gone.contains(d)) {
            self.clear_drag();
        }

        self.publish(&current, forest, "remove")
    }

    // ── Drag and drop ────────────────────────────────────────────────────

    pub fn begin_drag(&mut self, id: &str) -> bool {
        let Some(node) = self.find(id) else {
            return false;
        };
        self.dragging = Some(node.id.clone());
        self.drop_hint = None;
        true
    }

    /// Hover over a node's row; `fraction` is the pointer's offset within the row.
    pub fn update_drop_hint(&mut self, target: &str, fraction: f32) {
        if self.dragging.is_none() || self.dragging.as_ref().is_some_and(|d| d == target) {
            return;
        }
        self.drop_hint = Some(DropDestination::node(
            target,
            DropPosition::from_fraction(fraction),
        ));
    }

    /// Hover over empty space in `parent`'s child list (`None` = root list).
    pub fn update_list_hint(&mut self, parent: Option<&str>) {
        if self.dragging.is_none() {
            return;
        }
        self.drop_hint = Some(DropDestination::list(parent));
    }

    /// Forget the hint but keep dragging.
    pub fn clear_drop_hint(&mut self) {
        self.drop_hint = None;
    }

    /// Abandon the gesture.
    pub fn end_drag(&mut self) {
        self.clear_drag();
    }

    fn clear_drag(&mut self) {
        self.dragging = None;
        self.drop_hint = None;
    }

    /// Drop the dragged node at `dest`. Drag state is cleared either way.
    pub fn drop(&mut self, dest: DropDestination) -> bool {
        let dragged = self.dragging.take();
        self.drop_hint = None;
        let Some(dragged) = dragged else {
            return false;
        };
        if dest.reference().is_some_and(|r| *r == dragged) {
            return false;
        }
        self.move_node(dragged.as_str(), &dest)
    }

    /// Drop onto the current hint.
    pub fn drop_on_hint(&mut self) -> bool {
        match self.drop_hint.clone() {
            Some(dest) => self.drop(dest),
            None => {
                self.clear_drag();
                false
            }
        }
    }

    /// Programmatic move; same rules as a drop.
    pub fn move_node(&mut self, id: &str, dest: &DropDestination) -> bool {
        let current = self.store.snapshot();
        let next = model::move_node(&current, id, dest);
        self.publish(&current, next, "move")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::store::{ControlledStore, OwnedStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    type Rx = mpsc::UnboundedReceiver<LoadOutcome>;

    fn controller(forest: Nodes) -> (TreeController<OwnedStore>, Rx) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TreeController::new(OwnedStore::new(forest), tx), rx)
    }

    fn sample() -> Nodes {
        nodes([
            TreeNode::branch("A", "A", [TreeNode::leaf("B", "B"), TreeNode::leaf("C", "C")]),
            TreeNode::lazy("L", "Lazy"),
        ])
    }

    fn child_ids(c: &TreeController<OwnedStore>, parent: &str) -> Vec<String> {
        model::children_of(&c.nodes(), Some(parent))
            .iter()
            .map(|n| n.id.to_string())
            .collect()
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn counting_loader(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn(NodeId) -> std::future::Ready<Result<Vec<TreeNode>>> + Send + Sync {
        move |_id| {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(vec![TreeNode::leaf("X", "X")]))
        }
    }

    // ── Lazy loading ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn expanding_lazy_node_loads_children() {
        let forest = nodes([TreeNode::lazy("A", "A")]);
        let (c, mut rx) = controller(forest);
        let mut c = c.with_loader(|_id: NodeId| async {
            Ok::<_, AppError>(vec![TreeNode::leaf("X", "X")])
        });

        assert_eq!(c.toggle_expand("A"), Expansion::LoadStarted);
        assert!(c.is_loading("A"));

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.id, "A");
        c.apply_load(outcome).unwrap();

        assert!(!c.is_loading("A"));
        let a = c.find("A").unwrap();
        assert!(!a.lazy);
        assert_eq!(child_ids(&c, "A"), vec!["X"]);
    }

    #[tokio::test]
    async fn loader_runs_once_across_toggles_while_in_flight() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let (c, mut rx) = controller(sample());
        let loader_calls = calls.clone();
        let loader_gate = gate.clone();
        let mut c = c.with_loader(move |_id: NodeId| {
            loader_calls.fetch_add(1, Ordering::SeqCst);
            let gate = loader_gate.clone();
            async move {
                gate.notified().await;
                Ok::<_, AppError>(vec![TreeNode::leaf("X", "X")])
            }
        });

        assert_eq!(c.toggle_expand("L"), Expansion::LoadStarted);
        assert_eq!(c.toggle_expand("L"), Expansion::Collapsed);
        assert_eq!(c.toggle_expand("L"), Expansion::Expanded);
        assert_eq!(c.toggle_expand("L"), Expansion::Collapsed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        let outcome = rx.recv().await.unwrap();
        c.apply_load(outcome).unwrap();

        // Applied although collapsed; flag cleared regardless of expansion.
        assert!(!c.is_expanded("L"));
        assert!(!c.is_loading("L"));
        assert_eq!(child_ids(&c, "L"), vec!["X"]);

        assert_eq!(c.toggle_expand("L"), Expansion::Expanded);
        assert_eq!(c.toggle_expand("L"), Expansion::Collapsed);
        assert_eq!(c.toggle_expand("L"), Expansion::Expanded);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loaded_node_never_loads_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (c, mut rx) = controller(sample());
        let mut c = c.with_loader(counting_loader(calls.clone()));

        c.toggle_expand("L");
        let outcome = rx.recv().await.unwrap();
        c.apply_load(outcome).unwrap();
        for _ in 0..4 {
            c.toggle_expand("L");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_lazy_node_does_not_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (c, _rx) = controller(sample());
        let mut c = c.with_loader(counting_loader(calls.clone()));
        assert_eq!(c.toggle_expand("A"), Expansion::Expanded);
        assert!(c.is_expanded("A"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_load_leaves_node_lazy_for_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (c, mut rx) = controller(sample());
        let counter = calls.clone();
        let mut c = c.with_loader(move |id: NodeId| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(AppError::Load {
                        id: id.to_string(),
                        reason: "offline".into(),
                    })
                } else {
                    Ok(vec![TreeNode::leaf("X", "X")])
                }
            }
        });

        c.toggle_expand("L");
        let err = c.apply_load(rx.recv().await.unwrap()).unwrap_err();
        assert!(err.to_string().contains("offline"));
        assert!(!c.is_loading("L"));
        let l = c.find("L").unwrap();
        assert!(l.lazy && l.children.is_none());

        c.toggle_expand("L");
        assert_eq!(c.toggle_expand("L"), Expansion::LoadStarted);
        c.apply_load(rx.recv().await.unwrap()).unwrap();
        assert_eq!(child_ids(&c, "L"), vec!["X"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn load_for_deleted_node_is_noop() {
        let (c, mut rx) = controller(sample());
        let mut c = c.with_loader(counting_loader(Arc::new(AtomicUsize::new(0))));
        c.toggle_expand("L");
        assert!(c.remove("L", yes));
        assert!(!c.is_loading("L"));

        let before = c.nodes();
        c.apply_load(rx.recv().await.unwrap()).unwrap();
        assert!(Arc::ptr_eq(&before, &c.nodes()));
        assert!(c.find("X").is_none());
    }

    #[tokio::test]
    async fn children_added_during_load_survive_it() {
        let gate = Arc::new(Notify::new());
        let (c, mut rx) = controller(sample());
        let loader_gate = gate.clone();
        let mut c = c.with_loader(move |_id: NodeId| {
            let gate = loader_gate.clone();
            async move {
                gate.notified().await;
                Ok::<_, AppError>(vec![TreeNode::leaf("X", "X")])
            }
        });

        c.toggle_expand("L");
        assert!(c.begin_add_child("L"));
        c.active_draft_mut().unwrap().set("Typed");
        let typed = c.commit_add_child().unwrap();
        assert!(c.move_node("C", &DropDestination::node("L", DropPosition::Inside)));

        gate.notify_one();
        c.apply_load(rx.recv().await.unwrap()).unwrap();
        assert_eq!(child_ids(&c, "L"), vec!["X".to_string(), typed.to_string(), "C".to_string()]);
        assert!(!c.find("L").unwrap().lazy);
    }

    #[tokio::test]
    async fn edits_during_load_are_kept() {
        let gate = Arc::new(Notify::new());
        let (c, mut rx) = controller(sample());
        let loader_gate = gate.clone();
        let mut c = c.with_loader(move |_id: NodeId| {
            let gate = loader_gate.clone();
            async move {
                gate.notified().await;
                Ok::<_, AppError>(vec![TreeNode::leaf("X", "X")])
            }
        });

        c.toggle_expand("L");
        assert!(c.move_node("C", &DropDestination::node("B", DropPosition::Before)));
        c.start_rename("B");
        c.active_draft_mut().unwrap().set("Bee");
        assert!(c.commit_rename());

        gate.notify_one();
        c.apply_load(rx.recv().await.unwrap()).unwrap();
        assert_eq!(child_ids(&c, "A"), vec!["C", "B"]);
        assert_eq!(c.find("B").unwrap().name, "Bee");
        assert_eq!(child_ids(&c, "L"), vec!["X"]);
    }

    // ── Rename ───────────────────────────────────────────────────────────

    #[test]
    fn rename_trims_and_commits() {
        let (mut c, _rx) = controller(sample());
        assert!(c.start_rename("B"));
        c.active_draft_mut().unwrap().set("  Beta  ");
        assert!(c.commit_rename());
        assert_eq!(c.find("B").unwrap().name, "Beta");
        assert_eq!(c.edit_state(), &EditState::Viewing);
    }

    #[test]
    fn blank_rename_leaves_name_unchanged() {
        let (mut c, _rx) = controller(sample());
        let before = c.nodes();
        c.start_rename("B");
        c.active_draft_mut().unwrap().set("  ");
        assert!(!c.commit_rename());
        assert_eq!(c.find("B").unwrap().name, "B");
        assert!(Arc::ptr_eq(&before, &c.nodes()));
        assert_eq!(c.edit_state(), &EditState::Viewing);
    }

    #[test]
    fn starting_second_rename_abandons_first() {
        let (mut c, _rx) = controller(sample());
        c.start_rename("B");
        c.active_draft_mut().unwrap().set("changed");
        c.start_rename("C");
        assert!(matches!(c.edit_state(), EditState::Renaming { id, draft } if *id == "C" && draft.text == "C"));
        c.cancel_rename();
        assert_eq!(c.find("B").unwrap().name, "B");
    }

    #[test]
    fn rename_missing_node_is_noop() {
        let (mut c, _rx) = controller(sample());
        assert!(!c.start_rename("nope"));
        assert!(!c.commit_rename());
    }

    #[test]
    fn commit_rename_for_node_removed_meanwhile_is_noop() {
        let (mut c, _rx) = controller(sample());
        c.start_rename("B");
        let removed = model::remove(&c.nodes(), "B").forest;
        c.sync(removed.clone());
        c.active_draft_mut().unwrap().set("x");
        assert!(!c.commit_rename());
        assert!(Arc::ptr_eq(&removed, &c.nodes()));
    }

    // ── Add child / root ─────────────────────────────────────────────────

    #[test]
    fn add_child_appends_and_expands() {
        let (mut c, _rx) = controller(sample());
        assert!(c.begin_add_child("A"));
        assert!(c.is_expanded("A"));
        c.active_draft_mut().unwrap().set("New");
        let id = c.commit_add_child().unwrap();
        let ids = child_ids(&c, "A");
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[2], id.to_string());
        let child = c.find(id.as_str()).unwrap();
        assert_eq!(child.name, "New");
        assert!(!child.lazy);
    }

    #[test]
    fn add_child_to_lazy_node_marks_it_loaded() {
        let (mut c, _rx) = controller(sample());
        c.begin_add_child("L");
        c.active_draft_mut().unwrap().set("kid");
        c.commit_add_child().unwrap();
        let l = c.find("L").unwrap();
        assert!(!l.lazy);
        assert_eq!(l.child_slice().len(), 1);
    }

    #[test]
    fn blank_child_name_closes_draft() {
        let (mut c, _rx) = controller(sample());
        let before = c.nodes();
        c.begin_add_child("A");
        c.active_draft_mut().unwrap().set("   ");
        assert!(c.commit_add_child().is_none());
        assert_eq!(c.edit_state(), &EditState::Viewing);
        assert!(Arc::ptr_eq(&before, &c.nodes()));
    }

    #[test]
    fn add_child_replaces_rename_draft() {
        let (mut c, _rx) = controller(sample());
        c.start_rename("B");
        c.begin_add_child("A");
        assert!(matches!(c.edit_state(), EditState::AddingChild { .. }));
        assert!(!c.commit_rename());
    }

    #[test]
    fn add_root_appends_last() {
        let (mut c, _rx) = controller(sample());
        let id = c.add_root("  Root ").unwrap();
        let roots = c.nodes();
        assert_eq!(roots.len(), 3);
        assert_eq!(roots[2].id, id);
        assert_eq!(roots[2].name, "Root");
        assert!(c.add_root(" ").is_none());
        assert_eq!(c.nodes().len(), 3);
    }

    #[test]
    fn root_draft_discipline() {
        let (mut c, _rx) = controller(sample());
        c.begin_add_child("A");
        c.begin_add_root();
        assert_eq!(c.edit_state(), &EditState::Viewing);
        c.active_draft_mut().unwrap().set("R");
        assert!(c.commit_add_root().is_some());
        assert!(c.root_draft().is_none());

        c.begin_add_root();
        c.active_draft_mut().unwrap().set("  ");
        assert!(c.commit_add_root().is_none());
        assert!(c.root_draft().is_none());
        assert_eq!(c.nodes().len(), 3);

        c.begin_add_root();
        c.cancel_add_root();
        assert!(c.root_draft().is_none());
    }

    // ── Remove ───────────────────────────────────────────────────────────

    #[test]
    fn remove_requires_confirmation() {
        let (mut c, _rx) = controller(sample());
        let mut prompt = String::new();
        assert!(!c.remove("A", |p: &str| {
            prompt = p.to_string();
            false
        }));
        assert_eq!(prompt, "Delete \"A\" and all its children?");
        assert!(c.find("A").is_some());
    }

    #[test]
    fn remove_clears_dangling_state() {
        let (mut c, _rx) = controller(sample());
        c.toggle_expand("A");
        c.start_rename("B");
        assert!(c.remove("A", yes));
        assert!(c.find("A").is_none());
        assert!(c.find("B").is_none());
        assert!(!c.is_expanded("A"));
        assert_eq!(c.edit_state(), &EditState::Viewing);
    }

    #[test]
    fn remove_keeps_unrelated_draft() {
        let (mut c, _rx) = controller(sample());
        c.begin_add_child("A");
        assert!(c.remove("L", yes));
        assert!(matches!(c.edit_state(), EditState::AddingChild { parent, .. } if *parent == "A"));
    }

    #[test]
    fn remove_missing_is_noop() {
        let (mut c, _rx) = controller(sample());
        let before = c.nodes();
        assert!(!c.remove("nope", yes));
        assert!(Arc::ptr_eq(&before, &c.nodes()));
        assert_eq!(c.removal_prompt("nope"), "Delete this node and all its children?");
    }

    // ── Drag and drop ────────────────────────────────────────────────────

    #[test]
    fn drop_after_sibling_reorders() {
        let (mut c, _rx) = controller(sample());
        assert!(c.begin_drag("B"));
        c.update_drop_hint("C", 0.9);
        assert_eq!(
            c.drop_hint(),
            Some(&DropDestination::node("C", DropPosition::After))
        );
        assert!(c.drop_on_hint());
        assert_eq!(child_ids(&c, "A"), vec!["C", "B"]);
        assert!(c.dragging().is_none());
        assert!(c.drop_hint().is_none());
    }

    #[test]
    fn hint_uses_row_thirds() {
        let (mut c, _rx) = controller(sample());
        c.begin_drag("L");
        c.update_drop_hint("A", 0.1);
        assert_eq!(c.drop_hint(), Some(&DropDestination::node("A", DropPosition::Before)));
        c.update_drop_hint("A", 0.5);
        assert_eq!(c.drop_hint(), Some(&DropDestination::node("A", DropPosition::Inside)));
        c.update_list_hint(None);
        assert_eq!(c.drop_hint(), Some(&DropDestination::list(None)));
    }

    #[test]
    fn hovering_dragged_node_sets_no_hint() {
        let (mut c, _rx) = controller(sample());
        c.begin_drag("B");
        c.update_drop_hint("B", 0.5);
        assert!(c.drop_hint().is_none());
    }

    #[test]
    fn drop_onto_self_is_noop_and_clears_drag() {
        let (mut c, _rx) = controller(sample());
        let before = c.nodes();
        c.begin_drag("A");
        assert!(!c.drop(DropDestination::node("A", DropPosition::Inside)));
        assert!(Arc::ptr_eq(&before, &c.nodes()));
        assert!(c.dragging().is_none());
    }

    #[test]
    fn drop_into_descendant_is_rejected() {
        let (mut c, _rx) = controller(sample());
        let before = c.nodes();
        c.begin_drag("A");
        c.update_drop_hint("B", 0.5);
        assert!(!c.drop_on_hint());
        assert!(Arc::ptr_eq(&before, &c.nodes()));
        assert!(c.dragging().is_none());
        assert!(c.drop_hint().is_none());
    }

    #[test]
    fn drop_back_in_place_is_not_published() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut c = TreeController::new(
            OwnedStore::new(sample()).with_observer(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            tx,
        );
        let before = c.nodes();

        c.begin_drag("B");
        assert!(!c.drop(DropDestination::node("C", DropPosition::Before)));
        c.begin_drag("C");
        assert!(!c.drop(DropDestination::node("B", DropPosition::After)));
        c.begin_drag("C");
        assert!(!c.drop(DropDestination::list(Some("A"))));
        c.begin_drag("L");
        assert!(!c.drop(DropDestination::list(None)));

        assert!(Arc::ptr_eq(&before, &c.nodes()));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(c.dragging().is_none());
    }

    #[test]
    fn drop_without_drag_does_nothing() {
        let (mut c, _rx) = controller(sample());
        assert!(!c.drop(DropDestination::list(None)));
        assert!(!c.drop_on_hint());
    }

    #[test]
    fn end_drag_clears_state() {
        let (mut c, _rx) = controller(sample());
        c.begin_drag("B");
        c.update_list_hint(Some("A"));
        c.end_drag();
        assert!(c.dragging().is_none());
        assert!(c.drop_hint().is_none());
        c.update_list_hint(None);
        assert!(c.drop_hint().is_none());
    }

    #[test]
    fn drop_into_list_appends() {
        let (mut c, _rx) = controller(sample());
        c.begin_drag("B");
        assert!(c.drop(DropDestination::list(None)));
        let roots: Vec<String> = c.nodes().iter().map(|n| n.id.to_string()).collect();
        assert_eq!(roots, vec!["A", "L", "B"]);
    }

    // ── Controlled mode ──────────────────────────────────────────────────

    #[test]
    fn controlled_mode_forwards_proposals() {
        let proposed: Arc<Mutex<Vec<Nodes>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = proposed.clone();
        let initial = sample();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut c = TreeController::new(
            ControlledStore::new(initial.clone(), move |n| sink.lock().unwrap().push(n.clone())),
            tx,
        );

        assert!(c.add_root("R").is_some());
        assert!(Arc::ptr_eq(&c.nodes(), &initial));
        let next = proposed.lock().unwrap().pop().unwrap();
        assert_eq!(next.len(), 3);

        c.sync(next.clone());
        assert!(c.move_node("R", &DropDestination::node("A", DropPosition::Before)));
        let moved = proposed.lock().unwrap().pop().unwrap();
        assert_eq!(moved[0].name, "R");
    }

    #[test]
    fn noop_edits_are_not_proposed() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut c = TreeController::new(
            OwnedStore::new(sample()).with_observer(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            tx,
        );
        c.move_node("A", &DropDestination::node("B", DropPosition::Inside));
        c.move_node("nope", &DropDestination::list(None));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        c.move_node("C", &DropDestination::list(None));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn visible_rows_include_add_child_draft() {
        let (mut c, _rx) = controller(sample());
        c.begin_add_child("A");
        let rows = c.visible_rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].kind, rows::RowKind::AddChild);
    }
}
