use std::time::Instant;

use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::theme::{self, ThemeColors};
use crate::tree::rows::{RowKind, VisibleRow};
use crate::tree::{
    ChildLoader, DropDestination, DropPosition, EditState, Expansion, LoadOutcome, NodeId, Nodes,
    OwnedStore, TreeController,
};

/// The kind of dialog being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    DeleteConfirm { id: NodeId, prompt: String },
    Error { message: String },
}

/// Application mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    Dialog(DialogKind),
}

/// Transient status bar text.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

/// Main application state.
pub struct App {
    pub controller: TreeController<OwnedStore>,
    pub rows: Vec<VisibleRow>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub mode: AppMode,
    /// Placement used for drop hints while dragging.
    pub drop_position: DropPosition,
    /// Inner area of the tree panel from the last draw, for mouse hit-testing.
    pub tree_area: Rect,
    pub status_message: Option<StatusMessage>,
    pub confirm_delete: bool,
    pub theme: ThemeColors,
    pub should_quit: bool,
    pressed: Option<NodeId>,
}

impl App {
    pub fn new(
        forest: Nodes,
        loader: impl ChildLoader + 'static,
        load_tx: mpsc::UnboundedSender<LoadOutcome>,
        config: &AppConfig,
    ) -> Self {
        let controller =
            TreeController::new(OwnedStore::new(forest), load_tx).with_loader(loader);
        let mut app = Self {
            controller,
            rows: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            mode: AppMode::Normal,
            drop_position: DropPosition::Inside,
            tree_area: Rect::default(),
            status_message: None,
            confirm_delete: config.confirm_delete(),
            theme: theme::resolve_theme(config.theme_scheme()),
            should_quit: false,
            pressed: None,
        };
        app.refresh();
        app
    }

    /// Re-flatten after any controller change and keep the selection in range.
    pub fn refresh(&mut self) {
        self.rows = self.controller.visible_rows();
        if self.selected_index >= self.rows.len() {
            self.selected_index = self.rows.len().saturating_sub(1);
        }
    }

    pub fn selected_row(&self) -> Option<&VisibleRow> {
        self.rows.get(self.selected_index)
    }

    /// Id of the selected node; placeholder rows have none.
    pub fn selected_id(&self) -> Option<NodeId> {
        self.selected_row().and_then(|r| r.node_id().cloned())
    }

    pub fn select_id(&mut self, id: &NodeId) {
        if let Some(i) = self.rows.iter().position(|r| r.node_id() == Some(id)) {
            self.selected_index = i;
        }
    }

    /// Keep the selected row, and an add-child draft below it, inside a
    /// viewport of `visible_height` rows.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        let bottom = self
            .rows
            .iter()
            .position(|r| r.kind == RowKind::AddChild)
            .filter(|&i| i > self.selected_index)
            .unwrap_or(self.selected_index);
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if bottom >= self.scroll_offset + visible_height {
            self.scroll_offset = (bottom + 1 - visible_height).min(self.selected_index);
        }
    }

    /// Lines drawn below the rows: the root-list drop marker and the root draft.
    pub fn trailing_lines(&self) -> usize {
        let marker = matches!(
            self.controller.drop_hint(),
            Some(DropDestination::List { parent: None })
        );
        usize::from(marker) + usize::from(self.controller.root_draft().is_some())
    }

    // ── Status line ──────────────────────────────────────────────────────

    pub fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: msg.into(),
            is_error: false,
            created: Instant::now(),
        });
    }

    pub fn set_error_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: msg.into(),
            is_error: true,
            created: Instant::now(),
        });
    }

    /// Clear the status message if it has been displayed for more than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some(msg) = &self.status_message {
            if msg.created.elapsed().as_secs() >= 3 {
                self.status_message = None;
            }
        }
    }

    // ── Dialogs ──────────────────────────────────────────────────────────

    pub fn open_dialog(&mut self, kind: DialogKind) {
        self.mode = AppMode::Dialog(kind);
    }

    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ── Navigation ───────────────────────────────────────────────────────

    pub fn select_next(&mut self) {
        let len = self.rows.len();
        if len > 0 && self.selected_index < len - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.rows.len().saturating_sub(1);
    }

    // ── Expansion ────────────────────────────────────────────────────────

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            let outcome = self.controller.toggle_expand(id.as_str());
            if outcome == Expansion::LoadStarted {
                tracing::debug!(node = %id, "load requested from ui");
            }
            self.refresh();
        }
    }

    /// Expand a collapsed node, or step into the first child of an expanded one.
    pub fn expand_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.controller.is_expanded(id.as_str()) {
            if self
                .rows
                .get(self.selected_index + 1)
                .is_some_and(|r| r.parent_id.as_ref() == Some(&id))
            {
                self.selected_index += 1;
            }
        } else {
            self.controller.expand(id.as_str());
            self.refresh();
        }
    }

    /// Collapse an expanded node, or jump to the parent otherwise.
    pub fn collapse_selected(&mut self) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };
        if let Some(id) = row.node_id() {
            if self.controller.collapse(id.as_str()) {
                self.refresh();
                return;
            }
        }
        if let Some(parent) = &row.parent_id {
            self.select_id(parent);
        }
    }

    // ── Drafts ───────────────────────────────────────────────────────────

    pub fn is_editing(&self) -> bool {
        self.controller.root_draft().is_some()
            || !matches!(self.controller.edit_state(), EditState::Viewing)
    }

    pub fn start_rename(&mut self) {
        if let Some(id) = self.selected_id() {
            self.controller.start_rename(id.as_str());
        }
    }

    pub fn begin_add_child(&mut self) {
        if let Some(id) = self.selected_id() {
            if self.controller.begin_add_child(id.as_str()) {
                self.refresh();
            }
        }
    }

    pub fn begin_add_root(&mut self) {
        self.controller.begin_add_root();
        self.refresh();
    }

    /// Commit whichever draft is open.
    pub fn commit_draft(&mut self) {
        let created = if self.controller.root_draft().is_some() {
            self.controller.commit_add_root()
        } else {
            match self.controller.edit_state() {
                EditState::Renaming { .. } => {
                    self.controller.commit_rename();
                    None
                }
                EditState::AddingChild { .. } => self.controller.commit_add_child(),
                EditState::Viewing => None,
            }
        };
        self.refresh();
        if let Some(id) = created {
            self.select_id(&id);
        }
    }

    pub fn cancel_draft(&mut self) {
        self.controller.cancel_add_root();
        self.controller.cancel_rename();
        self.controller.cancel_add_child();
        self.refresh();
    }

    // ── Removal ──────────────────────────────────────────────────────────

    /// Delete the selected node, asking first when configured to.
    pub fn request_delete(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.confirm_delete {
            let prompt = self.controller.removal_prompt(id.as_str());
            self.open_dialog(DialogKind::DeleteConfirm { id, prompt });
        } else {
            self.delete(&id);
        }
    }

    /// Answer the open delete dialog.
    pub fn answer_delete(&mut self, yes: bool) {
        let AppMode::Dialog(DialogKind::DeleteConfirm { id, .. }) = &self.mode else {
            return;
        };
        let id = id.clone();
        self.close_dialog();
        if yes {
            self.delete(&id);
        }
    }

    fn delete(&mut self, id: &NodeId) {
        let name = self
            .controller
            .find(id.as_str())
            .map(|n| n.name.clone())
            .unwrap_or_default();
        if self.controller.remove(id.as_str(), |_: &str| true) {
            self.set_status_message(format!("Deleted \"{name}\""));
        }
        self.refresh();
    }

    // ── Drag and drop ────────────────────────────────────────────────────

    pub fn is_dragging(&self) -> bool {
        self.controller.dragging().is_some()
    }

    /// Grab the selected node for a keyboard move.
    pub fn grab_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            if self.controller.begin_drag(id.as_str()) {
                self.drop_position = DropPosition::Inside;
                self.set_status_message("Move: j/k pick target, Tab position, 0 root, Enter drop");
            }
        }
    }

    /// Point the hint at the selected row with the current drop position.
    pub fn hint_selected(&mut self) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };
        self.hint_row(&row);
    }

    fn hint_row(&mut self, row: &VisibleRow) {
        match &row.kind {
            RowKind::Node { id, .. } => {
                if self.controller.dragging() == Some(id) {
                    self.controller.clear_drop_hint();
                } else {
                    self.controller
                        .update_drop_hint(id.as_str(), self.drop_position.fraction());
                }
            }
            RowKind::Loading | RowKind::AddChild => {
                self.controller.update_list_hint(row.parent_id.as_ref().map(NodeId::as_str));
            }
        }
    }

    pub fn cycle_drop_position(&mut self) {
        self.drop_position = self.drop_position.next();
        if matches!(
            self.controller.drop_hint(),
            Some(DropDestination::Node { .. })
        ) {
            self.hint_selected();
        }
    }

    pub fn target_root_list(&mut self) {
        self.controller.update_list_hint(None);
    }

    pub fn drop_grabbed(&mut self) {
        let dragged = self.controller.dragging().cloned();
        let moved = self.controller.drop_on_hint();
        self.refresh();
        match dragged {
            Some(id) if moved => {
                self.select_id(&id);
                self.set_status_message("Moved");
            }
            Some(_) => self.set_status_message("Nothing moved"),
            None => {}
        }
    }

    pub fn cancel_grab(&mut self) {
        self.controller.end_drag();
        self.status_message = None;
    }

    // ── Mouse ────────────────────────────────────────────────────────────

    /// Row index under a screen position, if it lies on a row.
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        if !self.area_contains(column, row) {
            return None;
        }
        let index = self.scroll_offset + usize::from(row - self.tree_area.y);
        (index < self.rows.len()).then_some(index)
    }

    fn area_contains(&self, column: u16, row: u16) -> bool {
        let a = self.tree_area;
        column >= a.x && column < a.x + a.width && row >= a.y && row < a.y + a.height
    }

    pub fn mouse_down(&mut self, column: u16, row: u16) {
        self.pressed = None;
        if let Some(index) = self.row_at(column, row) {
            self.selected_index = index;
            self.pressed = self.rows[index].node_id().cloned();
        }
    }

    pub fn mouse_drag(&mut self, column: u16, row: u16) {
        if !self.is_dragging() {
            let Some(id) = self.pressed.take() else {
                return;
            };
            if !self.controller.begin_drag(id.as_str()) {
                return;
            }
            self.drop_position = DropPosition::Inside;
        }

        if let Some(index) = self.row_at(column, row) {
            self.selected_index = index;
            let target = self.rows[index].clone();
            self.hint_row(&target);
        } else if self.area_contains(column, row) {
            self.target_root_list();
        } else {
            self.controller.clear_drop_hint();
        }
    }

    pub fn mouse_up(&mut self) {
        self.pressed = None;
        if self.is_dragging() {
            self.drop_grabbed();
        }
    }

    // ── Loads ────────────────────────────────────────────────────────────

    pub fn handle_children_loaded(&mut self, outcome: LoadOutcome) {
        if let Err(e) = self.controller.apply_load(outcome) {
            if self.mode == AppMode::Normal {
                self.open_dialog(DialogKind::Error {
                    message: e.to_string(),
                });
            } else {
                self.set_error_status(e.to_string());
            }
        }
        self.refresh();
    }
}
