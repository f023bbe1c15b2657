use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::theme::ThemeColors;
use crate::tree::draft::DraftInput;
use crate::tree::rows::{RowKind, VisibleRow};
use crate::tree::{DropDestination, EditState, NodeId};

/// Tree widget that renders the visible rows with box-drawing characters,
/// inline drafts and drag feedback.
pub struct TreeWidget<'a> {
    rows: &'a [VisibleRow],
    selected: usize,
    scroll: usize,
    theme: &'a ThemeColors,
    edit: &'a EditState,
    root_draft: Option<&'a DraftInput>,
    dragging: Option<&'a NodeId>,
    drop_hint: Option<&'a DropDestination>,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(rows: &'a [VisibleRow], theme: &'a ThemeColors, edit: &'a EditState) -> Self {
        Self {
            rows,
            selected: 0,
            scroll: 0,
            theme,
            edit,
            root_draft: None,
            dragging: None,
            drop_hint: None,
            block: None,
        }
    }

    pub fn selection(mut self, selected: usize, scroll: usize) -> Self {
        self.selected = selected;
        self.scroll = scroll;
        self
    }

    pub fn root_draft(mut self, draft: Option<&'a DraftInput>) -> Self {
        self.root_draft = draft;
        self
    }

    pub fn drag(mut self, dragging: Option<&'a NodeId>, hint: Option<&'a DropDestination>) -> Self {
        self.dragging = dragging;
        self.drop_hint = hint;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Indentation guides for a row, derived from the rows above it.
    fn build_prefix(row: &VisibleRow, rows: &[VisibleRow], index: usize) -> String {
        if row.depth == 0 {
            return String::new();
        }

        let mut prefix = String::new();
        for d in 1..row.depth {
            // Nearest row above at depth d is this row's ancestor.
            let ancestor_is_last = rows[..index]
                .iter()
                .rev()
                .take_while(|r| r.depth >= d)
                .find(|r| r.depth == d)
                .is_some_and(|r| r.is_last_sibling);
            prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
        }
        prefix.push_str(if row.is_last_sibling { "└──" } else { "├──" });
        prefix
    }

    fn indicator(row: &VisibleRow) -> &'static str {
        match &row.kind {
            RowKind::Node {
                expandable: true,
                expanded: true,
                ..
            } => "▾ ",
            RowKind::Node {
                expandable: true, ..
            } => "▸ ",
            RowKind::Node { .. } => "• ",
            RowKind::Loading => "⟳ ",
            RowKind::AddChild => "+ ",
        }
    }

    fn hint_label(&self, id: &NodeId) -> Option<String> {
        match self.drop_hint? {
            DropDestination::Node { target, position } if target == id => {
                Some(format!("  ◀ {}", position.label()))
            }
            DropDestination::List {
                parent: Some(parent),
            } if parent == id => Some("  ◀ append".to_string()),
            _ => None,
        }
    }

    fn draft_spans(&self, draft: &DraftInput) -> Vec<Span<'static>> {
        let text = &draft.text;
        let cursor = draft.cursor.min(text.len());
        let (cursor_char, after) = match text[cursor..].chars().next() {
            Some(c) => (c.to_string(), text[cursor + c.len_utf8()..].to_string()),
            None => (" ".to_string(), String::new()),
        };
        let input_style = Style::default()
            .fg(self.theme.accent_fg)
            .add_modifier(Modifier::UNDERLINED);
        let cursor_style = Style::default()
            .bg(self.theme.tree_fg)
            .fg(self.theme.status_bg)
            .add_modifier(Modifier::BOLD);
        vec![
            Span::styled(text[..cursor].to_string(), input_style),
            Span::styled(cursor_char, cursor_style),
            Span::styled(after, input_style),
        ]
    }

    fn row_line(&self, row: &VisibleRow, index: usize) -> Line<'static> {
        let guide_style = Style::default().fg(self.theme.tree_guide_fg);
        let mut spans = vec![Span::styled(
            Self::build_prefix(row, self.rows, index),
            guide_style,
        )];

        match &row.kind {
            RowKind::Loading => {
                spans.push(Span::styled(
                    format!("{}Loading…", Self::indicator(row)),
                    Style::default()
                        .fg(self.theme.info_fg)
                        .add_modifier(Modifier::ITALIC),
                ));
            }
            RowKind::AddChild => {
                spans.push(Span::styled(Self::indicator(row), guide_style));
                if let EditState::AddingChild { draft, .. } = self.edit {
                    spans.extend(self.draft_spans(draft));
                }
            }
            RowKind::Node {
                id,
                name,
                expandable,
                ..
            } => {
                let indicator_style = if *expandable {
                    Style::default().fg(self.theme.tree_branch_fg)
                } else {
                    guide_style
                };
                spans.push(Span::styled(Self::indicator(row), indicator_style));

                match self.edit {
                    EditState::Renaming { id: editing, draft } if editing == id => {
                        spans.extend(self.draft_spans(draft));
                    }
                    _ => {
                        let mut style = Style::default().fg(self.theme.tree_fg);
                        if *expandable {
                            style = style
                                .fg(self.theme.tree_branch_fg)
                                .add_modifier(Modifier::BOLD);
                        }
                        if self.dragging == Some(id) {
                            style = style
                                .fg(self.theme.drag_source_fg)
                                .add_modifier(Modifier::ITALIC);
                        }
                        spans.push(Span::styled(name.clone(), style));
                    }
                }

                if let Some(label) = self.hint_label(id) {
                    spans.push(Span::styled(
                        label,
                        Style::default()
                            .fg(self.theme.drop_hint_fg)
                            .add_modifier(Modifier::BOLD),
                    ));
                }
            }
        }
        Line::from(spans)
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let visible_height = inner_area.height as usize;
        if visible_height == 0 {
            return;
        }

        let mut trailing: Vec<Line<'static>> = Vec::new();
        if matches!(self.drop_hint, Some(DropDestination::List { parent: None })) {
            trailing.push(Line::from(Span::styled(
                "◀ end of root list",
                Style::default()
                    .fg(self.theme.drop_hint_fg)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        if let Some(draft) = self.root_draft {
            let mut spans = vec![Span::styled(
                "+ ",
                Style::default().fg(self.theme.tree_guide_fg),
            )];
            spans.extend(self.draft_spans(draft));
            trailing.push(Line::from(spans));
        }
        // Trailing lines are pinned; rows get whatever height is left.
        if trailing.len() > visible_height {
            trailing.drain(..trailing.len() - visible_height);
        }
        let row_height = visible_height - trailing.len();

        let mut lines: Vec<(Line<'static>, bool)> = self
            .rows
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(row_height)
            .map(|(idx, row)| (self.row_line(row, idx), idx == self.selected))
            .collect();
        lines.extend(trailing.into_iter().map(|line| (line, false)));

        for (i, (line, is_selected)) in lines.into_iter().take(visible_height).enumerate() {
            let y = inner_area.y + i as u16;
            let mut line = line;
            if is_selected && !self.is_drafting_row(i + self.scroll) {
                line = line.patch_style(
                    Style::default()
                        .fg(self.theme.tree_selected_fg)
                        .bg(self.theme.tree_selected_bg)
                        .add_modifier(Modifier::BOLD),
                );
            }
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}

impl<'a> TreeWidget<'a> {
    fn is_drafting_row(&self, index: usize) -> bool {
        match (&self.edit, self.rows.get(index)) {
            (EditState::Renaming { id, .. }, Some(row)) => row.node_id() == Some(id),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme;
    use crate::tree::node::{nodes, TreeNode};
    use crate::tree::rows::flatten;
    use crate::tree::DropPosition;
    use std::collections::HashSet;

    fn rows(expanded: &[&str], loading: &[&str]) -> Vec<VisibleRow> {
        let forest = nodes([
            TreeNode::branch(
                "A",
                "Alpha",
                [
                    TreeNode::branch("B", "Beta", [TreeNode::leaf("D", "Delta")]),
                    TreeNode::lazy("C", "Gamma"),
                ],
            ),
            TreeNode::leaf("E", "Echo"),
        ]);
        let set = |ids: &[&str]| ids.iter().map(|s| NodeId::from(*s)).collect::<HashSet<_>>();
        flatten(&forest, &set(expanded), &set(loading), None)
    }

    fn render(widget: TreeWidget<'_>, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn draws_box_prefixes() {
        let tc = theme::dark_theme();
        let rows = rows(&["A", "B"], &[]);
        let lines = render(TreeWidget::new(&rows, &tc, &EditState::Viewing), 30, 6);
        assert_eq!(lines[0], "▾ Alpha");
        assert_eq!(lines[1], "├──▾ Beta");
        assert_eq!(lines[2], "│  └──• Delta");
        assert_eq!(lines[3], "└──▸ Gamma");
        assert_eq!(lines[4], "• Echo");
    }

    #[test]
    fn loading_placeholder() {
        let tc = theme::dark_theme();
        let rows = rows(&["A", "C"], &["C"]);
        let lines = render(TreeWidget::new(&rows, &tc, &EditState::Viewing), 30, 6);
        assert_eq!(lines[3], "   └──⟳ Loading…");
    }

    #[test]
    fn rename_draft_replaces_name() {
        let tc = theme::dark_theme();
        let rows = rows(&[], &[]);
        let edit = EditState::Renaming {
            id: NodeId::from("E"),
            draft: DraftInput::with_text("Ech"),
        };
        let lines = render(TreeWidget::new(&rows, &tc, &edit), 30, 3);
        assert_eq!(lines[1], "• Ech");
    }

    #[test]
    fn drop_hints_are_marked() {
        let tc = theme::dark_theme();
        let rows = rows(&[], &[]);
        let dragged = NodeId::from("E");
        let hint = DropDestination::node("A", DropPosition::Before);
        let lines = render(
            TreeWidget::new(&rows, &tc, &EditState::Viewing).drag(Some(&dragged), Some(&hint)),
            30,
            3,
        );
        assert_eq!(lines[0], "▸ Alpha  ◀ before");

        let root = DropDestination::list(None);
        let lines = render(
            TreeWidget::new(&rows, &tc, &EditState::Viewing).drag(Some(&dragged), Some(&root)),
            30,
            4,
        );
        assert_eq!(lines[2], "◀ end of root list");
    }

    #[test]
    fn root_draft_after_rows() {
        let tc = theme::dark_theme();
        let rows = rows(&[], &[]);
        let draft = DraftInput::with_text("New");
        let lines = render(
            TreeWidget::new(&rows, &tc, &EditState::Viewing).root_draft(Some(&draft)),
            30,
            4,
        );
        assert_eq!(lines[2], "+ New");
    }

    #[test]
    fn root_draft_is_pinned_when_rows_fill_the_panel() {
        let tc = theme::dark_theme();
        let rows = rows(&["A", "B"], &[]);
        assert_eq!(rows.len(), 5);
        let draft = DraftInput::with_text("New");
        let lines = render(
            TreeWidget::new(&rows, &tc, &EditState::Viewing).root_draft(Some(&draft)),
            30,
            5,
        );
        assert_eq!(lines[4], "+ New");
        assert_eq!(lines[3], "└──▸ Gamma");
    }

    #[test]
    fn root_marker_and_draft_share_last_line_in_tiny_panel() {
        let tc = theme::dark_theme();
        let rows = rows(&[], &[]);
        let draft = DraftInput::with_text("New");
        let dragged = NodeId::from("E");
        let root = DropDestination::list(None);
        let lines = render(
            TreeWidget::new(&rows, &tc, &EditState::Viewing)
                .root_draft(Some(&draft))
                .drag(Some(&dragged), Some(&root)),
            30,
            1,
        );
        assert_eq!(lines[0], "+ New");
    }

    #[test]
    fn add_child_draft_shows_under_loading_parent() {
        let tc = theme::dark_theme();
        let forest = nodes([TreeNode::lazy("C", "Gamma")]);
        let parent = NodeId::from("C");
        let set = |ids: &[&str]| ids.iter().map(|s| NodeId::from(*s)).collect::<HashSet<_>>();
        let rows = flatten(&forest, &set(&["C"]), &set(&["C"]), Some(&parent));
        let edit = EditState::AddingChild {
            parent,
            draft: DraftInput::with_text("Kid"),
        };
        let lines = render(TreeWidget::new(&rows, &tc, &edit), 30, 4);
        assert!(lines[1].ends_with("Kid"), "{:?}", lines[1]);
        assert!(lines[2].contains("Loading"));
    }

    #[test]
    fn selection_is_highlighted() {
        let tc = theme::dark_theme();
        let rows = rows(&[], &[]);
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(&rows, &tc, &EditState::Viewing)
            .selection(1, 0)
            .render(area, &mut buf);
        assert_eq!(buf.cell((2, 1)).unwrap().bg, tc.tree_selected_bg);
        assert_eq!(buf.cell((2, 1)).unwrap().fg, tc.tree_selected_fg);
        assert_ne!(buf.cell((2, 0)).unwrap().bg, tc.tree_selected_bg);
    }

    #[test]
    fn zero_area_does_not_panic() {
        let tc = theme::dark_theme();
        let rows = rows(&["A"], &[]);
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        TreeWidget::new(&rows, &tc, &EditState::Viewing).render(area, &mut buf);
    }
}
