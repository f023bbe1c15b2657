use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode};
use crate::components::dialog::DialogWidget;
use crate::components::status_bar::{StatusBarWidget, DRAFT_HINTS, MOVE_HINTS, NORMAL_HINTS};
use crate::components::tree::TreeWidget;
use crate::tree::model;

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let block = Block::default()
        .title(" Tree ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_fg));

    // Mouse hit-testing and scrolling both work on the inner area, minus
    // the lines the widget pins below the rows.
    let inner = block.inner(chunks[0]);
    app.tree_area = inner;
    app.update_scroll((inner.height as usize).saturating_sub(app.trailing_lines()));

    let tree_widget = TreeWidget::new(&app.rows, &app.theme, app.controller.edit_state())
        .selection(app.selected_index, app.scroll_offset)
        .root_draft(app.controller.root_draft())
        .drag(app.controller.dragging(), app.controller.drop_hint())
        .block(block);
    frame.render_widget(tree_widget, chunks[0]);

    let hints = if app.is_editing() {
        DRAFT_HINTS
    } else if app.is_dragging() {
        MOVE_HINTS
    } else {
        NORMAL_HINTS
    };
    let info = status_info(app);
    let mut status = StatusBarWidget::new(&info, &app.theme).hints(hints);
    if let Some(msg) = &app.status_message {
        status = status.status_message(&msg.text, msg.is_error);
    }
    frame.render_widget(status, chunks[1]);

    if app.mode != AppMode::Normal {
        frame.render_widget(DialogWidget::new(&app.mode, &app.theme), frame.area());
    }
}

/// Left side of the status bar: what is selected and how big the forest is.
fn status_info(app: &App) -> String {
    let total = model::count_nodes(&app.controller.nodes());
    let selected = app
        .selected_id()
        .and_then(|id| app.controller.find(id.as_str()))
        .map(|n| n.name.clone());
    match (app.controller.dragging(), selected) {
        (Some(dragged), _) => {
            let name = app
                .controller
                .find(dragged.as_str())
                .map(|n| n.name.clone())
                .unwrap_or_default();
            format!(" moving {name} ({})", app.drop_position.label())
        }
        (None, Some(name)) => format!(" {name} · {total} nodes"),
        (None, None) => format!(" {total} nodes"),
    }
}
