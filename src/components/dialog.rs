use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::{AppMode, DialogKind};
use crate::theme::ThemeColors;

/// Dialog widget that renders a centered modal overlay.
pub struct DialogWidget<'a> {
    mode: &'a AppMode,
    theme: &'a ThemeColors,
}

impl<'a> DialogWidget<'a> {
    pub fn new(mode: &'a AppMode, theme: &'a ThemeColors) -> Self {
        Self { mode, theme }
    }

    /// Calculate a centered rectangle within the given area.
    fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width.min(area.width), height.min(area.height))
    }
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.mode {
            AppMode::Dialog(DialogKind::DeleteConfirm { prompt, .. }) => {
                render_message_dialog(
                    " Delete ",
                    prompt,
                    "[y] Yes  [n/Esc] Cancel",
                    Style::default()
                        .fg(self.theme.warning_fg)
                        .add_modifier(Modifier::BOLD),
                    self.theme,
                    area,
                    buf,
                );
            }
            AppMode::Dialog(DialogKind::Error { message }) => {
                render_message_dialog(
                    " Error ",
                    message,
                    "[Enter/Esc] Dismiss",
                    Style::default().fg(self.theme.error_fg),
                    self.theme,
                    area,
                    buf,
                );
            }
            AppMode::Normal => {}
        }
    }
}

fn render_message_dialog(
    title: &str,
    message: &str,
    hint: &str,
    message_style: Style,
    theme: &ThemeColors,
    area: Rect,
    buf: &mut Buffer,
) {
    let text_width = u16::try_from(message.chars().count().max(hint.chars().count()))
        .unwrap_or(u16::MAX);
    let dialog_width = text_width
        .saturating_add(6)
        .max(30)
        .min(area.width.saturating_sub(4));
    let rect = DialogWidget::centered_rect(dialog_width, 5, area);

    Clear.render(rect, buf);

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dialog_border_fg))
        .padding(Padding::horizontal(1));

    let inner = block.inner(rect);
    block.render(rect, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let msg_line = Line::from(Span::styled(message.to_string(), message_style));
    buf.set_line(inner.x, inner.y + inner.height / 2, &msg_line, inner.width);

    let hint_style = Style::default()
        .fg(theme.dim_fg)
        .add_modifier(Modifier::DIM);
    let hint_line = Line::from(Span::styled(hint.to_string(), hint_style));
    if inner.height > 1 {
        buf.set_line(inner.x, inner.y + inner.height - 1, &hint_line, inner.width);
    }
}
