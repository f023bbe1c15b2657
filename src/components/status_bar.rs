use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

pub const NORMAL_HINTS: &str = " r:ren  a:add  A:root  d:del  m:move  q:quit ";
pub const DRAFT_HINTS: &str = " Enter:save  Esc:cancel ";
pub const MOVE_HINTS: &str = " j/k:target  Tab:pos  0:root  Enter:drop  Esc:cancel ";

/// Status bar widget: context info and key hints, or a transient message.
pub struct StatusBarWidget<'a> {
    info: &'a str,
    hints: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(info: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            info,
            hints: NORMAL_HINTS,
            theme,
            status_message: None,
            is_error: false,
        }
    }

    pub fn hints(mut self, hints: &'a str) -> Self {
        self.hints = hints;
        self
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }
}

/// Cut `s` to at most `width` characters.
fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_bg)
            } else {
                Style::default().fg(self.theme.success_fg)
            };
            let display = format!("{:<width$}", truncate(msg, width), width = width);
            let line = Line::from(Span::styled(display, style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let hints_len = self.hints.chars().count();
        let info = truncate(self.info, width.saturating_sub(hints_len));
        let gap = width
            .saturating_sub(info.chars().count())
            .saturating_sub(hints_len);

        let line = Line::from(vec![
            Span::styled(info, Style::default().fg(self.theme.status_fg)),
            Span::raw(" ".repeat(gap)),
            Span::styled(
                self.hints,
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::DIM),
            ),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
