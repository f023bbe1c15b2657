use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, AppMode, DialogKind};

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if let AppMode::Dialog(kind) = &app.mode {
        if matches!(kind, DialogKind::DeleteConfirm { .. }) {
            handle_confirm_key(app, key);
        } else if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.close_dialog();
        }
        return;
    }

    if app.is_editing() {
        handle_draft_key(app, key);
    } else if app.is_dragging() {
        handle_grab_key(app, key);
    } else {
        handle_normal_key(app, key);
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('l') | KeyCode::Right => app.expand_selected(),
        KeyCode::Char('h') | KeyCode::Left => app.collapse_selected(),
        KeyCode::Char('r') | KeyCode::F(2) => app.start_rename(),
        KeyCode::Char('a') => app.begin_add_child(),
        KeyCode::Char('A') => app.begin_add_root(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('m') => app.grab_selected(),
        _ => {}
    }
}

fn handle_draft_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_draft(),
        KeyCode::Esc => app.cancel_draft(),
        code => {
            let Some(draft) = app.controller.active_draft_mut() else {
                return;
            };
            match code {
                KeyCode::Backspace => draft.backspace(),
                KeyCode::Left => draft.move_left(),
                KeyCode::Right => draft.move_right(),
                KeyCode::Home => draft.home(),
                KeyCode::End => draft.end(),
                KeyCode::Char(c) => draft.insert_char(c),
                _ => {}
            }
        }
    }
}

fn handle_grab_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
            app.hint_selected();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_previous();
            app.hint_selected();
        }
        KeyCode::Tab => app.cycle_drop_position(),
        KeyCode::Char('0') => app.target_root_list(),
        KeyCode::Enter => app.drop_grabbed(),
        KeyCode::Esc => app.cancel_grab(),
        _ => {}
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.answer_delete(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_delete(false),
        _ => {}
    }
}

/// Handle a mouse event. Ignored while a dialog or draft is open.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.mode != AppMode::Normal || app.is_editing() {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(),
        MouseEventKind::ScrollDown => app.select_next(),
        MouseEventKind::ScrollUp => app.select_previous(),
        _ => {}
    }
}
