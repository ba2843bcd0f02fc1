use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text editing shared by the key form and the chat input.
/// Returns false when the key was not an editing key.
fn edit_line(input: &mut String, cursor: &mut usize, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if *cursor < input.chars().count() {
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            *cursor = (*cursor + 1).min(input.chars().count());
        }
        KeyCode::Home => {
            *cursor = 0;
        }
        KeyCode::End => {
            *cursor = input.chars().count();
        }
        // Ctrl chords are commands, not text
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let byte_pos = char_to_byte_index(input, *cursor);
            input.insert(byte_pos, c);
            *cursor += 1;
        }
        _ => return false,
    }
    true
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    app.poll_reply().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_settings && app.screen() != Screen::ApiKey {
        handle_settings(app, key);
        return;
    }

    match app.screen() {
        Screen::ApiKey => handle_api_key(app, key),
        Screen::Roles => handle_roles(app, key),
        Screen::Chat => {
            if app.show_templates {
                handle_templates(app, key);
            } else {
                match app.input_mode {
                    InputMode::Normal => handle_chat_normal(app, key),
                    InputMode::Editing => handle_chat_editing(app, key),
                }
            }
        }
    }
}

fn handle_api_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.submit_api_key(),
        _ => {
            edit_line(&mut app.api_key_input, &mut app.api_key_cursor, key);
        }
    }
}

fn handle_roles(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.role_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.role_nav_up(),
        KeyCode::Char('g') => app.role_state.select(Some(0)),
        KeyCode::Char('G') => app.role_state.select(Some(rolechat_core::ROLES.len() - 1)),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.select_highlighted_role(),
        KeyCode::Char('s') => app.show_settings = true,
        KeyCode::Char('L') => app.sign_out(),
        _ => {}
    }
}

fn handle_settings(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q') => app.show_settings = false,
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => app.settings_nav_down(),
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => app.settings_nav_up(),
        KeyCode::Char('h') | KeyCode::Left => app.adjust_setting(-1),
        KeyCode::Char('l') | KeyCode::Right => app.adjust_setting(1),
        KeyCode::Char('H') => app.adjust_setting(-10),
        KeyCode::Char('L') => app.adjust_setting(10),
        _ => {}
    }
}

fn handle_templates(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('t') => app.show_templates = false,
        KeyCode::Char('j') | KeyCode::Down => app.template_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.template_nav_up(),
        KeyCode::Enter => app.apply_template(),
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Start typing (input is disabled while a reply is pending)
        KeyCode::Char('i') | KeyCode::Enter | KeyCode::Char('a') => {
            if !app.session.is_busy() {
                app.input_mode = InputMode::Editing;
            }
        }

        // Scrolling
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_down((app.chat_height / 2).max(1));
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_up((app.chat_height / 2).max(1));
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        // Panels and navigation
        KeyCode::Char('t') => app.toggle_templates(),
        KeyCode::Char('s') => app.show_settings = true,
        KeyCode::Char('r') | KeyCode::Esc => app.change_role(),
        KeyCode::Char('L') => app.sign_out(),

        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.submit_query(),
        _ => {
            if !app.session.is_busy() {
                edit_line(&mut app.query_input, &mut app.query_cursor, key);
            }
        }
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    match (app.screen(), mouse.kind) {
        (Screen::Chat, MouseEventKind::ScrollDown) if in_chat => app.scroll_chat_down(3),
        (Screen::Chat, MouseEventKind::ScrollUp) if in_chat => app.scroll_chat_up(3),
        (Screen::Roles, MouseEventKind::ScrollDown) => app.role_nav_down(),
        (Screen::Roles, MouseEventKind::ScrollUp) => app.role_nav_up(),
        _ => {}
    }
}
