use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::app::{App, FocusPane};
use crate::config::Config;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {
            if app.follow_bottom {
                app.scroll_to_bottom();
            }
        }
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Surface(event) => app.apply_surface_event(event),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_api_key_input {
        handle_api_key_input(app, key);
        return;
    }

    if key.code == KeyCode::Char('k') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.focus = FocusPane::Input;
        return;
    }

    if key.code == KeyCode::F(2) {
        app.show_api_key_input = true;
        app.api_key_input.clear();
        app.api_key_input_cursor = 0;
        return;
    }

    match app.focus {
        FocusPane::Transcript => handle_transcript_keys(app, key),
        FocusPane::Input => handle_input_keys(app, key),
    }
}

fn handle_transcript_keys(app: &mut App, key: KeyEvent) {
    let page = app.chat_height.max(1);
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter | KeyCode::Tab => app.focus = FocusPane::Input,
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(page),
        KeyCode::PageDown => app.scroll_down(page),
        KeyCode::Home | KeyCode::Char('g') => app.scroll_up(u16::MAX),
        KeyCode::End | KeyCode::Char('G') => app.scroll_to_bottom(),
        _ => {}
    }
}

fn handle_input_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => {
            app.focus = FocusPane::Transcript;
        }
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            insert_char(app, '\n');
        }
        KeyCode::Enter => app.submit_input(),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1)),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1)),
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => insert_char(app, c),
        _ => {}
    }
}

fn insert_char(app: &mut App, c: char) {
    let byte_pos = char_to_byte_index(&app.input, app.cursor);
    app.input.insert(byte_pos, c);
    app.cursor += 1;
}

fn handle_paste(app: &mut App, text: &str) {
    let text = text.replace("\r\n", "\n");
    if app.show_api_key_input {
        let pasted = text.trim();
        let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
        app.api_key_input.insert_str(byte_pos, pasted);
        app.api_key_input_cursor += pasted.chars().count();
    } else if app.focus == FocusPane::Input {
        let byte_pos = char_to_byte_index(&app.input, app.cursor);
        app.input.insert_str(byte_pos, &text);
        app.cursor += text.chars().count();
    }
}

fn handle_api_key_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_api_key_input = false;
            app.api_key_input.clear();
            app.api_key_input_cursor = 0;
        }
        KeyCode::Enter => {
            let key = std::mem::take(&mut app.api_key_input);
            if !key.trim().is_empty() {
                if let Err(err) = Config::save_api_key(&key) {
                    warn!(error = %err, "config.save_failed");
                }
                app.apply_api_key(&key);
            }
            app.show_api_key_input = false;
            app.api_key_input_cursor = 0;
        }
        KeyCode::Backspace => {
            if app.api_key_input_cursor > 0 {
                app.api_key_input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
                app.api_key_input.remove(byte_pos);
            }
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
            app.api_key_input.insert(byte_pos, c);
            app.api_key_input_cursor += 1;
        }
        _ => {}
    }
}
