use chatbot_core::ChatMessage;
use tokio::sync::mpsc;
use tracing::warn;

use crate::bridge::{SessionCommand, SurfaceEvent};
use crate::config::Config;
use crate::markup_view::{line_text, markup_lines};

/// Input box grows with its content up to this many text rows.
pub const MAX_INPUT_ROWS: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Transcript,
    Input,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: FocusPane,

    // Transcript, as rendered by the display surface
    pub transcript: Vec<ChatMessage>,
    pub typing: bool,
    pub input_enabled: bool,
    pub scroll: u16,
    pub follow_bottom: bool,
    pub chat_height: u16, // Inner height of the transcript pane
    pub chat_width: u16,  // Inner width of the transcript pane

    // Message input
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // API key input state
    pub has_api_key: bool,
    pub show_api_key_input: bool,
    pub api_key_input: String,
    pub api_key_input_cursor: usize,

    pub model: String,
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl App {
    pub fn new(
        config: &Config,
        has_api_key: bool,
        commands: mpsc::UnboundedSender<SessionCommand>,
    ) -> Self {
        Self {
            should_quit: false,
            focus: FocusPane::Input,

            transcript: Vec::new(),
            typing: false,
            input_enabled: true,
            scroll: 0,
            follow_bottom: true,
            chat_height: 0,
            chat_width: 0,

            input: String::new(),
            cursor: 0,

            animation_frame: 0,

            has_api_key,
            show_api_key_input: false,
            api_key_input: String::new(),
            api_key_input_cursor: 0,

            model: config.model().to_string(),
            commands,
        }
    }

    /// Apply a render call coming from the chat session.
    pub fn apply_surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Append(message) => self.transcript.push(message),
            SurfaceEvent::TypingStarted => {
                self.typing = true;
                self.animation_frame = 0;
            }
            SurfaceEvent::TypingCleared => self.typing = false,
            SurfaceEvent::InputEnabled(enabled) => self.input_enabled = enabled,
        }
        if self.follow_bottom {
            self.scroll_to_bottom();
        }
    }

    /// Hand the current input to the session and clear the box.
    ///
    /// Blank input stays where it is; the session would ignore it anyway.
    pub fn submit_input(&mut self) {
        if !self.input_enabled || self.input.trim().is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.follow_bottom = true;
        // Without a key the session answers with an error and never toggles input.
        if self.has_api_key {
            self.input_enabled = false;
        }
        self.send(SessionCommand::Submit(text));
    }

    /// Apply the key typed into the popup to the running session.
    pub fn apply_api_key(&mut self, key: &str) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        self.has_api_key = true;
        self.send(SessionCommand::SetApiKey(key.to_string()));
    }

    fn send(&self, command: SessionCommand) {
        if self.commands.send(command).is_err() {
            warn!("app.session_gone");
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.typing {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Rows the input box needs, including its borders.
    pub fn input_height(&self) -> u16 {
        let rows = self.input.split('\n').count() as u16;
        rows.clamp(1, MAX_INPUT_ROWS) + 2
    }

    /// Cursor position in the input as (row, column), both in chars.
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let before: String = self.input.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        (row, col)
    }

    /// Total rendered rows of the transcript at the current width.
    pub fn transcript_rows(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;
        for msg in &self.transcript {
            total_lines += 1; // Sender line ("You:" or "Gemini:")
            for line in markup_lines(msg.markup(), Default::default()) {
                let char_count = line_text(&line).chars().count();
                total_lines += char_count / wrap_width + 1;
            }
            total_lines += 1; // Blank line after message
        }

        if self.typing {
            total_lines += 2; // "Gemini:" + "Thinking..."
        }

        total_lines.min(u16::MAX as usize) as u16
    }

    pub fn max_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.transcript_rows().saturating_sub(visible_height)
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
        self.follow_bottom = true;
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_sub(rows);
        self.follow_bottom = false;
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_add(rows).min(self.max_scroll());
        self.follow_bottom = self.scroll == self.max_scroll();
    }
}

#[cfg(test)]
pub(crate) fn test_app() -> (App, mpsc::UnboundedReceiver<SessionCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (App::new(&Config::new(), true, tx), rx)
}
