use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use chatbot_core::Sender;

use crate::app::{App, FocusPane};
use crate::config::API_KEY_ENV;
use crate::markup_view::markup_lines;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat_screen(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.show_api_key_input {
        render_api_key_input(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Gemini Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("[{}]", app.model), Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode_text, mode_style) = match app.focus {
        FocusPane::Input => (" INPUT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        FocusPane::Transcript => (" CHAT ", Style::default().bg(Color::Blue).fg(Color::White)),
    };

    let mut hints = match app.focus {
        FocusPane::Input => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Shift+Enter ", key_style),
            Span::styled(" newline ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" scroll ", label_style),
        ],
        FocusPane::Transcript => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };
    hints.extend(vec![
        Span::styled(" Ctrl+K ", key_style),
        Span::styled(" focus ", label_style),
        Span::styled(" F2 ", key_style),
        Span::styled(" API key ", label_style),
    ]);

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(app.input_height()),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);
    if app.follow_bottom {
        app.scroll = app.max_scroll();
    }

    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Transcript;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Conversation ");

    let chat_text = if app.transcript.is_empty() && !app.typing {
        welcome_text(app.has_api_key)
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.transcript {
            let (label, label_color) = match msg.sender() {
                Sender::User => ("You:", Color::Cyan),
                Sender::Bot => ("Gemini:", Color::Yellow),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(label_color).add_modifier(Modifier::BOLD),
            )));

            let base = if msg.is_error() {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            lines.extend(markup_lines(msg.markup(), base));
            lines.push(Line::default());
        }

        if app.typing {
            lines.push(Line::from(Span::styled(
                "Gemini:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

fn welcome_text(has_api_key: bool) -> Text<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            "Welcome to Gemini Chat",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from("I'm powered by Google Gemini. I can help with questions, creative writing, coding, analysis, and much more!"),
    ];

    if !has_api_key {
        lines.extend([
            Line::default(),
            Line::from(Span::styled(
                "API key required",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from("  1. Go to https://aistudio.google.com/"),
            Line::from("  2. Create a free account and generate an API key"),
            Line::from(format!("  3. Press F2 and paste it, or set {}", API_KEY_ENV)),
            Line::from(Span::styled("It's free to get started.", dim)),
        ]);
    }

    Text::from(lines)
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input_focused = app.focus == FocusPane::Input;
    let (border_color, title) = if !app.input_enabled {
        (Color::DarkGray, " Waiting for reply... ")
    } else if input_focused {
        (Color::Yellow, " Message (Enter to send) ")
    } else {
        (Color::DarkGray, " Message (Ctrl+K to type) ")
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Keep the cursor inside the visible window of the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let (row, col) = app.cursor_row_col();
    let row_offset = (row + 1).saturating_sub(inner_height);
    let col_offset = if inner_width == 0 {
        0
    } else {
        (col + 1).saturating_sub(inner_width)
    };

    // Use cyan text to match the "You:" style - visible in both light and dark terminals
    let text_style = if app.input_enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let lines: Vec<Line> = app.input.split('\n').map(Line::from).collect();
    let input = Paragraph::new(lines)
        .style(text_style)
        .block(input_block)
        .scroll((row_offset as u16, col_offset as u16));

    frame.render_widget(input, area);

    if input_focused && app.input_enabled && !app.show_api_key_input {
        frame.set_cursor_position((
            area.x + 1 + (col - col_offset) as u16,
            area.y + 1 + (row - row_offset) as u16,
        ));
    }
}

fn render_api_key_input(app: &App, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 7;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Gemini API Key ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("Paste your API key below. Press Enter to save, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray));

    let instructions_area = Rect::new(inner.x, inner.y, inner.width, 1);
    frame.render_widget(instructions, instructions_area);

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let display_text = masked_key(&app.api_key_input);
    let input = Paragraph::new(display_text.clone())
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(input, input_area);

    let cursor_x = display_text.chars().count().min(input_area.width as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));

    let char_count = format!("{} characters", app.api_key_input.chars().count());
    let status = Paragraph::new(char_count)
        .style(Style::default().fg(Color::DarkGray));

    let status_area = Rect::new(inner.x, inner.y + 4, inner.width, 1);
    frame.render_widget(status, status_area);
}

/// Mask a key with asterisks, keeping the last four characters visible.
fn masked_key(key: &str) -> String {
    let len = key.chars().count();
    if len <= 4 {
        "*".repeat(len)
    } else {
        let masked_len = len - 4;
        let last_four: String = key.chars().skip(masked_len).collect();
        format!("{}...{}", "*".repeat(masked_len.min(20)), last_four)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_app;
    use crate::bridge::SurfaceEvent;
    use chatbot_core::ChatMessage;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_masked_key() {
        assert_eq!(masked_key(""), "");
        assert_eq!(masked_key("abc"), "***");
        assert_eq!(masked_key("abcdefgh"), "****...efgh");
    }

    #[test]
    fn test_welcome_shown_for_empty_transcript() {
        let (mut app, _rx) = test_app();
        let screen = screen_text(&mut app);
        assert!(screen.contains("Welcome to Gemini Chat"));
        assert!(!screen.contains("API key required"));

        app.has_api_key = false;
        assert!(screen_text(&mut app).contains("API key required"));
    }

    #[test]
    fn test_transcript_and_typing_indicator() {
        let (mut app, _rx) = test_app();
        app.apply_surface_event(SurfaceEvent::Append(ChatMessage::user("**hello**")));
        app.apply_surface_event(SurfaceEvent::TypingStarted);
        app.apply_surface_event(SurfaceEvent::InputEnabled(false));

        let screen = screen_text(&mut app);
        assert!(screen.contains("You:"));
        assert!(screen.contains("hello"));
        assert!(!screen.contains("**hello**"));
        assert!(screen.contains("Thinking."));
        assert!(screen.contains("Waiting for reply..."));
        assert!(!screen.contains("Welcome"));
    }

    #[test]
    fn test_render_records_chat_size() {
        let (mut app, _rx) = test_app();
        screen_text(&mut app);
        // 24 rows minus header, footer, input box and chat borders
        assert_eq!(app.chat_height, 24 - 2 - 3 - 2);
        assert_eq!(app.chat_width, 78);
    }
}
