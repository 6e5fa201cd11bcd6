//! Turn formatter markup into styled terminal lines.
//!
//! Understands exactly the tags the formatter emits. Anything else that looks
//! like a tag is shown as-is.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

#[derive(Debug, Default, Clone, Copy)]
struct Emphasis {
    strong: bool,
    em: bool,
    code: bool,
    pre: bool,
}

impl Emphasis {
    fn style(self, base: Style) -> Style {
        let mut style = base;
        if self.strong {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.em {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.code || self.pre {
            style = style.fg(Color::Green);
        }
        style
    }
}

struct LineBuilder {
    base: Style,
    emphasis: Emphasis,
    text: String,
    spans: Vec<Span<'static>>,
    lines: Vec<Line<'static>>,
}

impl LineBuilder {
    fn new(base: Style) -> Self {
        Self {
            base,
            emphasis: Emphasis::default(),
            text: String::new(),
            spans: Vec::new(),
            lines: Vec::new(),
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let content = decode_entities(&std::mem::take(&mut self.text));
            self.spans
                .push(Span::styled(content, self.emphasis.style(self.base)));
        }
    }

    fn end_line(&mut self) {
        self.flush_text();
        self.lines.push(Line::from(std::mem::take(&mut self.spans)));
    }

    fn has_pending(&self) -> bool {
        !self.text.is_empty() || !self.spans.is_empty()
    }

    /// Returns false for tags the formatter never produces.
    fn tag(&mut self, tag: &str) -> bool {
        match tag {
            "p" => {
                if self.has_pending() {
                    self.end_line();
                }
                if !self.lines.is_empty() {
                    self.lines.push(Line::default());
                }
            }
            "/p" | "br" => self.end_line(),
            "pre" => {
                if self.has_pending() {
                    self.end_line();
                }
                self.emphasis.pre = true;
            }
            "/pre" => {
                if self.has_pending() {
                    self.end_line();
                }
                self.emphasis.pre = false;
            }
            "strong" | "/strong" | "em" | "/em" | "code" | "/code" => {
                self.flush_text();
                let open = !tag.starts_with('/');
                match tag.trim_start_matches('/') {
                    "strong" => self.emphasis.strong = open,
                    "em" => self.emphasis.em = open,
                    _ => self.emphasis.code = open,
                }
            }
            _ => return false,
        }
        true
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if self.has_pending() {
            self.end_line();
        }
        self.lines
    }
}

/// Render markup as lines, with `base` applied under any emphasis.
pub fn markup_lines(markup: &str, base: Style) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::new(base);
    let mut rest = markup;

    while let Some(open) = rest.find('<') {
        builder.text.push_str(&rest[..open]);
        let candidate = &rest[open..];
        match candidate.find('>') {
            Some(close) => {
                let tag = &candidate[1..close];
                if !builder.tag(tag) {
                    builder.text.push_str(&candidate[..=close]);
                }
                rest = &candidate[close + 1..];
            }
            None => {
                builder.text.push_str(candidate);
                rest = "";
            }
        }
    }
    builder.text.push_str(rest);

    builder.finish()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Plain text of a line, for width calculations and tests.
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbot_core::markup::format;

    fn texts(markup: &str) -> Vec<String> {
        markup_lines(markup, Style::default())
            .iter()
            .map(line_text)
            .collect()
    }

    #[test]
    fn test_strong_span_is_bold() {
        let lines = markup_lines(&format("**bold** text"), Style::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans[0].content, "bold");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(lines[0].spans[1].content, " text");
        assert!(!lines[0].spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_paragraphs_are_separated_by_blank_line() {
        assert_eq!(texts(&format("a\n\nb")), ["a", "", "b"]);
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(texts(&format("one\ntwo")), ["one", "two"]);
    }

    #[test]
    fn test_code_block_lines() {
        assert_eq!(
            texts(&format("see:\n```\nfn main() {}\n```")),
            ["see:", "", "fn main() {}", ""]
        );
    }

    #[test]
    fn test_inline_code_is_coloured() {
        let lines = markup_lines(&format("run `cargo`"), Style::default());
        let code = &lines[0].spans[1];
        assert_eq!(code.content, "cargo");
        assert_eq!(code.style.fg, Some(Color::Green));
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(texts(&format("a < b && c > 'd'")), ["a < b && c > 'd'"]);
    }

    #[test]
    fn test_empty_paragraph_is_one_empty_line() {
        assert_eq!(texts(&format("")), [""]);
    }

    #[test]
    fn test_unknown_tags_are_literal() {
        assert_eq!(texts("<p><blink>hi</p>"), ["<blink>hi"]);
    }
}
