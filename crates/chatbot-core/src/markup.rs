//! Markdown-subset to display markup.
//!
//! Rules run in a fixed order, each as a single left-to-right pass over the
//! output of the previous one. Inserted markup is never rescanned by the rule
//! that produced it, and unmatched markers stay as literal characters.

use std::sync::OnceLock;

use regex::Regex;

/// One ordered step of the formatter.
pub struct MarkupRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl MarkupRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("markup rule pattern is valid"),
            replacement,
        }
    }

    pub fn apply(&self, input: &str) -> String {
        self.pattern.replace_all(input, self.replacement).into_owned()
    }
}

/// The formatter rules, in application order.
pub fn rules() -> &'static [MarkupRule] {
    static RULES: OnceLock<Vec<MarkupRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            MarkupRule::new("strong", r"\*\*(.*?)\*\*", "<strong>${1}</strong>"),
            MarkupRule::new("emphasis", r"\*(.*?)\*", "<em>${1}</em>"),
            MarkupRule::new("paragraph", r"\n\n", "</p><p>"),
            MarkupRule::new("line_break", r"\n", "<br>"),
            MarkupRule::new("code_block", r"(?s)```(.*?)```", "<pre><code>${1}</code></pre>"),
            MarkupRule::new("inline_code", r"`(.*?)`", "<code>${1}</code>"),
            MarkupRule::new("wrap", r"(?s)\A(.*)\z", "<p>${1}</p>"),
        ]
    })
}

/// Look up a single rule by name.
pub fn rule(name: &str) -> Option<&'static MarkupRule> {
    rules().iter().find(|rule| rule.name == name)
}

/// Escape characters that would otherwise be read as markup.
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Format raw reply text as safe display markup. Total: never fails.
pub fn format(raw: &str) -> String {
    rules()
        .iter()
        .fold(escape(raw), |text, rule| rule.apply(&text))
}
