//! UI-agnostic transcript types
//!
//! Shared by any display surface (the terminal front-end, tests). A message
//! is formatted once, when it is created, and never changes afterwards.

use serde::Serialize;

use crate::markup;

/// Who a transcript entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sender {
    User,
    Bot,
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    text: String,
    markup: String,
    sender: Sender,
    is_error: bool,
}

impl ChatMessage {
    fn new(text: &str, sender: Sender, is_error: bool) -> Self {
        Self {
            text: text.to_string(),
            markup: markup::format(text),
            sender,
            is_error,
        }
    }

    pub fn user(text: &str) -> Self {
        Self::new(text, Sender::User, false)
    }

    pub fn bot(text: &str) -> Self {
        Self::new(text, Sender::Bot, false)
    }

    /// A bot-side message describing a failure.
    pub fn error(text: &str) -> Self {
        Self::new(text, Sender::Bot, true)
    }

    /// The raw text as typed or received.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The display markup produced by [`markup::format`].
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}
