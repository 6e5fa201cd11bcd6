//! Glue between the chat session task and the UI event loop.

use chatbot_core::{ChatMessage, ChatSession, DisplaySurface, GeminiClient};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::tui::AppEvent;

/// Render calls from the session, delivered to the UI loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Append(ChatMessage),
    TypingStarted,
    TypingCleared,
    InputEnabled(bool),
}

/// Requests from the UI to the session task.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Submit(String),
    SetApiKey(String),
}

/// Display surface that forwards every call over the app event channel.
pub struct ChannelSurface {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChannelSurface {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }

    fn forward(&self, event: SurfaceEvent) {
        // The UI has gone away; nothing left to render to.
        if self.tx.send(AppEvent::Surface(event)).is_err() {
            debug!("surface.receiver_closed");
        }
    }
}

impl DisplaySurface for ChannelSurface {
    fn append_message(&mut self, message: ChatMessage) {
        self.forward(SurfaceEvent::Append(message));
    }

    fn show_typing_indicator(&mut self) {
        self.forward(SurfaceEvent::TypingStarted);
    }

    fn clear_typing_indicator(&mut self) {
        self.forward(SurfaceEvent::TypingCleared);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.forward(SurfaceEvent::InputEnabled(enabled));
    }
}

/// Process commands one at a time until the UI drops its sender.
pub async fn run_session(
    mut session: ChatSession<GeminiClient, ChannelSurface>,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            SessionCommand::Submit(text) => {
                let outcome = session.submit(&text).await;
                debug!(?outcome, "session.submit_done");
            }
            SessionCommand::SetApiKey(key) => {
                session.pipeline_mut().endpoint_mut().set_api_key(&key);
                info!("session.api_key_updated");
            }
        }
    }
    debug!("session.closed");
}
