use anyhow::Result;
use chatbot_core::{ChatSession, GeminiClient, RequestPipeline};
use tokio::sync::mpsc;
use tracing::{info, warn};

mod app;
mod bridge;
mod config;
mod handler;
mod logging;
mod markup_view;
mod tui;
mod ui;

use app::App;
use bridge::ChannelSurface;
use config::Config;
use tui::EventHandler;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _log_guard = logging::init()?;

    let config = Config::load().unwrap_or_else(|err| {
        warn!(error = %err, "config.load_failed; using defaults");
        Config::new()
    });
    let api_key = config.resolve_api_key();
    info!(model = config.model(), has_api_key = api_key.is_some(), "app.start");

    let client = GeminiClient::new(
        config.base_url(),
        config.model(),
        api_key.as_deref().unwrap_or_default(),
    );
    let pipeline = RequestPipeline::new(client).with_retry_policy(config.retry_policy());

    let mut events = EventHandler::new();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let session = ChatSession::new(pipeline, ChannelSurface::new(events.sender()));
    tokio::spawn(bridge::run_session(session, cmd_rx));

    let mut app = App::new(&config, api_key.is_some(), cmd_tx);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!("app.exit");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
