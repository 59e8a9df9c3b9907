use anyhow::Result;
use tracing::info;

mod api;
mod app;
mod config;
mod handler;
mod logging;
mod tui;
mod ui;

use api::CatalogClient;
use app::App;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|_| Config::new());
    let _guard = logging::init(config.log_dir.clone())?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = tui::EventHandler::new();
    let client = CatalogClient::new(config.api_url());
    let mut app = App::new(client, events.sender());

    info!("starting catalog ui against {}", app.client.base_url());

    // Initial fetch; the loading flag clears when the result lands.
    handler::spawn_list(&app);

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
