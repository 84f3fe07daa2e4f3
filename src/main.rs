mod api;
mod app;
mod collection;
mod config;
mod error;
mod form;
mod logging;
mod models;
mod parser;
mod ui;

use crate::api::{StoreClient, TaskStore};
use crate::app::App;
use crate::config::Config;
use crate::error::AppError;
use crate::ui::run_app;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dotenv::dotenv;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::load()?;
    let log_path = config.log_path();
    logging::init(&log_path)?;

    let store = StoreClient::new(config.store_url()?, config.timeout())?;

    // Start read-only with an empty list if the store is unreachable
    let app = match store.fetch_tasks().await {
        Ok(tasks) => {
            log::info!("loaded {} tasks", tasks.len());
            App::new(tasks, config.default_tab)
        }
        Err(err) => {
            log::error!("Error fetching tasks: {}", err);
            let mut app = App::new(Vec::new(), config.default_tab);
            app.loaded = false;
            app.status = Some(format!("Error fetching tasks: {} (press r to retry)", err));
            app
        }
    };

    // Setup terminal UI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.hide_cursor()?;

    let res = run_app(&mut terminal, app, &store).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("terminal error: {}", err);
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
