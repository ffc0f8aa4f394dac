use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod config;
mod error;
mod fetcher;
mod geolocate;
mod units;
mod weather;
mod weatherapi;
mod widget;

use crate::app::{run_app, App};
use crate::cli::Args;
use crate::config::{Config, Startup};
use crate::fetcher::Fetcher;
use crate::geolocate::{FixedLocator, Geolocator, IpLocator};
use crate::weatherapi::WeatherApiClient;

/// The terminal belongs to the UI, so logs only go to a file.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wxnow=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Raw mode is undone again when any later setup step fails.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let setup = || -> io::Result<_> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        Terminal::new(CrosstermBackend::new(stdout))
    };
    setup().inspect_err(|_| {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = disable_raw_mode();
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;
    let config = Config::from_args(&args)?;

    let weather = WeatherApiClient::new(&config.api_url, &config.api_key, config.timeout)?;
    let locator: Option<Arc<dyn Geolocator>> = match &config.startup {
        Startup::Locate { geo_url } => Some(Arc::new(IpLocator::new(geo_url, config.timeout)?)),
        Startup::Fixed(coords) => Some(Arc::new(FixedLocator(*coords))),
        Startup::Search(_) | Startup::Idle => None,
    };
    let place = match &config.startup {
        Startup::Search(place) => Some(place.as_str()),
        _ => None,
    };
    let mut app = App::new(Fetcher::new(Arc::new(weather), locator), config.units);

    // setup terminal
    let mut terminal = setup_terminal()?;

    app.start(place);
    let res = run_app(&mut terminal, &mut app);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}
