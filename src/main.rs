use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use tracing::{error, info, warn};

mod browser;
mod catalog;
mod controller;
mod domain;
mod inputter;
mod listing;
mod loader;
mod model;
mod sheets;
mod text;
mod ui;

use browser::{Launcher, SystemBrowser};
use catalog::list_groups;
use controller::Controller;
use domain::{APP_NAME, CONNECTING, INTERRUPTED, Settings, YaalaError};
use model::{Model, Status};
use sheets::{SheetSource, SheetsClient};
use text::{Shaper, default_shaper};
use ui::TableUI;

/// Log to a file; the terminal belongs to the UI. The guard must outlive the app.
fn init_logging(data_dir: &Path) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok()?;

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "yaala.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,yaala=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(ErrorLayer::default())
        .init();

    Some(guard)
}

fn main() -> ExitCode {
    let data_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME);
    let _log_guard = init_logging(&data_dir);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting yaala");

    let shaper = default_shaper();

    // Covers the blocking load. Once the UI runs, raw mode turns Ctrl-C into a key event.
    if let Err(e) = ctrlc::set_handler(move || {
        ratatui::restore();
        eprintln!("\n{}", shaper(INTERRUPTED));
        std::process::exit(0);
    }) {
        warn!(error = %e, "Could not install interrupt handler");
    }

    let settings_path = Settings::default_path();
    if !settings_path.exists() {
        Settings::default().save(&settings_path);
    }
    let settings = Settings::load(&settings_path);

    println!("{}", shaper(CONNECTING));
    let client = match SheetsClient::from_key_file(&settings.credentials_path()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Could not set up the spreadsheet client");
            eprintln!("{} {e}", shaper(domain::LOAD_FAILED));
            return ExitCode::SUCCESS;
        }
    };
    let Some(mut model) = startup(&client, &settings, Box::new(SystemBrowser), shaper) else {
        return ExitCode::SUCCESS;
    };

    let result = run(&mut model, &settings, &std::thread::sleep);
    ratatui::restore();

    match result {
        // Terminal I/O failures are the one non-zero exit.
        Err(e) => {
            error!(error = %e, "Terminal failure");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            if let Some(farewell) = model.farewell() {
                println!("{farewell}");
            }
            ExitCode::SUCCESS
        }
    }
}

/// Load the catalog and build the model. `None` means there is nothing to
/// navigate and the terminal UI must not start.
fn startup(
    source: &dyn SheetSource,
    settings: &Settings,
    launcher: Box<dyn Launcher>,
    shaper: Shaper,
) -> Option<Model> {
    let catalog = loader::load(source, settings, shaper);
    if list_groups(&catalog).is_empty() {
        info!("Catalog is empty, nothing to show");
        return None;
    }
    Some(Model::init(catalog, settings, launcher, shaper))
}

fn run(model: &mut Model, settings: &Settings, pause: &dyn Fn(Duration)) -> Result<(), YaalaError> {
    let mut ui = TableUI::new();
    let controller = Controller::new(settings);
    let mut terminal = ratatui::init();

    while model.status != Status::Quitting {
        // Render the current view
        terminal.draw(|f| ui.draw(model, f))?;

        // Leave a message on screen for a moment before moving on
        if let Some(delay) = model.pending_pause() {
            pause(delay);
            model.settle();
            continue;
        }

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event()? {
            model.update(Some(message))?;
        };
    }

    Ok(())
}
