use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::backend::RodioBackend;
use crate::config::Settings;
use crate::controller::Controller;
use crate::library::LoftyProbe;
use crate::logging;
use crate::store::TomlStore;

mod event_loop;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = Settings::load_or_default();
    if let Err(e) = logging::init(&settings.log) {
        eprintln!("folio: cannot open log file, logging disabled: {e}");
    }
    logging::install_panic_hook();
    if let Some(msg) = &config_warning {
        warn!("{msg}");
    }

    let state_path = settings
        .state_path()
        .unwrap_or_else(|| PathBuf::from("folio-state.toml"));
    let store = TomlStore::open(state_path);
    info!("preferences at {}", store.path().display());

    let mut controller = Controller::new(
        RodioBackend::new(),
        store,
        Duration::from_millis(settings.playback.debounce_ms),
    );
    let probe = LoftyProbe;
    let mut app = App::new();

    let args: Vec<String> = env::args().skip(1).collect();
    let source = startup::source_from_args(&args, controller.last_folder(), &settings.playback);
    startup::load_source(&mut controller, &mut app, source, &settings, &probe);
    if let Some(msg) = config_warning {
        app.set_status(msg);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut controller,
        &probe,
        &mut state,
    );

    controller.dispose();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
