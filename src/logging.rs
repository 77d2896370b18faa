//! Log setup.
//!
//! The terminal belongs to the UI, so records go to `log.file` and nowhere
//! else. Without a file nothing is installed and every `log` macro is a no-op.

use std::fs::{self, OpenOptions};
use std::io;
use std::panic;

use env_logger::{Target, WriteStyle};

use crate::config::LogSettings;

/// Install the global logger. `RUST_LOG` refines the configured level.
pub fn init(settings: &LogSettings) -> io::Result<()> {
    let Some(path) = &settings.file else {
        return Ok(());
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut clog = colog::default_builder();
    clog.filter(None, settings.level.into())
        .parse_env("RUST_LOG")
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)));

    if clog.try_init().is_err() {
        return Ok(());
    }

    log::info!("logging to {}", path.display());
    Ok(())
}

/// Record panics in the log, then hand them to whatever hook was there before.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
        previous(panic_info);
    }));
}
