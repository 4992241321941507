// ABOUTME: Shared tracing setup for geonotes binaries
// ABOUTME: init() logs to stderr for one-shot commands, init_file() logs under the config dir

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Directory name used under the platform config dir.
const APP_DIR: &str = "geonotes";

/// Log to stderr. Default: INFO, `RUST_LOG` overrides.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_target(false)
        .init();
}

/// Log to `~/.config/geonotes/{app_name}.log`. Default: WARN, `RUST_LOG` overrides.
///
/// Interactive front ends use this so log lines never interleave with their
/// own output. If the file cannot be opened a warning goes to stderr and the
/// process continues without logging.
pub fn init_file(app_name: &str) {
    if let Err(e) = init_file_inner(app_name) {
        eprintln!("Warning: failed to set up file logging: {e}");
    }
}

fn init_file_inner(app_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = log_file_path(app_name).ok_or("could not determine config directory")?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Where `init_file` writes for the given app, if a config dir exists.
pub fn log_file_path(app_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(format!("{app_name}.log")))
}
