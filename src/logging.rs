use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};

pub const LOG_FILE_NAME: &str = "mindscribe.log";

/// Where log records go
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    /// The TUI owns the terminal, so it logs to a file instead
    File(PathBuf),
}

/// Install the global logger. `RUST_LOG` overrides `default_level`.
pub fn init(default_level: &str, target: &LogTarget) -> io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    builder.format_timestamp_millis();

    match target {
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
        }
        LogTarget::File(path) => {
            builder.target(Target::Pipe(Box::new(open_log_file(path)?)));
        }
    }

    // A second init (tests, embedding) keeps the first logger
    if builder.try_init().is_err() {
        log::debug!("Logger already installed");
    }
    Ok(())
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
