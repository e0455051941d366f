//! Error types shared by the matching and filing engine.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using minion's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Nothing matched: no date in a text, no file by that name, empty set.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Relocating a note failed; the note is still at `from`.
    #[error("Could not move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not parse settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An external viewer or editor exited unsuccessfully.
    #[error("{program} exited with {status}")]
    Launch {
        program: String,
        status: std::process::ExitStatus,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
