//! Error types for the `overhead` crate.
//!

use thiserror::Error;

use overhead_sources::AuthError;

/// Things that stop us from running at all, or reject a command.
///
#[derive(Debug, Error)]
pub enum Status {
    #[error("No configuration file and no credentials in the environment")]
    MissingConfig,
    #[error("Invalid radius {0}, must be > 0 km")]
    BadRadius(f64),
    #[error("Invalid location {0}, {1}")]
    BadLocation(f64, f64),
    #[error("Unknown command {0}")]
    UnknownCommand(String),
    #[error("Missing argument for {0}")]
    MissingArgument(String),
    #[error("Invalid argument {0}")]
    BadArgument(String),
    #[error("No such sighting {0}")]
    NoSuchSighting(String),
}

/// Why the monitor stopped on its own.
///
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Credential refused and refresh failed: {0}")]
    AuthExpired(#[from] AuthError),
}
