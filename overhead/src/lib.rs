//! Library part of `overhead`.
//!
//! We poll a live position feed every few seconds for what flies within a given radius around
//! us, keep track of what we already saw and announce every newcomer with whatever we know about
//! it (type, operator, altitude and distance).
//!
//! The position feed, the credential provider and the reference database are all behind traits
//! from `overhead-sources` so the monitor can be driven by anything.
//!

pub use cli::*;
pub use cmds::*;
pub use config::*;
pub use control::*;
pub use enrich::*;
pub use error::*;
pub use monitor::*;
pub use notify::*;
pub use shell::*;
pub use tracker::*;

mod cli;
mod cmds;
mod config;
mod control;
mod enrich;
mod error;
mod monitor;
mod notify;
mod shell;
mod tracker;

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
