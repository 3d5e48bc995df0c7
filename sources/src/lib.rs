//! Module to deal with the different sources we get data from.
//!
//! The different submodules deal with:
//!
//! - authentication (OAuth2 token)
//! - fetching aircraft positions around a point
//! - looking up static data about an aircraft or an airline
//! - finding out where we are
//!

use std::fmt::Debug;

use overhead_common::BB;

// Re-export these modules for a shorted import path.
//
pub use aircraft_db::*;
pub use airlines::*;
pub use auth::*;
pub use error::*;
pub use locate::*;
pub use opensky::*;
pub use token::*;

mod aircraft_db;
mod airlines;
mod auth;
mod error;
mod locate;
mod opensky;
mod token;

#[macro_use]
mod macros;

/// This trait hides the actual feed we poll.
///
pub trait PositionSource: Debug + Send {
    /// Return site's name
    fn name(&self) -> String;
    /// Snapshot of everything inside `bb`
    fn fetch(&self, bb: &BB, token: &str) -> Result<StateList, FetchError>;
}

/// Static information about airframes, keyed by ICAO24 address.
///
pub trait ReferenceIndex: Debug + Send + Sync {
    fn lookup(&self, id: &str) -> Option<AircraftInfo>;
}

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
