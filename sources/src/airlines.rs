//! Airline ICAO code to name table
//!
//! Used when the reference database has no operator for an airframe: most airline callsigns
//! start with the three-letter ICAO code of the airline (`SWA3491` is Southwest).
//!
//! A small table is embedded, a bigger one can be given as a JSON object `{"CODE": "Name"}`.
//!

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use eyre::Result;
use tracing::trace;

/// Static code -> name table
///
#[derive(Debug, Default)]
pub struct AirlineTable {
    codes: HashMap<String, String>,
}

impl AirlineTable {
    /// Load from file if specified, embedded table otherwise.
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&Path>) -> Result<Self> {
        trace!("airlines::load");

        let data = match fname {
            Some(fname) => fs::read_to_string(fname)?,
            None => include_str!("data/airlines.json").to_owned(),
        };
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let codes: HashMap<String, String> = serde_json::from_str(data)?;
        let codes = codes
            .into_iter()
            .map(|(code, name)| (code.to_uppercase(), name))
            .collect();
        Ok(AirlineTable { codes })
    }

    /// Direct lookup, case-insensitive
    ///
    pub fn name(&self, code: &str) -> Option<&str> {
        self.codes.get(&code.to_uppercase()).map(String::as_str)
    }

    /// Operator name from a callsign, through its leading letters.
    ///
    pub fn lookup_callsign(&self, callsign: &str) -> Option<&str> {
        let code = airline_code(callsign)?;
        self.name(&code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Leading alphabetic prefix of a callsign, uppercased (`SWA3491` -> `SWA`).
///
pub fn airline_code(callsign: &str) -> Option<String> {
    let code: String = callsign
        .trim()
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect();

    if code.is_empty() {
        None
    } else {
        Some(code.to_uppercase())
    }
}
