//! Configuration file for `overhead`.
//!
//! ```hcl
//! version = 1
//!
//! auth {
//!   client_id     = "me-api-client"
//!   client_secret = "XXXX"
//! }
//!
//! home {
//!   lat = 47.61
//!   lon = -122.33
//! }
//!
//! radius   = 5
//! interval = 15
//! database = "aircraftDatabase.csv"
//! ```
//!
//! Relative file names are based on the directory holding the configuration file.
//!

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, trace};

use overhead_common::{Position, Versioned};
use overhead_sources::{Auth, AuthError, AUTH_URL, BASE_URL};

use crate::{Status, DEF_CAPACITY, DEF_INTERVAL, DEF_RADIUS};

/// Current version
pub const CVERSION: usize = 1;

/// Default request timeout in seconds
pub const DEF_TIMEOUT: u64 = 30;

/// URL overrides, mostly for testing against something else
///
#[derive(Clone, Debug, Deserialize)]
pub struct Site {
    pub base_url: Option<String>,
    pub auth_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub version: usize,
    /// Opensky API client
    pub auth: Option<Auth>,
    /// Where we watch from, guessed if not set
    pub home: Option<Position>,
    /// In km
    #[serde(default = "def_radius")]
    pub radius: f64,
    /// Polling period in seconds
    #[serde(default = "def_interval")]
    pub interval: u64,
    /// Request timeout in seconds
    #[serde(default = "def_timeout")]
    pub timeout: u64,
    /// Recent sightings kept
    #[serde(default = "def_capacity")]
    pub capacity: usize,
    /// Aircraft database (CSV)
    pub database: Option<PathBuf>,
    /// Airline table (JSON)
    pub airlines: Option<PathBuf>,
    pub site: Option<Site>,
}

fn def_radius() -> f64 {
    DEF_RADIUS
}

fn def_interval() -> u64 {
    DEF_INTERVAL.as_secs()
}

fn def_timeout() -> u64 {
    DEF_TIMEOUT
}

fn def_capacity() -> usize {
    DEF_CAPACITY
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: CVERSION,
            auth: None,
            home: None,
            radius: def_radius(),
            interval: def_interval(),
            timeout: def_timeout(),
            capacity: def_capacity(),
            database: None,
            airlines: None,
            site: None,
        }
    }
}

impl Versioned for Config {
    const VERSION: usize = CVERSION;

    fn version(&self) -> usize {
        self.version
    }
}

impl Config {
    /// Credentials from the file, or from the environment.
    ///
    #[tracing::instrument(skip(self))]
    pub fn credentials(&self) -> Result<Auth, AuthError> {
        trace!("credentials");

        match &self.auth {
            Some(auth) => auth.clone().check(),
            None => {
                debug!("no auth block, trying environment");
                Auth::from_env()
            }
        }
    }

    /// Check values that can not be expressed in the file format.
    ///
    pub fn check(&self) -> Result<(), Status> {
        if !self.radius.is_finite() || self.radius <= 0. {
            return Err(Status::BadRadius(self.radius));
        }
        if let Some(home) = &self.home {
            if !(-90. ..=90.).contains(&home.lat) || !(-180. ..=180.).contains(&home.lon) {
                return Err(Status::BadLocation(home.lat, home.lon));
            }
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.site
            .as_ref()
            .and_then(|s| s.base_url.as_deref())
            .unwrap_or(BASE_URL)
    }

    pub fn auth_url(&self) -> &str {
        self.site
            .as_ref()
            .and_then(|s| s.auth_url.as_deref())
            .unwrap_or(AUTH_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }
}

/// Make `fname` relative to `base` unless absolute already.
///
pub fn resolve(base: &Path, fname: &Path) -> PathBuf {
    if fname.is_absolute() {
        fname.to_path_buf()
    } else {
        base.join(fname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overhead_common::ConfigFile;
    use rstest::rstest;

    const FULL: &str = r##"
version = 1

auth {
  client_id     = "me-api-client"
  client_secret = "s3cr3t"
}

home {
  lat = 50.85
  lon = 4.35
}

radius   = 10
interval = 30
database = "aircraftDatabase.csv"

site {
  base_url = "http://localhost:8080/api"
}
"##;

    #[test]
    fn test_parse_full() {
        let cfg: Config = ConfigFile::<Config>::parse(FULL).unwrap();

        assert_eq!(10., cfg.radius);
        assert_eq!(Duration::from_secs(30), cfg.interval());
        assert_eq!(Duration::from_secs(30), cfg.timeout());
        assert_eq!(DEF_CAPACITY, cfg.capacity);
        assert_eq!(Some(Position::new(50.85, 4.35)), cfg.home);
        assert_eq!("http://localhost:8080/api", cfg.base_url());
        assert_eq!(AUTH_URL, cfg.auth_url());

        let auth = cfg.credentials().unwrap();
        assert_eq!("me-api-client", auth.client_id);
        assert!(cfg.check().is_ok());
    }

    #[test]
    fn test_parse_minimal() {
        let cfg: Config = ConfigFile::<Config>::parse("version = 1").unwrap();

        assert_eq!(DEF_RADIUS, cfg.radius);
        assert_eq!(DEF_INTERVAL, cfg.interval());
        assert_eq!(BASE_URL, cfg.base_url());
        assert!(cfg.home.is_none());
        assert!(cfg.database.is_none());
    }

    #[test]
    fn test_parse_bad_version() {
        assert!(ConfigFile::<Config>::parse("version = 2").is_err());
    }

    #[rstest]
    #[case(5., None, true)]
    #[case(0., None, false)]
    #[case(-1., None, false)]
    #[case(5., Some(Position::new(91., 0.)), false)]
    #[case(5., Some(Position::new(45., -181.)), false)]
    fn test_check(#[case] radius: f64, #[case] home: Option<Position>, #[case] ok: bool) {
        let cfg = Config {
            radius,
            home,
            ..Config::default()
        };
        assert_eq!(ok, cfg.check().is_ok());
    }

    #[test]
    fn test_resolve() {
        let base = Path::new("/etc/overhead");

        assert_eq!(
            PathBuf::from("/etc/overhead/db.csv"),
            resolve(base, Path::new("db.csv"))
        );
        assert_eq!(
            PathBuf::from("/tmp/db.csv"),
            resolve(base, Path::new("/tmp/db.csv"))
        );
    }
}
