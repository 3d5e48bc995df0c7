//! Actual work behind each sub-command, with the setup they share.
//!

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tracing::{info, trace, warn};

use overhead_common::{Position, DEFAULT_HOME};
use overhead_sources::{
    AircraftDb, AirlineTable, Credential, Locator, Opensky, ReferenceIndex, TokenProvider,
    LOCATE_URL,
};

use crate::{resolve, Config, Enricher, Opts, Status};

pub use once::*;
pub use watch::*;

mod once;
mod watch;

/// Everything needed to talk to the feed and describe what we see.
///
#[derive(Debug)]
pub struct Context {
    pub center: Position,
    pub radius: f64,
    pub interval: Duration,
    pub capacity: usize,
    pub site: Opensky,
    pub credential: Credential,
    pub enricher: Enricher,
}

impl Context {
    /// Merge CLI and configuration, get our first credential and load reference data.
    ///
    /// Any failure here is fatal.
    ///
    #[tracing::instrument(skip(opts, cfg))]
    pub fn setup(opts: &Opts, cfg: &Config, basedir: &Path) -> Result<Context> {
        trace!("context::setup");

        cfg.check()?;

        let radius = opts.radius.unwrap_or(cfg.radius);
        if !radius.is_finite() || radius <= 0. {
            return Err(Status::BadRadius(radius).into());
        }
        let interval = opts
            .interval
            .map(|i| Duration::from_secs(i.max(1)))
            .unwrap_or_else(|| cfg.interval());

        let auth = cfg.credentials()?;
        let site = Opensky::new(auth, cfg.timeout())?.with_urls(cfg.base_url(), cfg.auth_url());

        info!("Getting access token from {}…", cfg.auth_url());
        let credential = site.get_token()?;
        info!("Token valid until {}", credential.expires_at);

        let center = find_center(opts, cfg)?;
        info!("Watching around {center} within {radius} km");

        let index: Arc<dyn ReferenceIndex> = match &cfg.database {
            Some(fname) => Arc::new(AircraftDb::load(&resolve(basedir, fname))?),
            None => {
                warn!("No aircraft database, titles will be terse");
                Arc::new(AircraftDb::new())
            }
        };
        let airlines = match &cfg.airlines {
            Some(fname) => AirlineTable::load(Some(resolve(basedir, fname).as_path()))?,
            None => AirlineTable::load(None)?,
        };

        Ok(Context {
            center,
            radius,
            interval,
            capacity: cfg.capacity,
            site,
            credential,
            enricher: Enricher::new(index, Arc::new(airlines)),
        })
    }
}

/// Where are we?  CLI first, then the configuration file, then ask the network.
///
fn find_center(opts: &Opts, cfg: &Config) -> Result<Position> {
    if let Some(pos) = Position::from_parts(opts.lat, opts.lon) {
        if !(-90. ..=90.).contains(&pos.lat) || !(-180. ..=180.).contains(&pos.lon) {
            return Err(Status::BadLocation(pos.lat, pos.lon).into());
        }
        return Ok(pos);
    }
    if let Some(pos) = cfg.home {
        return Ok(pos);
    }

    info!("No location configured, asking {LOCATE_URL}");
    match Locator::new(LOCATE_URL).and_then(|l| l.locate()) {
        Ok(pos) => Ok(pos),
        Err(e) => {
            warn!("Can not find our location ({e}), using default {DEFAULT_HOME}");
            Ok(DEFAULT_HOME)
        }
    }
}
