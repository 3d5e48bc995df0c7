//! The monitor loop.
//!
//! Every `period` we:
//!
//! - read the current configuration from the control surface (skip everything when paused)
//! - build the bounding box around our fixed center for the current radius
//! - fetch what is inside from the position source, keep what is really within the radius
//! - give the ids to the tracker and announce the new ones
//! - wait for the next period or a stop
//!
//! Fetch failures are logged and the cycle is just empty.  A refused credential is refreshed
//! once, if that fails we stop for good.
//!
//! When running, a stop is also looked for between the blocking requests of a cycle so we never
//! wait for more than the request in flight.  A batch already received is always processed.
//!

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use strum::Display;
use tracing::{debug, error, info, trace, warn};

use overhead_common::{Position, BB};
use overhead_sources::{
    Credential, ErrorKind, Expirable, FetchError, PositionSource, Sighting, StateList,
    TokenProvider,
};

use crate::{ControlSurface, Enricher, MonitorError, Notifier, SightingTracker};

/// Default polling period
pub const DEF_INTERVAL: Duration = Duration::from_secs(15);

/// Refresh the credential when it expires within this
const TOKEN_MARGIN: i64 = 30;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum State {
    Running,
    Paused,
    Stopped,
}

/// What one cycle did
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CycleReport {
    /// Aircraft within the radius
    pub in_range: usize,
    /// Announced this time
    pub new: Vec<String>,
    /// Gone since last time
    pub left: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Cycle {
    /// Nothing done
    Paused,
    /// Nothing received, nothing changed
    Failed,
    /// Stop requested before anything was received
    Stopped,
    Done(CycleReport),
}

/// Keep sightings with a position within `radius_km` of `center`, with their distance, closest
/// first.
///
pub fn within_radius(
    states: Vec<Sighting>,
    center: &Position,
    radius_km: f64,
) -> Vec<(Sighting, f64)> {
    let mut res: Vec<(Sighting, f64)> = states
        .into_iter()
        .filter_map(|s| {
            let dist = s.position?.distance_km(center);
            (dist <= radius_km).then_some((s, dist))
        })
        .collect();
    res.sort_by(|a, b| a.1.total_cmp(&b.1));
    res
}

/// The data source and the credential we use with it.
///
#[derive(Debug)]
pub struct Feed {
    source: Box<dyn PositionSource>,
    tokens: Box<dyn TokenProvider>,
    credential: Credential,
}

impl Feed {
    pub fn new(
        source: Box<dyn PositionSource>,
        tokens: Box<dyn TokenProvider>,
        credential: Credential,
    ) -> Self {
        Feed {
            source,
            tokens,
            credential,
        }
    }

    pub fn name(&self) -> String {
        self.source.name()
    }

    /// Get a new credential, failure is final.
    ///
    #[tracing::instrument(skip(self))]
    fn refresh(&mut self) -> Result<(), MonitorError> {
        trace!("refresh");

        self.credential = self.tokens.get_token()?;
        info!("New credential, valid until {}", self.credential.expires_at);
        Ok(())
    }

    /// Refresh ahead of expiration.  If that does not work, keep the old one and let the
    /// server decide.
    ///
    fn refresh_if_needed(&mut self) {
        if !self
            .credential
            .expires_within(chrono::Duration::seconds(TOKEN_MARGIN))
        {
            return;
        }
        debug!("credential about to expire");
        if let Err(e) = self.refresh() {
            warn!("early credential refresh failed: {e}");
        }
    }

    fn fetch(&self, bb: &BB) -> Result<StateList, FetchError> {
        self.source.fetch(bb, &self.credential.token)
    }
}

#[derive(Debug)]
pub struct MonitorLoop {
    center: Position,
    period: Duration,
    feed: Feed,
    enricher: Enricher,
    notifier: Box<dyn Notifier>,
    control: Arc<ControlSurface>,
    tracker: SightingTracker,
    state: State,
    stopping: bool,
}

impl MonitorLoop {
    pub fn new(
        center: Position,
        feed: Feed,
        enricher: Enricher,
        notifier: Box<dyn Notifier>,
        control: Arc<ControlSurface>,
    ) -> Self {
        MonitorLoop {
            center,
            period: DEF_INTERVAL,
            feed,
            enricher,
            notifier,
            control,
            tracker: SightingTracker::new(),
            state: State::Running,
            stopping: false,
        }
    }

    /// Set the polling period
    ///
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn tracker(&self) -> &SightingTracker {
        &self.tracker
    }

    /// Run a single cycle.  Only an unrecoverable credential problem is an error.
    ///
    #[tracing::instrument(skip(self))]
    pub fn poll_once(&mut self) -> Result<Cycle, MonitorError> {
        trace!("poll_once");
        self.poll(None)
    }

    /// Has a stop been sent (or the sender dropped)?  Remembered as `try_recv` consumes it.
    ///
    fn stop_seen(&mut self, stop: Option<&Receiver<()>>) -> bool {
        if let Some(stop) = stop {
            if !matches!(stop.try_recv(), Err(TryRecvError::Empty)) {
                debug!("stop requested");
                self.stopping = true;
            }
        }
        self.stopping
    }

    fn poll(&mut self, stop: Option<&Receiver<()>>) -> Result<Cycle, MonitorError> {
        let cfg = self.control.config();
        if cfg.paused {
            self.state = State::Paused;
            info!("[PAUSED - monitoring stopped]");
            return Ok(Cycle::Paused);
        }
        self.state = State::Running;

        let bb = BB::from_position(&self.center, cfg.radius_km);
        debug!("radius={} km bb={bb:?}", cfg.radius_km);

        self.feed.refresh_if_needed();
        if self.stop_seen(stop) {
            return Ok(Cycle::Stopped);
        }
        self.control.record_request();

        let list = match self.feed.fetch(&bb) {
            Ok(list) => list,
            Err(e) => match e.kind() {
                ErrorKind::Transient => {
                    warn!("Error fetching data, will retry: {e}");
                    return Ok(Cycle::Failed);
                }
                ErrorKind::AuthExpired => {
                    if self.stop_seen(stop) {
                        warn!("{e}, not refreshing as we are stopping");
                        return Ok(Cycle::Stopped);
                    }
                    warn!("{e}, getting a new credential");
                    if let Err(e) = self.feed.refresh() {
                        error!("{e}");
                        self.state = State::Stopped;
                        return Err(e);
                    }
                    return Ok(Cycle::Failed);
                }
            },
        };

        let in_range = within_radius(
            list.states.unwrap_or_default(),
            &self.center,
            cfg.radius_km,
        );
        let update = self
            .tracker
            .update(in_range.iter().map(|(s, _)| s.id.as_str()));

        for id in &update.new {
            let Some((sighting, dist)) = in_range.iter().find(|(s, _)| s.id.eq_ignore_ascii_case(id))
            else {
                continue;
            };

            let plane = self.enricher.enrich(sighting, *dist);
            info!("new: {plane}");
            let details = plane.details();
            if !details.is_empty() {
                info!("    {details}");
            }
            self.notifier.notify(&plane.title, &plane.subtitle, &plane.link);
            self.control.append_sighting(plane.feed_entry());
        }
        if !update.left.is_empty() {
            debug!("left: {:?}", update.left);
        }

        let report = CycleReport {
            in_range: self.tracker.len(),
            new: update.new,
            left: update.left,
        };
        self.control.set_current_aircraft(report.in_range);

        if !report.new.is_empty() {
            info!(
                "[{} new aircraft detected] [Requests: {}]",
                report.new.len(),
                self.control.requests()
            );
        } else if report.in_range > 0 {
            info!("[Monitoring... {} aircraft in range]", report.in_range);
        } else {
            info!("No aircraft in area...");
        }
        Ok(Cycle::Done(report))
    }

    /// Loop until told to stop through `stop` (or all its senders are gone).
    ///
    #[tracing::instrument(skip(self, stop))]
    pub fn run(&mut self, stop: Receiver<()>) -> Result<(), MonitorError> {
        trace!("run");

        info!(
            "=== Monitoring started around {} using {} every {}s ===",
            self.center,
            self.feed.name(),
            self.period.as_secs()
        );

        loop {
            if self.stop_seen(Some(&stop)) {
                break;
            }

            self.poll(Some(&stop))?;
            if self.stopping {
                break;
            }

            match stop.recv_timeout(self.period) {
                Err(RecvTimeoutError::Timeout) => continue,
                _ => break,
            }
        }

        self.state = State::Stopped;
        info!("Stopping flight tracker...");
        Ok(())
    }
}
