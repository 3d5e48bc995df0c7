//! The knobs the user can turn while the monitor runs, and what it shows back.
//!
//! This is shared between the monitor thread and whatever UI is on the other side (the console
//! shell for now).  The configuration is an immutable snapshot swapped as a whole so the monitor
//! always sees a consistent pair of values for a given cycle.
//!

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info, trace};

use crate::{link_for, Status};

/// Choices offered by the radius menu, in km
pub const RADII: [f64; 9] = [1., 2., 5., 8., 10., 15., 20., 30., 40.];

/// Default radius in km
pub const DEF_RADIUS: f64 = 5.;

/// Default number of recent sightings kept
pub const DEF_CAPACITY: usize = 5;

/// Read once per cycle by the monitor
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorConfig {
    pub paused: bool,
    pub radius_km: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            paused: false,
            radius_km: DEF_RADIUS,
        }
    }
}

/// One line in the recent sightings list
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeedEntry {
    pub display: String,
    pub callsign: String,
    pub link: String,
}

/// What a UI may ask for
///
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SetRadius(f64),
    SetPaused(bool),
    TogglePause,
    OpenLink(String),
    Exit,
}

/// What happened after an `Action`
///
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Radius(f64),
    Paused(bool),
    Link(String),
    Exit,
}

#[derive(Debug)]
pub struct ControlSurface {
    config: RwLock<Arc<MonitorConfig>>,
    feed: Mutex<VecDeque<FeedEntry>>,
    capacity: usize,
    current: AtomicUsize,
    requests: AtomicU64,
}

impl Default for ControlSurface {
    fn default() -> Self {
        Self::new(MonitorConfig::default(), DEF_CAPACITY)
    }
}

impl ControlSurface {
    /// `capacity` is at least 1.
    ///
    pub fn new(config: MonitorConfig, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        ControlSurface {
            config: RwLock::new(Arc::new(config)),
            feed: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            current: AtomicUsize::new(0),
            requests: AtomicU64::new(0),
        }
    }

    /// Current snapshot
    ///
    pub fn config(&self) -> MonitorConfig {
        let cfg = self.config.read().unwrap_or_else(PoisonError::into_inner);
        **cfg
    }

    /// Replace the snapshot with `f` applied to the current one, return the new one.
    ///
    fn swap<F>(&self, f: F) -> MonitorConfig
    where
        F: FnOnce(&MonitorConfig) -> MonitorConfig,
    {
        let mut cfg = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let new = f(&cfg);
        *cfg = Arc::new(new);
        new
    }

    pub fn set_paused(&self, paused: bool) {
        trace!("set_paused({paused})");
        self.swap(|cfg| MonitorConfig { paused, ..*cfg });
        info!("{}", if paused { "Paused" } else { "Resumed" });
    }

    /// Flip the pause flag, return the new value.
    ///
    pub fn toggle_pause(&self) -> bool {
        let cfg = self.swap(|cfg| MonitorConfig {
            paused: !cfg.paused,
            ..*cfg
        });
        info!("{}", if cfg.paused { "Paused" } else { "Resumed" });
        cfg.paused
    }

    /// Change the radius, used from the next cycle on.
    ///
    pub fn set_radius(&self, radius_km: f64) -> Result<(), Status> {
        if !radius_km.is_finite() || radius_km <= 0. {
            return Err(Status::BadRadius(radius_km));
        }
        self.swap(|cfg| MonitorConfig { radius_km, ..*cfg });
        info!("Radius changed to {radius_km} km");
        Ok(())
    }

    /// Add a sighting, evicting the oldest one if full.
    ///
    pub fn append_sighting(&self, entry: FeedEntry) {
        debug!("feed += {}", entry.display);
        let mut feed = self.feed.lock().unwrap_or_else(PoisonError::into_inner);
        while feed.len() >= self.capacity {
            feed.pop_front();
        }
        feed.push_back(entry);
    }

    /// Oldest first
    ///
    pub fn recent_sightings(&self) -> Vec<FeedEntry> {
        let feed = self.feed.lock().unwrap_or_else(PoisonError::into_inner);
        feed.iter().cloned().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current_aircraft(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    pub fn set_current_aircraft(&self, n: usize) {
        self.current.store(n, Ordering::Relaxed);
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Apply an `Action` coming from the UI.
    ///
    #[tracing::instrument(skip(self))]
    pub fn dispatch(&self, action: Action) -> Result<Reply, Status> {
        trace!("dispatch");

        let reply = match action {
            Action::SetRadius(km) => {
                self.set_radius(km)?;
                Reply::Radius(km)
            }
            Action::SetPaused(paused) => {
                self.set_paused(paused);
                Reply::Paused(paused)
            }
            Action::TogglePause => Reply::Paused(self.toggle_pause()),
            Action::OpenLink(callsign) => {
                let entry = self
                    .recent_sightings()
                    .into_iter()
                    .rev()
                    .find(|e| e.callsign.eq_ignore_ascii_case(callsign.trim()));
                match entry {
                    Some(entry) => Reply::Link(entry.link),
                    None => Reply::Link(link_for(&callsign)),
                }
            }
            Action::Exit => Reply::Exit,
        };
        Ok(reply)
    }
}
