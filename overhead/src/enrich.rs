//! Turn a raw sighting into something a human wants to read.
//!
//! We look the airframe up in the reference index, find out who operates it and build a title
//! and a subtitle.  Both the operator and the title come from an ordered list of strategies,
//! the first one giving an answer wins.
//!

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use tracing::trace;

use overhead_sources::{AircraftInfo, AirlineTable, ReferenceIndex, Sighting};

use crate::FeedEntry;

/// Where the "View" link goes
pub const FR24_URL: &str = "https://www.flightradar24.com";

/// Used in titles when there is nothing better
pub const NO_CALLSIGN: &str = "No callsign";

const FEET_PER_METER: f64 = 3.28084;
const MPH_PER_MPS: f64 = 2.23694;

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Everything we display about a new aircraft
///
#[derive(Clone, Debug, PartialEq)]
pub struct EnrichedAircraft {
    pub sighting: Sighting,
    pub distance_km: f64,
    pub info: Option<AircraftInfo>,
    pub operator: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub link: String,
}

impl EnrichedAircraft {
    /// Callsign or a placeholder
    ///
    pub fn callsign(&self) -> &str {
        self.sighting.callsign.as_deref().unwrap_or(NO_CALLSIGN)
    }

    /// Speed and heading, whatever we have of them
    ///
    pub fn details(&self) -> String {
        let speed = format_speed(self.sighting.velocity_mps);
        let heading = self.sighting.heading_degrees.map(compass);

        match (speed, heading) {
            (Some(speed), Some(heading)) => format!("{speed} heading {heading}"),
            (Some(speed), None) => speed,
            (None, Some(heading)) => format!("heading {heading}"),
            (None, None) => String::new(),
        }
    }

    /// What goes into the recent sightings feed
    ///
    pub fn feed_entry(&self) -> FeedEntry {
        FeedEntry {
            display: format!("{} ({})", self.title, self.callsign()),
            callsign: self.callsign().to_owned(),
            link: self.link.clone(),
        }
    }
}

impl Display for EnrichedAircraft {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.subtitle)
    }
}

/// Everything a strategy may look at
///
struct Context<'a> {
    sighting: &'a Sighting,
    info: Option<&'a AircraftInfo>,
    airlines: &'a AirlineTable,
}

type OperatorStrategy = fn(&Context<'_>) -> Option<String>;

const OPERATOR_STRATEGIES: &[OperatorStrategy] = &[operator_from_reference, operator_from_callsign];

fn operator_from_reference(ctx: &Context<'_>) -> Option<String> {
    ctx.info?.operator.clone()
}

fn operator_from_callsign(ctx: &Context<'_>) -> Option<String> {
    let callsign = ctx.sighting.callsign.as_deref()?;
    ctx.airlines.lookup_callsign(callsign).map(str::to_owned)
}

struct Naming<'a> {
    model: Option<String>,
    operator: Option<&'a str>,
    callsign: Option<&'a str>,
}

type TitleStrategy = fn(&Naming<'_>) -> Option<String>;

const TITLE_STRATEGIES: &[TitleStrategy] = &[
    title_model_operator,
    title_model,
    title_operator,
    title_callsign,
];

fn title_model_operator(n: &Naming<'_>) -> Option<String> {
    Some(format!("{} - {}", n.model.as_ref()?, n.operator?))
}

fn title_model(n: &Naming<'_>) -> Option<String> {
    n.model.clone()
}

fn title_operator(n: &Naming<'_>) -> Option<String> {
    n.operator.map(str::to_owned)
}

fn title_callsign(n: &Naming<'_>) -> Option<String> {
    Some(n.callsign.unwrap_or(NO_CALLSIGN).to_owned())
}

/// "Boeing 737-800", or whichever part we know
///
pub fn model_part(info: &AircraftInfo) -> Option<String> {
    match (&info.manufacturer, &info.model) {
        (Some(manufacturer), Some(model)) => Some(format!("{manufacturer} {model}")),
        (None, Some(model)) => Some(model.clone()),
        (Some(manufacturer), None) => Some(manufacturer.clone()),
        (None, None) => None,
    }
}

/// Altitude in feet, or what we know about it.
///
pub fn format_altitude(altitude_m: Option<f64>, on_ground: bool) -> String {
    match altitude_m {
        Some(alt) if alt != 0. => format!("{:.0} ft", alt * FEET_PER_METER),
        _ if on_ground => "On ground".to_string(),
        _ => "Unknown alt".to_string(),
    }
}

pub fn format_speed(velocity_mps: Option<f64>) -> Option<String> {
    velocity_mps.map(|v| format!("{:.0} mph", v * MPH_PER_MPS))
}

/// 8-point compass direction for a heading in degrees
///
pub fn compass(heading: f64) -> &'static str {
    let idx = (heading.rem_euclid(360.) / 45.).round() as usize % COMPASS.len();
    COMPASS[idx]
}

/// Flightradar24 page for a callsign (or an ICAO24 address)
///
pub fn link_for(ident: &str) -> String {
    format!("{}/{}", FR24_URL, ident.trim())
}

/// Build display records from sightings.
///
#[derive(Clone, Debug)]
pub struct Enricher {
    index: Arc<dyn ReferenceIndex>,
    airlines: Arc<AirlineTable>,
}

impl Enricher {
    pub fn new(index: Arc<dyn ReferenceIndex>, airlines: Arc<AirlineTable>) -> Self {
        Enricher { index, airlines }
    }

    #[tracing::instrument(skip(self))]
    pub fn enrich(&self, sighting: &Sighting, distance_km: f64) -> EnrichedAircraft {
        trace!("enrich");

        let info = self.index.lookup(&sighting.id).filter(|info| !info.is_empty());

        let ctx = Context {
            sighting,
            info: info.as_ref(),
            airlines: &self.airlines,
        };
        let operator = OPERATOR_STRATEGIES.iter().find_map(|s| s(&ctx));

        let naming = Naming {
            model: info.as_ref().and_then(model_part),
            operator: operator.as_deref(),
            callsign: sighting.callsign.as_deref(),
        };
        let title = TITLE_STRATEGIES
            .iter()
            .find_map(|s| s(&naming))
            .unwrap_or_else(|| NO_CALLSIGN.to_string());

        let callsign = sighting.callsign.as_deref().unwrap_or(NO_CALLSIGN);
        let subtitle = format!(
            "{} • {} • {:.1} km",
            callsign,
            format_altitude(sighting.altitude_m, sighting.on_ground),
            distance_km
        );
        let link = link_for(sighting.callsign.as_deref().unwrap_or(&sighting.id));

        EnrichedAircraft {
            sighting: sighting.clone(),
            distance_km,
            info,
            operator,
            title,
            subtitle,
            link,
        }
    }
}
