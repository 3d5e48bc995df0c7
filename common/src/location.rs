//! Location related module
//!
//! v1: basic format, only Lat, Lon
//! v2: radius in km, latitude-adjusted longitude span
//!
//! The bounding box is only a coarse pre-filter sent to the feed, exact inclusion is always
//! decided by [distance_km].
//!
use std::fmt::{Display, Formatter};

use geo::{point, HaversineDistance};
use serde::Deserialize;
use tracing::trace;

/// Approximate number of km in one degree of latitude, always a bit less than the real value
/// so the box stays an over-approximation.
pub const KM_PER_DEG: f64 = 111.0;

/// Used when we have neither a configured location nor a geolocation answer (Seattle).
pub const DEFAULT_HOME: Position = Position {
    lat: 47.61,
    lon: -122.33,
};

/// A point on the globe, in degrees
///
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct Position {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

impl Position {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Position { lat, lon }
    }

    /// Only build a position if we have both parts.
    ///
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some(Self::new(lat, lon)),
            _ => None,
        }
    }

    /// Great-circle distance in km to `other`.
    ///
    #[inline]
    pub fn distance_km(&self, other: &Position) -> f64 {
        distance_km(self, other)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Haversine distance between two points, in km.
///
pub fn distance_km(a: &Position, b: &Position) -> f64 {
    let a = point!(x: a.lon, y: a.lat);
    let b = point!(x: b.lon, y: b.lat);

    a.haversine_distance(&b) / 1_000.
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BB {
    /// Longitude - X0
    pub min_lon: f64,
    /// Latitude - Y0
    pub min_lat: f64,
    /// Longitude - X1
    pub max_lon: f64,
    /// Latitude - Y1
    pub max_lat: f64,
}

impl BB {
    /// Take a position and create a bounding box of `radius` km around it.
    ///
    /// The latitude span is `radius / 111` degrees on both sides.  The longitude span is the
    /// widest longitude offset of the circle, `asin(sin(d) / cos(lat))` where `d` is that same
    /// angle.  If the circle reaches a pole, every longitude is possible.
    ///
    /// NOTE: we do not wrap around the antimeridian, `min_lon` can go below -180.
    ///
    #[tracing::instrument]
    pub fn from_position(center: &Position, radius: f64) -> Self {
        let dlat = radius / KM_PER_DEG;

        let min_lat = (center.lat - dlat).max(-90.);
        let max_lat = (center.lat + dlat).min(90.);

        let cos = center.lat.to_radians().cos();
        let ratio = dlat.to_radians().sin() / cos;
        let (min_lon, max_lon) = if min_lat <= -90.
            || max_lat >= 90.
            || cos <= f64::EPSILON
            || ratio >= 1.
        {
            (-180., 180.)
        } else {
            let dlon = ratio.asin().to_degrees();
            if dlon >= 180. {
                (-180., 180.)
            } else {
                (center.lon - dlon, center.lon + dlon)
            }
        };
        trace!("bb: {min_lat},{min_lon} -> {max_lat},{max_lon}");

        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Is `pos` inside (borders included)?
    ///
    #[inline]
    pub fn contains(&self, pos: &Position) -> bool {
        (self.min_lat..=self.max_lat).contains(&pos.lat)
            && (self.min_lon..=self.max_lon).contains(&pos.lon)
    }

    /// Parameters as expected by the Opensky API.
    ///
    pub fn to_query(&self) -> [(&'static str, f64); 4] {
        [
            ("lamin", self.min_lat),
            ("lomin", self.min_lon),
            ("lamax", self.max_lat),
            ("lomax", self.max_lon),
        ]
    }
}

impl Display for BB {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.3}, {:.3}, {:.3}, {:.3}",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}
