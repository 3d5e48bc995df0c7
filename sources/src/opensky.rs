//! OpenSky (.org) specific code
//!
//! We implement two traits:
//! - `TokenProvider`: OAuth2 client credentials exchange
//! - `PositionSource`: one call to `/states/all` limited to a bounding box
//!
//! The API sends out an array of arrays, each representing a specific state vector, with
//! `null` everywhere a value is unknown.  We only pick the fields we need.
//!
//! Documentation is taken from [The Opensky site](https://openskynetwork.github.io/opensky-api/rest.html)
//!

use std::time::Duration;

use clap::{crate_name, crate_version};
use eyre::Result;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use overhead_common::{Position, BB};

use crate::token::TokenReply;
use crate::{http_get_auth, http_post_form};
use crate::{Auth, AuthError, Credential, FetchError, PositionSource, TokenProvider};

/// Base API url
pub const BASE_URL: &str = "https://opensky-network.org/api";
/// Route to all state vectors
pub const STATES: &str = "/states/all";
/// OAuth2 token endpoint
pub const AUTH_URL: &str =
    "https://auth.opensky-network.org/auth/realms/opensky-network/protocol/openid-connect/token";
/// Default request timeout
pub const DEF_TIMEOUT: Duration = Duration::from_secs(30);

/// This is the Opensky client/source struct.
///
#[derive(Clone, Debug)]
pub struct Opensky {
    /// Client credentials
    pub auth: Auth,
    /// Base site url
    pub base_url: String,
    /// Token endpoint
    pub auth_url: String,
    /// reqwest blocking client, carries the timeout
    pub client: Client,
}

impl Opensky {
    #[tracing::instrument]
    pub fn new(auth: Auth, timeout: Duration) -> Result<Self> {
        trace!("opensky::new");

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Opensky {
            auth,
            base_url: BASE_URL.to_owned(),
            auth_url: AUTH_URL.to_owned(),
            client,
        })
    }

    /// Override the default endpoints
    ///
    pub fn with_urls(mut self, base_url: &str, auth_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self.auth_url = auth_url.to_owned();
        self
    }
}

impl TokenProvider for Opensky {
    /// POST our credentials as a form, get a bearer token.
    ///
    #[tracing::instrument]
    fn get_token(&self) -> Result<Credential, AuthError> {
        trace!("opensky::get_token");

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.auth.client_id.as_str()),
            ("client_secret", self.auth.client_secret.as_str()),
        ];

        let resp = http_post_form!(self, self.auth_url.as_str(), &form)
            .map_err(|e| AuthError::HTTP(e.to_string()))?;

        let code = resp.status();
        if !code.is_success() {
            return Err(AuthError::Retrieval(format!(
                "{} ({})",
                self.auth.client_id, code
            )));
        }

        let reply: TokenReply = resp
            .json()
            .map_err(|e| AuthError::Decoding(e.to_string()))?;
        reply.into_credential()
    }
}

impl PositionSource for Opensky {
    fn name(&self) -> String {
        "opensky".to_string()
    }

    /// Single call API, the box is passed as `lamin`, `lomin`, `lamax` & `lomax`.
    ///
    #[tracing::instrument(skip(self, token))]
    fn fetch(&self, bb: &BB, token: &str) -> Result<StateList, FetchError> {
        trace!("opensky::fetch");

        let url = format!("{}{}", self.base_url, STATES);
        let query = bb.to_query();
        trace!("Fetching data from {}…", url);

        let resp = http_get_auth!(self, &url, token, &query)?;
        debug!("{:?}", &resp);

        // Check status
        //
        match resp.status() {
            StatusCode::OK => trace!("OK"),
            code @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                return Err(FetchError::Unauthorized(code.as_u16()))
            }
            code => return Err(FetchError::Http(code.as_u16())),
        }

        let body = resp.text()?;
        StateList::from_json(&body)
    }
}

/// One aircraft as seen in a single poll.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sighting {
    /// ICAO24 transponder address, lowercase
    pub id: String,
    /// Call-sign, trimmed
    pub callsign: Option<String>,
    /// Origin country
    pub country: Option<String>,
    /// Both parts or nothing
    pub position: Option<Position>,
    /// Barometric altitude in meters
    pub altitude_m: Option<f64>,
    pub on_ground: bool,
    /// Ground speed in m/s
    pub velocity_mps: Option<f64>,
    /// True track in degrees, clockwise from north
    pub heading_degrees: Option<f64>,
}

impl Sighting {
    /// Map a raw state vector, positional fields:
    ///
    /// 0 icao24, 1 callsign, 2 country, 5 longitude, 6 latitude, 7 altitude, 8 on_ground,
    /// 9 velocity, 10 true track.
    ///
    /// Returns `None` if there is no usable id.
    ///
    pub fn from_raw(raw: &[Value]) -> Option<Self> {
        let text = |i: usize| {
            raw.get(i)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let num = |i: usize| raw.get(i).and_then(Value::as_f64);

        let id = text(0)?.to_lowercase();

        Some(Sighting {
            id,
            callsign: text(1).map(str::to_owned),
            country: text(2).map(str::to_owned),
            position: Position::from_parts(num(6), num(5)),
            altitude_m: num(7),
            on_ground: raw.get(8).and_then(Value::as_bool).unwrap_or(false),
            velocity_mps: num(9),
            heading_degrees: num(10),
        })
    }
}

/// This is the main container for packets sent by the API.
/// It includes a UNIX timestamp and a set of `Sighting`, `None` meaning nothing in the box.
///
#[derive(Debug, Default)]
pub struct StateList {
    /// UNIX timestamp
    pub time: i64,
    /// The state vectors
    pub states: Option<Vec<Sighting>>,
}

/// Struct returned by the Opensky API
///
#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    time: i64,
    states: Option<Vec<Vec<Value>>>,
}

impl StateList {
    /// Deserialize from json
    ///
    #[tracing::instrument(skip(input))]
    pub fn from_json(input: &str) -> Result<Self, FetchError> {
        trace!("statelist::from_json");

        let data: Payload =
            serde_json::from_str(input).map_err(|e| FetchError::Decode(e.to_string()))?;

        let states = data.states.map(|states| {
            states
                .iter()
                .filter_map(|raw| Sighting::from_raw(raw))
                .collect::<Vec<_>>()
        });
        trace!("{} points", states.as_ref().map_or(0, Vec::len));

        Ok(StateList {
            time: data.time,
            states,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::{ErrorKind, Expirable};

    const TOKEN: &str = "/token";

    fn setup_opensky(server: &MockServer) -> Opensky {
        Opensky::new(Auth::new("me", "s3cr3t"), Duration::from_secs(5))
            .unwrap()
            .with_urls(&server.base_url(), &server.url(TOKEN))
    }

    fn sample() -> serde_json::Value {
        json!({
            "time": 1700000000,
            "states": [
                ["A1B2C3", "SWA3491 ", "United States", 1700000000, 1700000000,
                 -122.33, 47.63, 1524.0, false, 120.5, 90.0, 0.0, null, 1600.0, "1200", false, 0],
                ["abcdef", null, "United States", null, 1700000000,
                 null, null, null, true, null, null, null, null, null, null, false, 0],
                [null, "BAD", "Nowhere", null, 1700000000,
                 1.0, 2.0, null, false, null, null, null, null, null, null, false, 0]
            ]
        })
    }

    #[test]
    fn test_statelist_from_json() {
        let sl = StateList::from_json(&sample().to_string()).unwrap();
        assert_eq!(1700000000, sl.time);

        let states = sl.states.unwrap();
        // the one without id is dropped
        assert_eq!(2, states.len());

        let a = &states[0];
        assert_eq!("a1b2c3", a.id);
        assert_eq!(Some("SWA3491".to_string()), a.callsign);
        assert_eq!(Some(Position::new(47.63, -122.33)), a.position);
        assert_eq!(Some(1524.0), a.altitude_m);
        assert_eq!(Some(120.5), a.velocity_mps);
        assert_eq!(Some(90.0), a.heading_degrees);
        assert!(!a.on_ground);

        let b = &states[1];
        assert_eq!(None, b.callsign);
        assert_eq!(None, b.position);
        assert!(b.on_ground);
    }

    #[test]
    fn test_statelist_null_states() {
        let sl = StateList::from_json(r##"{"time": 1700000000, "states": null}"##).unwrap();
        assert!(sl.states.is_none());
    }

    #[test]
    fn test_statelist_garbage() {
        let sl = StateList::from_json("<html>502 Bad Gateway</html>");
        assert!(matches!(sl, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_get_token() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path(TOKEN)
                .header("content-type", "application/x-www-form-urlencoded")
                .body_contains("grant_type=client_credentials")
                .body_contains("client_id=me");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"access_token": "FOOBAR", "expires_in": 1800, "token_type": "Bearer"}));
        });

        let site = setup_opensky(&server);
        let t = site.get_token();
        m.assert();

        let t = t.unwrap();
        assert_eq!("FOOBAR", t.token);
        assert!(!t.is_expired());
        assert!(t.expires_at > Utc::now());
    }

    #[test]
    fn test_get_token_refused() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path(TOKEN);
            then.status(401);
        });

        let site = setup_opensky(&server);
        let t = site.get_token();
        m.assert();
        assert!(matches!(t, Err(AuthError::Retrieval(_))));
    }

    #[test]
    fn test_fetch_states() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path(STATES)
                .header("authorization", "Bearer FOOBAR")
                .query_param_exists("lamin")
                .query_param_exists("lomin")
                .query_param_exists("lamax")
                .query_param_exists("lomax");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(sample());
        });

        let site = setup_opensky(&server);
        let bb = BB::from_position(&Position::new(47.61, -122.33), 5.);
        let sl = site.fetch(&bb, "FOOBAR");
        m.assert();

        let sl = sl.unwrap();
        assert_eq!(2, sl.states.unwrap().len());
    }

    #[test]
    fn test_fetch_unauthorized() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path(STATES);
            then.status(401);
        });

        let site = setup_opensky(&server);
        let bb = BB::from_position(&Position::new(47.61, -122.33), 5.);
        let res = site.fetch(&bb, "EXPIRED");
        m.assert();

        let err = res.unwrap_err();
        assert_eq!(ErrorKind::AuthExpired, err.kind());
    }

    #[test]
    fn test_fetch_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(STATES);
            then.status(503);
        });

        let site = setup_opensky(&server);
        let bb = BB::from_position(&Position::new(47.61, -122.33), 5.);
        let err = site.fetch(&bb, "FOOBAR").unwrap_err();
        assert!(matches!(err, FetchError::Http(503)));
        assert_eq!(ErrorKind::Transient, err.kind());
    }

    #[test]
    fn test_fetch_connection_refused() {
        let site = Opensky::new(Auth::new("me", "s3cr3t"), Duration::from_secs(2))
            .unwrap()
            .with_urls("http://127.0.0.1:1", "http://127.0.0.1:1/token");
        let bb = BB::from_position(&Position::new(47.61, -122.33), 5.);

        let err = site.fetch(&bb, "FOOBAR").unwrap_err();
        assert_eq!(ErrorKind::Transient, err.kind());
    }
}
