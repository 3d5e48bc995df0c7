//! Rough geolocation from our public IP address through `ip-api.com`.
//!
//! NOTE: this sends our address to a third party, only used when no location is configured.
//!

use std::time::Duration;

use clap::{crate_name, crate_version};
use eyre::{eyre, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, trace};

use overhead_common::Position;

use crate::http_get;

/// Free endpoint, no key needed
pub const LOCATE_URL: &str = "http://ip-api.com/json/";

#[derive(Debug, Deserialize)]
struct Answer {
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug)]
pub struct Locator {
    url: String,
    client: Client,
}

impl Locator {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Locator {
            url: url.to_owned(),
            client,
        })
    }

    /// Ask where we are
    ///
    #[tracing::instrument]
    pub fn locate(&self) -> Result<Position> {
        trace!("locate");

        let resp = http_get!(self, &self.url)?.error_for_status()?;
        let answer: Answer = resp.json()?;
        debug!("{answer:?}");

        Position::from_parts(answer.lat, answer.lon)
            .ok_or_else(|| eyre!("no position in geolocation answer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_locate() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/json/");
            then.status(200)
                .json_body(json!({"status": "success", "lat": 47.61, "lon": -122.33}));
        });

        let loc = Locator::new(&server.url("/json/")).unwrap();
        let pos = loc.locate().unwrap();
        m.assert();
        assert_eq!(Position::new(47.61, -122.33), pos);
    }

    #[test]
    fn test_locate_fail() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/json/");
            then.status(200).json_body(json!({"status": "fail"}));
        });

        let loc = Locator::new(&server.url("/json/")).unwrap();
        assert!(loc.locate().is_err());
    }
}
