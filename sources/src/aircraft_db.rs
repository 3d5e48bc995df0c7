//! Local reference database of aircraft
//!
//! This is the Opensky `aircraftDatabase.csv` file, indexed by ICAO24 address.  We only keep the
//! few columns used for display.  The file is far from clean: header names and values can be
//! quoted with `'`, a lot of cells are empty or just say "unknown", and some lines are broken.
//!

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use eyre::Result;
use serde::Deserialize;
use tracing::{debug, info, trace, warn};

use crate::ReferenceIndex;

/// What we know about an airframe, every field is optional.
///
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AircraftInfo {
    pub registration: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub operator: Option<String>,
}

impl AircraftInfo {
    /// No field at all?
    ///
    pub fn is_empty(&self) -> bool {
        self.registration.is_none()
            && self.manufacturer.is_none()
            && self.model.is_none()
            && self.operator.is_none()
    }
}

/// One line of the CSV file, headers are normalised before deserializing.
///
#[derive(Debug, Deserialize)]
struct Record {
    icao24: String,
    #[serde(default)]
    registration: Option<String>,
    #[serde(default, rename = "manufacturername")]
    manufacturer: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    operator: Option<String>,
}

/// Strip quotes & blanks, drop empty and "unknown" values.
///
pub fn clean_value(val: Option<String>) -> Option<String> {
    let val = val?;
    let val = val.trim_matches(|c: char| c.is_whitespace() || c == '\'' || c == '"');

    if val.is_empty() {
        return None;
    }
    let lower = val.to_lowercase();
    if lower == "unknown" || lower == "unknow" {
        return None;
    }
    Some(val.to_owned())
}

/// In-memory index of the database
///
#[derive(Debug, Default)]
pub struct AircraftDb {
    db: HashMap<String, AircraftInfo>,
}

impl AircraftDb {
    /// Empty index, every lookup is a miss
    ///
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a file
    ///
    #[tracing::instrument]
    pub fn load(fname: &Path) -> Result<Self> {
        trace!("aircraft_db::load");

        info!("Loading aircraft database from {:?}…", fname);
        let fh = File::open(fname)?;
        let db = Self::from_reader(fh)?;
        info!("Loaded {} aircraft", db.len());
        Ok(db)
    }

    /// Load from anything readable, malformed lines are skipped.
    ///
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(rdr);

        // Normalise header names: `'manufacturerName'` -> `manufacturername`
        //
        let headers: csv::StringRecord = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().trim_matches('\'').to_lowercase())
            .collect();
        debug!("headers = {headers:?}");

        let mut db = HashMap::new();
        let mut bad = 0usize;
        for rec in rdr.records() {
            let rec: Record = match rec.and_then(|r| r.deserialize(Some(&headers))) {
                Ok(rec) => rec,
                Err(e) => {
                    trace!("skipping line: {e}");
                    bad += 1;
                    continue;
                }
            };

            let id = match clean_value(Some(rec.icao24)) {
                Some(id) if id.chars().all(|c| c.is_ascii_hexdigit()) => id,
                _ => {
                    bad += 1;
                    continue;
                }
            };
            let info = AircraftInfo {
                registration: clean_value(rec.registration),
                manufacturer: clean_value(rec.manufacturer),
                model: clean_value(rec.model),
                operator: clean_value(rec.operator),
            };
            db.insert(id.to_lowercase(), info);
        }
        if bad != 0 {
            warn!("{bad} malformed lines skipped");
        }
        Ok(AircraftDb { db })
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

impl ReferenceIndex for AircraftDb {
    fn lookup(&self, id: &str) -> Option<AircraftInfo> {
        self.db.get(&id.to_lowercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    const SAMPLE: &str = r##"'icao24','registration','manufacturericao','manufacturerName','model','operator'
'a1b2c3','N12345','BOEING','Boeing','737-8H4','Southwest Airlines'
'abcdef','N999ZZ','','','','unknown'
'c0ffee','','','Unknown','A320',''
"##;

    #[rstest]
    #[case(Some("'Boeing'"), Some("Boeing"))]
    #[case(Some("  \"Airbus\" "), Some("Airbus"))]
    #[case(Some("''"), None)]
    #[case(Some("   "), None)]
    #[case(Some("UNKNOWN"), None)]
    #[case(Some("Unknow"), None)]
    #[case(None, None)]
    fn test_clean_value(#[case] input: Option<&str>, #[case] out: Option<&str>) {
        assert_eq!(out.map(str::to_owned), clean_value(input.map(str::to_owned)));
    }

    #[test]
    fn test_load_sample() {
        let db = AircraftDb::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(3, db.len());

        let info = db.lookup("A1B2C3").unwrap();
        assert_eq!(Some("N12345".to_string()), info.registration);
        assert_eq!(Some("Boeing".to_string()), info.manufacturer);
        assert_eq!(Some("737-8H4".to_string()), info.model);
        assert_eq!(Some("Southwest Airlines".to_string()), info.operator);

        let info = db.lookup("abcdef").unwrap();
        assert_eq!(Some("N999ZZ".to_string()), info.registration);
        assert_eq!(None, info.operator);
        assert_eq!(None, info.model);

        let info = db.lookup("c0ffee").unwrap();
        assert_eq!(None, info.manufacturer);
        assert_eq!(Some("A320".to_string()), info.model);
    }

    #[test]
    fn test_lookup_miss() {
        let db = AircraftDb::from_reader(SAMPLE.as_bytes()).unwrap();
        assert!(db.lookup("000000").is_none());
        assert!(AircraftDb::new().lookup("a1b2c3").is_none());
    }

    #[test]
    fn test_load_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "{}", SAMPLE)?;
        writeln!(file, "'broken")?;

        let db = AircraftDb::load(file.path())?;
        assert_eq!(3, db.len());
        Ok(())
    }
}
