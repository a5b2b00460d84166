//! File revisions of the predictions table.
//!
//! Columns are always matched by header name, never by position, so files
//! written by different revisions can be loaded side by side.

use crate::{
    shared::time::Time,
    store::{self, PredictionRecord},
};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{Reader, StringRecord};
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Abbreviated columns (`PID`, `PA`, `AA1`, ...) with split `Date`/`TOD`.
    V1,
    /// Current columns, one per [`PredictionRecord`] field.
    V2,
}

impl SchemaVersion {
    pub fn detect(headers: &StringRecord) -> Option<Self> {
        let has = |name: &str| headers.iter().any(|header| header.trim() == name);
        if has("prediction_id") {
            Some(Self::V2)
        } else if has("PID") {
            Some(Self::V1)
        } else {
            None
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
struct LegacyRecord {
    #[serde(rename = "PID")]
    pid: f64,
    #[serde(rename = "Route")]
    route: String,
    #[serde(rename = "Direction")]
    direction: Option<String>,
    #[serde(rename = "StopID")]
    stop_id: f64,
    #[serde(rename = "StopLat")]
    stop_lat: f64,
    #[serde(rename = "StopLon")]
    stop_lon: f64,
    #[serde(rename = "BusID")]
    bus_id: String,
    #[serde(rename = "TripID")]
    trip_id: String,
    #[serde(rename = "BusLat")]
    bus_lat: Option<f64>,
    #[serde(rename = "BusLon")]
    bus_lon: Option<f64>,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "TOD")]
    tod: String,
    #[serde(rename = "Temp")]
    temp: Option<f64>,
    #[serde(rename = "Weather")]
    weather: Option<String>,
    #[serde(rename = "PA")]
    pa: f64,
    #[serde(rename = "AA1")]
    aa1: Option<f64>,
    #[serde(rename = "AA2")]
    aa2: Option<f64>,
}

impl LegacyRecord {
    fn migrate(self, line: u64) -> Result<PredictionRecord, store::Error> {
        let fail = |reason: String| store::Error::Migration { line, reason };
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|err| fail(format!("bad Date {:?}: {err}", self.date)))?;
        let time = Time::from_hms(&self.tod)
            .and_then(|time| time.to_naive_time())
            .ok_or_else(|| fail(format!("bad TOD {:?}", self.tod)))?;
        if self.pid < 0.0 || self.stop_id < 0.0 {
            return Err(fail("negative id".into()));
        }
        // Older files stored the direction text, which carries no number
        let direction = self
            .direction
            .as_deref()
            .and_then(|value| value.trim().parse::<f64>().ok())
            .map(|value| value as u8)
            .unwrap_or(0);
        Ok(PredictionRecord {
            prediction_id: self.pid as u64,
            route_id: self.route,
            direction,
            stop_id: self.stop_id as u32,
            stop_lat: self.stop_lat,
            stop_lon: self.stop_lon,
            vehicle_id: self.bus_id,
            trip_id: self.trip_id,
            bus_lat: self.bus_lat,
            bus_lon: self.bus_lon,
            deviation_minutes: None,
            incident_flag: false,
            observed_at: NaiveDateTime::new(date, time),
            temperature_f: self.temp.unwrap_or(0.0),
            weather: self.weather.unwrap_or_else(|| "unknown".into()),
            predicted_minutes: self.pa,
            actual_minutes_method1: self.aa1,
            actual_minutes_method2: self.aa2,
        })
    }
}

/// Reads any known revision and normalizes it to the current record.
pub fn load_records<R: Read>(reader: R, source: &Path) -> Result<Vec<PredictionRecord>, store::Error> {
    let mut rdr = Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let version = SchemaVersion::detect(&headers)
        .ok_or_else(|| store::Error::UnknownSchema(source.to_path_buf()))?;
    debug!("{} uses schema {:?}", source.display(), version);

    let mut records = Vec::new();
    match version {
        SchemaVersion::V2 => {
            for result in rdr.deserialize() {
                let record: PredictionRecord = result?;
                records.push(record);
            }
        }
        SchemaVersion::V1 => {
            let mut raw = StringRecord::new();
            while rdr.read_record(&mut raw)? {
                let line = raw.position().map(|position| position.line()).unwrap_or(0);
                let legacy: LegacyRecord = raw.deserialize(Some(&headers))?;
                records.push(legacy.migrate(line)?);
            }
        }
    }
    Ok(records)
}

pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<PredictionRecord>, store::Error> {
    let file = File::open(path.as_ref())?;
    load_records(file, path.as_ref())
}

/// Concatenates files in the given order.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PredictionRecord>, store::Error> {
    let mut records = Vec::new();
    for path in paths {
        records.extend(load_file(path)?);
    }
    Ok(records)
}

/// Writes a complete table in the current revision.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[PredictionRecord]) -> Result<(), store::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
