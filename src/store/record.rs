use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::quality,
    shared::{geo::Coordinate, time::Time},
};

/// An assembled row that has not been given an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub route_id: String,
    pub direction: u8,
    pub stop_id: u32,
    pub stop_lat: f64,
    pub stop_lon: f64,
    pub vehicle_id: String,
    pub trip_id: String,
    pub bus_lat: Option<f64>,
    pub bus_lon: Option<f64>,
    pub deviation_minutes: Option<f64>,
    pub incident_flag: bool,
    pub observed_at: NaiveDateTime,
    pub temperature_f: f64,
    pub weather: String,
    pub predicted_minutes: f64,
}

impl Candidate {
    /// A zero-minute prediction is the feed reporting the bus at the stop.
    pub fn is_arrival(&self) -> bool {
        self.predicted_minutes == 0.0
    }
}

/// The persisted row. Column names are the field names.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub prediction_id: u64,
    pub route_id: String,
    pub direction: u8,
    pub stop_id: u32,
    pub stop_lat: f64,
    pub stop_lon: f64,
    pub vehicle_id: String,
    pub trip_id: String,
    pub bus_lat: Option<f64>,
    pub bus_lon: Option<f64>,
    #[serde(default)]
    pub deviation_minutes: Option<f64>,
    #[serde(default)]
    pub incident_flag: bool,
    pub observed_at: NaiveDateTime,
    pub temperature_f: f64,
    pub weather: String,
    pub predicted_minutes: f64,
    #[serde(default)]
    pub actual_minutes_method1: Option<f64>,
    #[serde(default)]
    pub actual_minutes_method2: Option<f64>,
}

impl PredictionRecord {
    pub fn from_candidate(prediction_id: u64, candidate: Candidate) -> Self {
        Self {
            prediction_id,
            route_id: candidate.route_id,
            direction: candidate.direction,
            stop_id: candidate.stop_id,
            stop_lat: candidate.stop_lat,
            stop_lon: candidate.stop_lon,
            vehicle_id: candidate.vehicle_id,
            trip_id: candidate.trip_id,
            bus_lat: candidate.bus_lat,
            bus_lon: candidate.bus_lon,
            deviation_minutes: candidate.deviation_minutes,
            incident_flag: candidate.incident_flag,
            observed_at: candidate.observed_at,
            temperature_f: candidate.temperature_f,
            weather: candidate.weather,
            predicted_minutes: candidate.predicted_minutes,
            actual_minutes_method1: None,
            actual_minutes_method2: None,
        }
    }

    pub fn is_arrival(&self) -> bool {
        self.predicted_minutes == 0.0
    }

    pub fn date(&self) -> NaiveDate {
        self.observed_at.date()
    }

    pub fn year(&self) -> i32 {
        self.observed_at.year()
    }

    pub fn month(&self) -> u32 {
        self.observed_at.month()
    }

    pub fn day(&self) -> u32 {
        self.observed_at.day()
    }

    pub fn time_of_day(&self) -> Time {
        self.observed_at.time().into()
    }

    pub fn stop_coordinate(&self) -> Coordinate {
        Coordinate::new(self.stop_lat, self.stop_lon)
    }

    pub fn bus_coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.bus_lat?, self.bus_lon?))
    }

    /// Accuracy against the zero-minute arrival signal.
    pub fn quality(&self) -> Option<f64> {
        quality(self.predicted_minutes, self.actual_minutes_method1?)
    }

    /// Accuracy against the proximity arrival signal.
    pub fn quality_method2(&self) -> Option<f64> {
        quality(self.predicted_minutes, self.actual_minutes_method2?)
    }
}
