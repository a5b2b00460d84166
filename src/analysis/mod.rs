//! Offline resolution of predictions against observed arrivals.

mod quality;
pub use quality::*;

use crate::{
    shared::{geo::Coordinate, geo::Distance, minutes_between},
    store::PredictionRecord,
};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use std::{collections::HashMap, time::Instant};
use tracing::debug;

pub struct Config {
    /// Only join arrivals observed on the prediction's calendar day.
    pub same_day: bool,
    /// How close a bus must come to a stop to count as arrived.
    pub arrival_radius: Distance,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            same_day: true,
            arrival_radius: Distance::from_meters(50.0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Correlation {
    /// Non-arrival rows in id order with both actual columns recomputed.
    pub predictions: Vec<PredictionRecord>,
    pub arrivals: usize,
    /// Predictions that had more than one later arrival to choose from.
    pub ambiguous: usize,
}

impl Correlation {
    pub fn summary(&self) -> QualitySummary {
        QualitySummary::from_records(&self.predictions)
    }
}

/// Splits rows into `(arrivals, predictions)`.
pub fn partition(records: &[PredictionRecord]) -> (Vec<&PredictionRecord>, Vec<&PredictionRecord>) {
    records.iter().partition(|record| record.is_arrival())
}

type TripStop<'a> = (&'a str, u32);
type VehicleTrip<'a> = (&'a str, &'a str);

#[derive(Default)]
pub struct ArrivalCorrelator {
    config: Config,
}

impl ArrivalCorrelator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Same input table, same output table.
    pub fn correlate(&self, records: &[PredictionRecord]) -> Correlation {
        let now = Instant::now();
        let (arrivals, predictions) = partition(records);

        let mut arrival_times: HashMap<TripStop, Vec<NaiveDateTime>> = HashMap::new();
        for arrival in arrivals.iter() {
            arrival_times
                .entry((arrival.trip_id.as_str(), arrival.stop_id))
                .or_default()
                .push(arrival.observed_at);
        }
        arrival_times.values_mut().for_each(|times| {
            times.sort_unstable();
            times.dedup();
        });

        let mut sightings: HashMap<VehicleTrip, Vec<(NaiveDateTime, Coordinate)>> = HashMap::new();
        for record in records {
            if let Some(coordinate) = record.bus_coordinate() {
                sightings
                    .entry((record.vehicle_id.as_str(), record.trip_id.as_str()))
                    .or_default()
                    .push((record.observed_at, coordinate));
            }
        }
        sightings.values_mut().for_each(|sightings| {
            sightings.sort_by_key(|(observed_at, _)| *observed_at);
            sightings.dedup_by_key(|(observed_at, _)| *observed_at);
        });

        let resolved: Vec<(PredictionRecord, bool)> = predictions
            .par_iter()
            .map(|prediction| {
                let mut record = (*prediction).clone();
                let (method1, ambiguous) = self.nearest_arrival(prediction, &arrival_times);
                record.actual_minutes_method1 = method1;
                record.actual_minutes_method2 = self.proximity_arrival(prediction, &sightings);
                (record, ambiguous)
            })
            .collect();

        let ambiguous = resolved.iter().filter(|(_, ambiguous)| *ambiguous).count();
        let mut predictions: Vec<PredictionRecord> =
            resolved.into_iter().map(|(record, _)| record).collect();
        predictions.sort_by_key(|record| record.prediction_id);

        debug!(
            "Correlated {} predictions against {} arrivals in {:?}",
            predictions.len(),
            arrivals.len(),
            now.elapsed()
        );
        Correlation {
            predictions,
            arrivals: arrivals.len(),
            ambiguous,
        }
    }

    /// Minutes until the first arrival strictly after the prediction.
    fn nearest_arrival(
        &self,
        prediction: &PredictionRecord,
        arrival_times: &HashMap<TripStop, Vec<NaiveDateTime>>,
    ) -> (Option<f64>, bool) {
        let Some(times) = arrival_times.get(&(prediction.trip_id.as_str(), prediction.stop_id))
        else {
            return (None, false);
        };
        let later = &times[times.partition_point(|time| *time <= prediction.observed_at)..];
        let later: Vec<&NaiveDateTime> = later
            .iter()
            .take_while(|time| !self.config.same_day || time.date() == prediction.date())
            .collect();
        let minutes = later
            .first()
            .map(|time| minutes_between(prediction.observed_at, **time))
            .filter(|minutes| *minutes >= 0.0);
        (minutes, later.len() > 1)
    }

    /// Minutes until the same vehicle on the same trip was first seen
    /// within the arrival radius of the stop.
    fn proximity_arrival(
        &self,
        prediction: &PredictionRecord,
        sightings: &HashMap<VehicleTrip, Vec<(NaiveDateTime, Coordinate)>>,
    ) -> Option<f64> {
        let sightings =
            sightings.get(&(prediction.vehicle_id.as_str(), prediction.trip_id.as_str()))?;
        let stop = prediction.stop_coordinate();
        let start = sightings.partition_point(|(time, _)| *time <= prediction.observed_at);
        sightings[start..]
            .iter()
            .take_while(|(time, _)| !self.config.same_day || time.date() == prediction.date())
            .find(|(_, coordinate)| coordinate.is_within(&stop, self.config.arrival_radius))
            .map(|(time, _)| minutes_between(prediction.observed_at, *time))
    }
}
