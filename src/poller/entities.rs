use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::{
    api::{BusPosition, NextBusPrediction, UNKNOWN_CONDITION, WeatherReport},
    shared::geo::Coordinate,
};

/// Where a vehicle was during one cycle. Superseded every cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct VehiclePosition {
    pub vehicle_id: String,
    pub route_id: String,
    pub trip_id: Option<String>,
    pub coordinate: Coordinate,
    /// Minutes behind (positive) or ahead of (negative) schedule.
    pub deviation_minutes: Option<f64>,
    pub direction_text: String,
}

impl From<BusPosition> for VehiclePosition {
    fn from(value: BusPosition) -> Self {
        Self {
            vehicle_id: value.vehicle_id,
            route_id: value.route_id,
            trip_id: value.trip_id,
            coordinate: Coordinate::new(value.lat, value.lon),
            deviation_minutes: value.deviation,
            direction_text: value.direction_text.unwrap_or_default(),
        }
    }
}

/// One entry of a stop's next-arrival list.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub stop_id: u32,
    pub route_id: String,
    pub direction: Option<u8>,
    pub vehicle_id: String,
    pub trip_id: String,
    pub minutes: f64,
}

impl Prediction {
    pub fn new(stop_id: u32, value: NextBusPrediction) -> Self {
        Self {
            stop_id,
            route_id: value.route_id,
            direction: value
                .direction_num
                .as_ref()
                .and_then(|num| num.as_u32())
                .and_then(|num| u8::try_from(num).ok()),
            vehicle_id: value.vehicle_id,
            trip_id: value.trip_id,
            minutes: value.minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub temperature_f: f64,
    pub condition: String,
}

impl Weather {
    /// Stamped on every row of a cycle whose weather call failed.
    pub fn unknown() -> Self {
        Self {
            temperature_f: 0.0,
            condition: UNKNOWN_CONDITION.to_string(),
        }
    }
}

impl From<&WeatherReport> for Weather {
    fn from(value: &WeatherReport) -> Self {
        Self {
            temperature_f: value.temperature_f(),
            condition: value.condition().to_string(),
        }
    }
}

/// Everything one polling cycle gathered.
#[derive(Debug, Clone)]
pub struct Moment {
    pub observed_at: NaiveDateTime,
    pub positions_by_route: BTreeMap<String, Vec<VehiclePosition>>,
    pub predictions_by_stop: BTreeMap<u32, Vec<Prediction>>,
    pub weather: Weather,
    pub incidents_by_route: BTreeMap<String, bool>,
    pub failed_calls: usize,
}

impl Moment {
    pub fn new(observed_at: NaiveDateTime) -> Self {
        Self {
            observed_at,
            positions_by_route: BTreeMap::new(),
            predictions_by_stop: BTreeMap::new(),
            weather: Weather::unknown(),
            incidents_by_route: BTreeMap::new(),
            failed_calls: 0,
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = &VehiclePosition> {
        self.positions_by_route.values().flatten()
    }

    pub fn has_incident(&self, route_id: &str) -> bool {
        self.incidents_by_route
            .get(route_id)
            .copied()
            .unwrap_or(false)
    }

    pub fn prediction_count(&self) -> usize {
        self.predictions_by_stop.values().map(Vec::len).sum()
    }
}
