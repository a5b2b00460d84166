//! Joins one cycle's raw feeds into prediction candidates.

use crate::{
    catalog::{RouteCatalog, Stop},
    poller::{Moment, Prediction, VehiclePosition},
    store::Candidate,
};
use std::collections::HashMap;

/// Produces one candidate per prediction of a polled route, in catalog
/// order: routes as configured, then stops as listed, then predictions as
/// the feed returned them.
///
/// Predictions for other routes serving the same stop are dropped. A
/// prediction whose vehicle has no position this cycle is kept with empty
/// bus fields. The output depends only on the inputs.
pub fn assemble(moment: &Moment, catalog: &RouteCatalog) -> Vec<Candidate> {
    let mut positions: HashMap<&str, &VehiclePosition> = HashMap::new();
    for position in moment.positions() {
        positions
            .entry(position.vehicle_id.as_str())
            .or_insert(position);
    }

    let mut candidates = Vec::new();
    for (route_id, stops) in catalog.routes() {
        let incident_flag = moment.has_incident(route_id);
        for stop in stops {
            let Some(predictions) = moment.predictions_by_stop.get(&stop.stop_id) else {
                continue;
            };
            let bidirectional = catalog.is_bidirectional(route_id, stop.stop_id);
            candidates.extend(
                predictions
                    .iter()
                    .filter(|prediction| prediction.route_id == route_id)
                    .filter(|prediction| {
                        !bidirectional || prediction.direction.unwrap_or(0) == stop.direction
                    })
                    .map(|prediction| {
                        let position = positions.get(prediction.vehicle_id.as_str()).copied();
                        candidate(moment, stop, prediction, position, incident_flag)
                    }),
            );
        }
    }
    candidates
}

fn candidate(
    moment: &Moment,
    stop: &Stop,
    prediction: &Prediction,
    position: Option<&VehiclePosition>,
    incident_flag: bool,
) -> Candidate {
    Candidate {
        route_id: stop.route_id.to_string(),
        direction: stop.direction,
        stop_id: stop.stop_id,
        stop_lat: stop.lat(),
        stop_lon: stop.lon(),
        vehicle_id: prediction.vehicle_id.clone(),
        trip_id: prediction.trip_id.clone(),
        bus_lat: position.map(|position| position.coordinate.latitude),
        bus_lon: position.map(|position| position.coordinate.longitude),
        deviation_minutes: position.and_then(|position| position.deviation_minutes),
        incident_flag,
        observed_at: moment.observed_at,
        temperature_f: moment.weather.temperature_f,
        weather: moment.weather.condition.clone(),
        predicted_minutes: prediction.minutes,
    }
}
