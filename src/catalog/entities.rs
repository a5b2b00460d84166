use std::sync::Arc;

use crate::shared::geo::Coordinate;

/// A stop as served by one direction of one route.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Numeric stop identifier used as the join key for predictions.
    pub stop_id: u32,
    pub route_id: Arc<str>,
    /// Either 0 or 1, the slot the route details listed the stop under.
    pub direction: u8,
    pub name: Option<Arc<str>>,
    pub coordinate: Coordinate,
}

impl Stop {
    pub fn new(stop_id: u32, route_id: &str, direction: u8, coordinate: Coordinate) -> Self {
        Self {
            stop_id,
            route_id: route_id.into(),
            direction,
            name: None,
            coordinate,
        }
    }

    pub fn lat(&self) -> f64 {
        self.coordinate.latitude
    }

    pub fn lon(&self) -> f64 {
        self.coordinate.longitude
    }
}
