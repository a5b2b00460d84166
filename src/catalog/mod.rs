mod entities;
pub use entities::*;

use crate::{
    api::{self, RouteDetails, RouteDirection, TransitApi},
    shared::geo::Coordinate,
};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Instant,
};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not fetch route details for {route}: {source}")]
    CatalogFetch {
        route: String,
        #[source]
        source: api::Error,
    },
    #[error("Route {route} has malformed details: {reason}")]
    Malformed { route: String, reason: String },
}

impl Error {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::CatalogFetch { source, .. } if source.is_fatal())
    }
}

/// Static stop lists for every polled route, built once per run.
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    routes: Vec<(Arc<str>, Box<[Stop]>)>,
    route_lookup: HashMap<Arc<str>, usize>,
    // (route index, stop id) -> number of direction entries
    direction_count: HashMap<(usize, u32), u8>,
}

impl RouteCatalog {
    pub fn new() -> Self {
        Default::default()
    }

    /// One route-details call per route. Any failure fails the whole build.
    pub fn build<A>(api: &A, route_ids: &[String]) -> Result<Self, self::Error>
    where
        A: TransitApi + ?Sized,
    {
        debug!("Building catalog for {} routes...", route_ids.len());
        let now = Instant::now();
        let mut catalog = Self::new();
        for route_id in route_ids {
            let details = api
                .route_details(route_id)
                .map_err(|source| Error::CatalogFetch {
                    route: route_id.clone(),
                    source,
                })?;
            let stops = stops_from_details(route_id, &details)?;
            debug!("Route {route_id} has {} stops", stops.len());
            catalog.insert_route(route_id, stops);
        }
        debug!("Building catalog took {:?}", now.elapsed());
        Ok(catalog)
    }

    /// Replaces any previous entry for the route.
    pub fn insert_route(&mut self, route_id: &str, stops: Vec<Stop>) {
        let route_id: Arc<str> = route_id.into();
        let index = match self.route_lookup.get(&route_id) {
            Some(index) => *index,
            None => {
                self.routes.push((route_id.clone(), Box::default()));
                self.route_lookup.insert(route_id.clone(), self.routes.len() - 1);
                self.routes.len() - 1
            }
        };
        self.direction_count.retain(|(route_idx, _), _| *route_idx != index);
        for stop in stops.iter() {
            *self.direction_count.entry((index, stop.stop_id)).or_default() += 1;
        }
        self.routes[index].1 = stops.into();
    }

    pub fn routes(&self) -> impl Iterator<Item = (&str, &[Stop])> {
        self.routes
            .iter()
            .map(|(route_id, stops)| (route_id.as_ref(), stops.as_ref()))
    }

    pub fn route_ids(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(route_id, _)| route_id.as_ref())
    }

    pub fn stops(&self, route_id: &str) -> Option<&[Stop]> {
        self.route_lookup
            .get(route_id)
            .map(|index| self.routes[*index].1.as_ref())
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// True when the stop is listed under both directions of the route.
    pub fn is_bidirectional(&self, route_id: &str, stop_id: u32) -> bool {
        self.route_lookup
            .get(route_id)
            .and_then(|index| self.direction_count.get(&(*index, stop_id)))
            .is_some_and(|count| *count > 1)
    }

    /// Distinct stop ids in enumeration order: routes as configured,
    /// direction 0 before 1, stops in service order.
    pub fn stop_ids(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        self.routes
            .iter()
            .flat_map(|(_, stops)| stops.iter())
            .filter(|stop| seen.insert(stop.stop_id))
            .map(|stop| stop.stop_id)
            .collect()
    }
}

fn stops_from_details(route_id: &str, details: &RouteDetails) -> Result<Vec<Stop>, self::Error> {
    let mut stops = stops_from_direction(route_id, 0, details.direction0.as_ref())?;
    stops.extend(stops_from_direction(route_id, 1, details.direction1.as_ref())?);
    Ok(stops)
}

fn stops_from_direction(
    route_id: &str,
    direction: u8,
    value: Option<&RouteDirection>,
) -> Result<Vec<Stop>, self::Error> {
    let malformed = |reason: String| Error::Malformed {
        route: route_id.to_string(),
        reason,
    };
    let value = value.ok_or_else(|| malformed(format!("direction {direction} is missing")))?;
    let stops = value
        .stops
        .as_ref()
        .ok_or_else(|| malformed(format!("direction {direction} has no stop list")))?;
    stops
        .iter()
        .map(|stop| {
            let stop_id = stop
                .stop_id
                .as_ref()
                .and_then(|id| id.as_u32())
                .ok_or_else(|| {
                    malformed(format!(
                        "direction {direction} has a non-numeric stop id {:?}",
                        stop.stop_id
                    ))
                })?;
            Ok(Stop {
                stop_id,
                route_id: route_id.into(),
                direction,
                name: stop.name.as_deref().map(Arc::from),
                coordinate: Coordinate::new(stop.lat, stop.lon),
            })
        })
        .collect()
}
