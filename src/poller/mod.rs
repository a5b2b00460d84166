mod budget;
mod config;
mod entities;
mod limiter;

pub use budget::*;
pub use config::*;
pub use entities::*;
pub use limiter::*;

use crate::{
    api::{self, NextBusPrediction, TransitApi, WeatherApi},
    catalog::RouteCatalog,
};
use chrono::Local;
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transit service rejected the credential: {0}")]
    Auth(#[source] api::Error),
    #[error("Could not build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

type StopResult = (u32, Result<Vec<NextBusPrediction>, api::Error>);

/// Runs one polling cycle at a time against the transit and weather services
/// while keeping the request rate under the configured ceiling.
pub struct Poller<'a, T: ?Sized, W: ?Sized> {
    transit: &'a T,
    weather: &'a W,
    config: &'a Config,
    pool: ThreadPool,
    limiter: RateLimiter,
    plan: Option<Plan>,
    cycle: u64,
}

impl<'a, T, W> Poller<'a, T, W>
where
    T: TransitApi + ?Sized,
    W: WeatherApi + ?Sized,
{
    pub fn new(transit: &'a T, weather: &'a W, config: &'a Config) -> Result<Self, self::Error> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers.max(1))
            .thread_name(|i| format!("poller-{i}"))
            .build()?;
        Ok(Self {
            transit,
            weather,
            config,
            pool,
            limiter: RateLimiter::new(config.rate_ceiling),
            plan: None,
            cycle: 0,
        })
    }

    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Polls positions, incidents and weather, then the selected stops.
    /// Every transit call, route or stop, takes a slot from one shared
    /// limiter. Only an authentication failure aborts the cycle.
    pub fn poll(&mut self, catalog: &RouteCatalog, interval: Duration) -> Result<Moment, self::Error> {
        let started = Instant::now();
        let mut moment = Moment::new(Local::now().naive_local());

        for route_id in catalog.route_ids() {
            self.limiter.wait();
            let positions = match self.transit.bus_positions(route_id) {
                Ok(positions) => positions.into_iter().map(VehiclePosition::from).collect(),
                Err(err) if err.is_fatal() => return Err(Error::Auth(err)),
                Err(err) => {
                    warn!("Positions call for route {route_id} failed: {err}");
                    moment.failed_calls += 1;
                    Vec::new()
                }
            };
            moment
                .positions_by_route
                .insert(route_id.to_string(), positions);

            self.limiter.wait();
            let incident = match self.transit.incidents(route_id) {
                Ok(incidents) => incidents
                    .iter()
                    .any(|incident| incident.routes_affected.iter().any(|route| route == route_id)),
                Err(err) if err.is_fatal() => return Err(Error::Auth(err)),
                Err(err) => {
                    warn!("Incidents call for route {route_id} failed: {err}");
                    moment.failed_calls += 1;
                    false
                }
            };
            moment
                .incidents_by_route
                .insert(route_id.to_string(), incident);
        }

        moment.weather = match self.weather.current() {
            Ok(report) => Weather::from(&report),
            Err(err) => {
                warn!("Weather call failed, stamping unknown: {err}");
                moment.failed_calls += 1;
                Weather::unknown()
            }
        };

        let stop_ids = catalog.stop_ids();
        let plan = match self.plan {
            Some(plan) => plan,
            None => Plan::new(self.config, stop_ids.len(), catalog.route_count(), 24 * 60 * 60),
        };
        let offset = plan.offset(self.cycle, self.config.rotate_coverage);
        let selected = select_stops(&stop_ids, plan.stride, offset);
        let budget = Budget::new(
            interval,
            self.config.fixed_overhead,
            selected.len(),
            self.config.workers,
            self.config.rate_ceiling,
        );
        debug!(
            "Polling {} of {} stops, {:?} per worker call",
            selected.len(),
            stop_ids.len(),
            budget.per_worker_interval()
        );

        for (stop_id, result) in self.poll_stops(&selected, &budget) {
            let predictions = match result {
                Ok(predictions) => predictions
                    .into_iter()
                    .map(|prediction| Prediction::new(stop_id, prediction))
                    .collect(),
                Err(err) if err.is_fatal() => return Err(Error::Auth(err)),
                Err(err) => {
                    warn!("Predictions call for stop {stop_id} failed: {err}");
                    moment.failed_calls += 1;
                    Vec::new()
                }
            };
            moment.predictions_by_stop.insert(stop_id, predictions);
        }

        self.cycle += 1;
        info!(
            "Cycle {} polled {} stops, {} predictions, {} failed calls in {:?}",
            self.cycle,
            selected.len(),
            moment.prediction_count(),
            moment.failed_calls,
            started.elapsed()
        );
        Ok(moment)
    }

    /// Worker `w` takes the stops at positions `w, w + workers, ...`.
    fn poll_stops(&self, selected: &[u32], budget: &Budget) -> Vec<StopResult> {
        let workers = self.config.workers.max(1);
        let abort = AtomicBool::new(false);
        let transit = self.transit;
        let limiter = &self.limiter;
        let per_worker: Vec<Vec<StopResult>> = self.pool.install(|| {
            (0..workers)
                .into_par_iter()
                .map(|worker| {
                    let stops: Vec<u32> =
                        selected.iter().skip(worker).step_by(workers).copied().collect();
                    let mut results = Vec::with_capacity(stops.len());
                    for (i, stop_id) in stops.iter().enumerate() {
                        if abort.load(Ordering::Relaxed) {
                            break;
                        }
                        limiter.wait();
                        let now = Instant::now();
                        let result = transit.predictions(*stop_id);
                        if matches!(&result, Err(err) if err.is_fatal()) {
                            abort.store(true, Ordering::Relaxed);
                        }
                        results.push((*stop_id, result));
                        if i + 1 == stops.len() {
                            break;
                        }
                        match budget.pace(now.elapsed()) {
                            Pacing::Sleep(remaining) => thread::sleep(remaining),
                            Pacing::OverBudget(over) => {
                                warn!("BudgetExceeded: stop {stop_id} ran {over:?} past its slot")
                            }
                        }
                    }
                    results
                })
                .collect()
        });
        per_worker.into_iter().flatten().collect()
    }
}
