mod config;
pub use config::*;

use crate::{
    api::{TransitApi, WeatherApi},
    assembler,
    catalog::{self, RouteCatalog},
    poller::{self, Plan, Poller},
    store::{self, DailySink, RecordStore},
};
use chrono::{Local, Timelike};
use std::{
    thread,
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::Error),
    #[error("Polling error: {0}")]
    Poll(#[from] poller::Error),
    #[error("Store error: {0}")]
    Store(#[from] store::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub records: usize,
    pub over_budget_cycles: u64,
}

/// Drives cycles one after another on the calling thread and owns the
/// accumulated table.
pub struct Collector<'a, T: ?Sized, W: ?Sized> {
    transit: &'a T,
    weather: &'a W,
    config: &'a Config,
    sink: DailySink,
    store: RecordStore,
}

impl<'a, T, W> Collector<'a, T, W>
where
    T: TransitApi + ?Sized,
    W: WeatherApi + ?Sized,
{
    pub fn new(transit: &'a T, weather: &'a W, config: &'a Config) -> Result<Self, self::Error> {
        let sink = DailySink::new(&config.output_dir)?;
        let store = if config.resume {
            let records = sink.load_predictions(Local::now().date_naive())?;
            if !records.is_empty() {
                info!("Resuming after {} persisted records", records.len());
            }
            RecordStore::resume(records)
        } else {
            RecordStore::new()
        };
        Ok(Self {
            transit,
            weather,
            config,
            sink,
            store,
        })
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Runs until `max_cycles` or the operating-hours gate stops it. Only
    /// catalog and credential failures end the run early.
    pub fn run(&mut self) -> Result<RunSummary, self::Error> {
        let catalog = RouteCatalog::build(self.transit, &self.config.routes).inspect_err(|err| {
            error!("Could not build route catalog: {err}");
        })?;
        let plan = Plan::new(
            &self.config.polling,
            catalog.stop_ids().len(),
            catalog.route_count(),
            self.config.operating_seconds(),
        );
        log_plan(&plan, &self.config.polling);

        let mut poller =
            Poller::new(self.transit, self.weather, &self.config.polling)?.with_plan(plan);
        let interval = self.config.polling.interval;
        let mut summary = RunSummary::default();

        loop {
            if self
                .config
                .max_cycles
                .is_some_and(|max| summary.cycles >= max)
            {
                debug!("Reached {} cycles", summary.cycles);
                break;
            }
            let hour = Local::now().hour();
            if !self.config.is_operating(hour) {
                info!("Hour {hour} is outside operating hours, stopping");
                break;
            }

            let started = Instant::now();
            let appended = self.run_cycle(&mut poller, &catalog, interval)?;
            summary.cycles += 1;
            summary.records += appended;

            if self
                .config
                .max_cycles
                .is_some_and(|max| summary.cycles >= max)
            {
                continue;
            }
            let elapsed = started.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            } else {
                summary.over_budget_cycles += 1;
                warn!(
                    "BudgetExceeded: cycle took {:?}, {:?} over its interval",
                    elapsed,
                    elapsed - interval
                );
            }
        }
        Ok(summary)
    }

    /// Poll, assemble, append, persist. Returns the number of new records.
    pub fn run_cycle(
        &mut self,
        poller: &mut Poller<'_, T, W>,
        catalog: &RouteCatalog,
        interval: Duration,
    ) -> Result<usize, self::Error> {
        let moment = poller.poll(catalog, interval).inspect_err(|err| {
            error!("Cycle aborted: {err}");
        })?;
        let candidates = assembler::assemble(&moment, catalog);
        let appended = self.store.append(candidates);
        let count = appended.len();

        if let Err(err) = self.sink.append_predictions(appended) {
            warn!("Could not persist {count} predictions: {err}");
        }
        if let Err(err) = self.sink.append_positions(moment.observed_at, moment.positions()) {
            warn!("Could not persist positions: {err}");
        }
        debug!("Store holds {} records", self.store.len());
        Ok(count)
    }
}

fn log_plan(plan: &Plan, config: &poller::Config) {
    info!(
        "Polling {} of {} stops per cycle (stride {}), {} calls per cycle, ~{} calls per day",
        plan.stops_per_cycle,
        plan.stops_total,
        plan.stride,
        plan.calls_per_cycle,
        plan.projected_daily_calls
    );
    if !plan.fits {
        warn!(
            "Even stride {} exceeds the sustainable {:.3} calls per second",
            plan.stride, plan.sustainable_rate
        );
    }
    if plan.projected_daily_calls > config.daily_quota {
        warn!(
            "Projected {} calls per day exceeds the daily quota of {}",
            plan.projected_daily_calls, config.daily_quota
        );
    }
}
