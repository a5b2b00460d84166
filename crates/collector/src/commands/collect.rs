use crate::env;
use busmetric::prelude::*;
use std::time::Instant;
use tracing::info;

pub fn collect() -> Result<(), String> {
    let api_config = env::api_config()?;
    let config = env::collector_config()?;

    let transit = TransitClient::new(&api_config).map_err(|err| err.to_string())?;
    let weather = WeatherClient::new(&api_config).map_err(|err| err.to_string())?;

    info!(
        "Collecting routes {} every {:?} into {}",
        config.routes.join(", "),
        config.polling.interval,
        config.output_dir.display()
    );
    let now = Instant::now();
    let mut collector =
        Collector::new(&transit, &weather, &config).map_err(|err| err.to_string())?;
    let summary = collector.run().map_err(|err| err.to_string())?;
    info!(
        "Ran {} cycles ({} over budget), stored {} records in {:?}",
        summary.cycles,
        summary.over_budget_cycles,
        summary.records,
        now.elapsed()
    );
    Ok(())
}
