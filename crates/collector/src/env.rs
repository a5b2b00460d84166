use busmetric::{api, collector};
use std::{env, path::PathBuf, str::FromStr, time::Duration};

const API_KEY: &str = "BUSMETRIC_API_KEY";
const WEATHER_KEY: &str = "BUSMETRIC_WEATHER_KEY";
const WEATHER_CITY: &str = "BUSMETRIC_WEATHER_CITY";
const ROUTES: &str = "BUSMETRIC_ROUTES";
const INTERVAL: &str = "BUSMETRIC_INTERVAL";
const WORKERS: &str = "BUSMETRIC_WORKERS";
const SKIP: &str = "BUSMETRIC_SKIP";
const HOURS: &str = "BUSMETRIC_HOURS";
const MAX_CYCLES: &str = "BUSMETRIC_MAX_CYCLES";
const OUTPUT: &str = "BUSMETRIC_OUTPUT";

pub fn api_config() -> Result<api::Config, String> {
    let mut config = api::Config {
        transit_api_key: required(API_KEY)?,
        weather_api_key: env::var(WEATHER_KEY).unwrap_or_default(),
        ..Default::default()
    };
    if let Ok(city) = env::var(WEATHER_CITY) {
        config.weather_city = city;
    }
    Ok(config)
}

pub fn collector_config() -> Result<collector::Config, String> {
    let routes: Vec<String> = required(ROUTES)?
        .split(',')
        .map(str::trim)
        .filter(|route| !route.is_empty())
        .map(String::from)
        .collect();
    if routes.is_empty() {
        return Err(format!("{ROUTES} lists no routes"));
    }

    let mut config = collector::Config {
        routes,
        ..Default::default()
    };
    if let Some(interval) = optional::<u64>(INTERVAL)? {
        config.polling.interval = Duration::from_secs(interval);
    }
    if let Some(workers) = optional::<usize>(WORKERS)? {
        config.polling.workers = workers.max(1);
    }
    config.polling.skip = optional::<usize>(SKIP)?;
    config.max_cycles = optional::<u64>(MAX_CYCLES)?;
    if let Ok(output) = env::var(OUTPUT) {
        config.output_dir = PathBuf::from(output);
    }
    if let Ok(hours) = env::var(HOURS) {
        let (start, end) = hours
            .split_once('-')
            .ok_or_else(|| format!("{HOURS} must look like 6-22, got {hours}"))?;
        config.start_hour = parse(HOURS, start)?;
        config.end_hour = parse(HOURS, end)?;
    }
    Ok(config)
}

fn required(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("Missing {name} environment variable"))
}

fn optional<T: FromStr>(name: &str) -> Result<Option<T>, String> {
    match env::var(name) {
        Ok(value) => parse(name, &value).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse<T: FromStr>(name: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("Could not parse {name} value {value:?}"))
}
