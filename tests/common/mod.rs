#![allow(dead_code)]

use busmetric::api::{
    self, BusIncident, BusPosition, NextBusPrediction, RawId, RouteDetails, RouteDirection,
    RouteStop, TransitApi, WeatherApi, WeatherCondition, WeatherMain, WeatherReport,
};
use busmetric::store::Candidate;
use chrono::{NaiveDate, NaiveDateTime};
use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

#[derive(Default)]
pub struct FakeTransit {
    pub routes: HashMap<String, RouteDetails>,
    pub positions: HashMap<String, Vec<BusPosition>>,
    pub predictions: HashMap<u32, Vec<NextBusPrediction>>,
    pub incidents: HashMap<String, Vec<BusIncident>>,
    pub failing_stops: HashSet<u32>,
    pub failing_positions: HashSet<String>,
    pub unauthorized: bool,
    pub calls: AtomicUsize,
    pub polled_stops: Mutex<Vec<u32>>,
    pub call_times: Mutex<Vec<Instant>>,
    /// Added to every predictions call.
    pub latency: Duration,
}

impl FakeTransit {
    pub fn with_route(mut self, details: RouteDetails) -> Self {
        self.routes.insert(details.route_id.clone(), details);
        self
    }

    pub fn with_predictions(mut self, stop_id: u32, predictions: Vec<NextBusPrediction>) -> Self {
        self.predictions.insert(stop_id, predictions);
        self
    }

    pub fn with_positions(mut self, route_id: &str, positions: Vec<BusPosition>) -> Self {
        self.positions.insert(route_id.to_string(), positions);
        self
    }

    pub fn polled_stops(&self) -> Vec<u32> {
        let mut stops = self.polled_stops.lock().unwrap().clone();
        stops.sort_unstable();
        stops
    }

    /// Most calls landing in any one-second window.
    pub fn busiest_second(&self) -> usize {
        let mut times = self.call_times.lock().unwrap().clone();
        times.sort_unstable();
        (0..times.len())
            .map(|i| {
                times[i..]
                    .iter()
                    .take_while(|time| time.duration_since(times[i]) < Duration::from_secs(1))
                    .count()
            })
            .max()
            .unwrap_or(0)
    }

    fn check_auth(&self) -> Result<(), api::Error> {
        self.call_times.lock().unwrap().push(Instant::now());
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unauthorized {
            Err(api::Error::Auth(401))
        } else {
            Ok(())
        }
    }
}

impl TransitApi for FakeTransit {
    fn route_details(&self, route_id: &str) -> Result<RouteDetails, api::Error> {
        self.check_auth()?;
        self.routes
            .get(route_id)
            .cloned()
            .ok_or(api::Error::Status(404))
    }

    fn bus_positions(&self, route_id: &str) -> Result<Vec<BusPosition>, api::Error> {
        self.check_auth()?;
        if self.failing_positions.contains(route_id) {
            return Err(api::Error::Status(500));
        }
        Ok(self.positions.get(route_id).cloned().unwrap_or_default())
    }

    fn predictions(&self, stop_id: u32) -> Result<Vec<NextBusPrediction>, api::Error> {
        self.check_auth()?;
        self.polled_stops.lock().unwrap().push(stop_id);
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        if self.failing_stops.contains(&stop_id) {
            return Err(api::Error::Malformed(format!("stop {stop_id} timed out")));
        }
        Ok(self.predictions.get(&stop_id).cloned().unwrap_or_default())
    }

    fn incidents(&self, route_id: &str) -> Result<Vec<BusIncident>, api::Error> {
        self.check_auth()?;
        Ok(self.incidents.get(route_id).cloned().unwrap_or_default())
    }
}

pub struct FakeWeather {
    pub report: Option<WeatherReport>,
}

impl FakeWeather {
    /// 50 F and raining.
    pub fn rain() -> Self {
        Self {
            report: Some(WeatherReport {
                main: WeatherMain { temp: 283.15 },
                weather: vec![WeatherCondition {
                    main: "Rain".into(),
                    description: None,
                }],
            }),
        }
    }

    pub fn down() -> Self {
        Self { report: None }
    }
}

impl WeatherApi for FakeWeather {
    fn current(&self) -> Result<WeatherReport, api::Error> {
        self.report.clone().ok_or(api::Error::Status(503))
    }
}

pub fn route(route_id: &str, direction0: &[(u32, f64, f64)], direction1: &[(u32, f64, f64)]) -> RouteDetails {
    let direction = |stops: &[(u32, f64, f64)]| RouteDirection {
        direction_text: None,
        trip_headsign: None,
        stops: Some(
            stops
                .iter()
                .map(|(stop_id, lat, lon)| RouteStop {
                    stop_id: Some(RawId::Text(stop_id.to_string())),
                    name: None,
                    lat: *lat,
                    lon: *lon,
                })
                .collect(),
        ),
    };
    RouteDetails {
        route_id: route_id.to_string(),
        name: None,
        direction0: Some(direction(direction0)),
        direction1: Some(direction(direction1)),
    }
}

/// A one-direction route with `count` stops numbered from `first_stop`.
pub fn long_route(route_id: &str, first_stop: u32, count: u32) -> RouteDetails {
    let stops: Vec<(u32, f64, f64)> = (0..count)
        .map(|i| (first_stop + i, 38.90 + i as f64 * 0.001, -77.03))
        .collect();
    route(route_id, &stops, &[])
}

pub fn prediction(route_id: &str, vehicle_id: &str, trip_id: &str, minutes: f64) -> NextBusPrediction {
    NextBusPrediction {
        route_id: route_id.to_string(),
        direction_num: None,
        direction_text: None,
        minutes,
        vehicle_id: vehicle_id.to_string(),
        trip_id: trip_id.to_string(),
    }
}

pub fn position(vehicle_id: &str, route_id: &str, lat: f64, lon: f64) -> BusPosition {
    BusPosition {
        vehicle_id: vehicle_id.to_string(),
        route_id: route_id.to_string(),
        trip_id: None,
        lat,
        lon,
        deviation: Some(1.5),
        direction_text: Some("NORTH".into()),
    }
}

pub fn at(date: (i32, u32, u32), hms: (u32, u32, u32)) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .and_then(|date| date.and_hms_opt(hms.0, hms.1, hms.2))
        .unwrap()
}

/// Fresh directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "busmetric-{name}-{}-{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn candidate(stop_id: u32, vehicle_id: &str, trip_id: &str, observed_at: NaiveDateTime, minutes: f64) -> Candidate {
    Candidate {
        route_id: "70".into(),
        direction: 0,
        stop_id,
        stop_lat: 38.90,
        stop_lon: -77.03,
        vehicle_id: vehicle_id.into(),
        trip_id: trip_id.into(),
        bus_lat: None,
        bus_lon: None,
        deviation_minutes: None,
        incident_flag: false,
        observed_at,
        temperature_f: 50.0,
        weather: "Rain".into(),
        predicted_minutes: minutes,
    }
}
