mod common;

use busmetric::{
    collector::{self, Collector},
    poller,
    store::DailySink,
};
use chrono::Local;
use common::{FakeTransit, FakeWeather, position, prediction, route, temp_dir};
use std::{fs, path::Path, sync::atomic::Ordering, time::Duration};

fn transit() -> FakeTransit {
    FakeTransit::default()
        .with_route(route(
            "70",
            &[(100, 38.90, -77.03), (200, 38.91, -77.03)],
            &[(300, 38.92, -77.03)],
        ))
        .with_predictions(
            100,
            vec![
                prediction("70", "V1", "T1", 5.0),
                prediction("79", "V9", "T9", 1.0),
            ],
        )
        .with_predictions(300, vec![prediction("70", "V2", "T2", 0.0)])
        .with_positions("70", vec![position("V1", "70", 1.0, 2.0)])
}

fn config(output_dir: &Path, max_cycles: u64) -> collector::Config {
    collector::Config {
        routes: vec!["70".to_string()],
        output_dir: output_dir.to_path_buf(),
        max_cycles: Some(max_cycles),
        polling: poller::Config {
            interval: Duration::ZERO,
            fixed_overhead: Duration::ZERO,
            workers: 2,
            rate_ceiling: 10_000.0,
            skip: Some(1),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn run_persists_every_cycle_test() {
    let dir = temp_dir("collector-run");
    let transit = transit();
    let weather = FakeWeather::rain();
    let config = config(&dir, 3);
    let mut collector = Collector::new(&transit, &weather, &config).unwrap();

    let summary = collector.run().unwrap();
    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.records, 6);

    let ids: Vec<u64> = collector
        .store()
        .records()
        .iter()
        .map(|record| record.prediction_id)
        .collect();
    assert_eq!(ids, (1..=6).collect::<Vec<u64>>());
    let first = &collector.store().records()[0];
    assert_eq!((first.stop_id, first.vehicle_id.as_str()), (100, "V1"));
    assert_eq!((first.bus_lat, first.bus_lon), (Some(1.0), Some(2.0)));
    assert_eq!(first.weather, "Rain");

    let sink = DailySink::new(&dir).unwrap();
    let today = Local::now().date_naive();
    assert_eq!(sink.load_predictions(today).unwrap(), collector.store().records());
    let positions = fs::read_to_string(sink.positions_path(today)).unwrap();
    assert_eq!(positions.lines().count(), 4);
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn resumed_run_continues_ids_test() {
    let dir = temp_dir("collector-resume");
    let transit = transit();
    let weather = FakeWeather::rain();
    let config = config(&dir, 1);

    Collector::new(&transit, &weather, &config)
        .unwrap()
        .run()
        .unwrap();
    let mut resumed = Collector::new(&transit, &weather, &config).unwrap();
    assert_eq!(resumed.store().next_id(), 3);
    resumed.run().unwrap();

    let ids: Vec<u64> = resumed
        .store()
        .records()
        .iter()
        .map(|record| record.prediction_id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn fresh_run_ignores_persisted_rows_test() {
    let dir = temp_dir("collector-fresh");
    let transit = transit();
    let weather = FakeWeather::rain();
    let mut config = config(&dir, 1);

    Collector::new(&transit, &weather, &config)
        .unwrap()
        .run()
        .unwrap();
    config.resume = false;
    let collector = Collector::new(&transit, &weather, &config).unwrap();
    assert_eq!(collector.store().next_id(), 1);
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn unknown_route_fails_before_polling_test() {
    let dir = temp_dir("collector-catalog");
    let transit = transit();
    let weather = FakeWeather::rain();
    let mut config = config(&dir, 1);
    config.routes.push("S2".to_string());

    let mut collector = Collector::new(&transit, &weather, &config).unwrap();
    let result = collector.run();
    assert!(matches!(result, Err(collector::Error::Catalog(_))));
    assert!(transit.polled_stops().is_empty());
    assert!(collector.store().is_empty());
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn rejected_credential_ends_run_test() {
    let dir = temp_dir("collector-auth");
    let catalog_only = FakeTransit {
        unauthorized: true,
        ..Default::default()
    };
    let weather = FakeWeather::down();
    let config = config(&dir, 1);

    let mut collector = Collector::new(&catalog_only, &weather, &config).unwrap();
    let result = collector.run();
    assert!(matches!(result, Err(collector::Error::Catalog(err)) if err.is_auth()));
    assert_eq!(catalog_only.calls.load(Ordering::SeqCst), 1);
    fs::remove_dir_all(dir).unwrap();
}
