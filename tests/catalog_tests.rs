mod common;

use busmetric::{api::RouteDetails, catalog::{self, RouteCatalog}};
use common::{FakeTransit, route};

#[test]
fn build_tags_directions_test() {
    let api = FakeTransit::default().with_route(route(
        "70",
        &[(100, 38.90, -77.03), (200, 38.91, -77.03)],
        &[(300, 38.92, -77.02)],
    ));
    let catalog = RouteCatalog::build(&api, &["70".to_string()]).unwrap();

    let stops = catalog.stops("70").unwrap();
    assert_eq!(stops.len(), 3);
    assert_eq!(
        stops.iter().map(|stop| (stop.stop_id, stop.direction)).collect::<Vec<_>>(),
        vec![(100, 0), (200, 0), (300, 1)]
    );
    assert!(stops.iter().all(|stop| stop.route_id.as_ref() == "70"));
    assert_eq!(stops[0].lat(), 38.90);
    assert_eq!(api.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn build_decodes_service_payload_test() {
    let body = r#"{
        "RouteID": "70",
        "Name": "70 - SILVER SPRING - ARCHIVES",
        "Direction0": {"DirectionText": "NORTH", "TripHeadsign": "SILVER SPRING", "Stops": [
            {"StopID": "1001195", "Name": "7TH ST + E ST", "Lon": -77.0219, "Lat": 38.8960, "Routes": ["70"]}
        ]},
        "Direction1": {"DirectionText": "SOUTH", "TripHeadsign": "ARCHIVES", "Stops": [
            {"StopID": 1001196, "Name": "7TH ST + F ST", "Lon": -77.0220, "Lat": 38.8975, "Routes": ["70"]}
        ]}
    }"#;
    let details: RouteDetails = serde_json::from_str(body).unwrap();
    let api = FakeTransit::default().with_route(details);
    let catalog = RouteCatalog::build(&api, &["70".to_string()]).unwrap();

    assert_eq!(catalog.stop_ids(), vec![1001195, 1001196]);
    assert_eq!(catalog.stops("70").unwrap()[0].name.as_deref(), Some("7TH ST + E ST"));
}

#[test]
fn stop_ids_are_distinct_in_catalog_order_test() {
    let api = FakeTransit::default()
        .with_route(route("70", &[(100, 0.0, 0.0), (200, 0.0, 0.0)], &[(200, 0.0, 0.0)]))
        .with_route(route("79", &[(300, 0.0, 0.0), (100, 0.0, 0.0)], &[]));
    let catalog =
        RouteCatalog::build(&api, &["70".to_string(), "79".to_string()]).unwrap();

    assert_eq!(catalog.stop_ids(), vec![100, 200, 300]);
    assert_eq!(catalog.route_ids().collect::<Vec<_>>(), vec!["70", "79"]);
    assert!(catalog.is_bidirectional("70", 200));
    assert!(!catalog.is_bidirectional("70", 100));
    assert!(!catalog.is_bidirectional("79", 100));
}

#[test]
fn missing_direction_fails_whole_build_test() {
    let mut broken = route("79", &[(300, 0.0, 0.0)], &[]);
    broken.direction1 = None;
    let api = FakeTransit::default()
        .with_route(route("70", &[(100, 0.0, 0.0)], &[(200, 0.0, 0.0)]))
        .with_route(broken);

    let result = RouteCatalog::build(&api, &["70".to_string(), "79".to_string()]);
    match result {
        Err(catalog::Error::Malformed { route, .. }) => assert_eq!(route, "79"),
        other => panic!("expected malformed route 79, got {other:?}"),
    }
}

#[test]
fn non_numeric_stop_fails_build_test() {
    let body = r#"{"RouteID": "70", "Direction0": {"Stops": [{"StopID": "ABC", "Lat": 1.0, "Lon": 2.0}]},
        "Direction1": {"Stops": []}}"#;
    let details: RouteDetails = serde_json::from_str(body).unwrap();
    let api = FakeTransit::default().with_route(details);

    let result = RouteCatalog::build(&api, &["70".to_string()]);
    assert!(matches!(result, Err(catalog::Error::Malformed { .. })));
}

#[test]
fn unreachable_route_fails_build_test() {
    let api = FakeTransit::default().with_route(route("70", &[(100, 0.0, 0.0)], &[]));
    let result = RouteCatalog::build(&api, &["70".to_string(), "S2".to_string()]);
    match result {
        Err(err @ catalog::Error::CatalogFetch { .. }) => assert!(!err.is_auth()),
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[test]
fn rejected_credential_is_auth_test() {
    let api = FakeTransit {
        unauthorized: true,
        ..Default::default()
    };
    let err = RouteCatalog::build(&api, &["70".to_string()]).unwrap_err();
    assert!(err.is_auth());
}
