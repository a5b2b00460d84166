use crate::api::{
    self, BusIncident, BusIncidents, BusPosition, BusPositions, Config, NextBusPrediction,
    NextBusPredictions, RouteDetails, TransitApi,
};
use reqwest::{
    StatusCode,
    blocking::{Client, RequestBuilder},
};
use serde::de::DeserializeOwned;
use tracing::trace;

/// Blocking client for the transit agency's JSON bus endpoints.
pub struct TransitClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TransitClient {
    pub fn new(config: &Config) -> Result<Self, api::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.transit_base_url.trim_end_matches('/').to_string(),
            api_key: config.transit_api_key.clone(),
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, api::Error> {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("api_key", &self.api_key)
            .query(query);
        fetch_json(request)
    }
}

impl TransitApi for TransitClient {
    fn route_details(&self, route_id: &str) -> Result<RouteDetails, api::Error> {
        self.get("/Bus.svc/json/jRouteDetails", &[("RouteID", route_id)])
    }

    fn bus_positions(&self, route_id: &str) -> Result<Vec<BusPosition>, api::Error> {
        let positions: BusPositions =
            self.get("/Bus.svc/json/jBusPositions", &[("RouteID", route_id)])?;
        Ok(positions.bus_positions)
    }

    fn predictions(&self, stop_id: u32) -> Result<Vec<NextBusPrediction>, api::Error> {
        let stop_id = stop_id.to_string();
        let predictions: NextBusPredictions = self.get(
            "/NextBusService.svc/json/jPredictions",
            &[("StopID", stop_id.as_str())],
        )?;
        Ok(predictions.predictions)
    }

    fn incidents(&self, route_id: &str) -> Result<Vec<BusIncident>, api::Error> {
        let incidents: BusIncidents =
            self.get("/Incidents.svc/json/BusIncidents", &[("Route", route_id)])?;
        Ok(incidents.bus_incidents)
    }
}

pub(crate) fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, api::Error> {
    let response = request.send()?;
    check_status(response.status())?;
    let body = response.text()?;
    trace!("Received {} bytes", body.len());
    Ok(serde_json::from_str(&body)?)
}

pub(crate) fn check_status(status: StatusCode) -> Result<(), api::Error> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(api::Error::Auth(status.as_u16()))
    } else if !status.is_success() {
        Err(api::Error::Status(status.as_u16()))
    } else {
        Ok(())
    }
}

#[test]
fn auth_status_is_fatal() {
    let err = check_status(StatusCode::UNAUTHORIZED).unwrap_err();
    assert!(err.is_fatal());
    let err = check_status(StatusCode::FORBIDDEN).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn server_error_is_recoverable() {
    let err = check_status(StatusCode::SERVICE_UNAVAILABLE).unwrap_err();
    assert!(!err.is_fatal());
    assert!(check_status(StatusCode::OK).is_ok());
}
