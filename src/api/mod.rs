use thiserror::Error;

mod client;
mod config;
pub mod models;
mod weather;

pub use client::*;
pub use config::*;
pub use models::*;
pub use weather::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Credential rejected with status {0}")]
    Auth(u16),
    #[error("Unexpected response status {0}")]
    Status(u16),
    #[error("Http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl Error {
    /// Only a rejected credential ends the run, everything else is per call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Read side of the transit agency's bus service.
pub trait TransitApi: Sync {
    fn route_details(&self, route_id: &str) -> Result<RouteDetails, self::Error>;
    fn bus_positions(&self, route_id: &str) -> Result<Vec<BusPosition>, self::Error>;
    fn predictions(&self, stop_id: u32) -> Result<Vec<NextBusPrediction>, self::Error>;
    fn incidents(&self, route_id: &str) -> Result<Vec<BusIncident>, self::Error>;
}

pub trait WeatherApi: Sync {
    fn current(&self) -> Result<WeatherReport, self::Error>;
}
