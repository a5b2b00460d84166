use serde::{Deserialize, Serialize};

/// Identifiers arrive as either JSON numbers or numeric strings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            RawId::Number(value) => u32::try_from(*value).ok(),
            RawId::Text(value) => value.trim().parse().ok(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct RouteDetails {
    #[serde(rename = "RouteID")]
    pub route_id: String,
    pub name: Option<String>,
    pub direction0: Option<RouteDirection>,
    pub direction1: Option<RouteDirection>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct RouteDirection {
    pub direction_text: Option<String>,
    pub trip_headsign: Option<String>,
    pub stops: Option<Vec<RouteStop>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct RouteStop {
    #[serde(rename = "StopID")]
    pub stop_id: Option<RawId>,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct BusPositions {
    #[serde(default)]
    pub bus_positions: Vec<BusPosition>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct BusPosition {
    #[serde(rename = "VehicleID")]
    pub vehicle_id: String,
    #[serde(rename = "RouteID")]
    pub route_id: String,
    #[serde(rename = "TripID")]
    pub trip_id: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub deviation: Option<f64>,
    pub direction_text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct NextBusPredictions {
    pub stop_name: Option<String>,
    #[serde(default)]
    pub predictions: Vec<NextBusPrediction>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct NextBusPrediction {
    #[serde(rename = "RouteID")]
    pub route_id: String,
    pub direction_num: Option<RawId>,
    pub direction_text: Option<String>,
    pub minutes: f64,
    #[serde(rename = "VehicleID")]
    pub vehicle_id: String,
    #[serde(rename = "TripID")]
    pub trip_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct BusIncidents {
    #[serde(default)]
    pub bus_incidents: Vec<BusIncident>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct BusIncident {
    #[serde(rename = "IncidentID")]
    pub incident_id: Option<String>,
    pub incident_type: Option<String>,
    #[serde(default)]
    pub routes_affected: Vec<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WeatherReport {
    pub main: WeatherMain,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WeatherMain {
    /// Kelvin
    pub temp: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WeatherCondition {
    pub main: String,
    pub description: Option<String>,
}
