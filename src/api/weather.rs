use crate::api::{self, Config, WeatherApi, WeatherReport, client::fetch_json};
use reqwest::blocking::Client;

pub const UNKNOWN_CONDITION: &str = "unknown";

pub struct WeatherClient {
    client: Client,
    url: String,
    api_key: String,
    city: String,
}

impl WeatherClient {
    pub fn new(config: &Config) -> Result<Self, api::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: format!(
                "{}/data/2.5/weather",
                config.weather_base_url.trim_end_matches('/')
            ),
            api_key: config.weather_api_key.clone(),
            city: config.weather_city.clone(),
        })
    }
}

impl WeatherApi for WeatherClient {
    fn current(&self) -> Result<WeatherReport, api::Error> {
        let request = self.client.get(&self.url).query(&[
            ("q", self.city.as_str()),
            ("appid", self.api_key.as_str()),
        ]);
        fetch_json(request)
    }
}

impl WeatherReport {
    pub fn temperature_f(&self) -> f64 {
        kelvin_to_fahrenheit(self.main.temp)
    }

    pub fn condition(&self) -> &str {
        self.weather
            .first()
            .map(|condition| condition.main.as_str())
            .unwrap_or(UNKNOWN_CONDITION)
    }
}

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    (kelvin - 273.15) * 9.0 / 5.0 + 32.0
}

#[test]
fn kelvin_conversion_test() {
    assert!((kelvin_to_fahrenheit(273.15) - 32.0).abs() < 1e-9);
    assert!((kelvin_to_fahrenheit(373.15) - 212.0).abs() < 1e-9);
}

#[test]
fn weather_report_decoding_test() {
    let body = r#"{"main":{"temp":283.15,"humidity":80},"weather":[{"main":"Rain","description":"light rain"}],"name":"Washington"}"#;
    let report: WeatherReport = serde_json::from_str(body).unwrap();
    assert!((report.temperature_f() - 50.0).abs() < 1e-9);
    assert_eq!(report.condition(), "Rain");

    let body = r#"{"main":{"temp":283.15}}"#;
    let report: WeatherReport = serde_json::from_str(body).unwrap();
    assert_eq!(report.condition(), UNKNOWN_CONDITION);
}
