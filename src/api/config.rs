use std::time::Duration;

pub struct Config {
    pub transit_base_url: String,
    pub transit_api_key: String,
    pub weather_base_url: String,
    pub weather_api_key: String,
    pub weather_city: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transit_base_url: "https://api.wmata.com".into(),
            transit_api_key: String::new(),
            weather_base_url: "https://api.openweathermap.org".into(),
            weather_api_key: String::new(),
            weather_city: "Washington,DC,US".into(),
            timeout: Duration::from_secs(10),
        }
    }
}
