use std::time::Duration;

pub struct Config {
    pub interval: Duration,
    /// Wall time reserved each cycle for the per-route and weather calls.
    pub fixed_overhead: Duration,
    pub workers: usize,
    /// Calls per second the transit service tolerates.
    pub rate_ceiling: f64,
    /// Calls per day the transit service tolerates.
    pub daily_quota: u64,
    /// Poll every nth stop. `None` derives the stride from the quotas.
    pub skip: Option<usize>,
    pub rotate_coverage: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            fixed_overhead: Duration::from_secs(2),
            workers: 10,
            rate_ceiling: 10.0,
            daily_quota: 50_000,
            skip: None,
            rotate_coverage: false,
        }
    }
}
