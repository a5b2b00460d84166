use std::path::PathBuf;

use crate::poller;

pub struct Config {
    pub routes: Vec<String>,
    pub output_dir: PathBuf,
    /// First local hour (inclusive) cycles may start in.
    pub start_hour: u32,
    /// Last local hour (exclusive). May be below `start_hour` to wrap midnight.
    pub end_hour: u32,
    pub max_cycles: Option<u64>,
    /// Continue ids above today's persisted rows.
    pub resume: bool,
    pub polling: poller::Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            output_dir: "data".into(),
            start_hour: 0,
            end_hour: 24,
            max_cycles: None,
            resume: true,
            polling: Default::default(),
        }
    }
}

impl Config {
    /// Equal start and end hours (including `0..24`) mean the whole day.
    pub fn is_operating(&self, hour: u32) -> bool {
        let (start, end) = (self.start_hour % 24, self.end_hour % 24);
        if start == end {
            true
        } else if start < end {
            (start..end).contains(&hour)
        } else {
            hour >= start || hour < end
        }
    }

    pub fn operating_seconds(&self) -> u32 {
        let (start, end) = (self.start_hour % 24, self.end_hour % 24);
        let hours = if start == end {
            24
        } else if start < end {
            end - start
        } else {
            24 - start + end
        };
        hours * 3600
    }
}

#[test]
fn operating_hours_test() {
    let config = Config {
        start_hour: 6,
        end_hour: 22,
        ..Default::default()
    };
    assert!(!config.is_operating(5));
    assert!(config.is_operating(6));
    assert!(config.is_operating(21));
    assert!(!config.is_operating(22));
    assert_eq!(config.operating_seconds(), 16 * 3600);
}

#[test]
fn overnight_hours_test() {
    let config = Config {
        start_hour: 22,
        end_hour: 2,
        ..Default::default()
    };
    assert!(config.is_operating(23));
    assert!(config.is_operating(1));
    assert!(!config.is_operating(12));
    assert_eq!(config.operating_seconds(), 4 * 3600);
}

#[test]
fn full_day_test() {
    let config = Config::default();
    assert!((0..24).all(|hour| config.is_operating(hour)));
    assert_eq!(config.operating_seconds(), 24 * 3600);
}
