pub mod geo;
pub mod time;

pub use geo::*;
pub use time::*;

use chrono::NaiveDateTime;

/// Signed number of minutes from `from` to `to`.
pub fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

#[test]
fn minutes_between_test() {
    let from = NaiveDateTime::parse_from_str("2015-03-04 18:40:00", "%Y-%m-%d %H:%M:%S").unwrap();
    let to = NaiveDateTime::parse_from_str("2015-03-04 18:45:30", "%Y-%m-%d %H:%M:%S").unwrap();
    assert_eq!(minutes_between(from, to), 5.5);
    assert_eq!(minutes_between(to, from), -5.5);
}
