use chrono::{NaiveTime, Timelike};

/// Wall-clock time of day, stored as seconds since midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(u32);

impl From<NaiveTime> for Time {
    fn from(value: NaiveTime) -> Self {
        Self(value.num_seconds_from_midnight())
    }
}

impl Time {
    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_num_seconds_from_midnight_opt(self.0, 0)
    }

    pub fn to_hms_string(&self) -> String {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        format!("{:02}:{:02}:{:02}", h, m, s)
    }

    pub fn from_hms(time: &str) -> Option<Self> {
        const HOUR_TO_SEC: u32 = 60 * 60;
        const MINUTE_TO_SEC: u32 = 60;
        let mut split = time.trim().split(':');
        let hours: u32 = split.next()?.parse().ok()?;
        let hours = hours.checked_mul(HOUR_TO_SEC)?;
        let minutes: u32 = split.next()?.parse().ok()?;
        let minutes = minutes.checked_mul(MINUTE_TO_SEC)?;
        let seconds: u32 = split.next()?.parse().ok()?;
        if split.next().is_some() {
            return None;
        }
        let seconds = hours.checked_add(minutes)?.checked_add(seconds)?;
        Some(Self(seconds))
    }
}

#[test]
fn parse_unparse_1() {
    let time = "00:00:00";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_2() {
    let time = "12:30:30";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn valid_time_test() {
    let time = "01:01:30";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 3690);
}

#[test]
fn invalid_time_test_1() {
    let time = "00:00:0a";
    assert!(Time::from_hms(time).is_none())
}

#[test]
fn invalid_time_test_2() {
    let time = "00:00";
    assert!(Time::from_hms(time).is_none())
}

#[test]
fn overflowing_time_test() {
    assert!(Time::from_hms("2000000:00:00").is_none());
    assert!(Time::from_hms("1193046:28:16").is_none());
    assert!(Time::from_hms("00:4294967295:00").is_none());
}

#[test]
fn from_naive_time_test() {
    let naive = NaiveTime::from_hms_opt(18, 43, 21).unwrap();
    let time = Time::from(naive);
    assert_eq!(time.to_hms_string(), "18:43:21");
    assert_eq!(time.to_naive_time(), Some(naive));
}
