use std::time::Duration;

use crate::poller::Config;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Per-call timing allowance for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    per_call_slack: Duration,
    per_worker_interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pacing {
    /// Call finished early, wait out the rest of its slot.
    Sleep(Duration),
    /// Call overran its slot by this much. Proceed without sleeping.
    OverBudget(Duration),
}

impl Budget {
    pub fn new(
        interval: Duration,
        fixed_overhead: Duration,
        stops_to_poll: usize,
        workers: usize,
        rate_ceiling: f64,
    ) -> Self {
        let workers = workers.max(1);
        let per_call_slack = match u32::try_from(stops_to_poll) {
            Ok(0) => Duration::ZERO,
            Ok(stops) => interval.saturating_sub(fixed_overhead) / stops,
            Err(_) => Duration::ZERO,
        };
        let spread = per_call_slack.saturating_mul(workers as u32);
        // workers / interval must never exceed the ceiling
        let floor = if rate_ceiling > 0.0 {
            Duration::from_secs_f64(workers as f64 / rate_ceiling)
        } else {
            Duration::ZERO
        };
        Self {
            per_call_slack,
            per_worker_interval: spread.max(floor),
        }
    }

    pub fn per_call_slack(&self) -> Duration {
        self.per_call_slack
    }

    pub fn per_worker_interval(&self) -> Duration {
        self.per_worker_interval
    }

    pub fn pace(&self, latency: Duration) -> Pacing {
        if latency <= self.per_worker_interval {
            Pacing::Sleep(self.per_worker_interval - latency)
        } else {
            Pacing::OverBudget(latency - self.per_worker_interval)
        }
    }
}

/// How much of the stop set a run can afford to poll each cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plan {
    pub stride: usize,
    pub stops_total: usize,
    pub stops_per_cycle: usize,
    pub calls_per_cycle: usize,
    pub sustainable_rate: f64,
    pub projected_daily_calls: u64,
    /// False when even polling a single stop per cycle exceeds the sustainable rate.
    pub fits: bool,
}

impl Plan {
    pub fn new(config: &Config, stops_total: usize, routes: usize, operating_seconds: u32) -> Self {
        let fixed_calls = fixed_calls(routes);
        let sustainable_rate =
            sustainable_rate(config.rate_ceiling, config.daily_quota, operating_seconds);
        let interval = config.interval.as_secs_f64();
        let rate_for = |stride: usize| {
            let calls = stops_total.div_ceil(stride) + fixed_calls;
            if interval > 0.0 {
                calls as f64 / interval
            } else {
                f64::INFINITY
            }
        };

        let cap = stops_total.max(1);
        let (stride, fits) = match config.skip {
            Some(skip) => {
                let stride = skip.clamp(1, cap);
                (stride, rate_for(stride) <= sustainable_rate)
            }
            None => match (1..=cap).find(|stride| rate_for(*stride) <= sustainable_rate) {
                Some(stride) => (stride, true),
                None => (cap, false),
            },
        };

        let stops_per_cycle = stops_total.div_ceil(stride);
        let calls_per_cycle = stops_per_cycle + fixed_calls;
        let projected_daily_calls = if interval > 0.0 {
            (calls_per_cycle as f64 * operating_seconds as f64 / interval).ceil() as u64
        } else {
            u64::MAX
        };
        Self {
            stride,
            stops_total,
            stops_per_cycle,
            calls_per_cycle,
            sustainable_rate,
            projected_daily_calls,
            fits,
        }
    }

    /// Offset into the stride for the given cycle.
    pub fn offset(&self, cycle: u64, rotate: bool) -> usize {
        if rotate {
            (cycle % self.stride as u64) as usize
        } else {
            0
        }
    }
}

/// Positions and incidents per route, plus one weather call.
pub fn fixed_calls(routes: usize) -> usize {
    2 * routes + 1
}

pub fn sustainable_rate(rate_ceiling: f64, daily_quota: u64, operating_seconds: u32) -> f64 {
    let operating_seconds = operating_seconds.clamp(1, SECONDS_PER_DAY);
    rate_ceiling.min(daily_quota as f64 / operating_seconds as f64)
}

/// Every `stride`th stop starting at `offset`.
pub fn select_stops(stop_ids: &[u32], stride: usize, offset: usize) -> Vec<u32> {
    let stride = stride.max(1);
    stop_ids
        .iter()
        .skip(offset % stride)
        .step_by(stride)
        .copied()
        .collect()
}

#[test]
fn slack_test() {
    let budget = Budget::new(Duration::from_secs(30), Duration::from_secs(2), 28, 1, 10.0);
    assert_eq!(budget.per_call_slack(), Duration::from_secs(1));
    assert_eq!(budget.per_worker_interval(), Duration::from_secs(1));
}

#[test]
fn pacing_sleeps_remainder_test() {
    let budget = Budget::new(Duration::from_secs(30), Duration::from_secs(2), 28, 1, 10.0);
    assert_eq!(
        budget.pace(Duration::from_millis(300)),
        Pacing::Sleep(Duration::from_millis(700))
    );
}

#[test]
fn pacing_over_budget_test() {
    let budget = Budget::new(Duration::from_secs(30), Duration::from_secs(2), 28, 1, 10.0);
    assert_eq!(
        budget.pace(Duration::from_millis(1500)),
        Pacing::OverBudget(Duration::from_millis(500))
    );
}

#[test]
fn overhead_larger_than_interval_test() {
    let budget = Budget::new(Duration::from_secs(1), Duration::from_secs(2), 5, 1, 0.0);
    assert_eq!(budget.per_call_slack(), Duration::ZERO);
    assert!(matches!(budget.pace(Duration::from_millis(1)), Pacing::OverBudget(_)));
}

#[test]
fn worker_rate_never_exceeds_ceiling_test() {
    // 300 stops in 28 seconds would be ~10.7 calls per second
    let budget = Budget::new(Duration::from_secs(30), Duration::from_secs(2), 300, 10, 10.0);
    let rate = 10.0 / budget.per_worker_interval().as_secs_f64();
    assert!(rate <= 10.0 + 1e-9);
}

#[test]
fn plan_derives_stride_test() {
    let config = Config::default();
    // 0.578 calls/s sustainable across a full day
    let plan = Plan::new(&config, 28, 1, SECONDS_PER_DAY);
    assert_eq!(plan.stride, 2);
    assert_eq!(plan.stops_per_cycle, 14);
    assert_eq!(plan.calls_per_cycle, 17);
    assert!(plan.fits);
    assert!(plan.projected_daily_calls <= config.daily_quota);
}

#[test]
fn plan_respects_skip_override_test() {
    let config = Config {
        skip: Some(4),
        ..Default::default()
    };
    let plan = Plan::new(&config, 10, 1, 3600);
    assert_eq!(plan.stride, 4);
    assert_eq!(plan.stops_per_cycle, 3);
}

#[test]
fn select_stops_test() {
    let stops = [1, 2, 3, 4, 5, 6, 7];
    assert_eq!(select_stops(&stops, 1, 0), vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(select_stops(&stops, 3, 0), vec![1, 4, 7]);
    assert_eq!(select_stops(&stops, 3, 1), vec![2, 5]);
    assert_eq!(select_stops(&stops, 3, 4), vec![2, 5]);
}
