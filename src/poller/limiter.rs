use std::{
    sync::Mutex,
    thread,
    time::{Duration, Instant},
};

/// Hands out call slots at least `1 / rate_ceiling` apart, across every
/// thread that shares it.
#[derive(Debug)]
pub struct RateLimiter {
    gap: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(rate_ceiling: f64) -> Self {
        let gap = if rate_ceiling > 0.0 {
            Duration::from_secs_f64(1.0 / rate_ceiling)
        } else {
            Duration::ZERO
        };
        Self {
            gap,
            last: Mutex::new(None),
        }
    }

    pub fn gap(&self) -> Duration {
        self.gap
    }

    /// Blocks until the next slot is free and claims it. The lock is held
    /// while sleeping so waiters are served one slot at a time.
    pub fn wait(&self) {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.gap {
                thread::sleep(self.gap - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

#[test]
fn slots_are_spaced_test() {
    let limiter = RateLimiter::new(50.0);
    assert_eq!(limiter.gap(), Duration::from_millis(20));

    let started = Instant::now();
    for _ in 0..6 {
        limiter.wait();
    }
    // First slot is free, the other five wait one gap each
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[test]
fn unlimited_test() {
    let limiter = RateLimiter::new(0.0);
    let started = Instant::now();
    for _ in 0..100 {
        limiter.wait();
    }
    assert!(started.elapsed() < Duration::from_secs(1));
}
