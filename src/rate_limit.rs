//! Fixed-window rate limiting across all searches
//!
//! Time is cut into buckets of `window` width; the bucket id is
//! `floor(now / window)`. Each bucket counts upstream attempts and stops
//! admitting new ones once `max_requests` is reached. Buckets whose reset
//! time has passed are pruned whenever a request is recorded.

use crate::clock::duration_millis;
use crate::config::RateLimitConfig;
use crate::{FlightError, RateLimitSnapshot};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct RateLimitWindow {
    count: u32,
    reset_time: i64, // epoch ms
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<i64, RateLimitWindow>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn window_millis(&self) -> i64 {
        duration_millis(self.config.window).max(1)
    }

    fn window_id(&self, now_ms: i64) -> i64 {
        now_ms.div_euclid(self.window_millis())
    }

    fn reset_time(&self, window_id: i64) -> i64 {
        window_id.saturating_add(1).saturating_mul(self.window_millis())
    }

    /// Reject if the current window is already full; records nothing
    pub fn check(&self, now_ms: i64) -> Result<(), FlightError> {
        let id = self.window_id(now_ms);
        let windows = self.windows.lock();
        match windows.get(&id) {
            Some(window) if window.count >= self.config.max_requests => {
                Err(FlightError::RateLimited {
                    reset_time: window.reset_time,
                })
            }
            _ => Ok(()),
        }
    }

    /// Check and count one request under a single lock
    pub fn try_acquire(&self, now_ms: i64) -> Result<RateLimitSnapshot, FlightError> {
        let id = self.window_id(now_ms);
        let reset_time = self.reset_time(id);
        let max_requests = self.config.max_requests;

        let mut windows = self.windows.lock();
        let window = windows.entry(id).or_insert(RateLimitWindow {
            count: 0,
            reset_time,
        });

        if window.count >= max_requests {
            return Err(FlightError::RateLimited {
                reset_time: window.reset_time,
            });
        }
        window.count += 1;
        let snapshot = RateLimitSnapshot {
            remaining: max_requests - window.count,
            reset_time: window.reset_time,
        };

        let before = windows.len();
        windows.retain(|_, window| window.reset_time > now_ms);
        if windows.len() != before {
            debug!(pruned = before - windows.len(), "Pruned stale rate-limit windows");
        }

        Ok(snapshot)
    }

    /// Remaining requests in the window containing `now_ms`
    pub fn status(&self, now_ms: i64) -> RateLimitSnapshot {
        let id = self.window_id(now_ms);
        let windows = self.windows.lock();
        let count = windows.get(&id).map_or(0, |window| window.count);
        RateLimitSnapshot {
            remaining: self.config.max_requests.saturating_sub(count),
            reset_time: self.reset_time(id),
        }
    }

    #[cfg(test)]
    fn tracked_windows(&self) -> usize {
        self.windows.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests,
        })
    }

    #[test]
    fn test_counts_down_within_window() {
        let limiter = limiter(3);
        let now = 120_500;
        assert_eq!(limiter.try_acquire(now).unwrap().remaining, 2);
        assert_eq!(limiter.try_acquire(now + 10).unwrap().remaining, 1);
        let snapshot = limiter.try_acquire(now + 20).unwrap();
        assert_eq!(snapshot.remaining, 0);
        assert_eq!(snapshot.reset_time, 180_000);

        match limiter.try_acquire(now + 30) {
            Err(FlightError::RateLimited { reset_time }) => assert_eq!(reset_time, 180_000),
            other => panic!("expected rate limit, got {:?}", other),
        }
        assert!(limiter.check(now + 40).is_err());
    }

    #[test]
    fn test_check_does_not_record() {
        let limiter = limiter(1);
        for _ in 0..5 {
            assert!(limiter.check(1_000).is_ok());
        }
        assert_eq!(limiter.status(1_000).remaining, 1);
    }

    #[test]
    fn test_rollover_resets_and_prunes() {
        let limiter = limiter(1);
        limiter.try_acquire(1_000).unwrap();
        assert!(limiter.try_acquire(2_000).is_err());

        // next window
        let snapshot = limiter.try_acquire(61_000).unwrap();
        assert_eq!(snapshot.remaining, 0);
        assert_eq!(snapshot.reset_time, 120_000);
        assert_eq!(limiter.tracked_windows(), 1);
    }

    #[test]
    fn test_status_for_untouched_window() {
        let limiter = limiter(10);
        let status = limiter.status(59_999);
        assert_eq!(status.remaining, 10);
        assert_eq!(status.reset_time, 60_000);
    }

    #[test]
    fn test_oversized_window_still_limits() {
        let limiter = RateLimiter::new(RateLimitConfig {
            window: Duration::from_secs(u64::MAX),
            max_requests: 2,
        });
        let now = 1_900_000_000_000;
        limiter.try_acquire(now).unwrap();
        let snapshot = limiter.try_acquire(now + 1).unwrap();
        assert_eq!(snapshot.remaining, 0);
        assert_eq!(snapshot.reset_time, i64::MAX);

        assert!(limiter.check(now + 86_400_000).is_err());
        assert!(limiter.try_acquire(now + 86_400_000).is_err());
    }
}
