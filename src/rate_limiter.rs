//! Blocking rate limiter for the MusicBrainz web service.
//!
//! MusicBrainz asks clients to keep at least one second between requests.
//! One limiter is owned by each [`GenreFetcher`](crate::musicbrainz::GenreFetcher)
//! and every request it issues (any entity, any album, every retry) goes
//! through it, so the spacing is global for the process.

use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// Interval MusicBrainz asks anonymous clients to respect.
pub const MUSICBRAINZ_INTERVAL: Duration = Duration::from_secs(1);

/// A rate limiter that enforces a minimum interval between requests.
pub struct RateLimiter {
    name: String,
    last_request: Option<Instant>,
    interval: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter.
    ///
    /// * `name` — label for log messages (e.g. "MusicBrainz")
    /// * `interval` — minimum time between the start of two requests
    pub fn new(name: &str, interval: Duration) -> Self {
        RateLimiter {
            name: name.to_string(),
            last_request: None,
            interval,
        }
    }

    /// Convenience: create a rate limiter from an interval in milliseconds.
    pub fn from_millis(name: &str, millis: u64) -> Self {
        Self::new(name, Duration::from_millis(millis))
    }

    /// The limiter MusicBrainz expects: one request per second.
    pub fn musicbrainz() -> Self {
        Self::new("MusicBrainz", MUSICBRAINZ_INTERVAL)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep if not enough time has elapsed since the last request.
    /// Must be called *before* making a request.
    pub fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                let wait_time = self.interval - elapsed;
                debug!(
                    "[{}] Rate limiting: waiting {:.1}s",
                    self.name,
                    wait_time.as_secs_f64()
                );
                thread::sleep(wait_time);
            }
        }
        self.last_request = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_does_not_wait() {
        let mut rl = RateLimiter::from_millis("test", 500);
        let start = Instant::now();
        rl.wait_if_needed();
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[test]
    fn test_consecutive_requests_are_spaced() {
        let mut rl = RateLimiter::from_millis("test", 60);
        let start = Instant::now();
        rl.wait_if_needed();
        rl.wait_if_needed();
        rl.wait_if_needed();
        assert!(start.elapsed() >= Duration::from_millis(120));
    }

    #[test]
    fn test_zero_interval_never_sleeps() {
        let mut rl = RateLimiter::new("test", Duration::ZERO);
        let start = Instant::now();
        for _ in 0..100 {
            rl.wait_if_needed();
        }
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[test]
    fn test_musicbrainz_interval() {
        assert_eq!(RateLimiter::musicbrainz().interval(), Duration::from_secs(1));
    }
}
