//! Per-client rate limiting for contact submissions.
//!
//! Tracks submission timestamps per client identity (best-effort network
//! address) over a sliding window. Clients without any usable identity all
//! land in one shared bucket, so they are still rate-limited, just coarsely.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Configuration for rate limiting.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Maximum submissions allowed in the time window.
    pub max_submissions: u32,
    /// Time window for counting submissions.
    pub window: Duration,
}

impl RateLimitConfig {
    /// Create a new rate limit configuration.
    pub fn new(max_submissions: u32, window_secs: u64) -> Self {
        Self {
            max_submissions,
            window: Duration::from_secs(window_secs),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: 5,
            window: Duration::from_secs(600),
        }
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Submission is allowed.
    Allowed,
    /// Submission is denied due to rate limit.
    Denied {
        /// Time until the rate limit resets.
        retry_after: Duration,
    },
}

impl RateLimitResult {
    /// Check if the submission is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed)
    }

    /// Remaining cooldown in whole seconds, rounded up. Zero when allowed.
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            RateLimitResult::Allowed => 0,
            RateLimitResult::Denied { retry_after } => {
                let secs = retry_after.as_secs();
                if retry_after.subsec_nanos() > 0 {
                    secs + 1
                } else {
                    secs.max(1)
                }
            }
        }
    }
}

/// Tracks submission timestamps for a single client.
#[derive(Debug)]
struct ClientWindow {
    /// Timestamps of recent submissions.
    timestamps: Vec<Instant>,
}

impl ClientWindow {
    fn new() -> Self {
        Self {
            timestamps: Vec::new(),
        }
    }

    /// Clean up old timestamps outside the window.
    fn cleanup(&mut self, window: Duration) {
        let now = Instant::now();
        self.timestamps
            .retain(|&t| now.duration_since(t) < window);
    }

    /// Count submissions within the window.
    fn count_in_window(&self, window: Duration) -> usize {
        let now = Instant::now();
        self.timestamps
            .iter()
            .filter(|&&t| now.duration_since(t) < window)
            .count()
    }

    /// Get the oldest timestamp in the window.
    fn oldest_in_window(&self, window: Duration) -> Option<Instant> {
        let now = Instant::now();
        self.timestamps
            .iter()
            .filter(|&&t| now.duration_since(t) < window)
            .min()
            .copied()
    }

    /// Record a new submission.
    fn record(&mut self) {
        self.timestamps.push(Instant::now());
    }
}

/// Sliding-window rate limiter keyed by client identity.
///
/// # Example
///
/// ```
/// use guichet::rate_limit::{RateLimitConfig, SubmissionRateLimiter};
///
/// let limiter = SubmissionRateLimiter::new(RateLimitConfig::new(5, 60));
/// assert!(limiter.check_and_record("203.0.113.7").is_allowed());
/// ```
#[derive(Debug)]
pub struct SubmissionRateLimiter {
    /// Rate limit configuration.
    config: RateLimitConfig,
    /// Per-client submission tracking.
    clients: RwLock<HashMap<String, ClientWindow>>,
}

impl SubmissionRateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Check admission for a client and record the submission if allowed.
    ///
    /// Returns `Denied` with the remaining cooldown (derived from the oldest
    /// submission still in the window) without recording. Never fails: lock
    /// poisoning is unreachable since no panic can occur under the lock.
    pub fn check_and_record(&self, identity: &str) -> RateLimitResult {
        let mut clients = self.clients.write().unwrap();
        let window = clients
            .entry(identity.to_string())
            .or_insert_with(ClientWindow::new);

        window.cleanup(self.config.window);

        let count = window.count_in_window(self.config.window);

        if count >= self.config.max_submissions as usize {
            if let Some(oldest) = window.oldest_in_window(self.config.window) {
                let elapsed = oldest.elapsed();
                let retry_after = if elapsed < self.config.window {
                    self.config.window - elapsed
                } else {
                    Duration::ZERO
                };
                return RateLimitResult::Denied { retry_after };
            }
        }

        window.record();
        RateLimitResult::Allowed
    }

    /// Check admission without recording.
    pub fn check(&self, identity: &str) -> RateLimitResult {
        let clients = self.clients.read().unwrap();

        if let Some(window) = clients.get(identity) {
            let count = window.count_in_window(self.config.window);

            if count >= self.config.max_submissions as usize {
                if let Some(oldest) = window.oldest_in_window(self.config.window) {
                    let elapsed = oldest.elapsed();
                    let retry_after = if elapsed < self.config.window {
                        self.config.window - elapsed
                    } else {
                        Duration::ZERO
                    };
                    return RateLimitResult::Denied { retry_after };
                }
            }
        }

        RateLimitResult::Allowed
    }

    /// Get the number of remaining submissions for a client.
    pub fn remaining(&self, identity: &str) -> u32 {
        let clients = self.clients.read().unwrap();

        if let Some(window) = clients.get(identity) {
            let count = window.count_in_window(self.config.window);
            self.config.max_submissions.saturating_sub(count as u32)
        } else {
            self.config.max_submissions
        }
    }

    /// Cleanup old entries for all clients.
    ///
    /// Call this periodically to free memory.
    pub fn cleanup(&self) {
        let mut clients = self.clients.write().unwrap();

        for window in clients.values_mut() {
            window.cleanup(self.config.window);
        }

        clients.retain(|_, window| !window.timestamps.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_config() {
        let config = RateLimitConfig::new(5, 60);
        assert_eq!(config.max_submissions, 5);
        assert_eq!(config.window, Duration::from_secs(60));
    }

    #[test]
    fn test_allows_under_limit() {
        let limiter = SubmissionRateLimiter::new(RateLimitConfig::new(3, 60));

        assert!(limiter.check_and_record("10.0.0.1").is_allowed());
        assert!(limiter.check_and_record("10.0.0.1").is_allowed());
        assert!(limiter.check_and_record("10.0.0.1").is_allowed());
    }

    #[test]
    fn test_denies_over_limit_with_cooldown() {
        let limiter = SubmissionRateLimiter::new(RateLimitConfig::new(2, 60));

        assert!(limiter.check_and_record("10.0.0.1").is_allowed());
        assert!(limiter.check_and_record("10.0.0.1").is_allowed());

        let result = limiter.check_and_record("10.0.0.1");
        assert!(!result.is_allowed());

        match result {
            RateLimitResult::Denied { retry_after } => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= Duration::from_secs(60));
            }
            _ => panic!("Expected Denied"),
        }
    }

    #[test]
    fn test_separate_identities() {
        let limiter = SubmissionRateLimiter::new(RateLimitConfig::new(2, 60));

        assert!(limiter.check_and_record("10.0.0.1").is_allowed());
        assert!(limiter.check_and_record("10.0.0.1").is_allowed());
        assert!(!limiter.check_and_record("10.0.0.1").is_allowed());

        // A different identity has its own window
        assert!(limiter.check_and_record("10.0.0.2").is_allowed());
        assert!(limiter.check_and_record("10.0.0.2").is_allowed());
    }

    #[test]
    fn test_shared_bucket_for_unknown_identity() {
        // Callers without identity information all share one bucket
        let limiter = SubmissionRateLimiter::new(RateLimitConfig::new(2, 60));

        assert!(limiter.check_and_record("unknown").is_allowed());
        assert!(limiter.check_and_record("unknown").is_allowed());
        assert!(!limiter.check_and_record("unknown").is_allowed());
    }

    #[test]
    fn test_window_elapses() {
        let limiter = SubmissionRateLimiter::new(RateLimitConfig::new(1, 1));

        assert!(limiter.check_and_record("10.0.0.1").is_allowed());
        assert!(!limiter.check_and_record("10.0.0.1").is_allowed());

        std::thread::sleep(Duration::from_millis(1100));

        assert!(limiter.check_and_record("10.0.0.1").is_allowed());
    }

    #[test]
    fn test_check_without_record() {
        let limiter = SubmissionRateLimiter::new(RateLimitConfig::new(2, 60));

        assert!(limiter.check("10.0.0.1").is_allowed());
        assert!(limiter.check("10.0.0.1").is_allowed());
        assert!(limiter.check("10.0.0.1").is_allowed());

        // Nothing was recorded
        assert_eq!(limiter.remaining("10.0.0.1"), 2);
    }

    #[test]
    fn test_remaining_count() {
        let limiter = SubmissionRateLimiter::new(RateLimitConfig::new(5, 60));

        assert_eq!(limiter.remaining("10.0.0.1"), 5);

        limiter.check_and_record("10.0.0.1");
        assert_eq!(limiter.remaining("10.0.0.1"), 4);

        limiter.check_and_record("10.0.0.1");
        limiter.check_and_record("10.0.0.1");
        assert_eq!(limiter.remaining("10.0.0.1"), 2);
    }

    #[test]
    fn test_cleanup_removes_idle_clients() {
        let limiter = SubmissionRateLimiter::new(RateLimitConfig::new(5, 1));

        limiter.check_and_record("10.0.0.1");
        std::thread::sleep(Duration::from_millis(1100));
        limiter.cleanup();

        assert_eq!(limiter.remaining("10.0.0.1"), 5);
    }

    #[test]
    fn test_retry_after_secs_rounds_up() {
        let denied = RateLimitResult::Denied {
            retry_after: Duration::from_millis(1500),
        };
        assert_eq!(denied.retry_after_secs(), 2);

        let denied = RateLimitResult::Denied {
            retry_after: Duration::from_millis(200),
        };
        assert_eq!(denied.retry_after_secs(), 1);

        assert_eq!(RateLimitResult::Allowed.retry_after_secs(), 0);
    }

    #[test]
    fn test_concurrent_same_identity_no_lost_updates() {
        use std::sync::Arc;

        let limiter = Arc::new(SubmissionRateLimiter::new(RateLimitConfig::new(50, 60)));
        let mut handles = Vec::new();

        for _ in 0..10 {
            let limiter = limiter.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..5 {
                    limiter.check_and_record("10.0.0.1");
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // All 50 submissions were counted; the window is exactly full
        assert_eq!(limiter.remaining("10.0.0.1"), 0);
        assert!(!limiter.check_and_record("10.0.0.1").is_allowed());
    }
}
