//! Fixed-window request counting per credential.

use crate::error::RateLimitError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sluice_commons::CredentialId;
use sluice_configs::RateLimitSettings;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How far past `max_requests` a window admits.
///
/// The admission check reads the counter before the current request is
/// recorded, so a quota of `max_requests` admits `max_requests + 1`
/// requests between window resets. Deployed quotas were tuned against that
/// behaviour, so it is kept; set this to 0 to reject at exactly
/// `max_requests`.
pub const OVER_LIMIT_ALLOWANCE: u32 = 1;

/// Per-credential counter for one window.
#[derive(Debug, Clone)]
struct WindowEntry {
    window_start: Instant,
    /// Window length captured when the entry was created, refreshed on
    /// window reset. Mid-window, this ttl governs, not the caller's.
    ttl: Duration,
    count: u32,
}

impl WindowEntry {
    /// End of this window, or `None` when the ttl overflows the monotonic
    /// clock. A window with no representable end never elapses.
    fn window_end(&self) -> Option<Instant> {
        self.window_start.checked_add(self.ttl)
    }
}

/// Statistics snapshot for a [`RateLimiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterStats {
    /// Credentials with a live window entry.
    pub tracked_credentials: usize,
    /// Requests admitted since construction.
    pub admitted: u64,
    /// Requests rejected since construction.
    pub rejected: u64,
}

/// Fixed-window rate limiter keyed by caller credential.
///
/// Each credential gets an independent window: the first request opens it,
/// subsequent requests increment its counter, and once the window elapses
/// the next request resets it. Windows are anchored to monotonic time, so
/// wall-clock adjustments never shrink or stretch them.
///
/// Construct one limiter per protected operation (see `LimiterRegistry`);
/// instances share nothing.
pub struct RateLimiter {
    settings: RateLimitSettings,
    entries: DashMap<CredentialId, WindowEntry>,
    admitted: AtomicU64,
    rejected: AtomicU64,
}

impl RateLimiter {
    /// Creates a limiter with default settings.
    pub fn new() -> Self {
        Self::with_config(&RateLimitSettings::default())
    }

    /// Creates a limiter with the given quota settings.
    pub fn with_config(settings: &RateLimitSettings) -> Self {
        Self {
            settings: settings.clone(),
            entries: DashMap::new(),
            admitted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Admits or rejects one request under this limiter's configured quota.
    #[inline]
    pub fn check(&self, credential: &CredentialId) -> Result<(), RateLimitError> {
        self.check_and_increment(credential, self.settings.max_requests, self.settings.window())
    }

    /// Admits or rejects one request, counting it against the credential's
    /// current window.
    ///
    /// A credential's first request creates its entry with a count of 1 and
    /// is admitted. After that, the counter is checked against
    /// `max_requests` (plus [`OVER_LIMIT_ALLOWANCE`]) before the request is
    /// recorded: a rejected request advances neither the counter nor the
    /// window, and the error carries the remaining wait. An admitted
    /// request whose window has already elapsed resets the window first.
    ///
    /// `ttl` applies when a window is created or reset; an entry mid-window
    /// keeps the ttl it was opened with.
    pub fn check_and_increment(
        &self,
        credential: &CredentialId,
        max_requests: u32,
        ttl: Duration,
    ) -> Result<(), RateLimitError> {
        let now = Instant::now();
        let reject_at = max_requests.saturating_add(OVER_LIMIT_ALLOWANCE);

        match self.entries.entry(credential.clone()) {
            Entry::Vacant(vacant) => {
                vacant.insert(WindowEntry {
                    window_start: now,
                    ttl,
                    count: 1,
                });
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                let window_end = entry.window_end();

                if entry.count >= reject_at && window_end.map_or(true, |end| now < end) {
                    self.rejected.fetch_add(1, Ordering::Relaxed);
                    return Err(RateLimitError::Exceeded {
                        retry_after: window_end
                            .map_or(entry.ttl, |end| end.saturating_duration_since(now)),
                    });
                }

                if window_end.map_or(false, |end| now > end) {
                    entry.window_start = now;
                    entry.count = 0;
                    entry.ttl = ttl;
                }
                entry.count += 1;
            }
        }

        self.admitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Current in-window count for a credential, if tracked.
    #[inline]
    pub fn window_count(&self, credential: &CredentialId) -> Option<u32> {
        self.entries.get(credential).map(|entry| entry.count)
    }

    /// Removes entries whose window has fully elapsed and returns how many
    /// were dropped. Entries still inside their window survive, idle or not.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.window_end().map_or(true, |end| now <= end));
        before.saturating_sub(self.entries.len())
    }

    /// The quota this limiter was configured with.
    pub fn settings(&self) -> &RateLimitSettings {
        &self.settings
    }

    /// Point-in-time counters.
    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            tracked_credentials: self.entries.len(),
            admitted: self.admitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_settings(max_requests: u32, window_seconds: u64) -> RateLimitSettings {
        RateLimitSettings {
            max_requests,
            window_seconds,
        }
    }

    fn credential(name: &str) -> CredentialId {
        CredentialId::new(name)
    }

    #[test]
    fn test_first_request_opens_window_with_count_one() {
        let limiter = RateLimiter::new();
        let alice = credential("token-alice");

        assert!(limiter
            .check_and_increment(&alice, 3, Duration::from_secs(60))
            .is_ok());
        assert_eq!(limiter.window_count(&alice), Some(1));
    }

    #[test]
    fn test_exact_admission_sequence_at_quota_one() {
        let limiter = RateLimiter::new();
        let alice = credential("token-alice");
        let ttl = Duration::from_secs(60);

        assert!(limiter.check_and_increment(&alice, 1, ttl).is_ok());
        assert!(limiter.check_and_increment(&alice, 1, ttl).is_ok());
        let third = limiter.check_and_increment(&alice, 1, ttl);
        match third {
            Err(RateLimitError::Exceeded { retry_after }) => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= ttl);
            }
            Ok(()) => panic!("third request within the window must be rejected"),
        }
    }

    #[test]
    fn test_quota_three_admits_four_then_rejects() {
        let limiter = RateLimiter::new();
        let alice = credential("token-alice");
        let ttl = Duration::from_secs(60);

        for n in 1..=4u32 {
            assert!(
                limiter.check_and_increment(&alice, 3, ttl).is_ok(),
                "request {} should be admitted",
                n
            );
            assert_eq!(limiter.window_count(&alice), Some(n));
        }
        assert!(limiter.check_and_increment(&alice, 3, ttl).is_err());

        let stats = limiter.stats();
        assert_eq!(stats.admitted, 4);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_rejection_does_not_advance_the_counter() {
        let limiter = RateLimiter::new();
        let alice = credential("token-alice");
        let ttl = Duration::from_secs(60);

        assert!(limiter.check_and_increment(&alice, 1, ttl).is_ok());
        assert!(limiter.check_and_increment(&alice, 1, ttl).is_ok());
        for _ in 0..5 {
            assert!(limiter.check_and_increment(&alice, 1, ttl).is_err());
        }
        assert_eq!(limiter.window_count(&alice), Some(2));
    }

    #[test]
    fn test_window_resets_after_ttl_elapses() {
        let limiter = RateLimiter::new();
        let alice = credential("token-alice");
        let ttl = Duration::from_millis(30);

        assert!(limiter.check_and_increment(&alice, 1, ttl).is_ok());
        assert!(limiter.check_and_increment(&alice, 1, ttl).is_ok());
        assert!(limiter.check_and_increment(&alice, 1, ttl).is_err());

        std::thread::sleep(Duration::from_millis(50));

        assert!(limiter.check_and_increment(&alice, 1, ttl).is_ok());
        assert_eq!(
            limiter.window_count(&alice),
            Some(1),
            "an elapsed window restarts counting from 1"
        );
    }

    #[test]
    fn test_ttl_beyond_clock_range_never_elapses() {
        let limiter = RateLimiter::new();
        let alice = credential("token-alice");
        let ttl = Duration::from_secs(u64::MAX);

        assert!(limiter.check_and_increment(&alice, 1, ttl).is_ok());
        assert!(limiter.check_and_increment(&alice, 1, ttl).is_ok());
        match limiter.check_and_increment(&alice, 1, ttl) {
            Err(RateLimitError::Exceeded { retry_after }) => {
                assert!(retry_after >= Duration::from_secs(u64::MAX / 2));
            }
            Ok(()) => panic!("a window that never ends must keep enforcing its quota"),
        }
        assert_eq!(limiter.purge_expired(), 0, "an endless window is never purged");
        assert_eq!(limiter.window_count(&alice), Some(2));
    }

    #[test]
    fn test_credentials_are_tracked_independently() {
        let limiter = RateLimiter::new();
        let alice = credential("token-alice");
        let bob = credential("token-bob");
        let ttl = Duration::from_secs(60);

        assert!(limiter.check_and_increment(&alice, 1, ttl).is_ok());
        assert!(limiter.check_and_increment(&alice, 1, ttl).is_ok());
        assert!(limiter.check_and_increment(&alice, 1, ttl).is_err());

        assert!(limiter.check_and_increment(&bob, 1, ttl).is_ok());
        assert_eq!(limiter.stats().tracked_credentials, 2);
    }

    #[test]
    fn test_check_uses_configured_quota() {
        let limiter = RateLimiter::with_config(&test_settings(2, 60));
        let alice = credential("token-alice");

        assert!(limiter.check(&alice).is_ok());
        assert!(limiter.check(&alice).is_ok());
        assert!(limiter.check(&alice).is_ok());
        assert!(limiter.check(&alice).is_err());
    }

    #[test]
    fn test_purge_removes_only_elapsed_windows() {
        let limiter = RateLimiter::new();
        let short = credential("token-short");
        let long = credential("token-long");

        assert!(limiter
            .check_and_increment(&short, 5, Duration::from_millis(20))
            .is_ok());
        assert!(limiter
            .check_and_increment(&long, 5, Duration::from_secs(60))
            .is_ok());

        std::thread::sleep(Duration::from_millis(40));

        assert_eq!(limiter.purge_expired(), 1);
        assert_eq!(limiter.window_count(&short), None);
        assert_eq!(limiter.window_count(&long), Some(1));
    }

    #[test]
    fn test_concurrent_requests_lose_no_increments() {
        let limiter = Arc::new(RateLimiter::new());
        let alice = credential("token-alice");
        let ttl = Duration::from_secs(60);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = limiter.clone();
            let alice = alice.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..25 {
                    limiter
                        .check_and_increment(&alice, 10_000, ttl)
                        .expect("quota is far above the request count");
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(limiter.window_count(&alice), Some(200));
        assert_eq!(limiter.stats().admitted, 200);
    }
}
