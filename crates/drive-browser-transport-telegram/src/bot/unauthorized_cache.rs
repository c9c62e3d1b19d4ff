//! Flood protection for "Access Denied" replies
//!
//! A user outside the allowlist is told once per cooldown period, separately
//! for chat messages and for button presses. Every further attempt inside the
//! period is dropped silently.

use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Where a denial is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialKind {
    /// Chat message in reply to text or a command
    Message,
    /// Alert on an answered button press
    Button,
}

/// Tracks which users were recently told they have no access
#[derive(Clone)]
pub struct UnauthorizedCache {
    denied: Cache<(i64, DenialKind), ()>,
    cooldown: Duration,
    silenced: Arc<AtomicU64>,
}

impl UnauthorizedCache {
    /// Creates a new `UnauthorizedCache`
    ///
    /// # Arguments
    ///
    /// * `cooldown_secs` - Seconds between two denials of the same kind to one user
    /// * `ttl_secs` - Upper bound on how long an entry is kept
    /// * `max_capacity` - Maximum number of entries in cache
    ///
    /// # Examples
    ///
    /// ```
    /// use drive_browser_transport_telegram::bot::UnauthorizedCache;
    ///
    /// let cache = UnauthorizedCache::new(1200, 7200, 10_000);
    /// assert_eq!(cache.cooldown().as_secs(), 1200);
    /// ```
    #[must_use]
    pub fn new(cooldown_secs: u64, ttl_secs: u64, max_capacity: u64) -> Self {
        // An entry outliving the cooldown would silence the user too long
        let lifetime = ttl_secs.min(cooldown_secs).max(1);
        let denied = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(lifetime))
            .build();

        Self {
            denied,
            cooldown: Duration::from_secs(cooldown_secs),
            silenced: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Whether a denial of `kind` should be delivered to `user_id` now.
    ///
    /// Only every 100th silenced attempt is logged.
    pub async fn should_send(&self, user_id: i64, kind: DenialKind, user_name: &str) -> bool {
        if self.denied.get(&(user_id, kind)).await.is_none() {
            return true;
        }

        let total = self.silenced.fetch_add(1, Ordering::Relaxed) + 1;
        if total.is_multiple_of(100) {
            debug!(
                "⛔️ {} unauthorized attempts silenced so far, latest {:?} from {} ({})",
                total, kind, user_id, user_name
            );
        }

        false
    }

    /// Start the cooldown once a denial of `kind` was delivered
    pub async fn mark_sent(&self, user_id: i64, kind: DenialKind) {
        self.denied.insert((user_id, kind), ()).await;
    }

    /// Current number of entries
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.denied.entry_count()
    }

    /// Total silenced attempts since start
    #[must_use]
    pub fn silenced_count(&self) -> u64 {
        self.silenced.load(Ordering::Relaxed)
    }

    /// Configured cooldown
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
