//! Freshness policy for cached articles.
//!
//! An entry is stale once `now - created_at` reaches the policy's maximum age
//! (seven days by default). A missing entry is always stale.

use chrono::{DateTime, Duration, Utc};

/// Default age after which an entry is re-fetched.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// Returns true if an entry last fetched at `created_at` is stale at `now`
/// under the default seven-day policy.
pub fn is_stale(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    FreshnessPolicy::default().is_stale(created_at, now)
}

/// Age-based staleness rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    max_age: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::from_days(DEFAULT_MAX_AGE_DAYS)
    }
}

impl FreshnessPolicy {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    /// Day counts past chrono's range saturate to the largest representable age.
    pub fn from_days(days: i64) -> Self {
        Self::new(Duration::try_days(days).unwrap_or(Duration::MAX))
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Stale iff `now - created_at >= max_age`.
    pub fn is_stale(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(created_at) >= self.max_age
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: std::sync::Mutex::new(start) }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
