//! Request manager configuration.

use std::time::Duration;

/// Block request manager configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long an outstanding request may go unanswered before it is
    /// retried.
    pub request_timeout: Duration,

    /// How long a pending block may sit undelivered before it is dropped.
    pub expiration: Duration,

    /// Minimum interval between inventory requests while work is pending.
    pub min_inventory_interval: Duration,

    /// Maximum interval between inventory requests.
    pub max_inventory_interval: Duration,

    /// Maximum outbound data requests per scheduler tick.
    pub request_quota_per_second: usize,

    /// Scheduler tick interval.
    pub tick_interval: Duration,

    /// Tag log events with the local consensus id.
    pub log_self_id: bool,

    /// Seed for the peer-selection RNG. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            expiration: Duration::from_secs(300),
            min_inventory_interval: Duration::from_secs(3),
            max_inventory_interval: Duration::from_secs(30),
            request_quota_per_second: 100,
            tick_interval: Duration::from_secs(1),
            log_self_id: false,
            rng_seed: None,
        }
    }
}

impl SyncConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request retry timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the per-block expiration.
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Set the per-tick request quota.
    pub fn with_request_quota(mut self, quota: usize) -> Self {
        self.request_quota_per_second = quota;
        self
    }

    /// Set the inventory request interval bounds.
    pub fn with_inventory_intervals(mut self, min: Duration, max: Duration) -> Self {
        self.min_inventory_interval = min;
        self.max_inventory_interval = max;
        self
    }

    /// Seed the peer-selection RNG for deterministic tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.expiration, Duration::from_secs(300));
        assert_eq!(config.min_inventory_interval, Duration::from_secs(3));
        assert_eq!(config.max_inventory_interval, Duration::from_secs(30));
        assert_eq!(config.request_quota_per_second, 100);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_builders() {
        let config = SyncConfig::new()
            .with_request_quota(3)
            .with_rng_seed(42)
            .with_inventory_intervals(Duration::from_secs(1), Duration::from_secs(5));
        assert_eq!(config.request_quota_per_second, 3);
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.max_inventory_interval, Duration::from_secs(5));
    }
}
