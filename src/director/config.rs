//! Director-wide tunables with validation (ยง1 ambient stack, ADDED).

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::error::FrameworkException;

/// Default queue capacity applied to queues created without an explicit size.
pub const DEFAULT_QUEUE_SIZE: usize = 100;

/// Default consumer-loop wakeup interval (ยง4.5.2 "wait on queue's
/// content-ready signal up to timeout").
pub const DEFAULT_CONSUMER_TIMEOUT: Duration = Duration::from_millis(250);

/// Default base delay for the per-event rescue backoff (ยง4.5.3 step 5).
pub const DEFAULT_RESCUE_BASE_DELAY: Duration = Duration::from_millis(50);

/// Default cap on the per-event rescue backoff delay.
pub const DEFAULT_RESCUE_MAX_DELAY: Duration = Duration::from_secs(5);

/// Default monitoring-enabled setting.
pub const DEFAULT_ENABLE_MONITORING: bool = true;

/// Director-wide tunables (ยง1 ambient stack): default queue size, consumer
/// wakeup timeout, rescue backoff bounds, and whether monitoring is enabled.
///
/// # Examples
///
/// ```rust
/// use conflux_rt::director::DirectorConfig;
/// use std::time::Duration;
///
/// let config = DirectorConfig::builder()
///     .with_default_queue_size(50)
///     .with_consumer_timeout(Duration::from_millis(100))
///     .build()
///     .unwrap();
/// assert_eq!(config.default_queue_size, 50);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorConfig {
    /// Capacity applied to queues created without an explicit size (`0` =
    /// unbounded, ยง3.3).
    pub default_queue_size: usize,

    /// How long a consumer task waits on its queue's content-ready signal
    /// before re-checking the running flag (ยง4.5.2).
    pub consumer_timeout: Duration,

    /// Base delay for the per-event rescue backoff (ยง4.5.3 step 5).
    pub rescue_base_delay: Duration,

    /// Cap on the per-event rescue backoff delay.
    pub rescue_max_delay: Duration,

    /// Whether `Monitor<E>` recording is active across every component.
    pub enable_monitoring: bool,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            default_queue_size: DEFAULT_QUEUE_SIZE,
            consumer_timeout: DEFAULT_CONSUMER_TIMEOUT,
            rescue_base_delay: DEFAULT_RESCUE_BASE_DELAY,
            rescue_max_delay: DEFAULT_RESCUE_MAX_DELAY,
            enable_monitoring: DEFAULT_ENABLE_MONITORING,
        }
    }
}

impl DirectorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> DirectorConfigBuilder {
        DirectorConfigBuilder::default()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `SetupError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), FrameworkException> {
        if self.consumer_timeout.is_zero() {
            return Err(FrameworkException::SetupError(
                "consumer_timeout must be > 0".to_string(),
            ));
        }
        if self.rescue_max_delay < self.rescue_base_delay {
            return Err(FrameworkException::SetupError(
                "rescue_max_delay must be >= rescue_base_delay".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for [`DirectorConfig`].
#[derive(Debug, Default)]
pub struct DirectorConfigBuilder {
    config: DirectorConfig,
}

impl DirectorConfigBuilder {
    /// Set the default queue capacity.
    pub fn with_default_queue_size(mut self, size: usize) -> Self {
        self.config.default_queue_size = size;
        self
    }

    /// Set the consumer wakeup timeout.
    pub fn with_consumer_timeout(mut self, timeout: Duration) -> Self {
        self.config.consumer_timeout = timeout;
        self
    }

    /// Set the rescue backoff base delay.
    pub fn with_rescue_base_delay(mut self, delay: Duration) -> Self {
        self.config.rescue_base_delay = delay;
        self
    }

    /// Set the rescue backoff cap.
    pub fn with_rescue_max_delay(mut self, delay: Duration) -> Self {
        self.config.rescue_max_delay = delay;
        self
    }

    /// Enable or disable monitoring.
    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.config.enable_monitoring = enabled;
        self
    }

    /// Validate and produce the final configuration.
    ///
    /// # Errors
    /// Returns `SetupError` if the accumulated configuration is invalid.
    pub fn build(self) -> Result<DirectorConfig, FrameworkException> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DirectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_queue_size, DEFAULT_QUEUE_SIZE);
    }

    #[test]
    fn test_builder_overrides_defaults() {
        let config = DirectorConfig::builder()
            .with_default_queue_size(10)
            .with_consumer_timeout(Duration::from_millis(50))
            .with_monitoring(false)
            .build()
            .unwrap();

        assert_eq!(config.default_queue_size, 10);
        assert_eq!(config.consumer_timeout, Duration::from_millis(50));
        assert!(!config.enable_monitoring);
    }

    #[test]
    fn test_zero_queue_size_means_unbounded_and_is_accepted() {
        let config = DirectorConfig::builder()
            .with_default_queue_size(0)
            .build()
            .unwrap();
        assert_eq!(config.default_queue_size, 0);
    }

    #[test]
    fn test_rescue_max_below_base_rejected() {
        let err = DirectorConfig::builder()
            .with_rescue_base_delay(Duration::from_secs(10))
            .with_rescue_max_delay(Duration::from_secs(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, FrameworkException::SetupError(_)));
    }
}
