//! Construction-time configuration.

use thiserror::Error;

/// Errors raised while building configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Snapshot frequency must be at least one event.
    #[error("snapshot frequency must be greater than zero")]
    ZeroFrequency,
}

/// Snapshot settings for an aggregate or projection.
///
/// - `frequency`: a snapshot is written once at least this many events have
///   been applied since the last one
/// - `version`: schema version stamped on snapshots; a stored snapshot is only
///   used when its version equals this value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotConfig {
    pub frequency: u64,
    pub version: u32,
}

impl SnapshotConfig {
    /// Creates a snapshot configuration, rejecting a zero frequency.
    pub fn new(frequency: u64, version: u32) -> Result<Self, ConfigError> {
        if frequency == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        Ok(Self { frequency, version })
    }

    /// Reads `SNAPSHOT_FREQUENCY` and `SNAPSHOT_VERSION`.
    ///
    /// Returns `None` (snapshotting disabled) unless both are set and valid.
    pub fn from_env() -> Option<Self> {
        Self::from_values(
            std::env::var("SNAPSHOT_FREQUENCY").ok().as_deref(),
            std::env::var("SNAPSHOT_VERSION").ok().as_deref(),
        )
    }

    /// Parses raw frequency and version settings; `None` unless both are valid.
    pub fn from_values(frequency: Option<&str>, version: Option<&str>) -> Option<Self> {
        let frequency = frequency?.trim().parse().ok()?;
        let version = version?.trim().parse().ok()?;
        Self::new(frequency, version).ok()
    }
}

/// Engine-wide configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `SERVICE_NAME`: `source` tag stamped on every persisted event (default: `"event-engine"`)
/// - `SNAPSHOT_FREQUENCY` / `SNAPSHOT_VERSION`: snapshot settings (default: disabled)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub service_name: String,
    pub snapshot: Option<SnapshotConfig>,
    pub log_level: String,
}

impl EngineConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "event-engine".to_string()),
            snapshot: SnapshotConfig::from_env(),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_name: "event-engine".to_string(),
            snapshot: None,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.service_name, "event-engine");
        assert_eq!(config.snapshot, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_snapshot_config_rejects_zero_frequency() {
        assert_eq!(SnapshotConfig::new(0, 1), Err(ConfigError::ZeroFrequency));
    }

    #[test]
    fn test_snapshot_config_accepts_positive_frequency() {
        let config = SnapshotConfig::new(4, 1).unwrap();
        assert_eq!(config.frequency, 4);
        assert_eq!(config.version, 1);
    }

    #[test]
    fn test_snapshot_config_needs_both_values() {
        assert_eq!(
            SnapshotConfig::from_values(Some("10"), Some("2")),
            Some(SnapshotConfig {
                frequency: 10,
                version: 2
            })
        );
        assert_eq!(SnapshotConfig::from_values(Some("10"), None), None);
        assert_eq!(SnapshotConfig::from_values(None, Some("2")), None);
        assert_eq!(SnapshotConfig::from_values(None, None), None);
    }

    #[test]
    fn test_snapshot_config_rejects_invalid_values() {
        assert_eq!(SnapshotConfig::from_values(Some("often"), Some("1")), None);
        assert_eq!(SnapshotConfig::from_values(Some("10"), Some("-1")), None);
        assert_eq!(SnapshotConfig::from_values(Some("0"), Some("1")), None);
    }
}
