//! Service configuration
//!
//! Loaded from YAML or built in code. Ports are optional: a `null` inbound
//! port disables receiving, a `null` outbound port disables sending.
//!
//! ```yaml
//! host: 127.0.0.1
//! in_port: 8000
//! out_port: null
//! send_on_receive: false
//! poll_interval_secs: 0.01
//! duplicate_policy: replace
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// What happens when a second endpoint is registered at an existing address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Replace the registry entry, keep previous handlers wired (logged)
    #[default]
    AllowMultiple,
    /// Replace the registry entry and unwire the previous handlers
    Replace,
    /// Fail with `BindError::AddressCollision`
    Reject,
}

/// Configuration of an [`crate::OscService`]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Bind address for the listener and target host for the client
    #[serde(default = "default_host")]
    pub host: String,
    /// Inbound port; `None` disables receiving
    #[serde(default = "default_in_port")]
    pub in_port: Option<u16>,
    /// Outbound port; `None` disables sending
    #[serde(default = "default_out_port")]
    pub out_port: Option<u16>,
    #[serde(default = "default_true")]
    pub allow_broadcast: bool,
    /// Re-emit received values to the peer
    #[serde(default)]
    pub send_on_receive: bool,
    /// How often the receive loop checks for shutdown
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: f64,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            in_port: default_in_port(),
            out_port: default_out_port(),
            allow_broadcast: true,
            send_on_receive: false,
            poll_interval_secs: default_poll_interval(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl ServiceConfig {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn in_port(mut self, port: Option<u16>) -> Self {
        self.in_port = port;
        self
    }

    pub fn out_port(mut self, port: Option<u16>) -> Self {
        self.out_port = port;
        self
    }

    pub fn allow_broadcast(mut self, allow: bool) -> Self {
        self.allow_broadcast = allow;
        self
    }

    pub fn send_on_receive(mut self, enabled: bool) -> Self {
        self.send_on_receive = enabled;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_secs = interval.as_secs_f64();
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Poll interval as a `Duration`; unrepresentable values fall back to the
    /// default (`validate` rejects them)
    pub fn poll_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.poll_interval_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_poll_interval()))
    }

    /// Load configuration from a YAML file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ServiceConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a YAML file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("host cannot be empty");
        }
        if self.poll_interval_secs <= 0.0
            || Duration::try_from_secs_f64(self.poll_interval_secs).is_err()
        {
            anyhow::bail!(
                "poll_interval_secs must be a positive number (got {})",
                self.poll_interval_secs
            );
        }
        if self.out_port == Some(0) {
            anyhow::bail!("out_port 0 is not a valid target port");
        }
        Ok(())
    }
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_in_port() -> Option<u16> { Some(8000) }
fn default_out_port() -> Option<u16> { Some(9000) }
fn default_true() -> bool { true }
fn default_poll_interval() -> f64 { 0.01 }

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.in_port, Some(8000));
        assert_eq!(config.out_port, Some(9000));
        assert!(config.allow_broadcast);
        assert!(!config.send_on_receive);
        assert_eq!(config.poll_duration(), Duration::from_millis(10));
        assert_eq!(config.duplicate_policy, DuplicatePolicy::AllowMultiple);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_keys_use_defaults_and_null_disables() {
        let config: ServiceConfig = serde_yaml::from_str("host: 127.0.0.1\nout_port: null\n").unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.in_port, Some(8000));
        assert_eq!(config.out_port, None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ServiceConfig::default().host(" ").validate().is_err());
        assert!(ServiceConfig::default()
            .poll_interval(Duration::ZERO)
            .validate()
            .is_err());
        assert!(ServiceConfig::default().out_port(Some(0)).validate().is_err());
        // Port 0 inbound means "pick an ephemeral port"
        assert!(ServiceConfig::default().in_port(Some(0)).validate().is_ok());
    }

    #[test]
    fn test_poll_duration_never_panics() {
        for bad in [-1.0, f64::NAN, f64::INFINITY, 1e30] {
            let config = ServiceConfig {
                poll_interval_secs: bad,
                ..ServiceConfig::default()
            };
            assert!(config.validate().is_err(), "{bad} should be rejected");
            assert_eq!(config.poll_duration(), Duration::from_millis(10));
        }
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "host: 127.0.0.1\nin_port: 7000\nsend_on_receive: true\nduplicate_policy: reject"
        )
        .unwrap();

        let config = ServiceConfig::load(file.path()).await.unwrap();
        assert_eq!(config.in_port, Some(7000));
        assert!(config.send_on_receive);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osc.yaml");
        let config = ServiceConfig::default().in_port(None).send_on_receive(true);

        config.save(&path).await.unwrap();
        let loaded = ServiceConfig::load(&path).await.unwrap();

        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_invalid_yaml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs: -1").unwrap();
        assert!(ServiceConfig::load(file.path()).await.is_err());
    }
}
