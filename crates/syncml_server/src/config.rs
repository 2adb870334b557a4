//! Session driver configuration.

use serde::Deserialize;
use std::time::Duration;
use syncml_protocol::constants::MOBILE_DEVICE_TYPE_WINDOWS;

/// What to do when enrollment completion finds a device without properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPropertiesPolicy {
    /// Apply the completion facts anyway.
    Complete,
    /// Fail the completion with a modification failure.
    #[default]
    Reject,
    /// Leave the device untouched and ask the client to resend.
    RequestResend,
}

/// Configuration for the session driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Device type tag written on enrolled devices.
    pub device_type: String,
    /// Behavior of enrollment completion for devices without properties.
    pub empty_properties_policy: EmptyPropertiesPolicy,
    /// Lifetime of tokens in the in-memory credential cache, in seconds.
    pub credential_ttl_secs: u64,
}

impl DriverConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self {
            device_type: MOBILE_DEVICE_TYPE_WINDOWS.to_string(),
            empty_properties_policy: EmptyPropertiesPolicy::default(),
            credential_ttl_secs: 60 * 60,
        }
    }

    /// Sets the device type tag.
    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = device_type.into();
        self
    }

    /// Sets the empty-properties policy.
    pub fn with_empty_properties_policy(mut self, policy: EmptyPropertiesPolicy) -> Self {
        self.empty_properties_policy = policy;
        self
    }

    /// Sets the credential lifetime.
    pub fn with_credential_ttl(mut self, ttl: Duration) -> Self {
        self.credential_ttl_secs = ttl.as_secs();
        self
    }

    /// Returns the credential lifetime.
    pub fn credential_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_ttl_secs)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.device_type, "windows");
        assert_eq!(config.empty_properties_policy, EmptyPropertiesPolicy::Reject);
        assert_eq!(config.credential_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn config_builder() {
        let config = DriverConfig::new()
            .with_device_type("windows-phone")
            .with_empty_properties_policy(EmptyPropertiesPolicy::RequestResend)
            .with_credential_ttl(Duration::from_secs(90));

        assert_eq!(config.device_type, "windows-phone");
        assert_eq!(
            config.empty_properties_policy,
            EmptyPropertiesPolicy::RequestResend
        );
        assert_eq!(config.credential_ttl_secs, 90);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: DriverConfig =
            serde_json::from_str(r#"{"empty_properties_policy":"complete"}"#).unwrap();
        assert_eq!(config.empty_properties_policy, EmptyPropertiesPolicy::Complete);
        assert_eq!(config.device_type, "windows");
    }
}
