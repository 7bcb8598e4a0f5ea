use crate::escpos::{
    DEFAULT_PIN, DEFAULT_PULSE_OFF_TIME, DEFAULT_PULSE_ON_TIME, DrawerOptions,
};
use std::time::Duration;

/// Cash drawer configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | CASH_DRAWER_TIMEOUT_MS | 10000 | bound on one transport attempt |
/// | CASH_DRAWER_DISCOVERY_TIMEOUT_MS | 5000 | bound on one discovery call |
/// | CASH_DRAWER_DOC_NAME | Open Cash Drawer | spooler job name |
/// | CASH_DRAWER_PIN | 0 | default drawer pin |
/// | CASH_DRAWER_PULSE_ON | 50 | default pulse-on time |
/// | CASH_DRAWER_PULSE_OFF | 250 | default pulse-off time |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Transport timeout (ms)
    pub transport_timeout_ms: u64,
    /// Discovery timeout (ms)
    pub discovery_timeout_ms: u64,
    /// Job name shown in the spooler queue
    pub document_name: String,
    /// Options used for fields the caller leaves out
    pub default_options: DrawerOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport_timeout_ms: 10_000,
            discovery_timeout_ms: 5_000,
            document_name: "Open Cash Drawer".into(),
            default_options: DrawerOptions::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            transport_timeout_ms: env_parse("CASH_DRAWER_TIMEOUT_MS", 10_000),
            discovery_timeout_ms: env_parse("CASH_DRAWER_DISCOVERY_TIMEOUT_MS", 5_000),
            document_name: std::env::var("CASH_DRAWER_DOC_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Open Cash Drawer".into()),
            default_options: DrawerOptions {
                pin: env_parse("CASH_DRAWER_PIN", DEFAULT_PIN),
                pulse_on_time: env_parse("CASH_DRAWER_PULSE_ON", DEFAULT_PULSE_ON_TIME),
                pulse_off_time: env_parse("CASH_DRAWER_PULSE_OFF", DEFAULT_PULSE_OFF_TIME),
            },
        }
    }

    pub fn transport_timeout(&self) -> Duration {
        Duration::from_millis(self.transport_timeout_ms)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.transport_timeout(), Duration::from_secs(10));
        assert_eq!(config.discovery_timeout(), Duration::from_secs(5));
        assert_eq!(config.document_name, "Open Cash Drawer");
        assert_eq!(config.default_options, DrawerOptions::new(0, 50, 250));
    }

    #[test]
    fn test_env_parse_fallback() {
        assert_eq!(env_parse("CASH_DRAWER_TEST_UNSET_VARIABLE", 7u64), 7);
    }
}
