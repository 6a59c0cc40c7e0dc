use super::types::*;
use crate::utils::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub watchdog: WatchdogConfig,
    pub persistence: PersistenceConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)?;
        let config: Config = serde_yaml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the given config file, or falls back to defaults when no path is
    /// supplied or the default `overlay.yaml` does not exist.
    pub fn load_with_fallback(config_path: &Option<std::path::PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load(path),
            None => {
                if Path::new("overlay.yaml").exists() {
                    Self::load("overlay.yaml")
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.watchdog.poll_interval_ms == 0 {
            return Err(Error::validation(
                "poll_interval_ms must be greater than 0",
            ));
        }

        if self.watchdog.reapply_attempts == 0 {
            return Err(Error::validation(
                "reapply_attempts must be greater than 0",
            ));
        }

        if self.watchdog.reapply_delay_ms == 0 {
            return Err(Error::validation("reapply_delay_ms must be greater than 0"));
        }

        if self.watchdog.drift_reapply_limit == 0 {
            return Err(Error::validation(
                "drift_reapply_limit must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.watchdog.poll_interval_ms, 1000);
        assert_eq!(config.watchdog.reapply_attempts, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validation_rejects_zero_poll_interval() {
        let mut config = Config::default();
        config.watchdog.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_reapply_attempts() {
        let mut config = Config::default();
        config.watchdog.reapply_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_yaml() {
        let yaml = r#"
logging:
  level: debug
  show_timestamps: false
  colored_output: false
watchdog:
  poll_interval_ms: 250
  reapply_attempts: 3
  reapply_delay_ms: 100
  drift_debounce_ms: 50
  drift_reapply_limit: 2
  fullscreen_settle_ms: 100
persistence:
  storage_dir: /tmp/overlay-test
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.watchdog.poll_interval_ms, 250);
        assert_eq!(config.watchdog.reapply_attempts, 3);
        assert_eq!(
            config.persistence.storage_dir,
            Some(std::path::PathBuf::from("/tmp/overlay-test"))
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "logging:\n  level: warn\n  show_timestamps: true\n  colored_output: true\n";
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.watchdog, WatchdogConfig::default());
    }

    #[test]
    fn test_load_with_fallback_missing_path_uses_default() {
        let config = Config::load_with_fallback(&None).unwrap();
        assert_eq!(config.watchdog, WatchdogConfig::default());
    }
}
