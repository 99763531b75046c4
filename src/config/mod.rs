use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

use crate::{Result, TodobusError};

/// Deployment environment (controls log formatting)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployEnvironment {
    #[default]
    Dev,
    Qa,
    Stg,
    Ocu,
    Prod,
}

impl DeployEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployEnvironment::Dev => "dev",
            DeployEnvironment::Qa => "qa",
            DeployEnvironment::Stg => "stg",
            DeployEnvironment::Ocu => "ocu",
            DeployEnvironment::Prod => "prod",
        }
    }

    /// Productive environments log JSON
    pub fn is_productive(&self) -> bool {
        matches!(self, DeployEnvironment::Ocu | DeployEnvironment::Prod)
    }
}

/// Event bus sizing
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EventSettings {
    /// Queue capacity; publishing beyond it drops events
    #[serde(default = "default_channel_buffer_size")]
    pub channel_buffer_size: usize,
    /// Maximum number of events handled at the same time
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

fn default_channel_buffer_size() -> usize {
    1024
}

fn default_max_workers() -> usize {
    8
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer_size(),
            max_workers: default_max_workers(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: DeployEnvironment,
    #[serde(default)]
    pub event: EventSettings,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with defaults
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (not tracked by git)
            .add_source(File::with_name("config/local").required(false))
            // Environment variables, e.g. TODOBUS__EVENT__MAX_WORKERS=4
            .add_source(
                Environment::with_prefix("TODOBUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(s)
    }

    /// Deserialize and validate an already assembled configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.event.channel_buffer_size == 0 {
            return Err(TodobusError::InvalidConfig(
                "event.channel_buffer_size must be at least 1".to_string(),
            ));
        }
        if self.event.max_workers == 0 {
            return Err(TodobusError::InvalidConfig(
                "event.max_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<ConfigError> for TodobusError {
    fn from(e: ConfigError) -> Self {
        TodobusError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<Settings> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Settings::from_config(config)
    }

    #[test]
    fn test_defaults_when_empty() {
        let settings = parse("").unwrap();
        assert_eq!(settings.environment, DeployEnvironment::Dev);
        assert_eq!(settings.event.channel_buffer_size, 1024);
        assert_eq!(settings.event.max_workers, 8);
    }

    #[test]
    fn test_reads_event_section() {
        let settings = parse(
            r#"
            environment = "prod"

            [event]
            channel_buffer_size = 32
            max_workers = 2
            "#,
        )
        .unwrap();

        assert!(settings.environment.is_productive());
        assert_eq!(settings.event.channel_buffer_size, 32);
        assert_eq!(settings.event.max_workers, 2);
    }

    #[test]
    fn test_rejects_zero_workers() {
        let err = parse("[event]\nmax_workers = 0").unwrap_err();
        assert!(matches!(err, TodobusError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_zero_buffer() {
        let err = parse("[event]\nchannel_buffer_size = 0").unwrap_err();
        assert!(matches!(err, TodobusError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_unknown_environment() {
        let err = parse(r#"environment = "staging""#).unwrap_err();
        assert!(matches!(err, TodobusError::Config(_)));
    }

    #[test]
    fn test_productive_environments() {
        assert!(!DeployEnvironment::Dev.is_productive());
        assert!(!DeployEnvironment::Qa.is_productive());
        assert!(!DeployEnvironment::Stg.is_productive());
        assert!(DeployEnvironment::Ocu.is_productive());
        assert!(DeployEnvironment::Prod.is_productive());
        assert_eq!(DeployEnvironment::Ocu.as_str(), "ocu");
    }
}
