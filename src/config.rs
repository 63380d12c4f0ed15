use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub agent: AgentConfig,
    pub report: ReportConfig,
    #[serde(default)]
    pub feed: Option<FeedConfig>,
    #[serde(default)]
    pub locator: LocatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_mission_id")]
    pub mission_id: String,
    #[serde(default = "default_interval")]
    pub interval_s: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub primary_url: String,
    pub secondary_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_s: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub base_url: String,
    pub access_token: String,
    #[serde(default = "default_cooldown")]
    pub cooldown_s: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocatorConfig {
    #[serde(default = "default_gpsd_addr")]
    pub gpsd_addr: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            gpsd_addr: default_gpsd_addr(),
        }
    }
}

fn default_mission_id() -> String {
    "TESTING".to_string()
}

fn default_interval() -> u64 {
    10
}

fn default_timeout() -> u64 {
    10
}

fn default_cooldown() -> u64 {
    300
}

fn default_gpsd_addr() -> String {
    "127.0.0.1:2947".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.interval_s == 0 {
            return Err(ConfigError::Invalid(
                "agent.interval_s must be greater than 0".to_string(),
            ));
        }
        if self.report.primary_url.is_empty() || self.report.secondary_url.is_empty() {
            return Err(ConfigError::Invalid(
                "report URLs must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse(
            r#"
agent: {}
report:
  primary_url: http://a.example/report
  secondary_url: http://b.example/report
"#,
        )
        .unwrap();

        assert_eq!(config.agent.mission_id, "TESTING");
        assert_eq!(config.agent.interval_s, 10);
        assert_eq!(config.report.timeout_s, 10);
        assert!(config.feed.is_none());
        assert_eq!(config.locator.gpsd_addr, "127.0.0.1:2947");
    }

    #[test]
    fn full_config_parses() {
        let config = parse(
            r#"
agent:
  mission_id: AURORA-1
  interval_s: 5
report:
  primary_url: http://a.example/report
  secondary_url: http://b.example/report
  timeout_s: 3
feed:
  base_url: https://feed.example
  access_token: opaque-token
  cooldown_s: 120
locator:
  gpsd_addr: 10.0.0.5:2947
"#,
        )
        .unwrap();

        assert_eq!(config.agent.mission_id, "AURORA-1");
        assert_eq!(config.agent.interval_s, 5);
        let feed = config.feed.unwrap();
        assert_eq!(feed.cooldown_s, 120);
        assert_eq!(config.locator.gpsd_addr, "10.0.0.5:2947");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = parse(
            r#"
agent:
  interval_s: 0
report:
  primary_url: http://a.example/report
  secondary_url: http://b.example/report
"#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
