//! Runtime configuration read from the environment.

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a port number, got {value:?}")]
    InvalidPort { var: &'static str, value: String },
    #[error("{var} must be true or false, got {value:?}")]
    InvalidBool { var: &'static str, value: String },
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug)]
pub struct AiConfig {
    pub api_key: Option<SecretString>,
    pub base_url: Url,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub seed_demo_data: bool,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("BACKEND_PORT").map(|v| ("BACKEND_PORT", v)).or_else(|| get("PORT").map(|v| ("PORT", v))) {
            Some((var, value)) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { var, value })?,
            None => DEFAULT_PORT,
        };

        let seed_demo_data = match get("SEED_DEMO_DATA") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidBool {
                var: "SEED_DEMO_DATA",
                value,
            })?,
            None => false,
        };

        let base_url = get("AI_BASE_URL").unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|source| ConfigError::InvalidUrl {
            var: "AI_BASE_URL",
            source,
        })?;

        let timeout = match get("AI_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: "AI_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: get("DATABASE_URL").unwrap_or_else(|| db::IN_MEMORY_URL.to_string()),
            seed_demo_data,
            ai: AiConfig {
                api_key: get("AI_API_KEY").map(SecretString::from),
                base_url,
                model: get("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
                timeout,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(!config.seed_demo_data);
        assert!(config.ai.api_key.is_none());
        assert_eq!(config.ai.base_url.as_str(), "https://api.openai.com/v1");
        assert_eq!(config.ai.model, "gpt-3.5-turbo");
        assert_eq!(config.ai.timeout, Duration::from_secs(120));
    }

    #[test]
    fn backend_port_wins_over_port() {
        assert_eq!(config(&[("PORT", "8080")]).unwrap().port, 8080);
        assert_eq!(
            config(&[("PORT", "8080"), ("BACKEND_PORT", "4000")]).unwrap().port,
            4000
        );
    }

    #[test]
    fn reads_ai_settings() {
        let config = config(&[
            ("AI_API_KEY", "sk-local"),
            ("AI_BASE_URL", "http://localhost:11434/v1"),
            ("AI_MODEL", "llama3"),
            ("AI_TIMEOUT_SECS", "30"),
            ("SEED_DEMO_DATA", "yes"),
        ])
        .unwrap();
        assert_eq!(config.ai.api_key.unwrap().expose_secret(), "sk-local");
        assert_eq!(config.ai.model, "llama3");
        assert_eq!(config.ai.timeout, Duration::from_secs(30));
        assert!(config.seed_demo_data);
    }

    #[test]
    fn blank_key_means_fallback() {
        assert!(config(&[("AI_API_KEY", "  ")]).unwrap().ai.api_key.is_none());
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            config(&[("PORT", "http")]),
            Err(ConfigError::InvalidPort { var: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("SEED_DEMO_DATA", "maybe")]),
            Err(ConfigError::InvalidBool { .. })
        ));
        assert!(matches!(
            config(&[("AI_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            config(&[("AI_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}
