use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

/// Data-layer configuration loaded from environment variables.
///
/// Resolved once at startup; adapters and the session manager borrow it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Discourse forum (REST adapter target).
    pub forum_url: String,
    /// GraphQL BFF endpoint URL; the health probe derives `/health` from it.
    pub graphql_url: String,
    /// Optional static API key pair attached to every REST request.
    pub api_key: Option<String>,
    pub api_username: Option<String>,
    /// Base URL for the token refresh endpoint; defaults to the forum URL.
    pub auth_base_url: String,
}

impl Config {
    /// Load configuration from environment variables, honoring a `.env` file
    /// when present.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let forum_url = required_env("FOMIO_FORUM_URL")?;
        Ok(Self {
            auth_base_url: env_or_default("FOMIO_AUTH_URL", &forum_url),
            graphql_url: required_env("FOMIO_GRAPHQL_URL")?,
            api_key: optional_env("FOMIO_API_KEY"),
            api_username: optional_env("FOMIO_API_USERNAME"),
            forum_url,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("FOMIO_FORUM_URL", &self.forum_url),
            ("FOMIO_GRAPHQL_URL", &self.graphql_url),
            ("FOMIO_AUTH_URL", &self.auth_base_url),
        ] {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: "cannot be empty".to_string(),
                });
            }
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: format!("not a valid URL: '{value}'"),
                });
            }
        }
        if self.api_key.is_some() && self.api_username.is_none() {
            return Err(ConfigError::InvalidValue {
                name: "FOMIO_API_USERNAME".to_string(),
                message: "required when FOMIO_API_KEY is set".to_string(),
            });
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            forum_url: "https://forum.example.com".to_string(),
            graphql_url: "https://bff.example.com/graphql".to_string(),
            api_key: None,
            api_username: None,
            auth_base_url: "https://forum.example.com".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_base_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let mut config = base_config();
        config.forum_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_url() {
        let mut config = base_config();
        config.graphql_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_api_key_without_username() {
        let mut config = base_config();
        config.api_key = Some("key".to_string());
        assert!(config.validate().is_err());

        config.api_username = Some("system".to_string());
        assert!(config.validate().is_ok());
    }
}
