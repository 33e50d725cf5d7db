//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ColoniaError;

/// Environment variable for [`ServerConfig::bind`].
pub const ENV_BIND: &str = "COLONIA_BIND";
/// Environment variable for [`ServerConfig::idle_timeout_ms`].
pub const ENV_IDLE_TIMEOUT: &str = "COLONIA_IDLE_TIMEOUT_MS";
/// Environment variable for [`ServerConfig::login_timeout_ms`].
pub const ENV_LOGIN_TIMEOUT: &str = "COLONIA_LOGIN_TIMEOUT_MS";

/// Network-facing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind: String,

    /// A logged-in connection that sends nothing for this many
    /// milliseconds is closed. Updates pushed to it do not count.
    pub idle_timeout_ms: u64,

    /// How many milliseconds a new connection has to send its `login`.
    pub login_timeout_ms: u64,
}

impl ServerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }

    /// Checks that the settings can be served.
    ///
    /// # Errors
    /// [`ColoniaError::Config`] if a timeout is zero, which would close
    /// every connection as soon as it opens.
    pub fn validate(&self) -> Result<(), ColoniaError> {
        if self.idle_timeout_ms == 0 {
            return Err(ColoniaError::Config("idle timeout must be positive".into()));
        }
        if self.login_timeout_ms == 0 {
            return Err(ColoniaError::Config("login timeout must be positive".into()));
        }
        Ok(())
    }

    /// Defaults overridden by whichever `COLONIA_*` variables are set.
    ///
    /// # Errors
    /// [`ColoniaError::Config`] if a timeout is not a whole number.
    pub fn from_env() -> Result<Self, ColoniaError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ColoniaError> {
        let mut config = Self::default();
        if let Some(bind) = lookup(ENV_BIND) {
            config.bind = bind;
        }
        if let Some(raw) = lookup(ENV_IDLE_TIMEOUT) {
            config.idle_timeout_ms = parse_millis(ENV_IDLE_TIMEOUT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LOGIN_TIMEOUT) {
            config.login_timeout_ms = parse_millis(ENV_LOGIN_TIMEOUT, &raw)?;
        }
        Ok(config)
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<u64, ColoniaError> {
    raw.trim()
        .parse()
        .map_err(|_| ColoniaError::Config(format!("{key}={raw:?} is not a number of milliseconds")))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            idle_timeout_ms: 300_000,
            login_timeout_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.idle_timeout(), Duration::from_secs(300));
        assert_eq!(config.login_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_server_config_partial_json_keeps_defaults() {
        let config: ServerConfig = serde_json::from_str(r#"{"idle_timeout_ms": 750}"#).unwrap();
        assert_eq!(config.idle_timeout(), Duration::from_millis(750));
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.login_timeout_ms, 5_000);
    }

    #[test]
    fn test_from_lookup_overrides_defaults() {
        let config =
            ServerConfig::from_lookup(lookup(&[(ENV_BIND, "0.0.0.0:9000"), (ENV_IDLE_TIMEOUT, "30000")]))
                .unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.idle_timeout(), Duration::from_secs(30));
        assert_eq!(config.login_timeout_ms, 5_000);
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = ServerConfig::from_lookup(lookup(&[(ENV_LOGIN_TIMEOUT, "soon")])).unwrap_err();
        assert!(matches!(err, ColoniaError::Config(msg) if msg.contains("soon")));
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let idle = ServerConfig {
            idle_timeout_ms: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(idle.validate(), Err(ColoniaError::Config(msg)) if msg.contains("idle")));

        let login = ServerConfig {
            login_timeout_ms: 0,
            ..ServerConfig::default()
        };
        assert!(login.validate().is_err());
        assert!(ServerConfig::default().validate().is_ok());
    }
}
