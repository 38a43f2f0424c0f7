//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Product name shown on the welcome step and in the header.
pub const PRODUCT_NAME: &str = "MindfulAI Therapy";

/// Minimum password length for new accounts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Shown on the account step at all times.
pub const DISCLAIMER: &str = "This AI therapy platform is for preliminary support only. \
If you're experiencing a crisis or emergency, please contact emergency services or a \
mental health professional immediately.";

/// Connection settings for the identity/storage service.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL, e.g. `https://xyzcompany.supabase.co`.
    pub base_url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: SecretString,
    /// Table holding one profile row per account.
    pub profiles_table: String,
    /// Transport timeout for a single request.
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: SecretString::from(anon_key.into()),
            profiles_table: "profiles".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = required_var("MINDFUL_GATEWAY_URL")?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "MINDFUL_GATEWAY_URL".to_string(),
                message: "must start with http:// or https://".to_string(),
            });
        }
        let anon_key = required_var("MINDFUL_GATEWAY_ANON_KEY")?;

        let mut config = Self::new(base_url, anon_key);
        if let Ok(table) = std::env::var("MINDFUL_PROFILES_TABLE") {
            if !table.trim().is_empty() {
                config.profiles_table = table.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var("MINDFUL_GATEWAY_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "MINDFUL_GATEWAY_TIMEOUT_SECS".to_string(),
                message: format!("expected a number of seconds, got {raw:?}"),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Abandoned onboarding sessions are dropped after this long.
    pub session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            session_ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port: u16 = std::env::var("MINDFUL_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let bind = std::env::var("MINDFUL_BIND").unwrap_or(defaults.bind);
        let session_ttl = std::env::var("MINDFUL_SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_ttl);
        Self {
            bind,
            port,
            session_ttl,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn required_var(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn new_strips_trailing_slash() {
        let config = GatewayConfig::new("https://example.supabase.co/", "anon");
        assert_eq!(config.base_url, "https://example.supabase.co");
        assert_eq!(config.anon_key.expose_secret(), "anon");
        assert_eq!(config.profiles_table, "profiles");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn server_addr() {
        let config = ServerConfig {
            bind: "127.0.0.1".to_string(),
            port: 9000,
            session_ttl: Duration::from_secs(60),
        };
        assert_eq!(config.addr(), "127.0.0.1:9000");
        assert_eq!(ServerConfig::default().port, 8080);
        assert_eq!(ServerConfig::default().session_ttl, Duration::from_secs(3600));
    }
}
