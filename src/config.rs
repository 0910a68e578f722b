//! Application configuration loaded from environment variables.
//!
//! The Supabase project URL and anon key are the only required settings;
//! everything else has a local default.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Supabase project URL (e.g. `https://xyzcompany.supabase.co`)
    pub supabase_url: String,
    /// Supabase anon (public) API key, sent as the `apikey` header
    pub supabase_anon_key: String,
    /// Path of the persisted-session file (AsyncStorage analog)
    pub session_file: String,
    /// URL scheme that auth deep links arrive on
    pub deep_link_scheme: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored when present for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            supabase_url: env::var("SUPABASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            session_file: env::var("REPDAY_SESSION_FILE")
                .unwrap_or_else(|_| ".repday-session.json".to_string()),
            deep_link_scheme: env::var("REPDAY_DEEP_LINK_SCHEME")
                .unwrap_or_else(|_| "repday".to_string()),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test_anon_key".to_string(),
            session_file: ".repday-session-test.json".to_string(),
            deep_link_scheme: "repday".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("SUPABASE_URL", "https://proj.supabase.co/");
        env::set_var("SUPABASE_ANON_KEY", "anon ");

        let config = Config::from_env().expect("Config should load");

        // Trailing slash and whitespace are trimmed
        assert_eq!(config.supabase_url, "https://proj.supabase.co");
        assert_eq!(config.supabase_anon_key, "anon");
        assert_eq!(config.deep_link_scheme, "repday");
    }
}
