//! Application configuration loaded from environment variables.
//!
//! All keys are read once at startup; business logic receives the immutable
//! `Config` explicitly and never reads the environment itself.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Required ---
    /// Google OAuth client ID that incoming ID tokens must be issued for
    pub google_client_id: String,
    /// Gemini API key
    pub gemini_api_key: String,
    /// Session JWT signing secret (raw bytes)
    pub jwt_secret_key: Vec<u8>,

    // --- Optional ---
    /// Safe Browsing API key; URL safety degrades to "unknown" when unset
    pub safe_browsing_api_key: Option<String>,
    /// Supabase project URL; verification history is disabled when unset
    pub supabase_url: Option<String>,
    /// Supabase service-role key
    pub supabase_service_role_key: Option<String>,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            google_client_id: "test-client-id.apps.googleusercontent.com".to_string(),
            gemini_api_key: "test_gemini_key".to_string(),
            jwt_secret_key: b"test_jwt_secret_32_bytes_minimum!".to_vec(),
            safe_browsing_api_key: None,
            supabase_url: None,
            supabase_service_role_key: None,
            frontend_url: "http://localhost:5173".to_string(),
            port: 10000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Startup fails if any required variable is absent; the optional
    /// Safe Browsing and Supabase keys merely disable their feature.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            gemini_api_key: env::var("GEMINI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GEMINI_API_KEY"))?,
            jwt_secret_key: env::var("JWT_SECRET_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SECRET_KEY"))?
                .into_bytes(),

            safe_browsing_api_key: optional_var("GOOGLE_SAFE_BROWSING_API_KEY"),
            supabase_url: optional_var("SUPABASE_URL").map(|v| v.trim_end_matches('/').to_string()),
            supabase_service_role_key: optional_var("SUPABASE_SERVICE_ROLE_KEY"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10000),
        })
    }
}

/// Read an optional environment variable, treating empty values as unset.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
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
        // Set required env vars for test
        env::set_var("GOOGLE_CLIENT_ID", "test-id.apps.googleusercontent.com");
        env::set_var("GEMINI_API_KEY", "test_gemini");
        env::set_var("JWT_SECRET_KEY", "test_jwt_secret_32_bytes_minimum!");
        env::remove_var("SUPABASE_URL");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.google_client_id, "test-id.apps.googleusercontent.com");
        assert_eq!(config.gemini_api_key, "test_gemini");
        assert_eq!(config.port, 10000);
        assert!(config.supabase_url.is_none());
    }

    #[test]
    fn test_optional_var_empty_is_unset() {
        env::set_var("VERIFYNOW_TEST_EMPTY", "  ");
        assert_eq!(optional_var("VERIFYNOW_TEST_EMPTY"), None);
        env::set_var("VERIFYNOW_TEST_EMPTY", "value");
        assert_eq!(
            optional_var("VERIFYNOW_TEST_EMPTY"),
            Some("value".to_string())
        );
    }
}
