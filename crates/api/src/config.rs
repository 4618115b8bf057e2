use mineruca_gourmet::GourmetConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Whether `POST /auth/signup` is open (default: `true`).
    pub allow_signup: bool,
    /// Share lifetime when the owner does not choose one (default: `7`).
    pub share_default_expiry_days: i64,
    /// Longest share lifetime an owner may choose (default: `90`).
    pub share_max_expiry_days: i64,
    /// How long a search session stays addressable (default: `600`).
    pub search_session_ttl_secs: u64,
    /// Chat turns forwarded to the model (default: `20`).
    pub chat_history_limit: usize,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// External service credentials and endpoints.
    pub gourmet: GourmetConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                    |
    /// | `ALLOW_SIGNUP`              | `true`                  |
    /// | `SHARE_DEFAULT_EXPIRY_DAYS` | `7`                     |
    /// | `SHARE_MAX_EXPIRY_DAYS`     | `90`                    |
    /// | `SEARCH_SESSION_TTL_SECS`   | `600`                   |
    /// | `CHAT_HISTORY_LIMIT`        | `20`                    |
    ///
    /// JWT settings come from [`JwtConfig::from_env`], external services from
    /// [`GourmetConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let allow_signup: bool = std::env::var("ALLOW_SIGNUP")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("ALLOW_SIGNUP must be true or false");

        let share_default_expiry_days: i64 = std::env::var("SHARE_DEFAULT_EXPIRY_DAYS")
            .unwrap_or_else(|_| "7".into())
            .parse()
            .expect("SHARE_DEFAULT_EXPIRY_DAYS must be a valid i64");

        let share_max_expiry_days: i64 = std::env::var("SHARE_MAX_EXPIRY_DAYS")
            .unwrap_or_else(|_| "90".into())
            .parse()
            .expect("SHARE_MAX_EXPIRY_DAYS must be a valid i64");
        assert!(
            (1..=share_max_expiry_days).contains(&share_default_expiry_days),
            "SHARE_DEFAULT_EXPIRY_DAYS must be between 1 and SHARE_MAX_EXPIRY_DAYS"
        );

        let search_session_ttl_secs: u64 = std::env::var("SEARCH_SESSION_TTL_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("SEARCH_SESSION_TTL_SECS must be a valid u64");

        let chat_history_limit: usize = std::env::var("CHAT_HISTORY_LIMIT")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("CHAT_HISTORY_LIMIT must be a valid usize");

        let jwt = JwtConfig::from_env();
        let gourmet = GourmetConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            allow_signup,
            share_default_expiry_days,
            share_max_expiry_days,
            search_session_ttl_secs,
            chat_history_limit,
            jwt,
            gourmet,
        }
    }
}
