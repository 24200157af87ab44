//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SESSION_SWEEP_INTERVAL_SECONDS, PRODUCTION_ENV,
};

/// Credentials used to create the first admin on an empty database.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub display_name: String,
    password: String,
}

impl AdminBootstrap {
    /// Plain-text bootstrap password, hashed before it reaches storage.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub app_env: String,
    pub session_sweep_interval_seconds: u64,
    pub admin_bootstrap: Option<AdminBootstrap>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("app_env", &self.app_env)
            .field(
                "session_sweep_interval_seconds",
                &self.session_sweep_interval_seconds,
            )
            .field("admin_bootstrap", &self.admin_bootstrap)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_bootstrap = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) if !username.trim().is_empty() => Some(AdminBootstrap {
                display_name: env::var("ADMIN_DISPLAY_NAME")
                    .unwrap_or_else(|_| "Administrator".to_string()),
                username: username.trim().to_lowercase(),
                password,
            }),
            _ => None,
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            session_sweep_interval_seconds: env::var("SESSION_SWEEP_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_SESSION_SWEEP_INTERVAL_SECONDS),
            admin_bootstrap,
        }
    }

    /// Whether the service runs in production (secure cookies).
    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case(PRODUCTION_ENV)
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
