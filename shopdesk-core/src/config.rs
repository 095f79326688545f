//! Gateway configuration
//!
//! Resolution order: defaults, then `shopdesk.toml`, then `SHOPDESK_*`
//! environment variables, then command line flags (applied by the binary).

use crate::error::{ErrorContext, ShopdeskError, ShopdeskResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for the admin gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub routes: RouteConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
        }
    }
}

/// Where the commerce REST backend lives and how to talk to it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// Endpoint answering `POST {"username"}` with the user's permission names
    pub permissions_path: String,
    /// JSON field of the permissions response that holds the list
    pub permissions_field: String,
    /// Endpoint answering `POST {"username","password"}` with a token
    pub login_path: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            permissions_path: "/api/business-admin/permissions/lookup".to_string(),
            permissions_field: "permissions".to_string(),
            login_path: "/api/business-admin/login".to_string(),
            timeout_secs: 10,
        }
    }
}

impl BackendConfig {
    pub fn permissions_url(&self) -> String {
        join_url(&self.base_url, &self.permissions_path)
    }

    pub fn login_url(&self) -> String {
        join_url(&self.base_url, &self.login_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Session cookies and authorization-store lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub token_cookie: String,
    pub username_cookie: String,
    /// Cookie lifetime when the backend does not say, and store-entry lifetime
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub secure_cookies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_cookie: "token".to_string(),
            username_cookie: "username".to_string(),
            ttl_secs: 8 * 60 * 60,
            sweep_interval_secs: 300,
            secure_cookies: false,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Fixed navigation targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub login_path: String,
    pub logout_path: String,
    pub forbidden_path: String,
    pub home_path: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: "/authentication/login/minimal".to_string(),
            logout_path: "/authentication/logout".to_string(),
            forbidden_path: "/forbidden".to_string(),
            home_path: "/".to_string(),
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl AdminConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> ShopdeskResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ShopdeskError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        toml::from_str(&content).map_err(|e| ShopdeskError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })
    }

    /// Override fields from `SHOPDESK_*` variables
    pub fn apply_env(&mut self) -> ShopdeskResult<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars<F>(&mut self, lookup: F) -> ShopdeskResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SHOPDESK_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SHOPDESK_PORT") {
            self.server.port = parse_var("SHOPDESK_PORT", &port)?;
        }
        if let Some(dev) = lookup("SHOPDESK_DEV_MODE") {
            self.server.dev_mode = parse_var("SHOPDESK_DEV_MODE", &dev)?;
        }
        if let Some(url) = lookup("SHOPDESK_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Some(path) = lookup("SHOPDESK_PERMISSIONS_PATH") {
            self.backend.permissions_path = path;
        }
        if let Some(field) = lookup("SHOPDESK_PERMISSIONS_FIELD") {
            self.backend.permissions_field = field;
        }
        if let Some(path) = lookup("SHOPDESK_BACKEND_LOGIN_PATH") {
            self.backend.login_path = path;
        }
        if let Some(timeout) = lookup("SHOPDESK_BACKEND_TIMEOUT_SECS") {
            self.backend.timeout_secs = parse_var("SHOPDESK_BACKEND_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(ttl) = lookup("SHOPDESK_SESSION_TTL_SECS") {
            self.session.ttl_secs = parse_var("SHOPDESK_SESSION_TTL_SECS", &ttl)?;
        }
        if let Some(secure) = lookup("SHOPDESK_SECURE_COOKIES") {
            self.session.secure_cookies = parse_var("SHOPDESK_SECURE_COOKIES", &secure)?;
        }
        if let Some(level) = lookup("SHOPDESK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("SHOPDESK_LOG_FORMAT") {
            self.logging.format = format
                .parse()
                .map_err(|e: String| crate::validation_error!(e, "SHOPDESK_LOG_FORMAT", "config"))?;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ShopdeskResult<()> {
        if self.server.port == 0 {
            return Err(crate::validation_error!(
                "Port must be greater than 0",
                "server.port",
                "config"
            ));
        }

        url::Url::parse(&self.backend.base_url).map_err(|e| ShopdeskError::Config {
            message: format!("Invalid backend base_url '{}': {}", self.backend.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Use an absolute URL such as http://127.0.0.1:3000"),
        })?;

        if self.backend.permissions_field.is_empty() {
            return Err(crate::validation_error!(
                "permissions_field must not be empty",
                "backend.permissions_field",
                "config"
            ));
        }

        if self.backend.timeout_secs == 0 {
            return Err(crate::validation_error!(
                "Backend timeout must be greater than 0",
                "backend.timeout_secs",
                "config"
            ));
        }

        if self.session.token_cookie.is_empty()
            || self.session.username_cookie.is_empty()
            || self.session.token_cookie == self.session.username_cookie
        {
            return Err(crate::validation_error!(
                "Token and username cookies need distinct, non-empty names",
                "session.token_cookie",
                "config"
            ));
        }

        if self.session.ttl_secs == 0 || self.session.sweep_interval_secs == 0 {
            return Err(crate::validation_error!(
                "Session ttl and sweep interval must be greater than 0",
                "session.ttl_secs",
                "config"
            ));
        }

        for (field, path) in [
            ("routes.login_path", &self.routes.login_path),
            ("routes.logout_path", &self.routes.logout_path),
            ("routes.forbidden_path", &self.routes.forbidden_path),
            ("routes.home_path", &self.routes.home_path),
        ] {
            if !path.starts_with('/') {
                return Err(crate::validation_error!(
                    format!("Route '{}' must start with '/'", path),
                    field,
                    "config"
                ));
            }
        }

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T>(key: &str, value: &str) -> ShopdeskResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| {
            crate::config_error!(format!("Invalid value '{}' for {}: {}", value, key, e), "config")
        })
}
