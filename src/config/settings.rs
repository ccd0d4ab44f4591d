//! Application settings loaded from environment variables and an optional
//! JSON override file.

use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use super::constants::{
    DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_APP_NAME, DEFAULT_CACHE_KEY_PREFIX,
    DEFAULT_DATABASE_URL, DEFAULT_DB_CONNECT_TIMEOUT_SECS, DEFAULT_DB_IDLE_TIMEOUT_SECS,
    DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_DB_MAX_LIFETIME_SECS, DEFAULT_DB_MIN_CONNECTIONS,
    DEFAULT_LOG_LEVEL, DEFAULT_REFRESH_TOKEN_TTL_SECONDS, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, DEV_ACCESS_TOKEN_SECRET, DEV_REFRESH_TOKEN_SECRET,
    MIN_JWT_SECRET_LENGTH,
};

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    MissingSecret(&'static str),

    #[error("{0} must be at least {min} characters long", min = MIN_JWT_SECRET_LENGTH)]
    WeakSecret(&'static str),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to read config file {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Database pool settings
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    /// Log every SQL statement at debug level
    pub sqlx_logging: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            min_connections: DEFAULT_DB_MIN_CONNECTIONS,
            connect_timeout_secs: DEFAULT_DB_CONNECT_TIMEOUT_SECS,
            idle_timeout_secs: DEFAULT_DB_IDLE_TIMEOUT_SECS,
            max_lifetime_secs: DEFAULT_DB_MAX_LIFETIME_SECS,
            sqlx_logging: false,
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub app_name: String,
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub database: DatabaseSettings,
    pub log_level: String,
    pub log_file: Option<String>,
    access_token_secret: String,
    refresh_token_secret: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    /// Redis is optional; token revocation is disabled without it
    pub redis_url: Option<String>,
    pub cache_key_prefix: String,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
    development_secrets: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_name", &self.app_name)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("database_url", &"[REDACTED]")
            .field("database", &self.database)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .field("access_token_secret", &"[REDACTED]")
            .field("refresh_token_secret", &"[REDACTED]")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("redis_url", &self.redis_url.as_ref().map(|_| "[REDACTED]"))
            .field("cache_key_prefix", &self.cache_key_prefix)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

/// Development defaults. Secrets are the insecure development values.
impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            database: DatabaseSettings::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
            access_token_secret: DEV_ACCESS_TOKEN_SECRET.to_string(),
            refresh_token_secret: DEV_REFRESH_TOKEN_SECRET.to_string(),
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            redis_url: None,
            cache_key_prefix: DEFAULT_CACHE_KEY_PREFIX.to_string(),
            cors_allowed_origins: Vec::new(),
            development_secrets: true,
        }
    }
}

/// Keys accepted in the JSON override file. Present keys win over the
/// environment.
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    app_name: Option<String>,
    server_host: Option<String>,
    server_port: Option<u16>,
    database_url: Option<String>,
    db_max_connections: Option<u32>,
    db_min_connections: Option<u32>,
    db_connect_timeout_secs: Option<u64>,
    db_idle_timeout_secs: Option<u64>,
    db_max_lifetime_secs: Option<u64>,
    db_debug: Option<bool>,
    log_level: Option<String>,
    log_file: Option<String>,
    access_token_secret: Option<String>,
    refresh_token_secret: Option<String>,
    access_token_ttl_seconds: Option<i64>,
    refresh_token_ttl_seconds: Option<i64>,
    redis_url: Option<String>,
    cache_key_prefix: Option<String>,
    cors_allowed_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from `.env`, the process environment and an
    /// optional JSON file, then validate the token secrets.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = Self::from_env()?;
        if let Some(path) = path {
            config.apply_file(path)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Read every supported environment variable over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(name) = env::var("APP_NAME") {
            config.app_name = name;
        }
        if let Ok(host) = env::var("SERVER_HOST") {
            config.server_host = host;
        }
        config.server_port = parse_env("SERVER_PORT", config.server_port)?;
        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }

        let db = &mut config.database;
        db.max_connections = parse_env("DB_MAX_CONNECTIONS", db.max_connections)?;
        db.min_connections = parse_env("DB_MIN_CONNECTIONS", db.min_connections)?;
        db.connect_timeout_secs = parse_env("DB_CONNECT_TIMEOUT_SECS", db.connect_timeout_secs)?;
        db.idle_timeout_secs = parse_env("DB_IDLE_TIMEOUT_SECS", db.idle_timeout_secs)?;
        db.max_lifetime_secs = parse_env("DB_MAX_LIFETIME_SECS", db.max_lifetime_secs)?;
        db.sqlx_logging = parse_env("DB_DEBUG", db.sqlx_logging)?;

        if let Ok(level) = env::var("LOG_LEVEL") {
            config.log_level = level;
        }
        config.log_file = env::var("LOG_FILE_PATH").ok().filter(|p| !p.is_empty());

        match (
            env::var("JWT_ACCESS_TOKEN_SECRET"),
            env::var("JWT_REFRESH_TOKEN_SECRET"),
        ) {
            (Ok(access), Ok(refresh)) => {
                config.access_token_secret = access;
                config.refresh_token_secret = refresh;
                config.development_secrets = false;
            }
            (Err(_), _) if !cfg!(debug_assertions) => {
                return Err(ConfigError::MissingSecret("JWT_ACCESS_TOKEN_SECRET"));
            }
            (_, Err(_)) if !cfg!(debug_assertions) => {
                return Err(ConfigError::MissingSecret("JWT_REFRESH_TOKEN_SECRET"));
            }
            // Development: keep the insecure defaults for whichever is missing
            (access, refresh) => {
                if let Ok(access) = access {
                    config.access_token_secret = access;
                }
                if let Ok(refresh) = refresh {
                    config.refresh_token_secret = refresh;
                }
            }
        }

        config.access_token_ttl_seconds =
            parse_env("JWT_ACCESS_TOKEN_EXPIRY", config.access_token_ttl_seconds)?;
        config.refresh_token_ttl_seconds =
            parse_env("JWT_REFRESH_TOKEN_EXPIRY", config.refresh_token_ttl_seconds)?;

        config.redis_url = env::var("REDIS_URL").ok().filter(|u| !u.is_empty());
        if let Ok(prefix) = env::var("CACHE_KEY_PREFIX") {
            config.cache_key_prefix = prefix;
        }
        if let Ok(origins) = env::var("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(config)
    }

    fn apply_file(&mut self, path: &str) -> Result<(), ConfigError> {
        let raw = std::fs::read_to_string(Path::new(path)).map_err(|source| ConfigError::File {
            path: path.to_string(),
            source,
        })?;
        let file: FileOverrides =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            })?;
        self.merge(file);
        Ok(())
    }

    fn merge(&mut self, file: FileOverrides) {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        set(&mut self.app_name, file.app_name);
        set(&mut self.server_host, file.server_host);
        set(&mut self.server_port, file.server_port);
        set(&mut self.database_url, file.database_url);
        set(&mut self.database.max_connections, file.db_max_connections);
        set(&mut self.database.min_connections, file.db_min_connections);
        set(&mut self.database.connect_timeout_secs, file.db_connect_timeout_secs);
        set(&mut self.database.idle_timeout_secs, file.db_idle_timeout_secs);
        set(&mut self.database.max_lifetime_secs, file.db_max_lifetime_secs);
        set(&mut self.database.sqlx_logging, file.db_debug);
        set(&mut self.log_level, file.log_level);
        set(&mut self.access_token_ttl_seconds, file.access_token_ttl_seconds);
        set(&mut self.refresh_token_ttl_seconds, file.refresh_token_ttl_seconds);
        set(&mut self.cache_key_prefix, file.cache_key_prefix);
        set(&mut self.cors_allowed_origins, file.cors_allowed_origins);

        if file.log_file.is_some() {
            self.log_file = file.log_file;
        }
        if file.redis_url.is_some() {
            self.redis_url = file.redis_url;
        }
        if let (Some(access), Some(refresh)) = (file.access_token_secret, file.refresh_token_secret)
        {
            self.access_token_secret = access;
            self.refresh_token_secret = refresh;
            self.development_secrets = false;
        }
    }

    /// Reject secrets shorter than the minimum length.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::WeakSecret("JWT_ACCESS_TOKEN_SECRET"));
        }
        if self.refresh_token_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::WeakSecret("JWT_REFRESH_TOKEN_SECRET"));
        }
        for (key, ttl) in [
            ("JWT_ACCESS_TOKEN_EXPIRY", self.access_token_ttl_seconds),
            ("JWT_REFRESH_TOKEN_EXPIRY", self.refresh_token_ttl_seconds),
        ] {
            if ttl <= 0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: ttl.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether either token secret is still the development default.
    pub fn uses_development_secrets(&self) -> bool {
        self.development_secrets
    }

    /// Secret bytes for access token signing/verification.
    pub fn access_secret_bytes(&self) -> &[u8] {
        self.access_token_secret.as_bytes()
    }

    /// Secret bytes for refresh token signing/verification.
    pub fn refresh_secret_bytes(&self) -> &[u8] {
        self.refresh_token_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_env<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.uses_development_secrets());
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.access_token_ttl_seconds, 900);
        assert_eq!(config.refresh_token_ttl_seconds, 604_800);
    }

    #[test]
    fn test_weak_secret_rejected() {
        let mut config = Config::default();
        config.merge(FileOverrides {
            access_token_secret: Some("short".to_string()),
            refresh_token_secret: Some("x".repeat(40)),
            ..Default::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeakSecret("JWT_ACCESS_TOKEN_SECRET"))
        ));
    }

    #[test]
    fn test_file_overrides_win() {
        let mut config = Config::default();
        let file: FileOverrides = serde_json::from_str(
            r#"{"server_port": 9090, "redis_url": "redis://cache:6379", "cors_allowed_origins": ["http://localhost:5173"]}"#,
        )
        .unwrap();
        config.merge(file);

        assert_eq!(config.server_port, 9090);
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.app_name, DEFAULT_APP_NAME);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::default();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains(DEV_ACCESS_TOKEN_SECRET));
        assert!(!rendered.contains(DEFAULT_DATABASE_URL));
        assert!(rendered.contains("[REDACTED]"));
    }
}
