use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub targets: Vec<String>,
    pub host: IpAddr,
    pub port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub max_body_size: usize,
    pub verify_timeout: Duration,
    pub store_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

/// Selects verbose (development) or terse (production) log output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. `from_env` is this
    /// over the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| format!("Missing required environment variable: {key}"))
        };
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = required("DATABASE_URL")?;

        let jwt = JwtConfig {
            secret: required("NOTIFIER_JWT_SECRET")?,
            issuer: lookup("NOTIFIER_JWT_ISSUER").filter(|s| !s.is_empty()),
            audience: lookup("NOTIFIER_JWT_AUDIENCE").filter(|s| !s.is_empty()),
        };
        if jwt.secret.is_empty() {
            return Err("NOTIFIER_JWT_SECRET must not be empty".to_string());
        }

        let targets = parse_targets(&required("NOTIF_TARGETS")?);

        let host: IpAddr = or("NOTIFIER_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid NOTIFIER_HOST: {e}"))?;

        let port: u16 = or("PORT", "80")
            .parse()
            .map_err(|e| format!("Invalid PORT: {e}"))?;

        let environment = match or("NOTIFIER_ENV", "development").as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };

        let default_level = if environment.is_production() {
            "info"
        } else {
            "notifier=trace,tower_http=debug,info"
        };
        let log_level = or("NOTIFIER_LOG_LEVEL", default_level);

        let max_body_size: usize = or("NOTIFIER_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid NOTIFIER_MAX_BODY_SIZE: {e}"))?;

        let verify_timeout = parse_millis(&or("NOTIFIER_VERIFY_TIMEOUT_MS", "5000"))
            .map_err(|e| format!("Invalid NOTIFIER_VERIFY_TIMEOUT_MS: {e}"))?;
        let store_timeout = parse_millis(&or("NOTIFIER_STORE_TIMEOUT_MS", "5000"))
            .map_err(|e| format!("Invalid NOTIFIER_STORE_TIMEOUT_MS: {e}"))?;

        Ok(Config {
            database_url,
            jwt,
            targets,
            host,
            port,
            environment,
            log_level,
            max_body_size,
            verify_timeout,
            store_timeout,
        })
    }
}

/// Split the comma-separated allow-list, dropping blank entries.
pub fn parse_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_millis(raw: &str) -> Result<Duration, std::num::ParseIntError> {
    raw.parse::<u64>().map(Duration::from_millis)
}
