use std::str::FromStr;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Service configuration, read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// sqlx connection string for the quotes database.
    pub database_url: String,
    pub max_connections: u32,
    /// Apply the bundled schema migration before serving.
    pub run_migrations: bool,
    pub cache_enabled: bool,
    /// Maximum number of cached responses.
    pub cache_capacity: u64,
}

impl Config {
    /// Load configuration from process environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `BIND_ADDR` (default: `0.0.0.0:$PORT`, `PORT` defaulting to 3000)
    /// - `DATABASE_MAX_CONNECTIONS` (default: 10)
    /// - `RUN_MIGRATIONS` (default: false)
    /// - `CACHE_ENABLED` (default: true)
    /// - `CACHE_CAPACITY` (default: 1000)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("missing DATABASE_URL"))?;

        let bind_addr = match lookup("BIND_ADDR") {
            Some(addr) => addr,
            None => {
                let port = parse_or(&lookup, "PORT", DEFAULT_PORT);
                format!("0.0.0.0:{port}")
            }
        };

        let config = Self {
            bind_addr,
            database_url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            run_migrations: flag_or(&lookup, "RUN_MIGRATIONS", false),
            cache_enabled: flag_or(&lookup, "CACHE_ENABLED", true),
            cache_capacity: parse_or(&lookup, "CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY),
        };

        tracing::info!(
            bind_addr = %config.bind_addr,
            max_connections = config.max_connections,
            run_migrations = config.run_migrations,
            cache_enabled = config.cache_enabled,
            cache_capacity = config.cache_capacity,
            "configuration loaded"
        );

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "invalid value, using default");
            default
        }),
        None => default,
    }
}

fn flag_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|raw| raw.trim().to_ascii_lowercase()) {
        Some(raw) => match raw.as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!(key, value = %raw, default, "invalid flag, using default");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[("DATABASE_URL", "sqlite://quotes.db")]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.database_url, "sqlite://quotes.db");
        assert_eq!(config.max_connections, 10);
        assert!(!config.run_migrations);
        assert!(config.cache_enabled);
        assert_eq!(config.cache_capacity, 1000);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(load(&[]).is_err());
        assert!(load(&[("DATABASE_URL", "  ")]).is_err());
    }

    #[test]
    fn port_only_changes_default_bind_addr() {
        let config = load(&[("DATABASE_URL", "sqlite::memory:"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");

        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "8080"),
            ("BIND_ADDR", "127.0.0.1:9000"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn invalid_optional_values_fall_back() {
        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "http"),
            ("DATABASE_MAX_CONNECTIONS", "-3"),
            ("CACHE_ENABLED", "maybe"),
            ("CACHE_CAPACITY", "lots"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.max_connections, 10);
        assert!(config.cache_enabled);
        assert_eq!(config.cache_capacity, 1000);
    }

    #[test]
    fn flags() {
        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("RUN_MIGRATIONS", "TRUE"),
            ("CACHE_ENABLED", "off"),
        ])
        .unwrap();

        assert!(config.run_migrations);
        assert!(!config.cache_enabled);
    }
}
