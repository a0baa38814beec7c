use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: &str = "America/New_York";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("FITFRIEND_TIMEZONE '{0}' is not a known IANA time zone")]
    InvalidTimezone(String),
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Process configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string. Without it the service runs on the
    /// in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Zone that decides which calendar day "today" is.
    pub timezone: Tz,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timezone_name =
            lookup("FITFRIEND_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = timezone_name
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(timezone_name.clone()))?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections: parse_number(
                "DATABASE_MAX_CONNECTIONS",
                lookup("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            timezone,
            port: parse_number("PORT", lookup("PORT"), DEFAULT_PORT)?,
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.timezone, chrono_tz::America::New_York);
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_max_connections, 20);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn timezone_and_port_are_read() {
        let config = config_from(&[
            ("FITFRIEND_TIMEZONE", "Europe/Berlin"),
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/fitfriend"),
        ])
        .unwrap();
        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/fitfriend")
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("FITFRIEND_TIMEZONE", "Mars/Olympus")]),
            Err(ConfigError::InvalidTimezone(_))
        ));
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidNumber { name: "PORT", .. })
        ));
    }
}
