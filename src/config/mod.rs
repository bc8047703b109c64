use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_MAIL_FROM: &str = "no-reply@localhost";
const DEFAULT_DISPATCH_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    /// `DATABASE_URL`; there is no default, the server refuses to start
    /// without it.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Base URL of the member portal, used for links in outgoing email.
    pub site_url: String,
    pub mail_from: String,
    pub email_dispatch_interval: Duration,
    /// Enables HSTS.
    pub production: bool,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT);
        let site_url = lookup("SITE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

        let mut allowed_origins: Vec<String> = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        if !allowed_origins.contains(&site_url) {
            allowed_origins.push(site_url.clone());
        }

        Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            bind_addr: SocketAddr::new(host, port),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            site_url,
            mail_from: lookup("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            email_dispatch_interval: Duration::from_secs(parse_or(
                &lookup,
                "EMAIL_DISPATCH_INTERVAL_SECS",
                DEFAULT_DISPATCH_INTERVAL_SECS,
            )),
            production: lookup("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
            allowed_origins,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Config: invalid {} '{}', using {}", key, raw, default);
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.database_url, None);
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(!config.production);
        assert_eq!(
            config.email_dispatch_interval,
            Duration::from_secs(DEFAULT_DISPATCH_INTERVAL_SECS)
        );
    }

    #[test]
    fn database_url_has_no_fallback() {
        assert_eq!(config_from(&[("DATABASE_URL", "  ")]).database_url, None);
        assert_eq!(
            config_from(&[("DATABASE_URL", "postgres://db/gym")]).database_url.as_deref(),
            Some("postgres://db/gym")
        );
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("DATABASE_MAX_CONNECTIONS", "-3")]);
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn site_url_joins_allowed_origins() {
        let config = config_from(&[
            ("SITE_URL", "https://gym.example.com/"),
            ("CORS_ALLOWED_ORIGINS", "https://admin.example.com, "),
            ("RUST_ENV", "Production"),
        ]);
        assert_eq!(config.site_url, "https://gym.example.com");
        assert_eq!(
            config.allowed_origins,
            vec!["https://admin.example.com", "https://gym.example.com"]
        );
        assert!(config.production);
    }
}
