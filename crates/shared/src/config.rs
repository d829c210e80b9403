use serde::Deserialize;
use std::env;

use crate::error::{Error, UpstreamService};

pub const DEFAULT_BAGS_API_BASE: &str = "https://api2.bags.fm/api/v1";
pub const DEFAULT_PUBLIC_API_BASE: &str = "https://public-api-v2.bags.fm/api/v1";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the built dashboard (served with an index.html fallback)
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the token listing API (bearer auth)
    pub bags_api_base: String,
    /// Base URL of the public claim stats API (API key auth)
    pub public_api_base: String,
    pub auth_token: String,
    pub public_api_key: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Tokens with a fully diluted value above this (USD) are not tracked
    pub max_fdv_usd: f64,
}

impl UpstreamConfig {
    pub fn base_url(&self, service: UpstreamService) -> &str {
        match service {
            UpstreamService::TopTokens => self.bags_api_base.trim_end_matches('/'),
            UpstreamService::ClaimStats => self.public_api_base.trim_end_matches('/'),
        }
    }

    /// Credential header injected for a service: bearer token for the token
    /// listing, API key for claim stats.
    pub fn auth_header(&self, service: UpstreamService) -> (&'static str, String) {
        match service {
            UpstreamService::TopTokens => ("authorization", format!("Bearer {}", self.auth_token)),
            UpstreamService::ClaimStats => ("x-api-key", self.public_api_key.clone()),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        // PORT is what most hosting platforms inject
        let port = env::var("SERVER_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
                static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "dist".to_string()),
            },
            upstream: UpstreamConfig {
                bags_api_base: env::var("BAGS_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_BAGS_API_BASE.to_string()),
                public_api_base: env::var("BAGS_PUBLIC_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_PUBLIC_API_BASE.to_string()),
                auth_token: required("BAGS_AUTH_TOKEN")?,
                public_api_key: required("BAGS_PUBLIC_API_KEY")?,
                request_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            },
            tracker: TrackerConfig {
                max_fdv_usd: env::var("MAX_FDV_USD")
                    .unwrap_or_else(|_| "30000".to_string())
                    .parse()?,
            },
        })
    }
}

// Credentials have no default; an empty value counts as missing
fn required(name: &str) -> Result<String, Error> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Configuration(format!("{} must be set", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream() -> UpstreamConfig {
        UpstreamConfig {
            bags_api_base: "https://bags.example/api/v1/".to_string(),
            public_api_base: DEFAULT_PUBLIC_API_BASE.to_string(),
            auth_token: "secret-token".to_string(),
            public_api_key: "secret-key".to_string(),
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let config = upstream();
        assert_eq!(
            config.base_url(UpstreamService::TopTokens),
            "https://bags.example/api/v1"
        );
        assert_eq!(
            config.base_url(UpstreamService::ClaimStats),
            DEFAULT_PUBLIC_API_BASE
        );
    }

    #[test]
    fn test_required_rejects_missing_variable() {
        let err = required("BAGS_FEE_TRACKER_TEST_UNSET_VARIABLE").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: BAGS_FEE_TRACKER_TEST_UNSET_VARIABLE must be set"
        );
    }

    #[test]
    fn test_auth_header_per_service() {
        let config = upstream();
        assert_eq!(
            config.auth_header(UpstreamService::TopTokens),
            ("authorization", "Bearer secret-token".to_string())
        );
        assert_eq!(
            config.auth_header(UpstreamService::ClaimStats),
            ("x-api-key", "secret-key".to_string())
        );
    }
}
