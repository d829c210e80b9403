use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The two upstream services the tracker talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamService {
    /// Token listing service (bearer credential).
    TopTokens,
    /// Claim statistics service (API key credential).
    ClaimStats,
}

impl fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamService::TopTokens => write!(f, "top tokens API"),
            UpstreamService::ClaimStats => write!(f, "claim stats API"),
        }
    }
}

/// Failure talking to one of the upstream services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("{service} returned error status: {status}")]
    Status { service: UpstreamService, status: u16 },

    #[error("{service} returned an unsuccessful response")]
    Unsuccessful { service: UpstreamService },

    #[error("Failed to parse {service} response: {message}")]
    Decode { service: UpstreamService, message: String },

    #[error("Failed to send request to {service}: {message}")]
    Transport { service: UpstreamService, message: String },
}

impl UpstreamError {
    pub fn service(&self) -> UpstreamService {
        match self {
            UpstreamError::Status { service, .. }
            | UpstreamError::Unsuccessful { service }
            | UpstreamError::Decode { service, .. }
            | UpstreamError::Transport { service, .. } => *service,
        }
    }

    /// HTTP status reported by the upstream (or the proxy in front of it).
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_reported_for_http_failures() {
        let status = UpstreamError::Status {
            service: UpstreamService::TopTokens,
            status: 503,
        };
        assert_eq!(status.status(), Some(503));
        assert_eq!(status.to_string(), "top tokens API returned error status: 503");

        let unsuccessful = UpstreamError::Unsuccessful {
            service: UpstreamService::ClaimStats,
        };
        assert_eq!(unsuccessful.status(), None);
        assert_eq!(unsuccessful.service(), UpstreamService::ClaimStats);
    }

    #[test]
    fn test_upstream_error_converts_into_crate_error() {
        let err: Error = UpstreamError::Transport {
            service: UpstreamService::TopTokens,
            message: "connection refused".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Upstream(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
