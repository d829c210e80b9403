use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::config::UpstreamConfig;
use shared::models::{ApiEnvelope, ClaimStat, TokenEntry};
use shared::{UpstreamError, UpstreamService};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

const TOP_TOKENS_PATH: &str = "/token-launch/top-tokens/lifetime-fees";
const CLAIM_STATS_PATH: &str = "/token-launch/claim-stats";

/// Raw upstream reply: status plus undecoded body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP used by [`BagsClient`]. Implementations own base URLs and
/// credential injection.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn get(
        &self,
        service: UpstreamService,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<TransportResponse, UpstreamError>;
}

/// reqwest-backed transport talking to the upstream hosts directly.
pub struct ReqwestTransport {
    client: Client,
    config: UpstreamConfig,
}

impl ReqwestTransport {
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: UpstreamConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl UpstreamTransport for ReqwestTransport {
    async fn get(
        &self,
        service: UpstreamService,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<TransportResponse, UpstreamError> {
        let url = format!("{}{}", self.config.base_url(service), path);
        let (header, credential) = self.config.auth_header(service);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header(header, credential)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                service,
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport {
                service,
                message: e.to_string(),
            })?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

enum MockReply {
    Respond(TransportResponse),
    Fail(String),
}

/// Scripted transport for tests. Requests are keyed by `path?k=v` (unencoded);
/// anything unscripted answers 404.
#[derive(Default)]
pub struct MockTransport {
    replies: HashMap<(UpstreamService, String), MockReply>,
    calls: Mutex<Vec<(UpstreamService, String)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(
        mut self,
        service: UpstreamService,
        path_and_query: &str,
        status: u16,
        body: serde_json::Value,
    ) -> Self {
        let reply = TransportResponse {
            status,
            body: body.to_string().into_bytes(),
        };
        self.replies
            .insert((service, path_and_query.to_string()), MockReply::Respond(reply));
        self
    }

    pub fn with_failure(mut self, service: UpstreamService, path_and_query: &str, message: &str) -> Self {
        self.replies.insert(
            (service, path_and_query.to_string()),
            MockReply::Fail(message.to_string()),
        );
        self
    }

    pub fn calls(&self) -> Vec<(UpstreamService, String)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl UpstreamTransport for MockTransport {
    async fn get(
        &self,
        service: UpstreamService,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<TransportResponse, UpstreamError> {
        let mut key = path.to_string();
        for (i, (name, value)) in query.iter().enumerate() {
            key.push(if i == 0 { '?' } else { '&' });
            key.push_str(name);
            key.push('=');
            key.push_str(value);
        }

        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((service, key.clone()));

        match self.replies.get(&(service, key)) {
            Some(MockReply::Respond(reply)) => Ok(reply.clone()),
            Some(MockReply::Fail(message)) => Err(UpstreamError::Transport {
                service,
                message: message.clone(),
            }),
            None => Ok(TransportResponse {
                status: 404,
                body: Vec::new(),
            }),
        }
    }
}

/// Client for the token listing and claim stats endpoints.
pub struct BagsClient {
    transport: Arc<dyn UpstreamTransport>,
}

impl BagsClient {
    pub fn new(transport: Arc<dyn UpstreamTransport>) -> Self {
        Self { transport }
    }

    /// Tokens ranked by lifetime fees.
    pub async fn fetch_top_tokens(&self) -> Result<Vec<TokenEntry>, UpstreamError> {
        self.get_envelope(UpstreamService::TopTokens, TOP_TOKENS_PATH, &[])
            .await
    }

    /// Claim records for one token, one per claiming wallet.
    pub async fn fetch_claim_stats(&self, token_address: &str) -> Result<Vec<ClaimStat>, UpstreamError> {
        self.get_envelope(
            UpstreamService::ClaimStats,
            CLAIM_STATS_PATH,
            &[("tokenMint", token_address)],
        )
        .await
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        service: UpstreamService,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        debug!("GET {} {}", service, path);

        let response = self.transport.get(service, path, query).await.map_err(|e| {
            warn!("{}", e);
            e
        })?;

        if !response.is_success() {
            warn!("{} returned error status: {}", service, response.status);
            return Err(UpstreamError::Status {
                service,
                status: response.status,
            });
        }

        let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_slice(&response.body)
            .map_err(|e| UpstreamError::Decode {
                service,
                message: e.to_string(),
            })?;

        if !envelope.success {
            warn!("{} returned success=false", service);
            return Err(UpstreamError::Unsuccessful { service });
        }

        let payload = envelope.response.ok_or_else(|| UpstreamError::Decode {
            service,
            message: "response payload missing".to_string(),
        })?;

        serde_json::from_value(payload).map_err(|e| UpstreamError::Decode {
            service,
            message: e.to_string(),
        })
    }
}
