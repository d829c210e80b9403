use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::Response,
};
use reqwest::Client;
use shared::config::UpstreamConfig;
use shared::UpstreamService;
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

// Never forwarded upstream. Credentials are always replaced server side and
// the host follows the target URL.
const STRIPPED_REQUEST_HEADERS: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
    "accept-encoding",
    "authorization",
    "x-api-key",
];

const FORWARDED_RESPONSE_HEADERS: &[&str] = &[
    "content-type",
    "cache-control",
    "etag",
    "last-modified",
];

/// Path prefix the browser uses for a service.
pub fn proxy_prefix(service: UpstreamService) -> &'static str {
    match service {
        UpstreamService::TopTokens => "/api/bags",
        UpstreamService::ClaimStats => "/api/public",
    }
}

/// Forwards browser requests to the upstream APIs, adding the credential
/// for each service so it never reaches the browser.
pub struct UpstreamProxy {
    client: Client,
    config: UpstreamConfig,
}

impl UpstreamProxy {
    pub fn new(client: Client, config: UpstreamConfig) -> Self {
        Self { client, config }
    }

    pub fn target_url(&self, service: UpstreamService, path: &str, query: Option<&str>) -> String {
        let mut url = format!(
            "{}/{}",
            self.config.base_url(service),
            path.trim_start_matches('/')
        );
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    pub async fn forward(
        &self,
        service: UpstreamService,
        method: Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: Bytes,
    ) -> ApiResult<Response> {
        let path = uri
            .path()
            .strip_prefix(proxy_prefix(service))
            .unwrap_or_else(|| uri.path());
        let target = self.target_url(service, path, uri.query());
        let upstream_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
            .map_err(|e| ApiError::ValidationError(format!("Unsupported method {}: {}", method, e)))?;

        let mut request = self.client.request(upstream_method, &target);
        for (name, value) in headers {
            if STRIPPED_REQUEST_HEADERS.contains(&name.as_str()) {
                continue;
            }
            request = request.header(name.as_str(), value.as_bytes());
        }
        let (auth_name, auth_value) = self.config.auth_header(service);
        request = request.header(auth_name, auth_value);
        if !body.is_empty() {
            request = request.body(body);
        }

        info!("Proxying to {}: {} {}", service, method, target);
        let upstream = request.send().await?;

        let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        info!("{} response: {}", service, status);

        let forwarded: Vec<(String, Vec<u8>)> = upstream
            .headers()
            .iter()
            .filter(|(name, _)| FORWARDED_RESPONSE_HEADERS.contains(&name.as_str()))
            .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
            .collect();
        let bytes = upstream.bytes().await?;

        let mut response = Response::builder().status(status);
        for (name, value) in forwarded {
            response = response.header(name, value);
        }
        response
            .body(Body::from(bytes))
            .map_err(|e| ApiError::InternalError(format!("Failed to build proxy response: {}", e)))
    }
}

/// `/api/bags/*path` → token listing API with the bearer token.
pub async fn proxy_bags(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    state
        .proxy
        .forward(UpstreamService::TopTokens, method, &uri, &headers, body)
        .await
}

/// `/api/public/*path` → public API with the API key.
pub async fn proxy_public(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    state
        .proxy
        .forward(UpstreamService::ClaimStats, method, &uri, &headers, body)
        .await
}
