use api::bags_client::{BagsClient, MockTransport, ReqwestTransport};
use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use shared::config::UpstreamConfig;
use shared::{UpstreamError, UpstreamService};
use std::collections::HashMap;
use std::sync::Arc;

const TOP_TOKENS: &str = "/token-launch/top-tokens/lifetime-fees";

fn claim_stats_path(token_address: &str) -> String {
    format!("/token-launch/claim-stats?tokenMint={}", token_address)
}

/// Helper to build a client over a scripted transport
fn mock_client(transport: MockTransport) -> (BagsClient, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    (BagsClient::new(transport.clone()), transport)
}

/// Helper to start a fake upstream on an ephemeral port
async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn upstream_config(base: &str) -> UpstreamConfig {
    UpstreamConfig {
        bags_api_base: format!("{}/api/v1", base),
        public_api_base: format!("{}/public/api/v1/", base),
        auth_token: "server-token".to_string(),
        public_api_key: "server-key".to_string(),
        request_timeout_secs: 5,
    }
}

#[tokio::test]
async fn test_fetch_top_tokens_decodes_listing() {
    let (client, transport) = mock_client(MockTransport::new().with_json(
        UpstreamService::TopTokens,
        TOP_TOKENS,
        200,
        json!({
            "success": true,
            "response": [
                {
                    "token": "MintAAA",
                    "lifetimeFees": "1000000000000000",
                    "tokenInfo": { "name": "Alpha", "symbol": "ALP", "fdv": 12000.5, "usdPrice": 0.012 },
                    "creators": [{ "wallet": "W1", "totalClaimed": "250" }]
                },
                { "token": "MintBBB", "lifetimeFees": 42 }
            ]
        }),
    ));

    let tokens = client.fetch_top_tokens().await.unwrap();

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].token_address, "MintAAA");
    assert_eq!(tokens[0].lifetime_fees, 1_000_000_000_000_000);
    assert_eq!(tokens[0].name(), "Alpha");
    assert_eq!(tokens[0].fully_diluted_value(), 12000.5);
    assert_eq!(tokens[0].creator_claimed_total(), Some(250));
    assert_eq!(tokens[1].lifetime_fees, 42);
    assert_eq!(tokens[1].name(), "Unknown");
    assert_eq!(
        transport.calls(),
        vec![(UpstreamService::TopTokens, TOP_TOKENS.to_string())]
    );
}

#[tokio::test]
async fn test_fetch_top_tokens_rejects_error_status() {
    let (client, _) = mock_client(MockTransport::new().with_json(
        UpstreamService::TopTokens,
        TOP_TOKENS,
        503,
        json!({ "error": "maintenance" }),
    ));

    let err = client.fetch_top_tokens().await.unwrap_err();

    assert!(matches!(
        err,
        UpstreamError::Status { service: UpstreamService::TopTokens, status: 503 }
    ));
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_fetch_top_tokens_rejects_unsuccessful_envelope() {
    let (client, _) = mock_client(MockTransport::new().with_json(
        UpstreamService::TopTokens,
        TOP_TOKENS,
        200,
        json!({ "success": false, "response": [] }),
    ));

    let err = client.fetch_top_tokens().await.unwrap_err();

    assert!(matches!(err, UpstreamError::Unsuccessful { .. }));
    assert_eq!(err.service(), UpstreamService::TopTokens);
}

#[tokio::test]
async fn test_fetch_top_tokens_rejects_missing_payload() {
    let (client, _) = mock_client(MockTransport::new().with_json(
        UpstreamService::TopTokens,
        TOP_TOKENS,
        200,
        json!({ "success": true }),
    ));

    let err = client.fetch_top_tokens().await.unwrap_err();

    assert!(matches!(err, UpstreamError::Decode { .. }));
}

#[tokio::test]
async fn test_fetch_top_tokens_rejects_malformed_amount() {
    let (client, _) = mock_client(MockTransport::new().with_json(
        UpstreamService::TopTokens,
        TOP_TOKENS,
        200,
        json!({ "success": true, "response": [{ "token": "MintAAA", "lifetimeFees": "12abc" }] }),
    ));

    let err = client.fetch_top_tokens().await.unwrap_err();

    assert!(matches!(err, UpstreamError::Decode { .. }));
}

#[tokio::test]
async fn test_fetch_top_tokens_accepts_integer_amounts_beyond_u64() {
    let body = br#"{"success":true,"response":[{"token":"MintAAA","lifetimeFees":18446744073709551616000}]}"#;
    let (client, _) = mock_client(MockTransport::new().with_json(
        UpstreamService::TopTokens,
        TOP_TOKENS,
        200,
        serde_json::from_slice(body).unwrap(),
    ));

    let tokens = client.fetch_top_tokens().await.unwrap();

    assert_eq!(tokens[0].lifetime_fees, 18_446_744_073_709_551_616_000);
}

#[tokio::test]
async fn test_fetch_claim_stats_passes_token_mint() {
    let (client, transport) = mock_client(MockTransport::new().with_json(
        UpstreamService::ClaimStats,
        &claim_stats_path("MintAAA"),
        200,
        json!({
            "success": true,
            "response": [
                { "wallet": "W1", "isCreator": true, "totalClaimed": "700" },
                { "wallet": "W2", "isCreator": false, "totalClaimed": "300" }
            ]
        }),
    ));

    let stats = client.fetch_claim_stats("MintAAA").await.unwrap();

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].total_claimed, 700);
    assert_eq!(stats[0].is_creator, Some(true));
    assert_eq!(stats[1].total_claimed, 300);
    assert_eq!(transport.calls()[0].1, claim_stats_path("MintAAA"));
}

#[tokio::test]
async fn test_fetch_claim_stats_surfaces_transport_failure() {
    let (client, _) = mock_client(MockTransport::new().with_failure(
        UpstreamService::ClaimStats,
        &claim_stats_path("MintAAA"),
        "connection reset by peer",
    ));

    let err = client.fetch_claim_stats("MintAAA").await.unwrap_err();

    assert!(matches!(err, UpstreamError::Transport { .. }));
    assert!(err.to_string().contains("connection reset by peer"));
}

#[tokio::test]
async fn test_unscripted_request_is_not_found() {
    let (client, _) = mock_client(MockTransport::new());

    let err = client.fetch_claim_stats("MintZZZ").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_reqwest_transport_injects_credentials() {
    // Fake upstream that only answers when the right credential is present
    let router = Router::new()
        .route(
            "/api/v1/token-launch/top-tokens/lifetime-fees",
            get(|headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer server-token");
                if !authorized {
                    return Err(StatusCode::UNAUTHORIZED);
                }
                Ok(Json(json!({
                    "success": true,
                    "response": [{ "token": "MintAAA", "lifetimeFees": "5000" }]
                })))
            }),
        )
        .route(
            "/public/api/v1/token-launch/claim-stats",
            get(
                |headers: HeaderMap, Query(query): Query<HashMap<String, String>>| async move {
                    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("server-key") {
                        return Err(StatusCode::UNAUTHORIZED);
                    }
                    if headers.contains_key("authorization") {
                        return Err(StatusCode::BAD_REQUEST);
                    }
                    let mint = query.get("tokenMint").cloned().unwrap_or_default();
                    Ok(Json::<Value>(json!({
                        "success": true,
                        "response": [{ "wallet": mint, "totalClaimed": "1200" }]
                    })))
                },
            ),
        );
    let base = spawn_upstream(router).await;

    let transport = ReqwestTransport::new(upstream_config(&base)).unwrap();
    let client = BagsClient::new(Arc::new(transport));

    let tokens = client.fetch_top_tokens().await.unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].lifetime_fees, 5000);

    let stats = client.fetch_claim_stats("Mint With Space").await.unwrap();
    assert_eq!(stats[0].wallet.as_deref(), Some("Mint With Space"));
    assert_eq!(stats[0].total_claimed, 1200);
}

#[tokio::test]
async fn test_reqwest_transport_reports_unreachable_host() {
    // Grab a free port, then close it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = ReqwestTransport::new(upstream_config(&format!("http://{}", addr))).unwrap();
    let client = BagsClient::new(Arc::new(transport));

    let err = client.fetch_top_tokens().await.unwrap_err();

    assert!(matches!(
        err,
        UpstreamError::Transport { service: UpstreamService::TopTokens, .. }
    ));
}
