pub mod bags_client;
pub mod error;
pub mod fee_aggregator;
pub mod handlers;
pub mod logging;
pub mod proxy;
pub mod routes;
pub mod sort_controller;

pub use bags_client::{BagsClient, MockTransport, ReqwestTransport, TransportResponse, UpstreamTransport};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use fee_aggregator::{FeeAggregator, FeeSnapshot};
pub use proxy::UpstreamProxy;
pub use sort_controller::{build_dashboard, FeeDashboard, SortDirection, SortKey, SortSpec};

use shared::config::TrackerConfig;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub fee_aggregator: Arc<FeeAggregator>,
    pub proxy: Arc<UpstreamProxy>,
    pub tracker: TrackerConfig,
    snapshot: RwLock<Option<Arc<FeeSnapshot>>>,
}

impl AppState {
    pub fn new(
        fee_aggregator: Arc<FeeAggregator>,
        proxy: Arc<UpstreamProxy>,
        tracker: TrackerConfig,
    ) -> Self {
        Self {
            fee_aggregator,
            proxy,
            tracker,
            snapshot: RwLock::new(None),
        }
    }

    /// Run a reload cycle and swap the result in. Readers holding the old
    /// snapshot keep it until they drop it.
    pub async fn reload(&self) -> ApiResult<Arc<FeeSnapshot>> {
        let snapshot = Arc::new(self.fee_aggregator.reload(self.tracker.max_fdv_usd).await?);
        *self.snapshot.write().await = Some(snapshot.clone());
        info!(
            "Fee snapshot replaced ({} tokens, fetched at {})",
            snapshot.tokens.len(),
            snapshot.fetched_at
        );
        Ok(snapshot)
    }

    pub async fn current_snapshot(&self) -> Option<Arc<FeeSnapshot>> {
        self.snapshot.read().await.clone()
    }
}
