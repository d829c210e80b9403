use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::sort_controller::{build_dashboard, toggle_sort, FeeDashboard, SortDirection, SortKey, SortSpec};
use crate::AppState;

// Response types
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

// Request types
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub sort: Option<SortKey>,
    pub direction: Option<SortDirection>,
    /// Column header the user clicked, applied on top of `sort`/`direction`
    pub toggle: Option<SortKey>,
}

impl DashboardQuery {
    pub fn sort_spec(&self) -> SortSpec {
        let default = SortSpec::default();
        let current = SortSpec {
            key: self.sort.clone().unwrap_or(default.key),
            direction: self.direction.unwrap_or(default.direction),
        };
        match &self.toggle {
            Some(key) => toggle_sort(&current, key.clone()),
            None => current,
        }
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Dashboard for the current snapshot. The first request performs the
/// initial load.
pub async fn get_fees(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<ApiResponse<FeeDashboard>>> {
    let snapshot = match state.current_snapshot().await {
        Some(snapshot) => snapshot,
        None => state.reload().await?,
    };

    Ok(Json(ApiResponse::success(build_dashboard(
        &snapshot,
        &query.sort_spec(),
    ))))
}

/// Explicit refresh: fetch everything again and replace the snapshot.
pub async fn reload_fees(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<ApiResponse<FeeDashboard>>> {
    let snapshot = state.reload().await?;

    Ok(Json(ApiResponse::success(build_dashboard(
        &snapshot,
        &query.sort_spec(),
    ))))
}
