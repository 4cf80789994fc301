//! Accounts API endpoints

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::AppState;

/// Distinct account names known to ledger
pub async fn api_accounts(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.dashboard.cache().get_accounts().await?))
}

/// `ledger --version`, doubling as a check that the executable runs
pub async fn api_version(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let cache = state.dashboard.cache();
    let version = cache.client().version(&cache.settings()).await?;
    Ok(Json(json!({ "version": version })))
}
