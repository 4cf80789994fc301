//! Settings API endpoints - ledger settings, cache state and prefetch

use axum::extract::State;
use axum::Json;
use ledgerdash_core::{CacheStats, CalendarDate, LedgerSettings};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub ledger: LedgerSettings,
    pub dashboard: ledgerdash_config::DashboardConfig,
    pub cache: CacheStats,
}

fn snapshot(state: &AppState) -> SettingsResponse {
    let cache = state.dashboard.cache();
    SettingsResponse {
        ledger: cache.settings(),
        dashboard: state.config.dashboard.clone(),
        cache: cache.stats(),
    }
}

pub async fn api_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(snapshot(&state))
}

/// Replace the ledger settings; a new journal path empties the cache
pub async fn api_update_settings(
    State(state): State<AppState>,
    Json(settings): Json<LedgerSettings>,
) -> ApiResult<Json<Value>> {
    settings.validate()?;
    let cleared = state.dashboard.cache().update_settings(settings);
    log::info!("Ledger settings updated (cache cleared: {})", cleared);
    Ok(Json(json!({
        "cleared": cleared,
        "settings": snapshot(&state),
    })))
}

/// Warm the cache for the trailing months
pub async fn api_prefetch(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.dashboard.prefetch(CalendarDate::today()).await?;
    Ok(Json(json!({
        "success": true,
        "cache": state.dashboard.cache().stats(),
    })))
}
