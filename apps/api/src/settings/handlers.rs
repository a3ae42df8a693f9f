//! Axum route handlers for the Settings API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::settings::store::{raw_to_value, Setting};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SettingValueQuery {
    /// Raw text used when the key is missing, parsed like a PUT body.
    pub default: Option<String>,
}

/// GET /api/v1/settings
pub async fn handle_list_settings(State(state): State<AppState>) -> Json<Vec<Setting>> {
    Json(state.settings.read().await.all())
}

/// GET /api/v1/settings/:key
pub async fn handle_get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Setting>, AppError> {
    state
        .settings
        .read()
        .await
        .get(&key)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Setting '{key}' not found")))
}

/// GET /api/v1/settings/:key/value?default=...
///
/// Bare value of a setting. A missing key answers with `default` when one
/// is given and 404 otherwise.
pub async fn handle_get_setting_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<SettingValueQuery>,
) -> Result<Json<Value>, AppError> {
    let settings = state.settings.read().await;
    match query.default {
        Some(default) => Ok(Json(settings.fallback(&key, raw_to_value(&default)))),
        None => settings
            .get(&key)
            .map(|s| Json(s.value.clone()))
            .ok_or_else(|| AppError::NotFound(format!("Setting '{key}' not found"))),
    }
}

/// PUT /api/v1/settings/:key
///
/// The body is the raw value: JSON objects/arrays are stored as JSON, any
/// other text as a string.
pub async fn handle_put_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: String,
) -> Result<Json<Setting>, AppError> {
    if key.trim().is_empty() {
        return Err(AppError::Validation("Setting key must not be empty".to_string()));
    }
    let existed = state.settings.read().await.has(&key);
    state.apply_setting(&key, raw_to_value(&body)).await?;

    let settings = state.settings.read().await;
    let stored = settings
        .get(&key)
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("setting '{key}' vanished after write")))?;
    info!(key = %key, created = !existed, "Setting saved");
    Ok(Json(stored))
}
