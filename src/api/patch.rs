//! 补丁应用 API 端点

use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::api::{ApplyRequest, ApplyResponse};
use crate::services::PatchService;
use crate::state::AppState;
use crate::utils::paths::resolve_existing_dir;

/// 创建补丁路由
pub fn patch_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/patch/apply", post(apply_patch))
}

/// 应用文件操作
async fn apply_patch(
    payload: Result<Json<ApplyRequest>, JsonRejection>,
) -> AppResult<Json<ApplyResponse>> {
    let Json(req) = payload?;
    let root = resolve_existing_dir(&req.project_root)
        .ok_or_else(|| AppError::BadRequest("Project root not found".to_string()))?;

    info!(
        "Received patch request: root={}, operations={}",
        root.display(),
        req.operations.len()
    );

    let results = tokio::task::spawn_blocking(move || {
        PatchService::new(root).apply(&req.operations)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(Json(ApplyResponse::ok(results)))
}
