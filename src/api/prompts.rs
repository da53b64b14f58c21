//! Prompt 构建 API 端点

use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use std::sync::Arc;
use tracing::info;

use crate::error::AppResult;
use crate::models::api::{PromptPayload, PromptRequest};
use crate::services::PromptService;
use crate::state::AppState;

/// 创建 Prompt 路由
pub fn prompt_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/prompts/build", post(build_prompt))
}

/// 构建 Prompt 载荷
async fn build_prompt(
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> AppResult<Json<PromptPayload>> {
    let Json(req) = payload?;
    info!(
        "Building prompt: task_len={}, has_summary={}",
        req.task.len(),
        req.project_summary.is_some()
    );

    let payload = PromptService::new().build_payload(req)?;
    Ok(Json(payload))
}
