//! API 路由模块

mod health;
mod patch;
mod projects;
mod prompts;

pub use health::health_routes;
pub use patch::patch_routes;
pub use projects::project_routes;
pub use prompts::prompt_routes;

use axum::{extract::DefaultBodyLimit, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::AppState;

/// 创建所有 API 路由
pub fn create_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(project_routes())
        .merge(prompt_routes())
        .merge(patch_routes())
        .with_state(state)
}

/// 前端静态文件路由，目录不存在时为空
fn frontend_routes(state: &AppState) -> Router {
    let dir = &state.config.frontend_dir;
    if !dir.is_dir() {
        info!("Frontend directory {} not found, static files disabled", dir.display());
        return Router::new();
    }

    info!("Serving frontend from {}", dir.display());
    Router::new()
        .route_service("/", ServeFile::new(dir.join("index.html")))
        .nest_service("/static", ServeDir::new(dir))
}

/// 构建完整的应用路由（API + 静态文件 + 中间件）
pub fn build_router(state: Arc<AppState>) -> Router {
    // CORS 允许所有来源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .merge(frontend_routes(&state))
        .merge(create_api_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{body, response::Response, Router};
    use serde_json::Value;
    use tempfile::TempDir;

    use crate::config::AppConfig;
    use crate::state::create_shared_state;

    /// 使用临时运行目录构建应用
    pub fn test_app() -> (Router, TempDir) {
        let storage = TempDir::new().unwrap();
        let config = AppConfig {
            storage_dir: storage.path().to_path_buf(),
            frontend_dir: storage.path().join("no-frontend"),
            max_workers: 2,
            ..AppConfig::default()
        };
        let state = create_shared_state(config).unwrap();
        (super::build_router(state), storage)
    }

    pub async fn read_json(response: Response) -> Value {
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// 手工拼装 multipart 请求体：(字段名, 文件名, 内容)
    pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> (String, Vec<u8>) {
        let boundary = "X-ANALYZER-TEST-BOUNDARY";
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        (format!("multipart/form-data; boundary={}", boundary), body)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{read_json, test_app};
    use axum::{body::Body, http::{Request, StatusCode}};
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _storage) = test_app();
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn frontend_is_served_when_present() {
        use crate::config::AppConfig;
        use crate::state::create_shared_state;

        let storage = tempfile::TempDir::new().unwrap();
        let frontend = tempfile::TempDir::new().unwrap();
        std::fs::write(frontend.path().join("index.html"), "<h1>Analyzer</h1>").unwrap();
        std::fs::write(frontend.path().join("app.js"), "console.log(1)").unwrap();

        let state = create_shared_state(AppConfig {
            storage_dir: storage.path().to_path_buf(),
            frontend_dir: frontend.path().to_path_buf(),
            ..AppConfig::default()
        })
        .unwrap();
        let app = super::build_router(state);

        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/static/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
