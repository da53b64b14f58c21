//! Project Analyzer - 后端服务
//!
//! 使用 axum 框架构建的后端服务，提供项目导出、Prompt 构建和补丁应用功能。

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use project_analyzer::api::build_router;
use project_analyzer::config::get_config;
use project_analyzer::state::create_shared_state;

/// 在 Windows 上设置控制台代码页为 UTF-8
#[cfg(windows)]
fn setup_console_encoding() {
    unsafe {
        extern "system" {
            fn SetConsoleOutputCP(code_page: u32) -> i32;
            fn SetConsoleCP(code_page: u32) -> i32;
        }
        SetConsoleOutputCP(65001);
        SetConsoleCP(65001);
    }
}

#[cfg(not(windows))]
fn setup_console_encoding() {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_console_encoding();

    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "project_analyzer=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Project Analyzer backend...");

    let config = get_config();
    let addr = config.socket_addr();
    info!(
        "Storage directory: {}, workers: {}",
        config.storage_dir.display(),
        config.max_workers
    );

    // 创建共享状态
    let state = create_shared_state(config)?;

    // 构建路由
    let app = build_router(state);

    info!("Server listening on: {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
