//! 项目分析 API 端点
//!
//! 按路径或上传文件夹导出 DOCX，并提供下载

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::QueryRejection, FromRequest, Multipart, Query,
        Request, State,
    },
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::api::{AnalyzeForm, AnalyzeResponse, DownloadQuery};
use crate::services::ProjectExporter;
use crate::state::{AppState, RunDir};
use crate::utils::paths::{normalize_relative, resolve_existing_dir, safe_join};

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// 创建项目分析路由
pub fn project_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/projects/analyze", post(analyze_project))
        .route("/api/projects/upload", post(analyze_upload))
        .route("/api/projects/download", get(download_docx))
}

/// 按本地路径分析项目
///
/// 同时接受 multipart 和 urlencoded 表单
async fn analyze_project(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> AppResult<Json<AnalyzeResponse>> {
    let path = read_path_field(request).await?;
    info!("Received analyze request: path={}", path);

    let root = resolve_existing_dir(&path)
        .ok_or_else(|| AppError::BadRequest("Project path not found".to_string()))?;

    let run = state.create_run_dir().await?;
    let result = export_run(&state, &root, &run).await;
    if result.is_err() {
        discard_run(&run).await;
    }
    result.map(Json)
}

/// 分析上传的文件夹
async fn analyze_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<AnalyzeResponse>> {
    let mut multipart = multipart?;
    let run = state.create_run_dir().await?;
    let upload_root = run.upload_root();

    let stored = match store_uploaded_files(&mut multipart, &upload_root).await {
        Ok(count) => count,
        Err(e) => {
            discard_run(&run).await;
            return Err(e);
        }
    };

    if stored == 0 {
        discard_run(&run).await;
        return Err(AppError::BadRequest("No files uploaded".to_string()));
    }

    info!("Stored {} uploaded files for run {}", stored, run.run_id);
    let result = export_run(&state, &upload_root, &run).await;
    if result.is_err() {
        discard_run(&run).await;
    }
    result.map(Json)
}

/// 下载生成的 DOCX，只允许运行目录内的文件
async fn download_docx(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(query) = query?;
    let not_found = || AppError::NotFound("DOCX not found".to_string());

    let path = Path::new(&query.path)
        .canonicalize()
        .map_err(|_| not_found())?;
    if !path.starts_with(&state.storage_root) || !path.is_file() {
        warn!("Rejected download outside storage: {}", query.path);
        return Err(not_found());
    }

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read {}: {}", path.display(), e)))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| crate::state::EXPORT_FILE_NAME.to_string());

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    ))
}

async fn export_run(state: &AppState, root: &Path, run: &RunDir) -> AppResult<AnalyzeResponse> {
    let output = run.export_path();
    let summary = ProjectExporter::new(state.export_config())
        .export(root, &output)
        .await?;

    Ok(AnalyzeResponse {
        run_id: run.run_id.clone(),
        docx_path: summary.output.to_string_lossy().to_string(),
        file_count: summary.file_count,
    })
}

/// 从表单中读取 `path` 字段
async fn read_path_field(request: Request) -> AppResult<String> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if !is_multipart {
        let Form(form) = Form::<AnalyzeForm>::from_request(request, &()).await?;
        return Ok(form.path);
    }

    let mut multipart = Multipart::from_request(request, &()).await?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("path") {
            return Ok(field.text().await?);
        }
    }
    Err(AppError::Unprocessable("path: Field required".to_string()))
}

/// 将 `files` 字段逐个写入上传目录，文件名即相对路径
async fn store_uploaded_files(multipart: &mut Multipart, upload_root: &Path) -> AppResult<usize> {
    let mut stored = 0;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("files") {
            continue;
        }

        let relative = field
            .file_name()
            .map(normalize_relative)
            .ok_or_else(|| AppError::BadRequest("Uploaded file is missing a filename".to_string()))?;
        let destination = safe_join(upload_root, &relative)
            .map_err(|e| AppError::BadRequest(format!("{}: {}", e, relative)))?;

        let bytes = field.bytes().await?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Internal(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(&destination, &bytes).await.map_err(|e| {
            AppError::Internal(format!("Failed to write {}: {}", destination.display(), e))
        })?;
        stored += 1;
    }

    Ok(stored)
}

async fn discard_run(run: &RunDir) {
    if let Err(e) = tokio::fs::remove_dir_all(&run.path).await {
        warn!("Failed to remove run directory {}: {}", run.path.display(), e);
    }
}
