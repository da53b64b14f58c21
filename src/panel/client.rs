//! 控制面板客户端
//!
//! 把四个用户操作绑定到四个后端请求，并把结果写回视图

use parking_lot::Mutex;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Response};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use super::upload::UploadFile;
use super::view::{self, PanelView};
use super::PanelError;

/// 默认后端地址
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

/// 控制面板
///
/// 操作之间互不协调，同一操作的重复调用也不做去重
pub struct ControlPanel {
    client: Client,
    base_url: Url,
    view: Mutex<PanelView>,
}

impl ControlPanel {
    /// 创建连接到 `base_url` 的面板
    pub fn new(base_url: &str) -> Result<Self, PanelError> {
        Self::with_client(base_url, Client::new())
    }

    /// 使用自定义 HTTP 客户端
    pub fn with_client(base_url: &str, client: Client) -> Result<Self, PanelError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            view: Mutex::new(PanelView::default()),
        })
    }

    /// 当前视图快照
    pub fn view(&self) -> PanelView {
        self.view.lock().clone()
    }

    fn set_status(&self, message: impl Into<String>) {
        self.view.lock().status = message.into();
    }

    fn set_prompt_output(&self, message: impl Into<String>) {
        self.view.lock().prompt_output = message.into();
    }

    fn set_apply_output(&self, message: impl Into<String>) {
        self.view.lock().apply_output = message.into();
    }

    fn navigate(&self, url: Url) {
        info!("Navigating to {}", url);
        self.view.lock().navigation = Some(url.to_string());
    }

    fn endpoint(&self, path: &str) -> Result<Url, PanelError> {
        Ok(self.base_url.join(path)?)
    }

    /// 下载地址：`/api/projects/download?path=<编码后的路径>`
    pub fn download_url(&self, docx_path: &str) -> Result<Url, PanelError> {
        let mut url = self.endpoint("/api/projects/download")?;
        url.query_pairs_mut().append_pair("path", docx_path);
        Ok(url)
    }

    /// 按路径分析项目
    pub async fn analyze_by_path(&self, path: &str) {
        if let Err(e) = self.try_analyze_by_path(path).await {
            self.set_status(format!("Error: {}", e));
        }
    }

    async fn try_analyze_by_path(&self, path: &str) -> Result<(), PanelError> {
        let path = path.trim();
        if path.is_empty() {
            self.set_status(view::MSG_ENTER_PATH);
            return Ok(());
        }

        self.set_status(view::MSG_ANALYZING);
        let form = Form::new().text("path", path.to_string());
        let response = self
            .client
            .post(self.endpoint("/api/projects/analyze")?)
            .multipart(form)
            .send()
            .await?;

        self.handle_analyze_response(response).await
    }

    /// 上传文件夹并分析
    pub async fn analyze_upload(&self, files: Vec<UploadFile>) {
        if let Err(e) = self.try_analyze_upload(files).await {
            self.set_status(format!("Error: {}", e));
        }
    }

    async fn try_analyze_upload(&self, files: Vec<UploadFile>) -> Result<(), PanelError> {
        if files.is_empty() {
            self.set_status(view::MSG_SELECT_FOLDER);
            return Ok(());
        }

        self.set_status(view::MSG_UPLOADING);
        debug!("Uploading {} files", files.len());
        let form = files.into_iter().fold(Form::new(), |form, file| {
            form.part(
                "files",
                Part::bytes(file.contents).file_name(file.relative_path),
            )
        });

        let response = self
            .client
            .post(self.endpoint("/api/projects/upload")?)
            .multipart(form)
            .send()
            .await?;

        self.handle_analyze_response(response).await
    }

    async fn handle_analyze_response(&self, response: Response) -> Result<(), PanelError> {
        let ok = response.status().is_success();
        let status = response.status();
        let result: Value = response.json().await?;

        if !ok {
            self.set_status(format!("Error: {}", detail_text(&result, status)));
            return Ok(());
        }

        let file_count = match &result["file_count"] {
            Value::String(s) => s.clone(),
            Value::Null => "undefined".to_string(),
            other => other.to_string(),
        };
        let docx_path = result["docx_path"]
            .as_str()
            .ok_or_else(|| PanelError::InvalidResponse("missing docx_path".to_string()))?;

        self.set_status(view::ready_message(&file_count));
        let url = self.download_url(docx_path)?;
        self.navigate(url);
        Ok(())
    }

    /// 构建 Prompt，原样显示返回的 JSON
    pub async fn build_prompt(&self, task: &str, summary: Option<&str>) {
        if let Err(e) = self.try_build_prompt(task, summary).await {
            self.set_prompt_output(format!("Error: {}", e));
        }
    }

    async fn try_build_prompt(&self, task: &str, summary: Option<&str>) -> Result<(), PanelError> {
        let task = task.trim();
        if task.is_empty() {
            self.set_prompt_output(view::MSG_ENTER_TASK);
            return Ok(());
        }

        let project_summary = summary.map(str::trim).filter(|s| !s.is_empty());
        let result: Value = self
            .client
            .post(self.endpoint("/api/prompts/build")?)
            .json(&json!({ "task": task, "project_summary": project_summary }))
            .send()
            .await?
            .json()
            .await?;

        self.set_prompt_output(pretty(&result)?);
        Ok(())
    }

    /// 应用补丁
    pub async fn apply_patch(&self, root: &str, operations_json: &str) {
        if let Err(e) = self.try_apply_patch(root, operations_json).await {
            self.set_apply_output(format!("Error: {}", e));
        }
    }

    async fn try_apply_patch(&self, root: &str, operations_json: &str) -> Result<(), PanelError> {
        let root = root.trim();
        if root.is_empty() {
            self.set_apply_output(view::MSG_ENTER_ROOT);
            return Ok(());
        }

        let operations: Value = match serde_json::from_str(operations_json) {
            Ok(value) => value,
            Err(e) => {
                self.set_apply_output(format!("Invalid JSON: {}", e));
                return Ok(());
            }
        };

        let response = self
            .client
            .post(self.endpoint("/api/patch/apply")?)
            .json(&json!({ "project_root": root, "operations": operations }))
            .send()
            .await?;
        let status = response.status();
        let result: Value = response.json().await?;

        if !status.is_success() {
            self.set_apply_output(format!("Error: {}", detail_text(&result, status)));
            return Ok(());
        }

        self.set_apply_output(pretty(&result)?);
        Ok(())
    }

    /// 跟随下载地址，把文档保存到 `dir`，返回保存路径
    pub async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf, PanelError> {
        let url = Url::parse(url)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let result: Value = response.json().await.unwrap_or(Value::Null);
            return Err(PanelError::InvalidResponse(detail_text(&result, status)));
        }

        let file_name = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_file_name)
            .or_else(|| {
                url.path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .filter(|name| is_plain_file_name(name))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "download.docx".to_string());

        let bytes = response.bytes().await?;
        let destination = dir.join(file_name);
        tokio::fs::write(&destination, &bytes)
            .await
            .map_err(PanelError::Io)?;

        info!("Saved {} bytes to {}", bytes.len(), destination.display());
        Ok(destination)
    }
}

/// 失败响应中的 `detail` 文本
fn detail_text(result: &Value, status: reqwest::StatusCode) -> String {
    match result.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(other) => other.to_string(),
        None => format!("Request failed with status {}", status),
    }
}

/// 两个空格缩进的 JSON
fn pretty(value: &Value) -> Result<String, PanelError> {
    serde_json::to_string_pretty(value).map_err(|e| PanelError::InvalidResponse(e.to_string()))
}

/// 解析 `Content-Disposition` 中的文件名，只保留最后一段
fn attachment_file_name(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"'))
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .filter(|name| is_plain_file_name(name))
        .map(str::to_string)
}

/// 非空且不是 `.` 或 `..`
fn is_plain_file_name(name: &str) -> bool {
    !matches!(name, "" | "." | "..")
}
