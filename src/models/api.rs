//! REST API 请求/响应模型

use serde::{Deserialize, Serialize};

/// 分析结果响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub run_id: String,
    pub docx_path: String,
    pub file_count: usize,
}

/// 按路径分析的表单
#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    pub path: String,
}

/// 下载查询参数
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub path: String,
}

/// Prompt 构建请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRequest {
    /// 用户的任务描述
    pub task: String,
    /// 可选的项目摘要
    #[serde(default)]
    pub project_summary: Option<String>,
}

/// 单个操作的字段说明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationSchema {
    pub action: String,
    pub path: String,
    pub content: String,
}

impl Default for OperationSchema {
    fn default() -> Self {
        Self {
            action: "create|update|delete".to_string(),
            path: "relative/file/path.ext".to_string(),
            content: "file content for create/update".to_string(),
        }
    }
}

/// Prompt 载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptPayload {
    pub task: String,
    pub project_summary: Option<String>,
    pub output_format: String,
    pub instructions: String,
    pub schema: OperationSchema,
}

/// 文件操作
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOperation {
    /// create|update|delete（不区分大小写）
    pub action: String,
    /// 相对于项目根目录的路径
    pub path: String,
    /// create/update 的新内容
    #[serde(default)]
    pub content: Option<String>,
}

/// 补丁应用请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyRequest {
    /// 项目根目录（绝对路径）
    pub project_root: String,
    pub operations: Vec<ApplyOperation>,
}

/// 补丁应用响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub status: String,
    pub results: Vec<String>,
}

impl ApplyResponse {
    pub fn ok(results: Vec<String>) -> Self {
        Self {
            status: "ok".to_string(),
            results,
        }
    }
}
