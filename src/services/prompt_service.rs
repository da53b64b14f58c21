//! Prompt 构建服务
//!
//! 根据任务描述和可选的项目摘要，构建发送给 LLM 的提示载荷

use crate::error::AppError;
use crate::models::api::{OperationSchema, PromptPayload, PromptRequest};

/// 指令文本
const INSTRUCTIONS: &str = "You are an expert software engineer. You will receive a DOCX export that \
contains the full project structure and source code. Based on the user's \
task, output a JSON array of file operations. Each operation must be an object \
with: action (create|update|delete), path (relative path), and content (for \
create/update). Paths must be relative to the project root shown in the DOCX \
tree (e.g., 'src/main/java/...'), and must not include absolute paths or the \
project folder name. Return JSON only, no markdown.";

/// 任务描述的最小长度（字符数）
pub const MIN_TASK_LENGTH: usize = 5;

/// Prompt 服务
pub struct PromptService;

impl PromptService {
    /// 创建新的 Prompt 服务
    pub fn new() -> Self {
        Self
    }

    /// 校验请求并构建载荷
    pub fn build_payload(&self, request: PromptRequest) -> Result<PromptPayload, AppError> {
        if request.task.chars().count() < MIN_TASK_LENGTH {
            return Err(AppError::Unprocessable(format!(
                "task: String should have at least {} characters",
                MIN_TASK_LENGTH
            )));
        }

        Ok(PromptPayload {
            task: request.task,
            project_summary: request.project_summary,
            output_format: "JSON".to_string(),
            instructions: INSTRUCTIONS.to_string(),
            schema: OperationSchema::default(),
        })
    }
}

impl Default for PromptService {
    fn default() -> Self {
        Self::new()
    }
}
