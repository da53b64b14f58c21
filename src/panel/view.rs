//! 控制面板视图状态

/// 面板上显示的文本
///
/// 每个操作只写自己的区域，最后完成的响应覆盖之前的内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelView {
    /// 分析状态
    pub status: String,
    /// Prompt 构建结果
    pub prompt_output: String,
    /// 补丁应用结果
    pub apply_output: String,
    /// 最近一次跳转的下载地址
    pub navigation: Option<String>,
}

pub const MSG_ENTER_PATH: &str = "Enter a project path to analyze.";
pub const MSG_SELECT_FOLDER: &str = "Select a folder to upload.";
pub const MSG_ENTER_TASK: &str = "Please enter a task.";
pub const MSG_ENTER_ROOT: &str = "Enter the project root path.";
pub const MSG_ANALYZING: &str = "Analyzing project... this may take a while for large projects.";
pub const MSG_UPLOADING: &str = "Uploading files and analyzing... this may take a while.";

/// 分析成功后的状态文本
pub fn ready_message(file_count: &str) -> String {
    format!("DOCX ready. Files: {}. Downloading...", file_count)
}
