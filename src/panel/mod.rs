//! 控制面板
//!
//! 后端四个接口的轻量客户端：读取输入、发起请求、把响应或错误写成文本。
//! 没有重试、超时或取消，每个操作独立运行。

mod client;
mod upload;
pub mod view;

pub use client::{ControlPanel, DEFAULT_SERVER};
pub use upload::UploadFile;
pub use view::PanelView;

/// 面板错误类型
///
/// 只在操作边界被捕获并显示为 `Error: ...`
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Io(std::io::Error),
}
