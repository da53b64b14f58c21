//! Project Analyzer
//!
//! 项目导出（DOCX）、Prompt 构建与补丁应用服务，以及驱动这些接口的控制面板客户端。

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod panel;
pub mod services;
pub mod state;
pub mod utils;
