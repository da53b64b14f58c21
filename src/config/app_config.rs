//! 应用配置管理
//!
//! 启动时加载一次配置，使用全局单例模式管理配置状态。

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tracing::warn;

use crate::error::AppError;

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV_VAR: &str = "ANALYZER_CONFIG";

/// 获取配置文件路径
fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // 配置文件位于可执行文件同级目录
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.json")
}

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 导出运行目录（每次分析一个子目录）
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// 前端静态文件目录（不存在时不挂载）
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: PathBuf,

    /// 并行读取文件的最大数量
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// 扫描时跳过的目录（支持 glob 模式）
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// 二进制检测读取的字节数
    #[serde(default = "default_binary_sniff_bytes")]
    pub binary_sniff_bytes: usize,

    /// 导出内容的最大文件大小（字节）
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// 上传请求体上限（字节）
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8000
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("shared").join("runs")
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from("frontend")
}

fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .max(4)
}

fn default_excluded_dirs() -> Vec<String> {
    [".git", ".idea", ".vscode", "node_modules", "target", "build"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_binary_sniff_bytes() -> usize {
    2048
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

fn default_max_upload_bytes() -> usize {
    512 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage_dir: default_storage_dir(),
            frontend_dir: default_frontend_dir(),
            max_workers: default_max_workers(),
            excluded_dirs: default_excluded_dirs(),
            binary_sniff_bytes: default_binary_sniff_bytes(),
            max_file_size: default_max_file_size(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl AppConfig {
    /// 服务监听地址
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// 确保运行目录存在
    pub fn ensure_storage_dir(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.storage_dir).map_err(|e| {
            AppError::Internal(format!(
                "Failed to create storage directory {}: {}",
                self.storage_dir.display(),
                e
            ))
        })
    }
}

/// 全局配置单例
static CONFIG: Lazy<AppConfig> = Lazy::new(|| load_config_from_file().unwrap_or_default());

/// 从文件加载配置
fn load_config_from_file() -> Option<AppConfig> {
    let path = get_config_path();
    if !path.exists() {
        return None;
    }

    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Ignoring invalid config file {}: {}", path.display(), e);
            None
        }
    }
}

/// 获取当前配置（克隆）
pub fn get_config() -> AppConfig {
    CONFIG.clone()
}
