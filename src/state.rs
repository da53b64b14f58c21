//! 应用状态管理
//!
//! 定义在请求处理器之间共享的状态。

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::services::export::ExportConfig;

/// 导出文件名
pub const EXPORT_FILE_NAME: &str = "project-export.docx";

/// 一次分析运行的目录
#[derive(Debug, Clone)]
pub struct RunDir {
    pub run_id: String,
    pub path: PathBuf,
}

impl RunDir {
    /// 导出 DOCX 的路径
    pub fn export_path(&self) -> PathBuf {
        self.path.join(EXPORT_FILE_NAME)
    }

    /// 上传文件的落盘目录
    pub fn upload_root(&self) -> PathBuf {
        self.path.join("upload")
    }
}

/// 应用共享状态
///
/// 使用 Arc 包裹以便在多个处理器之间安全共享
pub struct AppState {
    /// 启动时的配置快照
    pub config: AppConfig,
    /// 已解析的运行目录根路径
    pub storage_root: PathBuf,
}

impl AppState {
    /// 创建新的应用状态，同时确保运行目录存在
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        config.ensure_storage_dir()?;
        let storage_root = config
            .storage_dir
            .canonicalize()
            .unwrap_or_else(|_| config.storage_dir.clone());

        Ok(Self {
            config,
            storage_root,
        })
    }

    /// 导出配置
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig::from(&self.config)
    }

    /// 创建一个新的运行目录
    ///
    /// ID 为 UTC 时间戳加随机后缀，同一秒内的并发请求不会冲突
    pub async fn create_run_dir(&self) -> Result<RunDir, AppError> {
        let run_id = format!(
            "{}-{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let path = self.storage_root.join(&run_id);
        tokio::fs::create_dir_all(&path).await.map_err(|e| {
            AppError::Internal(format!("Failed to create run directory {}: {}", path.display(), e))
        })?;

        Ok(RunDir { run_id, path })
    }
}

/// 创建可共享的应用状态
pub fn create_shared_state(config: AppConfig) -> Result<Arc<AppState>, AppError> {
    Ok(Arc::new(AppState::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_dirs_are_unique() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(AppConfig {
            storage_dir: dir.path().join("runs"),
            ..AppConfig::default()
        })
        .unwrap();

        let first = state.create_run_dir().await.unwrap();
        let second = state.create_run_dir().await.unwrap();

        assert_ne!(first.run_id, second.run_id);
        assert!(first.path.is_dir());
        assert!(first.path.starts_with(&state.storage_root));
        assert_eq!(first.run_id.len(), "20260128201039".len() + 9);
        assert!(first.export_path().ends_with(EXPORT_FILE_NAME));
    }
}
