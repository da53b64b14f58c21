//! 补丁应用服务
//!
//! 将 LLM 返回的文件操作（create/update/delete）应用到项目目录。
//! 先校验全部操作，再依次执行，校验失败时不会修改任何文件。

use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::api::ApplyOperation;
use crate::utils::paths::{ensure_within_root, normalize_relative, safe_join, PathError};

/// 操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchAction {
    Create,
    Update,
    Delete,
}

impl PatchAction {
    /// 解析操作名（不区分大小写）
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim().to_lowercase().as_str() {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// 校验后的操作
#[derive(Debug, Clone)]
struct PlannedOperation {
    action: PatchAction,
    relative: String,
    destination: PathBuf,
    content: Option<String>,
}

/// 补丁错误类型
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Missing content for {action} {path}")]
    MissingContent { action: &'static str, path: String },

    #[error("Path must be relative to project root. Remove leading '{0}/'.")]
    RootPrefixed(String),

    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<PatchError> for AppError {
    fn from(err: PatchError) -> Self {
        match err {
            PatchError::Io { .. } => AppError::Internal(err.to_string()),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}

/// 补丁服务
pub struct PatchService {
    root: PathBuf,
}

impl PatchService {
    /// `root` 必须是已解析的项目根目录
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 校验并应用全部操作，返回每个操作的结果描述
    pub fn apply(&self, operations: &[ApplyOperation]) -> Result<Vec<String>, PatchError> {
        let planned = operations
            .iter()
            .map(|op| self.plan(op))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Applying {} operations under {}",
            planned.len(),
            self.root.display()
        );

        planned.iter().map(execute).collect()
    }

    fn plan(&self, operation: &ApplyOperation) -> Result<PlannedOperation, PatchError> {
        let action = PatchAction::parse(&operation.action)
            .ok_or_else(|| PatchError::UnknownAction(operation.action.clone()))?;

        let relative = normalize_relative(&operation.path);
        if let Some(root_name) = self.root.file_name().map(|n| n.to_string_lossy().to_string()) {
            if relative.starts_with(&format!("{}/", root_name)) {
                return Err(PatchError::RootPrefixed(root_name));
            }
        }

        let destination = safe_join(&self.root, &relative)?;
        ensure_within_root(&self.root, &destination)?;

        if action != PatchAction::Delete && operation.content.is_none() {
            return Err(PatchError::MissingContent {
                action: action.as_str(),
                path: relative,
            });
        }

        Ok(PlannedOperation {
            action,
            relative,
            destination,
            content: operation.content.clone(),
        })
    }
}

fn execute(op: &PlannedOperation) -> Result<String, PatchError> {
    let io_error = |action: &'static str| {
        let path = op.relative.clone();
        move |source| PatchError::Io {
            action,
            path,
            source,
        }
    };

    match op.action {
        PatchAction::Create | PatchAction::Update => {
            if let Some(parent) = op.destination.parent() {
                fs::create_dir_all(parent).map_err(io_error("create parent of"))?;
            }
            let content = op.content.as_deref().unwrap_or_default();
            fs::write(&op.destination, content).map_err(io_error(op.action.as_str()))?;
            debug!("{} {}", op.action.as_str(), op.destination.display());
            Ok(format!("{}: {}", op.action.as_str(), op.relative))
        }
        PatchAction::Delete => match fs::symlink_metadata(&op.destination) {
            Ok(meta) => {
                if meta.is_dir() {
                    fs::remove_dir_all(&op.destination).map_err(io_error("delete"))?;
                } else {
                    fs::remove_file(&op.destination).map_err(io_error("delete"))?;
                }
                Ok(format!("deleted: {}", op.relative))
            }
            Err(_) => Ok(format!("skipped (missing): {}", op.relative)),
        },
    }
}
