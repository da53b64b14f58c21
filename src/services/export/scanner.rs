//! 目录扫描器
//!
//! 扫描项目目录，构建文件树结构

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::types::{ExportConfig, FileNode};

/// 目录扫描器
pub struct ProjectScanner {
    /// 编译后的排除模式（glob patterns）
    excluded_patterns: Vec<glob::Pattern>,
}

impl ProjectScanner {
    /// 创建新的目录扫描器
    pub fn new(config: &ExportConfig) -> Self {
        let excluded_patterns = config
            .excluded_dirs
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Invalid excluded directory pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();

        Self { excluded_patterns }
    }

    /// 扫描目录，构建文件树
    pub fn scan(&self, root_path: &Path) -> Result<FileNode, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        info!("Starting directory scan: {}", root_path.display());
        let root = self.scan_dir(root_path, root_path, 0)?;
        info!(
            "Scan completed: {} files, {} directories",
            root.file_count(),
            root.dir_count()
        );

        Ok(root)
    }

    /// 递归扫描目录
    fn scan_dir(&self, path: &Path, root_path: &Path, depth: u32) -> Result<FileNode, ScanError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let mut node = FileNode::new_dir(name, path.to_path_buf(), relative_to(path, root_path), depth);

        let entries = fs::read_dir(path).map_err(|e| ScanError::IoError(path.to_path_buf(), e))?;

        let mut children = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| ScanError::IoError(path.to_path_buf(), e))?;
            let entry_path = entry.path();
            let entry_name = entry.file_name().to_string_lossy().to_string();

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    warn!("Cannot stat {}: {}", entry_path.display(), e);
                    continue;
                }
            };

            if file_type.is_dir() {
                if self.is_excluded_dir(&entry_name) {
                    debug!("Excluding directory: {}", entry_path.display());
                    continue;
                }

                match self.scan_dir(&entry_path, root_path, depth + 1) {
                    Ok(child) => children.push(child),
                    Err(e) => {
                        warn!("Failed to scan subdirectory {}: {}", entry_path.display(), e);
                    }
                }
            } else if file_type.is_symlink() {
                // 符号链接：指向文件时按文件处理，指向目录时只列出不进入
                match fs::metadata(&entry_path) {
                    Ok(meta) if meta.is_file() => {
                        children.push(self.file_node(entry_name, &entry_path, root_path, depth, Some(meta.len())));
                    }
                    Ok(meta) if meta.is_dir() => {
                        if self.is_excluded_dir(&entry_name) {
                            continue;
                        }
                        children.push(FileNode::new_dir(
                            entry_name,
                            entry_path.clone(),
                            relative_to(&entry_path, root_path),
                            depth + 1,
                        ));
                    }
                    _ => debug!("Skipping dangling symlink: {}", entry_path.display()),
                }
            } else {
                let size = entry.metadata().ok().map(|m| m.len());
                children.push(self.file_node(entry_name, &entry_path, root_path, depth, size));
            }
        }

        // 排序：目录在前，文件在后，按名称排序
        children.sort_by(|a, b| match (a.is_file, b.is_file) {
            (false, true) => std::cmp::Ordering::Less,
            (true, false) => std::cmp::Ordering::Greater,
            _ => a.name.cmp(&b.name),
        });

        node.children = children;
        Ok(node)
    }

    fn file_node(
        &self,
        name: String,
        path: &Path,
        root_path: &Path,
        depth: u32,
        size: Option<u64>,
    ) -> FileNode {
        let mut node = FileNode::new_file(name, path.to_path_buf(), relative_to(path, root_path), depth + 1);
        node.size = size;
        node
    }

    /// 检查目录名是否匹配排除模式
    fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_patterns.iter().any(|pattern| pattern.matches(name))
    }
}

fn relative_to(path: &Path, root_path: &Path) -> String {
    path.strip_prefix(root_path)
        .map(|p| p.to_string_lossy().to_string().replace('\\', "/"))
        .unwrap_or_default()
}

/// 扫描错误类型
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error ({0}): {1}")]
    IoError(PathBuf, #[source] std::io::Error),
}
