//! 导出类型定义
//!
//! 定义文件节点、文件记录与导出配置

use serde::Serialize;
use std::path::PathBuf;

use crate::config::AppConfig;

/// 文件/目录节点
#[derive(Debug, Clone, Serialize)]
pub struct FileNode {
    /// 节点名称（文件名或目录名）
    pub name: String,
    /// 完整路径
    pub path: PathBuf,
    /// 相对于项目根目录的路径（使用 `/` 分隔）
    pub relative_path: String,
    /// 是否为文件（否则为目录）
    pub is_file: bool,
    /// 子节点（仅目录有效）
    pub children: Vec<FileNode>,
    /// 目录深度（根目录为0）
    pub depth: u32,
    /// 文件大小（字节）
    pub size: Option<u64>,
}

impl FileNode {
    /// 创建新的文件节点
    pub fn new_file(name: String, path: PathBuf, relative_path: String, depth: u32) -> Self {
        Self {
            name,
            path,
            relative_path,
            is_file: true,
            children: Vec::new(),
            depth,
            size: None,
        }
    }

    /// 创建新的目录节点
    pub fn new_dir(name: String, path: PathBuf, relative_path: String, depth: u32) -> Self {
        Self {
            name,
            path,
            relative_path,
            is_file: false,
            children: Vec::new(),
            depth,
            size: None,
        }
    }

    /// 获取所有文件节点（递归）
    pub fn get_all_files(&self) -> Vec<&FileNode> {
        let mut files = Vec::new();
        self.collect_files(&mut files);
        files
    }

    fn collect_files<'a>(&'a self, files: &mut Vec<&'a FileNode>) {
        if self.is_file {
            files.push(self);
        } else {
            for child in &self.children {
                child.collect_files(files);
            }
        }
    }

    /// 统计文件数量
    pub fn file_count(&self) -> usize {
        if self.is_file {
            1
        } else {
            self.children.iter().map(|c| c.file_count()).sum()
        }
    }

    /// 统计目录数量（不含自身）
    pub fn dir_count(&self) -> usize {
        self.children
            .iter()
            .filter(|c| !c.is_file)
            .map(|c| 1 + c.dir_count())
            .sum()
    }
}

/// 导出的单个文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// 相对路径
    pub path: String,
    /// 文件大小（字节）
    pub size: u64,
    /// 修改时间（本地时间 ISO 格式）
    pub modified: String,
    /// 文件内容或占位说明
    pub content: String,
}

/// 导出结果
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// 导出的文件数量
    pub file_count: usize,
    /// 生成的 DOCX 路径
    pub output: PathBuf,
}

/// 导出配置
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// 跳过的目录模式
    pub excluded_dirs: Vec<String>,
    /// 并行读取数量
    pub max_workers: usize,
    /// 二进制检测读取的字节数
    pub binary_sniff_bytes: usize,
    /// 导出内容的最大文件大小
    pub max_file_size: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ExportConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            excluded_dirs: config.excluded_dirs.clone(),
            max_workers: config.max_workers,
            binary_sniff_bytes: config.binary_sniff_bytes,
            max_file_size: config.max_file_size,
        }
    }
}

/// 占位文本：二进制文件
pub const BINARY_PLACEHOLDER: &str = "<binary file omitted>";
