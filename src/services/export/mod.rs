//! 项目导出模块
//!
//! 将项目目录导出为一个 DOCX 文档
//!
//! # 流程
//!
//! - 扫描项目目录，构建文件树（跳过排除目录）
//! - 渲染目录树文本
//! - 并发读取所有文件内容
//! - 写入 DOCX：目录结构 + 每个文件的内容
//!
//! # 使用示例
//!
//! ```ignore
//! use project_analyzer::services::export::{ExportConfig, ProjectExporter};
//!
//! let exporter = ProjectExporter::new(ExportConfig::default());
//! let summary = exporter.export(&root, &output).await?;
//! println!("{} files exported", summary.file_count);
//! ```

mod docx;
mod reader;
mod scanner;
mod tree;
pub mod types;

pub use docx::{sanitize_xml_text, DocxExporter};
pub use reader::{is_binary_file, read_file_text, FileReader, ReadTarget};
pub use scanner::{ProjectScanner, ScanError};
pub use tree::render_tree;
pub use types::{ExportConfig, ExportSummary, FileNode, FileRecord};

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::AppError;

/// 导出错误类型
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("IO error ({0}): {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to pack DOCX: {0}")]
    Pack(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err.to_string())
    }
}

/// 项目导出服务
pub struct ProjectExporter {
    config: ExportConfig,
}

impl ProjectExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// 导出项目目录到 `output`，返回导出的文件数量
    pub async fn export(&self, root: &Path, output: &Path) -> Result<ExportSummary, ExportError> {
        let started = std::time::Instant::now();
        let root_path = root.to_path_buf();

        let scan_config = self.config.clone();
        let scan_root = root_path.clone();
        let tree_root = tokio::task::spawn_blocking(move || {
            ProjectScanner::new(&scan_config).scan(&scan_root)
        })
        .await
        .map_err(|e| ExportError::Task(e.to_string()))??;

        let tree_text = render_tree(&tree_root);
        let targets: Vec<ReadTarget> = tree_root
            .get_all_files()
            .into_iter()
            .map(|node| ReadTarget {
                path: node.path.clone(),
                relative_path: node.relative_path.clone(),
            })
            .collect();

        let records = FileReader::new(self.config.clone()).read_all(targets).await;
        let file_count = records.len();

        let output_path = output.to_path_buf();
        let write_output = output_path.clone();
        tokio::task::spawn_blocking(move || {
            DocxExporter::new(&root_path, &tree_text, &records).write_to(&write_output)
        })
        .await
        .map_err(|e| ExportError::Task(e.to_string()))??;

        info!(
            "Export of {} finished: {} files in {:?}",
            root.display(),
            file_count,
            started.elapsed()
        );

        Ok(ExportSummary {
            file_count,
            output: output_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_project() {
        let project = TempDir::new().unwrap();
        fs::create_dir_all(project.path().join("src")).unwrap();
        fs::write(project.path().join("src").join("app.py"), "print_status = True").unwrap();
        fs::write(project.path().join("README.md"), "Demo readme").unwrap();
        fs::write(project.path().join("logo.png"), [0u8, 159, 146, 150]).unwrap();
        fs::create_dir_all(project.path().join("node_modules").join("pkg")).unwrap();
        fs::write(
            project.path().join("node_modules").join("pkg").join("index.js"),
            "hidden_dependency",
        )
        .unwrap();

        let out_dir = TempDir::new().unwrap();
        let output = out_dir.path().join("project-export.docx");

        let summary = ProjectExporter::new(ExportConfig::default())
            .export(project.path(), &output)
            .await
            .unwrap();

        assert_eq!(summary.file_count, 3);
        assert_eq!(summary.output, output);

        let mut archive = zip::ZipArchive::new(fs::File::open(&output).unwrap()).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();

        assert!(xml.contains("print_status = True"));
        assert!(xml.contains("Demo readme"));
        assert!(xml.contains("src/app.py"));
        assert!(xml.contains("binary file omitted"));
        assert!(!xml.contains("hidden_dependency"));
        assert!(!xml.contains("node_modules"));
    }

    #[tokio::test]
    async fn test_export_missing_root() {
        let out_dir = TempDir::new().unwrap();
        let err = ProjectExporter::new(ExportConfig::default())
            .export(Path::new("/no/such/dir"), &out_dir.path().join("x.docx"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Scan(ScanError::PathNotFound(_))));
    }
}
