//! 待上传的文件夹

use std::path::Path;
use walkdir::WalkDir;

use super::PanelError;

/// 一个待上传文件，`relative_path` 以文件夹名开头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub relative_path: String,
    pub contents: Vec<u8>,
}

impl UploadFile {
    pub fn new(relative_path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            relative_path: relative_path.into(),
            contents: contents.into(),
        }
    }

    /// 收集文件夹下的所有文件
    ///
    /// 与浏览器选择文件夹时一致，相对路径包含文件夹本身的名称
    pub fn collect_folder(dir: &Path) -> Result<Vec<UploadFile>, PanelError> {
        let folder_name = dir
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_default();

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| PanelError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(dir)
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            let relative_path = if folder_name.is_empty() {
                relative
            } else {
                format!("{}/{}", folder_name, relative)
            };

            let contents = std::fs::read(entry.path()).map_err(PanelError::Io)?;
            files.push(UploadFile::new(relative_path, contents));
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_folder_keeps_folder_name() {
        let parent = TempDir::new().unwrap();
        let dir = parent.path().join("shop");
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(dir.join("src").join("App.java"), "class App {}").unwrap();
        fs::write(dir.join("build.gradle"), "plugins {}").unwrap();

        let files = UploadFile::collect_folder(&dir).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["shop/build.gradle", "shop/src/App.java"]);
        assert_eq!(files[1].contents, b"class App {}");
    }

    #[test]
    fn test_collect_missing_folder() {
        assert!(UploadFile::collect_folder(Path::new("/no/such/folder")).is_err());
    }
}
