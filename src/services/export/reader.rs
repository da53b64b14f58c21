//! 文件内容读取
//!
//! 在阻塞线程池上并发读取文件，并发数由信号量限制

use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::types::{ExportConfig, FileRecord, BINARY_PLACEHOLDER};

/// 待读取的文件
#[derive(Debug, Clone)]
pub struct ReadTarget {
    pub path: PathBuf,
    pub relative_path: String,
}

/// 并发文件读取器
pub struct FileReader {
    config: ExportConfig,
    semaphore: Arc<Semaphore>,
}

impl FileReader {
    pub fn new(config: ExportConfig) -> Self {
        let concurrency = config.max_workers.max(1);
        Self {
            config,
            semaphore: Arc::new(Semaphore::new(concurrency)),
        }
    }

    /// 读取全部文件，结果按相对路径排序
    pub async fn read_all(&self, targets: Vec<ReadTarget>) -> Vec<FileRecord> {
        info!(
            "Reading {} files with {} workers",
            targets.len(),
            self.config.max_workers.max(1)
        );

        let tasks = targets.into_iter().map(|target| {
            let semaphore = Arc::clone(&self.semaphore);
            let config = self.config.clone();
            async move {
                let fallback = target.relative_path.clone();
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return failed_record(fallback, e.to_string()),
                };
                match tokio::task::spawn_blocking(move || read_record(&target, &config)).await {
                    Ok(record) => record,
                    Err(e) => {
                        warn!("Read task for {} failed: {}", fallback, e);
                        failed_record(fallback, e.to_string())
                    }
                }
            }
        });

        let mut records = futures::future::join_all(tasks).await;
        records.sort_by(|a, b| a.path.cmp(&b.path));
        records
    }
}

fn failed_record(path: String, reason: String) -> FileRecord {
    FileRecord {
        path,
        size: 0,
        modified: String::new(),
        content: format!("<unable to read file: {}>", reason),
    }
}

/// 读取单个文件的元数据和内容
pub fn read_record(target: &ReadTarget, config: &ExportConfig) -> FileRecord {
    let metadata = match fs::metadata(&target.path) {
        Ok(metadata) => metadata,
        Err(e) => return failed_record(target.relative_path.clone(), e.to_string()),
    };

    let modified = metadata
        .modified()
        .map(|time| {
            DateTime::<Local>::from(time)
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string()
        })
        .unwrap_or_default();

    let size = metadata.len();
    let content = if size > config.max_file_size {
        debug!("Skipping oversized file: {} ({} bytes)", target.path.display(), size);
        format!("<file too large: {} bytes>", size)
    } else {
        read_file_text(&target.path, config.binary_sniff_bytes)
    };

    FileRecord {
        path: target.relative_path.clone(),
        size,
        modified,
        content,
    }
}

/// 检查文件头部是否包含 NUL 字节；无法读取也按二进制处理
pub fn is_binary_file(path: &Path, sniff_bytes: usize) -> bool {
    let mut chunk = Vec::with_capacity(sniff_bytes);
    match File::open(path).and_then(|file| file.take(sniff_bytes as u64).read_to_end(&mut chunk)) {
        Ok(_) => chunk.contains(&0),
        Err(_) => true,
    }
}

/// 读取文本内容，非 UTF-8 字节按替换字符处理
///
/// 只读一次文件，二进制判断使用已读内容的前 `sniff_bytes` 字节
pub fn read_file_text(path: &Path, sniff_bytes: usize) -> String {
    match fs::read(path) {
        Ok(bytes) if bytes.iter().take(sniff_bytes).any(|&b| b == 0) => {
            BINARY_PLACEHOLDER.to_string()
        }
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => format!("<unable to read file: {}>", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn target(dir: &TempDir, rel: &str) -> ReadTarget {
        ReadTarget {
            path: dir.path().join(rel),
            relative_path: rel.to_string(),
        }
    }

    #[test]
    fn test_binary_detection() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.bin"), [0x89, b'P', b'N', b'G', 0x00, 0x01]).unwrap();
        fs::write(dir.path().join("a.txt"), "plain text").unwrap();

        assert!(is_binary_file(&dir.path().join("a.bin"), 2048));
        assert!(!is_binary_file(&dir.path().join("a.txt"), 2048));
        assert!(is_binary_file(&dir.path().join("missing"), 2048));
    }

    #[test]
    fn test_nul_after_sniff_window_is_text() {
        let dir = TempDir::new().unwrap();
        let mut bytes = vec![b'a'; 16];
        bytes.push(0);
        fs::write(dir.path().join("late.txt"), &bytes).unwrap();

        assert!(!is_binary_file(&dir.path().join("late.txt"), 8));
        assert!(is_binary_file(&dir.path().join("late.txt"), 64));
    }

    #[test]
    fn test_read_record_placeholders() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("img.png"), [0u8, 1, 2]).unwrap();
        fs::write(dir.path().join("big.txt"), "0123456789").unwrap();
        fs::write(dir.path().join("latin1.txt"), [b'c', b'a', b'f', 0xE9]).unwrap();

        let config = ExportConfig {
            max_file_size: 5,
            ..ExportConfig::default()
        };

        let record = read_record(&target(&dir, "img.png"), &config);
        assert_eq!(record.content, BINARY_PLACEHOLDER);
        assert_eq!(record.size, 3);

        let record = read_record(&target(&dir, "big.txt"), &config);
        assert_eq!(record.content, "<file too large: 10 bytes>");

        let record = read_record(&target(&dir, "latin1.txt"), &ExportConfig::default());
        assert_eq!(record.content, "caf\u{FFFD}");
        assert!(!record.modified.is_empty());
    }

    #[test]
    fn test_unreadable_file_placeholder() {
        let dir = TempDir::new().unwrap();
        let record = read_record(&target(&dir, "vanished.txt"), &ExportConfig::default());

        assert_eq!(record.path, "vanished.txt");
        assert_eq!(record.size, 0);
        assert!(record.content.starts_with("<unable to read file: "));
        assert!(record.content.ends_with('>'));

        let content = read_file_text(&dir.path().join("vanished.txt"), 2048);
        assert!(content.starts_with("<unable to read file: "));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_is_reported_unreadable() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("b.txt")).unwrap();

        let records = FileReader::new(ExportConfig::default())
            .read_all(vec![target(&dir, "b.txt"), target(&dir, "a.txt")])
            .await;

        assert_eq!(records[0].content, "a");
        assert_eq!(records[1].path, "b.txt");
        assert!(records[1].content.starts_with("<unable to read file: "));
        assert!(records[1].modified.is_empty());
    }

    #[tokio::test]
    async fn test_read_all_sorted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src").join("b.rs"), "b").unwrap();
        fs::write(dir.path().join("a.rs"), "a").unwrap();
        fs::write(dir.path().join("z.rs"), "z").unwrap();

        let reader = FileReader::new(ExportConfig {
            max_workers: 2,
            ..ExportConfig::default()
        });
        let records = reader
            .read_all(vec![
                target(&dir, "z.rs"),
                target(&dir, "src/b.rs"),
                target(&dir, "a.rs"),
            ])
            .await;

        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["a.rs", "src/b.rs", "z.rs"]);
        assert_eq!(records[1].content, "b");
    }
}
