//! 路径工具
//!
//! 用户输入路径的展开、规范化，以及限制在根目录内的安全拼接。

use std::path::{Component, Path, PathBuf};

/// 路径校验错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Path must not be empty")]
    Empty,

    #[error("Invalid path outside project root")]
    OutsideRoot,
}

/// 展开开头的 `~`
pub fn expand_home(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = trimmed
        .strip_prefix("~/")
        .or_else(|| trimmed.strip_prefix("~\\"))
    {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(trimmed)
}

/// 展开并解析为已存在的目录，失败返回 None
pub fn resolve_existing_dir(path: &str) -> Option<PathBuf> {
    let expanded = expand_home(path);
    let resolved = expanded.canonicalize().ok()?;
    resolved.is_dir().then_some(resolved)
}

/// 统一分隔符并去掉开头的 `./` 和 `/`
pub fn normalize_relative(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let mut rest = unified.as_str();
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            break;
        }
    }
    rest.to_string()
}

/// 将相对路径拼接到根目录下
///
/// 只做词法检查：`..` 不能越过根目录，绝对路径被拒绝。
pub fn safe_join(root: &Path, relative: &str) -> Result<PathBuf, PathError> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(PathError::OutsideRoot);
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(PathError::OutsideRoot),
        }
    }

    if parts.is_empty() {
        return Err(PathError::Empty);
    }

    let mut destination = root.to_path_buf();
    for part in parts {
        destination.push(part);
    }
    Ok(destination)
}

/// 解析符号链接后确认 `destination` 仍在 `root` 内
///
/// 目标可以尚不存在，此时检查最深的已存在祖先；悬空链接一律拒绝。
pub fn ensure_within_root(root: &Path, destination: &Path) -> Result<(), PathError> {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    for ancestor in destination.ancestors() {
        if std::fs::symlink_metadata(ancestor).is_err() {
            continue;
        }
        let resolved = ancestor.canonicalize().map_err(|_| PathError::OutsideRoot)?;
        return if resolved.starts_with(&root) {
            Ok(())
        } else {
            Err(PathError::OutsideRoot)
        };
    }

    Err(PathError::OutsideRoot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize_relative("./src/main.rs"), "src/main.rs");
        assert_eq!(normalize_relative("/src/main.rs"), "src/main.rs");
        assert_eq!(normalize_relative("src\\util\\a.py"), "src/util/a.py");
        // 隐藏文件的前导点保留
        assert_eq!(normalize_relative(".gitignore"), ".gitignore");
        assert_eq!(normalize_relative("././/lib.rs"), "lib.rs");
    }

    #[test]
    fn test_safe_join_inside_root() {
        let root = Path::new("/project");
        assert_eq!(
            safe_join(root, "src/../lib/a.rs").unwrap(),
            PathBuf::from("/project/lib/a.rs")
        );
        assert_eq!(
            safe_join(root, "./README.md").unwrap(),
            PathBuf::from("/project/README.md")
        );
    }

    #[test]
    fn test_safe_join_rejects_escape() {
        let root = Path::new("/project");
        assert_eq!(safe_join(root, "../etc/passwd"), Err(PathError::OutsideRoot));
        assert_eq!(safe_join(root, "src/../../x"), Err(PathError::OutsideRoot));
        assert_eq!(safe_join(root, "/etc/passwd"), Err(PathError::OutsideRoot));
        assert_eq!(safe_join(root, ""), Err(PathError::Empty));
        assert_eq!(safe_join(root, "src/.."), Err(PathError::Empty));
    }

    #[test]
    fn test_ensure_within_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("project");
        std::fs::create_dir_all(root.join("src")).unwrap();

        assert_eq!(ensure_within_root(&root, &root.join("src/new/a.rs")), Ok(()));
        assert_eq!(ensure_within_root(&root, &root.join("missing.txt")), Ok(()));
        assert_eq!(
            ensure_within_root(&root, &dir.path().join("other.txt")),
            Err(PathError::OutsideRoot)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_within_root_follows_symlinks() {
        let dir = tempfile::TempDir::new().unwrap();
        let outside = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("project");
        std::fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("link")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("gone"), root.join("dangling")).unwrap();

        assert_eq!(
            ensure_within_root(&root, &root.join("link/a.txt")),
            Err(PathError::OutsideRoot)
        );
        assert_eq!(
            ensure_within_root(&root, &root.join("dangling")),
            Err(PathError::OutsideRoot)
        );
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("  /tmp/x "), PathBuf::from("/tmp/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/code"), home.join("code"));
            assert_eq!(expand_home("~"), home);
        }
    }

    #[test]
    fn test_resolve_existing_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        let resolved = resolve_existing_dir(dir.path().to_str().unwrap()).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolve_existing_dir(file.to_str().unwrap()).is_none());
        assert!(resolve_existing_dir("/definitely/not/here").is_none());
    }
}
