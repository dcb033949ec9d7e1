use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Walk up from `start` looking for a file named `filename`.
/// Returns the path to the directory containing the file, or `None`.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Modification time of a file, or `None` if the file does not exist
/// (or its metadata cannot be read). Staleness checks treat a missing
/// file as infinitely old.
pub fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Lexically normalize a path: resolve `.` and `..` components without
/// touching the filesystem. Used to give every source file exactly one
/// spelling so compile units can be deduplicated by path.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Only pop a real component; a leading ".." is kept.
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if popped {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_removes_cur_dir() {
        assert_eq!(
            normalize_lexically(Path::new("./app/./main.cpp")),
            PathBuf::from("app/main.cpp")
        );
    }

    #[test]
    fn normalize_resolves_parent_dir() {
        assert_eq!(
            normalize_lexically(Path::new("app/sub/../main.cpp")),
            PathBuf::from("app/main.cpp")
        );
    }

    #[test]
    fn normalize_keeps_leading_parent() {
        assert_eq!(
            normalize_lexically(Path::new("../app/main.cpp")),
            PathBuf::from("../app/main.cpp")
        );
    }

    #[test]
    fn normalize_empty_is_dot() {
        assert_eq!(normalize_lexically(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn modified_missing_file_is_none() {
        assert!(modified(Path::new("/definitely/not/a/real/file.cpp")).is_none());
    }
}
