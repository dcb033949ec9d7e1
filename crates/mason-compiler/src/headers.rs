//! Header include discovery.
//!
//! Walks `#include` directives recursively starting from a source file, so a
//! compile unit's staleness check covers every header it can see. Quoted
//! includes are resolved against the including file's directory first, then
//! the configured include directories; angle-bracket includes only against
//! the include directories. Unresolved angle includes are assumed to be
//! system headers outside the tracked graph and skipped silently.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Result of scanning one source file.
#[derive(Debug, Default)]
pub struct HeaderScan {
    /// The transitive closure of resolved headers.
    pub headers: BTreeSet<PathBuf>,
    /// One message per unresolved quoted include.
    pub warnings: Vec<String>,
}

/// Discover the header closure of `source`.
pub fn scan(source: &Path, include_dirs: &[PathBuf]) -> HeaderScan {
    let mut scan = HeaderScan::default();
    let mut visited = HashSet::new();
    scan_file(source, include_dirs, &mut visited, &mut scan);
    scan
}

fn scan_file(
    file: &Path,
    include_dirs: &[PathBuf],
    visited: &mut HashSet<PathBuf>,
    scan: &mut HeaderScan,
) {
    // Already-visited files are not re-parsed; this also breaks include cycles.
    if !visited.insert(file.to_path_buf()) {
        return;
    }

    let Ok(content) = std::fs::read_to_string(file) else {
        return;
    };
    let current_dir = file.parent().unwrap_or(Path::new("."));

    for line in content.lines() {
        let line = match line.find("//") {
            Some(pos) => &line[..pos],
            None => line,
        };
        let Some(include) = parse_include(line) else {
            continue;
        };

        match resolve(&include, current_dir, include_dirs) {
            Some(path) => {
                scan.headers.insert(path.clone());
                scan_file(&path, include_dirs, visited, scan);
            }
            None => {
                if let Include::Quoted(name) = include {
                    tracing::warn!(header = %name, from = %file.display(), "header not found");
                    scan.warnings
                        .push(format!("Header file \"{name}\" not found."));
                }
                // Angle includes resolve to system headers; skip silently.
            }
        }
    }
}

enum Include {
    Quoted(String),
    Angle(String),
}

fn parse_include(line: &str) -> Option<Include> {
    let rest = line.trim().strip_prefix("#include")?.trim_start();
    let mut chars = rest.chars();
    match chars.next()? {
        '"' => {
            let name: String = chars.take_while(|&c| c != '"').collect();
            (!name.is_empty()).then_some(Include::Quoted(name))
        }
        '<' => {
            let name: String = chars.take_while(|&c| c != '>').collect();
            (!name.is_empty()).then_some(Include::Angle(name))
        }
        _ => None,
    }
}

fn resolve(include: &Include, current_dir: &Path, include_dirs: &[PathBuf]) -> Option<PathBuf> {
    let name = match include {
        Include::Quoted(name) => {
            let local = current_dir.join(name);
            if local.exists() {
                return Some(mason_util::fs::normalize_lexically(&local));
            }
            name
        }
        Include::Angle(name) => name,
    };

    for dir in include_dirs {
        let candidate = dir.join(name);
        if candidate.exists() {
            return Some(mason_util::fs::normalize_lexically(&candidate));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn finds_direct_quoted_include() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "util.hpp", "");
        let src = write(tmp.path(), "main.cpp", "#include \"util.hpp\"\nint main() {}\n");

        let scan = scan(&src, &[]);
        assert_eq!(scan.headers.len(), 1);
        assert!(scan.warnings.is_empty());
    }

    #[test]
    fn closure_is_transitive() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "c.hpp", "");
        write(tmp.path(), "b.hpp", "#include \"c.hpp\"");
        write(tmp.path(), "a.hpp", "#include \"b.hpp\"");
        let src = write(tmp.path(), "main.cpp", "#include \"a.hpp\"");

        let scan = scan(&src, &[]);
        assert_eq!(scan.headers.len(), 3);
    }

    #[test]
    fn include_cycles_terminate() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a.hpp", "#include \"b.hpp\"");
        write(tmp.path(), "b.hpp", "#include \"a.hpp\"");
        let src = write(tmp.path(), "main.cpp", "#include \"a.hpp\"");

        let scan = scan(&src, &[]);
        assert_eq!(scan.headers.len(), 2);
    }

    #[test]
    fn quoted_prefers_including_files_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let local = write(tmp.path(), "sub/util.hpp", "");
        write(tmp.path(), "include/util.hpp", "");
        let src = write(tmp.path(), "sub/main.cpp", "#include \"util.hpp\"");

        let scan = scan(&src, &[tmp.path().join("include")]);
        assert!(scan
            .headers
            .contains(&mason_util::fs::normalize_lexically(&local)));
        assert_eq!(scan.headers.len(), 1);
    }

    #[test]
    fn angle_resolves_only_via_include_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "vendor/lib.hpp", "");
        let src = write(tmp.path(), "main.cpp", "#include <lib.hpp>");

        let without = scan(&src, &[]);
        assert!(without.headers.is_empty());
        assert!(without.warnings.is_empty()); // angle misses are silent

        let with = scan(&src, &[tmp.path().join("vendor")]);
        assert_eq!(with.headers.len(), 1);
    }

    #[test]
    fn unresolved_quoted_include_warns_and_continues() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "real.hpp", "");
        let src = write(
            tmp.path(),
            "main.cpp",
            "#include \"missing.hpp\"\n#include \"real.hpp\"\n",
        );

        let scan = scan(&src, &[]);
        assert_eq!(scan.warnings.len(), 1);
        assert!(scan.warnings[0].contains("missing.hpp"));
        assert_eq!(scan.headers.len(), 1);
    }

    #[test]
    fn commented_includes_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "real.hpp", "");
        let src = write(tmp.path(), "main.cpp", "// #include \"real.hpp\"\n");

        let scan = scan(&src, &[]);
        assert!(scan.headers.is_empty());
    }
}
