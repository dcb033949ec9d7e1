//! In-source build directives for jobs and tests.
//!
//! The main source file of a job or test binary can carry macro-style
//! directives that extend the build configuration of its artifact:
//!
//! ```cpp
//! SOURCE("app/services/Json.cpp")
//! FLAG("-O2")
//! LIBRARY("curl")
//! LIBRARY_PATH("/opt/lib")
//! INCLUDE_PATH("vendor/include")
//! ```
//!
//! Directives are read from the source text, not compiled; on the C++ side
//! they expand to nothing. Each occurrence appends one value to the matching
//! list. `//` comments are stripped before scanning.

use std::path::Path;

use mason_util::errors::{MasonError, MasonResult};

/// Directive values collected from one source file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Directives {
    pub flags: Vec<String>,
    pub sources: Vec<String>,
    pub libraries: Vec<String>,
    pub library_paths: Vec<String>,
    pub include_paths: Vec<String>,
}

const DIRECTIVE_NAMES: [&str; 5] = [
    // Longest first so LIBRARY_PATH is not consumed as LIBRARY.
    "LIBRARY_PATH",
    "INCLUDE_PATH",
    "LIBRARY",
    "SOURCE",
    "FLAG",
];

impl Directives {
    /// Scan a source file for build directives.
    pub fn from_file(path: &Path) -> MasonResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MasonError::Generic {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Ok(Self::from_source(&content))
    }

    /// Scan source text for build directives.
    pub fn from_source(content: &str) -> Self {
        let mut directives = Self::default();
        for line in content.lines() {
            let line = match line.find("//") {
                Some(pos) => &line[..pos],
                None => line,
            };
            let mut rest = line;
            while let Some((name, value, tail)) = next_directive(rest) {
                match name {
                    "FLAG" => directives.flags.push(value),
                    "SOURCE" => directives.sources.push(value),
                    "LIBRARY" => directives.libraries.push(value),
                    "LIBRARY_PATH" => directives.library_paths.push(value),
                    "INCLUDE_PATH" => directives.include_paths.push(value),
                    _ => unreachable!(),
                }
                rest = tail;
            }
        }
        directives
    }

    /// True if the file declared nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Find the next `NAME("value")` occurrence in `text`. Returns the directive
/// name, the quoted value, and the remaining text after the closing paren.
fn next_directive(text: &str) -> Option<(&'static str, String, &str)> {
    let mut best: Option<(usize, &'static str)> = None;
    for name in DIRECTIVE_NAMES {
        let mut from = 0;
        while let Some(rel) = text[from..].find(name) {
            let at = from + rel;
            if is_word_boundary(text, at, name.len()) {
                if best.map_or(true, |(pos, _)| at < pos) {
                    best = Some((at, name));
                }
                break;
            }
            from = at + name.len();
        }
    }

    let (at, name) = best?;
    let after = &text[at + name.len()..];
    let (value, consumed) = parse_call(after)?;
    Some((name, value, &after[consumed..]))
}

/// The directive name must stand alone: `MY_FLAG("x")` is not `FLAG("x")`,
/// and `LIBRARY_PATH("x")` is not `LIBRARY("x")`.
fn is_word_boundary(text: &str, at: usize, len: usize) -> bool {
    let before_ok = at == 0
        || !text[..at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
    let after_ok = !text[at + len..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    before_ok && after_ok
}

/// Parse `("value")` at the start of `text` (whitespace allowed around the
/// quoted string). Returns the value and the number of bytes consumed.
fn parse_call(text: &str) -> Option<(String, usize)> {
    let mut chars = text.char_indices().peekable();

    let (_, open) = chars.next()?;
    if open != '(' {
        return None;
    }
    while chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
        chars.next();
    }
    let (_, quote) = chars.next()?;
    if quote != '"' {
        return None;
    }

    let mut value = String::new();
    for (i, c) in chars.by_ref() {
        if c == '"' {
            // Closing paren, possibly after whitespace.
            let tail = &text[i + 1..];
            let close = tail.find(|c: char| !c.is_whitespace())?;
            if tail[close..].starts_with(')') {
                return Some((value, i + 1 + close + 1));
            }
            return None;
        }
        value.push(c);
    }
    None
}
