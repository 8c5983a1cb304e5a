//! Source preparation: the entry gate, comment stripping, and the textual
//! library import system.
//!
//! Preparation happens before lexing. Comments are removed wherever their
//! patterns match, then every `@path;` token is replaced by the referenced
//! library's fully prepared body. Nested imports resolve recursively;
//! a path that is already being resolved further up the chain is a
//! circular import and is rejected rather than recursed into.

use std::{fs, path::Path, sync::LazyLock};

use regex::Regex;

use crate::error::{RunError, RunResult};

/// Mandatory extension for programs and libraries.
pub const SOURCE_EXTENSION: &str = "graveyard";

/// Opening delimiter of the global namespace.
const OPEN_GLOBAL: &str = "::{";
/// Closing delimiter of the global namespace.
const CLOSE_GLOBAL: &str = "}";

static LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^//[^\n]*").expect("pattern must compile"));
static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^/\*.*?\*/").expect("pattern must compile"));

/// Library path tokens: a drive path, an absolute path, or a `./`-relative
/// path, introduced by `@` and terminated by `;`.
static PATH_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@[a-zA-Z]:[\\/][a-zA-Z0-9_.\\/-]+;|@\.?[\\/][a-zA-Z0-9_.\\/-]+;").expect("pattern must compile")
});

/// Reads a program from disk, refusing files without the mandated extension.
pub fn load_program(path: &Path) -> RunResult<String> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    if path.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXTENSION) {
        return Err(RunError::value(format!(
            "{name} is not graveyard source code, please use .{SOURCE_EXTENSION} extension"
        )));
    }
    fs::read_to_string(path).map_err(|_| RunError::value(format!("{} is not a valid file path", path.display())))
}

/// Verifies the outer `::{ … }` wrapper and returns the interior.
pub fn strip_global_namespace(source: &str) -> RunResult<&str> {
    strip_delimiters(source).ok_or_else(|| RunError::syntax("Global namespace not declared"))
}

fn strip_library_namespace(source: &str) -> RunResult<&str> {
    strip_delimiters(source).ok_or_else(|| RunError::syntax("Global namespace not declared in library"))
}

fn strip_delimiters(source: &str) -> Option<&str> {
    let trimmed = source.trim();
    if trimmed.len() >= OPEN_GLOBAL.len() + CLOSE_GLOBAL.len()
        && trimmed.starts_with(OPEN_GLOBAL)
        && trimmed.ends_with(CLOSE_GLOBAL)
    {
        Some(&trimmed[OPEN_GLOBAL.len()..trimmed.len() - CLOSE_GLOBAL.len()])
    } else {
        None
    }
}

/// Removes single-line and block comments with a streaming scan. The scan is
/// purely textual; matches are removed wherever they occur.
pub fn strip_comments(source: &str) -> String {
    let mut cleaned = String::with_capacity(source.len());
    let mut position = 0;
    while position < source.len() {
        let rest = &source[position..];
        if let Some(found) = LINE_COMMENT.find(rest).or_else(|| BLOCK_COMMENT.find(rest)) {
            position += found.end();
            continue;
        }
        let current = rest.chars().next().expect("position is in bounds");
        cleaned.push(current);
        position += current.len_utf8();
    }
    cleaned
}

/// Prepares a program body that has already passed the entry gate: strips
/// comments, then splices every referenced library in place of its path
/// token.
pub fn prepare(source: &str) -> RunResult<String> {
    let cleaned = strip_comments(source);
    resolve_imports(&cleaned, &mut Vec::new())
}

/// Substitutes each unique `@path;` token with the referenced library's
/// prepared body. `in_progress` is the chain of libraries currently being
/// resolved; hitting one again means the imports form a cycle.
fn resolve_imports(source: &str, in_progress: &mut Vec<String>) -> RunResult<String> {
    let mut libraries: Vec<(String, String)> = Vec::new();
    for found in PATH_TOKEN.find_iter(source) {
        let token = found.as_str();
        if libraries.iter().any(|(seen, _)| seen == token) {
            continue;
        }
        let normalized = token.replace('\\', "/");
        let path = normalized[1..normalized.len() - 1].to_owned();
        if in_progress.contains(&path) {
            return Err(RunError::reference(format!("Circular library import: {path}")));
        }

        in_progress.push(path.clone());
        let raw = load_library(&path)?;
        let body = strip_library_namespace(&raw)?;
        let cleaned = strip_comments(body);
        let resolved = resolve_imports(&cleaned, in_progress)?;
        in_progress.pop();

        libraries.push((token.to_owned(), resolved));
    }

    let mut resolved = source.to_owned();
    for (token, body) in libraries {
        resolved = resolved.replace(&token, &body);
    }
    Ok(resolved)
}

fn load_library(path: &str) -> RunResult<String> {
    let library_path = format!("{path}.{SOURCE_EXTENSION}");
    fs::read_to_string(&library_path).map_err(|_| RunError::reference(format!("Library not found: {library_path}")))
}
