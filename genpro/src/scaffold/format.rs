//! Source formatting for generated files
//!
//! Rust output is parsed with `syn` and pretty-printed, so a template that
//! renders invalid Rust is caught before anything touches the disk. Other
//! files only get their whitespace normalised.

use crate::error::FsError;
use std::path::Path;

/// Format `content` according to the extension of `path`
///
/// # Errors
///
/// Returns [`FsError::FormatFailed`] when a `.rs` file does not parse.
pub fn format_source(path: &Path, content: &str) -> Result<String, FsError> {
    if path.extension().is_some_and(|ext| ext == "rs") {
        format_rust(path, content)
    } else {
        Ok(normalize_whitespace(content))
    }
}

fn format_rust(path: &Path, content: &str) -> Result<String, FsError> {
    let file = syn::parse_file(content).map_err(|e| FsError::FormatFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(prettyplease::unparse(&file))
}

/// Strip trailing whitespace from every line and end with exactly one newline
///
/// # Examples
///
/// ```
/// # use genpro::scaffold::format::normalize_whitespace;
/// assert_eq!(normalize_whitespace("a  \nb\t\n\n\n"), "a\nb\n");
/// assert_eq!(normalize_whitespace(""), "");
/// ```
#[must_use]
pub fn normalize_whitespace(content: &str) -> String {
    let mut out = content
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let trimmed_len = out.trim_end_matches('\n').len();
    out.truncate(trimmed_len);
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
