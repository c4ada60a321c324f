//! Logical path handling shared by every backend.
//!
//! A logical path is a `/`-delimited identifier relative to the backend's
//! root. Backends only ever see the normalized form produced here.

use crate::error::{Error, Result};

pub const SEPARATOR: char = '/';

/// Normalize a caller-supplied logical path.
///
/// Leading separators, empty segments and `.` segments are dropped; `..` is
/// rejected since it could reach outside the backend root. The empty string
/// names the root itself.
pub fn normalize(path: &str) -> Result<String> {
    let mut segments = Vec::new();
    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(Error::InvalidPath {
                    path: path.to_string(),
                    reason: "parent segments are not allowed",
                });
            }
            s => segments.push(s),
        }
    }
    Ok(segments.join("/"))
}

/// Like [`normalize`], but the root itself is not a valid target.
pub fn normalize_file(path: &str) -> Result<String> {
    let normalized = normalize(path)?;
    if normalized.is_empty() {
        return Err(Error::InvalidPath {
            path: path.to_string(),
            reason: "path names the storage root",
        });
    }
    Ok(normalized)
}

/// Number of segments in a relative path; `""` has depth 0.
pub fn depth(relative: &str) -> usize {
    relative
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .count()
}

/// Join two normalized fragments with a single separator.
pub fn join(base: &str, rest: &str) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{rest}"),
    }
}
