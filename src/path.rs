//! Relative links between documents that share a base directory.
//!
//! ```
//! use datatools::path::relative_doc_path;
//!
//! assert_eq!(
//!     relative_doc_path("chapter-01/lesson-03.html", "css/site.css").unwrap(),
//!     "../css/site.css"
//! );
//! assert_eq!(relative_doc_path("index.html", "css/site.css").unwrap(), "css/site.css");
//! ```

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PathError {
    #[error("path {0:?} leaves the common base directory")]
    EscapesBase(String),

    #[error("empty target path")]
    EmptyTarget,
}

/// Splits a path into its segments, resolving `.` and `..` and ignoring
/// repeated separators. Both `/` and `\` separate segments.
fn segments(path: &str) -> Result<Vec<&str>, PathError> {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if out.pop().is_none() {
                    return Err(PathError::EscapesBase(path.to_string()));
                }
            }
            segment => out.push(segment),
        }
    }
    Ok(out)
}

fn is_directory(path: &str) -> bool {
    path.ends_with('/') || path.ends_with('\\')
}

/// Path of `target` as linked from the document at `source`.
///
/// Both paths are taken relative to the same implied base directory. A
/// trailing separator marks a path as a directory rather than a document.
pub fn relative_doc_path(source: &str, target: &str) -> Result<String, PathError> {
    let mut source_dirs = segments(source)?;
    if !is_directory(source) {
        source_dirs.pop();
    }

    let target_segments = segments(target)?;
    if target_segments.is_empty() {
        if target.is_empty() {
            return Err(PathError::EmptyTarget);
        }
        // The base directory itself.
        return Ok(match source_dirs.len() {
            0 => "./".to_string(),
            depth => "../".repeat(depth),
        });
    }

    let target_dir_len = if is_directory(target) {
        target_segments.len()
    } else {
        target_segments.len() - 1
    };
    let common = source_dirs
        .iter()
        .zip(&target_segments[..target_dir_len])
        .take_while(|(a, b)| a == b)
        .count();

    let rest = target_segments[common..].join("/");
    let mut relative = "../".repeat(source_dirs.len() - common);
    relative.push_str(&rest);
    if is_directory(target) && !rest.is_empty() {
        relative.push('/');
    }
    if relative.is_empty() {
        relative.push_str("./");
    }
    Ok(relative)
}
