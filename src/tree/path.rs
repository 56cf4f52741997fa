//! Path tokenization for drive, UNC and POSIX-rooted paths.
//!
//! Segment 0 of a parsed path is always the root token: a drive token such as
//! `C:`, a host token such as `\\tsclient`, or the bare separator for a POSIX
//! root. Empty segments are dropped, so trailing separators never produce a
//! trailing empty segment.

use crate::error::{Result, VfsError};

/// Split `path` into its root token followed by its segments.
pub fn parse(path: &str, separator: char) -> Vec<String> {
    let mut segments = Vec::new();
    if path.is_empty() {
        return segments;
    }

    let width = separator.len_utf8();
    let unc_prefix: String = [separator, separator].iter().collect();

    let rest = if path.starts_with(&unc_prefix) {
        let after_prefix = &path[2 * width..];
        match after_prefix.find(separator) {
            Some(i) => {
                segments.push(path[..2 * width + i].to_string());
                &after_prefix[i..]
            }
            None => {
                segments.push(path.to_string());
                ""
            }
        }
    } else if path.starts_with(separator) {
        segments.push(separator.to_string());
        &path[width..]
    } else {
        match path.find(separator) {
            Some(i) => {
                segments.push(path[..i].to_string());
                &path[i..]
            }
            None => {
                segments.push(path.to_string());
                ""
            }
        }
    };

    segments.extend(
        rest.split(separator)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    );
    segments
}

/// Rebuild a full path from a root token and segments.
pub fn join<S: AsRef<str>>(segments: &[S], separator: char) -> String {
    let mut iter = segments.iter();
    let Some(root) = iter.next() else {
        return String::new();
    };
    let root = root.as_ref();
    let mut full = String::from(root);
    let mut needs_separator = !(root.len() == separator.len_utf8() && root.starts_with(separator));
    for segment in iter {
        if needs_separator {
            full.push(separator);
        }
        full.push_str(segment.as_ref());
        needs_separator = true;
    }
    full
}

/// Path of the parent container, or `None` for a bare root.
pub fn parent_path<S: AsRef<str>>(segments: &[S], separator: char) -> Option<String> {
    if segments.len() <= 1 {
        return None;
    }
    Some(join(&segments[..segments.len() - 1], separator))
}

/// Terminal segment of `path`, or `None` for a bare root.
pub fn file_name(path: &str, separator: char) -> Option<String> {
    let mut segments = parse(path, separator);
    if segments.len() <= 1 {
        return None;
    }
    segments.pop()
}

/// Whether `path` is anchored to a volume under the separator's convention.
pub fn is_fully_qualified(path: &str, separator: char) -> bool {
    if path.starts_with(separator) {
        // A single leading backslash is drive-relative on Windows.
        return separator == '/' || path[separator.len_utf8()..].starts_with(separator);
    }
    if separator == '\\' {
        let mut chars = path.chars();
        if let (Some(drive), Some(':')) = (chars.next(), chars.next()) {
            return drive.is_ascii_alphabetic() && matches!(chars.next(), None | Some('\\'));
        }
    }
    false
}

/// Qualify, parse and lexically resolve `.` and `..` segments.
///
/// Stands in for host canonicalization: the tree has no working directory, so
/// relative paths are rejected. On backslash trees `/` is accepted as an
/// alternate separator.
pub fn resolve(path: &str, separator: char) -> Result<Vec<String>> {
    let path = if separator == '\\' {
        path.replace('/', "\\")
    } else {
        path.to_string()
    };

    if !is_fully_qualified(&path, separator) {
        return Err(VfsError::InvalidOperation(format!(
            "Path is not fully qualified: '{}'",
            path
        )));
    }

    let mut segments = parse(&path, separator);
    let unc_prefix_width = 2 * separator.len_utf8();
    if let Some(root) = segments.first() {
        if root.len() == unc_prefix_width && root.chars().all(|c| c == separator) {
            return Err(VfsError::InvalidOperation(format!(
                "Network path has no host name: '{}'",
                path
            )));
        }
    }
    if separator == '\\' {
        if let Some(root) = segments.first_mut() {
            if root.len() == 2 && root.ends_with(':') {
                *root = root.to_ascii_uppercase();
            }
        }
    }

    Ok(normalize(segments))
}

/// Drop `.` segments and fold `..` into its predecessor; the root is never popped.
pub fn normalize(segments: Vec<String>) -> Vec<String> {
    let mut resolved = Vec::with_capacity(segments.len());
    let mut iter = segments.into_iter();
    if let Some(root) = iter.next() {
        resolved.push(root);
    }
    for segment in iter {
        match segment.as_str() {
            "." => {}
            ".." => {
                if resolved.len() > 1 {
                    resolved.pop();
                }
            }
            _ => resolved.push(segment),
        }
    }
    resolved
}
