//! Path and directory helpers built on the directory contract.

use crate::stub::Directory;
use crate::tree::path;
use crate::types::NameComparer;

/// Strip trailing separators of either kind; a bare `/` is kept.
pub fn trim_path(path: &str, separator: char) -> &str {
    if path.len() == separator.len_utf8() && path.starts_with(separator) {
        return path;
    }
    path.trim_end_matches(&['\\', '/'][..])
}

/// Listing helpers available on every [`Directory`]
pub trait DirectoryExt: Directory {
    /// Files below `path` at any depth; a missing directory yields nothing.
    fn get_files_recursive(&self, path: &str) -> Vec<String> {
        let mut files = self.get_files(path).unwrap_or_default();
        for directory in self.get_directories(path).unwrap_or_default() {
            files.extend(self.get_files_recursive(&directory));
        }
        files
    }

    /// True when `path` holds no files at any depth; missing counts as empty.
    fn folder_is_empty(&self, path: &str) -> bool {
        if !self.get_files(path).unwrap_or_default().is_empty() {
            return false;
        }
        self.get_directories(path)
            .unwrap_or_default()
            .iter()
            .all(|directory| self.folder_is_empty(directory))
    }
}

impl<T: Directory + ?Sized> DirectoryExt for T {}

/// Directories strictly between `ancestor` and `descendant`, deepest first
///
/// Empty when `descendant` is not below `ancestor`.
pub fn get_all_folders_between(
    ancestor: &str,
    descendant: &str,
    separator: char,
    comparer: NameComparer,
) -> Vec<String> {
    let outer = path::parse(ancestor, separator);
    let inner = path::parse(descendant, separator);
    if outer.is_empty()
        || inner.len() <= outer.len()
        || !outer.iter().zip(&inner).all(|(a, b)| comparer.equals(a, b))
    {
        return Vec::new();
    }
    (outer.len() + 1..inner.len())
        .rev()
        .map(|end| path::join(&inner[..end], separator))
        .collect()
}

/// Deepest directory shared by every path in `directories`
///
/// `None` when the paths share no directory below their root.
pub fn greatest_common_directory<S: AsRef<str>>(
    directories: &[S],
    separator: char,
    comparer: NameComparer,
) -> Option<String> {
    let parsed: Vec<Vec<String>> = directories
        .iter()
        .map(|d| path::parse(d.as_ref(), separator))
        .collect();
    let baseline = parsed.iter().min_by_key(|segments| segments.len())?;

    let shared = (0..baseline.len())
        .take_while(|&i| {
            parsed
                .iter()
                .all(|segments| comparer.equals(&segments[i], &baseline[i]))
        })
        .count();
    (shared > 1).then(|| path::join(&baseline[..shared], separator))
}
