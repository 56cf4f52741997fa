//! Filesystem Stub
//!
//! Directory, file and drive operations over a shared node tree, with the
//! error semantics of a real filesystem. Every mutation runs under one write
//! guard; the invalidation listener is notified after the guard is released.

pub mod contract;
pub mod directory;
pub mod drive;
pub mod file;
pub mod pattern;
pub mod stream;

pub use contract::{Directory, Drive, File, FileMode, SearchOption};
pub use directory::DirectoryStub;
pub use drive::DriveStub;
pub use file::FileStub;
pub use stream::FileNodeStream;

use crate::error::{Result, VfsError};
use crate::tree::{path, NodeTimes, NodeTree};
use crate::types::NodeId;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Tree shared between the stub, the builder and the persistence bridge
pub type SharedTree = Arc<RwLock<NodeTree>>;

/// Receives a signal after every successful tree mutation
pub trait InvalidationListener: Send + Sync {
    fn invalidate(&self) -> Result<()>;
}

#[derive(Clone)]
pub(crate) struct StubCore {
    tree: SharedTree,
    listener: Option<Arc<dyn InvalidationListener>>,
}

impl StubCore {
    pub(crate) fn read<T>(&self, op: impl FnOnce(&NodeTree) -> Result<T>) -> Result<T> {
        let tree = self.tree.read();
        op(&tree)
    }

    /// Run `op` under the write guard, then notify the listener on success.
    pub(crate) fn mutate<T>(&self, op: impl FnOnce(&mut NodeTree) -> Result<T>) -> Result<T> {
        self.mutate_if(|tree| op(tree).map(|value| (value, true)))
    }

    /// Like `mutate`, but `op` reports whether the tree actually changed.
    pub(crate) fn mutate_if<T>(
        &self,
        op: impl FnOnce(&mut NodeTree) -> Result<(T, bool)>,
    ) -> Result<T> {
        let (value, changed) = {
            let mut tree = self.tree.write();
            op(&mut tree)?
        };
        if changed {
            if let Some(listener) = &self.listener {
                listener.invalidate()?;
            }
        }
        Ok(value)
    }
}

/// Directory, file and drive surfaces over one tree
#[derive(Clone)]
pub struct FileSystemStub {
    tree: SharedTree,
    directory: DirectoryStub,
    file: FileStub,
    drive: DriveStub,
}

impl FileSystemStub {
    pub fn new(tree: SharedTree) -> Self {
        Self::build(tree, None)
    }

    /// Stub whose mutations signal `listener`
    pub fn with_listener(tree: SharedTree, listener: Arc<dyn InvalidationListener>) -> Self {
        Self::build(tree, Some(listener))
    }

    fn build(tree: SharedTree, listener: Option<Arc<dyn InvalidationListener>>) -> Self {
        let core = StubCore {
            tree: tree.clone(),
            listener,
        };
        Self {
            tree,
            directory: DirectoryStub::new(core.clone()),
            file: FileStub::new(core.clone()),
            drive: DriveStub::new(core),
        }
    }

    pub fn tree(&self) -> &SharedTree {
        &self.tree
    }

    pub fn directory(&self) -> &DirectoryStub {
        &self.directory
    }

    pub fn file(&self) -> &FileStub {
        &self.file
    }

    pub fn drive(&self) -> &DriveStub {
        &self.drive
    }
}

/// Container holding the terminal segment, or a missing-part error naming `path`
pub(crate) fn parent_container(tree: &NodeTree, segments: &[String], path: &str) -> Result<NodeId> {
    tree.get_parent_segments(segments)
        .ok_or_else(|| VfsError::could_not_find_part(path))
}

/// Directory or volume at `path`
pub(crate) fn existing_directory(tree: &NodeTree, path: &str) -> Result<NodeId> {
    let segments = tree.resolve(path)?;
    if segments.len() == 1 {
        return tree
            .find_volume(&segments[0])
            .ok_or_else(|| VfsError::could_not_find_part(path));
    }
    let parent = parent_container(tree, &segments, path)?;
    let name = &segments[segments.len() - 1];
    if let Some(directory) = tree.arena().find_directory(parent, name) {
        return Ok(directory);
    }
    if tree.arena().find_file(parent, name).is_some() {
        return Err(VfsError::WrongNodeKind(format!(
            "The directory name '{}' is a file.",
            path
        )));
    }
    Err(VfsError::could_not_find_part(path))
}

/// File node at `path` along with its resolved segments
pub(crate) fn existing_file(tree: &NodeTree, path: &str) -> Result<(Vec<String>, NodeId)> {
    let segments = tree.resolve(path)?;
    let parent = parent_container(tree, &segments, path)?;
    let name = &segments[segments.len() - 1];
    if let Some(file) = tree.arena().find_file(parent, name) {
        return Ok((segments, file));
    }
    if tree.arena().find_directory(parent, name).is_some() {
        return Err(VfsError::WrongNodeKind(format!(
            "Access to the path '{}' is denied; it is a directory.",
            path
        )));
    }
    Err(VfsError::could_not_find_file(path))
}

/// File node at already-resolved `segments`
pub(crate) fn file_at(tree: &NodeTree, segments: &[String]) -> Option<NodeId> {
    let parent = tree.get_parent_segments(segments)?;
    tree.arena().find_file(parent, segments.last()?)
}

/// Resolve a move or copy destination; relative paths hang off the source's parent
pub(crate) fn resolve_destination(
    tree: &NodeTree,
    src_segments: &[String],
    dest: &str,
) -> Result<Vec<String>> {
    let separator = tree.separator();
    let normalized = if separator == '\\' {
        dest.replace('/', "\\")
    } else {
        dest.to_string()
    };
    if path::is_fully_qualified(&normalized, separator) {
        return tree.resolve(&normalized);
    }
    let base = path::join(&src_segments[..src_segments.len().saturating_sub(1)], separator);
    let combined = if base.ends_with(separator) {
        format!("{}{}", base, normalized)
    } else {
        format!("{}{}{}", base, separator, normalized)
    };
    tree.resolve(&combined)
}

/// Move a file or directory node, renaming in place when the parent is unchanged
pub(crate) fn move_node(tree: &mut NodeTree, src: &str, dest: &str, is_file: bool) -> Result<()> {
    let src_segments = tree.resolve(src)?;
    if src_segments.len() <= 1 {
        return Err(VfsError::InvalidOperation(format!(
            "Cannot move the volume root '{}'.",
            src
        )));
    }
    let src_node = if is_file {
        existing_file(tree, src)?.1
    } else {
        existing_directory(tree, src)?
    };
    let src_parent = tree.node(src_node).parent().ok_or_else(|| {
        VfsError::InvalidOperation(format!("Cannot move the volume root '{}'.", src))
    })?;

    let dest_segments = resolve_destination(tree, &src_segments, dest)?;
    if dest_segments.len() <= 1 {
        return Err(VfsError::InvalidOperation(format!(
            "Cannot replace the volume root '{}'.",
            dest
        )));
    }

    let comparer = tree.arena().comparer_of(src_node);
    if !is_file
        && dest_segments.len() > src_segments.len()
        && src_segments
            .iter()
            .zip(&dest_segments)
            .all(|(a, b)| comparer.equals(a, b))
    {
        return Err(VfsError::InvalidOperation(format!(
            "Cannot move '{}' into its own subdirectory '{}'.",
            src, dest
        )));
    }

    let dest_parent_segments = &dest_segments[..dest_segments.len() - 1];
    let dest_parent = tree.get_or_create_segments(dest_parent_segments, false, NodeTimes::default())?;
    if !tree.node(dest_parent).is_container() {
        return Err(VfsError::could_not_find_part(dest));
    }
    let dest_name = dest_segments[dest_segments.len() - 1].clone();

    if dest_parent == src_parent {
        if comparer.equals(tree.node(src_node).name(), &dest_name) {
            return Err(VfsError::InvalidOperation(
                "Source and destination path must be different.".to_string(),
            ));
        }
        if tree.arena().find_child(dest_parent, &dest_name).is_some() {
            return Err(VfsError::AlreadyExists(format!(
                "Cannot create '{}' because a file or directory with the same name already exists.",
                dest
            )));
        }
        tree.arena.rename(src_node, dest_name);
    } else {
        if tree.arena().find_child(dest_parent, &dest_name).is_some() {
            return Err(VfsError::AlreadyExists(format!(
                "Cannot create '{}' because a file or directory with the same name already exists.",
                dest
            )));
        }
        tree.arena.detach(src_node);
        tree.arena.rename(src_node, dest_name);
        tree.arena.attach(dest_parent, src_node);
    }

    debug!(
        from = src,
        to = %tree.full_path(src_node),
        file = is_file,
        "Moved node"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeOptions;
    use crate::types::Platform;

    fn shared(platform: Platform) -> SharedTree {
        Arc::new(RwLock::new(NodeTree::new(TreeOptions::new(platform))))
    }

    struct Counter(std::sync::atomic::AtomicUsize);

    impl InvalidationListener for Counter {
        fn invalidate(&self) -> Result<()> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_listener_fires_only_after_successful_mutations() {
        let counter = Arc::new(Counter(Default::default()));
        let stub = FileSystemStub::with_listener(shared(Platform::Windows), counter.clone());

        stub.directory().create_directory(r"C:\a").unwrap();
        stub.file().write_all_text(r"C:\a\x.txt", "x").unwrap();
        assert!(stub.file().read_all_text(r"C:\a\x.txt").is_ok());
        assert!(stub.directory().delete(r"C:\a").is_err());

        assert_eq!(counter.0.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_relative_destination_hangs_off_source_parent() {
        let tree = shared(Platform::Linux);
        let guard = tree.read();
        let src = guard.resolve("/mnt/a/file.txt").unwrap();
        let dest = resolve_destination(&guard, &src, "../b/renamed.txt").unwrap();
        assert_eq!(dest, vec!["/", "mnt", "b", "renamed.txt"]);

        let src = guard.resolve("/file.txt").unwrap();
        let dest = resolve_destination(&guard, &src, "other.txt").unwrap();
        assert_eq!(dest, vec!["/", "other.txt"]);
    }

    #[test]
    fn test_listener_error_reaches_caller() {
        struct Failing;
        impl InvalidationListener for Failing {
            fn invalidate(&self) -> Result<()> {
                Err(VfsError::Locked("layout.json".to_string()))
            }
        }

        let stub = FileSystemStub::with_listener(shared(Platform::Windows), Arc::new(Failing));
        let result = stub.directory().create_directory(r"C:\a");
        assert!(matches!(result, Err(VfsError::Locked(_))));
        assert!(stub.directory().exists(r"C:\a"));
    }
}
