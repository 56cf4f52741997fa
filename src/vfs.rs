//! Virtual Filesystem
//!
//! Owns the shared tree and the stub surfaces over it, and seeds the tree from
//! literal paths or by mirroring a directory on disk.

use crate::error::{Result, VfsError};
use crate::stub::{DirectoryStub, DriveStub, FileStub, FileSystemStub, SharedTree};
use crate::tree::{Node, NodeTimes, NodeTree, TreeOptions};
use crate::types::{NodeId, Platform, Timestamp};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};
use walkdir::WalkDir;

/// In-memory filesystem with a builder for seeding its tree
#[derive(Clone)]
pub struct VirtualFileSystem {
    stub: FileSystemStub,
}

impl VirtualFileSystem {
    pub fn new(options: TreeOptions) -> Self {
        let tree: SharedTree = Arc::new(RwLock::new(NodeTree::new(options)));
        Self {
            stub: FileSystemStub::new(tree),
        }
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self::new(TreeOptions::new(platform))
    }

    pub(crate) fn from_stub(stub: FileSystemStub) -> Self {
        Self { stub }
    }

    /// Filesystem for the current platform holding `path`
    pub fn with_path(path: &str) -> Result<Self> {
        Self::new(TreeOptions::default()).and_path(path)
    }

    /// Filesystem for the current platform mirroring the directory at `path`
    pub fn from_physical_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(TreeOptions::default()).and_physical_path(path)
    }

    /// Add a directory path, creating any missing parents.
    pub fn and_path(self, path: &str) -> Result<Self> {
        self.and_path_with_times(path, NodeTimes::default())
    }

    /// Add a directory path; `times` applies to directories created here.
    pub fn and_path_with_times(self, path: &str, times: NodeTimes) -> Result<Self> {
        {
            let mut tree = self.stub.tree().write();
            let segments = tree.resolve(path)?;
            let id = tree.get_or_create_segments(&segments, false, times)?;
            if tree.node(id).is_file() {
                return Err(VfsError::AlreadyExists(format!(
                    "Cannot create '{}' because a file with the same name already exists.",
                    path
                )));
            }
        }
        Ok(self)
    }

    /// Add a file with `contents`; an existing file is left untouched.
    pub fn with_file(self, path: &str, contents: impl AsRef<[u8]>) -> Result<Self> {
        self.with_file_times(path, contents, NodeTimes::default())
    }

    pub fn with_file_times(
        self,
        path: &str,
        contents: impl AsRef<[u8]>,
        times: NodeTimes,
    ) -> Result<Self> {
        {
            let mut tree = self.stub.tree().write();
            add_file(&mut tree, path, contents.as_ref(), times)?;
        }
        Ok(self)
    }

    /// Add empty files at every path.
    pub fn with_files<I, S>(self, paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        {
            let mut tree = self.stub.tree().write();
            for path in paths {
                add_file(&mut tree, path.as_ref(), &[], NodeTimes::default())?;
            }
        }
        Ok(self)
    }

    /// Mirror the directory at `path` and everything below it
    ///
    /// Directories and files take their timestamps from disk; files take their
    /// contents. The host path is canonicalized and must be expressible under
    /// this tree's platform conventions.
    pub fn and_physical_path(self, path: impl AsRef<Path>) -> Result<Self> {
        let root = dunce::canonicalize(path.as_ref())?;
        {
            let mut tree = self.stub.tree().write();
            let separator = tree.separator();
            let mut mirrored = 0usize;

            for entry in WalkDir::new(&root).follow_links(false) {
                let entry = entry.map_err(|e| VfsError::Io(e.into()))?;
                let virtual_path = to_virtual_path(entry.path(), separator);
                let metadata = entry.metadata().map_err(|e| VfsError::Io(e.into()))?;
                let times = NodeTimes::new(
                    metadata.created().ok().map(to_timestamp),
                    metadata.modified().ok().map(to_timestamp),
                );

                if entry.file_type().is_dir() {
                    let segments = tree.resolve(&virtual_path)?;
                    tree.get_or_create_segments(&segments, false, times)?;
                } else if entry.file_type().is_file() {
                    let contents = std::fs::read(entry.path())?;
                    add_file(&mut tree, &virtual_path, &contents, times)?;
                    mirrored += 1;
                }
            }
            info!(root = %root.display(), files = mirrored, "Mirrored physical path");
        }
        Ok(self)
    }

    /// Drop every volume.
    pub fn clear(&self) {
        self.stub.tree().write().clear();
    }

    pub fn platform(&self) -> Platform {
        self.stub.tree().read().platform()
    }

    pub fn separator(&self) -> char {
        self.stub.tree().read().separator()
    }

    pub fn tree(&self) -> &SharedTree {
        self.stub.tree()
    }

    pub fn stub(&self) -> &FileSystemStub {
        &self.stub
    }

    pub fn directory(&self) -> &DirectoryStub {
        self.stub.directory()
    }

    pub fn file(&self) -> &FileStub {
        self.stub.file()
    }

    pub fn drive(&self) -> &DriveStub {
        self.stub.drive()
    }
}

impl std::fmt::Debug for VirtualFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.stub.tree().read();
        f.debug_struct("VirtualFileSystem")
            .field("platform", &tree.platform())
            .field("volumes", &tree.volumes().len())
            .field("nodes", &tree.arena().len())
            .finish()
    }
}

/// Add a file under its parent, creating parents; an existing file is kept.
pub(crate) fn add_file(
    tree: &mut NodeTree,
    path: &str,
    contents: &[u8],
    times: NodeTimes,
) -> Result<NodeId> {
    let segments = tree.resolve(path)?;
    if segments.len() <= 1 {
        return Err(VfsError::InvalidOperation(format!(
            "'{}' names a volume, not a file.",
            path
        )));
    }
    let parent = tree.get_or_create_segments(&segments[..segments.len() - 1], false, times)?;
    if !tree.node(parent).is_container() {
        return Err(VfsError::could_not_find_part(path));
    }
    let name = &segments[segments.len() - 1];
    if let Some(existing) = tree.arena().find_file(parent, name) {
        return Ok(existing);
    }
    let node = Node::file(name.as_str(), contents.to_vec()).with_times(times);
    let id = tree.arena.insert_child(parent, node);
    debug!(path, bytes = contents.len(), "Added file");
    Ok(id)
}

fn to_virtual_path(host: &Path, separator: char) -> String {
    let text = host.to_string_lossy();
    if std::path::MAIN_SEPARATOR == separator {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, &separator.to_string())
    }
}

fn to_timestamp(time: SystemTime) -> Timestamp {
    Timestamp::from(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{Directory, Drive, File};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_with_file_then_list_and_read() {
        let vfs = VirtualFileSystem::for_platform(Platform::Windows)
            .with_file(r"C:\a\b\c.txt", "hello")
            .unwrap();
        assert_eq!(
            vfs.directory().get_files(r"C:\a\b").unwrap(),
            vec![r"C:\a\b\c.txt".to_string()]
        );
        assert_eq!(vfs.file().read_all_text(r"C:\a\b\c.txt").unwrap(), "hello");
    }

    #[test]
    fn test_with_file_keeps_existing() {
        let vfs = VirtualFileSystem::for_platform(Platform::Linux)
            .with_file("/etc/hosts", "first")
            .unwrap()
            .with_file("/etc/hosts", "second")
            .unwrap();
        assert_eq!(vfs.file().read_all_text("/etc/hosts").unwrap(), "first");
    }

    #[test]
    fn test_builder_times() {
        let when = Utc.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap();
        let vfs = VirtualFileSystem::for_platform(Platform::Linux)
            .and_path_with_times("/srv/www", NodeTimes::new(Some(when), Some(when)))
            .unwrap()
            .with_file_times("/srv/www/index.html", b"<html/>", NodeTimes::new(None, Some(when)))
            .unwrap();
        assert_eq!(vfs.directory().get_creation_time_utc("/srv").unwrap(), when);
        assert_eq!(
            vfs.file().get_last_write_time_utc("/srv/www/index.html").unwrap(),
            when
        );
    }

    #[test]
    fn test_with_files_and_clear() {
        let vfs = VirtualFileSystem::for_platform(Platform::Windows)
            .with_files([r"C:\x\1.txt", r"C:\x\2.txt", r"D:\y\3.txt"])
            .unwrap();
        assert_eq!(vfs.directory().get_files(r"C:\x").unwrap().len(), 2);
        assert_eq!(vfs.drive().get_drives(), vec!["C:", "D:"]);

        vfs.clear();
        assert!(vfs.drive().get_drives().is_empty());
        assert!(!vfs.file().exists(r"C:\x\1.txt"));
    }

    #[test]
    fn test_and_path_rejects_relative() {
        let result = VirtualFileSystem::for_platform(Platform::Linux).and_path("relative/dir");
        assert!(matches!(result, Err(VfsError::InvalidOperation(_))));
    }

    #[test]
    fn test_mirror_physical_path() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("sub/deeper")).unwrap();
        std::fs::write(root.join("top.txt"), "top").unwrap();
        std::fs::write(root.join("sub/deeper/leaf.bin"), [1u8, 2, 3]).unwrap();

        let vfs = VirtualFileSystem::from_physical_path(root).unwrap();
        let canonical = dunce::canonicalize(root).unwrap();
        let host = |relative: &Path| canonical.join(relative).to_string_lossy().into_owned();

        assert_eq!(
            vfs.file().read_all_text(&host(Path::new("top.txt"))).unwrap(),
            "top"
        );
        let leaf = Path::new("sub").join("deeper").join("leaf.bin");
        assert_eq!(vfs.file().read_all_bytes(&host(&leaf)).unwrap(), vec![1, 2, 3]);
        assert!(vfs.directory().exists(&host(Path::new("sub"))));
    }
}
