//! Live Virtual Filesystem
//!
//! A virtual filesystem bound to a layout document: loaded on open, saved
//! after every mutation, and reloaded when another writer changes the
//! document.

use crate::config::VfsConfig;
use crate::error::{Result, VfsError};
use crate::persistence::{LayoutFilePersistence, Persistence};
use crate::stub::{DirectoryStub, DriveStub, FileStub, FileSystemStub, SharedTree};
use crate::tree::NodeTree;
use crate::vfs::VirtualFileSystem;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct LiveVirtualFileSystem {
    vfs: VirtualFileSystem,
    persistence: Arc<LayoutFilePersistence>,
}

impl LiveVirtualFileSystem {
    /// Open the layout document named by `config.persistence.layout_file`
    ///
    /// A missing document starts an empty tree; the document is written on
    /// the first mutation.
    pub fn open(config: &VfsConfig) -> Result<Self> {
        config.validate()?;
        let layout_file = config.persistence.layout_file.clone().ok_or_else(|| {
            VfsError::ConfigError("persistence.layout_file is not set".to_string())
        })?;

        let options = config.tree.options();
        let tree: SharedTree = Arc::new(RwLock::new(NodeTree::new(options)));
        let persistence = LayoutFilePersistence::new(
            layout_file,
            tree.clone(),
            options,
            config.persistence.clone(),
        );
        persistence.load()?;

        let stub = FileSystemStub::with_listener(tree, persistence.clone());
        info!(layout = %persistence.path().display(), "Opened live filesystem");
        Ok(Self {
            vfs: VirtualFileSystem::from_stub(stub),
            persistence,
        })
    }

    /// Open `layout_file` with default settings
    pub fn open_path(layout_file: impl AsRef<Path>) -> Result<Self> {
        Self::open(&VfsConfig::for_layout(layout_file.as_ref()))
    }

    pub fn vfs(&self) -> &VirtualFileSystem {
        &self.vfs
    }

    pub fn persistence(&self) -> &Arc<LayoutFilePersistence> {
        &self.persistence
    }

    pub fn directory(&self) -> &DirectoryStub {
        self.vfs.directory()
    }

    pub fn file(&self) -> &FileStub {
        self.vfs.file()
    }

    pub fn drive(&self) -> &DriveStub {
        self.vfs.drive()
    }

    /// Reload from the document now.
    pub fn reload(&self) -> Result<()> {
        self.persistence.load()
    }

    /// Save the tree now.
    pub fn save(&self) -> Result<()> {
        self.persistence.save()
    }
}

impl std::fmt::Debug for LiveVirtualFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveVirtualFileSystem")
            .field("vfs", &self.vfs)
            .field("persistence", &self.persistence)
            .finish()
    }
}
