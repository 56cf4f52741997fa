//! Virtual Tree
//!
//! In-memory hierarchy of volumes, directories and files. Nodes live in an
//! arena and are addressed by `NodeId`; the navigator is the single point of
//! path-based lookup and creation.

pub mod arena;
pub mod navigator;
pub mod node;
pub mod path;

pub use arena::NodeArena;
pub use node::{Children, Node, NodeKind, NodeTimes, VolumeNode};

use crate::types::{NameComparer, NodeId, Platform};
use crate::volume::VolumeInfo;
use serde::{Deserialize, Serialize};

/// Platform conventions a tree is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeOptions {
    pub platform: Platform,
    /// Overrides the platform's default comparer for volumes created without metadata
    pub case_sensitive: Option<bool>,
}

impl TreeOptions {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            case_sensitive: None,
        }
    }

    pub fn with_case_sensitivity(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }

    pub fn separator(&self) -> char {
        self.platform.directory_separator()
    }

    /// Comparer for the POSIX root and for volumes created without metadata
    pub fn default_comparer(&self) -> NameComparer {
        match self.case_sensitive {
            Some(case_sensitive) => NameComparer::for_case_sensitivity(case_sensitive),
            None => self.platform.default_comparer(),
        }
    }
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

/// The node tree: arena plus the ordered volume collection
#[derive(Debug)]
pub struct NodeTree {
    pub(crate) arena: NodeArena,
    pub(crate) volumes: Vec<NodeId>,
    options: TreeOptions,
}

impl NodeTree {
    /// Create an empty tree; non-Windows trees start with the POSIX root
    pub fn new(options: TreeOptions) -> Self {
        let mut tree = Self {
            arena: NodeArena::new(options.separator()),
            volumes: Vec::new(),
            options,
        };
        tree.ensure_posix_root();
        tree
    }

    fn ensure_posix_root(&mut self) {
        if !self.options.platform.is_windows() {
            let root = self.separator().to_string();
            self.get_or_create_volume(&root, None);
        }
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn platform(&self) -> Platform {
        self.options.platform
    }

    pub fn separator(&self) -> char {
        self.arena.separator()
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Volumes in creation order
    pub fn volumes(&self) -> &[NodeId] {
        &self.volumes
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id]
    }

    pub fn full_path(&self, id: NodeId) -> String {
        self.arena.full_path(id)
    }

    pub fn volume_info(&self, id: NodeId) -> Option<&VolumeInfo> {
        self.arena[id].as_volume().map(|volume| volume.info())
    }

    /// Replace a volume's metadata and with it the volume's comparer
    ///
    /// An empty root path name defaults to the volume name.
    pub(crate) fn set_volume_info(&mut self, id: NodeId, mut info: VolumeInfo) {
        let node = &mut self.arena[id];
        if info.root_path_name.is_empty() {
            info.root_path_name = node.name().to_string();
        }
        if let NodeKind::Volume(volume) = &mut node.kind {
            volume.comparer = NameComparer::for_case_sensitivity(info.is_case_sensitive);
            volume.info = info;
        }
    }

    /// Every file node across all volumes, depth-first per volume
    pub fn files(&self) -> Vec<NodeId> {
        self.volumes
            .iter()
            .flat_map(|&volume| self.arena.descendants(volume))
            .filter(|&id| self.arena[id].is_file())
            .collect()
    }

    /// Drop every volume, keeping the platform conventions
    pub fn clear(&mut self) {
        self.arena = NodeArena::new(self.options.separator());
        self.volumes.clear();
        self.ensure_posix_root();
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new(TreeOptions::default())
    }
}
