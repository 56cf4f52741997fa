//! Filesystem node types

use crate::types::{LocalTimestamp, NameComparer, NodeId, Timestamp};
use crate::volume::VolumeInfo;
use chrono::{Local, Utc};
use std::sync::OnceLock;

/// Child collections of a container, each keyed by name under the volume comparer
#[derive(Debug, Clone, Default)]
pub struct Children {
    pub(crate) directories: Vec<NodeId>,
    pub(crate) files: Vec<NodeId>,
}

impl Children {
    pub fn directories(&self) -> &[NodeId] {
        &self.directories
    }

    pub fn files(&self) -> &[NodeId] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }
}

/// Volume node payload
#[derive(Debug, Clone)]
pub struct VolumeNode {
    pub(crate) info: VolumeInfo,
    pub(crate) comparer: NameComparer,
    pub(crate) is_posix_root: bool,
    pub(crate) children: Children,
}

impl VolumeNode {
    pub fn info(&self) -> &VolumeInfo {
        &self.info
    }

    pub fn comparer(&self) -> NameComparer {
        self.comparer
    }

    pub fn is_posix_root(&self) -> bool {
        self.is_posix_root
    }
}

/// Optional timestamps applied to nodes created by a builder or loader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeTimes {
    pub creation: Option<Timestamp>,
    pub last_write: Option<Timestamp>,
}

impl NodeTimes {
    pub fn new(creation: Option<Timestamp>, last_write: Option<Timestamp>) -> Self {
        Self {
            creation,
            last_write,
        }
    }
}

/// Node kind: volumes and directories are containers, files are terminal
#[derive(Debug, Clone)]
pub enum NodeKind {
    Volume(VolumeNode),
    Directory(Children),
    File(Vec<u8>),
}

/// A node in the tree arena
///
/// The parent handle is a non-owning back-link; containers own their children
/// through their child collections.
#[derive(Debug)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) creation_time_utc: Timestamp,
    pub(crate) last_write_time_utc: Timestamp,
    pub(crate) parent: Option<NodeId>,
    pub(crate) full_path: OnceLock<String>,
    pub(crate) kind: NodeKind,
}

impl Node {
    fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            creation_time_utc: now,
            last_write_time_utc: now,
            parent: None,
            full_path: OnceLock::new(),
            kind,
        }
    }

    pub fn volume(
        name: impl Into<String>,
        info: VolumeInfo,
        comparer: NameComparer,
        is_posix_root: bool,
    ) -> Self {
        Self::new(
            name,
            NodeKind::Volume(VolumeNode {
                info,
                comparer,
                is_posix_root,
                children: Children::default(),
            }),
        )
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Directory(Children::default()))
    }

    pub fn file(name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self::new(name, NodeKind::File(contents))
    }

    pub fn with_times(mut self, times: NodeTimes) -> Self {
        if let Some(creation) = times.creation {
            self.creation_time_utc = creation;
        }
        if let Some(last_write) = times.last_write {
            self.last_write_time_utc = last_write;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn creation_time_utc(&self) -> Timestamp {
        self.creation_time_utc
    }

    pub fn creation_time(&self) -> LocalTimestamp {
        self.creation_time_utc.with_timezone(&Local)
    }

    pub fn last_write_time_utc(&self) -> Timestamp {
        self.last_write_time_utc
    }

    pub fn last_write_time(&self) -> LocalTimestamp {
        self.last_write_time_utc.with_timezone(&Local)
    }

    pub fn set_creation_time_utc(&mut self, time: Timestamp) {
        self.creation_time_utc = time;
    }

    pub fn set_last_write_time_utc(&mut self, time: Timestamp) {
        self.last_write_time_utc = time;
    }

    pub fn touch(&mut self) {
        self.last_write_time_utc = Utc::now();
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File(_))
    }

    /// True for directories only, not volumes
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    pub fn is_volume(&self) -> bool {
        matches!(self.kind, NodeKind::Volume(_))
    }

    pub fn is_container(&self) -> bool {
        self.children().is_some()
    }

    pub fn children(&self) -> Option<&Children> {
        match &self.kind {
            NodeKind::Volume(volume) => Some(&volume.children),
            NodeKind::Directory(children) => Some(children),
            NodeKind::File(_) => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Children> {
        match &mut self.kind {
            NodeKind::Volume(volume) => Some(&mut volume.children),
            NodeKind::Directory(children) => Some(children),
            NodeKind::File(_) => None,
        }
    }

    pub fn contents(&self) -> Option<&[u8]> {
        match &self.kind {
            NodeKind::File(contents) => Some(contents),
            _ => None,
        }
    }

    pub(crate) fn contents_mut(&mut self) -> Option<&mut Vec<u8>> {
        match &mut self.kind {
            NodeKind::File(contents) => Some(contents),
            _ => None,
        }
    }

    pub fn as_volume(&self) -> Option<&VolumeNode> {
        match &self.kind {
            NodeKind::Volume(volume) => Some(volume),
            _ => None,
        }
    }

    pub(crate) fn invalidate_path(&mut self) {
        self.full_path.take();
    }
}
