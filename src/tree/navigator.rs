//! Path-based lookup and creation over the node tree.
//!
//! Every path is resolved to segments first, then walked from the volume named
//! by segment 0. Intermediate segments only match directories; the terminal
//! segment matches a directory first and then a file. All comparisons use the
//! owning volume's comparer.

use super::node::{Node, NodeTimes};
use super::{path, NodeTree};
use crate::error::{Result, VfsError};
use crate::types::{NameComparer, NodeId};
use crate::volume::VolumeInfo;
use tracing::debug;

impl NodeTree {
    /// Qualify and split `path` under this tree's separator
    pub fn resolve(&self, path: &str) -> Result<Vec<String>> {
        path::resolve(path, self.separator())
    }

    /// Pure lookup; `None` when the path is invalid or any segment is missing
    pub fn get(&self, path: &str) -> Option<NodeId> {
        let segments = self.resolve(path).ok()?;
        self.get_segments(&segments)
    }

    pub fn get_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<NodeId> {
        let (root, rest) = segments.split_first()?;
        let mut current = self.find_volume(root.as_ref())?;
        let Some((terminal, intermediates)) = rest.split_last() else {
            return Some(current);
        };
        for segment in intermediates {
            current = self.arena.find_directory(current, segment.as_ref())?;
        }
        self.arena.find_child(current, terminal.as_ref())
    }

    /// Container holding the terminal segment, if it exists
    pub fn get_parent_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<NodeId> {
        if segments.len() <= 1 {
            return None;
        }
        let parent = self.get_segments(&segments[..segments.len() - 1])?;
        self.arena[parent].is_container().then_some(parent)
    }

    /// Resolve `path`, creating missing intermediates and the terminal node
    ///
    /// An existing terminal node is returned whatever its kind.
    pub fn get_or_create(&mut self, path: &str, is_file_context: bool) -> Result<NodeId> {
        let segments = self.resolve(path)?;
        self.get_or_create_segments(&segments, is_file_context, NodeTimes::default())
    }

    /// Like [`get_or_create`](Self::get_or_create) over resolved segments.
    /// `times` applies to every node created along the way.
    pub fn get_or_create_segments<S: AsRef<str>>(
        &mut self,
        segments: &[S],
        is_file_context: bool,
        times: NodeTimes,
    ) -> Result<NodeId> {
        let Some((root, rest)) = segments.split_first() else {
            return Err(VfsError::InvalidOperation("The path is empty.".to_string()));
        };
        let mut current = self.get_or_create_volume(root.as_ref(), None);
        let Some((terminal, intermediates)) = rest.split_last() else {
            return Ok(current);
        };

        for segment in intermediates {
            let segment = segment.as_ref();
            current = match self.arena.find_directory(current, segment) {
                Some(existing) => existing,
                None => self.create_child(current, Node::directory(segment).with_times(times)),
            };
        }

        let terminal = terminal.as_ref();
        if let Some(existing) = self.arena.find_child(current, terminal) {
            return Ok(existing);
        }
        let node = if is_file_context {
            Node::file(terminal, Vec::new())
        } else {
            Node::directory(terminal)
        };
        Ok(self.create_child(current, node.with_times(times)))
    }

    fn create_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.arena.insert_child(parent, node);
        debug!(
            path = %self.arena.full_path(id),
            file = self.arena[id].is_file(),
            "Created node"
        );
        id
    }

    /// Volume whose root name matches `root_token` under its own comparer
    pub fn find_volume(&self, root_token: &str) -> Option<NodeId> {
        self.volumes.iter().copied().find(|&id| {
            let node = &self.arena[id];
            let comparer = node
                .as_volume()
                .map(|volume| volume.comparer())
                .unwrap_or(NameComparer::Ordinal);
            comparer.equals(node.name(), root_token)
        })
    }

    /// Resolve or create the volume for `root_token`
    ///
    /// Without `info`, drive and UNC volumes get fixed NTFS metadata and the
    /// POSIX root takes its case sensitivity from the tree options. An empty
    /// root path name in `info` defaults to the token.
    pub fn get_or_create_volume(&mut self, root_token: &str, info: Option<VolumeInfo>) -> NodeId {
        if let Some(existing) = self.find_volume(root_token) {
            return existing;
        }

        let is_posix_root = !self.platform().is_windows()
            && root_token.len() == self.separator().len_utf8()
            && root_token.starts_with(self.separator());
        let default_case_sensitive = self.options().default_comparer().is_case_sensitive();

        let mut info = info.unwrap_or_else(|| {
            if is_posix_root {
                VolumeInfo::posix_root(default_case_sensitive)
            } else {
                let mut fixed = VolumeInfo::fixed(root_token);
                fixed.is_case_sensitive = self.options().case_sensitive.unwrap_or(false);
                fixed
            }
        });
        if info.root_path_name.is_empty() {
            info.root_path_name = root_token.to_string();
        }

        let comparer = NameComparer::for_case_sensitivity(info.is_case_sensitive);
        let id = self
            .arena
            .insert(Node::volume(root_token, info, comparer, is_posix_root));
        self.volumes.push(id);
        debug!(volume = root_token, ?comparer, "Created volume");
        id
    }
}
