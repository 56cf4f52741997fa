//! Directory operations.

use super::contract::{Directory, SearchOption};
use super::{existing_directory, move_node, pattern, StubCore};
use crate::error::{Result, VfsError};
use crate::tree::NodeTimes;
use crate::types::Timestamp;
use tracing::debug;

#[derive(Clone)]
pub struct DirectoryStub {
    core: StubCore,
}

impl DirectoryStub {
    pub(crate) fn new(core: StubCore) -> Self {
        Self { core }
    }

    fn remove(&self, path: &str, recursive: bool) -> Result<()> {
        self.core.mutate(|tree| {
            let id = existing_directory(tree, path)?;
            let node = tree.node(id);
            if node.is_volume() {
                return Err(VfsError::InvalidOperation(format!(
                    "Cannot delete the volume root '{}'.",
                    path
                )));
            }
            let has_children = node.children().map(|c| !c.is_empty()).unwrap_or(false);
            if has_children && !recursive {
                return Err(VfsError::InvalidOperation(format!(
                    "The directory is not empty: '{}'.",
                    path
                )));
            }
            let removed = tree.arena.remove_subtree(id);
            debug!(path, removed, "Deleted directory");
            Ok(())
        })
    }
}

impl Directory for DirectoryStub {
    fn create_directory(&self, path: &str) -> Result<()> {
        self.core.mutate(|tree| {
            let segments = tree.resolve(path)?;
            let id = tree.get_or_create_segments(&segments, false, NodeTimes::default())?;
            if tree.node(id).is_file() {
                return Err(VfsError::AlreadyExists(format!(
                    "Cannot create '{}' because a file with the same name already exists.",
                    path
                )));
            }
            Ok(())
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.core
            .read(|tree| existing_directory(tree, path))
            .is_ok()
    }

    fn delete(&self, path: &str) -> Result<()> {
        self.remove(path, false)
    }

    fn delete_recursive(&self, path: &str, recursive: bool) -> Result<()> {
        self.remove(path, recursive)
    }

    fn move_to(&self, src: &str, dest: &str) -> Result<()> {
        self.core.mutate(|tree| move_node(tree, src, dest, false))
    }

    fn get_directories(&self, path: &str) -> Result<Vec<String>> {
        self.core.read(|tree| {
            let id = existing_directory(tree, path)?;
            let mut paths: Vec<String> = tree
                .node(id)
                .children()
                .map(|c| c.directories().to_vec())
                .unwrap_or_default()
                .into_iter()
                .map(|child| tree.full_path(child))
                .collect();
            paths.sort();
            Ok(paths)
        })
    }

    fn get_files_matching(
        &self,
        path: &str,
        pattern: &str,
        option: SearchOption,
    ) -> Result<Vec<String>> {
        self.core.read(|tree| {
            let id = existing_directory(tree, path)?;
            let comparer = tree.arena().comparer_of(id);
            let candidates = match option {
                SearchOption::TopDirectoryOnly => tree
                    .node(id)
                    .children()
                    .map(|c| c.files().to_vec())
                    .unwrap_or_default(),
                SearchOption::AllDirectories => tree
                    .arena()
                    .descendants(id)
                    .into_iter()
                    .filter(|&child| tree.node(child).is_file())
                    .collect(),
            };
            let mut paths: Vec<String> = candidates
                .into_iter()
                .filter(|&child| pattern::matches(tree.node(child).name(), pattern, comparer))
                .map(|child| tree.full_path(child))
                .collect();
            paths.sort();
            Ok(paths)
        })
    }

    fn get_creation_time_utc(&self, path: &str) -> Result<Timestamp> {
        self.core
            .read(|tree| Ok(tree.node(existing_directory(tree, path)?).creation_time_utc()))
    }

    fn set_creation_time_utc(&self, path: &str, time: Timestamp) -> Result<()> {
        self.core.mutate(|tree| {
            let id = existing_directory(tree, path)?;
            tree.arena[id].set_creation_time_utc(time);
            Ok(())
        })
    }

    fn get_last_write_time_utc(&self, path: &str) -> Result<Timestamp> {
        self.core
            .read(|tree| Ok(tree.node(existing_directory(tree, path)?).last_write_time_utc()))
    }

    fn set_last_write_time_utc(&self, path: &str, time: Timestamp) -> Result<()> {
        self.core.mutate(|tree| {
            let id = existing_directory(tree, path)?;
            tree.arena[id].set_last_write_time_utc(time);
            Ok(())
        })
    }
}
