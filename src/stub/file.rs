//! File operations.

use super::contract::{File, FileMode};
use super::stream::FileNodeStream;
use super::{existing_file, move_node, parent_container, resolve_destination, StubCore};
use crate::error::{Result, VfsError};
use crate::tree::{Node, NodeTimes, NodeTree};
use crate::types::{NodeId, Timestamp};
use tracing::debug;

#[derive(Clone)]
pub struct FileStub {
    core: StubCore,
}

impl FileStub {
    pub(crate) fn new(core: StubCore) -> Self {
        Self { core }
    }

    /// Create-or-open the file at `path` and apply `edit` to its contents
    fn edit(&self, path: &str, edit: impl FnOnce(&mut Vec<u8>)) -> Result<()> {
        self.core.mutate(|tree| {
            let segments = tree.resolve(path)?;
            let parent = parent_container(tree, &segments, path)?;
            let id = file_or_create(tree, parent, &segments[segments.len() - 1], path)?;

            let node = &mut tree.arena[id];
            if let Some(contents) = node.contents_mut() {
                edit(contents);
            }
            node.touch();
            if !tree.node(parent).is_volume() {
                tree.arena[parent].touch();
            }
            Ok(())
        })
    }
}

/// Existing file `name` under `parent`, or a new empty one
fn file_or_create(tree: &mut NodeTree, parent: NodeId, name: &str, path: &str) -> Result<NodeId> {
    if let Some(id) = tree.arena().find_file(parent, name) {
        return Ok(id);
    }
    if tree.arena().find_directory(parent, name).is_some() {
        return Err(VfsError::WrongNodeKind(format!(
            "Access to the path '{}' is denied; it is a directory.",
            path
        )));
    }
    let id = tree.arena.insert_child(parent, Node::file(name, Vec::new()));
    debug!(path, "Created file");
    Ok(id)
}

impl File for FileStub {
    fn read_all_bytes(&self, path: &str) -> Result<Vec<u8>> {
        self.core.read(|tree| match existing_file(tree, path) {
            Ok((_, id)) => Ok(tree.node(id).contents().unwrap_or_default().to_vec()),
            // Reads report a directory target as a missing file.
            Err(VfsError::WrongNodeKind(_)) => Err(VfsError::could_not_find_file(path)),
            Err(err) => Err(err),
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.core.read(|tree| existing_file(tree, path)).is_ok()
    }

    fn write_all_bytes(&self, path: &str, contents: &[u8]) -> Result<()> {
        self.edit(path, |existing| {
            existing.clear();
            existing.extend_from_slice(contents);
        })
    }

    fn append_all_text(&self, path: &str, contents: &str) -> Result<()> {
        self.edit(path, |existing| existing.extend_from_slice(contents.as_bytes()))
    }

    fn delete(&self, path: &str) -> Result<()> {
        self.core.mutate_if(|tree| match existing_file(tree, path) {
            Ok((_, id)) => {
                tree.arena.remove_subtree(id);
                debug!(path, "Deleted file");
                Ok(((), true))
            }
            Err(VfsError::NotFound(_)) => {
                let segments = tree.resolve(path)?;
                parent_container(tree, &segments, path)?;
                Ok(((), false))
            }
            Err(err) => Err(err),
        })
    }

    fn move_to(&self, src: &str, dest: &str) -> Result<()> {
        self.core.mutate(|tree| move_node(tree, src, dest, true))
    }

    fn copy(&self, src: &str, dest: &str, overwrite: bool) -> Result<()> {
        self.core.mutate(|tree| {
            let (src_segments, src_id) = existing_file(tree, src)?;
            let dest_segments = resolve_destination(tree, &src_segments, dest)?;
            let parent = parent_container(tree, &dest_segments, dest)?;
            let name = &dest_segments[dest_segments.len() - 1];

            let source = tree.node(src_id);
            let contents = source.contents().unwrap_or_default().to_vec();
            let last_write = source.last_write_time_utc();

            match tree.arena().find_file(parent, name) {
                Some(existing) if existing == src_id => {
                    return Err(VfsError::InvalidOperation(format!(
                        "Cannot copy '{}' onto itself.",
                        src
                    )));
                }
                Some(_) if !overwrite => {
                    return Err(VfsError::AlreadyExists(format!(
                        "The file '{}' already exists.",
                        dest
                    )));
                }
                Some(existing) => {
                    let node = &mut tree.arena[existing];
                    if let Some(target) = node.contents_mut() {
                        *target = contents;
                    }
                    node.set_last_write_time_utc(last_write);
                }
                None => {
                    if tree.arena().find_directory(parent, name).is_some() {
                        return Err(VfsError::WrongNodeKind(format!(
                            "Access to the path '{}' is denied; it is a directory.",
                            dest
                        )));
                    }
                    let node = Node::file(name.as_str(), contents)
                        .with_times(NodeTimes::new(None, Some(last_write)));
                    tree.arena.insert_child(parent, node);
                }
            }
            debug!(from = src, to = dest, "Copied file");
            Ok(())
        })
    }

    fn open(&self, path: &str, mode: FileMode) -> Result<FileNodeStream> {
        let (segments, contents) = self.core.mutate_if(|tree| {
            let segments = tree.resolve(path)?;
            let parent = parent_container(tree, &segments, path)?;
            let name = &segments[segments.len() - 1];

            if let Some(id) = tree.arena().find_file(parent, name) {
                if mode == FileMode::CreateNew {
                    return Err(VfsError::AlreadyExists(format!(
                        "The file '{}' already exists.",
                        path
                    )));
                }
                let contents = tree.node(id).contents().unwrap_or_default().to_vec();
                return Ok(((segments, contents), false));
            }

            if mode == FileMode::Append && tree.arena().find_directory(parent, name).is_none() {
                return Err(VfsError::could_not_find_file(path));
            }
            file_or_create(tree, parent, name, path)?;
            Ok(((segments, Vec::new()), true))
        })?;
        Ok(FileNodeStream::new(
            self.core.clone(),
            path,
            segments,
            contents,
            mode,
        ))
    }

    fn get_creation_time_utc(&self, path: &str) -> Result<Timestamp> {
        self.core
            .read(|tree| Ok(tree.node(existing_file(tree, path)?.1).creation_time_utc()))
    }

    fn set_creation_time_utc(&self, path: &str, time: Timestamp) -> Result<()> {
        self.core.mutate(|tree| {
            let (_, id) = existing_file(tree, path)?;
            tree.arena[id].set_creation_time_utc(time);
            Ok(())
        })
    }

    fn get_last_write_time_utc(&self, path: &str) -> Result<Timestamp> {
        self.core
            .read(|tree| Ok(tree.node(existing_file(tree, path)?.1).last_write_time_utc()))
    }

    fn set_last_write_time_utc(&self, path: &str, time: Timestamp) -> Result<()> {
        self.core.mutate(|tree| {
            let (_, id) = existing_file(tree, path)?;
            tree.arena[id].set_last_write_time_utc(time);
            Ok(())
        })
    }
}
