//! Arena storage for tree nodes addressed by stable handles.

use super::node::{Node, NodeKind};
use crate::types::{NameComparer, NodeId};
use std::ops::{Index, IndexMut};

/// Slot arena holding every node of a tree
///
/// Freed slots are recycled. Handles are only valid while the node they name
/// is attached; using a stale handle panics, since it means the caller kept a
/// handle across a delete.
#[derive(Debug)]
pub struct NodeArena {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    separator: char,
}

impl NodeArena {
    pub fn new(separator: char) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            separator,
        }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Insert `node` and attach it under `parent`.
    pub(crate) fn insert_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.insert(node);
        self.attach(parent, id);
        id
    }

    /// Add `child` to the matching collection of `parent`.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        let is_file = self[child].is_file();
        if let Some(children) = self[parent].children_mut() {
            if is_file {
                children.files.push(child);
            } else {
                children.directories.push(child);
            }
        }
        self[child].parent = Some(parent);
        self.invalidate(child);
    }

    /// Remove `child` from its parent's collection, keeping its subtree alive.
    pub(crate) fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self[child].parent.take() {
            if let Some(children) = self[parent].children_mut() {
                children.directories.retain(|&id| id != child);
                children.files.retain(|&id| id != child);
            }
        }
        self.invalidate(child);
    }

    /// Detach `id` and free every slot of its subtree.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) -> usize {
        self.detach(id);
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.slots.get_mut(current.0).and_then(Option::take) {
                if let Some(children) = node.children() {
                    stack.extend(children.directories.iter().copied());
                    stack.extend(children.files.iter().copied());
                }
                self.free.push(current.0);
                removed += 1;
            }
        }
        removed
    }

    pub(crate) fn rename(&mut self, id: NodeId, name: impl Into<String>) {
        self[id].name = name.into();
        self.invalidate(id);
    }

    /// Drop the cached full path of `id` and all descendants.
    pub(crate) fn invalidate(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &mut self[current];
            node.invalidate_path();
            if let Some(children) = node.children() {
                stack.extend(children.directories.iter().copied());
                stack.extend(children.files.iter().copied());
            }
        }
    }

    /// Full path of `id`, computed once and cached until invalidated.
    pub fn full_path(&self, id: NodeId) -> String {
        let node = &self[id];
        if let Some(cached) = node.full_path.get() {
            return cached.clone();
        }
        let computed = match node.parent {
            None => node.name.clone(),
            Some(parent) => {
                let parent_path = self.full_path(parent);
                if parent_path.len() == self.separator.len_utf8()
                    && parent_path.starts_with(self.separator)
                {
                    format!("{}{}", parent_path, node.name)
                } else {
                    format!("{}{}{}", parent_path, self.separator, node.name)
                }
            }
        };
        let _ = node.full_path.set(computed.clone());
        computed
    }

    /// Owning volume of `id`.
    pub fn volume_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self[current].parent {
            current = parent;
        }
        current
    }

    /// Comparer fixed by the owning volume of `id`.
    pub fn comparer_of(&self, id: NodeId) -> NameComparer {
        match &self[self.volume_of(id)].kind {
            NodeKind::Volume(volume) => volume.comparer,
            _ => NameComparer::Ordinal,
        }
    }

    pub fn find_directory(&self, container: NodeId, name: &str) -> Option<NodeId> {
        let comparer = self.comparer_of(container);
        let children = self[container].children()?;
        children
            .directories
            .iter()
            .copied()
            .find(|&id| comparer.equals(&self[id].name, name))
    }

    pub fn find_file(&self, container: NodeId, name: &str) -> Option<NodeId> {
        let comparer = self.comparer_of(container);
        let children = self[container].children()?;
        children
            .files
            .iter()
            .copied()
            .find(|&id| comparer.equals(&self[id].name, name))
    }

    /// Directory first, then file: a terminal name's kind is not known up front.
    pub fn find_child(&self, container: NodeId, name: &str) -> Option<NodeId> {
        self.find_directory(container, name)
            .or_else(|| self.find_file(container, name))
    }

    /// All descendants of `id` in depth-first order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(children) = self[current].children() {
                for &child in children.files.iter().rev() {
                    out.push(child);
                }
                for &child in children.directories.iter().rev() {
                    out.push(child);
                    stack.push(child);
                }
            }
        }
        out
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.slots.get(id.0).and_then(Option::as_ref) {
            Some(node) => node,
            None => panic!("stale node handle {:?}", id),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.slots.get_mut(id.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("stale node handle {:?}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::VolumeInfo;

    fn windows_arena() -> (NodeArena, NodeId) {
        let mut arena = NodeArena::new('\\');
        let volume = arena.insert(Node::volume(
            "C:",
            VolumeInfo::fixed("C:"),
            NameComparer::OrdinalIgnoreCase,
            false,
        ));
        (arena, volume)
    }

    #[test]
    fn test_full_path_is_cached_and_invalidated_on_rename() {
        let (mut arena, volume) = windows_arena();
        let a = arena.insert_child(volume, Node::directory("a"));
        let b = arena.insert_child(a, Node::directory("b"));
        let file = arena.insert_child(b, Node::file("c.txt", Vec::new()));

        assert_eq!(arena.full_path(file), r"C:\a\b\c.txt");
        arena.rename(a, "z");
        assert_eq!(arena.full_path(b), r"C:\z\b");
        assert_eq!(arena.full_path(file), r"C:\z\b\c.txt");
    }

    #[test]
    fn test_reparent_rewrites_descendant_paths() {
        let (mut arena, volume) = windows_arena();
        let a = arena.insert_child(volume, Node::directory("a"));
        let b = arena.insert_child(volume, Node::directory("b"));
        let leaf = arena.insert_child(a, Node::file("leaf", Vec::new()));
        assert_eq!(arena.full_path(leaf), r"C:\a\leaf");

        arena.detach(a);
        arena.attach(b, a);
        assert_eq!(arena.full_path(leaf), r"C:\b\a\leaf");
        assert_eq!(arena.find_directory(volume, "a"), None);
    }

    #[test]
    fn test_remove_subtree_frees_slots() {
        let (mut arena, volume) = windows_arena();
        let a = arena.insert_child(volume, Node::directory("a"));
        arena.insert_child(a, Node::file("x", Vec::new()));
        arena.insert_child(a, Node::directory("y"));
        assert_eq!(arena.len(), 4);

        assert_eq!(arena.remove_subtree(a), 3);
        assert_eq!(arena.len(), 1);
        assert!(arena.get(a).is_none());
        assert!(arena[volume].children().map(|c| c.is_empty()).unwrap_or(false));
    }

    #[test]
    fn test_find_child_prefers_directory() {
        let (mut arena, volume) = windows_arena();
        let file = arena.insert_child(volume, Node::file("dup", Vec::new()));
        assert_eq!(arena.find_child(volume, "DUP"), Some(file));
        let dir = arena.insert_child(volume, Node::directory("dup"));
        assert_eq!(arena.find_child(volume, "dup"), Some(dir));
    }

    #[test]
    fn test_posix_root_paths_do_not_double_separator() {
        let mut arena = NodeArena::new('/');
        let root = arena.insert(Node::volume(
            "/",
            VolumeInfo::posix_root(true),
            NameComparer::Ordinal,
            true,
        ));
        let mnt = arena.insert_child(root, Node::directory("mnt"));
        assert_eq!(arena.full_path(root), "/");
        assert_eq!(arena.full_path(mnt), "/mnt");
    }
}
