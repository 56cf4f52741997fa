//! Layout document records and their conversion to and from a tree.

use crate::error::Result;
use crate::tree::{Node, NodeTimes, NodeTree, TreeOptions};
use crate::types::{NodeId, Platform, Timestamp};
use crate::volume::VolumeInfo;
use serde::{Deserialize, Serialize};

/// Root of the layout document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub volumes: Vec<VolumeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_info: Option<VolumeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time_utc: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_write_time_utc: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directories: Vec<DirectoryRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time_utc: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_write_time_utc: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directories: Vec<DirectoryRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time_utc: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_write_time_utc: Option<Timestamp>,
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<u8>,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => BASE64.decode(text.as_bytes()).map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

impl LayoutDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }

    /// Snapshot every volume of `tree`
    pub fn from_tree(tree: &NodeTree) -> Self {
        let volumes = tree
            .volumes()
            .iter()
            .map(|&id| {
                let node = tree.node(id);
                let (directories, files) = child_records(tree, id);
                VolumeRecord {
                    name: node.name().to_string(),
                    volume_info: tree.volume_info(id).cloned(),
                    creation_time_utc: Some(node.creation_time_utc()),
                    last_write_time_utc: Some(node.last_write_time_utc()),
                    directories,
                    files,
                }
            })
            .collect();
        Self {
            platform: Some(tree.platform()),
            volumes,
        }
    }

    /// Build a fresh tree from the records
    ///
    /// The document's platform wins over `defaults.platform`; the case
    /// override in `defaults` applies to volumes without persisted metadata.
    pub fn into_tree(self, defaults: TreeOptions) -> Result<NodeTree> {
        let options = TreeOptions {
            platform: self.platform.unwrap_or(defaults.platform),
            case_sensitive: defaults.case_sensitive,
        };
        let mut tree = NodeTree::new(options);

        for volume in self.volumes {
            let name = volume.name.trim();
            if name.is_empty() {
                continue;
            }
            let id = tree.get_or_create_volume(name, volume.volume_info.clone());
            if let Some(info) = volume.volume_info {
                tree.set_volume_info(id, info);
            }
            apply_times(
                &mut tree,
                id,
                NodeTimes::new(volume.creation_time_utc, volume.last_write_time_utc),
            );
            materialize(&mut tree, id, volume.directories, volume.files);
        }
        Ok(tree)
    }

    /// Number of file records across every volume
    pub fn file_count(&self) -> usize {
        fn count(directories: &[DirectoryRecord], files: &[FileRecord]) -> usize {
            files.len()
                + directories
                    .iter()
                    .map(|d| count(&d.directories, &d.files))
                    .sum::<usize>()
        }
        self.volumes
            .iter()
            .map(|v| count(&v.directories, &v.files))
            .sum()
    }
}

fn child_records(tree: &NodeTree, id: NodeId) -> (Vec<DirectoryRecord>, Vec<FileRecord>) {
    let Some(children) = tree.node(id).children() else {
        return (Vec::new(), Vec::new());
    };
    let directories = children
        .directories()
        .iter()
        .map(|&child| {
            let node = tree.node(child);
            let (directories, files) = child_records(tree, child);
            DirectoryRecord {
                name: node.name().to_string(),
                creation_time_utc: Some(node.creation_time_utc()),
                last_write_time_utc: Some(node.last_write_time_utc()),
                directories,
                files,
            }
        })
        .collect();
    let files = children
        .files()
        .iter()
        .map(|&child| {
            let node = tree.node(child);
            FileRecord {
                name: node.name().to_string(),
                creation_time_utc: Some(node.creation_time_utc()),
                last_write_time_utc: Some(node.last_write_time_utc()),
                contents: node.contents().unwrap_or_default().to_vec(),
            }
        })
        .collect();
    (directories, files)
}

fn record_name(name: &str) -> Option<&str> {
    let name = name.trim_matches(&['\\', '/'][..]);
    (!name.is_empty()).then_some(name)
}

fn apply_times(tree: &mut NodeTree, id: NodeId, times: NodeTimes) {
    let node = &mut tree.arena[id];
    if let Some(creation) = times.creation {
        node.set_creation_time_utc(creation);
    }
    if let Some(last_write) = times.last_write {
        node.set_last_write_time_utc(last_write);
    }
}

/// Depth-first creation of directory and file records under `parent`
///
/// Records that repeat an existing name merge into the existing node.
fn materialize(
    tree: &mut NodeTree,
    parent: NodeId,
    directories: Vec<DirectoryRecord>,
    files: Vec<FileRecord>,
) {
    for directory in directories {
        let Some(name) = record_name(&directory.name) else {
            continue;
        };
        let times = NodeTimes::new(directory.creation_time_utc, directory.last_write_time_utc);
        let id = match tree.arena.find_directory(parent, name) {
            Some(existing) => {
                apply_times(tree, existing, times);
                existing
            }
            None => tree
                .arena
                .insert_child(parent, Node::directory(name).with_times(times)),
        };
        materialize(tree, id, directory.directories, directory.files);
    }

    for file in files {
        let Some(name) = record_name(&file.name) else {
            continue;
        };
        if tree.arena.find_file(parent, name).is_some() {
            continue;
        }
        let times = NodeTimes::new(file.creation_time_utc, file.last_write_time_utc);
        let node = Node::file(name, file.contents).with_times(times);
        tree.arena.insert_child(parent, node);
    }
}
