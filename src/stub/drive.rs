//! Drive enumeration and volume metadata.

use super::contract::Drive;
use super::StubCore;
use crate::error::{Result, VfsError};
use crate::volume::VolumeInfo;

#[derive(Clone)]
pub struct DriveStub {
    core: StubCore,
}

impl DriveStub {
    pub(crate) fn new(core: StubCore) -> Self {
        Self { core }
    }
}

impl Drive for DriveStub {
    fn get_drives(&self) -> Vec<String> {
        self.core
            .read(|tree| {
                Ok(tree
                    .volumes()
                    .iter()
                    .map(|&id| tree.node(id).name().to_string())
                    .collect())
            })
            .unwrap_or_default()
    }

    /// Accepts a bare root token (`C:`) or any path on the volume (`C:\`).
    fn get_volume_info(&self, drive: &str) -> Result<VolumeInfo> {
        self.core.read(|tree| {
            let token = tree
                .resolve(drive)
                .ok()
                .and_then(|segments| segments.into_iter().next())
                .unwrap_or_else(|| drive.to_string());
            tree.find_volume(&token)
                .and_then(|id| tree.volume_info(id))
                .cloned()
                .ok_or_else(|| VfsError::NotFound(format!("Could not find the drive '{}'.", drive)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{Directory, FileSystemStub};
    use crate::tree::{NodeTree, TreeOptions};
    use crate::types::Platform;
    use crate::volume::DriveType;
    use parking_lot::RwLock;
    use std::sync::Arc;

    #[test]
    fn test_drives_in_creation_order() {
        let fs = FileSystemStub::new(Arc::new(RwLock::new(NodeTree::new(TreeOptions::new(
            Platform::Windows,
        )))));
        fs.directory().create_directory(r"D:\x").unwrap();
        fs.directory().create_directory(r"C:\y").unwrap();
        fs.directory().create_directory(r"\\nas\share").unwrap();
        assert_eq!(fs.drive().get_drives(), vec!["D:", "C:", r"\\nas"]);

        let info = fs.drive().get_volume_info(r"c:\").unwrap();
        assert_eq!(info.root_path_name, "C:");
        assert_eq!(info.drive_type, DriveType::Fixed);
        assert!(matches!(
            fs.drive().get_volume_info("Q:"),
            Err(VfsError::NotFound(_))
        ));
    }

    #[test]
    fn test_posix_root_drive() {
        let fs = FileSystemStub::new(Arc::new(RwLock::new(NodeTree::new(TreeOptions::new(
            Platform::Linux,
        )))));
        assert_eq!(fs.drive().get_drives(), vec!["/"]);
        let info = fs.drive().get_volume_info("/").unwrap();
        assert_eq!(info.drive_type, DriveType::NoRootDirectory);
        assert!(info.is_case_sensitive);
    }
}
