//! Volume metadata records.

use serde::{Deserialize, Serialize};

/// Kind of drive backing a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriveType {
    Unknown,
    NoRootDirectory,
    Removable,
    #[default]
    Fixed,
    Network,
    CDRom,
    Ram,
}

/// Flat read-only description of a volume
///
/// Fixes the name comparer of every node on the volume for the lifetime of
/// the volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeInfo {
    pub root_path_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_path_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_label: Option<String>,
    pub is_case_sensitive: bool,
    pub is_compressed: bool,
    pub supports_compression: bool,
    pub supports_encryption: bool,
    pub supports_hard_links: bool,
    pub is_ready: bool,
    pub available_free_space: i64,
    pub total_free_space: i64,
    pub total_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_format: Option<String>,
    pub drive_type: DriveType,
}

impl Default for VolumeInfo {
    fn default() -> Self {
        Self {
            root_path_name: String::new(),
            mapped_path_name: None,
            volume_label: None,
            is_case_sensitive: false,
            is_compressed: false,
            supports_compression: false,
            supports_encryption: false,
            supports_hard_links: false,
            is_ready: true,
            available_free_space: 0,
            total_free_space: 0,
            total_size: 0,
            drive_format: None,
            drive_type: DriveType::Fixed,
        }
    }
}

impl VolumeInfo {
    /// Default metadata for a drive or UNC volume: case-insensitive fixed NTFS, ready
    pub fn fixed(root_path_name: impl Into<String>) -> Self {
        Self {
            root_path_name: root_path_name.into(),
            drive_format: Some("NTFS".to_string()),
            ..Self::default()
        }
    }

    /// Metadata of the single POSIX root volume
    pub fn posix_root(case_sensitive: bool) -> Self {
        Self {
            root_path_name: "/".to_string(),
            is_case_sensitive: case_sensitive,
            supports_hard_links: true,
            drive_type: DriveType::NoRootDirectory,
            ..Self::default()
        }
    }
}
