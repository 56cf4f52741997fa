//! vfstub: In-Memory Virtual Filesystem
//!
//! A tree of volumes, directories and files behind directory, file and drive
//! contracts that behave like a real filesystem, for code that should be
//! testable without touching disk. A live variant keeps the tree in a JSON
//! layout document and follows external edits to it.

pub mod concurrency;
pub mod config;
pub mod error;
pub mod extensions;
pub mod live;
pub mod logging;
pub mod persistence;
pub mod stub;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod vfs;
pub mod volume;

pub use error::{Result, VfsError};
pub use live::LiveVirtualFileSystem;
pub use stub::{Directory, Drive, File, FileMode, SearchOption};
pub use tree::TreeOptions;
pub use types::{NameComparer, NodeId, Platform, Timestamp};
pub use vfs::VirtualFileSystem;
pub use volume::{DriveType, VolumeInfo};
