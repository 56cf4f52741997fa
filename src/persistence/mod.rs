//! Persistence
//!
//! Keeps a tree and a layout document in sync: mutations save the tree, and
//! external edits to the document reload it.

pub mod document;
pub mod layout;
pub mod watch;

pub use document::{DirectoryRecord, FileRecord, LayoutDocument, VolumeRecord};
pub use layout::LayoutFilePersistence;
pub use watch::{DocumentListener, DocumentWatch};

use crate::error::Result;

/// Load/save contract of a persistence backend
pub trait Persistence: Send + Sync {
    fn is_loading(&self) -> bool;
    fn is_saving(&self) -> bool;
    /// Replace the shared tree with the persisted one.
    fn load(&self) -> Result<()>;
    /// Write the shared tree out.
    fn save(&self) -> Result<()>;
}
