//! Directory, file and drive contract.
//!
//! Any backend, virtual or native, that satisfies these traits with the same
//! error conditions can stand in for another.

use crate::error::Result;
use crate::stub::stream::FileNodeStream;
use crate::types::{LocalTimestamp, Timestamp};
use crate::volume::VolumeInfo;
use chrono::Utc;

/// How `File::open` treats an existing or missing path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Create a file; fail if it already exists
    CreateNew,
    /// Create a file, truncating any existing one
    Create,
    /// Open an existing file
    Open,
    /// Open the file if present, otherwise create it
    OpenOrCreate,
    /// Open an existing file and truncate it
    Truncate,
    /// Open an existing file positioned at its end
    Append,
}

/// Whether a listing walks only direct children or the whole subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOption {
    #[default]
    TopDirectoryOnly,
    AllDirectories,
}

pub trait Directory: Send + Sync {
    /// Create the directory and any missing parents; no-op if present.
    fn create_directory(&self, path: &str) -> Result<()>;

    fn exists(&self, path: &str) -> bool;

    /// Delete an empty directory.
    fn delete(&self, path: &str) -> Result<()>;

    fn delete_recursive(&self, path: &str, recursive: bool) -> Result<()>;

    /// Move or rename a directory. A relative `dest` is taken relative to the
    /// source's parent.
    fn move_to(&self, src: &str, dest: &str) -> Result<()>;

    fn rename(&self, src: &str, dest: &str) -> Result<()> {
        self.move_to(src, dest)
    }

    /// Full paths of direct child directories, ordinal-sorted.
    fn get_directories(&self, path: &str) -> Result<Vec<String>>;

    /// Full paths of direct child files, ordinal-sorted.
    fn get_files(&self, path: &str) -> Result<Vec<String>> {
        self.get_files_matching(path, "*", SearchOption::TopDirectoryOnly)
    }

    fn get_files_with_pattern(&self, path: &str, pattern: &str) -> Result<Vec<String>> {
        self.get_files_matching(path, pattern, SearchOption::TopDirectoryOnly)
    }

    fn get_files_matching(
        &self,
        path: &str,
        pattern: &str,
        option: SearchOption,
    ) -> Result<Vec<String>>;

    fn get_creation_time_utc(&self, path: &str) -> Result<Timestamp>;
    fn set_creation_time_utc(&self, path: &str, time: Timestamp) -> Result<()>;
    fn get_last_write_time_utc(&self, path: &str) -> Result<Timestamp>;
    fn set_last_write_time_utc(&self, path: &str, time: Timestamp) -> Result<()>;

    fn get_creation_time(&self, path: &str) -> Result<LocalTimestamp> {
        Ok(self.get_creation_time_utc(path)?.into())
    }

    fn set_creation_time(&self, path: &str, time: LocalTimestamp) -> Result<()> {
        self.set_creation_time_utc(path, time.with_timezone(&Utc))
    }

    fn get_last_write_time(&self, path: &str) -> Result<LocalTimestamp> {
        Ok(self.get_last_write_time_utc(path)?.into())
    }

    fn set_last_write_time(&self, path: &str, time: LocalTimestamp) -> Result<()> {
        self.set_last_write_time_utc(path, time.with_timezone(&Utc))
    }
}

pub trait File: Send + Sync {
    fn read_all_bytes(&self, path: &str) -> Result<Vec<u8>>;

    /// Contents decoded as UTF-8, invalid sequences replaced.
    fn read_all_text(&self, path: &str) -> Result<String> {
        let bytes = self.read_all_bytes(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn exists(&self, path: &str) -> bool;

    /// Replace the full contents, creating the file if absent.
    fn write_all_bytes(&self, path: &str, contents: &[u8]) -> Result<()>;

    fn write_all_text(&self, path: &str, contents: &str) -> Result<()> {
        self.write_all_bytes(path, contents.as_bytes())
    }

    fn append_all_text(&self, path: &str, contents: &str) -> Result<()>;

    /// Delete a file; a missing file is not an error.
    fn delete(&self, path: &str) -> Result<()>;

    fn move_to(&self, src: &str, dest: &str) -> Result<()>;

    fn rename(&self, src: &str, dest: &str) -> Result<()> {
        self.move_to(src, dest)
    }

    fn copy(&self, src: &str, dest: &str, overwrite: bool) -> Result<()>;

    fn open(&self, path: &str, mode: FileMode) -> Result<FileNodeStream>;

    fn get_creation_time_utc(&self, path: &str) -> Result<Timestamp>;
    fn set_creation_time_utc(&self, path: &str, time: Timestamp) -> Result<()>;
    fn get_last_write_time_utc(&self, path: &str) -> Result<Timestamp>;
    fn set_last_write_time_utc(&self, path: &str, time: Timestamp) -> Result<()>;

    fn get_creation_time(&self, path: &str) -> Result<LocalTimestamp> {
        Ok(self.get_creation_time_utc(path)?.into())
    }

    fn set_creation_time(&self, path: &str, time: LocalTimestamp) -> Result<()> {
        self.set_creation_time_utc(path, time.with_timezone(&Utc))
    }

    fn get_last_write_time(&self, path: &str) -> Result<LocalTimestamp> {
        Ok(self.get_last_write_time_utc(path)?.into())
    }

    fn set_last_write_time(&self, path: &str, time: LocalTimestamp) -> Result<()> {
        self.set_last_write_time_utc(path, time.with_timezone(&Utc))
    }
}

pub trait Drive: Send + Sync {
    /// Root names of all volumes in creation order.
    fn get_drives(&self) -> Vec<String>;

    fn get_volume_info(&self, drive: &str) -> Result<VolumeInfo>;
}
