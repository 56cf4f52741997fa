//! Layout file persistence
//!
//! Saves the shared tree as a JSON layout document after every mutation and
//! reloads it when another writer changes the document.

use super::document::LayoutDocument;
use super::watch::{DocumentListener, DocumentWatch};
use super::Persistence;
use crate::concurrency::ActivityFlag;
use crate::config::PersistenceConfig;
use crate::error::{Result, VfsError};
use crate::stub::{InvalidationListener, SharedTree};
use crate::tree::TreeOptions;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Persistence backed by a single layout document on disk
pub struct LayoutFilePersistence {
    path: PathBuf,
    tree: SharedTree,
    defaults: TreeOptions,
    settings: PersistenceConfig,
    loading: ActivityFlag,
    saving: ActivityFlag,
    /// Digest of the document text last read or written by this instance
    known_digest: Mutex<Option<blake3::Hash>>,
    watch: Mutex<Option<DocumentWatch>>,
    this: Weak<LayoutFilePersistence>,
}

impl LayoutFilePersistence {
    /// Bridge between `tree` and the document at `path`
    ///
    /// `defaults` configures the tree when the document is missing or names
    /// no platform. Nothing is read until [`Persistence::load`].
    pub fn new(
        path: impl Into<PathBuf>,
        tree: SharedTree,
        defaults: TreeOptions,
        settings: PersistenceConfig,
    ) -> Arc<Self> {
        let path = path.into();
        Arc::new_cyclic(|this| Self {
            path,
            tree,
            defaults,
            settings,
            loading: ActivityFlag::new(),
            saving: ActivityFlag::new(),
            known_digest: Mutex::new(None),
            watch: Mutex::new(None),
            this: this.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tree(&self) -> &SharedTree {
        &self.tree
    }

    pub fn is_watching(&self) -> bool {
        self.watch
            .lock()
            .as_ref()
            .map(DocumentWatch::is_enabled)
            .unwrap_or(false)
    }

    /// Install the document watch, or re-enable an existing one.
    fn ensure_watch(&self) {
        if !self.settings.watch {
            return;
        }
        let mut slot = self.watch.lock();
        if let Some(watch) = slot.as_ref() {
            watch.set_enabled(true);
            return;
        }
        let listener: Weak<dyn DocumentListener> = self.this.clone();
        match DocumentWatch::start(
            &self.path,
            Duration::from_millis(self.settings.debounce_ms),
            listener,
        ) {
            Ok(watch) => *slot = Some(watch),
            Err(e) => warn!(path = %self.path.display(), "Could not watch layout document: {}", e),
        }
    }

    fn set_watch_enabled(&self, enabled: bool) {
        if let Some(watch) = self.watch.lock().as_ref() {
            watch.set_enabled(enabled);
        }
    }

    fn read_document(&self) -> Result<Option<String>> {
        read_with_retry(
            &self.path,
            Duration::from_millis(self.settings.lock_retry_ms),
            self.settings.lock_retry_limit,
            || std::fs::read_to_string(&self.path),
        )
    }

    /// Write through a sibling temp file so readers never see a partial document.
    fn write_document(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut temp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        temp_name.push(".tmp");
        let temp = self.path.with_file_name(temp_name);

        let mut file = std::fs::File::create(&temp)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn is_known(&self, text: &str) -> bool {
        *self.known_digest.lock() == Some(blake3::hash(text.as_bytes()))
    }
}

impl Persistence for LayoutFilePersistence {
    fn is_loading(&self) -> bool {
        self.loading.is_active()
    }

    fn is_saving(&self) -> bool {
        self.saving.is_active()
    }

    fn load(&self) -> Result<()> {
        let Some(_loading) = self.loading.try_enter() else {
            debug!("Load already in progress");
            return Ok(());
        };

        let text = self.read_document()?;
        let document = match &text {
            Some(text) => LayoutDocument::from_json(text)?,
            None => {
                debug!(path = %self.path.display(), "No layout document, starting empty");
                LayoutDocument::default()
            }
        };
        let files = document.file_count();
        let fresh = document.into_tree(self.defaults)?;
        let volumes = fresh.volumes().len();
        *self.tree.write() = fresh;
        *self.known_digest.lock() = text.as_deref().map(|t| blake3::hash(t.as_bytes()));

        info!(path = %self.path.display(), volumes, files, "Loaded layout document");
        self.ensure_watch();
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let Some(_saving) = self.saving.try_enter() else {
            debug!("Save already in progress");
            return Ok(());
        };

        let document = LayoutDocument::from_tree(&self.tree.read());
        let text = document.to_json(self.settings.pretty)?;
        let digest = blake3::hash(text.as_bytes());

        self.set_watch_enabled(false);
        *self.known_digest.lock() = Some(digest);
        let written = self.write_document(&text);
        self.set_watch_enabled(true);
        written?;

        info!(
            path = %self.path.display(),
            files = document.file_count(),
            digest = %digest.to_hex(),
            "Saved layout document"
        );
        self.ensure_watch();
        Ok(())
    }
}

impl InvalidationListener for LayoutFilePersistence {
    fn invalidate(&self) -> Result<()> {
        if self.is_loading() || self.is_saving() {
            debug!("Dropping invalidation during load or save");
            return Ok(());
        }
        self.save().map_err(|e| {
            error!(path = %self.path.display(), "Failed to save layout document: {}", e);
            e
        })
    }
}

impl DocumentListener for LayoutFilePersistence {
    fn is_busy(&self) -> bool {
        self.is_loading() || self.is_saving()
    }

    fn document_changed(&self) {
        if self.is_busy() {
            return;
        }
        match std::fs::read_to_string(&self.path) {
            Ok(text) if self.is_known(&text) => {
                debug!("Layout document unchanged, skipping reload");
                return;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Layout document vanished, keeping current tree");
                return;
            }
            _ => {}
        }
        if let Err(e) = self.load() {
            error!(path = %self.path.display(), "Failed to reload layout document: {}", e);
        }
    }
}

impl std::fmt::Debug for LayoutFilePersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutFilePersistence")
            .field("path", &self.path)
            .field("loading", &self.is_loading())
            .field("saving", &self.is_saving())
            .field("watching", &self.is_watching())
            .finish()
    }
}

/// Sharing violations (held by another writer) rather than real failures
fn is_sharing_violation(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }
    // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
    cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33))
}

/// Run `read`, retrying sharing violations every `interval`
///
/// A missing document reads as `None`. With a `limit`, the attempt after the
/// last retry fails with `Locked`; without one the loop waits indefinitely.
fn read_with_retry(
    path: &Path,
    interval: Duration,
    limit: Option<u32>,
    mut read: impl FnMut() -> io::Result<String>,
) -> Result<Option<String>> {
    let mut retries = 0u32;
    loop {
        match read() {
            Ok(text) => return Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if is_sharing_violation(&e) => {
                if limit.is_some_and(|limit| retries >= limit) {
                    return Err(VfsError::Locked(format!(
                        "{} is held by another writer after {} retries",
                        path.display(),
                        retries
                    )));
                }
                retries += 1;
                warn!(path = %path.display(), retries, "Layout document locked, retrying");
                thread::sleep(interval);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{Directory, File, FileSystemStub};
    use crate::tree::NodeTree;
    use crate::types::Platform;
    use parking_lot::RwLock;
    use tempfile::TempDir;

    fn settings() -> PersistenceConfig {
        PersistenceConfig {
            watch: false,
            ..PersistenceConfig::default()
        }
    }

    fn bridge(path: &Path) -> (Arc<LayoutFilePersistence>, FileSystemStub) {
        let options = TreeOptions::new(Platform::Linux);
        let tree: SharedTree = Arc::new(RwLock::new(NodeTree::new(options)));
        let persistence = LayoutFilePersistence::new(path, tree.clone(), options, settings());
        let stub = FileSystemStub::with_listener(tree, persistence.clone());
        (persistence, stub)
    }

    #[test]
    fn test_missing_document_loads_empty() {
        let temp = TempDir::new().unwrap();
        let (persistence, stub) = bridge(&temp.path().join("layout.json"));
        persistence.load().unwrap();
        assert!(stub.directory().exists("/"));
        assert!(stub.directory().get_directories("/").unwrap().is_empty());
        assert!(!temp.path().join("layout.json").exists());
    }

    #[test]
    fn test_mutation_saves_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("layout.json");
        let (persistence, stub) = bridge(&path);
        persistence.load().unwrap();

        stub.directory().create_directory("/etc").unwrap();
        stub.file().write_all_text("/etc/motd", "welcome").unwrap();
        assert!(path.exists());
        assert!(!path.with_file_name("layout.json.tmp").exists());

        let text = std::fs::read_to_string(&path).unwrap();
        let document = LayoutDocument::from_json(&text).unwrap();
        assert_eq!(document.file_count(), 1);
        assert!(persistence.is_known(&text));
    }

    #[test]
    fn test_load_replaces_tree() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("layout.json");
        let (writer, writer_stub) = bridge(&path);
        writer.load().unwrap();
        writer_stub.directory().create_directory("/srv").unwrap();
        writer_stub.file().write_all_text("/srv/a.txt", "A").unwrap();

        let (reader, reader_stub) = bridge(&path);
        reader_stub.directory().create_directory("/scratch").unwrap();
        reader.load().unwrap();
        assert_eq!(reader_stub.file().read_all_text("/srv/a.txt").unwrap(), "A");
        assert!(!reader_stub.directory().exists("/scratch"));
    }

    #[test]
    fn test_document_platform_wins() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("layout.json");
        std::fs::write(
            &path,
            r#"{"platform":"Windows","volumes":[{"name":"C:","files":[{"name":"x.txt"}]}]}"#,
        )
        .unwrap();
        let (persistence, stub) = bridge(&path);
        persistence.load().unwrap();
        assert!(stub.file().exists(r"c:\X.TXT"));
    }

    #[test]
    fn test_invalidation_dropped_while_saving() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("layout.json");
        let (persistence, _stub) = bridge(&path);
        let _saving = persistence.saving.try_enter().unwrap();
        persistence.invalidate().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_document_is_serialization_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("layout.json");
        std::fs::write(&path, "{ not json").unwrap();
        let (persistence, _stub) = bridge(&path);
        assert!(matches!(persistence.load(), Err(VfsError::Serialization(_))));
        assert!(!persistence.is_loading());
    }

    #[test]
    fn test_retry_until_readable() {
        let mut attempts = 0;
        let text = read_with_retry(Path::new("doc"), Duration::from_millis(1), Some(5), || {
            attempts += 1;
            if attempts < 3 {
                Err(io::Error::from(io::ErrorKind::WouldBlock))
            } else {
                Ok("{}".to_string())
            }
        })
        .unwrap();
        assert_eq!(text.as_deref(), Some("{}"));
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_retry_budget_exhausted_is_locked() {
        let mut attempts = 0;
        let result = read_with_retry(Path::new("doc"), Duration::from_millis(1), Some(2), || {
            attempts += 1;
            Err(io::Error::from(io::ErrorKind::WouldBlock))
        });
        assert!(matches!(result, Err(VfsError::Locked(_))));
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_other_io_errors_propagate() {
        let result = read_with_retry(Path::new("doc"), Duration::from_millis(1), None, || {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        });
        assert!(matches!(result, Err(VfsError::Io(_))));
    }
}
