//! Document watch
//!
//! A `notify` watcher on the document's directory forwards events over a
//! channel to a worker thread. The worker keeps only create/modify events for
//! the document itself, waits out the debounce window and hands the change to
//! its listener.

use crate::error::Result;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Receives debounced changes of the watched document
pub trait DocumentListener: Send + Sync {
    /// True while the listener is loading or saving; events are dropped then.
    fn is_busy(&self) -> bool;
    fn document_changed(&self);
}

enum WatchMessage {
    Event(notify::Result<Event>),
    Shutdown,
}

/// Running watch over one document; stops its worker on drop
pub struct DocumentWatch {
    _watcher: RecommendedWatcher,
    enabled: Arc<AtomicBool>,
    sender: Sender<WatchMessage>,
    worker: Option<JoinHandle<()>>,
    document: PathBuf,
}

impl DocumentWatch {
    /// Watch `document`, delivering changes to `listener` after `debounce`
    ///
    /// The document's directory must exist; the document itself need not.
    pub fn start(
        document: &Path,
        debounce: Duration,
        listener: Weak<dyn DocumentListener>,
    ) -> Result<Self> {
        let directory = document
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = document.file_name().map(|n| n.to_os_string()).ok_or_else(|| {
            crate::error::VfsError::WatchError(format!(
                "Layout document path has no file name: {}",
                document.display()
            ))
        })?;

        let enabled = Arc::new(AtomicBool::new(true));
        let (tx, rx) = mpsc::channel();

        let callback_enabled = enabled.clone();
        let callback_tx = tx.clone();
        let mut watcher = notify::recommended_watcher(move |res| {
            if !callback_enabled.load(Ordering::SeqCst) {
                return;
            }
            if let Err(e) = callback_tx.send(WatchMessage::Event(res)) {
                debug!("Dropping watch event, worker gone: {}", e);
            }
        })?;
        watcher.watch(directory, RecursiveMode::NonRecursive)?;

        let worker = thread::Builder::new()
            .name("vfstub-watch".to_string())
            .spawn(move || run_worker(rx, file_name, debounce, listener))?;

        info!(document = %document.display(), "Watching layout document");
        Ok(Self {
            _watcher: watcher,
            enabled,
            sender: tx,
            worker: Some(worker),
            document: document.to_path_buf(),
        })
    }

    pub fn document(&self) -> &Path {
        &self.document
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Drop incoming events while disabled.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

impl Drop for DocumentWatch {
    fn drop(&mut self) {
        let _ = self.sender.send(WatchMessage::Shutdown);
        if let Some(worker) = self.worker.take() {
            // The worker may hold the last handle to our owner.
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                error!(document = %self.document.display(), "Watch worker panicked");
            }
        }
    }
}

impl std::fmt::Debug for DocumentWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentWatch")
            .field("document", &self.document)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn run_worker(
    rx: Receiver<WatchMessage>,
    file_name: OsString,
    debounce: Duration,
    listener: Weak<dyn DocumentListener>,
) {
    while let Ok(message) = rx.recv() {
        let event = match message {
            WatchMessage::Shutdown => break,
            WatchMessage::Event(Err(e)) => {
                warn!("Watch error: {}", e);
                continue;
            }
            WatchMessage::Event(Ok(event)) => event,
        };
        if !is_document_event(&event, &file_name) {
            continue;
        }
        let Some(target) = listener.upgrade() else {
            break;
        };
        if target.is_busy() {
            debug!("Ignoring document event during load or save");
            continue;
        }
        if !wait_quiet(&rx, debounce) {
            break;
        }
        target.document_changed();
    }
    debug!("Watch worker stopped");
}

/// Drain events for `debounce`; false when the watch is shutting down.
fn wait_quiet(rx: &Receiver<WatchMessage>, debounce: Duration) -> bool {
    let deadline = Instant::now() + debounce;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(WatchMessage::Shutdown) | Err(RecvTimeoutError::Disconnected) => return false,
            Ok(WatchMessage::Event(_)) => continue,
            Err(RecvTimeoutError::Timeout) => return true,
        }
    }
}

fn is_document_event(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name.as_os_str()))
}
